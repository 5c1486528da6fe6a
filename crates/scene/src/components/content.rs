use foundation::ContentRef;

/// Renderable payload of a scene object.
///
/// A closed set of variants: anything that needs to react to being shown
/// or hidden (video playback) does so through [`Content::on_attach`] and
/// [`Content::on_detach`].
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    StaticMesh {
        mesh: ContentRef,
    },
    VideoMesh {
        mesh: ContentRef,
        video: ContentRef,
        playing: bool,
    },
    /// The POI boundary ring.
    Boundary {
        inner_radius: f64,
        outer_radius: f64,
    },
    Group(Vec<Content>),
}

impl Content {
    pub fn mesh(mesh: impl Into<ContentRef>) -> Self {
        Content::StaticMesh { mesh: mesh.into() }
    }

    pub fn video(mesh: impl Into<ContentRef>, video: impl Into<ContentRef>) -> Self {
        Content::VideoMesh {
            mesh: mesh.into(),
            video: video.into(),
            playing: false,
        }
    }

    /// Starts every video in the tree.
    pub fn on_attach(&mut self) {
        self.set_playing(true);
    }

    /// Stops every video in the tree.
    pub fn on_detach(&mut self) {
        self.set_playing(false);
    }

    pub fn is_playing(&self) -> bool {
        match self {
            Content::VideoMesh { playing, .. } => *playing,
            Content::Group(children) => children.iter().any(Content::is_playing),
            _ => false,
        }
    }

    fn set_playing(&mut self, value: bool) {
        match self {
            Content::VideoMesh { playing, .. } => *playing = value,
            Content::Group(children) => {
                for child in children {
                    child.set_playing(value);
                }
            }
            _ => {}
        }
    }
}
