use foundation::math::{GeoPoint, LocalPosition};
use foundation::{ChannelId, ContentRef, MarkerRef, PoiId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    #[default]
    Navigating,
    /// Navigation forced by the user; routing policy may refuse POI re-entry.
    ForcedNavigating,
    InPoi,
}

impl NavigationMode {
    /// Both navigation variants share the same scene treatment.
    pub fn is_navigating(self) -> bool {
        matches!(self, NavigationMode::Navigating | NavigationMode::ForcedNavigating)
    }
}

/// Static landmark shown around a POI while the user is inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkPlacement {
    pub object: ContentRef,
    pub location: GeoPoint,
    pub scale: f64,
}

/// Binding between a physical marker and a piece of virtual content.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub uuid: ChannelId,
    pub marker: MarkerRef,
    pub content: ContentRef,
    pub landmark: Option<LandmarkPlacement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Poi {
    pub id: PoiId,
    pub name: String,
    pub position: LocalPosition,
    pub radius: f64,
    pub channels: Vec<Channel>,
}

impl Poi {
    /// Ground-plane distance from `position` to the POI center.
    pub fn ground_distance(&self, position: LocalPosition) -> f64 {
        position.xz().distance(self.position.xz())
    }

    pub fn contains(&self, position: LocalPosition) -> bool {
        self.ground_distance(position) <= self.radius
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerAsset {
    pub reference: MarkerRef,
    /// Image handed to the detector for pattern markers.
    pub image: String,
    /// Set for fiducial tags, which the detector reports by numeric id.
    pub tag_id: Option<u32>,
}

impl MarkerAsset {
    pub fn is_tag(&self) -> bool {
        self.tag_id.is_some()
    }
}
