use std::collections::{BTreeMap, BTreeSet};

use foundation::ObjectId;
use foundation::math::{LocalPosition, Mat4, Quat, Vec3, Viewport};
use runtime::{LoadCallback, LoadFailure};
use tracing::debug;

use crate::components::Transform;
use crate::host::SceneHost;
use crate::object::SceneObject;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneChange {
    Added(ObjectId),
    Removed(ObjectId),
}

/// Perspective parameters of the AR camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraLens {
    pub fov_y_rad: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for CameraLens {
    fn default() -> Self {
        Self {
            fov_y_rad: 40f64.to_radians(),
            near: 0.1,
            far: 20_000.0,
        }
    }
}

/// Deterministic in-memory [`SceneHost`].
///
/// Keeps objects keyed by id (stable iteration order), the viewer pose and
/// a log of add/remove requests. Used headless by the simulator and by tests
/// that need to observe exactly what the core asked the engine to do.
#[derive(Debug, Default)]
pub struct World {
    objects: BTreeMap<ObjectId, SceneObject>,
    changes: Vec<SceneChange>,
    viewer_position: LocalPosition,
    viewer_rotation: Quat,
    viewport: Option<Viewport>,
    lens: CameraLens,
    loaded: Vec<String>,
    failing: BTreeSet<String>,
    frames_rendered: u64,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lens(lens: CameraLens) -> Self {
        Self {
            lens,
            ..Self::default()
        }
    }

    /// Make future `load` calls for `path` report a failure.
    pub fn fail_loads_of(&mut self, path: impl Into<String>) {
        self.failing.insert(path.into());
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn changes(&self) -> &[SceneChange] {
        &self.changes
    }

    pub fn loaded_assets(&self) -> &[String] {
        &self.loaded
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn viewer_position(&self) -> LocalPosition {
        self.viewer_position
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.unwrap_or(Viewport::new(1.0, 1.0))
    }
}

impl SceneHost for World {
    fn add_object(&mut self, object: &SceneObject) {
        self.changes.push(SceneChange::Added(object.id));
        self.objects.insert(object.id, object.clone());
    }

    fn remove_object(&mut self, id: ObjectId) {
        if self.objects.remove(&id).is_some() {
            self.changes.push(SceneChange::Removed(id));
        }
    }

    fn update_object(&mut self, id: ObjectId, transform: &Transform) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.transform = *transform;
        }
    }

    fn camera_transform(&self) -> Mat4 {
        let proj = Mat4::perspective_rh_z0(
            self.lens.fov_y_rad,
            self.viewport().aspect(),
            self.lens.near,
            self.lens.far,
        );
        let view = Mat4::view_from_pose(self.viewer_position, self.viewer_rotation);
        proj.mul(&view)
    }

    fn camera_position(&self) -> Vec3 {
        self.viewer_position
    }

    fn set_viewer_position(&mut self, position: LocalPosition) {
        self.viewer_position = position;
    }

    fn set_viewer_orientation(&mut self, rotation: Quat) {
        self.viewer_rotation = rotation.normalize();
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn load(&mut self, path: &str, done: LoadCallback) {
        if self.failing.contains(path) {
            done(Err(LoadFailure::new(path, "asset unavailable")));
            return;
        }
        debug!(path, "scene asset loaded");
        self.loaded.push(path.to_string());
        done(Ok(()));
    }

    fn render(&mut self) {
        self.frames_rendered += 1;
    }
}
