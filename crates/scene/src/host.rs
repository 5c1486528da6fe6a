use foundation::ObjectId;
use foundation::math::{LocalPosition, Mat4, Quat, Vec3, Viewport};
use runtime::LoadCallback;

use crate::components::Transform;
use crate::object::SceneObject;

/// Contract with the external 3D engine.
///
/// Every method is called from the tick thread only. The host may keep
/// its own copy of added objects; removal is always requested explicitly by
/// whichever component added the object.
pub trait SceneHost {
    fn add_object(&mut self, object: &SceneObject);
    fn remove_object(&mut self, id: ObjectId);
    fn update_object(&mut self, id: ObjectId, transform: &Transform);

    /// View-projection matrix of the AR camera for the current viewport.
    fn camera_transform(&self) -> Mat4;
    fn camera_position(&self) -> Vec3;

    fn set_viewer_position(&mut self, position: LocalPosition);
    fn set_viewer_orientation(&mut self, rotation: Quat);
    fn set_viewport(&mut self, viewport: Viewport);

    /// Load a scene asset; `done` must be invoked exactly once.
    fn load(&mut self, path: &str, done: LoadCallback);

    /// Advance animations and draw one frame.
    fn render(&mut self);
}
