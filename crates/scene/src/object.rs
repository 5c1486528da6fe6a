use foundation::ObjectId;

use crate::components::{Content, Transform};

/// An object as handed to the scene host.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: ObjectId,
    pub content: Content,
    pub transform: Transform,
    pub visible: bool,
}

impl SceneObject {
    pub fn new(id: ObjectId, content: Content) -> Self {
        Self {
            id,
            content,
            transform: Transform::identity(),
            visible: true,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}
