use foundation::math::{Quat, Vec3};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn translate(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_uniform_scale(mut self, scale: f64) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// One exponential-smoothing step toward `target`.
    ///
    /// `t = 1` snaps to the target, `t = 0` keeps `self`.
    pub fn blend(&self, target: &Transform, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            position: self.position.lerp(target.position, t),
            rotation: self.rotation.slerp(target.rotation, t),
            scale: self.scale.lerp(target.scale, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Transform;
    use foundation::math::{Quat, Vec3};

    #[test]
    fn identity_is_origin_with_unit_scale() {
        let transform = Transform::identity();
        assert_eq!(transform.position, Vec3::ZERO);
        assert_eq!(transform.scale, Vec3::ONE);
        assert_eq!(transform.rotation, Quat::IDENTITY);
    }

    #[test]
    fn blend_moves_part_of_the_way() {
        let from = Transform::identity();
        let to = Transform::translate(Vec3::new(4.0, 0.0, -8.0)).with_uniform_scale(3.0);
        let mid = from.blend(&to, 0.25);
        assert_eq!(mid.position, Vec3::new(1.0, 0.0, -2.0));
        assert_eq!(mid.scale, Vec3::splat(1.5));
        assert_eq!(from.blend(&to, 1.0).position, to.position);
    }
}
