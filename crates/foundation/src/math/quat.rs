use super::Vec3;

/// Unit quaternion `(x, y, z, w)` describing an orientation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_axis_angle(axis: Vec3, angle_rad: f64) -> Self {
        let axis = axis.normalize();
        let (s, c) = (angle_rad * 0.5).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn normalize(self) -> Self {
        let n = self.dot(self).sqrt();
        if n > 1e-10 {
            Self::new(self.x / n, self.y / n, self.z / n, self.w / n)
        } else {
            Self::IDENTITY
        }
    }

    /// Hamilton product `self * other` (apply `other`, then `self`).
    pub fn mul(self, b: Self) -> Self {
        let a = self;
        Self::new(
            a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
            a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        )
    }

    pub fn rotate(self, v: Vec3) -> Vec3 {
        let qv = Vec3::new(self.x, self.y, self.z);
        let t = qv.cross(v).scale(2.0);
        v + t.scale(self.w) + qv.cross(t)
    }

    /// Spherical interpolation along the shortest arc.
    pub fn slerp(self, target: Self, t: f64) -> Self {
        let mut b = target;
        let mut dot = self.dot(b);
        if dot < 0.0 {
            b = Self::new(-b.x, -b.y, -b.z, -b.w);
            dot = -dot;
        }

        // Nearly parallel: fall back to nlerp to avoid dividing by sin(~0).
        if dot > 0.9995 {
            return Self::new(
                self.x + t * (b.x - self.x),
                self.y + t * (b.y - self.y),
                self.z + t * (b.z - self.z),
                self.w + t * (b.w - self.w),
            )
            .normalize();
        }

        let theta_0 = dot.clamp(-1.0, 1.0).acos();
        let theta = theta_0 * t;
        let sin_theta = theta.sin();
        let sin_theta_0 = theta_0.sin();

        let s0 = theta.cos() - dot * sin_theta / sin_theta_0;
        let s1 = sin_theta / sin_theta_0;

        Self::new(
            s0 * self.x + s1 * b.x,
            s0 * self.y + s1 * b.y,
            s0 * self.z + s1 * b.z,
            s0 * self.w + s1 * b.w,
        )
    }

    /// Rotation angle in radians, in `[0, 2π]`.
    pub fn angle(self) -> f64 {
        2.0 * self.w.clamp(-1.0, 1.0).acos()
    }
}

#[cfg(test)]
mod tests {
    use super::Quat;
    use crate::math::Vec3;

    fn assert_vec_close(a: Vec3, b: Vec3, eps: f64) {
        let diff = a.distance(b);
        assert!(diff <= eps, "expected {a:?} ~= {b:?} (diff {diff})");
    }

    #[test]
    fn identity_leaves_vectors_unchanged() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_vec_close(Quat::IDENTITY.rotate(v), v, 1e-12);
    }

    #[test]
    fn quarter_turn_about_y() {
        let q = Quat::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), std::f64::consts::FRAC_PI_2);
        assert_vec_close(
            q.rotate(Vec3::new(1.0, 0.0, 0.0)),
            Vec3::new(0.0, 0.0, -1.0),
            1e-12,
        );
    }

    #[test]
    fn slerp_halfway_halves_the_angle() {
        let axis = Vec3::new(0.0, 0.0, 1.0);
        let a = Quat::IDENTITY;
        let b = Quat::from_axis_angle(axis, 1.2);
        let mid = a.slerp(b, 0.5);
        assert!((mid.angle() - 0.6).abs() < 1e-9);
        assert!((a.slerp(b, 1.0).angle() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn slerp_takes_the_short_way_round() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, 0.0, 0.0), 0.4);
        let flipped = Quat::new(-q.x, -q.y, -q.z, -q.w);
        let out = Quat::IDENTITY.slerp(flipped, 1.0);
        assert!(out.dot(q).abs() > 1.0 - 1e-9);
    }
}
