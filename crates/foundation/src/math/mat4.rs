use super::{Quat, Vec3};

/// Column-major 4x4 matrix: `m[col][row]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4(pub [[f64; 4]; 4]);

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Self = Self([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    /// `self * other`.
    pub fn mul(&self, other: &Self) -> Self {
        let (a, b) = (&self.0, &other.0);
        let mut c = [[0.0; 4]; 4];
        for col in 0..4 {
            for row in 0..4 {
                c[col][row] = a[0][row] * b[col][0]
                    + a[1][row] * b[col][1]
                    + a[2][row] * b[col][2]
                    + a[3][row] * b[col][3];
            }
        }
        Self(c)
    }

    /// Right-handed perspective projection with depth range `[0, 1]`.
    pub fn perspective_rh_z0(fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> Self {
        let f = 1.0 / (0.5 * fov_y_rad).tan();
        let m22 = far / (near - far);
        let m23 = (near * far) / (near - far);

        Self([
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, m22, -1.0],
            [0.0, 0.0, m23, 0.0],
        ])
    }

    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let f = (target - eye).normalize();
        let s = f.cross(up).normalize();
        let u = s.cross(f);

        Self([
            [s.x, u.x, -f.x, 0.0],
            [s.y, u.y, -f.y, 0.0],
            [s.z, u.z, -f.z, 0.0],
            [-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0],
        ])
    }

    /// View matrix of a camera at `eye` with world orientation `rotation`.
    ///
    /// The camera looks down its local −Z with +Y up.
    pub fn view_from_pose(eye: Vec3, rotation: Quat) -> Self {
        let forward = rotation.rotate(Vec3::new(0.0, 0.0, -1.0));
        let up = rotation.rotate(Vec3::new(0.0, 1.0, 0.0));
        Self::look_at_rh(eye, eye + forward, up)
    }

    /// Homogeneous transform of a point (`w = 1`), returning clip coordinates.
    pub fn transform_point_h(&self, p: Vec3) -> [f64; 4] {
        let m = &self.0;
        let mut out = [0.0; 4];
        for (row, v) in out.iter_mut().enumerate() {
            *v = m[0][row] * p.x + m[1][row] * p.y + m[2][row] * p.z + m[3][row];
        }
        out
    }
}
