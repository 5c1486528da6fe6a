use super::{LocalPosition, Mat4};

/// Output surface size in pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        if self.height <= 0.0 {
            1.0
        } else {
            (self.width / self.height).max(1e-6)
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        0.0 <= x && x < self.width && 0.0 <= y && y < self.height
    }
}

/// A world position re-projected onto the viewport.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenPoint {
    /// Pixels from the left edge.
    pub x: f64,
    /// Pixels from the top edge.
    pub y: f64,
    /// Normalized device depth.
    pub depth: f64,
}

impl ScreenPoint {
    /// `depth < 1` means the point is in front of the camera.
    ///
    /// Everything at or beyond 1 (behind the eye, or past the far plane)
    /// must not get a screen-space overlay.
    pub fn is_in_front(&self) -> bool {
        self.depth < 1.0
    }
}

/// Project a local position through a view-projection matrix.
///
/// Uses a `[0, 1]` depth range; points behind the eye come out with
/// `depth > 1` after the perspective divide. A point on the eye plane
/// (`w ≈ 0`) has no defined projection and reports `depth = +∞`.
pub fn project(position: LocalPosition, view_proj: &Mat4, viewport: Viewport) -> ScreenPoint {
    let [cx, cy, cz, cw] = view_proj.transform_point_h(position);
    if cw.abs() < 1e-12 {
        return ScreenPoint {
            x: 0.0,
            y: 0.0,
            depth: f64::INFINITY,
        };
    }

    let (nx, ny, nz) = (cx / cw, cy / cw, cz / cw);
    ScreenPoint {
        x: ((nx + 1.0) * viewport.width / 2.0).round(),
        y: ((1.0 - ny) * viewport.height / 2.0).round(),
        depth: nz,
    }
}
