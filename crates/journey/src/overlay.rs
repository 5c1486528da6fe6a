use foundation::PoiId;
use foundation::math::{LocalPosition, Mat4, ScreenPoint, Viewport, project};

use crate::config::OverlayLayout;
use crate::model::Poi;

/// Screen rectangle of a bubble, top-left origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BubbleRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
}

/// A POI bubble to draw this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiOverlay {
    pub poi: PoiId,
    pub name: String,
    /// Projection of the POI center.
    pub screen: ScreenPoint,
    pub bubble: BubbleRect,
    /// Straight-line distance from the camera to the POI center.
    pub distance_km: f64,
}

impl PoiOverlay {
    pub fn distance_label(&self) -> String {
        format!("{:.1} km", self.distance_km)
    }
}

/// Bubbles for every POI in front of the camera, in POI order.
///
/// Bubbles follow the POI horizontally and are centered on a line a fixed
/// offset above the bottom edge.
pub fn project_pois(
    pois: &[Poi],
    view_proj: &Mat4,
    camera: LocalPosition,
    viewport: Viewport,
    layout: &OverlayLayout,
) -> Vec<PoiOverlay> {
    pois.iter()
        .filter_map(|poi| {
            let screen = project(poi.position, view_proj, viewport);
            if !screen.is_in_front() {
                return None;
            }
            let anchor_y = viewport.height - layout.bottom_offset;
            Some(PoiOverlay {
                poi: poi.id.clone(),
                name: poi.name.clone(),
                screen,
                bubble: BubbleRect {
                    x: screen.x - layout.bubble_width / 2.0,
                    y: anchor_y - layout.bubble_height / 2.0,
                    width: layout.bubble_width,
                    height: layout.bubble_height,
                    corner_radius: layout.corner_radius,
                },
                distance_km: poi.position.distance(camera) / 1000.0,
            })
        })
        .collect()
}
