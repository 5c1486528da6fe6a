use super::{Enu, EnuFrame, GeoPoint, LocalPosition, geodetic_to_ecef, ecef_to_geodetic};

/// Maps geodesic fixes into the session-local Cartesian frame.
///
/// The projection is an exact local tangent plane (WGS84 → ECEF → ENU) at a
/// single anchor. The anchor is fixed for the lifetime of the converter:
/// either supplied up front or captured from the first converted fix.
///
/// Axis mapping: x = east, y = up, z = south.
#[derive(Debug, Clone, Default)]
pub struct CoordinateConverter {
    frame: Option<EnuFrame>,
}

impl CoordinateConverter {
    /// A converter that anchors itself on the first fix it converts.
    pub fn unanchored() -> Self {
        Self { frame: None }
    }

    pub fn anchored(anchor: GeoPoint) -> Self {
        Self {
            frame: Some(EnuFrame::new(anchor.to_geodetic())),
        }
    }

    pub fn anchor(&self) -> Option<GeoPoint> {
        self.frame.map(|f| GeoPoint::from_geodetic(f.origin()))
    }

    pub fn is_anchored(&self) -> bool {
        self.frame.is_some()
    }

    /// Ground-level conversion (altitude 0 m).
    pub fn convert(&mut self, latitude: f64, longitude: f64) -> LocalPosition {
        self.convert_point(&GeoPoint::new(latitude, longitude))
    }

    pub fn convert_point(&mut self, point: &GeoPoint) -> LocalPosition {
        let frame = *self
            .frame
            .get_or_insert_with(|| EnuFrame::new(point.to_geodetic()));
        let enu = frame.to_enu(geodetic_to_ecef(point.to_geodetic()));
        LocalPosition::new(enu.east, enu.up, -enu.north)
    }

    /// Inverse of [`convert_point`](Self::convert_point); `None` until anchored.
    pub fn to_geo(&self, position: LocalPosition) -> Option<GeoPoint> {
        let frame = self.frame?;
        let enu = Enu::new(position.x, -position.z, position.y);
        Some(GeoPoint::from_geodetic(ecef_to_geodetic(frame.to_ecef(enu))))
    }
}
