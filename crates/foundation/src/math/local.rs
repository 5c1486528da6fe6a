use super::{Ecef, Geodetic, geodetic_to_ecef};

/// Local East-North-Up coordinates (meters).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Enu {
    pub east: f64,
    pub north: f64,
    pub up: f64,
}

impl Enu {
    pub fn new(east: f64, north: f64, up: f64) -> Self {
        Self { east, north, up }
    }
}

/// Tangent-plane frame at a fixed geodetic origin.
///
/// The origin's ECEF position and rotation terms are computed once so that
/// repeated conversions are cheap and bit-for-bit reproducible.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EnuFrame {
    origin: Geodetic,
    origin_ecef: Ecef,
    sin_lat: f64,
    cos_lat: f64,
    sin_lon: f64,
    cos_lon: f64,
}

impl EnuFrame {
    pub fn new(origin: Geodetic) -> Self {
        let (sin_lat, cos_lat) = origin.lat_rad.sin_cos();
        let (sin_lon, cos_lon) = origin.lon_rad.sin_cos();
        Self {
            origin,
            origin_ecef: geodetic_to_ecef(origin),
            sin_lat,
            cos_lat,
            sin_lon,
            cos_lon,
        }
    }

    pub fn origin(&self) -> Geodetic {
        self.origin
    }

    pub fn to_enu(&self, point: Ecef) -> Enu {
        let dx = point.x - self.origin_ecef.x;
        let dy = point.y - self.origin_ecef.y;
        let dz = point.z - self.origin_ecef.z;

        let east = -self.sin_lon * dx + self.cos_lon * dy;
        let north = -self.sin_lat * self.cos_lon * dx - self.sin_lat * self.sin_lon * dy
            + self.cos_lat * dz;
        let up = self.cos_lat * self.cos_lon * dx
            + self.cos_lat * self.sin_lon * dy
            + self.sin_lat * dz;

        Enu::new(east, north, up)
    }

    pub fn to_ecef(&self, enu: Enu) -> Ecef {
        let (sin_lat, cos_lat) = (self.sin_lat, self.cos_lat);
        let (sin_lon, cos_lon) = (self.sin_lon, self.cos_lon);

        let dx = -sin_lon * enu.east - sin_lat * cos_lon * enu.north + cos_lat * cos_lon * enu.up;
        let dy = cos_lon * enu.east - sin_lat * sin_lon * enu.north + cos_lat * sin_lon * enu.up;
        let dz = cos_lat * enu.north + sin_lat * enu.up;

        Ecef::new(
            self.origin_ecef.x + dx,
            self.origin_ecef.y + dy,
            self.origin_ecef.z + dz,
        )
    }
}
