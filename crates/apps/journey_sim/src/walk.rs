use foundation::math::{LocalPosition, Vec3};

/// Constant-speed walk along a polyline in the local frame.
#[derive(Debug, Clone)]
pub struct Walker {
    route: Vec<LocalPosition>,
    segment: usize,
    along: f64,
    speed: f64,
    travelled: f64,
}

impl Walker {
    pub fn new(route: Vec<LocalPosition>, speed_mps: f64) -> Self {
        Self {
            route,
            segment: 0,
            along: 0.0,
            speed: speed_mps.max(0.0),
            travelled: 0.0,
        }
    }

    pub fn finished(&self) -> bool {
        self.segment + 1 >= self.route.len()
    }

    pub fn travelled(&self) -> f64 {
        self.travelled
    }

    pub fn position(&self) -> LocalPosition {
        match (self.route.get(self.segment), self.route.get(self.segment + 1)) {
            (Some(&a), Some(&b)) => {
                let len = a.distance(b);
                if len <= 1e-9 {
                    a
                } else {
                    a.lerp(b, self.along / len)
                }
            }
            (Some(&a), None) => a,
            _ => Vec3::ZERO,
        }
    }

    /// Compass heading of the current segment, degrees clockwise from north.
    pub fn heading_deg(&self) -> f64 {
        let (Some(&a), Some(&b)) = (self.route.get(self.segment), self.route.get(self.segment + 1))
        else {
            return 0.0;
        };
        let d = b - a;
        // North is -z.
        d.x.atan2(-d.z).to_degrees().rem_euclid(360.0)
    }

    /// Point `distance` meters ahead of the walker at eye level.
    pub fn ahead(&self, distance: f64, eye_height: f64) -> LocalPosition {
        let h = self.heading_deg().to_radians();
        let p = self.position();
        Vec3::new(p.x + h.sin() * distance, eye_height, p.z - h.cos() * distance)
    }

    /// Move forward by `dt_s` seconds. Returns false once the route is done.
    pub fn advance(&mut self, dt_s: f64) -> bool {
        let mut step = self.speed * dt_s;
        while step > 0.0 && !self.finished() {
            let len = self.route[self.segment].distance(self.route[self.segment + 1]);
            let left = len - self.along;
            if step < left {
                self.along += step;
                self.travelled += step;
                step = 0.0;
            } else {
                self.travelled += left;
                step -= left;
                self.segment += 1;
                self.along = 0.0;
            }
        }
        !self.finished()
    }
}
