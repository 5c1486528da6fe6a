/// Per-render-frame metadata.
///
/// Frames follow the display refresh, so `dt_s` is whatever the host
/// measured for this frame rather than a fixed step.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Seconds since the previous frame.
    pub dt_s: f64,
    /// Accumulated session time at this frame (seconds).
    pub time_s: f64,
}

impl Frame {
    pub fn first(dt_s: f64) -> Self {
        Self {
            index: 0,
            dt_s,
            time_s: 0.0,
        }
    }

    pub fn next(self, dt_s: f64) -> Self {
        Self {
            index: self.index + 1,
            dt_s,
            time_s: self.time_s + dt_s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Frame;

    #[test]
    fn next_accumulates_variable_deltas() {
        let f0 = Frame::first(0.016);
        let f1 = f0.next(0.020);
        let f2 = f1.next(0.010);
        assert_eq!(f2.index, 2);
        assert_eq!(f2.dt_s, 0.010);
        assert!((f2.time_s - 0.030).abs() < 1e-12);
    }
}
