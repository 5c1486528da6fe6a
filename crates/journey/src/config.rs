use std::fmt;
use std::fs;
use std::path::Path;

use foundation::math::Viewport;
use scene::{CameraLens, TrackingConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "config read failed: {err}"),
            ConfigError::Parse(err) => write!(f, "config parse failed: {err}"),
            ConfigError::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl ViewportSettings {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingSettings {
    pub smoothing: f64,
    pub lost_after_frames: u32,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        let defaults = TrackingConfig::default();
        Self {
            smoothing: defaults.smoothing,
            lost_after_frames: defaults.lost_after_frames,
        }
    }
}

impl TrackingSettings {
    pub fn tracking_config(&self) -> TrackingConfig {
        TrackingConfig {
            smoothing: self.smoothing,
            lost_after_frames: self.lost_after_frames,
        }
    }
}

/// Geometry of the ring drawn around the active POI. The ring is scaled by
/// the POI radius, so the radii here are relative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryStyle {
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// Vertical offset below the local origin, in meters.
    pub height: f64,
}

impl Default for BoundaryStyle {
    fn default() -> Self {
        Self {
            inner_radius: 1.0,
            outer_radius: 1.3,
            height: -3.0,
        }
    }
}

/// Screen layout of POI bubbles, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayLayout {
    pub bubble_width: f64,
    pub bubble_height: f64,
    pub corner_radius: f64,
    /// Distance of the bubble anchor from the bottom edge.
    pub bottom_offset: f64,
}

impl Default for OverlayLayout {
    fn default() -> Self {
        Self {
            bubble_width: 130.0,
            bubble_height: 75.0,
            corner_radius: 10.0,
            bottom_offset: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub journey_path: String,
    pub navigation_scene_path: String,
    pub video_source: String,
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
    pub viewport: ViewportSettings,
    pub tracking: TrackingSettings,
    pub boundary: BoundaryStyle,
    pub overlay: OverlayLayout,
    pub diagnostics_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let lens = CameraLens::default();
        Self {
            journey_path: "assets/journey.json".to_string(),
            navigation_scene_path: "assets/navigation_scene.json".to_string(),
            video_source: "camera".to_string(),
            fov_deg: lens.fov_y_rad.to_degrees(),
            near: lens.near,
            far: lens.far,
            viewport: ViewportSettings::default(),
            tracking: TrackingSettings::default(),
            boundary: BoundaryStyle::default(),
            overlay: OverlayLayout::default(),
            diagnostics_capacity: 256,
        }
    }
}

impl RuntimeConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tracking.smoothing > 0.0 && self.tracking.smoothing <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "tracking.smoothing must be in (0, 1], got {}",
                self.tracking.smoothing
            )));
        }
        if !(self.fov_deg > 0.0 && self.fov_deg < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "fov_deg must be in (0, 180), got {}",
                self.fov_deg
            )));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(ConfigError::Invalid("expected 0 < near < far".to_string()));
        }
        if self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            return Err(ConfigError::Invalid("viewport must be non-empty".to_string()));
        }
        Ok(())
    }

    pub fn lens(&self) -> CameraLens {
        CameraLens {
            fov_y_rad: self.fov_deg.to_radians(),
            near: self.near,
            far: self.far,
        }
    }
}
