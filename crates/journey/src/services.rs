//! Contracts with the external collaborators the runtime drives.
//!
//! All of them are called from the tick thread. Anything slow reports back
//! through a [`LoadCallback`] instead of blocking.

use foundation::math::Quat;
use foundation::{ChannelId, ContentRef, MarkerRef, PoiId};
use runtime::LoadCallback;
use scene::components::{Content, Transform};

use crate::model::{Channel, MarkerAsset, NavigationMode, Poi};

pub trait CameraService {
    fn start(&mut self, done: LoadCallback);
    fn stop(&mut self);
    fn is_active(&self) -> bool;
}

/// What the detector recognised in the current frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionTarget {
    /// An image marker registered for this channel.
    Channel(ChannelId),
    /// A fiducial tag, identified by its numeric id.
    Tag(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub target: DetectionTarget,
    /// Pose of the marker in the scene frame.
    pub pose: Transform,
}

pub trait DetectorService {
    fn register_marker(&mut self, image: &str, channel: &ChannelId);
    fn clear_markers(&mut self);
    fn registered_channels(&self) -> Vec<ChannelId>;
    /// Run detection on the latest camera frame.
    fn poll(&mut self) -> Vec<Detection>;
    /// Drop per-frame scratch state; called at the end of every tick.
    fn empty(&mut self);
    fn start(&mut self, video_source: &str);
    fn stop(&mut self);
    fn is_active(&self) -> bool;
}

/// Tracking data: channels, markers and the content they anchor.
pub trait DataService {
    fn load_presets(&mut self, done: LoadCallback);
    fn get_channel(&self, uuid: &ChannelId) -> Option<Channel>;
    fn get_marker(&self, reference: &MarkerRef) -> Option<MarkerAsset>;
    fn build_content(&self, uuid: &ChannelId) -> Option<Content>;
    fn build_landmark(&self, object: &ContentRef) -> Option<Content>;
}

/// The journey itself: its POIs, the current POI and the navigation mode.
pub trait JourneyDataService {
    /// Load and install the journey at `path`.
    fn load(&mut self, path: &str, done: LoadCallback);
    /// Begin publishing position and mode updates.
    fn start(&mut self);
    fn pois(&self) -> &[Poi];
    fn current_poi(&self) -> Option<&Poi>;
    fn set_current_poi(&mut self, poi: Option<PoiId>);
    fn mode(&self) -> NavigationMode;
    fn set_mode(&mut self, mode: NavigationMode);
    /// Journey-wide landmark content, shown for the whole session.
    fn landmarks(&self) -> Option<Content>;
}

/// Device orientation sensor fusion.
pub trait OrientationService {
    fn connect(&mut self);
    fn disconnect(&mut self);
    /// Latest camera orientation, if the sensors produced one since the last call.
    fn update(&mut self) -> Option<Quat>;
}
