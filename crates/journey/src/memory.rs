//! In-memory collaborators for headless runs and tests.
//!
//! Loads complete synchronously unless a [`LoadLatch`] is attached. Sensor
//! style inputs (detections, orientation) are fed through shared handles so
//! they can be driven after the service has been handed to the runtime.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use foundation::math::{Quat, Vec3};
use foundation::{ChannelId, ContentRef, MarkerRef, PoiId};
use runtime::{LoadCallback, LoadFailure};
use scene::components::Content;
use tracing::debug;

use crate::model::{Channel, MarkerAsset, NavigationMode, Poi};
use crate::services::{
    CameraService, DataService, Detection, DetectorService, JourneyDataService, OrientationService,
};

/// Holds completion callbacks until the test or host releases them.
#[derive(Clone, Default)]
pub struct LoadLatch {
    pending: Rc<RefCell<Vec<(String, LoadCallback)>>>,
}

impl LoadLatch {
    pub fn new() -> Self {
        Self::default()
    }

    fn hold(&self, target: &str, done: LoadCallback) {
        self.pending.borrow_mut().push((target.to_string(), done));
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Complete every held load successfully, in the order they were held.
    pub fn release_all(&self) -> usize {
        let held = std::mem::take(&mut *self.pending.borrow_mut());
        let count = held.len();
        for (_, done) in held {
            done(Ok(()));
        }
        count
    }

    pub fn fail_all(&self, reason: &str) -> usize {
        let held = std::mem::take(&mut *self.pending.borrow_mut());
        let count = held.len();
        for (target, done) in held {
            done(Err(LoadFailure::new(target, reason)));
        }
        count
    }
}

fn complete(latch: &Option<LoadLatch>, target: &str, result: Result<(), LoadFailure>, done: LoadCallback) {
    match (latch, result) {
        (Some(latch), Ok(())) => latch.hold(target, done),
        (_, result) => done(result),
    }
}

#[derive(Default)]
pub struct InstantCamera {
    active: bool,
    failure: Option<String>,
    latch: Option<LoadLatch>,
}

impl InstantCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn with_latch(mut self, latch: LoadLatch) -> Self {
        self.latch = Some(latch);
        self
    }
}

impl CameraService for InstantCamera {
    fn start(&mut self, done: LoadCallback) {
        let result = match &self.failure {
            Some(reason) => Err(LoadFailure::new("camera", reason.clone())),
            None => {
                self.active = true;
                Ok(())
            }
        };
        complete(&self.latch, "camera", result, done);
    }

    fn stop(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Per-frame detection results waiting to be polled.
#[derive(Clone, Default)]
pub struct DetectionFeed {
    frames: Rc<RefCell<VecDeque<Vec<Detection>>>>,
}

impl DetectionFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&self, detections: Vec<Detection>) {
        self.frames.borrow_mut().push_back(detections);
    }

    pub fn queued(&self) -> usize {
        self.frames.borrow().len()
    }

    fn next(&self) -> Vec<Detection> {
        self.frames.borrow_mut().pop_front().unwrap_or_default()
    }
}

/// Detector that replays one queued frame of results per poll.
#[derive(Default)]
pub struct ScriptedDetector {
    feed: DetectionFeed,
    markers: Vec<(String, ChannelId)>,
    current: Vec<Detection>,
    source: Option<String>,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(feed: DetectionFeed) -> Self {
        Self {
            feed,
            ..Self::default()
        }
    }

    pub fn marker_images(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(|(image, _)| image.as_str())
    }
}

impl DetectorService for ScriptedDetector {
    fn register_marker(&mut self, image: &str, channel: &ChannelId) {
        self.markers.push((image.to_string(), channel.clone()));
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }

    fn registered_channels(&self) -> Vec<ChannelId> {
        self.markers.iter().map(|(_, channel)| channel.clone()).collect()
    }

    fn poll(&mut self) -> Vec<Detection> {
        self.current = self.feed.next();
        self.current.clone()
    }

    fn empty(&mut self) {
        self.current.clear();
    }

    fn start(&mut self, video_source: &str) {
        debug!(video_source, "detector started");
        self.source = Some(video_source.to_string());
    }

    fn stop(&mut self) {
        self.source = None;
    }

    fn is_active(&self) -> bool {
        self.source.is_some()
    }
}

#[derive(Default)]
pub struct MemoryData {
    channels: BTreeMap<ChannelId, Channel>,
    markers: BTreeMap<MarkerRef, MarkerAsset>,
    catalog: BTreeMap<ContentRef, Content>,
    failure: Option<String>,
    latch: Option<LoadLatch>,
}

impl MemoryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_channel(&mut self, channel: Channel, marker: MarkerAsset) {
        self.markers.insert(marker.reference.clone(), marker);
        self.channels.insert(channel.uuid.clone(), channel);
    }

    pub fn insert_content(&mut self, reference: ContentRef, content: Content) {
        self.catalog.insert(reference, content);
    }

    pub fn fail_presets(&mut self, reason: impl Into<String>) {
        self.failure = Some(reason.into());
    }

    pub fn with_latch(mut self, latch: LoadLatch) -> Self {
        self.latch = Some(latch);
        self
    }
}

impl DataService for MemoryData {
    fn load_presets(&mut self, done: LoadCallback) {
        let result = match &self.failure {
            Some(reason) => Err(LoadFailure::new("presets", reason.clone())),
            None => Ok(()),
        };
        complete(&self.latch, "presets", result, done);
    }

    fn get_channel(&self, uuid: &ChannelId) -> Option<Channel> {
        self.channels.get(uuid).cloned()
    }

    fn get_marker(&self, reference: &MarkerRef) -> Option<MarkerAsset> {
        self.markers.get(reference).cloned()
    }

    fn build_content(&self, uuid: &ChannelId) -> Option<Content> {
        let channel = self.channels.get(uuid)?;
        self.catalog.get(&channel.content).cloned()
    }

    fn build_landmark(&self, object: &ContentRef) -> Option<Content> {
        self.catalog.get(object).cloned()
    }
}

#[derive(Default)]
pub struct MemoryJourney {
    staged: Vec<Poi>,
    pois: Vec<Poi>,
    current: Option<PoiId>,
    mode: NavigationMode,
    landmarks: Option<Content>,
    started: bool,
    failure: Option<String>,
    latch: Option<LoadLatch>,
}

impl MemoryJourney {
    pub fn new(pois: Vec<Poi>) -> Self {
        Self {
            staged: pois,
            ..Self::default()
        }
    }

    pub fn with_landmarks(mut self, landmarks: Content) -> Self {
        self.landmarks = Some(landmarks);
        self
    }

    pub fn with_latch(mut self, latch: LoadLatch) -> Self {
        self.latch = Some(latch);
        self
    }

    pub fn fail_load(&mut self, reason: impl Into<String>) {
        self.failure = Some(reason.into());
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl JourneyDataService for MemoryJourney {
    fn load(&mut self, path: &str, done: LoadCallback) {
        let result = match &self.failure {
            Some(reason) => Err(LoadFailure::new(path, reason.clone())),
            None => {
                self.pois = std::mem::take(&mut self.staged);
                Ok(())
            }
        };
        complete(&self.latch, path, result, done);
    }

    fn start(&mut self) {
        self.started = true;
    }

    fn pois(&self) -> &[Poi] {
        &self.pois
    }

    fn current_poi(&self) -> Option<&Poi> {
        let current = self.current.as_ref()?;
        self.pois.iter().find(|poi| &poi.id == current)
    }

    fn set_current_poi(&mut self, poi: Option<PoiId>) {
        self.current = poi;
    }

    fn mode(&self) -> NavigationMode {
        self.mode
    }

    fn set_mode(&mut self, mode: NavigationMode) {
        self.mode = mode;
    }

    fn landmarks(&self) -> Option<Content> {
        self.landmarks.clone()
    }
}

/// Latest orientation reading, shared between the sensor side and the service.
#[derive(Clone, Default)]
pub struct OrientationFeed {
    latest: Rc<RefCell<Option<Quat>>>,
}

impl OrientationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, rotation: Quat) {
        *self.latest.borrow_mut() = Some(rotation);
    }

    /// Camera heading in degrees clockwise from north, level with the horizon.
    pub fn push_heading_deg(&self, heading_deg: f64) {
        self.push(Quat::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), -heading_deg.to_radians()));
    }
}

#[derive(Default)]
pub struct FeedOrientation {
    feed: OrientationFeed,
    connected: bool,
}

impl FeedOrientation {
    pub fn new(feed: OrientationFeed) -> Self {
        Self {
            feed,
            connected: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

impl OrientationService for FeedOrientation {
    fn connect(&mut self) {
        self.connected = true;
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn update(&mut self) -> Option<Quat> {
        if !self.connected {
            return None;
        }
        self.feed.latest.borrow_mut().take()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use foundation::math::{Quat, Vec3};
    use foundation::ChannelId;
    use pretty_assertions::assert_eq;
    use scene::components::Transform;

    use super::{
        DetectionFeed, FeedOrientation, InstantCamera, LoadLatch, MemoryData, MemoryJourney,
        OrientationFeed, ScriptedDetector,
    };
    use crate::services::{
        CameraService, DataService, Detection, DetectionTarget, DetectorService,
        JourneyDataService, OrientationService,
    };
    use crate::testing::fountain;

    #[test]
    fn latch_holds_successful_loads_only() {
        let latch = LoadLatch::new();
        let results = Rc::new(RefCell::new(Vec::new()));

        let mut camera = InstantCamera::new().with_latch(latch.clone());
        let sink = Rc::clone(&results);
        camera.start(Box::new(move |r| sink.borrow_mut().push(r.is_ok())));
        let mut broken = InstantCamera::failing("no permission").with_latch(latch.clone());
        let sink = Rc::clone(&results);
        broken.start(Box::new(move |r| sink.borrow_mut().push(r.is_ok())));

        assert_eq!(*results.borrow(), vec![false]);
        assert_eq!(latch.release_all(), 1);
        assert_eq!(*results.borrow(), vec![false, true]);
        assert!(camera.is_active());
        assert!(!broken.is_active());
    }

    #[test]
    fn detector_replays_one_frame_per_poll() {
        let feed = DetectionFeed::new();
        let mut detector = ScriptedDetector::with_feed(feed.clone());
        feed.push_frame(vec![Detection {
            target: DetectionTarget::Tag(3),
            pose: Transform::translate(Vec3::new(0.0, 0.0, -1.0)),
        }]);

        assert_eq!(detector.poll().len(), 1);
        detector.empty();
        assert!(detector.poll().is_empty());

        detector.register_marker("a.png", &ChannelId::new("a"));
        assert_eq!(detector.registered_channels(), vec![ChannelId::new("a")]);
        detector.clear_markers();
        assert!(detector.registered_channels().is_empty());
    }

    #[test]
    fn orientation_reports_only_when_connected() {
        let feed = OrientationFeed::new();
        let mut sensor = FeedOrientation::new(feed.clone());
        feed.push(Quat::IDENTITY);
        assert!(!sensor.is_connected());
        assert_eq!(sensor.update(), None);

        sensor.connect();
        assert!(sensor.is_connected());
        assert_eq!(sensor.update(), Some(Quat::IDENTITY));
        assert_eq!(sensor.update(), None);

        feed.push(Quat::IDENTITY);
        sensor.disconnect();
        assert!(!sensor.is_connected());
        assert_eq!(sensor.update(), None);
    }

    #[test]
    fn journey_publishes_pois_on_load_and_starts_on_request() {
        let latch = LoadLatch::new();
        let (_, poi) = fountain();
        let mut journey = MemoryJourney::new(vec![poi]).with_latch(latch.clone());
        assert!(journey.pois().is_empty());

        let loaded = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&loaded);
        journey.load("walk.json", Box::new(move |r| *sink.borrow_mut() = Some(r.is_ok())));
        assert_eq!(*loaded.borrow(), None);
        assert_eq!(latch.pending(), 1);

        latch.release_all();
        assert_eq!(*loaded.borrow(), Some(true));
        assert_eq!(journey.pois().len(), 1);
        assert!(!journey.is_started());

        journey.start();
        assert!(journey.is_started());
    }

    #[test]
    fn failed_latch_reports_the_held_target() {
        let latch = LoadLatch::new();
        let mut data = MemoryData::new().with_latch(latch.clone());
        let failure = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&failure);
        data.load_presets(Box::new(move |r| *sink.borrow_mut() = r.err()));

        assert_eq!(latch.fail_all("timeout"), 1);
        assert_eq!(latch.pending(), 0);
        assert_eq!(
            failure.borrow().as_ref().map(|f| f.to_string()),
            Some("failed to load presets: timeout".to_string())
        );
    }

    #[test]
    fn heading_east_turns_camera_to_positive_x() {
        let feed = OrientationFeed::new();
        let mut sensor = FeedOrientation::new(feed.clone());
        sensor.connect();
        feed.push_heading_deg(90.0);

        let rotation = sensor.update().expect("reading");
        let forward = rotation.rotate(Vec3::new(0.0, 0.0, -1.0));
        assert!((forward.x - 1.0).abs() < 1e-9);
        assert!(forward.z.abs() < 1e-9);
    }
}
