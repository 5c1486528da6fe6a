//! Session orchestration: start/stop, external events and the per-frame tick.
//!
//! Async completions from external services never touch the runtime
//! directly. Their callbacks push a [`Completion`] into a shared queue that
//! the runtime drains in [`JourneyRuntime::pump`], so every state change
//! happens with `&mut` access on the tick thread.

use foundation::math::{CoordinateConverter, Vec3, Viewport};
use foundation::{ObjectId, ObjectIds};
use runtime::{CompletionQueue, EventBus, EventKind, Frame, GateFault, LoadFailure, LoadingGate};
use scene::{SceneHost, SceneObject, TrackedObjectManager, TrackingSummary};
use tracing::{debug, info, trace, warn};

use crate::config::{ConfigError, RuntimeConfig};
use crate::mode::{ModeContext, NavigationModeController, Transition};
use crate::model::NavigationMode;
use crate::overlay::{PoiOverlay, project_pois};
use crate::services::{
    CameraService, DataService, DetectionTarget, DetectorService, JourneyDataService,
    OrientationService,
};

/// External collaborators handed to the runtime at construction.
pub struct Services<S> {
    pub scene: S,
    pub camera: Box<dyn CameraService>,
    pub detector: Box<dyn DetectorService>,
    pub data: Box<dyn DataService>,
    pub journey: Box<dyn JourneyDataService>,
    pub orientation: Box<dyn OrientationService>,
}

/// Host events. Only delivered while the runtime is running.
#[derive(Debug, Clone, PartialEq)]
pub enum JourneyEvent {
    /// The journey service changed its navigation mode.
    ModeChanged,
    /// Device moved on the ground plane (local frame).
    DeviceMoved { x: f64, z: f64 },
    Resized { width: f64, height: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: Frame,
    pub mode: NavigationMode,
    /// Present only for frames ticked inside a POI.
    pub tracking: Option<TrackingSummary>,
    pub overlays: Vec<PoiOverlay>,
}

#[derive(Debug)]
enum Completion {
    Camera(Result<(), LoadFailure>),
    Presets(Result<(), LoadFailure>),
    Journey(Result<(), LoadFailure>),
    NavigationScene(Result<(), LoadFailure>),
    /// The loading gate drained.
    Settled,
    /// Deferred stop, queued once the start sequence completes.
    Teardown,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Presets {
    Pending,
    Ready,
    Failed,
}

pub struct JourneyRuntime<S> {
    config: RuntimeConfig,
    scene: S,
    camera: Box<dyn CameraService>,
    detector: Box<dyn DetectorService>,
    data: Box<dyn DataService>,
    journey: Box<dyn JourneyDataService>,
    orientation: Box<dyn OrientationService>,

    converter: CoordinateConverter,
    tracker: TrackedObjectManager,
    modes: NavigationModeController,
    ids: ObjectIds,

    indicator: LoadingGate,
    starting: LoadingGate,
    loading: LoadingGate,
    completions: CompletionQueue<Completion>,
    diagnostics: EventBus,

    frame: Frame,
    viewport: Viewport,
    presets: Presets,
    landmarks_waiting: bool,
    journey_requested: bool,
    journey_landmarks: Option<ObjectId>,
    listening: bool,
    running: bool,
}

impl<S: SceneHost> JourneyRuntime<S> {
    pub fn new(
        config: RuntimeConfig,
        services: Services<S>,
        converter: CoordinateConverter,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let indicator = LoadingGate::named("indicator");
        let starting = LoadingGate::named("starting");
        starting.link_to(&indicator);
        let loading = LoadingGate::named("loading");
        loading.link_to(&indicator);

        Ok(Self {
            tracker: TrackedObjectManager::new(config.tracking.tracking_config()),
            modes: NavigationModeController::new(config.boundary),
            diagnostics: EventBus::with_capacity(config.diagnostics_capacity),
            viewport: config.viewport.viewport(),
            scene: services.scene,
            camera: services.camera,
            detector: services.detector,
            data: services.data,
            journey: services.journey,
            orientation: services.orientation,
            converter,
            ids: ObjectIds::new(),
            indicator,
            starting,
            loading,
            completions: CompletionQueue::new(),
            frame: Frame::first(0.0),
            presets: Presets::Pending,
            landmarks_waiting: false,
            journey_requested: false,
            journey_landmarks: None,
            listening: false,
            running: false,
            config,
        })
    }

    /// Running, or on the way there.
    pub fn is_started(&self) -> bool {
        self.running || self.starting.is_loading()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Kick off the load sequence. The runtime starts running once every
    /// load it issued has completed, successfully or not.
    pub fn start(&mut self) {
        if self.is_started() {
            debug!("start ignored, already started");
            return;
        }
        info!("journey runtime starting");
        self.diagnostics.emit(self.frame, EventKind::Lifecycle, "starting");

        self.starting.start();
        // Held across issuing the loads so a synchronous completion can't
        // drain the gate early.
        self.loading.start();
        let queue = self.completions.clone();
        self.loading.on_end(move || queue.push(Completion::Settled));

        self.issue_loads();
        self.end_loading();
        self.pump();
    }

    /// Stop the session. A stop issued mid-start runs once the start
    /// sequence finishes.
    pub fn stop(&mut self) {
        if !self.is_started() {
            return;
        }
        if self.starting.is_loading() {
            debug!("stop deferred until start completes");
            let queue = self.completions.clone();
            self.starting.on_end(move || queue.push(Completion::Teardown));
            return;
        }
        self.teardown();
    }

    /// Apply every queued completion. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(completion) = self.completions.pop() {
            self.complete(completion);
            handled += 1;
        }
        handled
    }

    /// Returns false when the event was dropped because the runtime isn't running.
    pub fn handle_event(&mut self, event: JourneyEvent) -> bool {
        if !self.listening {
            trace!(?event, "event ignored while stopped");
            return false;
        }
        match event {
            JourneyEvent::ModeChanged => {
                let mode = self.journey.mode();
                self.apply_mode(mode);
            }
            JourneyEvent::DeviceMoved { x, z } => {
                let height = self.scene.camera_position().y;
                self.scene.set_viewer_position(Vec3::new(x, height, z));
            }
            JourneyEvent::Resized { width, height } => {
                self.viewport = Viewport::new(width, height);
                self.scene.set_viewport(self.viewport);
            }
        }
        true
    }

    pub fn tick(&mut self, dt_s: f64) -> FrameReport {
        self.pump();
        self.frame = self.frame.next(dt_s);
        if !self.running {
            return FrameReport {
                frame: self.frame,
                mode: self.modes.mode(),
                tracking: None,
                overlays: Vec::new(),
            };
        }

        if let Some(rotation) = self.orientation.update() {
            self.scene.set_viewer_orientation(rotation);
        }
        let tracking = if self.modes.mode() == NavigationMode::InPoi {
            Some(self.update_tracking())
        } else {
            None
        };
        self.scene.render();
        let overlays = project_pois(
            self.journey.pois(),
            &self.scene.camera_transform(),
            self.scene.camera_position(),
            self.viewport,
            &self.config.overlay,
        );
        self.detector.empty();

        FrameReport {
            frame: self.frame,
            mode: self.modes.mode(),
            tracking,
            overlays,
        }
    }

    fn issue_loads(&mut self) {
        if !self.camera.is_active() {
            self.loading.start();
            let queue = self.completions.clone();
            self.camera
                .start(Box::new(move |result| queue.push(Completion::Camera(result))));
        }

        if self.presets != Presets::Ready {
            self.presets = Presets::Pending;
            self.loading.start();
            let queue = self.completions.clone();
            self.data
                .load_presets(Box::new(move |result| queue.push(Completion::Presets(result))));
        }

        if !self.journey_requested {
            self.journey_requested = true;
            self.loading.start();
            let queue = self.completions.clone();
            self.journey.load(
                &self.config.journey_path,
                Box::new(move |result| queue.push(Completion::Journey(result))),
            );
        }

        if !self.detector.is_active() {
            self.detector.start(&self.config.video_source);
        }

        self.loading.start();
        let queue = self.completions.clone();
        self.scene.load(
            &self.config.navigation_scene_path,
            Box::new(move |result| queue.push(Completion::NavigationScene(result))),
        );
    }

    fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Camera(result) => {
                self.record_load("camera", result);
                self.end_loading();
            }
            Completion::Presets(result) => {
                let ready = result.is_ok();
                self.record_load("presets", result);
                self.presets = if ready { Presets::Ready } else { Presets::Failed };
                if self.landmarks_waiting {
                    self.landmarks_waiting = false;
                    if ready {
                        self.add_journey_landmarks();
                    }
                    self.end_loading();
                }
                self.end_loading();
            }
            Completion::Journey(result) => {
                if result.is_ok() {
                    info!(pois = self.journey.pois().len(), "journey loaded");
                    self.request_journey_landmarks();
                }
                self.record_load("journey", result);
                self.end_loading();
            }
            Completion::NavigationScene(result) => {
                self.record_load("navigation scene", result);
                self.end_loading();
            }
            Completion::Settled => self.finish_start(),
            Completion::Teardown => self.teardown(),
        }
    }

    fn record_load(&mut self, what: &str, result: Result<(), LoadFailure>) {
        match result {
            Ok(()) => {
                debug!(what, "loaded");
                self.diagnostics
                    .emit(self.frame, EventKind::Load, format!("{what} loaded"));
            }
            Err(failure) => {
                warn!(what, %failure, "load failed");
                self.diagnostics
                    .emit(self.frame, EventKind::Fault, failure.to_string());
            }
        }
    }

    fn request_journey_landmarks(&mut self) {
        match self.presets {
            Presets::Ready => self.add_journey_landmarks(),
            Presets::Pending => {
                self.landmarks_waiting = true;
                self.loading.start();
            }
            Presets::Failed => warn!("journey landmarks skipped, presets unavailable"),
        }
    }

    fn add_journey_landmarks(&mut self) {
        let Some(content) = self.journey.landmarks() else {
            return;
        };
        if let Some(previous) = self.journey_landmarks.take() {
            self.scene.remove_object(previous);
        }
        let object = SceneObject::new(self.ids.alloc(), content);
        self.scene.add_object(&object);
        self.journey_landmarks = Some(object.id);
    }

    fn finish_start(&mut self) {
        self.journey.start();
        self.listening = true;
        self.orientation.connect();
        self.scene.set_viewport(self.viewport);
        self.running = true;
        info!("journey runtime running");
        self.diagnostics
            .emit(self.frame, EventKind::Lifecycle, "running");
        self.end_starting();
    }

    fn teardown(&mut self) {
        if !self.running {
            return;
        }
        self.listening = false;
        self.orientation.disconnect();
        self.running = false;
        self.detector.stop();
        self.camera.stop();
        info!("journey runtime stopped");
        self.diagnostics
            .emit(self.frame, EventKind::Lifecycle, "stopped");
    }

    fn apply_mode(&mut self, mode: NavigationMode) -> Transition {
        let poi = self.journey.current_poi();
        let mut ctx = ModeContext {
            scene: &mut self.scene,
            detector: self.detector.as_mut(),
            data: self.data.as_ref(),
            tracker: &mut self.tracker,
            converter: &mut self.converter,
            ids: &mut self.ids,
        };
        let transition = self.modes.apply(mode, poi, &mut ctx);
        if transition != Transition::Unchanged {
            self.diagnostics
                .emit(self.frame, EventKind::Mode, format!("{transition:?}"));
        }
        transition
    }

    fn update_tracking(&mut self) -> TrackingSummary {
        for detection in self.detector.poll() {
            let pose = detection.pose;
            match &detection.target {
                DetectionTarget::Channel(channel) => {
                    self.tracker
                        .track_compose(channel, pose.position, pose.rotation, pose.scale);
                }
                DetectionTarget::Tag(tag) => {
                    for channel in self.modes.channels_for_tag(*tag) {
                        self.tracker
                            .track_compose(channel, pose.position, pose.rotation, pose.scale);
                    }
                }
            }
        }
        self.tracker.update(&mut self.scene)
    }

    fn end_loading(&mut self) {
        let result = self.loading.end();
        self.record_fault(result);
    }

    fn end_starting(&mut self) {
        let result = self.starting.end();
        self.record_fault(result);
    }

    fn record_fault(&mut self, result: Result<(), GateFault>) {
        if let Err(fault) = result {
            self.diagnostics
                .emit(self.frame, EventKind::Fault, fault.to_string());
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn camera(&self) -> &dyn CameraService {
        self.camera.as_ref()
    }

    pub fn detector(&self) -> &dyn DetectorService {
        self.detector.as_ref()
    }

    pub fn journey(&self) -> &dyn JourneyDataService {
        self.journey.as_ref()
    }

    pub fn journey_mut(&mut self) -> &mut dyn JourneyDataService {
        self.journey.as_mut()
    }

    pub fn tracker(&self) -> &TrackedObjectManager {
        &self.tracker
    }

    pub fn modes(&self) -> &NavigationModeController {
        &self.modes
    }

    pub fn converter(&self) -> &CoordinateConverter {
        &self.converter
    }

    /// Busy while either the start sequence or any load is in flight.
    pub fn indicator(&self) -> &LoadingGate {
        &self.indicator
    }

    pub fn diagnostics(&self) -> &EventBus {
        &self.diagnostics
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn journey_landmarks(&self) -> Option<ObjectId> {
        self.journey_landmarks
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use foundation::math::{CoordinateConverter, GeoPoint, Vec3};
    use foundation::{ChannelId, PoiId};
    use pretty_assertions::assert_eq;
    use runtime::EventKind;
    use scene::components::{Content, Transform};
    use scene::{SceneHost, World};

    use super::{JourneyEvent, JourneyRuntime, Services};
    use crate::config::RuntimeConfig;
    use crate::memory::{
        DetectionFeed, FeedOrientation, InstantCamera, LoadLatch, MemoryData, MemoryJourney,
        OrientationFeed, ScriptedDetector,
    };
    use crate::model::NavigationMode;
    use crate::services::{Detection, DetectionTarget, DetectorService};
    use crate::testing::fountain;

    struct Harness {
        camera: InstantCamera,
        data: MemoryData,
        journey: MemoryJourney,
        world: World,
        detections: DetectionFeed,
        orientation: OrientationFeed,
    }

    impl Harness {
        fn new() -> Self {
            let (data, poi) = fountain();
            let mut ahead = poi.clone();
            ahead.id = PoiId::new("harbor");
            ahead.name = "Harbor".to_string();
            ahead.position = Vec3::new(0.0, 0.0, -800.0);
            ahead.channels.clear();
            Self {
                camera: InstantCamera::new(),
                data,
                journey: MemoryJourney::new(vec![poi, ahead])
                    .with_landmarks(Content::mesh("skyline")),
                world: World::new(),
                detections: DetectionFeed::new(),
                orientation: OrientationFeed::new(),
            }
        }

        fn build(self) -> (JourneyRuntime<World>, DetectionFeed, OrientationFeed) {
            let detector = ScriptedDetector::with_feed(self.detections.clone());
            self.build_with_detector(Box::new(detector))
        }

        fn build_with_detector(
            self,
            detector: Box<dyn DetectorService>,
        ) -> (JourneyRuntime<World>, DetectionFeed, OrientationFeed) {
            let services = Services {
                scene: self.world,
                camera: Box::new(self.camera),
                detector,
                data: Box::new(self.data),
                journey: Box::new(self.journey),
                orientation: Box::new(FeedOrientation::new(self.orientation.clone())),
            };
            let runtime = JourneyRuntime::new(
                RuntimeConfig::default(),
                services,
                CoordinateConverter::anchored(GeoPoint::new(45.0, 7.0)),
            )
            .expect("valid config");
            (runtime, self.detections, self.orientation)
        }
    }

    /// Counts `start` calls; never reports detections.
    struct CountingDetector {
        starts: Rc<Cell<u32>>,
        active: bool,
    }

    impl DetectorService for CountingDetector {
        fn register_marker(&mut self, _image: &str, _channel: &ChannelId) {}

        fn clear_markers(&mut self) {}

        fn registered_channels(&self) -> Vec<ChannelId> {
            Vec::new()
        }

        fn poll(&mut self) -> Vec<Detection> {
            Vec::new()
        }

        fn empty(&mut self) {}

        fn start(&mut self, _video_source: &str) {
            self.starts.set(self.starts.get() + 1);
            self.active = true;
        }

        fn stop(&mut self) {
            self.active = false;
        }

        fn is_active(&self) -> bool {
            self.active
        }
    }

    fn faults(runtime: &JourneyRuntime<World>) -> Vec<String> {
        runtime
            .diagnostics()
            .of_kind(EventKind::Fault)
            .map(|e| e.message.clone())
            .collect()
    }

    fn assert_settled(runtime: &JourneyRuntime<World>) {
        assert!(runtime.is_running());
        assert!(!runtime.indicator().is_loading());
        for gate in [&runtime.indicator, &runtime.starting, &runtime.loading] {
            assert_eq!(gate.fault_count(), 0, "{} gate", gate.label());
            assert_eq!(gate.pending(), 0, "{} gate", gate.label());
        }
    }

    fn enter_fountain(runtime: &mut JourneyRuntime<World>) {
        runtime.journey_mut().set_current_poi(Some(PoiId::new("fountain")));
        runtime.journey_mut().set_mode(NavigationMode::InPoi);
        assert!(runtime.handle_event(JourneyEvent::ModeChanged));
    }

    fn seen(channel: &str, x: f64) -> Detection {
        Detection {
            target: DetectionTarget::Channel(ChannelId::new(channel)),
            pose: Transform::translate(Vec3::new(x, 0.0, -2.0)),
        }
    }

    #[test]
    fn start_loads_everything_then_runs() {
        let (mut runtime, _, _) = Harness::new().build();

        runtime.start();

        assert!(runtime.is_running());
        assert!(runtime.camera().is_active());
        assert!(runtime.detector().is_active());
        assert!(!runtime.indicator().is_loading());
        assert_eq!(runtime.journey().pois().len(), 2);
        assert_eq!(
            runtime.scene().loaded_assets(),
            &["assets/navigation_scene.json".to_string()]
        );
        let skyline = runtime.journey_landmarks().expect("landmarks added");
        assert_eq!(
            runtime.scene().object(skyline).map(|o| o.content.clone()),
            Some(Content::mesh("skyline"))
        );
    }

    #[test]
    fn journey_failure_still_settles() {
        let mut harness = Harness::new();
        harness.journey.fail_load("offline");
        let (mut runtime, _, _) = harness.build();

        runtime.start();

        assert!(runtime.is_running());
        assert!(runtime.journey().pois().is_empty());
        assert_eq!(runtime.journey_landmarks(), None);
        let faults: Vec<_> = runtime
            .diagnostics()
            .of_kind(EventKind::Fault)
            .map(|e| e.message.clone())
            .collect();
        assert_eq!(faults, vec!["failed to load assets/journey.json: offline".to_string()]);
    }

    #[test]
    fn landmarks_wait_for_presets() {
        let latch = LoadLatch::new();
        let mut harness = Harness::new();
        harness.data = harness.data.with_latch(latch.clone());
        let (mut runtime, _, _) = harness.build();

        runtime.start();
        assert!(!runtime.is_running());
        assert!(runtime.indicator().is_loading());
        assert_eq!(runtime.journey_landmarks(), None);

        assert_eq!(latch.release_all(), 1);
        runtime.pump();

        assert!(runtime.is_running());
        assert!(runtime.journey_landmarks().is_some());
        assert!(!runtime.indicator().is_loading());
    }

    #[test]
    fn presets_failing_while_landmarks_wait_still_settles() {
        let latch = LoadLatch::new();
        let mut harness = Harness::new();
        harness.data = harness.data.with_latch(latch.clone());
        let (mut runtime, _, _) = harness.build();

        runtime.start();
        assert!(!runtime.is_running());
        assert_eq!(latch.pending(), 1);

        assert_eq!(latch.fail_all("offline"), 1);
        runtime.pump();

        assert_settled(&runtime);
        assert_eq!(runtime.journey_landmarks(), None);
        assert_eq!(faults(&runtime), vec!["failed to load presets: offline".to_string()]);
    }

    #[test]
    fn failed_presets_skip_journey_landmarks() {
        let mut harness = Harness::new();
        harness.data.fail_presets("corrupt bundle");
        let (mut runtime, _, _) = harness.build();

        runtime.start();

        assert_settled(&runtime);
        assert_eq!(runtime.journey_landmarks(), None);
        assert_eq!(runtime.journey().pois().len(), 2);
        assert_eq!(
            faults(&runtime),
            vec!["failed to load presets: corrupt bundle".to_string()]
        );
    }

    #[test]
    fn camera_failure_still_settles() {
        let mut harness = Harness::new();
        harness.camera = InstantCamera::failing("no permission");
        let (mut runtime, _, _) = harness.build();

        runtime.start();

        assert_settled(&runtime);
        assert!(!runtime.camera().is_active());
        assert!(runtime.journey_landmarks().is_some());
        assert_eq!(faults(&runtime), vec!["failed to load camera: no permission".to_string()]);
    }

    #[test]
    fn journey_finishing_after_presets_adds_landmarks() {
        let latch = LoadLatch::new();
        let mut harness = Harness::new();
        harness.journey = harness.journey.with_latch(latch.clone());
        let (mut runtime, _, _) = harness.build();

        runtime.start();
        assert!(!runtime.is_running());
        assert!(runtime.indicator().is_loading());
        assert_eq!(runtime.journey_landmarks(), None);

        assert_eq!(latch.release_all(), 1);
        runtime.pump();

        assert_settled(&runtime);
        assert!(runtime.journey_landmarks().is_some());
        assert!(faults(&runtime).is_empty());
        let loads: Vec<_> = runtime
            .diagnostics()
            .of_kind(EventKind::Load)
            .map(|e| e.message.clone())
            .collect();
        assert_eq!(
            loads,
            vec![
                "camera loaded",
                "presets loaded",
                "navigation scene loaded",
                "journey loaded",
            ]
        );
    }

    #[test]
    fn an_already_running_detector_is_not_restarted() {
        let starts = Rc::new(Cell::new(0));
        let detector = CountingDetector {
            starts: Rc::clone(&starts),
            active: true,
        };
        let (mut runtime, _, _) = Harness::new().build_with_detector(Box::new(detector));

        runtime.start();
        assert_settled(&runtime);
        assert_eq!(starts.get(), 0);

        runtime.stop();
        assert!(!runtime.detector().is_active());
        runtime.start();
        assert_eq!(starts.get(), 1);
        assert!(runtime.detector().is_active());
    }

    #[test]
    fn stop_during_start_waits_for_it() {
        let latch = LoadLatch::new();
        let mut harness = Harness::new();
        harness.camera = InstantCamera::new().with_latch(latch.clone());
        let (mut runtime, _, _) = harness.build();

        runtime.start();
        assert!(runtime.is_started());
        runtime.stop();
        assert!(runtime.is_started());

        latch.release_all();
        runtime.pump();

        assert!(!runtime.is_started());
        assert!(!runtime.camera().is_active());
        assert!(!runtime.detector().is_active());
        let lifecycle: Vec<_> = runtime
            .diagnostics()
            .of_kind(EventKind::Lifecycle)
            .map(|e| e.message.clone())
            .collect();
        assert_eq!(lifecycle, vec!["starting", "running", "stopped"]);
    }

    #[test]
    fn second_start_is_ignored() {
        let (mut runtime, _, _) = Harness::new().build();
        runtime.start();
        runtime.start();

        assert_eq!(runtime.scene().loaded_assets().len(), 1);
        runtime.stop();
        assert!(!runtime.is_started());
        runtime.stop();
    }

    #[test]
    fn events_are_dropped_while_stopped() {
        let (mut runtime, _, _) = Harness::new().build();
        assert!(!runtime.handle_event(JourneyEvent::ModeChanged));

        runtime.start();
        runtime.stop();
        assert!(!runtime.handle_event(JourneyEvent::DeviceMoved { x: 1.0, z: 2.0 }));
        assert_eq!(runtime.scene().viewer_position(), Vec3::ZERO);
    }

    #[test]
    fn entering_a_poi_places_the_boundary() {
        let (mut runtime, _, _) = Harness::new().build();
        runtime.start();

        enter_fountain(&mut runtime);

        assert_eq!(runtime.modes().mode(), NavigationMode::InPoi);
        let ring = runtime.modes().boundary().expect("ring");
        let ring = runtime.scene().object(ring).expect("ring in scene");
        assert_eq!(ring.transform.position, Vec3::new(10.0, -3.0, 20.0));
        assert_eq!(ring.transform.scale, Vec3::splat(5.0));
        assert_eq!(runtime.tracker().len(), 2);
    }

    #[test]
    fn tracking_runs_only_inside_a_poi() {
        let (mut runtime, detections, _) = Harness::new().build();
        runtime.start();

        detections.push_frame(vec![seen("statue", 0.0)]);
        let report = runtime.tick(0.016);
        assert_eq!(report.tracking, None);
        assert_eq!(detections.queued(), 1);

        enter_fountain(&mut runtime);
        let report = runtime.tick(0.016);
        let summary = report.tracking.expect("tracking inside poi");
        assert_eq!(summary.attached, vec![ChannelId::new("statue")]);
        assert!(runtime.tracker().is_visible(&ChannelId::new("statue")));
    }

    #[test]
    fn tag_detections_drive_every_bound_channel() {
        let (mut runtime, detections, _) = Harness::new().build();
        runtime.start();
        enter_fountain(&mut runtime);

        detections.push_frame(vec![Detection {
            target: DetectionTarget::Tag(7),
            pose: Transform::translate(Vec3::new(0.5, 0.0, -1.0)),
        }]);
        let report = runtime.tick(0.016);

        assert_eq!(
            report.tracking.map(|t| t.attached),
            Some(vec![ChannelId::new("plaque")])
        );
    }

    #[test]
    fn leaving_clears_poi_state() {
        let (mut runtime, detections, _) = Harness::new().build();
        runtime.start();
        enter_fountain(&mut runtime);
        detections.push_frame(vec![seen("statue", 0.0)]);
        runtime.tick(0.016);
        let skyline = runtime.journey_landmarks().expect("landmarks");

        runtime.journey_mut().set_current_poi(None);
        runtime.journey_mut().set_mode(NavigationMode::Navigating);
        runtime.handle_event(JourneyEvent::ModeChanged);

        assert!(runtime.tracker().is_empty());
        assert!(runtime.detector().registered_channels().is_empty());
        let remaining: Vec<_> = runtime.scene().objects().map(|o| o.id).collect();
        assert_eq!(remaining, vec![skyline]);
    }

    #[test]
    fn overlays_skip_pois_behind_the_camera() {
        let (mut runtime, _, orientation) = Harness::new().build();
        runtime.start();

        // Facing north: the harbor is ahead, the fountain (z = 20) behind.
        let report = runtime.tick(0.016);
        let names: Vec<_> = report.overlays.iter().map(|o| o.name.clone()).collect();
        assert_eq!(names, vec!["Harbor".to_string()]);
        assert_eq!(report.overlays[0].distance_label(), "0.8 km");

        orientation.push_heading_deg(180.0);
        let report = runtime.tick(0.016);
        let names: Vec<_> = report.overlays.iter().map(|o| o.name.clone()).collect();
        assert_eq!(names, vec!["Fountain".to_string()]);
    }

    #[test]
    fn device_moves_keep_camera_height() {
        let (mut runtime, _, _) = Harness::new().build();
        runtime.start();
        runtime
            .scene_mut()
            .set_viewer_position(Vec3::new(0.0, 1.6, 0.0));

        runtime.handle_event(JourneyEvent::DeviceMoved { x: 4.0, z: -9.0 });
        runtime.handle_event(JourneyEvent::Resized {
            width: 400.0,
            height: 300.0,
        });

        assert_eq!(runtime.scene().viewer_position(), Vec3::new(4.0, 1.6, -9.0));
        assert_eq!(runtime.scene().viewport().width, 400.0);
    }

    #[test]
    fn ticks_while_stopped_only_advance_the_frame() {
        let (mut runtime, _, _) = Harness::new().build();

        let report = runtime.tick(0.5);

        assert_eq!(report.frame.index, 1);
        assert!(report.overlays.is_empty());
        assert_eq!(runtime.scene().frames_rendered(), 0);
    }
}
