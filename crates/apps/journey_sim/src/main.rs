mod scenario;
mod walk;

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use foundation::math::Vec3;
use foundation::ChannelId;
use journey::geofence;
use journey::memory::{
    DetectionFeed, FeedOrientation, InstantCamera, OrientationFeed, ScriptedDetector,
};
use journey::{
    Detection, DetectionTarget, FrameReport, JourneyEvent, JourneyRuntime, NavigationMode,
    RuntimeConfig, Services,
};
use runtime::EventKind;
use scene::components::Transform;
use scene::{SceneHost, World};
use serde::Serialize;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::scenario::Scenario;
use crate::walk::Walker;

const EYE_HEIGHT_M: f64 = 1.6;
const MARKER_DISTANCE_M: f64 = 2.0;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless walk-through of an AR journey")]
struct Args {
    /// Journey scenario (anchor, route, POIs, markers, contents)
    #[arg(long, default_value = "crates/apps/journey_sim/assets/journey.json")]
    journey: PathBuf,

    /// Runtime config (JSON); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Walking speed in meters per second
    #[arg(long, default_value_t = 1.4)]
    speed: f64,

    /// Simulated frame rate
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Hard stop for the simulation
    #[arg(long, default_value_t = 50_000)]
    max_frames: u64,

    /// Frames a marker stays in view before dropping out for half as long
    #[arg(long, default_value_t = 60)]
    marker_period: u64,

    /// Override tracking.lost_after_frames
    #[arg(long)]
    lost_after: Option<u32>,

    /// Override tracking.smoothing
    #[arg(long)]
    smoothing: Option<f64>,

    /// Print the final summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    frames: u64,
    distance_m: f64,
    pois_entered: Vec<String>,
    attached: usize,
    detached: usize,
    max_overlays: usize,
    faults: Vec<String>,
    diagnostics_dropped: u64,
}

impl Summary {
    fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        self.max_overlays = self.max_overlays.max(report.overlays.len());
        if let Some(tracking) = &report.tracking {
            self.attached += tracking.attached.len();
            self.detached += tracking.detached.len();
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run(Args::parse()) {
        error!(%err, "simulation failed");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };
    if let Some(frames) = args.lost_after {
        config.tracking.lost_after_frames = frames;
    }
    if let Some(smoothing) = args.smoothing {
        config.tracking.smoothing = smoothing;
    }
    if args.fps <= 0.0 {
        return Err("--fps must be positive".into());
    }

    let scenario = Scenario::load(&args.journey)?;
    let resolved = scenario.resolve()?;
    info!(
        journey = %args.journey.display(),
        pois = scenario.pois.len(),
        waypoints = resolved.route.len(),
        "scenario loaded"
    );

    let detections = DetectionFeed::new();
    let orientation = OrientationFeed::new();
    let services = Services {
        scene: World::with_lens(config.lens()),
        camera: Box::new(InstantCamera::new()),
        detector: Box::new(ScriptedDetector::with_feed(detections.clone())),
        data: Box::new(resolved.data),
        journey: Box::new(resolved.journey),
        orientation: Box::new(FeedOrientation::new(orientation.clone())),
    };
    let mut runtime = JourneyRuntime::new(config, services, resolved.converter)?;
    runtime
        .scene_mut()
        .set_viewer_position(Vec3::new(0.0, EYE_HEIGHT_M, 0.0));

    runtime.start();
    if !runtime.is_running() {
        return Err("runtime did not finish starting".into());
    }

    let mut walker = Walker::new(resolved.route, args.speed);
    let dt = 1.0 / args.fps;
    let mut summary = Summary::default();

    for frame in 0..args.max_frames {
        let position = walker.position();
        if let Some(mode) = geofence::locate(runtime.journey_mut(), position) {
            runtime.handle_event(JourneyEvent::ModeChanged);
            if mode == NavigationMode::InPoi {
                if let Some(poi) = runtime.modes().active_poi() {
                    info!(%poi, frame, "entered poi");
                    summary.pois_entered.push(poi.to_string());
                }
            }
        }
        runtime.handle_event(JourneyEvent::DeviceMoved {
            x: position.x,
            z: position.z,
        });
        orientation.push_heading_deg(walker.heading_deg());

        if runtime.modes().mode() == NavigationMode::InPoi
            && marker_in_view(frame, args.marker_period)
        {
            detections.push_frame(visible_markers(&runtime, &walker, &resolved.markers));
        }

        let report = runtime.tick(dt);
        if frame % args.fps.round().max(1.0) as u64 == 0 {
            let names: Vec<String> = report
                .overlays
                .iter()
                .map(|o| format!("{} {}", o.name, o.distance_label()))
                .collect();
            debug!(frame, mode = ?report.mode, overlays = ?names, "frame");
        }
        summary.record(&report);

        if !walker.advance(dt) {
            break;
        }
    }

    runtime.stop();
    summary.distance_m = walker.travelled();
    summary.faults = runtime
        .diagnostics()
        .of_kind(EventKind::Fault)
        .map(|e| e.message.clone())
        .collect();
    summary.diagnostics_dropped = runtime.diagnostics().dropped();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!(
            frames = summary.frames,
            distance_m = summary.distance_m,
            pois = ?summary.pois_entered,
            attached = summary.attached,
            detached = summary.detached,
            faults = summary.faults.len(),
            "simulation finished"
        );
    }
    Ok(())
}

fn marker_in_view(frame: u64, period: u64) -> bool {
    let period = period.max(1);
    frame % (period + period / 2) < period
}

/// Detections for every channel of the current POI, placed just ahead of the walker.
fn visible_markers(
    runtime: &JourneyRuntime<World>,
    walker: &Walker,
    markers: &BTreeMap<ChannelId, Option<u32>>,
) -> Vec<Detection> {
    let Some(poi) = runtime.journey().current_poi() else {
        return Vec::new();
    };
    let pose = Transform::translate(walker.ahead(MARKER_DISTANCE_M, EYE_HEIGHT_M));
    poi.channels
        .iter()
        .map(|channel| {
            let target = match markers.get(&channel.uuid).copied().flatten() {
                Some(tag) => DetectionTarget::Tag(tag),
                None => DetectionTarget::Channel(channel.uuid.clone()),
            };
            Detection { target, pose }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::marker_in_view;

    #[test]
    fn markers_drop_out_for_half_a_period() {
        let visible: Vec<bool> = (0..9).map(|f| marker_in_view(f, 4)).collect();
        assert_eq!(
            visible,
            vec![true, true, true, true, false, false, true, true, true]
        );
    }
}
