//! Scene setup and teardown around POI visits.
//!
//! Entering a POI registers its markers, binds their content to the
//! tracker, and adds the boundary ring and the POI landmarks. Leaving undoes
//! all of it. Both run to completion inside one [`NavigationModeController::apply`]
//! call, so no frame ever observes a half-entered POI.

use std::collections::BTreeMap;

use foundation::math::{CoordinateConverter, Quat, Vec3};
use foundation::{ChannelId, ObjectId, ObjectIds, PoiId};
use scene::components::{Content, Transform};
use scene::{SceneHost, SceneObject, TrackHook, TrackedObjectManager};
use tracing::{debug, info, warn};

use crate::config::BoundaryStyle;
use crate::model::{NavigationMode, Poi};
use crate::services::{DataService, DetectorService};

/// Everything a mode transition touches, borrowed for the duration of one call.
pub struct ModeContext<'a> {
    pub scene: &'a mut dyn SceneHost,
    pub detector: &'a mut dyn DetectorService,
    pub data: &'a dyn DataService,
    pub tracker: &'a mut TrackedObjectManager,
    pub converter: &'a mut CoordinateConverter,
    pub ids: &'a mut ObjectIds,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Requested mode equals the current one.
    Unchanged,
    /// Switched between the navigation variants.
    Switched(NavigationMode),
    Entered(PoiId),
    Exited(PoiId),
    /// `InPoi` requested with no current POI; the mode is left as it was.
    Rejected,
}

#[derive(Debug)]
pub struct NavigationModeController {
    mode: NavigationMode,
    active_poi: Option<PoiId>,
    boundary: Option<ObjectId>,
    landmarks: Vec<ObjectId>,
    tag_channels: BTreeMap<u32, Vec<ChannelId>>,
    style: BoundaryStyle,
}

impl Default for NavigationModeController {
    fn default() -> Self {
        Self::new(BoundaryStyle::default())
    }
}

impl NavigationModeController {
    pub fn new(style: BoundaryStyle) -> Self {
        Self {
            mode: NavigationMode::Navigating,
            active_poi: None,
            boundary: None,
            landmarks: Vec::new(),
            tag_channels: BTreeMap::new(),
            style,
        }
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn active_poi(&self) -> Option<&PoiId> {
        self.active_poi.as_ref()
    }

    pub fn boundary(&self) -> Option<ObjectId> {
        self.boundary
    }

    pub fn landmarks(&self) -> &[ObjectId] {
        &self.landmarks
    }

    /// Channels bound to a fiducial tag of the active POI.
    pub fn channels_for_tag(&self, tag: u32) -> &[ChannelId] {
        self.tag_channels.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Move to `next`. `poi` is the journey's current POI, needed only when
    /// entering.
    pub fn apply(
        &mut self,
        next: NavigationMode,
        poi: Option<&Poi>,
        ctx: &mut ModeContext<'_>,
    ) -> Transition {
        if next == self.mode {
            return Transition::Unchanged;
        }

        match next {
            NavigationMode::InPoi => {
                let Some(poi) = poi else {
                    warn!(mode = ?self.mode, "in_poi requested without a current poi");
                    return Transition::Rejected;
                };
                self.enter(poi, ctx);
                self.mode = next;
                Transition::Entered(poi.id.clone())
            }
            NavigationMode::Navigating | NavigationMode::ForcedNavigating => {
                let exited = self.exit(ctx);
                self.mode = next;
                match exited {
                    Some(id) => Transition::Exited(id),
                    None => Transition::Switched(next),
                }
            }
        }
    }

    fn enter(&mut self, poi: &Poi, ctx: &mut ModeContext<'_>) {
        info!(poi = %poi.id, channels = poi.channels.len(), "entering poi");
        self.bind_channels(poi, ctx);

        let ring = SceneObject::new(
            ctx.ids.alloc(),
            Content::Boundary {
                inner_radius: self.style.inner_radius,
                outer_radius: self.style.outer_radius,
            },
        )
        .with_transform(
            Transform::translate(Vec3::new(poi.position.x, self.style.height, poi.position.z))
                .with_rotation(Quat::from_axis_angle(
                    Vec3::new(1.0, 0.0, 0.0),
                    -std::f64::consts::FRAC_PI_2,
                ))
                .with_uniform_scale(poi.radius),
        );
        ctx.scene.add_object(&ring);
        self.boundary = Some(ring.id);

        for channel in &poi.channels {
            let Some(placement) = &channel.landmark else {
                continue;
            };
            let Some(content) = ctx.data.build_landmark(&placement.object) else {
                warn!(object = %placement.object, "landmark content unavailable");
                continue;
            };
            let position = ctx.converter.convert_point(&placement.location);
            let landmark = SceneObject::new(ctx.ids.alloc(), content)
                .with_transform(Transform::translate(position).with_uniform_scale(placement.scale));
            ctx.scene.add_object(&landmark);
            self.landmarks.push(landmark.id);
        }
        self.active_poi = Some(poi.id.clone());
    }

    fn bind_channels(&mut self, poi: &Poi, ctx: &mut ModeContext<'_>) {
        for entry in &poi.channels {
            let Some(channel) = ctx.data.get_channel(&entry.uuid) else {
                warn!(channel = %entry.uuid, "unknown channel");
                continue;
            };
            let Some(marker) = ctx.data.get_marker(&channel.marker) else {
                warn!(channel = %channel.uuid, marker = %channel.marker, "unknown marker");
                continue;
            };
            ctx.detector.register_marker(&marker.image, &channel.uuid);
            if let Some(tag) = marker.tag_id {
                self.tag_channels
                    .entry(tag)
                    .or_default()
                    .push(channel.uuid.clone());
            }

            let Some(content) = ctx.data.build_content(&channel.uuid) else {
                warn!(channel = %channel.uuid, "channel content unavailable");
                continue;
            };
            let object = SceneObject::new(ctx.ids.alloc(), content);
            ctx.tracker
                .add(object, channel.uuid.clone(), attach_hook(), detach_hook());
        }
    }

    fn exit(&mut self, ctx: &mut ModeContext<'_>) -> Option<PoiId> {
        if let Some(ring) = self.boundary.take() {
            ctx.scene.remove_object(ring);
        }
        for id in self.landmarks.drain(..) {
            ctx.scene.remove_object(id);
        }
        let cleared = ctx.tracker.clear(ctx.scene);
        ctx.detector.clear_markers();
        self.tag_channels.clear();

        let left = self.active_poi.take();
        if let Some(poi) = &left {
            info!(poi = %poi, cleared = cleared.len(), "left poi");
        } else {
            debug!("navigation mode switch with no active poi");
        }
        left
    }
}

fn attach_hook() -> TrackHook {
    Box::new(|object: &mut SceneObject, scene: &mut dyn SceneHost| {
        object.content.on_attach();
        scene.add_object(object);
    })
}

fn detach_hook() -> TrackHook {
    Box::new(|object: &mut SceneObject, scene: &mut dyn SceneHost| {
        object.content.on_detach();
        scene.remove_object(object.id);
    })
}

#[cfg(test)]
mod tests {
    use foundation::math::{CoordinateConverter, GeoPoint, Vec3};
    use foundation::{ChannelId, ObjectIds, PoiId};
    use pretty_assertions::assert_eq;
    use scene::components::{Content, Transform};
    use scene::{TrackedObjectManager, World};

    use super::{ModeContext, NavigationModeController, Transition};
    use crate::memory::{MemoryData, ScriptedDetector};
    use crate::model::{NavigationMode, Poi};
    use crate::services::DetectorService;
    use crate::testing::{channel, fountain};

    struct Rig {
        world: World,
        detector: ScriptedDetector,
        data: MemoryData,
        tracker: TrackedObjectManager,
        converter: CoordinateConverter,
        ids: ObjectIds,
    }

    impl Rig {
        fn new(data: MemoryData) -> Self {
            Self {
                world: World::new(),
                detector: ScriptedDetector::new(),
                data,
                tracker: TrackedObjectManager::default(),
                converter: CoordinateConverter::anchored(GeoPoint::new(45.0, 7.0)),
                ids: ObjectIds::new(),
            }
        }

        fn apply(
            &mut self,
            controller: &mut NavigationModeController,
            mode: NavigationMode,
            poi: Option<&Poi>,
        ) -> Transition {
            let mut ctx = ModeContext {
                scene: &mut self.world,
                detector: &mut self.detector,
                data: &self.data,
                tracker: &mut self.tracker,
                converter: &mut self.converter,
                ids: &mut self.ids,
            };
            controller.apply(mode, poi, &mut ctx)
        }
    }

    #[test]
    fn entering_places_ring_and_binds_channels() {
        let (data, poi) = fountain();
        let mut rig = Rig::new(data);
        let mut controller = NavigationModeController::default();

        let transition = rig.apply(&mut controller, NavigationMode::InPoi, Some(&poi));

        assert_eq!(transition, Transition::Entered(PoiId::new("fountain")));
        assert_eq!(controller.mode(), NavigationMode::InPoi);
        assert_eq!(rig.tracker.len(), 2);
        assert_eq!(rig.detector.registered_channels().len(), 2);
        assert_eq!(
            rig.detector.marker_images().collect::<Vec<_>>(),
            vec!["statue.png", "tag-7.png"]
        );
        assert_eq!(controller.channels_for_tag(7), &[ChannelId::new("plaque")]);

        let ring_id = controller.boundary().expect("ring");
        let ring = rig.world.object(ring_id).expect("ring in scene");
        assert_eq!(ring.transform.position, Vec3::new(10.0, -3.0, 20.0));
        assert_eq!(ring.transform.scale, Vec3::splat(5.0));

        let landmark = rig
            .world
            .object(controller.landmarks()[0])
            .expect("landmark in scene");
        assert_eq!(landmark.content, Content::mesh("tower-mesh"));
        assert_eq!(landmark.transform.scale, Vec3::splat(2.0));
        assert!(landmark.transform.position.z < -10.0);

        // Tracked content stays out of the scene until its marker is seen.
        assert_eq!(rig.world.len(), 2);
    }

    #[test]
    fn leaving_clears_everything_poi_scoped() {
        let (data, poi) = fountain();
        let mut rig = Rig::new(data);
        let mut controller = NavigationModeController::default();
        rig.apply(&mut controller, NavigationMode::InPoi, Some(&poi));

        rig.tracker
            .track_compose(&ChannelId::new("statue"), Vec3::new(1.0, 0.0, -2.0), Default::default(), Vec3::ONE);
        rig.tracker.update(&mut rig.world);
        assert_eq!(rig.world.len(), 3);

        let transition = rig.apply(&mut controller, NavigationMode::Navigating, None);

        assert_eq!(transition, Transition::Exited(PoiId::new("fountain")));
        assert!(rig.tracker.is_empty());
        assert!(rig.world.is_empty());
        assert!(rig.detector.registered_channels().is_empty());
        assert!(controller.channels_for_tag(7).is_empty());
        assert_eq!(controller.boundary(), None);
    }

    #[test]
    fn forced_navigation_uses_the_same_exit() {
        let (data, poi) = fountain();
        let mut rig = Rig::new(data);
        let mut controller = NavigationModeController::default();
        rig.apply(&mut controller, NavigationMode::InPoi, Some(&poi));

        let transition = rig.apply(&mut controller, NavigationMode::ForcedNavigating, None);

        assert_eq!(transition, Transition::Exited(PoiId::new("fountain")));
        assert!(rig.world.is_empty());
        assert_eq!(
            rig.apply(&mut controller, NavigationMode::Navigating, None),
            Transition::Switched(NavigationMode::Navigating)
        );
    }

    #[test]
    fn repeated_mode_is_a_no_op() {
        let (data, poi) = fountain();
        let mut rig = Rig::new(data);
        let mut controller = NavigationModeController::default();
        rig.apply(&mut controller, NavigationMode::InPoi, Some(&poi));
        let changes = rig.world.changes().len();

        assert_eq!(
            rig.apply(&mut controller, NavigationMode::InPoi, Some(&poi)),
            Transition::Unchanged
        );
        assert_eq!(rig.world.changes().len(), changes);
        assert_eq!(rig.tracker.len(), 2);
    }

    #[test]
    fn entering_without_poi_is_rejected() {
        let mut rig = Rig::new(MemoryData::new());
        let mut controller = NavigationModeController::default();

        assert_eq!(
            rig.apply(&mut controller, NavigationMode::InPoi, None),
            Transition::Rejected
        );
        assert_eq!(controller.mode(), NavigationMode::Navigating);
        assert!(rig.world.is_empty());
    }

    #[test]
    fn unresolvable_channels_are_skipped() {
        let (data, mut poi) = fountain();
        poi.channels.push(channel("missing"));
        let mut rig = Rig::new(data);
        let mut controller = NavigationModeController::default();

        rig.apply(&mut controller, NavigationMode::InPoi, Some(&poi));

        assert_eq!(rig.tracker.len(), 2);
        assert!(!rig.tracker.is_tracked(&ChannelId::new("missing")));
    }

    #[test]
    fn attached_video_starts_playing() {
        let (data, poi) = fountain();
        let mut rig = Rig::new(data);
        let mut controller = NavigationModeController::default();
        rig.apply(&mut controller, NavigationMode::InPoi, Some(&poi));

        rig.tracker.track_compose(
            &ChannelId::new("statue"),
            Vec3::new(0.0, 0.0, -3.0),
            Default::default(),
            Vec3::ONE,
        );
        let summary = rig.tracker.update(&mut rig.world);

        assert_eq!(summary.attached, vec![ChannelId::new("statue")]);
        let shown = rig
            .world
            .objects()
            .find(|o| matches!(o.content, Content::VideoMesh { .. }))
            .expect("video shown");
        assert!(shown.content.is_playing());
        assert_eq!(shown.transform, Transform::translate(Vec3::new(0.0, 0.0, -3.0)));
    }
}
