//! Marker-driven object tracking.
//!
//! Poses are recorded as raw observations by [`TrackedObjectManager::track_compose`]
//! and only applied to the scene in [`TrackedObjectManager::update`], once per
//! frame. Objects attach lazily on their first observed pose and detach
//! after the marker has been missed for longer than the configured grace
//! period.
//!
//! Observations are keyed by channel only. When two markers (a tag and an
//! image pattern, say) resolve to the same channel in one frame, both are
//! accepted and the later call wins for that frame. This is deliberate:
//! callers that care about the order must avoid double-tracking a channel.

use std::collections::BTreeMap;
use std::fmt;

use foundation::ChannelId;
use foundation::math::{Quat, Vec3};
use tracing::{debug, trace, warn};

use crate::components::Transform;
use crate::host::SceneHost;
use crate::object::SceneObject;

/// Attach/detach hook. Receives the tracked object (with its current
/// smoothed transform) and the scene host it should be added to or removed from.
pub type TrackHook = Box<dyn FnMut(&mut SceneObject, &mut dyn SceneHost)>;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TrackingConfig {
    /// Blend factor toward each new observation, in `(0, 1]`. 1 disables smoothing.
    pub smoothing: f64,
    /// Consecutive frames a marker may go unseen before it counts as lost.
    pub lost_after_frames: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.5,
            lost_after_frames: 8,
        }
    }
}

/// What changed during one [`TrackedObjectManager::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingSummary {
    pub attached: Vec<ChannelId>,
    pub detached: Vec<ChannelId>,
    pub visible: usize,
}

struct TrackedEntry {
    object: SceneObject,
    observed: Option<Transform>,
    smoothed: Option<Transform>,
    missed_frames: u32,
    visible: bool,
    on_attach: TrackHook,
    on_detach: TrackHook,
}

impl TrackedEntry {
    fn attach(&mut self, scene: &mut dyn SceneHost) {
        self.visible = true;
        self.object.visible = true;
        (self.on_attach)(&mut self.object, scene);
    }

    fn detach(&mut self, scene: &mut dyn SceneHost) {
        self.visible = false;
        self.object.visible = false;
        (self.on_detach)(&mut self.object, scene);
    }
}

pub struct TrackedObjectManager {
    config: TrackingConfig,
    entries: BTreeMap<ChannelId, TrackedEntry>,
}

impl fmt::Debug for TrackedObjectManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedObjectManager")
            .field("config", &self.config)
            .field("channels", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for TrackedObjectManager {
    fn default() -> Self {
        Self::new(TrackingConfig::default())
    }
}

impl TrackedObjectManager {
    pub fn new(config: TrackingConfig) -> Self {
        Self {
            config,
            entries: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> TrackingConfig {
        self.config
    }

    /// Bind `object` to `channel`. Nothing reaches the scene until the first
    /// pose for the channel arrives.
    ///
    /// Returns `false` (keeping the existing binding) if the channel is
    /// already bound.
    pub fn add(
        &mut self,
        object: SceneObject,
        channel: ChannelId,
        on_attach: TrackHook,
        on_detach: TrackHook,
    ) -> bool {
        if self.entries.contains_key(&channel) {
            warn!(%channel, "channel already bound; keeping the existing content");
            return false;
        }
        let mut object = object;
        object.visible = false;
        self.entries.insert(
            channel,
            TrackedEntry {
                object,
                observed: None,
                smoothed: None,
                missed_frames: 0,
                visible: false,
                on_attach,
                on_detach,
            },
        );
        true
    }

    /// Record this frame's raw pose for `channel`; last write wins.
    ///
    /// Poses for channels that were never bound are ignored: markers can be
    /// seen before their content finishes loading.
    pub fn track_compose(
        &mut self,
        channel: &ChannelId,
        position: Vec3,
        orientation: Quat,
        scale: Vec3,
    ) {
        match self.entries.get_mut(channel) {
            Some(entry) => {
                entry.observed = Some(Transform::new(position, orientation.normalize(), scale));
            }
            None => trace!(%channel, "pose for unbound channel ignored"),
        }
    }

    /// Apply this frame's observations. Call exactly once per frame.
    pub fn update(&mut self, scene: &mut dyn SceneHost) -> TrackingSummary {
        let mut summary = TrackingSummary::default();
        let alpha = self.config.smoothing;
        let lost_after = self.config.lost_after_frames;

        for (channel, entry) in &mut self.entries {
            match entry.observed.take() {
                Some(pose) => {
                    entry.missed_frames = 0;
                    let next = match entry.smoothed {
                        Some(prev) if entry.visible => prev.blend(&pose, alpha),
                        // First sighting or re-acquisition: snap, don't blend from a stale pose.
                        _ => pose,
                    };
                    entry.smoothed = Some(next);
                    entry.object.transform = next;

                    if entry.visible {
                        scene.update_object(entry.object.id, &next);
                    } else {
                        debug!(%channel, "marker acquired");
                        entry.attach(scene);
                        summary.attached.push(channel.clone());
                    }
                }
                None if entry.visible => {
                    entry.missed_frames += 1;
                    if entry.missed_frames > lost_after {
                        debug!(%channel, frames = entry.missed_frames, "marker lost");
                        entry.detach(scene);
                        summary.detached.push(channel.clone());
                    }
                }
                None => {}
            }

            if entry.visible {
                summary.visible += 1;
            }
        }

        summary
    }

    /// Detach every visible object and drop all bindings.
    pub fn clear(&mut self, scene: &mut dyn SceneHost) -> Vec<ChannelId> {
        let mut detached = Vec::new();
        for (channel, mut entry) in std::mem::take(&mut self.entries) {
            if entry.visible {
                entry.detach(scene);
                detached.push(channel);
            }
        }
        detached
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_tracked(&self, channel: &ChannelId) -> bool {
        self.entries.contains_key(channel)
    }

    pub fn is_visible(&self, channel: &ChannelId) -> bool {
        self.entries.get(channel).is_some_and(|e| e.visible)
    }

    /// Smoothed pose of the channel's object, once it has been seen.
    pub fn pose(&self, channel: &ChannelId) -> Option<Transform> {
        self.entries.get(channel).and_then(|e| e.smoothed)
    }

    pub fn channels(&self) -> impl Iterator<Item = &ChannelId> {
        self.entries.keys()
    }
}
