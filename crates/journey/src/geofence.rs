//! Position-driven mode policy for hosts that have no journey manager of
//! their own. It only updates the journey service; callers still raise
//! [`JourneyEvent::ModeChanged`](crate::session::JourneyEvent::ModeChanged).

use foundation::math::LocalPosition;

use crate::model::NavigationMode;
use crate::services::JourneyDataService;

/// Re-evaluate the journey mode for a device at `position`.
///
/// Returns the new mode when it changed. While forced into navigation the
/// device must leave every POI before it can enter one again.
pub fn locate(journey: &mut dyn JourneyDataService, position: LocalPosition) -> Option<NavigationMode> {
    let mode = journey.mode();
    if mode == NavigationMode::InPoi
        && journey
            .current_poi()
            .is_some_and(|poi| poi.contains(position))
    {
        return None;
    }

    let inside = journey
        .pois()
        .iter()
        .find(|poi| poi.contains(position))
        .map(|poi| poi.id.clone());

    let next = match (mode, inside) {
        (NavigationMode::InPoi, _) => {
            journey.set_current_poi(None);
            NavigationMode::Navigating
        }
        (NavigationMode::Navigating, Some(poi)) => {
            journey.set_current_poi(Some(poi));
            NavigationMode::InPoi
        }
        (NavigationMode::ForcedNavigating, None) => NavigationMode::Navigating,
        _ => return None,
    };
    journey.set_mode(next);
    Some(next)
}

/// Leave the current POI on user request. Returns false if already navigating.
pub fn force_navigation(journey: &mut dyn JourneyDataService) -> bool {
    if journey.mode() == NavigationMode::ForcedNavigating {
        return false;
    }
    journey.set_current_poi(None);
    journey.set_mode(NavigationMode::ForcedNavigating);
    true
}
