use foundation::math::{GeoPoint, Vec3};
use foundation::{ChannelId, PoiId};
use scene::components::Content;

use crate::memory::MemoryData;
use crate::model::{Channel, LandmarkPlacement, MarkerAsset, Poi};

pub(crate) fn channel(uuid: &str) -> Channel {
    Channel {
        uuid: ChannelId::new(uuid),
        marker: format!("{uuid}-marker").as_str().into(),
        content: format!("{uuid}-content").as_str().into(),
        landmark: None,
    }
}

/// A POI at (10, 0, 20) with radius 5 and two channels: `statue` (image
/// marker, video content, one landmark) and `plaque` (tag 7, static mesh).
pub(crate) fn fountain() -> (MemoryData, Poi) {
    let mut data = MemoryData::new();
    let mut statue = channel("statue");
    statue.landmark = Some(LandmarkPlacement {
        object: "tower".into(),
        location: GeoPoint::new(45.0001, 7.0),
        scale: 2.0,
    });
    let plaque = channel("plaque");

    data.insert_channel(
        statue.clone(),
        MarkerAsset {
            reference: statue.marker.clone(),
            image: "statue.png".to_string(),
            tag_id: None,
        },
    );
    data.insert_channel(
        plaque.clone(),
        MarkerAsset {
            reference: plaque.marker.clone(),
            image: "tag-7.png".to_string(),
            tag_id: Some(7),
        },
    );
    data.insert_content(statue.content.clone(), Content::video("statue-mesh", "statue.mp4"));
    data.insert_content(plaque.content.clone(), Content::mesh("plaque-mesh"));
    data.insert_content("tower".into(), Content::mesh("tower-mesh"));

    let poi = Poi {
        id: PoiId::new("fountain"),
        name: "Fountain".to_string(),
        position: Vec3::new(10.0, 0.0, 20.0),
        radius: 5.0,
        channels: vec![statue, plaque],
    };
    (data, poi)
}
