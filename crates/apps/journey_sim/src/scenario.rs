//! Journey description file consumed by the simulator.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use foundation::math::{CoordinateConverter, GeoPoint, LocalPosition};
use foundation::{ChannelId, ContentRef, MarkerRef, PoiId};
use journey::memory::{MemoryData, MemoryJourney};
use journey::{Channel, LandmarkPlacement, MarkerAsset, Poi};
use scene::components::Content;
use serde::Deserialize;

#[derive(Debug)]
pub enum ScenarioError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    UnknownMarker { channel: String, marker: String },
    EmptyRoute,
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioError::Io(err) => write!(f, "scenario read failed: {err}"),
            ScenarioError::Parse(err) => write!(f, "scenario parse failed: {err}"),
            ScenarioError::UnknownMarker { channel, marker } => {
                write!(f, "channel {channel} references unknown marker {marker}")
            }
            ScenarioError::EmptyRoute => write!(f, "scenario route needs at least two points"),
        }
    }
}

impl std::error::Error for ScenarioError {}

impl From<std::io::Error> for ScenarioError {
    fn from(err: std::io::Error) -> Self {
        ScenarioError::Io(err)
    }
}

impl From<serde_json::Error> for ScenarioError {
    fn from(err: serde_json::Error) -> Self {
        ScenarioError::Parse(err)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: Option<f64>,
}

impl Coordinate {
    pub fn geo(&self) -> GeoPoint {
        match self.altitude {
            Some(altitude) => GeoPoint::with_altitude(self.latitude, self.longitude, altitude),
            None => GeoPoint::new(self.latitude, self.longitude),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentSpec {
    Mesh { mesh: String },
    Video { mesh: String, video: String },
    Group { children: Vec<ContentSpec> },
}

impl ContentSpec {
    pub fn build(&self) -> Content {
        match self {
            ContentSpec::Mesh { mesh } => Content::mesh(mesh.as_str()),
            ContentSpec::Video { mesh, video } => Content::video(mesh.as_str(), video.as_str()),
            ContentSpec::Group { children } => {
                Content::Group(children.iter().map(ContentSpec::build).collect())
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkerSpec {
    pub reference: String,
    pub image: String,
    #[serde(default)]
    pub tag_id: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LandmarkSpec {
    pub object: String,
    #[serde(flatten)]
    pub location: Coordinate,
    #[serde(default = "unit_scale")]
    pub scale: f64,
}

fn unit_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelSpec {
    pub uuid: String,
    pub marker: String,
    pub content: String,
    #[serde(default)]
    pub landmark: Option<LandmarkSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoiSpec {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub location: Coordinate,
    pub radius: f64,
    #[serde(default)]
    pub channels: Vec<ChannelSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub anchor: Coordinate,
    pub route: Vec<Coordinate>,
    #[serde(default)]
    pub landmarks: Option<ContentSpec>,
    #[serde(default)]
    pub contents: BTreeMap<String, ContentSpec>,
    #[serde(default)]
    pub markers: Vec<MarkerSpec>,
    #[serde(default)]
    pub pois: Vec<PoiSpec>,
}

/// Everything the runtime needs, resolved into the local frame.
pub struct Resolved {
    pub converter: CoordinateConverter,
    pub data: MemoryData,
    pub journey: MemoryJourney,
    pub route: Vec<LocalPosition>,
    pub markers: BTreeMap<ChannelId, Option<u32>>,
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(text)?;
        if scenario.route.len() < 2 {
            return Err(ScenarioError::EmptyRoute);
        }
        Ok(scenario)
    }

    pub fn resolve(&self) -> Result<Resolved, ScenarioError> {
        let mut converter = CoordinateConverter::anchored(self.anchor.geo());
        let mut data = MemoryData::new();
        let mut markers = BTreeMap::new();

        for (reference, spec) in &self.contents {
            data.insert_content(ContentRef::new(reference.as_str()), spec.build());
        }

        let marker_specs: BTreeMap<&str, &MarkerSpec> = self
            .markers
            .iter()
            .map(|m| (m.reference.as_str(), m))
            .collect();

        let mut pois = Vec::with_capacity(self.pois.len());
        for spec in &self.pois {
            let mut channels = Vec::with_capacity(spec.channels.len());
            for channel_spec in &spec.channels {
                let Some(marker) = marker_specs.get(channel_spec.marker.as_str()) else {
                    return Err(ScenarioError::UnknownMarker {
                        channel: channel_spec.uuid.clone(),
                        marker: channel_spec.marker.clone(),
                    });
                };
                let channel = Channel {
                    uuid: ChannelId::new(channel_spec.uuid.as_str()),
                    marker: MarkerRef::new(channel_spec.marker.as_str()),
                    content: ContentRef::new(channel_spec.content.as_str()),
                    landmark: channel_spec.landmark.as_ref().map(|l| LandmarkPlacement {
                        object: ContentRef::new(l.object.as_str()),
                        location: l.location.geo(),
                        scale: l.scale,
                    }),
                };
                data.insert_channel(
                    channel.clone(),
                    MarkerAsset {
                        reference: channel.marker.clone(),
                        image: marker.image.clone(),
                        tag_id: marker.tag_id,
                    },
                );
                markers.insert(channel.uuid.clone(), marker.tag_id);
                channels.push(channel);
            }

            pois.push(Poi {
                id: PoiId::new(spec.id.as_str()),
                name: spec.name.clone(),
                position: converter.convert_point(&spec.location.geo()),
                radius: spec.radius,
                channels,
            });
        }

        let route = self
            .route
            .iter()
            .map(|c| converter.convert_point(&c.geo()))
            .collect();

        let mut journey = MemoryJourney::new(pois);
        if let Some(landmarks) = &self.landmarks {
            journey = journey.with_landmarks(landmarks.build());
        }

        Ok(Resolved {
            converter,
            data,
            journey,
            route,
            markers,
        })
    }
}

#[cfg(test)]
mod tests {
    use foundation::ChannelId;
    use journey::JourneyDataService;
    use pretty_assertions::assert_eq;

    use super::{Scenario, ScenarioError};

    const SAMPLE: &str = include_str!("../assets/journey.json");

    #[test]
    fn sample_scenario_resolves() {
        let scenario = Scenario::from_json_str(SAMPLE).expect("sample parses");
        let mut resolved = scenario.resolve().expect("sample resolves");

        assert_eq!(resolved.route.len(), scenario.route.len());
        assert_eq!(resolved.markers.get(&ChannelId::new("gate-tag")), Some(&Some(3)));

        resolved.journey.load("sample", Box::new(|r| assert!(r.is_ok())));
        assert_eq!(resolved.journey.pois().len(), scenario.pois.len());
        assert!(resolved.converter.is_anchored());
    }

    #[test]
    fn unknown_marker_is_reported() {
        let text = r#"{
            "anchor": { "latitude": 45.0, "longitude": 7.0 },
            "route": [
                { "latitude": 45.0, "longitude": 7.0 },
                { "latitude": 45.001, "longitude": 7.0 }
            ],
            "pois": [{
                "id": "p", "name": "P", "latitude": 45.0005, "longitude": 7.0, "radius": 10,
                "channels": [{ "uuid": "c", "marker": "nope", "content": "x" }]
            }]
        }"#;
        let scenario = Scenario::from_json_str(text).expect("parses");
        let err = scenario.resolve().err().expect("unknown marker");
        assert!(matches!(err, ScenarioError::UnknownMarker { .. }));
    }

    #[test]
    fn single_point_route_is_rejected() {
        let text = r#"{ "anchor": { "latitude": 45.0, "longitude": 7.0 },
                        "route": [{ "latitude": 45.0, "longitude": 7.0 }] }"#;
        assert!(matches!(
            Scenario::from_json_str(text),
            Err(ScenarioError::EmptyRoute)
        ));
    }
}
