//! GeoJSON rendering of a candidate set

use crate::pipeline::CandidateSet;
use crate::{Candidate, Result};
use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

fn candidate_feature(c: &Candidate) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("id".into(), json!(c.id));
    properties.insert("name".into(), json!(c.name));
    properties.insert("zone".into(), json!(c.zone));
    properties.insert("source".into(), json!(c.source.as_str()));
    properties.insert("cable_count".into(), json!(c.cable_count));
    properties.insert("tier".into(), json!(c.tier));
    properties.insert("weather_score".into(), json!(c.weather_score));
    properties.insert("merged_sources".into(), json!(c.merged_sources));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![c.longitude, c.latitude]))),
        id: Some(Id::String(c.id.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Export candidate set to a GeoJSON FeatureCollection
pub fn to_geojson(set: &CandidateSet) -> Result<FeatureCollection> {
    let mut foreign = JsonObject::new();
    foreign.insert("metadata".into(), serde_json::to_value(&set.metadata)?);

    Ok(FeatureCollection {
        bbox: None,
        features: set.candidates.iter().map(candidate_feature).collect(),
        foreign_members: Some(foreign),
    })
}
