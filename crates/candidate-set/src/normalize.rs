//! Schema normalization for raw source records
//!
//! Ground nodes and cable landings arrive with different shapes; both are
//! mapped onto [`Candidate`] with a zone assigned from their longitude.
//! Records missing either coordinate are filtered, not rejected.

use crate::config::PipelineConfig;
use crate::geo::coordinates_in_range;
use crate::{Candidate, CandidateSource};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

const UNKNOWN_NAME: &str = "Unknown";

/// Accept string or numeric ids; anything else counts as absent
fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Optional attribute; a value of the wrong type or range counts as absent
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).ok())
}

/// Raw ground node from JSON
///
/// Coordinates must be numeric or absent; other fields are best effort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawGroundNode {
    #[serde(deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub tier: Option<u8>,
    #[serde(deserialize_with = "lenient")]
    pub demand_gbps: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub weather_score: Option<f64>,
}

/// Raw cable landing point from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCableLanding {
    #[serde(deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub cable_count: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub cables: Option<Vec<String>>,
}

/// Ids handed out during one run
///
/// Source-provided ids are reserved up front so positional fallbacks never
/// shadow a record that appears later in the input.
#[derive(Debug, Clone, Default)]
pub struct IdRegistry {
    reserved: HashSet<String>,
    assigned: HashSet<String>,
}

impl IdRegistry {
    pub fn reserving<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            reserved: ids.into_iter().map(String::from).collect(),
            assigned: HashSet::new(),
        }
    }

    fn is_free(&self, id: &str) -> bool {
        !self.reserved.contains(id) && !self.assigned.contains(id)
    }

    /// Keep a provided id, suffixing repeats as `<id>-2`, `<id>-3`, ...
    pub fn claim_provided(&mut self, id: String) -> String {
        if self.assigned.insert(id.clone()) {
            return id;
        }
        let mut k = 2;
        loop {
            let candidate = format!("{}-{}", id, k);
            if self.is_free(&candidate) {
                warn!("Duplicate id {} renamed to {}", id, candidate);
                self.assigned.insert(candidate.clone());
                return candidate;
            }
            k += 1;
        }
    }

    /// `<prefix>-<position>`, moving to the next free index on collision
    pub fn claim_fallback(&mut self, source: CandidateSource, position: usize) -> String {
        let mut n = position;
        loop {
            let candidate = format!("{}-{}", source.id_prefix(), n);
            if self.is_free(&candidate) {
                if n != position {
                    warn!(
                        "Fallback id {}-{} already taken, using {}",
                        source.id_prefix(),
                        position,
                        candidate
                    );
                }
                self.assigned.insert(candidate.clone());
                return candidate;
            }
            n += 1;
        }
    }
}

/// Candidates produced from one source, plus what was filtered out
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub candidates: Vec<Candidate>,
    /// Records missing latitude or longitude
    pub dropped: usize,
    /// Records rejected by the strict coordinate check
    pub malformed: usize,
}

impl Normalized {
    pub fn skipped(&self) -> usize {
        self.dropped + self.malformed
    }
}

enum Coords {
    Usable(f64, f64),
    Missing,
    Malformed(f64, f64),
}

fn check_coords(lat: Option<f64>, lon: Option<f64>, strict: bool) -> Coords {
    match (lat, lon) {
        (Some(lat), Some(lon)) if strict && !coordinates_in_range(lat, lon) => {
            Coords::Malformed(lat, lon)
        }
        (Some(lat), Some(lon)) => Coords::Usable(lat, lon),
        _ => Coords::Missing,
    }
}

/// Normalize ground node records
pub fn normalize_ground_nodes(
    nodes: Vec<RawGroundNode>,
    config: &PipelineConfig,
    ids: &mut IdRegistry,
) -> Normalized {
    let mut out = Normalized::default();

    for node in nodes {
        let (lat, lon) = match check_coords(node.latitude, node.longitude, config.strict_coordinates) {
            Coords::Usable(lat, lon) => (lat, lon),
            Coords::Missing => {
                out.dropped += 1;
                continue;
            }
            Coords::Malformed(lat, lon) => {
                warn!(
                    "Malformed ground node {:?}: coordinates ({}, {}) out of range",
                    node.id, lat, lon
                );
                out.malformed += 1;
                continue;
            }
        };

        let id = match node.id {
            Some(id) => ids.claim_provided(id),
            None => ids.claim_fallback(CandidateSource::GroundNode, out.candidates.len()),
        };
        let name = node.name.unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let zone = config.zones.assign_zone(lon).to_string();

        debug!("Ground node {} -> {}", id, zone);
        out.candidates.push(Candidate::from_ground_node(
            id,
            name,
            lat,
            lon,
            zone,
            node.tier,
            node.demand_gbps,
            node.weather_score,
        ));
    }

    info!(
        "Loaded {} ground nodes ({} skipped for missing coords, {} malformed)",
        out.candidates.len(),
        out.dropped,
        out.malformed
    );

    out
}

/// Normalize cable landing records
pub fn normalize_cable_landings(
    points: Vec<RawCableLanding>,
    config: &PipelineConfig,
    ids: &mut IdRegistry,
) -> Normalized {
    let mut out = Normalized::default();

    for point in points {
        let (lat, lon) = match check_coords(point.latitude, point.longitude, config.strict_coordinates)
        {
            Coords::Usable(lat, lon) => (lat, lon),
            Coords::Missing => {
                out.dropped += 1;
                continue;
            }
            Coords::Malformed(lat, lon) => {
                warn!(
                    "Malformed cable landing {:?}: coordinates ({}, {}) out of range",
                    point.id, lat, lon
                );
                out.malformed += 1;
                continue;
            }
        };

        let id = match point.id {
            Some(id) => ids.claim_provided(id),
            None => ids.claim_fallback(CandidateSource::CableLanding, out.candidates.len()),
        };
        let name = point.name.unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let zone = config.zones.assign_zone(lon).to_string();

        debug!("Cable landing {} -> {}", id, zone);
        out.candidates.push(Candidate::from_cable_landing(
            id,
            name,
            lat,
            lon,
            zone,
            point.cable_count.unwrap_or(0),
            point.cables.unwrap_or_default(),
        ));
    }

    info!(
        "Loaded {} cable landings ({} skipped for missing coords, {} malformed)",
        out.candidates.len(),
        out.dropped,
        out.malformed
    );

    out
}
