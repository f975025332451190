//! Ground Station Candidate Set Builder
//!
//! Consolidates ground nodes and submarine cable landing points into one
//! deduplicated, zone-tagged candidate universe for the 247 station
//! down-selection of the SX9-Orbital constellation.
//!
//! # Pipeline
//!
//! ```text
//! raw records ─► normalize ─► dedup (importance order, greedy) ─► summarize
//! ```
//!
//! | Stage      | Module        | Output |
//! |------------|---------------|--------|
//! | Distance   | [`geo`]       | haversine km (R = 6371.0) |
//! | Zoning     | [`zone`]      | longitude → zone name |
//! | Normalize  | [`normalize`] | [`Candidate`] list + dropped counts |
//! | Dedup      | [`dedup`]     | representatives + merge count |
//! | Summarize  | [`summary`]   | per-zone counts vs quota |
//!
//! # Merge Priority
//!
//! Ground nodes claim their neighbourhood before cable landings; within a
//! source, higher cable counts go first. A candidate merges into the first
//! already-accepted representative closer than the proximity threshold.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod config;
pub mod dedup;
pub mod export;
pub mod geo;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod summary;
pub mod zone;

pub use config::PipelineConfig;
pub use dedup::{deduplicate, DedupOutcome};
pub use geo::distance_km;
pub use pipeline::{build_candidate_set, CandidateSet, CandidateSetMetadata, SourceCounts};
pub use summary::{summarize_by_zone, ZoneCount, ZoneMap, ZoneSummary};
pub use zone::{ZoneDef, ZoneLayout};

/// Deduplication threshold in km (9 decimal precision)
pub const DEFAULT_THRESHOLD_KM: f64 = 50.000000000;

#[derive(Error, Debug)]
pub enum SetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Unsupported input layout: {0}")]
    UnsupportedLayout(String),
}

pub type Result<T> = std::result::Result<T, SetError>;

/// Source dataset a candidate was drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    GroundNode,
    CableLanding,
}

impl CandidateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GroundNode => "ground_node",
            Self::CableLanding => "cable_landing",
        }
    }

    /// Prefix used for positional fallback ids
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::GroundNode => "gn",
            Self::CableLanding => "cl",
        }
    }
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate ground station location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Assigned once at normalization; never recomputed
    pub zone: String,
    pub source: CandidateSource,

    // From ground nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demand_gbps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_score: Option<f64>,

    // From cable landings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cable_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cables: Option<Vec<String>>,

    /// Sources absorbed during dedup, representative's own source first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_sources: Option<Vec<CandidateSource>>,
}

impl Candidate {
    /// Create from ground node data
    #[allow(clippy::too_many_arguments)]
    pub fn from_ground_node(
        id: String,
        name: String,
        lat: f64,
        lon: f64,
        zone: String,
        tier: Option<u8>,
        demand_gbps: Option<f64>,
        weather_score: Option<f64>,
    ) -> Self {
        Self {
            id,
            name,
            latitude: lat,
            longitude: lon,
            zone,
            source: CandidateSource::GroundNode,
            tier,
            demand_gbps,
            weather_score,
            cable_count: None,
            cables: None,
            merged_sources: None,
        }
    }

    /// Create from cable landing data
    pub fn from_cable_landing(
        id: String,
        name: String,
        lat: f64,
        lon: f64,
        zone: String,
        cable_count: u32,
        cables: Vec<String>,
    ) -> Self {
        Self {
            id,
            name,
            latitude: lat,
            longitude: lon,
            zone,
            source: CandidateSource::CableLanding,
            tier: None,
            demand_gbps: None,
            weather_score: None,
            cable_count: Some(cable_count),
            cables: Some(cables),
            merged_sources: None,
        }
    }

    /// Great-circle distance to another candidate in km
    pub fn distance_to(&self, other: &Candidate) -> f64 {
        distance_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}
