//! End-to-end candidate set construction

use crate::config::PipelineConfig;
use crate::dedup::deduplicate;
use crate::loader::{read_cable_landings, read_ground_nodes};
use crate::normalize::{
    normalize_cable_landings, normalize_ground_nodes, IdRegistry, RawCableLanding, RawGroundNode,
};
use crate::summary::{summarize_by_zone, ZoneMap, ZoneSummary};
use crate::{Candidate, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Normalized input counts per source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCounts {
    pub ground_nodes: usize,
    pub cable_landings: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSetMetadata {
    pub generated_at: String,
    pub total_candidates: usize,
    pub raw_candidates: usize,
    pub merged_count: usize,
    pub zone_distribution: ZoneMap,
    pub zone_quotas: ZoneMap,
    pub sources: SourceCounts,
    /// Records filtered out: unreadable, missing or malformed coordinates
    pub dropped_records: usize,
    pub dedup_threshold_km: f64,
}

/// Deduplicated, zone-tagged candidates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSet {
    pub candidates: Vec<Candidate>,
    pub metadata: CandidateSetMetadata,
    /// Zone counts against quota; the metadata carries the serialized view
    #[serde(skip)]
    pub summary: ZoneSummary,
}

/// Build the candidate set from raw records of both sources
pub fn build_candidate_set(
    ground_nodes: Vec<RawGroundNode>,
    cable_landings: Vec<RawCableLanding>,
    config: &PipelineConfig,
) -> Result<CandidateSet> {
    config.validate()?;

    let mut ids = IdRegistry::reserving(
        ground_nodes
            .iter()
            .filter_map(|n| n.id.as_deref())
            .chain(cable_landings.iter().filter_map(|p| p.id.as_deref())),
    );
    let ground = normalize_ground_nodes(ground_nodes, config, &mut ids);
    let landings = normalize_cable_landings(cable_landings, config, &mut ids);

    let sources = SourceCounts {
        ground_nodes: ground.candidates.len(),
        cable_landings: landings.candidates.len(),
    };
    let dropped_records = ground.skipped() + landings.skipped();

    let mut all = ground.candidates;
    all.extend(landings.candidates);
    let raw_candidates = all.len();
    info!("Total raw candidates: {}", raw_candidates);

    let outcome = deduplicate(all, config.proximity_threshold_km);
    let summary = summarize_by_zone(&outcome.unique, &config.zones);

    for z in summary.below_quota() {
        warn!(
            "Zone {} has {} candidates, {} short of quota {}",
            z.zone,
            z.count,
            z.shortfall(),
            z.quota
        );
    }

    let metadata = CandidateSetMetadata {
        generated_at: chrono::Utc::now().to_rfc3339(),
        total_candidates: outcome.unique.len(),
        raw_candidates,
        merged_count: outcome.merged_count,
        zone_distribution: summary.distribution(),
        zone_quotas: summary.quotas(),
        sources,
        dropped_records,
        dedup_threshold_km: config.proximity_threshold_km,
    };

    Ok(CandidateSet {
        candidates: outcome.unique,
        metadata,
        summary,
    })
}

/// Load both source files and build the candidate set
pub fn load_candidate_set(
    ground_nodes_path: impl AsRef<Path>,
    cable_landings_path: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<CandidateSet> {
    let ground_nodes = read_ground_nodes(ground_nodes_path)?;
    let cable_landings = read_cable_landings(cable_landings_path)?;

    let mut set = build_candidate_set(ground_nodes.records, cable_landings.records, config)?;
    set.metadata.dropped_records += ground_nodes.malformed + cable_landings.malformed;
    Ok(set)
}
