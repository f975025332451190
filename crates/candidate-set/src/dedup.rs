//! Proximity deduplication
//!
//! Greedy clustering against already-accepted representatives:
//!
//! 1. Stable-sort by importance (ground nodes first, then higher cable count).
//! 2. Each candidate merges into the first representative closer than the
//!    threshold, or becomes a new representative.
//!
//! Matching is against representatives only, not transitive. In a chain
//! A–B–C where only the adjacent pairs are within threshold and B arrives
//! first, both A and C fold into B.
//!
//! Cost is O(n·u) with u the running representative count. Fine for a few
//! thousand records; beyond that the scan wants a grid or k-d index that
//! keeps the same first-match order.

use crate::{Candidate, CandidateSource};
use std::cmp::Reverse;
use tracing::{debug, info};

/// Result of a dedup pass
#[derive(Debug, Clone)]
pub struct DedupOutcome {
    pub unique: Vec<Candidate>,
    pub merged_count: usize,
}

/// Sort key; lower sorts first
pub fn importance_key(c: &Candidate) -> (u8, Reverse<u32>) {
    let source_priority = match c.source {
        CandidateSource::GroundNode => 0,
        _ => 1,
    };
    (source_priority, Reverse(c.cable_count.unwrap_or(0)))
}

impl Candidate {
    /// Merge a lower-priority duplicate into this representative
    pub fn absorb(&mut self, other: &Candidate) {
        // Track merged sources
        let own_source = self.source;
        self.merged_sources
            .get_or_insert_with(|| vec![own_source])
            .push(other.source);

        // Cable count is the max seen, never a sum
        self.cable_count = match (self.cable_count, other.cable_count) {
            (Some(mine), Some(theirs)) => Some(mine.max(theirs)),
            (mine, theirs) => mine.or(theirs),
        };

        let has_cables = self.cables.as_ref().is_some_and(|c| !c.is_empty());
        let other_has_cables = other.cables.as_ref().is_some_and(|c| !c.is_empty());
        if !has_cables && other_has_cables {
            self.cables = other.cables.clone();
        }

        // First provided value wins
        if self.weather_score.is_none() {
            self.weather_score = other.weather_score;
        }
        if self.tier.is_none() {
            self.tier = other.tier;
        }
        if self.demand_gbps.is_none() {
            self.demand_gbps = other.demand_gbps;
        }
    }
}

/// Deduplicate candidates by proximity
///
/// When a candidate is within `threshold_km` of an existing representative
/// it is merged into it. Ground nodes are preferred over cable landings.
pub fn deduplicate(mut candidates: Vec<Candidate>, threshold_km: f64) -> DedupOutcome {
    info!(
        "Deduplicating {} candidates with {:.1}km threshold",
        candidates.len(),
        threshold_km
    );

    candidates.sort_by_key(importance_key);

    let mut unique: Vec<Candidate> = Vec::new();
    let mut merged_count = 0;

    for candidate in candidates {
        match unique
            .iter()
            .position(|existing| candidate.distance_to(existing) < threshold_km)
        {
            Some(idx) => {
                let existing = &mut unique[idx];
                debug!(
                    "Merging {} ({}) into {} ({})",
                    candidate.id, candidate.source, existing.id, existing.source
                );
                existing.absorb(&candidate);
                merged_count += 1;
            }
            None => unique.push(candidate),
        }
    }

    info!(
        "Deduplicated: {} merged, {} unique candidates",
        merged_count,
        unique.len()
    );

    DedupOutcome {
        unique,
        merged_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::ZoneLayout;
    use proptest::prelude::*;

    fn ground(id: &str, lat: f64, lon: f64) -> Candidate {
        let zone = ZoneLayout::default().assign_zone(lon).to_string();
        Candidate::from_ground_node(id.into(), id.into(), lat, lon, zone, None, None, None)
    }

    fn landing(id: &str, lat: f64, lon: f64, cable_count: u32) -> Candidate {
        let zone = ZoneLayout::default().assign_zone(lon).to_string();
        Candidate::from_cable_landing(id.into(), id.into(), lat, lon, zone, cable_count, vec![])
    }

    #[test]
    fn test_ground_node_claims_nearby_landing() {
        let candidates = vec![
            landing("cl-1", 40.1, -74.05, 5),
            ground("gn-1", 40.0, -74.0),
        ];
        let dist = candidates[0].distance_to(&candidates[1]);
        assert!(dist > 10.0 && dist < 15.0);

        let out = deduplicate(candidates, 50.0);
        assert_eq!(out.unique.len(), 1);
        assert_eq!(out.merged_count, 1);

        let rep = &out.unique[0];
        assert_eq!(rep.id, "gn-1");
        assert_eq!(rep.source, CandidateSource::GroundNode);
        assert_eq!(rep.cable_count, Some(5));
        assert_eq!(
            rep.merged_sources,
            Some(vec![CandidateSource::GroundNode, CandidateSource::CableLanding])
        );
    }

    #[test]
    fn test_small_threshold_keeps_both() {
        let candidates = vec![ground("gn-1", 40.0, -74.0), landing("cl-1", 40.1, -74.05, 5)];

        let out = deduplicate(candidates, 1.0);
        assert_eq!(out.unique.len(), 2);
        assert_eq!(out.merged_count, 0);
        assert!(out.unique.iter().all(|c| c.merged_sources.is_none()));
    }

    #[test]
    fn test_deduplicate_keeps_distant() {
        let candidates = vec![ground("gn-1", 40.0, -74.0), ground("gn-2", 41.0, -75.0)];

        let out = deduplicate(candidates, 50.0);
        assert_eq!(out.unique.len(), 2);
    }

    #[test]
    fn test_higher_cable_count_leads_among_landings() {
        let candidates = vec![
            landing("cl-small", 51.0, 1.0, 2),
            landing("cl-big", 51.05, 1.05, 9),
        ];

        let out = deduplicate(candidates, 50.0);
        assert_eq!(out.unique.len(), 1);
        assert_eq!(out.unique[0].id, "cl-big");
        assert_eq!(out.unique[0].cable_count, Some(9));
    }

    #[test]
    fn test_cable_count_never_lowered() {
        let mut rep = landing("cl-a", 0.0, 0.0, 7);
        rep.absorb(&landing("cl-b", 0.0, 0.0, 3));
        assert_eq!(rep.cable_count, Some(7));

        rep.absorb(&ground("gn-c", 0.0, 0.0));
        assert_eq!(rep.cable_count, Some(7));

        rep.absorb(&landing("cl-d", 0.0, 0.0, 11));
        assert_eq!(rep.cable_count, Some(11));
        assert_eq!(
            rep.merged_sources,
            Some(vec![
                CandidateSource::CableLanding,
                CandidateSource::CableLanding,
                CandidateSource::GroundNode,
                CandidateSource::CableLanding,
            ])
        );
    }

    #[test]
    fn test_zero_cable_count_is_raised() {
        let mut rep = landing("cl-a", 0.0, 0.0, 0);
        rep.absorb(&landing("cl-b", 0.0, 0.0, 4));
        assert_eq!(rep.cable_count, Some(4));
    }

    #[test]
    fn test_weather_score_first_value_wins() {
        let mut rep = ground("gn-a", 0.0, 0.0);
        let mut second = ground("gn-b", 0.0, 0.01);
        second.weather_score = Some(0.4);
        let mut third = ground("gn-c", 0.0, 0.02);
        third.weather_score = Some(0.9);

        rep.absorb(&second);
        rep.absorb(&third);
        assert_eq!(rep.weather_score, Some(0.4));
    }

    #[test]
    fn test_cables_adopted_when_missing() {
        let mut rep = ground("gn-a", 0.0, 0.0);
        let mut cl = landing("cl-a", 0.0, 0.0, 2);
        cl.cables = Some(vec!["MAREA".into(), "Dunant".into()]);

        rep.absorb(&cl);
        assert_eq!(rep.cables, Some(vec!["MAREA".to_string(), "Dunant".to_string()]));
    }

    #[test]
    fn test_zone_not_recomputed_on_merge() {
        let mut rep = ground("gn-a", 0.0, -30.1);
        let before = rep.zone.clone();
        rep.absorb(&landing("cl-a", 0.0, -29.9, 3));
        assert_eq!(rep.zone, before);
        assert_eq!(rep.zone, "AMERICAS");
    }

    #[test]
    fn test_chain_folds_into_first_representative() {
        // Along the equator 0.4° ≈ 44.5 km, 0.8° ≈ 89 km
        let a = landing("a", 0.0, -0.4, 1);
        let b = ground("b", 0.0, 0.0);
        let c = landing("c", 0.0, 0.4, 1);
        assert!(a.distance_to(&c) > 50.0);

        let out = deduplicate(vec![a, b, c], 50.0);
        assert_eq!(out.unique.len(), 1);
        assert_eq!(out.unique[0].id, "b");
        assert_eq!(out.merged_count, 2);
    }

    #[test]
    fn test_chain_from_end_splits() {
        let a = ground("a", 0.0, -0.4);
        let b = landing("b", 0.0, 0.0, 2);
        let c = landing("c", 0.0, 0.4, 1);

        let out = deduplicate(vec![c, b, a], 50.0);
        let ids: Vec<&str> = out.unique.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(out.merged_count, 1);
    }

    #[test]
    fn test_equal_importance_keeps_input_order() {
        let candidates = vec![ground("first", 10.0, 10.0), ground("second", 10.01, 10.01)];

        let out = deduplicate(candidates, 50.0);
        assert_eq!(out.unique[0].id, "first");
    }

    #[test]
    fn test_empty_input() {
        let out = deduplicate(vec![], 50.0);
        assert!(out.unique.is_empty());
        assert_eq!(out.merged_count, 0);
    }

    fn arb_candidate() -> impl Strategy<Value = Candidate> {
        (
            -60.0f64..60.0,
            -20.0f64..20.0,
            any::<bool>(),
            proptest::option::of(0u32..30),
            0usize..1000,
        )
            .prop_map(|(lat, lon, is_ground, cables, n)| {
                let mut c = if is_ground {
                    ground(&format!("gn-{n}"), lat, lon)
                } else {
                    landing(&format!("cl-{n}"), lat, lon, 0)
                };
                c.cable_count = cables;
                c
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn second_pass_merges_nothing(
            candidates in proptest::collection::vec(arb_candidate(), 0..60),
            threshold in 50.0f64..600.0,
        ) {
            let first = deduplicate(candidates, threshold);
            let count = first.unique.len();
            let second = deduplicate(first.unique, threshold);
            prop_assert_eq!(second.unique.len(), count);
            prop_assert_eq!(second.merged_count, 0);
        }

        #[test]
        fn representatives_respect_threshold(
            candidates in proptest::collection::vec(arb_candidate(), 0..60),
        ) {
            let total = candidates.len();
            let out = deduplicate(candidates, 200.0);
            prop_assert_eq!(out.unique.len() + out.merged_count, total);
            for (i, a) in out.unique.iter().enumerate() {
                for b in &out.unique[i + 1..] {
                    prop_assert!(a.distance_to(b) >= 200.0);
                }
            }
        }

        #[test]
        fn merging_never_lowers_cable_count(
            base in proptest::option::of(0u32..50),
            other in proptest::option::of(0u32..50),
        ) {
            let mut rep = ground("rep", 0.0, 0.0);
            rep.cable_count = base;
            let mut dup = landing("dup", 0.0, 0.0, 0);
            dup.cable_count = other;

            rep.absorb(&dup);
            let expected = base.into_iter().chain(other).max();
            prop_assert_eq!(rep.cable_count, expected);
        }
    }
}
