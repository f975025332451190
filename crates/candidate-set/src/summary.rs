//! Per-zone aggregation for quota reporting

use crate::zone::ZoneLayout;
use crate::Candidate;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Index;

/// Zone name → value, kept in zone declaration order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ZoneMap(Vec<(String, usize)>);

impl ZoneMap {
    pub fn get(&self, zone: &str) -> Option<&usize> {
        self.0.iter().find(|(z, _)| z == zone).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(z, _)| z.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &usize> {
        self.0.iter().map(|(_, v)| v)
    }
}

impl FromIterator<(String, usize)> for ZoneMap {
    fn from_iter<I: IntoIterator<Item = (String, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Index<&str> for ZoneMap {
    type Output = usize;

    fn index(&self, zone: &str) -> &usize {
        self.get(zone)
            .unwrap_or_else(|| panic!("zone {} not in map", zone))
    }
}

impl Serialize for ZoneMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(z, v)| (z, v)))
    }
}

impl<'de> Deserialize<'de> for ZoneMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ZoneMapVisitor;

        impl<'de> Visitor<'de> for ZoneMapVisitor {
            type Value = ZoneMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of zone name to count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<ZoneMap, A::Error> {
                let mut entries = Vec::new();
                while let Some(entry) = access.next_entry::<String, usize>()? {
                    entries.push(entry);
                }
                Ok(ZoneMap(entries))
            }
        }

        deserializer.deserialize_map(ZoneMapVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneCount {
    pub zone: String,
    pub count: usize,
    pub quota: usize,
}

impl ZoneCount {
    /// Stations still missing to meet the quota
    pub fn shortfall(&self) -> usize {
        self.quota.saturating_sub(self.count)
    }
}

/// Candidate counts for every declared zone, in declaration order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoneSummary {
    pub zones: Vec<ZoneCount>,
}

impl ZoneSummary {
    pub fn count(&self, zone: &str) -> Option<usize> {
        self.zones.iter().find(|z| z.zone == zone).map(|z| z.count)
    }

    pub fn total(&self) -> usize {
        self.zones.iter().map(|z| z.count).sum()
    }

    pub fn distribution(&self) -> ZoneMap {
        self.zones.iter().map(|z| (z.zone.clone(), z.count)).collect()
    }

    pub fn quotas(&self) -> ZoneMap {
        self.zones.iter().map(|z| (z.zone.clone(), z.quota)).collect()
    }

    /// Zones with fewer candidates than their quota
    pub fn below_quota(&self) -> impl Iterator<Item = &ZoneCount> {
        self.zones.iter().filter(|z| z.count < z.quota)
    }
}

/// Summarize candidate counts by zone
///
/// Every declared zone appears, including those with no candidates.
/// Candidates tagged with an undeclared zone are not counted.
pub fn summarize_by_zone(candidates: &[Candidate], layout: &ZoneLayout) -> ZoneSummary {
    let mut zones: Vec<ZoneCount> = layout
        .zones
        .iter()
        .map(|z| ZoneCount {
            zone: z.name.clone(),
            count: 0,
            quota: z.quota,
        })
        .collect();

    for c in candidates {
        if let Some(entry) = zones.iter_mut().find(|z| z.zone == c.zone) {
            entry.count += 1;
        }
    }

    ZoneSummary { zones }
}

/// Top `n` candidates by cable count, highest first
pub fn top_by_cable_count(candidates: &[Candidate], n: usize) -> Vec<&Candidate> {
    let mut by_cables: Vec<&Candidate> = candidates.iter().collect();
    by_cables.sort_by_key(|c| std::cmp::Reverse(c.cable_count.unwrap_or(0)));
    by_cables.truncate(n);
    by_cables
}
