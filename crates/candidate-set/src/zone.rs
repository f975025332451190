//! Longitude-band zone classification
//!
//! Zones are half-open longitude intervals `[lon_min, lon_max)` evaluated in
//! declaration order; the first interval containing the longitude wins.
//! Anything no interval claims (exactly 180°, NaN) resolves to the fallback.

use crate::{Result, SetError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const AMERICAS: &str = "AMERICAS";
pub const EMEA: &str = "EMEA";
pub const APAC: &str = "APAC";

/// A named longitude band with its station quota
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDef {
    pub name: String,
    pub lon_min: f64,
    pub lon_max: f64,
    /// Stations wanted from this zone downstream; reporting only
    pub quota: usize,
}

impl ZoneDef {
    pub fn new(name: impl Into<String>, lon_min: f64, lon_max: f64, quota: usize) -> Self {
        Self {
            name: name.into(),
            lon_min,
            lon_max,
            quota,
        }
    }

    pub fn contains(&self, lon: f64) -> bool {
        self.lon_min <= lon && lon < self.lon_max
    }
}

/// Ordered zone partition plus the zone used when no interval matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneLayout {
    #[serde(rename = "define")]
    pub zones: Vec<ZoneDef>,
    pub fallback: String,
}

impl Default for ZoneLayout {
    /// 72 + 85 + 90 = 247 stations
    fn default() -> Self {
        Self {
            zones: vec![
                ZoneDef::new(AMERICAS, -180.000000000, -30.000000000, 72),
                ZoneDef::new(EMEA, -30.000000000, 60.000000000, 85),
                ZoneDef::new(APAC, 60.000000000, 180.000000000, 90),
            ],
            fallback: APAC.to_string(),
        }
    }
}

impl ZoneLayout {
    /// Assign zone based on longitude
    pub fn assign_zone(&self, lon: f64) -> &str {
        self.zones
            .iter()
            .find(|z| z.contains(lon))
            .map(|z| z.name.as_str())
            .unwrap_or(self.fallback.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&ZoneDef> {
        self.zones.iter().find(|z| z.name == name)
    }

    pub fn total_quota(&self) -> usize {
        self.zones.iter().map(|z| z.quota).sum()
    }

    /// Check the layout is well formed and covers [-180, 180)
    pub fn validate(&self) -> Result<()> {
        if self.zones.is_empty() {
            return Err(SetError::InvalidConfig("no zones declared".into()));
        }

        let mut seen = HashSet::new();
        for z in &self.zones {
            if !(z.lon_min.is_finite() && z.lon_max.is_finite()) || z.lon_min >= z.lon_max {
                return Err(SetError::InvalidConfig(format!(
                    "zone {} has empty or non-finite interval [{}, {})",
                    z.name, z.lon_min, z.lon_max
                )));
            }
            if !seen.insert(z.name.as_str()) {
                return Err(SetError::InvalidConfig(format!(
                    "zone {} declared twice",
                    z.name
                )));
            }
        }

        if self.get(&self.fallback).is_none() {
            return Err(SetError::InvalidConfig(format!(
                "fallback zone {} is not declared",
                self.fallback
            )));
        }

        // Sweep intervals by lower bound; overlaps are fine, gaps are not
        let mut spans: Vec<(f64, f64)> = self.zones.iter().map(|z| (z.lon_min, z.lon_max)).collect();
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut covered_to = -180.000000000;
        for (lo, hi) in spans {
            if lo > covered_to {
                break;
            }
            covered_to = f64::max(covered_to, hi);
        }
        if covered_to < 180.000000000 {
            return Err(SetError::InvalidConfig(format!(
                "zones leave longitude {} uncovered",
                covered_to
            )));
        }

        Ok(())
    }
}
