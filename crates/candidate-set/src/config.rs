//! Pipeline configuration
//!
//! Loaded from an optional TOML file; anything omitted keeps its default.
//!
//! ```toml
//! proximity_threshold_km = 50.0
//! strict_coordinates = false
//!
//! [zones]
//! fallback = "APAC"
//!
//! [[zones.define]]
//! name = "AMERICAS"
//! lon_min = -180.0
//! lon_max = -30.0
//! quota = 72
//! ```

use crate::zone::ZoneLayout;
use crate::{Result, SetError, DEFAULT_THRESHOLD_KM};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Candidates closer than this (km) are the same physical site
    pub proximity_threshold_km: f64,
    pub zones: ZoneLayout,
    /// Drop records with non-finite or out-of-range coordinates
    pub strict_coordinates: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            proximity_threshold_km: DEFAULT_THRESHOLD_KM,
            zones: ZoneLayout::default(),
            strict_coordinates: false,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading pipeline config from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_threshold_km(mut self, threshold_km: f64) -> Self {
        self.proximity_threshold_km = threshold_km;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.proximity_threshold_km.is_finite() || self.proximity_threshold_km <= 0.0 {
            return Err(SetError::InvalidConfig(format!(
                "proximity threshold must be a positive distance, got {}",
                self.proximity_threshold_km
            )));
        }
        self.zones.validate()
    }
}
