//! Data loading from JSON files

use crate::normalize::{RawCableLanding, RawGroundNode};
use crate::{Result, SetError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Raw records read from one file
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    /// Elements that could not be read as a record at all
    pub malformed: usize,
}

/// Convert each element on its own so one bad record never sinks the file
fn parse_records<T: DeserializeOwned>(items: Vec<Value>, kind: &str) -> Loaded<T> {
    let mut records = Vec::with_capacity(items.len());
    let mut malformed = 0;

    for (i, item) in items.into_iter().enumerate() {
        match serde_json::from_value(item) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("Skipping malformed {} record #{}: {}", kind, i, e);
                malformed += 1;
            }
        }
    }

    Loaded { records, malformed }
}

/// Read raw ground nodes (a JSON array)
pub fn read_ground_nodes(path: impl AsRef<Path>) -> Result<Loaded<RawGroundNode>> {
    let path = path.as_ref();
    info!("Loading ground nodes from {:?}", path);

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let items: Vec<Value> = serde_json::from_reader(reader)?;

    Ok(parse_records(items, "ground node"))
}

/// Read raw cable landings: either `{"landing_points": [...]}` or a bare array
pub fn read_cable_landings(path: impl AsRef<Path>) -> Result<Loaded<RawCableLanding>> {
    let path = path.as_ref();
    info!("Loading cable landings from {:?}", path);

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let raw: Value = serde_json::from_reader(reader)?;

    parse_cable_landings(raw)
}

pub fn parse_cable_landings(mut raw: Value) -> Result<Loaded<RawCableLanding>> {
    let items: Vec<Value> = if let Some(lp) = raw.get_mut("landing_points") {
        serde_json::from_value(lp.take())?
    } else if raw.is_array() {
        serde_json::from_value(raw)?
    } else {
        return Err(SetError::UnsupportedLayout(
            "cable landings must be an array or an object with `landing_points`".into(),
        ));
    };

    Ok(parse_records(items, "cable landing"))
}
