use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::distribution::TrafficDistribution;
use crate::error::{Error, Result};

/// Users simulated when a custom run does not specify a count.
pub const DEFAULT_CUSTOM_USERS: u64 = 5_000;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ScenarioPreset {
    pub key: String,
    pub name: String,
    pub users: u64,
    pub distribution: TrafficDistribution,
}

fn preset(key: &str, name: &str, users: u64, shares: [(&str, f64); 5]) -> ScenarioPreset {
    ScenarioPreset {
        key: key.to_string(),
        name: name.to_string(),
        users,
        distribution: shares.into_iter().collect(),
    }
}

pub fn builtin_presets() -> Vec<ScenarioPreset> {
    vec![
        preset(
            "normal",
            "Normal load (1,000 users)",
            1_000,
            [
                ("auth", 0.0),
                ("balance", 40.0),
                ("p2p", 30.0),
                ("qr", 20.0),
                ("withdrawal", 10.0),
            ],
        ),
        preset(
            "high",
            "High load (10,000 users)",
            10_000,
            [
                ("auth", 0.0),
                ("balance", 25.0),
                ("p2p", 45.0),
                ("qr", 20.0),
                ("withdrawal", 10.0),
            ],
        ),
        preset(
            "extreme",
            "Extreme load (20,000 users)",
            20_000,
            [
                ("auth", 20.0),
                ("balance", 20.0),
                ("p2p", 40.0),
                ("qr", 15.0),
                ("withdrawal", 5.0),
            ],
        ),
    ]
}

/// Distribution used for custom runs that omit one.
pub fn default_custom_distribution() -> TrafficDistribution {
    [
        ("auth", 10.0),
        ("balance", 30.0),
        ("p2p", 40.0),
        ("qr", 15.0),
        ("withdrawal", 5.0),
    ]
    .into_iter()
    .collect()
}

pub fn find<'a>(presets: &'a [ScenarioPreset], key: &str) -> Result<&'a ScenarioPreset> {
    presets
        .iter()
        .find(|preset| preset.key == key)
        .ok_or_else(|| Error::UnknownScenario(key.to_string()))
}

pub fn validate_presets(presets: &[ScenarioPreset], catalog: &Catalog) -> Result<()> {
    let mut keys = HashSet::new();
    for preset in presets {
        if !keys.insert(preset.key.as_str()) {
            return Err(Error::DuplicateScenario(preset.key.clone()));
        }
        preset.distribution.validate(catalog)?;
    }
    Ok(())
}
