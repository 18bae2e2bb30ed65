use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::error::{Error, Result};

/// Percentage of traffic routed to each API, keyed by API id.
///
/// Ids that are absent carry a share of 0. The sum is expected to be 100 but
/// is only enforced by callers that collect distributions from users.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct TrafficDistribution(BTreeMap<String, f64>);

impl TrafficDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_share(mut self, api: &str, share: f64) -> Self {
        self.insert(api, share);
        self
    }

    pub fn insert(&mut self, api: &str, share: f64) -> Option<f64> {
        self.0.insert(api.to_string(), share)
    }

    pub fn share(&self, api: &str) -> f64 {
        self.0.get(api).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, api: &str) -> bool {
        self.0.contains_key(api)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(api, share)| (api.as_str(), *share))
    }

    /// Entries with a share above zero.
    pub fn active(&self) -> impl Iterator<Item = (&str, f64)> {
        self.iter().filter(|(_, share)| *share > 0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Checks every entry names a catalog API and lies within 0..=100.
    pub fn validate(&self, catalog: &Catalog) -> Result<()> {
        for (api, share) in self.iter() {
            if !catalog.contains(api) {
                return Err(Error::UnknownApi(api.to_string()));
            }
            validate_share(api, share)?;
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for TrafficDistribution {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(api, share)| (api.into(), share))
                .collect(),
        )
    }
}

pub fn validate_share(api: &str, share: f64) -> Result<()> {
    if !share.is_finite() || !(0.0..=100.0).contains(&share) {
        return Err(Error::InvalidShare {
            api: api.to_string(),
            share,
        });
    }
    Ok(())
}
