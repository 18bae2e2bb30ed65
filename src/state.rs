use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::distribution::TrafficDistribution;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ErrorEvent {
    pub api: String,
    pub code: u16,
    pub message: String,
}

/// Output of the metrics model for one API in one run.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiMetrics {
    pub api: String,
    pub response_time: f64,
    pub error_rate: f64,
    pub events: Vec<ErrorEvent>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct SystemMetrics {
    pub cpu: f64,
    pub memory: f64,
}

/// Outcome of one simulation run.
///
/// `response_time` and `error_rate` cover every catalog API; the averages and
/// `errors` only cover APIs with a non-zero share.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SimulationResult {
    pub response_time: BTreeMap<String, f64>,
    pub error_rate: BTreeMap<String, f64>,
    pub system_metrics: SystemMetrics,
    pub errors: Vec<ErrorEvent>,
    pub total_users: u64,
    pub avg_response_time: f64,
    pub avg_error_rate: f64,
    pub distribution: TrafficDistribution,
}

impl SimulationResult {
    pub fn has_error_code(&self, code: u16) -> bool {
        self.errors.iter().any(|event| event.code == code)
    }

    /// APIs with a non-zero share, catalog APIs first in catalog order.
    pub fn included_apis(&self, catalog: &Catalog) -> Vec<&str> {
        let listed = catalog
            .iter()
            .map(|api| api.id.as_str())
            .filter(|id| self.response_time.contains_key(*id));
        let unlisted = self
            .response_time
            .keys()
            .map(String::as_str)
            .filter(|id| !catalog.contains(id));
        listed
            .chain(unlisted)
            .filter(|id| self.distribution.share(id) > 0.0)
            .filter_map(|id| self.response_time.get_key_value(id))
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Included API with the highest response time. Ties keep the API that
    /// comes first in the catalog.
    pub fn slowest_api(&self, catalog: &Catalog) -> Option<(&str, f64)> {
        self.included_apis(catalog)
            .into_iter()
            .filter_map(|api| self.response_time.get(api).map(|time| (api, *time)))
            .fold(None, |slowest, (api, time)| match slowest {
                Some((_, best)) if best >= time => slowest,
                _ => Some((api, time)),
            })
    }
}
