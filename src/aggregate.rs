use std::collections::BTreeMap;

use crate::distribution::TrafficDistribution;
use crate::model::round_to;
use crate::state::{ApiMetrics, SimulationResult, SystemMetrics};

/// Rolls per-API metrics into a [`SimulationResult`].
///
/// `per_api` must be in catalog order; that order is kept for `errors`.
/// Averages only cover APIs with a share above zero and are 0 when none are.
pub fn aggregate(
    users: u64,
    distribution: &TrafficDistribution,
    per_api: Vec<ApiMetrics>,
    system_metrics: SystemMetrics,
) -> SimulationResult {
    let mut response_time = BTreeMap::new();
    let mut error_rate = BTreeMap::new();
    let mut errors = Vec::new();
    let mut included_response = Vec::new();
    let mut included_error = Vec::new();

    for metrics in per_api {
        if distribution.share(&metrics.api) > 0.0 {
            included_response.push(metrics.response_time);
            included_error.push(metrics.error_rate);
            errors.extend(metrics.events);
        }
        response_time.insert(metrics.api.clone(), metrics.response_time);
        error_rate.insert(metrics.api, metrics.error_rate);
    }

    SimulationResult {
        response_time,
        error_rate,
        system_metrics,
        errors,
        total_users: users,
        avg_response_time: round_to(mean(&included_response), 2),
        avg_error_rate: round_to(mean(&included_error), 2),
        distribution: distribution.clone(),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ErrorEvent;

    fn metrics(api: &str, response_time: f64, error_rate: f64, codes: &[u16]) -> ApiMetrics {
        ApiMetrics {
            api: api.to_string(),
            response_time,
            error_rate,
            events: codes
                .iter()
                .map(|code| ErrorEvent {
                    api: api.to_string(),
                    code: *code,
                    message: String::new(),
                })
                .collect(),
        }
    }

    fn system() -> SystemMetrics {
        SystemMetrics {
            cpu: 50.0,
            memory: 60.0,
        }
    }

    #[test]
    fn averages_skip_zero_share_apis() {
        let dist = TrafficDistribution::new()
            .with_share("a", 50.0)
            .with_share("b", 50.0)
            .with_share("c", 0.0);
        let per_api = vec![
            metrics("a", 1.0, 2.0, &[]),
            metrics("b", 3.0, 4.0, &[]),
            metrics("c", 100.0, 100.0, &[]),
        ];
        let result = aggregate(10, &dist, per_api, system());
        assert_eq!(result.avg_response_time, 2.0);
        assert_eq!(result.avg_error_rate, 3.0);
        assert_eq!(result.response_time.len(), 3);
        assert_eq!(result.response_time["c"], 100.0);
    }

    #[test]
    fn single_included_api_defines_averages() {
        let dist = TrafficDistribution::new().with_share("b", 100.0);
        let per_api = vec![metrics("a", 9.0, 9.0, &[]), metrics("b", 1.37, 6.42, &[])];
        let result = aggregate(10, &dist, per_api, system());
        assert_eq!(result.avg_response_time, 1.37);
        assert_eq!(result.avg_error_rate, 6.42);
    }

    #[test]
    fn all_zero_shares_give_zero_result() {
        let dist = TrafficDistribution::new().with_share("a", 0.0);
        let per_api = vec![metrics("a", 5.0, 30.0, &[429])];
        let result = aggregate(10, &dist, per_api, system());
        assert_eq!(result.avg_response_time, 0.0);
        assert_eq!(result.avg_error_rate, 0.0);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn empty_distribution_gives_zero_result() {
        let result = aggregate(0, &TrafficDistribution::new(), Vec::new(), system());
        assert_eq!(result.avg_response_time, 0.0);
        assert_eq!(result.avg_error_rate, 0.0);
        assert!(result.response_time.is_empty());
    }

    #[test]
    fn errors_keep_catalog_then_emission_order() {
        let dist = TrafficDistribution::new()
            .with_share("z", 50.0)
            .with_share("a", 50.0);
        let per_api = vec![
            metrics("z", 1.0, 20.0, &[429, 504]),
            metrics("a", 1.0, 6.0, &[429]),
        ];
        let result = aggregate(10, &dist, per_api, system());
        let order: Vec<(&str, u16)> = result
            .errors
            .iter()
            .map(|event| (event.api.as_str(), event.code))
            .collect();
        assert_eq!(order, vec![("z", 429), ("z", 504), ("a", 429)]);
    }
}
