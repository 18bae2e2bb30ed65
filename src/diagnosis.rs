use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::Catalog;
use crate::state::SimulationResult;

pub const DEGRADED_ERROR_RATE: f64 = 5.0;
pub const OVERLOADED_ERROR_RATE: f64 = 15.0;
const OPTIMIZE_ERROR_RATE: f64 = 8.0;
const AUTOSCALE_CPU: f64 = 75.0;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Optimal,
    Degraded,
    Overloaded,
}

impl Severity {
    pub fn from_error_rate(avg_error_rate: f64) -> Self {
        if avg_error_rate < DEGRADED_ERROR_RATE {
            Severity::Optimal
        } else if avg_error_rate < OVERLOADED_ERROR_RATE {
            Severity::Degraded
        } else {
            Severity::Overloaded
        }
    }

    pub fn verdict(&self) -> &'static str {
        match self {
            Severity::Optimal => "The system performs optimally under this load.",
            Severity::Degraded => {
                "The system shows signs of degradation. Optimize the APIs with the highest error rates."
            }
            Severity::Overloaded => {
                "System overloaded! Smart throttling, transaction prioritization and immediate horizontal scaling are required."
            }
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Optimal => "optimal",
            Severity::Degraded => "degraded",
            Severity::Overloaded => "overloaded",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Recommendation {
    pub rule: String,
    pub title: String,
    pub detail: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Diagnosis {
    pub severity: Severity,
    pub recommendations: Vec<Recommendation>,
}

struct Rule {
    id: &'static str,
    title: &'static str,
    applies: fn(&SimulationResult) -> bool,
    detail: fn(&SimulationResult, &Catalog) -> String,
}

// Every matching rule fires, in table order.
const RULES: &[Rule] = &[
    Rule {
        id: "optimize-slowest-api",
        title: "Optimize the slowest API",
        applies: high_error_rate,
        detail: optimize_detail,
    },
    Rule {
        id: "scale-horizontally",
        title: "Scale horizontally",
        applies: high_cpu,
        detail: autoscale_detail,
    },
    Rule {
        id: "review-rate-limits",
        title: "Review rate limiting policies",
        applies: has_rate_limited,
        detail: rate_limit_detail,
    },
    Rule {
        id: "graceful-degradation",
        title: "Implement graceful degradation",
        applies: has_server_failures,
        detail: degradation_detail,
    },
    Rule {
        id: "continuous-monitoring",
        title: "Continuous monitoring",
        applies: healthy_error_rate,
        detail: monitoring_detail,
    },
];

fn high_error_rate(result: &SimulationResult) -> bool {
    result.avg_error_rate > OPTIMIZE_ERROR_RATE
}

fn high_cpu(result: &SimulationResult) -> bool {
    result.system_metrics.cpu > AUTOSCALE_CPU
}

fn has_rate_limited(result: &SimulationResult) -> bool {
    result.has_error_code(429)
}

fn has_server_failures(result: &SimulationResult) -> bool {
    result.has_error_code(500) || result.has_error_code(503)
}

fn healthy_error_rate(result: &SimulationResult) -> bool {
    result.avg_error_rate < DEGRADED_ERROR_RATE
}

fn optimize_detail(result: &SimulationResult, catalog: &Catalog) -> String {
    match result.slowest_api(catalog) {
        Some((api, time)) => format!(
            "'{}' shows the highest response time ({:.2}s). Cache recurring operations and optimize database queries.",
            api, time
        ),
        None => "Cache recurring operations and optimize database queries.".to_string(),
    }
}

fn autoscale_detail(_: &SimulationResult, _: &Catalog) -> String {
    "CPU usage exceeds 75%. Enable auto-scaling to add nodes during demand peaks.".to_string()
}

fn rate_limit_detail(_: &SimulationResult, _: &Catalog) -> String {
    "429 (Too Many Requests) errors show the current rate limits are too strict for this user volume."
        .to_string()
}

fn degradation_detail(_: &SimulationResult, _: &Catalog) -> String {
    "503 and 500 errors point to complete failures. Add circuit breakers and controlled degradation to keep critical features available."
        .to_string()
}

fn monitoring_detail(_: &SimulationResult, _: &Catalog) -> String {
    "The system performs well. Set up continuous monitoring to catch shifts in usage patterns and anticipate future peaks."
        .to_string()
}

pub fn diagnose(result: &SimulationResult, catalog: &Catalog) -> Diagnosis {
    let recommendations = RULES
        .iter()
        .filter(|rule| (rule.applies)(result))
        .map(|rule| Recommendation {
            rule: rule.id.to_string(),
            title: rule.title.to_string(),
            detail: (rule.detail)(result, catalog),
        })
        .collect();

    Diagnosis {
        severity: Severity::from_error_rate(result.avg_error_rate),
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ApiDefinition, HttpMethod};
    use crate::distribution::TrafficDistribution;
    use crate::state::{ErrorEvent, SystemMetrics};
    use std::collections::BTreeMap;

    fn result(avg_error_rate: f64, cpu: f64, codes: &[u16]) -> SimulationResult {
        let response_time: BTreeMap<String, f64> =
            [("balance".to_string(), 1.5), ("p2p".to_string(), 2.5)]
                .into_iter()
                .collect();
        SimulationResult {
            error_rate: response_time.clone(),
            response_time,
            system_metrics: SystemMetrics { cpu, memory: 50.0 },
            errors: codes
                .iter()
                .map(|code| ErrorEvent {
                    api: "p2p".to_string(),
                    code: *code,
                    message: String::new(),
                })
                .collect(),
            total_users: 1_000,
            avg_response_time: 2.0,
            avg_error_rate,
            distribution: TrafficDistribution::new()
                .with_share("balance", 50.0)
                .with_share("p2p", 50.0),
        }
    }

    fn diagnose_builtin(result: &SimulationResult) -> Diagnosis {
        diagnose(result, &Catalog::builtin())
    }

    fn rule_ids(diagnosis: &Diagnosis) -> Vec<&str> {
        diagnosis
            .recommendations
            .iter()
            .map(|rec| rec.rule.as_str())
            .collect()
    }

    #[test]
    fn severity_thresholds() {
        assert_eq!(Severity::from_error_rate(0.0), Severity::Optimal);
        assert_eq!(Severity::from_error_rate(4.99), Severity::Optimal);
        assert_eq!(Severity::from_error_rate(5.0), Severity::Degraded);
        assert_eq!(Severity::from_error_rate(14.99), Severity::Degraded);
        assert_eq!(Severity::from_error_rate(15.0), Severity::Overloaded);
    }

    #[test]
    fn optimal_run_only_recommends_monitoring() {
        let diagnosis = diagnose_builtin(&result(0.5, 45.0, &[]));
        assert_eq!(diagnosis.severity, Severity::Optimal);
        assert_eq!(rule_ids(&diagnosis), vec!["continuous-monitoring"]);
    }

    #[test]
    fn overloaded_run_fires_rules_in_order() {
        let diagnosis = diagnose_builtin(&result(35.0, 100.0, &[429, 504, 503, 500]));
        assert_eq!(diagnosis.severity, Severity::Overloaded);
        assert_eq!(
            rule_ids(&diagnosis),
            vec![
                "optimize-slowest-api",
                "scale-horizontally",
                "review-rate-limits",
                "graceful-degradation",
            ]
        );
    }

    #[test]
    fn degraded_below_optimize_threshold_has_no_recommendation() {
        let diagnosis = diagnose_builtin(&result(6.0, 50.0, &[]));
        assert_eq!(diagnosis.severity, Severity::Degraded);
        assert!(diagnosis.recommendations.is_empty());
    }

    #[test]
    fn rate_limit_rule_needs_429() {
        let diagnosis = diagnose_builtin(&result(6.0, 50.0, &[429]));
        assert_eq!(rule_ids(&diagnosis), vec!["review-rate-limits"]);
    }

    #[test]
    fn degradation_rule_fires_on_503_alone() {
        let diagnosis = diagnose_builtin(&result(6.0, 50.0, &[503]));
        assert_eq!(rule_ids(&diagnosis), vec!["graceful-degradation"]);
    }

    #[test]
    fn optimize_detail_names_slowest_included_api() {
        let diagnosis = diagnose_builtin(&result(9.0, 50.0, &[]));
        assert_eq!(rule_ids(&diagnosis), vec!["optimize-slowest-api"]);
        assert!(diagnosis.recommendations[0].detail.starts_with("'p2p' shows"));
        assert!(diagnosis.recommendations[0].detail.contains("(2.50s)"));
    }

    #[test]
    fn optimize_detail_breaks_ties_in_catalog_order() {
        let api = |id: &str| ApiDefinition {
            id: id.to_string(),
            name: id.to_string(),
            path: format!("/{}", id),
            method: HttpMethod::Get,
            base_latency_s: 1.0,
        };
        let catalog = Catalog::new(vec![api("p2p"), api("balance")]).unwrap();
        let mut tied = result(9.0, 50.0, &[]);
        tied.response_time.insert("balance".to_string(), 2.5);

        let diagnosis = diagnose(&tied, &catalog);
        assert!(diagnosis.recommendations[0].detail.starts_with("'p2p' shows"));
        let diagnosis = diagnose_builtin(&tied);
        assert!(diagnosis.recommendations[0].detail.starts_with("'balance' shows"));
    }
}
