use tracing::debug;

use crate::catalog::ApiDefinition;
use crate::distribution::validate_share;
use crate::error::Result;
use crate::jitter::JitterSource;
use crate::state::{ApiMetrics, ErrorEvent};

pub const RESPONSE_TIME_JITTER: (f64, f64) = (-0.10, 0.10);
/// Skewed upwards: error rates degrade faster than they recover.
pub const ERROR_RATE_JITTER: (f64, f64) = (-0.10, 0.20);

const BASELINE_MAX_USERS: u64 = 1_000;
const SCALING_MAX_USERS: u64 = 10_000;

/// User-count range selecting which formula applies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadBand {
    /// Up to 1,000 users.
    Baseline,
    /// 1,001 to 10,000 users.
    Scaling,
    /// More than 10,000 users.
    Saturated,
}

impl LoadBand {
    pub fn for_users(users: u64) -> Self {
        if users <= BASELINE_MAX_USERS {
            LoadBand::Baseline
        } else if users <= SCALING_MAX_USERS {
            LoadBand::Scaling
        } else {
            LoadBand::Saturated
        }
    }

    /// Response time in seconds before jitter.
    pub fn response_time(self, base: f64, users: u64) -> f64 {
        let users = users as f64;
        match self {
            LoadBand::Baseline => base,
            LoadBand::Scaling => base * (1.0 + (users - 1_000.0) / 3_000.0),
            LoadBand::Saturated => base * (4.0 + (users - 10_000.0) / 2_000.0),
        }
    }

    /// Error rate in percent before jitter.
    pub fn error_rate(self, users: u64) -> f64 {
        let users = users as f64;
        match self {
            LoadBand::Baseline => 0.5,
            LoadBand::Scaling => 0.5 + (users - 1_000.0) * 0.00075,
            LoadBand::Saturated => 8.0 + (users - 10_000.0) * 0.0027,
        }
    }
}

struct EventRule {
    threshold: f64,
    events: &'static [(u16, &'static str)],
}

// Cumulative: a rate above 25 also fires the 5 and 15 rules.
const EVENT_RULES: &[EventRule] = &[
    EventRule {
        threshold: 5.0,
        events: &[(429, "Too Many Requests")],
    },
    EventRule {
        threshold: 15.0,
        events: &[(504, "Gateway Timeout")],
    },
    EventRule {
        threshold: 25.0,
        events: &[(503, "Service Unavailable"), (500, "Internal Server Error")],
    },
];

pub fn derive_events(api: &str, error_rate: f64) -> Vec<ErrorEvent> {
    EVENT_RULES
        .iter()
        .filter(|rule| error_rate > rule.threshold)
        .flat_map(|rule| rule.events.iter())
        .map(|(code, message)| ErrorEvent {
            api: api.to_string(),
            code: *code,
            message: message.to_string(),
        })
        .collect()
}

/// Computes response time, error rate and error events for one API.
///
/// `users` is the total for the run; `share` is the percentage routed to this
/// API and only gates event emission.
pub fn compute_api_metrics(
    api: &ApiDefinition,
    users: u64,
    share: f64,
    jitter: &mut dyn JitterSource,
) -> Result<ApiMetrics> {
    validate_share(&api.id, share)?;
    let band = LoadBand::for_users(users);

    let (low, high) = RESPONSE_TIME_JITTER;
    let response_time =
        band.response_time(api.base_latency_s, users) * (1.0 + jitter.uniform(low, high));

    let (low, high) = ERROR_RATE_JITTER;
    let error_rate = band.error_rate(users) * (1.0 + jitter.uniform(low, high));

    let events = if share > 0.0 {
        derive_events(&api.id, error_rate)
    } else {
        Vec::new()
    };
    let routed_users = (users as f64 * share / 100.0).floor() as u64;

    debug!(
        api = %api.id,
        ?band,
        routed_users,
        response_time,
        error_rate,
        events = events.len(),
        "computed api metrics"
    );

    Ok(ApiMetrics {
        api: api.id.clone(),
        response_time: round_to(response_time, 2),
        error_rate: round_to(error_rate, 2),
        events,
    })
}

pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    if decimals == 0 {
        return value.round();
    }
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}
