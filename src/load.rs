use crate::jitter::JitterSource;
use crate::model::{round_to, LoadBand};
use crate::state::SystemMetrics;

pub const SYSTEM_LOAD_JITTER: (f64, f64) = (-0.05, 0.05);
pub const UTILIZATION_CEILING: f64 = 100.0;

/// CPU and memory utilization in percent before jitter.
pub fn base_system_load(users: u64) -> SystemMetrics {
    let band = LoadBand::for_users(users);
    let users = users as f64;
    match band {
        LoadBand::Baseline => SystemMetrics {
            cpu: 45.0,
            memory: 60.0,
        },
        LoadBand::Scaling => SystemMetrics {
            cpu: 45.0 + (users - 1_000.0) * 0.004,
            memory: 60.0 + (users - 1_000.0) * 0.003,
        },
        LoadBand::Saturated => SystemMetrics {
            cpu: 85.0 + (users - 10_000.0) * 0.0015,
            memory: 90.0 + (users - 10_000.0) * 0.0005,
        },
    }
}

/// Global utilization for `users`, independent of the traffic distribution.
///
/// CPU and memory draw separate jitter offsets and are capped at 100%.
pub fn compute_system_load(users: u64, jitter: &mut dyn JitterSource) -> SystemMetrics {
    let base = base_system_load(users);
    let (low, high) = SYSTEM_LOAD_JITTER;
    let cpu = (base.cpu * (1.0 + jitter.uniform(low, high))).min(UTILIZATION_CEILING);
    let memory = (base.memory * (1.0 + jitter.uniform(low, high))).min(UTILIZATION_CEILING);

    SystemMetrics {
        cpu: round_to(cpu, 1),
        memory: round_to(memory, 1),
    }
}
