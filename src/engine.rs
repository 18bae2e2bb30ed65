use tracing::{debug, info};

use crate::aggregate::aggregate;
use crate::catalog::Catalog;
use crate::distribution::TrafficDistribution;
use crate::error::Result;
use crate::jitter::{JitterSource, RngJitter};
use crate::load::compute_system_load;
use crate::model::compute_api_metrics;
use crate::scenarios::{self, builtin_presets, ScenarioPreset};
use crate::state::SimulationResult;

/// Catalog and presets shared read-only by every run.
#[derive(Clone, Debug)]
pub struct Simulator {
    catalog: Catalog,
    presets: Vec<ScenarioPreset>,
}

impl Simulator {
    pub fn new(catalog: Catalog, presets: Vec<ScenarioPreset>) -> Result<Self> {
        scenarios::validate_presets(&presets, &catalog)?;
        Ok(Self { catalog, presets })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn presets(&self) -> &[ScenarioPreset] {
        &self.presets
    }

    pub fn preset(&self, key: &str) -> Result<&ScenarioPreset> {
        scenarios::find(&self.presets, key)
    }

    /// Runs the model once for `users` spread over `distribution`.
    ///
    /// Every catalog API gets metrics, in catalog order; system load draws its
    /// jitter after the APIs.
    pub fn run(
        &self,
        users: u64,
        distribution: &TrafficDistribution,
        jitter: &mut dyn JitterSource,
    ) -> Result<SimulationResult> {
        distribution.validate(&self.catalog)?;

        let per_api = self
            .catalog
            .iter()
            .map(|api| compute_api_metrics(api, users, distribution.share(&api.id), jitter))
            .collect::<Result<Vec<_>>>()?;
        let system_metrics = compute_system_load(users, jitter);
        debug!(cpu = system_metrics.cpu, memory = system_metrics.memory, "computed system load");

        let result = aggregate(users, distribution, per_api, system_metrics);
        info!(
            users,
            avg_response_time = result.avg_response_time,
            avg_error_rate = result.avg_error_rate,
            errors = result.errors.len(),
            "simulation complete"
        );
        Ok(result)
    }

    pub fn run_preset(&self, key: &str, jitter: &mut dyn JitterSource) -> Result<SimulationResult> {
        let preset = self.preset(key)?;
        info!(scenario = %preset.key, users = preset.users, "running preset");
        self.run(preset.users, &preset.distribution, jitter)
    }

    /// Runs each preset in `keys` with its own jitter stream seeded from
    /// `seed + index`. An empty `keys` runs every preset.
    pub fn compare(&self, keys: &[String], seed: u64) -> Result<Vec<(String, SimulationResult)>> {
        let keys: Vec<&str> = if keys.is_empty() {
            self.presets.iter().map(|preset| preset.key.as_str()).collect()
        } else {
            keys.iter().map(String::as_str).collect()
        };

        keys.into_iter()
            .enumerate()
            .map(|(idx, key)| {
                let mut jitter = RngJitter::seeded(seed.wrapping_add(idx as u64));
                let result = self.run_preset(key, &mut jitter)?;
                Ok((key.to_string(), result))
            })
            .collect()
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self {
            catalog: Catalog::builtin(),
            presets: builtin_presets(),
        }
    }
}
