use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::catalog::{ApiDefinition, Catalog};
use crate::distribution::{validate_share, TrafficDistribution};
use crate::engine::Simulator;
use crate::error::{Error, Result};
use crate::jitter::JitterMode;
use crate::persist::DEFAULT_RESULTS_FILE;
use crate::scenarios::{
    builtin_presets, default_custom_distribution, ScenarioPreset, DEFAULT_CUSTOM_USERS,
};

const SHARE_TOTAL: f64 = 100.0;
const SHARE_TOLERANCE: f64 = 1e-9;

#[derive(Parser, Debug)]
#[command(name = "fin-loadsim", version)]
#[command(about = "Estimate load-test metrics for financial service APIs")]
pub struct Args {
    /// TOML or JSON file replacing the built-in APIs and scenarios
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the APIs available for simulation
    ListApis,
    /// List the predefined scenarios
    ListScenarios,
    /// Print the effective catalog and scenarios
    ShowConfig,
    /// Run a predefined or custom scenario
    Run(RunArgs),
    /// Run several predefined scenarios side by side
    Compare(CompareArgs),
    /// Render a previously saved result
    Report(ReportArgs),
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    #[arg(long, conflicts_with_all = ["users", "distribution", "shares"])]
    pub scenario: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub users: Option<i64>,
    /// Comma separated api:percent entries
    #[arg(long)]
    pub distribution: Option<String>,
    /// Single api:percent entry, may be repeated
    #[arg(long = "share")]
    pub shares: Vec<String>,
    #[arg(long, conflicts_with = "no_jitter")]
    pub seed: Option<u64>,
    #[arg(long)]
    pub no_jitter: bool,
    #[arg(long, value_enum, default_value_t = FormatArg::Human)]
    pub format: FormatArg,
    /// Write the result as JSON to this path
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct CompareArgs {
    /// Scenario key, may be repeated; defaults to every scenario
    #[arg(long = "scenario")]
    pub scenarios: Vec<String>,
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    #[arg(long, default_value = DEFAULT_RESULTS_FILE)]
    pub input: PathBuf,
    #[arg(long, value_enum, default_value_t = FormatArg::Human)]
    pub format: FormatArg,
}

#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum FormatArg {
    Human,
    Summary,
    Json,
    Chart,
}

/// Optional overrides read from `--config`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub apis: Option<Vec<ApiDefinition>>,
    #[serde(default)]
    pub scenarios: Option<Vec<ScenarioPreset>>,
}

/// Resolved inputs for a single run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunPlan {
    pub label: String,
    pub users: u64,
    pub distribution: TrafficDistribution,
    pub jitter: JitterMode,
    pub seed: Option<u64>,
}

pub fn parse_args() -> Result<Args> {
    Args::try_parse().map_err(|err| match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
        _ => Error::Cli(err.to_string()),
    })
}

pub fn load_config(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path).map_err(|err| {
        Error::ConfigIo(format!(
            "failed to read config '{}': {}",
            path.display(),
            err
        ))
    })?;
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .unwrap_or("");

    match ext {
        "toml" => toml::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse TOML: {}", err))),
        "json" => serde_json::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse JSON: {}", err))),
        "" => Err(Error::UnsupportedConfigFormat("unknown".to_string())),
        _ => Err(Error::UnsupportedConfigFormat(ext.to_string())),
    }
}

pub fn build_simulator(path: Option<&Path>) -> Result<Simulator> {
    let file = match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            load_config(path)?
        }
        None => FileConfig::default(),
    };

    let catalog = match file.apis {
        Some(apis) => Catalog::new(apis)?,
        None => Catalog::builtin(),
    };
    let presets = file.scenarios.unwrap_or_else(builtin_presets);
    Simulator::new(catalog, presets)
}

pub fn build_run(args: &RunArgs, simulator: &Simulator) -> Result<RunPlan> {
    let (jitter, seed) = match (args.no_jitter, args.seed) {
        (true, _) => (JitterMode::Off, None),
        (false, Some(seed)) => (JitterMode::Seeded, Some(seed)),
        (false, None) => (JitterMode::Random, None),
    };

    if let Some(key) = &args.scenario {
        let preset = simulator.preset(key)?;
        return Ok(RunPlan {
            label: preset.key.clone(),
            users: preset.users,
            distribution: preset.distribution.clone(),
            jitter,
            seed,
        });
    }

    let users = match args.users {
        Some(users) => u64::try_from(users).map_err(|_| Error::NegativeUserCount(users))?,
        None => DEFAULT_CUSTOM_USERS,
    };
    let has_shares = args.distribution.is_some() || !args.shares.is_empty();
    let distribution = if has_shares {
        parse_distribution(
            args.distribution.as_deref().unwrap_or(""),
            &args.shares,
            simulator.catalog(),
        )?
    } else {
        let fallback = default_custom_distribution();
        if let Some((api, _)) = fallback
            .iter()
            .find(|(api, _)| !simulator.catalog().contains(api))
        {
            return Err(Error::DistributionRequired(api.to_string()));
        }
        fallback
    };

    Ok(RunPlan {
        label: "custom".to_string(),
        users,
        distribution,
        jitter,
        seed,
    })
}

/// Parses `api:percent` entries from a comma separated list plus repeated
/// entries. The shares must sum to 100; catalog APIs left out get 0.
pub fn parse_distribution(
    csv: &str,
    entries: &[String],
    catalog: &Catalog,
) -> Result<TrafficDistribution> {
    let csv_entries: Vec<&str> = if csv.trim().is_empty() {
        Vec::new()
    } else {
        csv.split(',').collect()
    };

    let mut distribution = TrafficDistribution::new();
    let mut seen = HashSet::new();
    for entry in csv_entries.into_iter().chain(entries.iter().map(String::as_str)) {
        let (api, share) = parse_share(entry)?;
        if !catalog.contains(&api) {
            return Err(Error::UnknownApi(api));
        }
        validate_share(&api, share)?;
        if !seen.insert(api.clone()) {
            return Err(Error::DuplicateShare(api));
        }
        distribution.insert(&api, share);
    }

    let total = distribution.total();
    if (total - SHARE_TOTAL).abs() > SHARE_TOLERANCE {
        return Err(Error::DistributionSum(total));
    }

    for api in catalog.iter() {
        if !distribution.contains(&api.id) {
            distribution.insert(&api.id, 0.0);
        }
    }
    Ok(distribution)
}

fn parse_share(entry: &str) -> Result<(String, f64)> {
    let trimmed = entry.trim();
    let mut parts = trimmed.split(':');
    let api = parts.next().unwrap_or("").trim();
    let share = parts.next().unwrap_or("").trim();
    if parts.next().is_some() || api.is_empty() || share.is_empty() {
        return Err(Error::InvalidShareEntry(trimmed.to_string()));
    }
    let share: f64 = share
        .parse()
        .map_err(|_| Error::InvalidShareEntry(trimmed.to_string()))?;
    Ok((api.to_string(), share))
}
