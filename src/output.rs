use serde::Serialize;
use std::fmt::Write;
use tracing::warn;

use crate::catalog::Catalog;
use crate::diagnosis::{
    diagnose, Diagnosis, Severity, DEGRADED_ERROR_RATE, OVERLOADED_ERROR_RATE,
};
use crate::engine::Simulator;
use crate::error::{Error, Result};
use crate::scenarios::ScenarioPreset;
use crate::state::SimulationResult;

const BAR_WIDTH: usize = 40;

/// A result together with its diagnosis and the labels used to render it.
#[derive(Serialize)]
pub struct Report<'a> {
    pub scenario: String,
    pub jitter: String,
    pub result: SimulationResult,
    pub diagnosis: Diagnosis,
    #[serde(skip)]
    pub catalog: &'a Catalog,
}

impl<'a> Report<'a> {
    pub fn new(
        scenario: impl Into<String>,
        jitter: impl Into<String>,
        result: SimulationResult,
        catalog: &'a Catalog,
    ) -> Self {
        let diagnosis = diagnose(&result, catalog);
        Self {
            scenario: scenario.into(),
            jitter: jitter.into(),
            result,
            diagnosis,
            catalog,
        }
    }

    fn included_apis(&self) -> Vec<&str> {
        self.result.included_apis(self.catalog)
    }
}

pub trait Formatter {
    fn write(&self, report: &Report) -> String;
}

pub struct HumanFormatter;
pub struct SummaryFormatter;
pub struct JsonFormatter;
pub struct ChartFormatter;

impl Formatter for HumanFormatter {
    fn write(&self, report: &Report) -> String {
        let mut out = String::new();
        write_metadata(&mut out, report);
        write_metrics(&mut out, report);

        let apis = report.included_apis();
        let _ = writeln!(out, "Response times:");
        for api in &apis {
            if let Some(time) = report.result.response_time.get(*api) {
                let _ = writeln!(out, "- {}: {:.2}s", report.catalog.display_name(api), time);
            }
        }
        let _ = writeln!(out, "Error rates:");
        for api in &apis {
            if let Some(rate) = report.result.error_rate.get(*api) {
                let _ = writeln!(out, "- {}: {:.2}%", report.catalog.display_name(api), rate);
            }
        }

        if !report.result.errors.is_empty() {
            let _ = writeln!(out, "Errors:");
            for event in &report.result.errors {
                let _ = writeln!(
                    out,
                    "- {}: {} {}",
                    report.catalog.display_name(&event.api),
                    event.code,
                    event.message
                );
            }
        }

        write_diagnosis(&mut out, &report.diagnosis);
        let _ = writeln!(out, "Recommendations:");
        for (idx, rec) in report.diagnosis.recommendations.iter().enumerate() {
            let _ = writeln!(out, "{}. {}: {}", idx + 1, rec.title, rec.detail);
        }
        out
    }
}

impl Formatter for SummaryFormatter {
    fn write(&self, report: &Report) -> String {
        let mut out = String::new();
        write_metadata(&mut out, report);
        write_metrics(&mut out, report);
        write_diagnosis(&mut out, &report.diagnosis);
        out
    }
}

impl Formatter for JsonFormatter {
    fn write(&self, report: &Report) -> String {
        let mut out = match report_to_json(report) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "failed to encode report as json");
                serde_json::json!({ "error": err.to_string() }).to_string()
            }
        };
        out.push('\n');
        out
    }
}

impl Formatter for ChartFormatter {
    fn write(&self, report: &Report) -> String {
        let mut out = String::new();
        let result = &report.result;
        let _ = writeln!(
            out,
            "Simulation results: {} users",
            group_thousands(result.total_users)
        );

        let apis = report.included_apis();
        let label = |api: &str| -> String {
            report
                .catalog
                .get(api)
                .map(|def| def.short_name().to_string())
                .unwrap_or_else(|| api.to_string())
        };
        let times: Vec<(String, f64)> = apis
            .iter()
            .filter_map(|api| result.response_time.get(*api).map(|v| (label(*api), *v)))
            .collect();
        let rates: Vec<(String, f64)> = apis
            .iter()
            .filter_map(|api| result.error_rate.get(*api).map(|v| (label(*api), *v)))
            .collect();

        let _ = writeln!(out, "Response time by API (s):");
        write_bars(&mut out, &times, "s");
        let _ = writeln!(out, "Error rate by API (%):");
        write_bars(&mut out, &rates, "%");
        let _ = writeln!(
            out,
            "warning level: {}%, critical level: {}%",
            DEGRADED_ERROR_RATE, OVERLOADED_ERROR_RATE
        );
        out
    }
}

/// Bars scale to 120% of the largest value.
fn write_bars(out: &mut String, rows: &[(String, f64)], unit: &str) {
    let max = rows.iter().map(|(_, value)| *value).fold(0.0_f64, f64::max) * 1.2;
    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in rows {
        let filled = if max > 0.0 {
            ((value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "{:<width$} |{:<bar$}| {:.2}{}",
            label,
            "#".repeat(filled.min(BAR_WIDTH)),
            value,
            unit,
            width = label_width,
            bar = BAR_WIDTH
        );
    }
}

fn write_metadata(out: &mut String, report: &Report) {
    let _ = writeln!(out, "Metadata:");
    let _ = writeln!(out, "scenario: {}", report.scenario);
    let _ = writeln!(out, "users: {}", report.result.total_users);
    let _ = writeln!(out, "jitter: {}", report.jitter);
}

fn write_metrics(out: &mut String, report: &Report) {
    let result = &report.result;
    let _ = writeln!(out, "Metrics:");
    let _ = writeln!(out, "avg_response_time: {:.2}s", result.avg_response_time);
    let _ = writeln!(out, "avg_error_rate: {:.2}%", result.avg_error_rate);
    let _ = writeln!(out, "cpu: {:.1}%", result.system_metrics.cpu);
    let _ = writeln!(out, "memory: {:.1}%", result.system_metrics.memory);
}

fn write_diagnosis(out: &mut String, diagnosis: &Diagnosis) {
    let _ = writeln!(out, "Diagnosis: {}", diagnosis.severity);
    let _ = writeln!(out, "{}", diagnosis.severity.verdict());
}

pub fn format_apis(catalog: &Catalog) -> String {
    let mut out = String::new();
    for api in catalog.iter() {
        let _ = writeln!(out, "{}: {} [{} {}]", api.id, api.name, api.method, api.path);
    }
    out
}

pub fn format_scenarios(presets: &[ScenarioPreset], catalog: &Catalog) -> String {
    let mut out = String::new();
    for preset in presets {
        let _ = writeln!(
            out,
            "{}: {} ({} users; {})",
            preset.key,
            preset.name,
            preset.users,
            format_shares(preset, catalog)
        );
    }
    out
}

pub fn format_config(simulator: &Simulator) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "APIs:");
    for api in simulator.catalog().iter() {
        let _ = writeln!(
            out,
            "- {} ({} {}, base latency: {}s)",
            api.id, api.method, api.path, api.base_latency_s
        );
    }
    let _ = writeln!(out, "Scenarios:");
    for preset in simulator.presets() {
        let _ = writeln!(
            out,
            "- {} (users: {}, {})",
            preset.key,
            preset.users,
            format_shares(preset, simulator.catalog())
        );
    }
    out
}

/// One line per compared scenario.
pub fn format_comparison(results: &[(String, SimulationResult)]) -> String {
    let mut out = String::new();
    for (key, result) in results {
        let _ = writeln!(
            out,
            "{}: users={} avg_response_time={:.2}s avg_error_rate={:.2}% cpu={:.1}% memory={:.1}% severity={}",
            key,
            result.total_users,
            result.avg_response_time,
            result.avg_error_rate,
            result.system_metrics.cpu,
            result.system_metrics.memory,
            Severity::from_error_rate(result.avg_error_rate)
        );
    }
    out
}

fn format_shares(preset: &ScenarioPreset, catalog: &Catalog) -> String {
    catalog
        .iter()
        .map(|api| (api.id.as_str(), preset.distribution.share(&api.id)))
        .filter(|(_, share)| *share > 0.0)
        .map(|(api, share)| format!("{}: {}%", api, share))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn report_to_json(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report)
        .map_err(|err| Error::Persist(format!("failed to encode report: {}", err)))
}

pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
