//! Output reporters for orphanhood results
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON
//! - `markdown` - GitHub-flavored Markdown

mod json;
mod markdown;
mod text;

use crate::models::AnalysisReport;
use crate::probe::ProbeReport;
use crate::statistics::{Comparison, Interval, Stat};
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Render an analysis report using an OutputFormat enum
pub fn report_with_format(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report),
        OutputFormat::Json => json::render(report),
        OutputFormat::Markdown => markdown::render(report),
    }
}

/// Render vocabulary probe counts
pub fn probe_report(report: &ProbeReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render_probes(report),
        OutputFormat::Json => json::render(report),
        OutputFormat::Markdown => markdown::render_probes(report),
    }
}

/// Render a single two-group comparison
pub fn comparison_report(comparison: &Comparison, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render_comparison(comparison),
        OutputFormat::Json => json::render(comparison),
        OutputFormat::Markdown => markdown::render_comparison(comparison),
    }
}

/// `12.5%`, or the out-of-band label
fn percent(rate: Stat) -> String {
    match rate {
        Stat::Value(v) => format!("{:.1}%", v * 100.0),
        other => other.to_string(),
    }
}

fn interval(ci: Option<Interval>) -> String {
    match ci {
        Some(ci) => format!("[{:.1}%, {:.1}%]", ci.lower * 100.0, ci.upper * 100.0),
        None => "n/a".to_string(),
    }
}

fn p_value(p: f64) -> String {
    if p < 1e-4 {
        format!("{:.2e}", p)
    } else {
        format!("{:.4}", p)
    }
}
