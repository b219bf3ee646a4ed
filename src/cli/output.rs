//! Shared output helpers for the command handlers

use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use std::str::FromStr;

use crate::reporters::OutputFormat;

/// Resolve the output format: flag, then config default, then text.
pub(super) fn resolve_format(flag: Option<&str>, config_default: Option<&str>) -> Result<OutputFormat> {
    let name = flag.or(config_default).unwrap_or("text");
    OutputFormat::from_str(name)
}

/// Write rendered output to a file, or print it to stdout.
pub(super) fn emit(rendered: &str, output: Option<&Path>, format: OutputFormat) -> Result<()> {
    if let Some(out_path) = output {
        if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(out_path, rendered)
            .with_context(|| format!("Failed to write {}", out_path.display()))?;
        // stderr keeps stdout clean for pipelines
        eprintln!(
            "\n{} {}",
            style("Report written to:").bold(),
            style(out_path.display()).cyan()
        );
    } else {
        if format == OutputFormat::Text {
            println!();
        }
        println!("{}", rendered.trim_end());
    }
    Ok(())
}
