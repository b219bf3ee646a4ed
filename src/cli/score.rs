//! Score command - analyze one passage from a file or stdin

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use super::analyze::{load_lexicon, resolve_config};
use super::output::{emit, resolve_format};
use crate::corpus::Passage;
use crate::detectors::{AnalysisEngine, DimensionSet};
use crate::models::{AnalysisReport, ReportSettings};
use crate::reporters;
use crate::statistics::StatisticsEngine;

pub(super) struct ScoreOptions {
    pub file: Option<PathBuf>,
    pub domain: String,
    pub id: String,
    pub source: String,
    pub format: Option<String>,
    pub config: Option<PathBuf>,
    pub lexicon: Option<PathBuf>,
}

fn read_text(file: Option<&Path>) -> Result<String> {
    match file.filter(|p| p.as_os_str() != "-") {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read passage from stdin")?;
            Ok(text)
        }
    }
}

/// Run the score command
pub(super) fn run(opts: ScoreOptions) -> Result<()> {
    let text = read_text(opts.file.as_deref())?;
    let config_dir = opts
        .file
        .as_deref()
        .filter(|p| p.as_os_str() != "-")
        .unwrap_or(Path::new("."));
    let config = resolve_config(config_dir, opts.config.as_deref(), opts.lexicon.as_deref())?;
    let format = resolve_format(opts.format.as_deref(), config.defaults.format.as_deref())?;

    let lexicon = Arc::new(load_lexicon(&config)?);
    let passage = Passage::new(opts.id, opts.source, &opts.domain, text, &lexicon)?;
    let analysis = AnalysisEngine::new(Arc::clone(&lexicon), &config.scoring, 1).analyze_passage(&passage);

    let active = DimensionSet::from_dimensions(&config.scoring.dimensions);
    let threshold = config.scoring.orphan_threshold;
    let analyses = [analysis];
    let statistics = StatisticsEngine::new(config.statistics.alpha, threshold).build(&analyses, active)?;

    let settings = ReportSettings {
        dimensions: active,
        orphan_threshold: threshold,
        alpha: config.statistics.alpha,
        baseline: None,
        lexicon_version: lexicon.version().map(str::to_string),
    };
    let report = AnalysisReport::from_analyses(&analyses, settings, statistics);

    let rendered = reporters::report_with_format(&report, format)?;
    emit(&rendered, None, format)
}
