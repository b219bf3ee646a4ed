//! Analyze command - score a corpus and compare flag rates across sources

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::info;

use super::output::{emit, resolve_format};
use crate::config::{load_analysis_config, load_config_file, AnalysisConfig};
use crate::corpus::load_corpus;
use crate::detectors::{AnalysisEngineBuilder, Dimension, DimensionSet};
use crate::lexicon::Lexicon;
use crate::models::{AnalysisReport, ReportSettings};
use crate::reporters::{self, OutputFormat};
use crate::statistics::StatisticsEngine;

pub(super) struct AnalyzeOptions {
    pub corpus: PathBuf,
    pub format: Option<String>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub lexicon: Option<PathBuf>,
    pub baseline: Option<String>,
    pub ablation: bool,
    pub dimensions: Option<Vec<Dimension>>,
    pub alpha: Option<f64>,
    pub orphaned_only: bool,
    pub workers: Option<usize>,
}

/// Load the config for `corpus` (or the explicit file) and apply CLI overrides.
pub(super) fn resolve_config(
    corpus: &Path,
    explicit: Option<&Path>,
    lexicon: Option<&Path>,
) -> Result<AnalysisConfig> {
    let mut config = match explicit {
        Some(path) => load_config_file(path)?,
        None => load_analysis_config(corpus)?,
    };
    if let Some(path) = lexicon {
        // a flag path is relative to the working directory, not the config
        config.lexicon.path = Some(std::path::absolute(path)?);
    }
    Ok(config)
}

pub(super) fn load_lexicon(config: &AnalysisConfig) -> Result<Lexicon> {
    let path = config.lexicon_path();
    let lexicon = Lexicon::load_or_builtin(path.as_deref()).with_context(|| match &path {
        Some(p) => format!("Failed to load lexicon {}", p.display()),
        None => "Failed to load built-in lexicon".to_string(),
    })?;
    info!(
        "Lexicon {} with {} domains and {} register fields",
        lexicon.version().unwrap_or("unversioned"),
        lexicon.domains().len(),
        lexicon.fields().len()
    );
    Ok(lexicon)
}

fn bar_style() -> Result<ProgressStyle> {
    Ok(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓▒░  "),
    )
}

/// Run the analyze command
pub(super) fn run(opts: AnalyzeOptions) -> Result<()> {
    let start = Instant::now();
    let corpus = opts.corpus.as_path();
    if !corpus.exists() {
        anyhow::bail!("Corpus path does not exist: {}", corpus.display());
    }

    let mut config = resolve_config(corpus, opts.config.as_deref(), opts.lexicon.as_deref())?;
    if let Some(baseline) = opts.baseline {
        config.statistics.baseline = Some(baseline);
    }
    if opts.ablation {
        config.statistics.ablation = true;
    }
    if let Some(dimensions) = opts.dimensions {
        config.scoring.dimensions = dimensions;
    }
    if let Some(alpha) = opts.alpha {
        config.statistics.alpha = alpha;
    }
    config.validate().context("Invalid analysis options")?;

    let format = resolve_format(opts.format.as_deref(), config.defaults.format.as_deref())?;
    let workers = opts.workers.or(config.defaults.workers).unwrap_or(0);

    let lexicon = Arc::new(load_lexicon(&config)?);
    let passages = load_corpus(corpus, &lexicon)
        .with_context(|| format!("Failed to load corpus {}", corpus.display()))?;

    let show_progress = format != OutputFormat::Json && Term::stderr().is_term();
    let bar = ProgressBar::new(passages.len() as u64);
    if show_progress {
        bar.set_style(bar_style()?);
        bar.set_message("scoring passages");
    } else {
        bar.set_draw_target(ProgressDrawTarget::hidden());
    }

    let progress = bar.clone();
    let engine = AnalysisEngineBuilder::new(Arc::clone(&lexicon))
        .scoring(config.scoring.clone())
        .workers(workers)
        .on_progress(Box::new(move |_: &str, done: usize, _: usize| {
            progress.set_position(done as u64)
        }))
        .build();
    let analyses = engine.run(&passages)?;
    bar.finish_and_clear();

    let active = DimensionSet::from_dimensions(&config.scoring.dimensions);
    let threshold = config.scoring.orphan_threshold;
    let statistics = StatisticsEngine::from_config(&config.statistics, threshold)
        .build(&analyses, active)
        .context("Failed to compute corpus statistics")?;

    let settings = ReportSettings {
        dimensions: active,
        orphan_threshold: threshold,
        alpha: config.statistics.alpha,
        baseline: config.statistics.baseline.clone(),
        lexicon_version: lexicon.version().map(str::to_string),
    };
    let mut report = AnalysisReport::from_analyses(&analyses, settings, statistics);
    if opts.orphaned_only {
        report.retain_orphaned();
    }

    if opts.output.is_some() {
        console::set_colors_enabled(false);
    }
    let rendered = reporters::report_with_format(&report, format)?;
    emit(&rendered, opts.output.as_deref(), format)?;

    if show_progress {
        eprintln!(
            "{} {} passages in {:.2}s",
            style("Analyzed").green().bold(),
            passages.len(),
            start.elapsed().as_secs_f64()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_config_reads_corpus_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("orphanhood.toml"),
            "[statistics]\nbaseline = \"human\"\n",
        )
        .unwrap();
        let config = resolve_config(dir.path(), None, None).unwrap();
        assert_eq!(config.statistics.baseline.as_deref(), Some("human"));
    }

    #[test]
    fn test_resolve_config_lexicon_flag_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("orphanhood.toml"), "[lexicon]\npath = \"mine.toml\"\n")
            .unwrap();
        let flag = dir.path().join("other.toml");
        let config = resolve_config(dir.path(), None, Some(&flag)).unwrap();
        assert_eq!(config.lexicon_path(), Some(flag));
    }

    #[test]
    fn test_load_lexicon_builtin() {
        let lexicon = load_lexicon(&AnalysisConfig::default()).unwrap();
        assert!(lexicon.domain("sawmill").is_some());
    }
}
