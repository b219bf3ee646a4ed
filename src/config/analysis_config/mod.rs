//! Analysis configuration support
//!
//! Loads configuration from `orphanhood.toml` or `.orphanhoodrc.json` next to
//! the corpus, or from an explicit `--config` path.
//!
//! # Configuration Format
//!
//! ```toml
//! # orphanhood.toml
//!
//! [scoring]
//! isolation_tau = 0.2
//! orphan_threshold = 0.6
//! chain_scores = [1.0, 0.6, 0.2, 0.0]
//! dimensions = ["isolation", "chain", "preparation"]
//!
//! [scoring.preparation_scores]
//! signposted = 0.0
//! framed = 0.1
//!
//! [statistics]
//! alpha = 0.05
//! baseline = "human"
//! ablation = true
//!
//! [lexicon]
//! path = "lexicon.toml"
//!
//! [defaults]
//! format = "json"
//! workers = 8
//! ```

use std::path::{Path, PathBuf};

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detectors::Dimension;

/// Config file names searched for, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["orphanhood.toml", ".orphanhoodrc.json"];

/// Written by `orphanhood init`. Every value is the built-in default.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# orphanhood.toml

[scoring]
# Density gap over the neighbourhood mean that scores full isolation
isolation_tau = 0.2
# Sentence windows (slots either side of the target)
isolation_window = 2
chain_window = 3
preparation_window = 1
# A word is orphaned when its mean score is strictly above this
orphan_threshold = 0.6
# Neighbour density that counts as a figurative frame
preparation_density_threshold = 0.15
# Word-count ratio treated as a rhythmic shift
rhythm_ratio = 2.5
min_content_word_len = 3
# Score for 0, 1, 2, ... reinforcing words; the last entry covers the rest
chain_scores = [1.0, 0.6, 0.2, 0.0]
dimensions = ["isolation", "chain", "preparation"]

[scoring.preparation_scores]
signposted = 0.0
framed = 0.1
partial = 0.3
rhythmic = 0.2

[statistics]
alpha = 0.05
# baseline = "human"
ablation = false

[lexicon]
# path = "lexicon.toml"

[defaults]
# format = "text"
# workers = 0
"#;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub statistics: StatisticsConfig,

    #[serde(default)]
    pub lexicon: LexiconConfig,

    #[serde(default)]
    pub defaults: CliDefaults,

    /// File this config was read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Scoring constants
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoringConfig {
    #[serde(default = "default_isolation_tau")]
    pub isolation_tau: f64,
    #[serde(default = "default_isolation_window")]
    pub isolation_window: usize,
    #[serde(default = "default_chain_window")]
    pub chain_window: usize,
    #[serde(default = "default_preparation_window")]
    pub preparation_window: usize,
    #[serde(default = "default_orphan_threshold")]
    pub orphan_threshold: f64,
    #[serde(default = "default_preparation_density_threshold")]
    pub preparation_density_threshold: f64,
    #[serde(default = "default_rhythm_ratio")]
    pub rhythm_ratio: f64,
    #[serde(default = "default_min_content_word_len")]
    pub min_content_word_len: usize,
    /// Score for k reinforcing words; the last entry covers all larger k
    #[serde(default = "default_chain_scores")]
    pub chain_scores: Vec<f64>,
    #[serde(default)]
    pub preparation_scores: PreparationScores,
    /// Active dimensions for the reported aggregate
    #[serde(default = "default_dimensions")]
    pub dimensions: Vec<Dimension>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            isolation_tau: default_isolation_tau(),
            isolation_window: default_isolation_window(),
            chain_window: default_chain_window(),
            preparation_window: default_preparation_window(),
            orphan_threshold: default_orphan_threshold(),
            preparation_density_threshold: default_preparation_density_threshold(),
            rhythm_ratio: default_rhythm_ratio(),
            min_content_word_len: default_min_content_word_len(),
            chain_scores: default_chain_scores(),
            preparation_scores: PreparationScores::default(),
            dimensions: default_dimensions(),
        }
    }
}

fn default_isolation_tau() -> f64 {
    0.2
}
fn default_isolation_window() -> usize {
    2
}
fn default_chain_window() -> usize {
    3
}
fn default_preparation_window() -> usize {
    1
}
fn default_orphan_threshold() -> f64 {
    0.6
}
fn default_preparation_density_threshold() -> f64 {
    0.15
}
fn default_rhythm_ratio() -> f64 {
    2.5
}
fn default_min_content_word_len() -> usize {
    3
}
fn default_chain_scores() -> Vec<f64> {
    vec![1.0, 0.6, 0.2, 0.0]
}
fn default_dimensions() -> Vec<Dimension> {
    Dimension::ALL.to_vec()
}

/// Preparation score for each signal, checked in this order
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct PreparationScores {
    #[serde(default = "default_signposted")]
    pub signposted: f64,
    #[serde(default = "default_framed")]
    pub framed: f64,
    #[serde(default = "default_partial")]
    pub partial: f64,
    #[serde(default = "default_rhythmic")]
    pub rhythmic: f64,
}

impl Default for PreparationScores {
    fn default() -> Self {
        Self {
            signposted: default_signposted(),
            framed: default_framed(),
            partial: default_partial(),
            rhythmic: default_rhythmic(),
        }
    }
}

fn default_signposted() -> f64 {
    0.0
}
fn default_framed() -> f64 {
    0.1
}
fn default_partial() -> f64 {
    0.3
}
fn default_rhythmic() -> f64 {
    0.2
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatisticsConfig {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Source label every other source is compared against
    #[serde(default)]
    pub baseline: Option<String>,
    #[serde(default)]
    pub ablation: bool,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            baseline: None,
            ablation: false,
        }
    }
}

fn default_alpha() -> f64 {
    0.05
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LexiconConfig {
    /// Lexicon file; relative paths resolve against the config file
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// CLI defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CliDefaults {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub workers: Option<usize>,
}

impl ScoringConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.isolation_tau > 0.0 && self.isolation_tau.is_finite(),
            "scoring.isolation_tau must be positive (got {})",
            self.isolation_tau
        );
        ensure!(self.isolation_window >= 1, "scoring.isolation_window must be at least 1");
        ensure!(self.chain_window >= 1, "scoring.chain_window must be at least 1");
        ensure!(self.preparation_window >= 1, "scoring.preparation_window must be at least 1");
        ensure_unit("scoring.orphan_threshold", self.orphan_threshold)?;
        ensure_unit(
            "scoring.preparation_density_threshold",
            self.preparation_density_threshold,
        )?;
        ensure!(
            self.rhythm_ratio >= 1.0 && self.rhythm_ratio.is_finite(),
            "scoring.rhythm_ratio must be at least 1 (got {})",
            self.rhythm_ratio
        );

        ensure!(!self.chain_scores.is_empty(), "scoring.chain_scores must not be empty");
        for score in &self.chain_scores {
            ensure_unit("scoring.chain_scores", *score)?;
        }
        ensure!(
            self.chain_scores.windows(2).all(|w| w[0] >= w[1]),
            "scoring.chain_scores must be non-increasing"
        );

        let p = &self.preparation_scores;
        ensure_unit("scoring.preparation_scores.signposted", p.signposted)?;
        ensure_unit("scoring.preparation_scores.framed", p.framed)?;
        ensure_unit("scoring.preparation_scores.partial", p.partial)?;
        ensure_unit("scoring.preparation_scores.rhythmic", p.rhythmic)?;

        ensure!(!self.dimensions.is_empty(), "scoring.dimensions must not be empty");
        for (i, dim) in self.dimensions.iter().enumerate() {
            ensure!(
                !self.dimensions[..i].contains(dim),
                "scoring.dimensions lists '{}' more than once",
                dim
            );
        }
        Ok(())
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.scoring.validate()?;
        ensure!(
            self.statistics.alpha > 0.0 && self.statistics.alpha < 1.0,
            "statistics.alpha must be in (0, 1) (got {})",
            self.statistics.alpha
        );
        Ok(())
    }

    /// Lexicon path with relative paths resolved against the config file.
    pub fn lexicon_path(&self) -> Option<PathBuf> {
        let path = self.lexicon.path.as_ref()?;
        if path.is_absolute() {
            return Some(path.clone());
        }
        match self.source.as_deref().and_then(Path::parent) {
            Some(dir) => Some(dir.join(path)),
            None => Some(path.clone()),
        }
    }
}

fn ensure_unit(name: &str, value: f64) -> anyhow::Result<()> {
    ensure!(
        (0.0..=1.0).contains(&value),
        "{} must be within [0, 1] (got {})",
        name,
        value
    );
    Ok(())
}

/// Load configuration for a corpus.
///
/// Searches the corpus directory (or the parent of a corpus file) for:
/// 1. `orphanhood.toml`
/// 2. `.orphanhoodrc.json`
///
/// Returns defaults when neither exists. A file that exists but does not
/// parse or validate is an error.
pub fn load_analysis_config(corpus_path: &Path) -> anyhow::Result<AnalysisConfig> {
    let dir = if corpus_path.is_dir() {
        corpus_path
    } else {
        corpus_path.parent().unwrap_or(Path::new("."))
    };

    for name in CONFIG_FILE_NAMES {
        let path = dir.join(name);
        if path.exists() {
            return load_config_file(&path);
        }
    }

    debug!("No analysis config found, using defaults");
    Ok(AnalysisConfig::default())
}

/// Load a config file, choosing the parser by extension (`.json` or TOML).
pub fn load_config_file(path: &Path) -> anyhow::Result<AnalysisConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;

    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let mut config: AnalysisConfig = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?
    } else {
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?
    };

    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    config.source = Some(path.to_path_buf());
    debug!("Loaded analysis config from {}", path.display());
    Ok(config)
}
