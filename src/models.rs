//! Core data models
//!
//! These models are shared by the loaders, the engine, the statistics pass
//! and the reporters.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::detectors::{DimensionSet, FigurativePattern, PassageAnalysis, ScoreDetails, Verdict};
use crate::statistics::CorpusReport;

/// Generate a deterministic record ID from the word's location.
///
/// The ID is a 16-character hex string derived from hashing the passage id,
/// the sentence slot and the token index, so the same word gets the same ID
/// on every run and across versions.
pub fn record_id(passage_id: &str, sentence: usize, token: usize) -> String {
    let input = format!("{passage_id}\n{sentence}\n{token}");
    format!("{:016x}", xxh3_64(input.as_bytes()))
}

/// A labeled passage as it appears in a corpus file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageRecord {
    pub id: String,
    /// Provenance class, e.g. "human" or a model name
    pub source: String,
    pub domain: String,
    pub text: String,
}

/// Per-word output record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordRecord {
    pub id: String,
    pub passage_id: String,
    pub source: String,
    pub domain: String,
    /// Sentence slot position
    pub sentence: usize,
    /// Token index within the sentence
    pub token: usize,
    /// Surface form as written
    pub word: String,
    pub normalized: String,
    pub register_field: String,
    pub pattern: FigurativePattern,
    pub isolation: f64,
    pub chain: f64,
    pub preparation: f64,
    pub aggregate: f64,
    pub verdict: Verdict,
    pub details: ScoreDetails,
    pub excerpt: String,
}

/// Per-passage counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassageSummary {
    pub id: String,
    pub source: String,
    pub domain: String,
    pub sentences: usize,
    pub tokens: usize,
    pub dropped_tokens: usize,
    /// Register words suppressed as literal in the passage domain
    pub literal_filtered: usize,
    /// Scored word positions
    pub candidates: usize,
    pub orphaned: usize,
    pub integrated: usize,
    /// At least one orphaned word
    pub flagged: bool,
}

/// Settings the report was produced with
#[derive(Debug, Clone, Serialize)]
pub struct ReportSettings {
    pub dimensions: DimensionSet,
    pub orphan_threshold: f64,
    pub alpha: f64,
    pub baseline: Option<String>,
    pub lexicon_version: Option<String>,
}

/// Full result of an `analyze` run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub version: String,
    pub settings: ReportSettings,
    pub passages: Vec<PassageSummary>,
    pub words: Vec<WordRecord>,
    pub statistics: CorpusReport,
}

impl AnalysisReport {
    /// Assemble the report from finished analyses under `settings`.
    pub fn from_analyses(
        analyses: &[PassageAnalysis],
        settings: ReportSettings,
        statistics: CorpusReport,
    ) -> Self {
        let (active, threshold) = (settings.dimensions, settings.orphan_threshold);
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            passages: analyses.iter().map(|a| a.summary(active, threshold)).collect(),
            words: analyses
                .iter()
                .flat_map(|a| a.word_records(active, threshold))
                .collect(),
            settings,
            statistics,
        }
    }

    pub fn orphaned_words(&self) -> impl Iterator<Item = &WordRecord> {
        self.words.iter().filter(|w| w.verdict.is_orphaned())
    }

    /// Drop integrated words from the per-word list.
    pub fn retain_orphaned(&mut self) {
        self.words.retain(|w| w.verdict.is_orphaned());
    }
}
