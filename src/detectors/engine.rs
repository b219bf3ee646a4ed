//! Passage analysis engine with parallel support
//!
//! The AnalysisEngine runs candidate extraction and every registered
//! dimension scorer over a batch of passages:
//! - Passages are independent, so they fan out over a rayon pool
//! - Results come back in input order
//! - Progress is reported through an optional callback
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    AnalysisEngine                       │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Build PassageContext (densities per slot)           │
//! │  2. Extract figurative candidates                       │
//! │  3. Score each candidate on every dimension             │
//! │  4. Keep all sub-scores; aggregation happens later      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Sub-scores are stored for all three dimensions regardless of the active
//! set, so ablation re-aggregates the same scan instead of re-running it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ScoringConfig;
use crate::corpus::Passage;
use crate::detectors::aggregate::{orphanhood, DimensionSet, Orphanhood, SubScores, Verdict};
use crate::detectors::base::{Dimension, DimensionScorer, PassageContext, ProgressCallback};
use crate::detectors::candidates::{extract_candidates, Candidate, FigurativePattern};
use crate::detectors::chain::ChainScorer;
use crate::detectors::isolation::IsolationScorer;
use crate::detectors::preparation::PreparationScorer;
use crate::lexicon::Lexicon;
use crate::models::{record_id, PassageSummary, WordRecord};

/// Maximum worker threads when auto-detecting
const MAX_AUTO_WORKERS: usize = 16;
/// Sentence excerpt length carried into word records
const EXCERPT_CHARS: usize = 120;

/// The default scorer set, one per dimension.
pub fn default_scorers(config: &ScoringConfig) -> Vec<Arc<dyn DimensionScorer>> {
    vec![
        Arc::new(IsolationScorer::from_config(config)),
        Arc::new(ChainScorer::from_config(config)),
        Arc::new(PreparationScorer::from_config(config)),
    ]
}

/// Explanations for the three sub-scores of one candidate
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreDetails {
    pub isolation: String,
    pub chain: String,
    pub preparation: String,
}

impl ScoreDetails {
    fn set(&mut self, dimension: Dimension, detail: String) {
        match dimension {
            Dimension::Isolation => self.isolation = detail,
            Dimension::Chain => self.chain = detail,
            Dimension::Preparation => self.preparation = detail,
        }
    }
}

/// One candidate with its sub-scores and display data.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub surface: String,
    pub normalized: String,
    pub field: String,
    pub excerpt: String,
    pub scores: SubScores,
    pub details: ScoreDetails,
}

impl ScoredCandidate {
    pub fn pattern(&self) -> FigurativePattern {
        self.candidate.pattern
    }
}

/// Everything computed for one passage.
#[derive(Debug, Clone, PartialEq)]
pub struct PassageAnalysis {
    pub passage_id: String,
    pub source: String,
    pub domain: String,
    pub sentences: usize,
    pub slots: usize,
    pub tokens: usize,
    pub dropped_tokens: usize,
    pub literal_filtered: usize,
    /// In sentence, token, field order
    pub candidates: Vec<ScoredCandidate>,
}

impl PassageAnalysis {
    /// One record per word position: the field variant with the highest
    /// aggregate under `active` (ties keep the earlier field).
    pub fn word_records(&self, active: DimensionSet, threshold: f64) -> Vec<WordRecord> {
        self.candidates
            .chunk_by(|a, b| {
                a.candidate.sentence == b.candidate.sentence && a.candidate.token == b.candidate.token
            })
            .filter_map(|variants| {
                let mut best: Option<(Orphanhood, &ScoredCandidate)> = None;
                for sc in variants {
                    let Some(o) = orphanhood(&sc.scores, active, threshold) else {
                        continue;
                    };
                    if best.map_or(true, |(b, _)| o.aggregate > b.aggregate) {
                        best = Some((o, sc));
                    }
                }
                best.map(|(o, sc)| self.record_for(sc, o))
            })
            .collect()
    }

    fn record_for(&self, sc: &ScoredCandidate, o: Orphanhood) -> WordRecord {
        WordRecord {
            id: record_id(&self.passage_id, sc.candidate.sentence, sc.candidate.token),
            passage_id: self.passage_id.clone(),
            source: self.source.clone(),
            domain: self.domain.clone(),
            sentence: sc.candidate.sentence,
            token: sc.candidate.token,
            word: sc.surface.clone(),
            normalized: sc.normalized.clone(),
            register_field: sc.field.clone(),
            pattern: sc.candidate.pattern,
            isolation: sc.scores.isolation,
            chain: sc.scores.chain,
            preparation: sc.scores.preparation,
            aggregate: o.aggregate,
            verdict: o.verdict,
            details: sc.details.clone(),
            excerpt: sc.excerpt.clone(),
        }
    }

    /// Whether the passage has at least one orphaned word under `active`.
    pub fn is_flagged(&self, active: DimensionSet, threshold: f64) -> bool {
        self.candidates.iter().any(|sc| {
            orphanhood(&sc.scores, active, threshold).is_some_and(|o| o.verdict.is_orphaned())
        })
    }

    pub fn summary(&self, active: DimensionSet, threshold: f64) -> PassageSummary {
        let words = self.word_records(active, threshold);
        let orphaned = words.iter().filter(|w| w.verdict == Verdict::Orphaned).count();
        PassageSummary {
            id: self.passage_id.clone(),
            source: self.source.clone(),
            domain: self.domain.clone(),
            sentences: self.sentences,
            tokens: self.tokens,
            dropped_tokens: self.dropped_tokens,
            literal_filtered: self.literal_filtered,
            candidates: words.len(),
            orphaned,
            integrated: words.len() - orphaned,
            flagged: orphaned > 0,
        }
    }
}

/// Orchestrates candidate extraction and scoring across passages
pub struct AnalysisEngine {
    lexicon: Arc<Lexicon>,
    min_content_word_len: usize,
    /// Registered scorers, one per dimension
    scorers: Vec<Arc<dyn DimensionScorer>>,
    /// Number of worker threads for parallel execution
    workers: usize,
    progress_callback: Option<ProgressCallback>,
}

impl AnalysisEngine {
    /// Create an engine with the default scorers.
    ///
    /// # Arguments
    /// * `workers` - Number of worker threads (0 = auto-detect)
    pub fn new(lexicon: Arc<Lexicon>, config: &ScoringConfig, workers: usize) -> Self {
        let actual_workers = if workers == 0 {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
                .min(MAX_AUTO_WORKERS)
        } else {
            workers
        };

        Self {
            lexicon,
            min_content_word_len: config.min_content_word_len,
            scorers: default_scorers(config),
            workers: actual_workers,
            progress_callback: None,
        }
    }

    /// Set progress callback
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Replace the scorer for a dimension (the one sharing its `dimension()`).
    pub fn register(&mut self, scorer: Arc<dyn DimensionScorer>) {
        debug!("Registering scorer: {}", scorer.name());
        self.scorers.retain(|s| s.dimension() != scorer.dimension());
        self.scorers.push(scorer);
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn scorer_names(&self) -> Vec<&'static str> {
        self.scorers.iter().map(|s| s.name()).collect()
    }

    /// Analyse a single passage. Pure: no shared state is touched.
    pub fn analyze_passage(&self, passage: &Passage) -> PassageAnalysis {
        let ctx = PassageContext::new(passage, &self.lexicon, self.min_content_word_len);
        let extraction = extract_candidates(passage, &self.lexicon, self.min_content_word_len);
        let seg = &passage.segmentation;

        let candidates = extraction
            .candidates
            .iter()
            .filter_map(|candidate| {
                let sentence = seg.sentence_at(candidate.sentence)?;
                let token = sentence.tokens.get(candidate.token)?;
                let mut scores = SubScores::default();
                let mut details = ScoreDetails::default();
                for scorer in &self.scorers {
                    let result = scorer.score(&ctx, candidate);
                    scores.set(result.dimension, result.score);
                    details.set(result.dimension, result.detail);
                }
                Some(ScoredCandidate {
                    candidate: *candidate,
                    surface: token.surface.clone(),
                    normalized: token.normalized.clone(),
                    field: self.lexicon.field(candidate.field).name.clone(),
                    excerpt: sentence.text.chars().take(EXCERPT_CHARS).collect(),
                    scores,
                    details,
                })
            })
            .collect::<Vec<_>>();

        debug!(
            "Passage {}: {} candidates, {} literal-filtered",
            passage.id,
            candidates.len(),
            extraction.literal_filtered
        );

        PassageAnalysis {
            passage_id: passage.id.clone(),
            source: passage.source.clone(),
            domain: passage.domain_label.clone(),
            sentences: seg.sentences.len(),
            slots: seg.slot_count,
            tokens: seg.token_count(),
            dropped_tokens: seg.dropped_tokens,
            literal_filtered: extraction.literal_filtered,
            candidates,
        }
    }

    /// Analyse every passage on the worker pool. Output order matches input.
    pub fn run(&self, passages: &[Passage]) -> Result<Vec<PassageAnalysis>> {
        let start = Instant::now();
        info!(
            "Analyzing {} passages with {} scorers on {} workers",
            passages.len(),
            self.scorers.len(),
            self.workers
        );

        let completed = AtomicUsize::new(0);
        let total = passages.len();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;

        let results: Vec<PassageAnalysis> = pool.install(|| {
            passages
                .par_iter()
                .map(|passage| {
                    let analysis = self.analyze_passage(passage);

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(ref callback) = self.progress_callback {
                        callback(&passage.id, done, total);
                    }

                    analysis
                })
                .collect()
        });

        info!(
            "Analysis complete: {} candidates in {:?}",
            results.iter().map(|r| r.candidates.len()).sum::<usize>(),
            start.elapsed()
        );
        Ok(results)
    }
}

/// Builder for AnalysisEngine with fluent API
pub struct AnalysisEngineBuilder {
    lexicon: Arc<Lexicon>,
    scoring: ScoringConfig,
    workers: usize,
    scorers: Vec<Arc<dyn DimensionScorer>>,
    progress_callback: Option<ProgressCallback>,
}

impl AnalysisEngineBuilder {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            lexicon,
            scoring: ScoringConfig::default(),
            workers: 0,
            scorers: Vec::new(),
            progress_callback: None,
        }
    }

    pub fn scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    /// Set number of worker threads
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Override the scorer for one dimension
    pub fn scorer(mut self, scorer: Arc<dyn DimensionScorer>) -> Self {
        self.scorers.push(scorer);
        self
    }

    /// Set progress callback
    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn build(self) -> AnalysisEngine {
        let mut engine = AnalysisEngine::new(self.lexicon, &self.scoring, self.workers);
        if let Some(callback) = self.progress_callback {
            engine = engine.with_progress_callback(callback);
        }
        for scorer in self.scorers {
            engine.register(scorer);
        }
        engine
    }
}
