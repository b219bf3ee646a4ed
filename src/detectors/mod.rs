//! Orphanhood detectors
//!
//! Candidate extraction, the three dimension scorers and their aggregation.
//!
//! # Scorers
//!
//! | Scorer | Dimension | Measures |
//! |---|---|---|
//! | `IsolationScorer` | isolation | density spike of the sentence over its ±2 neighbours |
//! | `ChainScorer` | chain | same-field reinforcement within ±3 sentences |
//! | `PreparationScorer` | preparation | signposts, figurative frame, rhythmic shift |
//!
//! Each scorer implements [`DimensionScorer`] and is registered with the
//! [`AnalysisEngine`]. Aggregation takes the mean over an active
//! [`DimensionSet`], so ablation needs no extra scorer code.

mod aggregate;
mod base;
mod candidates;
mod chain;
mod engine;
mod isolation;
mod preparation;

pub use aggregate::{aggregate, classify, orphanhood, DimensionSet, Orphanhood, SubScores, Verdict};
pub use base::{
    figurative_density, is_content_word, Dimension, DimensionScore, DimensionScorer, PassageContext,
    ProgressCallback,
};
pub use candidates::{extract_candidates, Candidate, Extraction, FigurativePattern};
pub use chain::ChainScorer;
pub use engine::{
    default_scorers, AnalysisEngine, AnalysisEngineBuilder, PassageAnalysis, ScoreDetails,
    ScoredCandidate,
};
pub use isolation::IsolationScorer;
pub use preparation::{PreparationScorer, PreparationSignal};
