//! Orphanhood - orphaned figurative construction detection
//!
//! Finds register-field words used figuratively in short prose passages and
//! asks whether the surrounding text supports them: is the sentence a local
//! spike in figurative density, is the register chained through nearby
//! sentences, is the move signposted? Words that fail on average are
//! *orphaned*. Per-passage flags are then compared across source labels with
//! exact tests, exact intervals and effect sizes.
//!
//! ```text
//! lexicon ─┐
//!          ├─> detectors::extract_candidates ─> DimensionScorer x3 ─> aggregate
//! text ────┘                                                            │
//!                                         statistics::StatisticsEngine <┘
//! ```

pub mod cli;
pub mod config;
pub mod corpus;
pub mod detectors;
pub mod lexicon;
pub mod models;
pub mod probe;
pub mod reporters;
pub mod statistics;
pub mod text;
