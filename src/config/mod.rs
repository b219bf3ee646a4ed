//! Configuration module
//!
//! This module handles:
//! - Analysis configuration (orphanhood.toml / .orphanhoodrc.json)
//! - Scoring constants and dimension selection
//! - Statistics options and CLI defaults

mod analysis_config;

pub use analysis_config::{
    load_analysis_config,
    load_config_file,
    AnalysisConfig,
    CliDefaults,
    LexiconConfig,
    PreparationScores,
    ScoringConfig,
    StatisticsConfig,
    CONFIG_FILE_NAMES,
    DEFAULT_CONFIG_TEMPLATE,
};
