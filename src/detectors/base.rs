//! Base scorer trait and types
//!
//! This module defines the core abstractions for orphanhood scoring:
//! - `Dimension`, the closed set of scoring dimensions
//! - `DimensionScorer` trait that every scorer implements
//! - `PassageContext`, the per-passage data scorers read from

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::corpus::Passage;
use crate::detectors::candidates::Candidate;
use crate::lexicon::{DomainId, Lexicon};
use crate::text::{Segmentation, Sentence, Token};

/// One of the three structural-support dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Isolation,
    Chain,
    Preparation,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Isolation, Dimension::Chain, Dimension::Preparation];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Isolation => "isolation",
            Dimension::Chain => "chain",
            Dimension::Preparation => "preparation",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "isolation" => Ok(Dimension::Isolation),
            "chain" => Ok(Dimension::Chain),
            "preparation" => Ok(Dimension::Preparation),
            other => Err(format!(
                "Unknown dimension '{}'. Valid: isolation, chain, preparation",
                other
            )),
        }
    }
}

/// Result of scoring one candidate on one dimension
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionScore {
    pub dimension: Dimension,
    /// Always within [0, 1]
    pub score: f64,
    /// Short human-readable explanation
    pub detail: String,
}

impl DimensionScore {
    pub fn new(dimension: Dimension, score: f64, detail: impl Into<String>) -> Self {
        Self {
            dimension,
            score: score.clamp(0.0, 1.0),
            detail: detail.into(),
        }
    }
}

/// Trait for the dimension scorers
///
/// Scorers are stateless apart from their constants: the same candidate in
/// the same context always yields the same score, so they can run on any
/// worker thread.
///
/// # Example Implementation
///
/// ```ignore
/// pub struct FlatScorer;
///
/// impl DimensionScorer for FlatScorer {
///     fn name(&self) -> &'static str { "FlatScorer" }
///     fn description(&self) -> &'static str { "Scores everything 0.5" }
///     fn dimension(&self) -> Dimension { Dimension::Chain }
///     fn score(&self, _ctx: &PassageContext<'_>, _c: &Candidate) -> DimensionScore {
///         DimensionScore::new(Dimension::Chain, 0.5, "flat")
///     }
/// }
/// ```
pub trait DimensionScorer: Send + Sync {
    /// Unique identifier for this scorer
    fn name(&self) -> &'static str;

    /// Human-readable description of what this scorer measures
    fn description(&self) -> &'static str;

    /// Dimension this scorer fills in
    fn dimension(&self) -> Dimension;

    /// Score one candidate
    fn score(&self, ctx: &PassageContext<'_>, candidate: &Candidate) -> DimensionScore;
}

/// Progress callback for passage analysis: (passage id, done, total)
pub type ProgressCallback = Box<dyn Fn(&str, usize, usize) + Send + Sync>;

/// Everything a scorer may look at for one passage.
///
/// Sentence densities are computed once up front and indexed by slot, so
/// every scorer sees identical values regardless of evaluation order.
pub struct PassageContext<'a> {
    pub passage: &'a Passage,
    pub lexicon: &'a Lexicon,
    min_content_word_len: usize,
    /// Figurative density per slot; vacant slots hold 0
    densities: Vec<f64>,
}

impl<'a> PassageContext<'a> {
    pub fn new(passage: &'a Passage, lexicon: &'a Lexicon, min_content_word_len: usize) -> Self {
        let seg = &passage.segmentation;
        let mut densities = vec![0.0; seg.slot_count];
        for sentence in &seg.sentences {
            densities[sentence.position] =
                figurative_density(sentence, lexicon, passage.domain, min_content_word_len);
        }
        Self {
            passage,
            lexicon,
            min_content_word_len,
            densities,
        }
    }

    pub fn segmentation(&self) -> &'a Segmentation {
        &self.passage.segmentation
    }

    pub fn domain(&self) -> DomainId {
        self.passage.domain
    }

    /// φ of the sentence at `position`
    pub fn density(&self, position: usize) -> f64 {
        self.densities.get(position).copied().unwrap_or(0.0)
    }

    pub fn is_content_word(&self, word: &str) -> bool {
        is_content_word(word, self.lexicon, self.min_content_word_len)
    }

    /// Token behind a candidate.
    pub fn token(&self, candidate: &Candidate) -> Option<&'a Token> {
        self.segmentation()
            .sentence_at(candidate.sentence)
            .and_then(|s| s.tokens.get(candidate.token))
    }
}

/// Long enough and not a stopword.
pub fn is_content_word(word: &str, lexicon: &Lexicon, min_len: usize) -> bool {
    word.chars().count() >= min_len && !lexicon.is_stopword(word)
}

/// φ(sentence): register-bearing, non-literal content words over content words.
/// A sentence without content words has density 0.
pub fn figurative_density(
    sentence: &Sentence,
    lexicon: &Lexicon,
    domain: DomainId,
    min_len: usize,
) -> f64 {
    let mut content = 0usize;
    let mut bearing = 0usize;
    for token in &sentence.tokens {
        let word = token.normalized.as_str();
        if !is_content_word(word, lexicon, min_len) {
            continue;
        }
        content += 1;
        if lexicon.is_figurative_bearing(word, domain) {
            bearing += 1;
        }
    }
    if content == 0 {
        0.0
    } else {
        bearing as f64 / content as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::segment;

    #[test]
    fn test_dimension_from_str() {
        assert_eq!("chain".parse::<Dimension>().unwrap(), Dimension::Chain);
        assert_eq!(" Isolation ".parse::<Dimension>().unwrap(), Dimension::Isolation);
        assert!("rhythm".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_dimension_score_clamps() {
        assert_eq!(DimensionScore::new(Dimension::Chain, 1.7, "").score, 1.0);
        assert_eq!(DimensionScore::new(Dimension::Chain, -0.2, "").score, 0.0);
    }

    #[test]
    fn test_figurative_density() {
        let lex = Lexicon::builtin().unwrap();
        let sawmill = lex.domain("sawmill").unwrap();
        let seg = segment("The blade bit deep.");
        // content words: blade (literal here), bit, deep
        let phi = figurative_density(&seg.sentences[0], &lex, sawmill, 3);
        assert!((phi - 1.0 / 3.0).abs() < 1e-12);

        let general = lex.domain("general").unwrap();
        // blade is a violence word outside the sawmill
        let phi = figurative_density(&seg.sentences[0], &lex, general, 3);
        assert!((phi - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_density_without_content_words() {
        let lex = Lexicon::builtin().unwrap();
        let general = lex.domain("general").unwrap();
        let seg = segment("It is so.");
        assert_eq!(figurative_density(&seg.sentences[0], &lex, general, 3), 0.0);
    }
}
