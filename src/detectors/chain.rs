//! Chain scorer
//!
//! Counts words of the candidate's register field in the sentences within the
//! chain window and maps the count through the configured discrete table. The
//! target's own sentence is skipped, as is every repeat of the target word.

use crate::config::ScoringConfig;
use crate::detectors::base::{Dimension, DimensionScore, DimensionScorer, PassageContext};
use crate::detectors::candidates::Candidate;

pub struct ChainScorer {
    window: usize,
    /// Score for k matches; the last entry covers all larger k
    scores: Vec<f64>,
}

impl ChainScorer {
    pub fn new(window: usize, scores: Vec<f64>) -> Self {
        Self { window, scores }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.chain_window, config.chain_scores.clone())
    }

    pub fn score_for(&self, matches: usize) -> f64 {
        match self.scores.get(matches).or(self.scores.last()) {
            Some(s) => *s,
            None => 1.0,
        }
    }

    /// Reinforcing words for `candidate` within the window.
    pub fn count_matches(&self, ctx: &PassageContext<'_>, candidate: &Candidate) -> usize {
        let seg = ctx.segmentation();
        let field = ctx.lexicon.field(candidate.field);
        let domain = ctx.domain();
        let target = ctx.token(candidate).map(|t| t.normalized.as_str());

        seg.neighbours(candidate.sentence, self.window)
            .flat_map(|s| s.tokens.iter())
            .map(|t| t.normalized.as_str())
            .filter(|w| Some(*w) != target)
            .filter(|w| {
                ctx.is_content_word(w) && field.contains(w) && !ctx.lexicon.is_domain_literal(w, domain)
            })
            .count()
    }
}

impl DimensionScorer for ChainScorer {
    fn name(&self) -> &'static str {
        "ChainScorer"
    }

    fn description(&self) -> &'static str {
        "Reinforcement of the same register field in nearby sentences"
    }

    fn dimension(&self) -> Dimension {
        Dimension::Chain
    }

    fn score(&self, ctx: &PassageContext<'_>, candidate: &Candidate) -> DimensionScore {
        let matches = self.count_matches(ctx, candidate);
        let field = &ctx.lexicon.field(candidate.field).name;
        DimensionScore::new(
            Dimension::Chain,
            self.score_for(matches),
            format!("{} other '{}' words within ±{}", matches, field, self.window),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Passage;
    use crate::detectors::candidates::extract_candidates;
    use crate::lexicon::Lexicon;

    #[test]
    fn test_default_mapping() {
        let scorer = ChainScorer::from_config(&ScoringConfig::default());
        assert_eq!(scorer.score_for(0), 1.0);
        assert_eq!(scorer.score_for(1), 0.6);
        assert_eq!(scorer.score_for(2), 0.2);
        assert_eq!(scorer.score_for(3), 0.0);
        assert_eq!(scorer.score_for(40), 0.0);
    }

    fn chain_of(text: &str, word: &str) -> usize {
        let lex = Lexicon::builtin().unwrap();
        let passage = Passage::new("c", "test", "sawmill", text, &lex).unwrap();
        let ctx = PassageContext::new(&passage, &lex, 3);
        let extraction = extract_candidates(&passage, &lex, 3);
        let candidate = extraction
            .candidates
            .iter()
            .find(|c| ctx.token(c).is_some_and(|t| t.normalized == word))
            .unwrap();
        ChainScorer::from_config(&ScoringConfig::default()).count_matches(&ctx, candidate)
    }

    #[test]
    fn test_target_sentence_not_counted() {
        assert_eq!(chain_of("The crew arrived. The blade bit with teeth. The crew went home.", "bit"), 0);
        assert_eq!(chain_of("The crew arrived. The blade bit deep. Its teeth were dull.", "bit"), 1);
    }

    #[test]
    fn test_repeats_of_target_word_not_counted() {
        assert_eq!(chain_of("The blade bit deep. The saw bit again.", "bit"), 0);
    }

    #[test]
    fn test_custom_mapping_tail() {
        let scorer = ChainScorer::new(3, vec![1.0, 0.5]);
        assert_eq!(scorer.score_for(7), 0.5);
    }

    mod prop_tests {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_non_increasing(k in 0usize..20) {
                let scorer = ChainScorer::from_config(&ScoringConfig::default());
                prop_assert!(scorer.score_for(k + 1) <= scorer.score_for(k));
                prop_assert!((0.0..=1.0).contains(&scorer.score_for(k)));
            }
        }
    }
}
