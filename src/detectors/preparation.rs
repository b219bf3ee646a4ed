//! Preparation scorer
//!
//! Checks the sentences around the candidate for signals that announce a
//! register shift. Signals form a first-match cascade; a candidate with no
//! signal scores 1.0.

use crate::config::{PreparationScores, ScoringConfig};
use crate::detectors::base::{Dimension, DimensionScore, DimensionScorer, PassageContext};
use crate::detectors::candidates::Candidate;
use crate::text::Sentence;

/// Which signal fired, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreparationSignal {
    /// A simile or frame marker in the target or an adjacent sentence
    Signposted,
    /// Dense figurative sentences on both sides
    Framed,
    /// A dense figurative sentence on one side
    Partial,
    /// Sharp word-count contrast with an adjacent sentence
    Rhythmic,
    Unprepared,
}

pub struct PreparationScorer {
    window: usize,
    density_threshold: f64,
    rhythm_ratio: f64,
    scores: PreparationScores,
}

impl PreparationScorer {
    pub fn new(window: usize, density_threshold: f64, rhythm_ratio: f64, scores: PreparationScores) -> Self {
        Self {
            window,
            density_threshold,
            rhythm_ratio,
            scores,
        }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(
            config.preparation_window,
            config.preparation_density_threshold,
            config.rhythm_ratio,
            config.preparation_scores,
        )
    }

    pub fn score_for(&self, signal: PreparationSignal) -> f64 {
        match signal {
            PreparationSignal::Signposted => self.scores.signposted,
            PreparationSignal::Framed => self.scores.framed,
            PreparationSignal::Partial => self.scores.partial,
            PreparationSignal::Rhythmic => self.scores.rhythmic,
            PreparationSignal::Unprepared => 1.0,
        }
    }

    /// First signal that fires for the sentence at `position`.
    pub fn classify(&self, ctx: &PassageContext<'_>, position: usize) -> (PreparationSignal, String) {
        let seg = ctx.segmentation();
        let Some(target) = seg.sentence_at(position) else {
            return (PreparationSignal::Unprepared, "no sentence".to_string());
        };
        let before: Vec<&Sentence> = seg.before(position, self.window).collect();
        let after: Vec<&Sentence> = seg.after(position, self.window).collect();

        let context = before
            .iter()
            .rev()
            .chain(std::iter::once(&target))
            .chain(after.iter())
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if let Some(re) = ctx.lexicon.signpost_match(&context) {
            return (
                PreparationSignal::Signposted,
                format!("signposted: matched '{}'", re.as_str()),
            );
        }

        let dense = |side: &[&Sentence]| {
            side.iter()
                .map(|s| ctx.density(s.position))
                .find(|d| *d > self.density_threshold)
        };
        match (dense(before.as_slice()), dense(after.as_slice())) {
            (Some(p), Some(n)) => {
                return (
                    PreparationSignal::Framed,
                    format!("figurative frame (prev {:.2}, next {:.2})", p, n),
                )
            }
            (Some(d), None) | (None, Some(d)) => {
                return (
                    PreparationSignal::Partial,
                    format!("one figurative neighbour ({:.2})", d),
                )
            }
            (None, None) => {}
        }

        let len = target.word_count();
        for neighbour in before.first().into_iter().chain(after.first()) {
            let other = neighbour.word_count();
            let (long, short) = if len >= other { (len, other) } else { (other, len) };
            if short > 0 && long as f64 / short as f64 >= self.rhythm_ratio {
                return (
                    PreparationSignal::Rhythmic,
                    format!("rhythmic shift ({} vs {} words)", other, len),
                );
            }
        }

        (PreparationSignal::Unprepared, "no preparation".to_string())
    }
}

impl DimensionScorer for PreparationScorer {
    fn name(&self) -> &'static str {
        "PreparationScorer"
    }

    fn description(&self) -> &'static str {
        "Signposting, figurative framing or rhythmic shift around the candidate"
    }

    fn dimension(&self) -> Dimension {
        Dimension::Preparation
    }

    fn score(&self, ctx: &PassageContext<'_>, candidate: &Candidate) -> DimensionScore {
        let (signal, detail) = self.classify(ctx, candidate.sentence);
        DimensionScore::new(Dimension::Preparation, self.score_for(signal), detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Passage;
    use crate::lexicon::Lexicon;

    fn classify(text: &str, domain: &str, position: usize) -> PreparationSignal {
        let lex = Lexicon::builtin().unwrap();
        let passage = Passage::new("p", "test", domain, text, &lex).unwrap();
        let ctx = PassageContext::new(&passage, &lex, 3);
        PreparationScorer::from_config(&ScoringConfig::default())
            .classify(&ctx, position)
            .0
    }

    #[test]
    fn test_signpost_in_previous_sentence() {
        let signal = classify(
            "It moved as if alive. The blade bit deep. The shift ended late.",
            "sawmill",
            1,
        );
        assert_eq!(signal, PreparationSignal::Signposted);
    }

    #[test]
    fn test_signpost_detail_names_pattern() {
        let lex = Lexicon::builtin().unwrap();
        let text = "It moved as if alive. The blade bit deep.";
        let passage = Passage::new("p", "test", "sawmill", text, &lex).unwrap();
        let ctx = PassageContext::new(&passage, &lex, 3);
        let (signal, detail) = PreparationScorer::from_config(&ScoringConfig::default()).classify(&ctx, 1);
        assert_eq!(signal, PreparationSignal::Signposted);
        assert!(detail.starts_with("signposted: matched '"));
        assert!(detail.contains("(?:if|though)"));
    }

    #[test]
    fn test_signpost_outside_window_ignored() {
        let signal = classify(
            "It moved as if alive. The crew stood. The blade bit deep. The crew went home.",
            "sawmill",
            2,
        );
        assert_eq!(signal, PreparationSignal::Unprepared);
    }

    #[test]
    fn test_framed_and_partial() {
        // "hunger" and "mouth" are consumption words, none literal in the sawmill
        let framed = classify(
            "Hunger filled the mouth. The blade bit deep. Hunger filled the mouth.",
            "sawmill",
            1,
        );
        assert_eq!(framed, PreparationSignal::Framed);

        let partial = classify(
            "Hunger filled the mouth. The blade bit deep. The crew went home.",
            "sawmill",
            1,
        );
        assert_eq!(partial, PreparationSignal::Partial);
    }

    #[test]
    fn test_rhythmic_shift() {
        let signal = classify(
            "The crew worked through the long grey morning without a single pause for food. \
             The blade bit deep. The crew went home.",
            "sawmill",
            1,
        );
        assert_eq!(signal, PreparationSignal::Rhythmic);
    }

    #[test]
    fn test_score_table() {
        let scorer = PreparationScorer::from_config(&ScoringConfig::default());
        assert_eq!(scorer.score_for(PreparationSignal::Signposted), 0.0);
        assert_eq!(scorer.score_for(PreparationSignal::Framed), 0.1);
        assert_eq!(scorer.score_for(PreparationSignal::Partial), 0.3);
        assert_eq!(scorer.score_for(PreparationSignal::Rhythmic), 0.2);
        assert_eq!(scorer.score_for(PreparationSignal::Unprepared), 1.0);
    }
}
