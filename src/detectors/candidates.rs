//! Figurative candidate extraction
//!
//! A register-field word becomes a candidate only when it is not literal in
//! the passage's domain and one of the figurative-use patterns holds at its
//! position. Each pattern is a standalone predicate over the sentence tokens.

use serde::{Deserialize, Serialize};

use crate::corpus::Passage;
use crate::detectors::base::is_content_word;
use crate::lexicon::{FieldId, Lexicon};
use crate::text::Token;

/// Tokens searched backwards for an inanimate subject.
const SUBJECT_LOOKBACK: usize = 4;
/// Tokens searched forwards for an inanimate object.
const OBJECT_LOOKAHEAD: usize = 3;
/// Tokens this short are skipped like stopwords when looking for a noun.
const MAX_SKIPPED_LEN: usize = 2;

/// How a token qualified as figurative use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FigurativePattern {
    /// Inanimate subject given an animate predicate ("the engine refused")
    Personification,
    /// Animate verb acting on an inanimate object ("devoured the timber")
    AnimateVerbOnInanimate,
    /// Animate quality modifying an inanimate noun ("hungry steel")
    AnimateQualityModifier,
}

impl FigurativePattern {
    /// Evaluation order; the first pattern that holds is recorded.
    pub const ALL: [FigurativePattern; 3] = [
        FigurativePattern::Personification,
        FigurativePattern::AnimateVerbOnInanimate,
        FigurativePattern::AnimateQualityModifier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FigurativePattern::Personification => "personification",
            FigurativePattern::AnimateVerbOnInanimate => "animate_verb_on_inanimate",
            FigurativePattern::AnimateQualityModifier => "animate_quality_modifier",
        }
    }

    /// Whether this pattern holds for `tokens[index]`.
    pub fn holds(&self, tokens: &[Token], index: usize, lexicon: &Lexicon) -> bool {
        match self {
            FigurativePattern::Personification => personification(tokens, index, lexicon),
            FigurativePattern::AnimateVerbOnInanimate => {
                animate_verb_on_inanimate(tokens, index, lexicon)
            }
            FigurativePattern::AnimateQualityModifier => {
                animate_quality_modifier(tokens, index, lexicon)
            }
        }
    }

    /// First pattern that holds at `index`, if any.
    pub fn detect(tokens: &[Token], index: usize, lexicon: &Lexicon) -> Option<FigurativePattern> {
        Self::ALL
            .into_iter()
            .find(|p| p.holds(tokens, index, lexicon))
    }
}

impl std::fmt::Display for FigurativePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_skippable(word: &str, lexicon: &Lexicon) -> bool {
    word.chars().count() <= MAX_SKIPPED_LEN || lexicon.is_stopword(word)
}

/// Nearest non-skippable word among `candidates`, in the order given.
fn nearest_word<'t>(
    mut candidates: impl Iterator<Item = &'t Token>,
    lexicon: &Lexicon,
) -> Option<&'t str> {
    candidates
        .find(|t| !is_skippable(&t.normalized, lexicon))
        .map(|t| t.normalized.as_str())
}

fn personification(tokens: &[Token], index: usize, lexicon: &Lexicon) -> bool {
    let Some(token) = tokens.get(index) else {
        return false;
    };
    let word = token.normalized.as_str();
    if !lexicon.is_animate_verb(word) && !lexicon.is_animate_quality(word) {
        return false;
    }
    let start = index.saturating_sub(SUBJECT_LOOKBACK);
    nearest_word(tokens[start..index].iter().rev(), lexicon).is_some_and(|w| lexicon.is_inanimate(w))
}

fn animate_verb_on_inanimate(tokens: &[Token], index: usize, lexicon: &Lexicon) -> bool {
    let Some(token) = tokens.get(index) else {
        return false;
    };
    if !lexicon.is_animate_verb(&token.normalized) {
        return false;
    }
    let end = (index + 1 + OBJECT_LOOKAHEAD).min(tokens.len());
    nearest_word(tokens[index + 1..end].iter(), lexicon).is_some_and(|w| lexicon.is_inanimate(w))
}

fn animate_quality_modifier(tokens: &[Token], index: usize, lexicon: &Lexicon) -> bool {
    let Some(token) = tokens.get(index) else {
        return false;
    };
    if !lexicon.is_animate_quality(&token.normalized) {
        return false;
    }
    tokens.get(index + 1).is_some_and(|next| {
        let w = next.normalized.as_str();
        lexicon.is_inanimate(w) || lexicon.fields().iter().any(|f| f.contains(w))
    })
}

/// A (token, register field) pair that passed every candidacy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Sentence slot position
    pub sentence: usize,
    /// Token index within the sentence
    pub token: usize,
    pub field: FieldId,
    pub pattern: FigurativePattern,
}

/// Candidates of one passage plus the literal-filter tally.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// In sentence, token, field order
    pub candidates: Vec<Candidate>,
    /// Register-bearing content words suppressed as domain-literal
    pub literal_filtered: usize,
}

/// Scan a passage for figurative candidates.
pub fn extract_candidates(passage: &Passage, lexicon: &Lexicon, min_content_word_len: usize) -> Extraction {
    let domain = passage.domain;
    let mut out = Extraction::default();

    for sentence in &passage.segmentation.sentences {
        for (index, token) in sentence.tokens.iter().enumerate() {
            let word = token.normalized.as_str();
            if !is_content_word(word, lexicon, min_content_word_len) {
                continue;
            }
            if !lexicon.is_register_word(word, domain) {
                continue;
            }
            if lexicon.is_domain_literal(word, domain) {
                out.literal_filtered += 1;
                continue;
            }
            let Some(pattern) = FigurativePattern::detect(&sentence.tokens, index, lexicon) else {
                continue;
            };
            for field in lexicon.fields_of(word, domain) {
                out.candidates.push(Candidate {
                    sentence: sentence.position,
                    token: index,
                    field,
                    pattern,
                });
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::segment;

    fn lex() -> Lexicon {
        Lexicon::builtin().unwrap()
    }

    fn tokens(text: &str) -> Vec<Token> {
        segment(text).sentences.remove(0).tokens
    }

    fn index_of(tokens: &[Token], word: &str) -> usize {
        tokens.iter().position(|t| t.normalized == word).unwrap()
    }

    #[test]
    fn test_personification() {
        let lex = lex();
        let t = tokens("The blade bit deep.");
        assert!(FigurativePattern::Personification.holds(&t, index_of(&t, "bit"), &lex));

        // stopwords between subject and verb are skipped
        let t = tokens("The engine that was there refused.");
        assert!(FigurativePattern::Personification.holds(&t, index_of(&t, "refused"), &lex));

        // an animate subject blocks the search
        let t = tokens("The sawyer bit his lip.");
        assert!(!FigurativePattern::Personification.holds(&t, index_of(&t, "bit"), &lex));
    }

    #[test]
    fn test_personification_lookback_limit() {
        let lex = lex();
        // five stopwords push the noun out of reach
        let t = tokens("Iron and the of to a bit.");
        assert!(!FigurativePattern::Personification.holds(&t, index_of(&t, "bit"), &lex));
    }

    #[test]
    fn test_animate_verb_on_inanimate() {
        let lex = lex();
        let t = tokens("Flames devoured the timber.");
        assert!(FigurativePattern::AnimateVerbOnInanimate.holds(&t, index_of(&t, "devoured"), &lex));

        let t = tokens("She devoured the bread.");
        assert!(!FigurativePattern::AnimateVerbOnInanimate.holds(&t, index_of(&t, "devoured"), &lex));
    }

    #[test]
    fn test_animate_quality_modifier() {
        let lex = lex();
        let t = tokens("The hungry steel waited.");
        assert!(FigurativePattern::AnimateQualityModifier.holds(&t, index_of(&t, "hungry"), &lex));

        let t = tokens("The hungry dog waited.");
        assert!(!FigurativePattern::AnimateQualityModifier.holds(&t, index_of(&t, "hungry"), &lex));
    }

    #[test]
    fn test_non_animate_word_never_matches() {
        let lex = lex();
        let t = tokens("The iron teeth gleamed.");
        let i = index_of(&t, "teeth");
        assert!(FigurativePattern::detect(&t, i, &lex).is_none());
    }

    #[test]
    fn test_pattern_order() {
        let lex = lex();
        // both personification and the object pattern hold; the first wins
        let t = tokens("The fire ate the wood.");
        assert_eq!(
            FigurativePattern::detect(&t, index_of(&t, "ate"), &lex),
            Some(FigurativePattern::Personification)
        );
    }
}
