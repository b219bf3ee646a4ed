use serde::Serialize;

/// Closing characters peeled off a token before checking for a terminator.
const CLOSERS: &[char] = &['"', '\'', ')', ']', '}', '\u{201d}', '\u{2019}', '\u{bb}'];
const TERMINATORS: &[char] = &['.', '!', '?'];

/// One word of a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Lowercased form with surrounding punctuation removed
    pub normalized: String,
    /// The whitespace-delimited text as written
    pub surface: String,
    /// Index among the kept tokens of the sentence
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    /// Slot index within the passage
    pub position: usize,
    pub tokens: Vec<Token>,
    /// Raw text of the slot, tokens joined by single spaces
    pub text: String,
}

impl Sentence {
    pub fn word_count(&self) -> usize {
        self.tokens.len()
    }
}

/// Result of segmenting one passage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    /// Non-vacant sentences in slot order
    pub sentences: Vec<Sentence>,
    /// Number of slots including vacant ones
    pub slot_count: usize,
    /// Whitespace tokens whose normalised form was empty
    pub dropped_tokens: usize,
    slots: Vec<Option<usize>>,
}

impl Segmentation {
    /// Sentence occupying `position`, or `None` for vacant or out-of-range slots.
    pub fn sentence_at(&self, position: usize) -> Option<&Sentence> {
        self.slots
            .get(position)
            .copied()
            .flatten()
            .map(|idx| &self.sentences[idx])
    }

    /// Kept tokens across all sentences.
    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(|s| s.tokens.len()).sum()
    }

    /// Non-vacant sentences within `radius` slots of `center`, ascending,
    /// with the center itself excluded. Clipped at the passage edges.
    pub fn neighbours(&self, center: usize, radius: usize) -> impl Iterator<Item = &Sentence> {
        let lo = center.saturating_sub(radius);
        let hi = center.saturating_add(radius).min(self.slot_count.saturating_sub(1));
        (lo..=hi)
            .filter(move |&p| p != center)
            .filter_map(move |p| self.sentence_at(p))
    }

    /// Non-vacant sentences strictly before `center`, nearest first.
    pub fn before(&self, center: usize, radius: usize) -> impl Iterator<Item = &Sentence> {
        let lo = center.saturating_sub(radius);
        (lo..center).rev().filter_map(move |p| self.sentence_at(p))
    }

    /// Non-vacant sentences strictly after `center`, nearest first.
    pub fn after(&self, center: usize, radius: usize) -> impl Iterator<Item = &Sentence> {
        let hi = center.saturating_add(radius);
        (center + 1..=hi).filter_map(move |p| self.sentence_at(p))
    }
}

/// Lowercase a word and strip leading/trailing non-alphanumeric characters.
/// Interior punctuation such as apostrophes and hyphens is kept.
pub fn normalize(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase()
}

fn ends_sentence(raw: &str) -> bool {
    raw.trim_end_matches(CLOSERS).ends_with(TERMINATORS)
}

fn close_slot(raw: &mut Vec<&str>, seg: &mut Segmentation) {
    if raw.is_empty() {
        return;
    }
    let position = seg.slot_count;
    seg.slot_count += 1;

    let mut tokens = Vec::with_capacity(raw.len());
    for surface in raw.iter() {
        let normalized = normalize(surface);
        if normalized.is_empty() {
            seg.dropped_tokens += 1;
            continue;
        }
        tokens.push(Token {
            normalized,
            surface: (*surface).to_string(),
            position: tokens.len(),
        });
    }

    if tokens.is_empty() {
        seg.slots.push(None);
    } else {
        seg.slots.push(Some(seg.sentences.len()));
        seg.sentences.push(Sentence {
            position,
            tokens,
            text: raw.join(" "),
        });
    }
    raw.clear();
}

/// Split `text` into sentence slots and tokens.
///
/// A whitespace token closes its sentence when, once trailing quotes and
/// brackets are removed, it ends in `.`, `!` or `?`. Trailing text without a
/// terminator forms a final slot.
pub fn segment(text: &str) -> Segmentation {
    let mut seg = Segmentation::default();
    let mut raw: Vec<&str> = Vec::new();

    for word in text.split_whitespace() {
        raw.push(word);
        if ends_sentence(word) {
            close_slot(&mut raw, &mut seg);
        }
    }
    close_slot(&mut raw, &mut seg);

    seg
}
