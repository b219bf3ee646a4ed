//! Passage segmentation
//!
//! Splits raw text into sentence slots and word tokens. Neighbourhoods used by
//! the scorers are defined over slot positions, so a slot whose tokens all
//! normalise to nothing stays vacant instead of being squeezed out.

mod segmenter;

pub use segmenter::{normalize, segment, Segmentation, Sentence, Token};
