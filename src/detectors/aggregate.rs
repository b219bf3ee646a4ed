//! Orphanhood aggregation
//!
//! One function turns sub-scores into an aggregate for any active subset of
//! dimensions; ablation is just a different `DimensionSet`.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::detectors::base::Dimension;

/// A subset of the three dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimensionSet(u8);

impl DimensionSet {
    pub const FULL: DimensionSet = DimensionSet(0b111);
    pub const EMPTY: DimensionSet = DimensionSet(0);

    fn bit(dimension: Dimension) -> u8 {
        match dimension {
            Dimension::Isolation => 0b001,
            Dimension::Chain => 0b010,
            Dimension::Preparation => 0b100,
        }
    }

    pub fn from_dimensions(dimensions: &[Dimension]) -> Self {
        dimensions
            .iter()
            .fold(Self::EMPTY, |set, d| DimensionSet(set.0 | Self::bit(*d)))
    }

    pub fn contains(self, dimension: Dimension) -> bool {
        self.0 & Self::bit(dimension) != 0
    }

    pub fn without(self, dimension: Dimension) -> Self {
        DimensionSet(self.0 & !Self::bit(dimension))
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Active dimensions in canonical order.
    pub fn iter(self) -> impl Iterator<Item = Dimension> {
        Dimension::ALL.into_iter().filter(move |d| self.contains(*d))
    }

    /// The full model followed by each single-dimension removal.
    pub fn ablation_configs() -> [DimensionSet; 4] {
        [
            Self::FULL,
            Self::FULL.without(Dimension::Isolation),
            Self::FULL.without(Dimension::Chain),
            Self::FULL.without(Dimension::Preparation),
        ]
    }

    /// `full`, `no_<dimension>`, or the active names joined with `+`.
    pub fn name(self) -> String {
        if self == Self::FULL {
            return "full".to_string();
        }
        if self.len() == 2 {
            if let Some(missing) = Dimension::ALL.into_iter().find(|d| !self.contains(*d)) {
                return format!("no_{}", missing);
            }
        }
        if self.is_empty() {
            return "none".to_string();
        }
        self.iter().map(|d| d.as_str()).collect::<Vec<_>>().join("+")
    }
}

impl Default for DimensionSet {
    fn default() -> Self {
        Self::FULL
    }
}

impl fmt::Display for DimensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl Serialize for DimensionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

/// The three sub-scores of one candidate, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SubScores {
    pub isolation: f64,
    pub chain: f64,
    pub preparation: f64,
}

impl SubScores {
    pub fn new(isolation: f64, chain: f64, preparation: f64) -> Self {
        Self {
            isolation,
            chain,
            preparation,
        }
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Isolation => self.isolation,
            Dimension::Chain => self.chain,
            Dimension::Preparation => self.preparation,
        }
    }

    pub fn set(&mut self, dimension: Dimension, score: f64) {
        match dimension {
            Dimension::Isolation => self.isolation = score,
            Dimension::Chain => self.chain = score,
            Dimension::Preparation => self.preparation = score,
        }
    }
}

/// Binary classification of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Orphaned,
    #[serde(rename = "structurally_integrated")]
    Integrated,
}

impl Verdict {
    pub fn is_orphaned(self) -> bool {
        self == Verdict::Orphaned
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Orphaned => "orphaned",
            Verdict::Integrated => "structurally integrated",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate score and classification of one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Orphanhood {
    pub aggregate: f64,
    pub verdict: Verdict,
}

/// Unweighted mean over the active dimensions, summed in canonical order.
/// `None` for an empty set.
pub fn aggregate(scores: &SubScores, active: DimensionSet) -> Option<f64> {
    if active.is_empty() {
        return None;
    }
    let sum: f64 = active.iter().map(|d| scores.get(d)).sum();
    Some(sum / active.len() as f64)
}

/// Orphaned iff strictly above the threshold.
pub fn classify(aggregate: f64, threshold: f64) -> Verdict {
    if aggregate > threshold {
        Verdict::Orphaned
    } else {
        Verdict::Integrated
    }
}

pub fn orphanhood(scores: &SubScores, active: DimensionSet, threshold: f64) -> Option<Orphanhood> {
    aggregate(scores, active).map(|aggregate| Orphanhood {
        aggregate,
        verdict: classify(aggregate, threshold),
    })
}
