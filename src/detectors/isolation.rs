//! Isolation scorer
//!
//! Is the candidate's sentence a local spike in figurative density? The
//! target's φ is compared with the mean φ of the non-vacant sentences within
//! the window; the gap is scaled by τ and clamped to [0, 1].

use crate::config::ScoringConfig;
use crate::detectors::base::{Dimension, DimensionScore, DimensionScorer, PassageContext};
use crate::detectors::candidates::Candidate;

pub struct IsolationScorer {
    window: usize,
    tau: f64,
}

impl IsolationScorer {
    pub fn new(window: usize, tau: f64) -> Self {
        Self { window, tau }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.isolation_window, config.isolation_tau)
    }

    /// clamp((target − mean) / τ); no neighbours scores 0.
    pub fn score_densities(&self, target: f64, neighbours: &[f64]) -> f64 {
        if neighbours.is_empty() {
            return 0.0;
        }
        // fixed left-to-right order keeps the mean bit-identical across runs
        let mean = neighbours.iter().sum::<f64>() / neighbours.len() as f64;
        ((target - mean) / self.tau).clamp(0.0, 1.0)
    }
}

impl DimensionScorer for IsolationScorer {
    fn name(&self) -> &'static str {
        "IsolationScorer"
    }

    fn description(&self) -> &'static str {
        "Figurative density spike relative to neighbouring sentences"
    }

    fn dimension(&self) -> Dimension {
        Dimension::Isolation
    }

    fn score(&self, ctx: &PassageContext<'_>, candidate: &Candidate) -> DimensionScore {
        let target = ctx.density(candidate.sentence);
        let neighbours: Vec<f64> = ctx
            .segmentation()
            .neighbours(candidate.sentence, self.window)
            .map(|s| ctx.density(s.position))
            .collect();

        let score = self.score_densities(target, &neighbours);
        let detail = if neighbours.is_empty() {
            format!("target {:.2}, no neighbours", target)
        } else {
            let mean = neighbours.iter().sum::<f64>() / neighbours.len() as f64;
            format!(
                "target {:.2} vs neighbour mean {:.2} over {} sentences",
                target,
                mean,
                neighbours.len()
            )
        };
        DimensionScore::new(Dimension::Isolation, score, detail)
    }
}
