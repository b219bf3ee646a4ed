use serde::Serialize;
use statrs::distribution::{Beta, ContinuousCDF};

use super::stat::Stat;

/// Two-sided confidence interval on a proportion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

/// Clopper–Pearson exact interval for `k` successes out of `n` at level
/// `1 - alpha`. `None` when `n` is zero.
pub fn clopper_pearson(k: u64, n: u64, alpha: f64) -> Option<Interval> {
    if n == 0 {
        return None;
    }
    let k = k.min(n);
    let (kf, nf) = (k as f64, n as f64);
    let lower = if k == 0 {
        0.0
    } else {
        Beta::new(kf, nf - kf + 1.0).ok()?.inverse_cdf(alpha / 2.0)
    };
    let upper = if k == n {
        1.0
    } else {
        Beta::new(kf + 1.0, nf - kf).ok()?.inverse_cdf(1.0 - alpha / 2.0)
    };
    Some(Interval { lower, upper })
}

/// Flag rate of one group with its exact interval.
#[derive(Debug, Clone, Serialize)]
pub struct Proportion {
    pub flagged: u64,
    pub total: u64,
    pub rate: Stat,
    /// `None` for an empty group
    pub ci: Option<Interval>,
}

impl Proportion {
    pub fn new(flagged: u64, total: u64, alpha: f64) -> Self {
        Self {
            flagged,
            total,
            rate: Stat::ratio(flagged as f64, total as f64),
            ci: clopper_pearson(flagged, total, alpha),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(k: u64, n: u64, lower: f64, upper: f64) {
        let ci = clopper_pearson(k, n, 0.05).unwrap();
        assert!((ci.lower - lower).abs() < 1e-8, "{k}/{n} lower {}", ci.lower);
        assert!((ci.upper - upper).abs() < 1e-8, "{k}/{n} upper {}", ci.upper);
    }

    #[test]
    fn test_reference_intervals() {
        check(9, 20, 0.230_577_896_775_924_05, 0.684_721_866_959_451_5);
        check(1, 25, 0.001_012_199_699_310_822_7, 0.203_516_913_922_414_06);
        check(7, 20, 0.153_909_204_784_541_1, 0.592_188_534_532_828);
    }

    #[test]
    fn test_boundary_counts() {
        check(0, 10, 0.0, 0.308_497_107_818_760_7);
        check(10, 10, 0.691_502_892_181_239_2, 1.0);
    }

    #[test]
    fn test_empty_group() {
        assert!(clopper_pearson(0, 0, 0.05).is_none());
        let p = Proportion::new(0, 0, 0.05);
        assert_eq!(p.rate, Stat::Undefined);
        assert!(p.ci.is_none());
    }

    #[test]
    fn test_interval_contains_rate() {
        for n in 1..=30u64 {
            for k in 0..=n {
                let ci = clopper_pearson(k, n, 0.05).unwrap();
                let rate = k as f64 / n as f64;
                assert!(ci.lower <= rate && rate <= ci.upper);
            }
        }
    }
}
