use serde::Serialize;
use statrs::function::factorial::ln_binomial;

use super::report::StatisticsError;

/// Relative tolerance when collecting tables "as extreme" as the observed one.
const TWO_SIDED_TOLERANCE: f64 = 1e-7;

/// 2x2 contingency table.
///
/// ```text
///            flagged  not flagged
/// group A       a          b
/// group B       c          d
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Table2x2 {
    pub a: u64,
    pub b: u64,
    pub c: u64,
    pub d: u64,
}

impl Table2x2 {
    pub fn new(a: u64, b: u64, c: u64, d: u64) -> Self {
        Self { a, b, c, d }
    }

    /// From flagged/total counts of each group. `flagged <= total` is assumed.
    pub fn from_counts(flagged_a: u64, total_a: u64, flagged_b: u64, total_b: u64) -> Self {
        Self::new(
            flagged_a,
            total_a.saturating_sub(flagged_a),
            flagged_b,
            total_b.saturating_sub(flagged_b),
        )
    }

    /// Sum of all four cells; `None` when it does not fit in a `u64`.
    pub fn total(&self) -> Option<u64> {
        self.a.checked_add(self.b)?.checked_add(self.c)?.checked_add(self.d)
    }
}

/// Fisher's exact test p-values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FisherResult {
    /// H1: group A's flag rate is greater
    pub greater: f64,
    /// H1: group A's flag rate is smaller
    pub less: f64,
    pub two_sided: f64,
}

/// Hypergeometric law of cell `a` given the table margins.
struct Hypergeometric {
    n: u64,
    row_a: u64,
    flagged: u64,
    lo: u64,
    hi: u64,
    ln_denominator: f64,
}

impl Hypergeometric {
    fn of(table: &Table2x2) -> Result<Self, StatisticsError> {
        let n = table.total().ok_or(StatisticsError::CountOverflow)?;
        // both partial sums are bounded by n
        let row_a = table.a + table.b;
        let flagged = table.a + table.c;
        Ok(Self {
            n,
            row_a,
            flagged,
            lo: row_a.saturating_sub(n - flagged),
            hi: row_a.min(flagged),
            ln_denominator: ln_binomial(n, row_a),
        })
    }

    fn pmf(&self, x: u64) -> f64 {
        (ln_binomial(self.flagged, x) + ln_binomial(self.n - self.flagged, self.row_a - x)
            - self.ln_denominator)
            .exp()
    }

    /// Most probable value of `a`.
    fn mode(&self) -> u64 {
        let guess = (self.row_a as f64 + 1.0) * (self.flagged as f64 + 1.0) / (self.n as f64 + 2.0);
        let mut m = (guess.floor() as u64).clamp(self.lo, self.hi);
        while m < self.hi && self.pmf(m + 1) > self.pmf(m) {
            m += 1;
        }
        while m > self.lo && self.pmf(m - 1) > self.pmf(m) {
            m -= 1;
        }
        m
    }

    /// P(X >= from) for `from` above the mode. Terms shrink moving outward,
    /// so the sum stops once they no longer change it.
    fn upper_tail(&self, from: u64) -> f64 {
        let mut sum = 0.0;
        for x in from..=self.hi {
            let p = self.pmf(x);
            sum += p;
            if p <= sum * f64::EPSILON {
                break;
            }
        }
        sum
    }

    /// P(X <= from) for `from` below the mode.
    fn lower_tail(&self, from: u64) -> f64 {
        let mut sum = 0.0;
        for x in (self.lo..=from).rev() {
            let p = self.pmf(x);
            sum += p;
            if p <= sum * f64::EPSILON {
                break;
            }
        }
        sum
    }

    /// Largest x below the mode with pmf(x) <= cutoff.
    fn lower_cut(&self, mode: u64, cutoff: f64) -> Option<u64> {
        if mode == self.lo || self.pmf(self.lo) > cutoff {
            return None;
        }
        let (mut inside, mut outside) = (self.lo, mode);
        while outside - inside > 1 {
            let mid = inside + (outside - inside) / 2;
            if self.pmf(mid) <= cutoff {
                inside = mid;
            } else {
                outside = mid;
            }
        }
        Some(inside)
    }

    /// Smallest x above the mode with pmf(x) <= cutoff.
    fn upper_cut(&self, mode: u64, cutoff: f64) -> Option<u64> {
        if mode == self.hi || self.pmf(self.hi) > cutoff {
            return None;
        }
        let (mut outside, mut inside) = (mode, self.hi);
        while inside - outside > 1 {
            let mid = outside + (inside - outside) / 2;
            if self.pmf(mid) <= cutoff {
                inside = mid;
            } else {
                outside = mid;
            }
        }
        Some(inside)
    }
}

/// Fisher's exact test under the hypergeometric null with fixed margins.
///
/// The two-sided p-value sums every table whose probability does not exceed
/// the observed one (within a relative tolerance of 1e-7). Only the tails are
/// evaluated, so the cost depends on the spread of the distribution rather
/// than on the counts. Fails when the cell total overflows a `u64`.
pub fn fisher_exact(table: &Table2x2) -> Result<FisherResult, StatisticsError> {
    let h = Hypergeometric::of(table)?;
    let a = table.a;
    let mode = h.mode();

    let greater = if a > mode {
        h.upper_tail(a)
    } else if a == h.lo {
        1.0
    } else {
        1.0 - h.lower_tail(a - 1)
    };
    let less = if a < mode {
        h.lower_tail(a)
    } else if a == h.hi {
        1.0
    } else {
        1.0 - h.upper_tail(a + 1)
    };

    let cutoff = h.pmf(a) * (1.0 + TWO_SIDED_TOLERANCE);
    let two_sided = if h.pmf(mode) <= cutoff {
        1.0
    } else {
        h.lower_cut(mode, cutoff).map_or(0.0, |x| h.lower_tail(x))
            + h.upper_cut(mode, cutoff).map_or(0.0, |x| h.upper_tail(x))
    };

    Ok(FisherResult {
        greater: greater.clamp(0.0, 1.0),
        less: less.clamp(0.0, 1.0),
        two_sided: two_sided.clamp(0.0, 1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fisher(a: u64, b: u64, c: u64, d: u64) -> FisherResult {
        fisher_exact(&Table2x2::new(a, b, c, d)).unwrap()
    }

    #[test]
    fn test_reference_table() {
        // LLM 9/20 flagged vs human 1/25
        let r = fisher(9, 11, 1, 24);
        assert!((r.greater - 0.001_374_137_505_731_379_8).abs() < 1e-12);
        assert!((r.less - 0.999_942_086_158_762_2).abs() < 1e-12);
        assert!((r.two_sided - 0.002_398_767_004_552_597_4).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric_swap() {
        let ab = fisher(9, 11, 1, 24);
        let ba = fisher(1, 24, 9, 11);
        assert!((ab.greater - ba.less).abs() < 1e-12);
        assert!((ab.two_sided - ba.two_sided).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_tables() {
        let r = fisher(0, 0, 0, 0);
        assert_eq!((r.greater, r.less, r.two_sided), (1.0, 1.0, 1.0));

        // nobody flagged: only one table fits the margins
        let r = fisher(0, 10, 0, 12);
        assert!((r.two_sided - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_matches_full_enumeration() {
        // every table with these margins, summed directly
        let (row_a, flagged, n) = (20u64, 10u64, 45u64);
        let pmf = |x: u64| {
            (ln_binomial(flagged, x) + ln_binomial(n - flagged, row_a - x) - ln_binomial(n, row_a)).exp()
        };
        for a in 0..=flagged {
            let r = fisher(a, row_a - a, flagged - a, n - row_a - flagged + a);
            let greater: f64 = (a..=flagged).map(pmf).sum();
            let less: f64 = (0..=a).map(pmf).sum();
            let cutoff = pmf(a) * (1.0 + 1e-7);
            let two: f64 = (0..=flagged).map(pmf).filter(|p| *p <= cutoff).sum();
            assert!((r.greater - greater.min(1.0)).abs() < 1e-12, "greater at a={a}");
            assert!((r.less - less.min(1.0)).abs() < 1e-12, "less at a={a}");
            assert!((r.two_sided - two.min(1.0)).abs() < 1e-12, "two-sided at a={a}");
        }
    }

    #[test]
    fn test_large_counts_stay_cheap() {
        // two flagged passages among 1e8
        let r = fisher_exact(&Table2x2::from_counts(1, 50_000_000, 1, 50_000_000)).unwrap();
        assert!((r.greater - 0.75).abs() < 1e-4);
        assert!((r.less - 0.75).abs() < 1e-4);
        assert_eq!(r.two_sided, 1.0);

        let r = fisher_exact(&Table2x2::from_counts(1, 5_000_000_000, 1, 5_000_000_000)).unwrap();
        assert!((r.greater - 0.75).abs() < 1e-2);

        // balanced margins around 1e9 passages
        let q = 250_000_000;
        let r = fisher(q + 100_000, q - 100_000, q - 100_000, q + 100_000);
        assert!(r.greater < 1e-12);
        assert!(r.less > 0.999_999);
        assert!(r.two_sided < 1e-12);
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let table = Table2x2::new(u64::MAX, 1, 0, 0);
        assert_eq!(table.total(), None);
        assert!(matches!(fisher_exact(&table), Err(StatisticsError::CountOverflow)));
    }

    #[test]
    fn test_from_counts() {
        assert_eq!(Table2x2::from_counts(9, 20, 1, 25), Table2x2::new(9, 11, 1, 24));
    }
}
