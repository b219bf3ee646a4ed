use statrs::distribution::{ContinuousCDF, Normal};

use super::fisher::Table2x2;
use super::stat::Stat;

/// Cohen's h between two proportions: 2·asin√p1 − 2·asin√p2.
pub fn cohens_h(p1: f64, p2: f64) -> f64 {
    2.0 * p1.sqrt().asin() - 2.0 * p2.sqrt().asin()
}

/// Qualitative label for |h| (0.2 small, 0.5 medium, 0.8 large).
pub fn effect_label(h: f64) -> &'static str {
    let h = h.abs();
    if h >= 0.8 {
        "large"
    } else if h >= 0.5 {
        "medium"
    } else if h >= 0.2 {
        "small"
    } else {
        "negligible"
    }
}

/// A priori power of a one-sided two-proportion z-test at effect size `h`.
///
/// power = 1 − Φ(z₁₋α − |h| / √(1/n1 + 1/n2)). Undefined for an empty group.
pub fn power_two_proportions(h: f64, n1: u64, n2: u64, alpha: f64) -> Stat {
    if n1 == 0 || n2 == 0 || !h.is_finite() {
        return Stat::Undefined;
    }
    let Ok(standard) = Normal::new(0.0, 1.0) else {
        return Stat::Undefined;
    };
    let se = (1.0 / n1 as f64 + 1.0 / n2 as f64).sqrt();
    let z_alpha = standard.inverse_cdf(1.0 - alpha);
    Stat::Value(1.0 - standard.cdf(z_alpha - h.abs() / se))
}

/// Odds ratio (a·d)/(b·c); a zero denominator is reported out of band.
pub fn odds_ratio(table: &Table2x2) -> Stat {
    let num = table.a as f64 * table.d as f64;
    let den = table.b as f64 * table.c as f64;
    Stat::ratio(num, den)
}
