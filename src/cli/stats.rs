//! Stats commands - flag-rate comparison and power without a corpus

use anyhow::{ensure, Result};
use console::style;
use std::str::FromStr;

use crate::reporters::{self, OutputFormat};
use crate::statistics::{compare as compare_groups, effect_label, power_two_proportions, GroupCounts};

fn ensure_alpha(alpha: f64) -> Result<()> {
    ensure!(alpha > 0.0 && alpha < 1.0, "alpha must be in (0, 1) (got {})", alpha);
    Ok(())
}

/// `stats compare`
pub(super) fn compare(
    a: (u64, u64),
    b: (u64, u64),
    label_a: &str,
    label_b: &str,
    alpha: f64,
    format: &str,
) -> Result<()> {
    ensure_alpha(alpha)?;
    let format = OutputFormat::from_str(format)?;
    let counts_a = GroupCounts::new(a.0, a.1)?;
    let counts_b = GroupCounts::new(b.0, b.1)?;

    let comparison = compare_groups(label_a, counts_a, label_b, counts_b, alpha)?;
    println!("{}", reporters::comparison_report(&comparison, format)?.trim_end());
    Ok(())
}

/// `stats power`
pub(super) fn power(h: f64, n1: u64, n2: u64, alpha: f64) -> Result<()> {
    ensure_alpha(alpha)?;
    ensure!(h.is_finite(), "effect size must be finite");
    let power = power_two_proportions(h, n1, n2, alpha);
    println!(
        "{} h={} ({}) n1={} n2={} alpha={}: {:.4}",
        style("Power").bold(),
        h,
        effect_label(h),
        n1,
        n2,
        alpha,
        power
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_bounds() {
        assert!(ensure_alpha(0.05).is_ok());
        assert!(ensure_alpha(0.0).is_err());
        assert!(ensure_alpha(1.0).is_err());
    }

    #[test]
    fn test_compare_rejects_bad_input() {
        assert!(compare((1, 2), (1, 2), "a", "b", 1.5, "text").is_err());
        assert!(compare((1, 2), (1, 2), "a", "b", 0.05, "sarif").is_err());
    }
}
