//! Text (terminal) reporter with colors and formatting

use console::style;

use super::{interval, p_value, percent};
use crate::models::{AnalysisReport, WordRecord};
use crate::probe::ProbeReport;
use crate::statistics::{Comparison, GroupSummary};
use anyhow::Result;

/// Orphaned words listed before truncating
const MAX_WORDS: usize = 20;
const RULE: &str = "──────────────────────────────────────";

/// Render report as formatted terminal output
pub fn render(report: &AnalysisReport) -> Result<String> {
    let mut out = String::new();
    let stats = &report.statistics;
    let orphaned = report.orphaned_words().count();

    // Header
    out.push_str(&format!("\n{}\n", style("Orphanhood Analysis").bold()));
    out.push_str(&format!("{}\n", style(RULE).dim()));
    out.push_str(&format!(
        "Passages: {}  Flagged: {}  Orphaned words: {}\n",
        stats.passages,
        style(stats.flagged_passages).bold(),
        orphaned
    ));
    out.push_str(&format!(
        "{}\n\n",
        style(format!(
            "Dimensions: {}  Threshold: {}  Alpha: {}  Lexicon: {}",
            report.settings.dimensions,
            report.settings.orphan_threshold,
            report.settings.alpha,
            report.settings.lexicon_version.as_deref().unwrap_or("unversioned"),
        ))
        .dim()
    ));

    out.push_str(&format!("{}\n", style("SOURCES").bold()));
    render_groups(&mut out, &stats.groups, "  ");
    out.push('\n');

    if !stats.comparisons.is_empty() {
        out.push_str(&format!("{} (one-sided: A flagged more often)\n", style("COMPARISONS").bold()));
        for c in &stats.comparisons {
            out.push_str(&format!("  {}\n", comparison_line(c)));
        }
        out.push('\n');
    }

    if stats.domains.len() > 1 {
        out.push_str(&format!("{}\n", style("BY DOMAIN").bold()));
        for domain in &stats.domains {
            out.push_str(&format!(
                "  {} {}\n",
                style(&domain.domain).cyan(),
                style(format!("({} passages)", domain.passages)).dim()
            ));
            render_groups(&mut out, &domain.groups, "    ");
            for c in &domain.comparisons {
                out.push_str(&format!("    {}\n", comparison_line(c)));
            }
        }
        out.push('\n');
    }

    if let Some(rows) = &stats.ablation {
        out.push_str(&format!("{}\n", style("ABLATION").bold()));
        for row in rows {
            let rates: Vec<String> = row
                .groups
                .iter()
                .map(|g| format!("{} {}", g.label, percent(g.passages.rate)))
                .collect();
            out.push_str(&format!(
                "  {:<16} flagged {:>4}  {}\n",
                row.configuration.name(),
                row.flagged_passages,
                rates.join("  ")
            ));
            for ac in &row.comparisons {
                out.push_str(&format!(
                    "  {:<16} {} vs {}: h={:.3}  Δh={:+.3}  p={}\n",
                    "",
                    ac.comparison.group_a,
                    ac.comparison.group_b,
                    ac.comparison.cohens_h,
                    ac.delta_h,
                    p_value(ac.comparison.fisher.greater)
                ));
            }
        }
        out.push('\n');
    }

    render_words(&mut out, report);
    Ok(out)
}

fn render_groups(out: &mut String, groups: &[GroupSummary], indent: &str) {
    for g in groups {
        out.push_str(&format!(
            "{indent}{:<12} {:>4}/{:<4} {:>7}  {:<18} {}\n",
            g.label,
            g.passages.flagged,
            g.passages.total,
            percent(g.passages.rate),
            interval(g.passages.ci),
            style(format!("{}/{} words orphaned", g.orphaned_words, g.candidates)).dim()
        ));
    }
}

fn comparison_line(c: &Comparison) -> String {
    let marker = if c.significant {
        style("*").red().bold().to_string()
    } else {
        " ".to_string()
    };
    format!(
        "{}{} vs {}: {}/{} vs {}/{}  p={} (two-sided {})  h={:.3} ({})  OR={:.2}  power={:.2}",
        marker,
        c.group_a,
        c.group_b,
        c.a.flagged,
        c.a.total,
        c.b.flagged,
        c.b.total,
        p_value(c.fisher.greater),
        p_value(c.fisher.two_sided),
        c.cohens_h,
        c.effect,
        c.odds_ratio,
        c.power
    )
}

fn render_words(out: &mut String, report: &AnalysisReport) {
    let orphaned: Vec<&WordRecord> = report.orphaned_words().collect();
    if orphaned.is_empty() {
        out.push_str(&format!("{}\n", style("No orphaned constructions found.").green()));
        return;
    }

    out.push_str(&format!("{} ({} total)\n", style("ORPHANED WORDS").bold(), orphaned.len()));
    out.push_str(&format!(
        "{}\n",
        style("  PASSAGE     WORD          FIELD           ISO   CHN   PREP  AGG").dim()
    ));
    for w in orphaned.iter().take(MAX_WORDS) {
        let word: String = w.word.chars().take(12).collect();
        out.push_str(&format!(
            "  {:<11} {:<13} {:<15} {:.2}  {:.2}  {:.2}  {}\n",
            w.passage_id,
            style(word).red(),
            w.register_field,
            w.isolation,
            w.chain,
            w.preparation,
            style(format!("{:.2}", w.aggregate)).bold()
        ));
        out.push_str(&format!("  {}\n", style(format!("  \"{}\"", w.excerpt)).dim()));
    }
    let remaining = orphaned.len().saturating_sub(MAX_WORDS);
    if remaining > 0 {
        out.push_str(&format!(
            "\n  {}\n",
            style(format!("...and {} more (use --format json for all)", remaining)).dim()
        ));
    }
}

/// Render a single two-group comparison
pub fn render_comparison(c: &Comparison) -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!("{}\n", style("Flag-rate comparison").bold()));
    out.push_str(&format!("{}\n", style(RULE).dim()));
    for (label, p) in [(&c.group_a, &c.a), (&c.group_b, &c.b)] {
        out.push_str(&format!(
            "  {:<12} {:>4}/{:<4} {:>7}  {}\n",
            label,
            p.flagged,
            p.total,
            percent(p.rate),
            interval(p.ci)
        ));
    }
    out.push_str(&format!(
        "\n  Fisher exact  one-sided (A > B): {}  (A < B): {}  two-sided: {}\n",
        p_value(c.fisher.greater),
        p_value(c.fisher.less),
        p_value(c.fisher.two_sided)
    ));
    out.push_str(&format!("  Cohen's h     {:.4} ({})\n", c.cohens_h, c.effect));
    out.push_str(&format!("  Odds ratio    {:.4}\n", c.odds_ratio));
    out.push_str(&format!("  Power         {:.4}\n", c.power));
    let verdict = if c.significant {
        style("significant").green().bold()
    } else {
        style("not significant").yellow()
    };
    out.push_str(&format!("  Result        {}\n", verdict));
    Ok(out)
}

/// Render vocabulary probe counts
pub fn render_probes(report: &ProbeReport) -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", style("Vocabulary Probes").bold()));
    out.push_str(&format!("{}\n", style(RULE).dim()));

    for probe in &report.probes {
        out.push_str(&format!(
            "\n{} {}\n",
            style(&probe.id).cyan().bold(),
            style(format!(
                "[{}] {}",
                probe.domain,
                probe.register.as_deref().unwrap_or("")
            ))
            .dim()
        ));
        if probe.sources.is_empty() {
            out.push_str(&format!("  {}\n", style("no passages in this domain").dim()));
            continue;
        }
        for s in &probe.sources {
            out.push_str(&format!(
                "  {:<12} literary {}/{} ({})  equivalent {}/{} ({})  pref {:.2}\n",
                s.source,
                s.literary_passages,
                s.passages,
                percent(s.literary_rate),
                s.equivalent_passages,
                s.passages,
                percent(s.equivalent_rate),
                s.preference_ratio
            ));
            if !s.literary_words_found.is_empty() {
                let top: Vec<String> = s
                    .literary_words_found
                    .iter()
                    .take(5)
                    .map(|w| format!("{}×{}", w.word, w.count))
                    .collect();
                out.push_str(&format!("  {}\n", style(format!("  top literary: {}", top.join(", "))).dim()));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;
    use crate::statistics::{compare, GroupCounts};

    #[test]
    fn test_text_render_lists_orphaned_word() {
        let out = render(&test_report()).unwrap();
        assert!(out.contains("Orphanhood Analysis"));
        assert!(out.contains("ORPHANED WORDS"));
        assert!(out.contains("bit"));
        assert!(out.contains("consumption"));
        assert!(out.contains("ABLATION"));
        assert!(out.contains("no_chain"));
    }

    #[test]
    fn test_text_render_without_orphans() {
        let mut report = test_report();
        report.words.clear();
        let out = render(&report).unwrap();
        assert!(out.contains("No orphaned constructions found."));
    }

    #[test]
    fn test_text_comparison() {
        let c = compare(
            "llm",
            GroupCounts::new(9, 20).unwrap(),
            "human",
            GroupCounts::new(1, 25).unwrap(),
            0.05,
        )
        .unwrap();
        let out = render_comparison(&c).unwrap();
        assert!(out.contains("0.0014"));
        assert!(out.contains("1.0679 (large)"));
        assert!(out.contains("significant"));
    }
}
