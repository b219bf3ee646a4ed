//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Generates reports suitable for:
//! - Experiment write-ups
//! - Pull request comments on corpus changes

use super::{interval, p_value, percent};
use crate::models::AnalysisReport;
use crate::probe::ProbeReport;
use crate::statistics::{Comparison, GroupSummary};
use anyhow::Result;

/// Maximum orphaned words listed in the detail table
const MAX_WORDS: usize = 50;

/// Render report as GitHub-flavored Markdown
pub fn render(report: &AnalysisReport) -> Result<String> {
    let mut md = String::new();

    md.push_str(&render_header(report));
    md.push('\n');
    md.push_str(&render_sources(report));
    md.push('\n');
    md.push_str(&render_comparisons(&report.statistics.comparisons));
    md.push('\n');
    md.push_str(&render_domains(report));
    md.push_str(&render_ablation(report));
    md.push_str(&render_words(report));
    md.push_str(&render_footer(report));

    Ok(md)
}

fn render_header(report: &AnalysisReport) -> String {
    let s = &report.settings;
    format!(
        r#"# Orphanhood Report

| Setting | Value |
|---------|-------|
| **Passages** | {} |
| **Flagged passages** | {} |
| **Dimensions** | {} |
| **Threshold** | {} |
| **Alpha** | {} |
| **Baseline** | {} |
"#,
        report.statistics.passages,
        report.statistics.flagged_passages,
        s.dimensions,
        s.orphan_threshold,
        s.alpha,
        s.baseline.as_deref().unwrap_or("none"),
    )
}

fn groups_table(groups: &[GroupSummary]) -> String {
    let mut md = String::from(
        "| Source | Flagged | Rate | 95% CI | Orphaned words | Scored words |\n\
         |--------|---------|------|--------|----------------|--------------|\n",
    );
    for g in groups {
        md.push_str(&format!(
            "| {} | {}/{} | {} | {} | {} | {} |\n",
            g.label,
            g.passages.flagged,
            g.passages.total,
            percent(g.passages.rate),
            interval(g.passages.ci),
            g.orphaned_words,
            g.candidates
        ));
    }
    md
}

fn render_sources(report: &AnalysisReport) -> String {
    format!("## Sources\n\n{}", groups_table(&report.statistics.groups))
}

fn comparisons_table(comparisons: &[Comparison]) -> String {
    let mut md = String::from(
        "| A | B | p (A > B) | p (two-sided) | Cohen's h | Effect | Odds ratio | Power |\n\
         |---|---|-----------|---------------|-----------|--------|------------|-------|\n",
    );
    for c in comparisons {
        md.push_str(&format!(
            "| {} | {} | {}{} | {} | {:.3} | {} | {:.2} | {:.2} |\n",
            c.group_a,
            c.group_b,
            p_value(c.fisher.greater),
            if c.significant { " **" } else { "" },
            p_value(c.fisher.two_sided),
            c.cohens_h,
            c.effect,
            c.odds_ratio,
            c.power
        ));
    }
    md
}

fn render_comparisons(comparisons: &[Comparison]) -> String {
    if comparisons.is_empty() {
        return "## Comparisons\n\nOnly one source label; nothing to compare.\n".to_string();
    }
    format!(
        "## Comparisons\n\n{}\n`**` marks p below alpha.\n",
        comparisons_table(comparisons)
    )
}

fn render_domains(report: &AnalysisReport) -> String {
    let domains = &report.statistics.domains;
    if domains.len() < 2 {
        return String::new();
    }
    let mut md = String::from("## By Domain\n\n");
    for d in domains {
        md.push_str(&format!("### {} ({} passages)\n\n", d.domain, d.passages));
        md.push_str(&groups_table(&d.groups));
        if !d.comparisons.is_empty() {
            md.push('\n');
            md.push_str(&comparisons_table(&d.comparisons));
        }
        md.push('\n');
    }
    md
}

fn render_ablation(report: &AnalysisReport) -> String {
    let Some(rows) = &report.statistics.ablation else {
        return String::new();
    };
    let mut md = String::from(
        "## Ablation\n\n\
         | Configuration | Flagged | Comparison | Cohen's h | Δh | p (A > B) |\n\
         |---------------|---------|------------|-----------|----|-----------|\n",
    );
    for row in rows {
        if row.comparisons.is_empty() {
            md.push_str(&format!(
                "| {} | {} | | | | |\n",
                row.configuration, row.flagged_passages
            ));
        }
        for ac in &row.comparisons {
            md.push_str(&format!(
                "| {} | {} | {} vs {} | {:.3} | {:.3} | {} |\n",
                row.configuration,
                row.flagged_passages,
                ac.comparison.group_a,
                ac.comparison.group_b,
                ac.comparison.cohens_h,
                ac.delta_h,
                p_value(ac.comparison.fisher.greater)
            ));
        }
    }
    md.push('\n');
    md
}

fn render_words(report: &AnalysisReport) -> String {
    let orphaned: Vec<_> = report.orphaned_words().collect();
    if orphaned.is_empty() {
        return "## Orphaned Words\n\nNo orphaned constructions found.\n\n".to_string();
    }
    let mut md = String::from(
        "## Orphaned Words\n\n\
         | Passage | Word | Field | Pattern | Isolation | Chain | Preparation | Aggregate | Sentence |\n\
         |---------|------|-------|---------|-----------|-------|-------------|-----------|----------|\n",
    );
    for w in orphaned.iter().take(MAX_WORDS) {
        md.push_str(&format!(
            "| {} | `{}` | {} | {} | {:.2} | {:.2} | {:.2} | **{:.2}** | {} |\n",
            w.passage_id,
            w.word,
            w.register_field,
            w.pattern,
            w.isolation,
            w.chain,
            w.preparation,
            w.aggregate,
            escape_cell(&w.excerpt)
        ));
    }
    if orphaned.len() > MAX_WORDS {
        md.push_str(&format!(
            "\n*...and {} more*\n",
            orphaned.len() - MAX_WORDS
        ));
    }
    md.push('\n');
    md
}

fn render_footer(report: &AnalysisReport) -> String {
    format!(
        "---\n\n*Generated by orphanhood {}*\n",
        report.version
    )
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Render a single two-group comparison
pub fn render_comparison(c: &Comparison) -> Result<String> {
    let mut md = String::from("# Flag-rate Comparison\n\n");
    md.push_str(
        "| Group | Flagged | Rate | 95% CI |\n\
         |-------|---------|------|--------|\n",
    );
    for (label, p) in [(&c.group_a, &c.a), (&c.group_b, &c.b)] {
        md.push_str(&format!(
            "| {} | {}/{} | {} | {} |\n",
            label,
            p.flagged,
            p.total,
            percent(p.rate),
            interval(p.ci)
        ));
    }
    md.push('\n');
    md.push_str(&comparisons_table(std::slice::from_ref(c)));
    Ok(md)
}

/// Render vocabulary probe counts
pub fn render_probes(report: &ProbeReport) -> Result<String> {
    let mut md = String::from("# Vocabulary Probes\n\n");
    for probe in &report.probes {
        md.push_str(&format!("## {} ({})\n\n", probe.id, probe.domain));
        if let Some(register) = &probe.register {
            md.push_str(&format!("*{}*\n\n", register));
        }
        if probe.sources.is_empty() {
            md.push_str("No passages in this domain.\n\n");
            continue;
        }
        md.push_str(
            "| Source | Passages | Literary | Equivalent | Both | Neither | Preference ratio |\n\
             |--------|----------|----------|------------|------|---------|------------------|\n",
        );
        for s in &probe.sources {
            md.push_str(&format!(
                "| {} | {} | {} ({}) | {} ({}) | {} | {} | {:.2} |\n",
                s.source,
                s.passages,
                s.literary_passages,
                percent(s.literary_rate),
                s.equivalent_passages,
                percent(s.equivalent_rate),
                s.both_passages,
                s.neither_passages,
                s.preference_ratio
            ));
        }
        md.push('\n');
    }
    Ok(md)
}
