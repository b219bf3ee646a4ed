use std::sync::Arc;

use super::*;
use crate::config::ScoringConfig;
use crate::corpus::Passage;
use crate::detectors::AnalysisEngine;
use crate::lexicon::Lexicon;

const ORPHANED: &str = "The crew arrived at dawn. Logs rolled onto the carriage. The blade bit deep. \
                        Sawdust drifted across the floor. The foreman checked the stack.";
const CLEAN: &str = "The crew arrived early. They stacked the boards.";

/// (source, orphaned?) pairs analysed with the built-in lexicon
fn analyses(spec: &[(&str, bool)]) -> Vec<PassageAnalysis> {
    let lex = Arc::new(Lexicon::builtin().unwrap());
    let engine = AnalysisEngine::new(Arc::clone(&lex), &ScoringConfig::default(), 1);
    spec.iter()
        .enumerate()
        .map(|(i, (source, orphaned))| {
            let (domain, text) = if *orphaned { ("sawmill", ORPHANED) } else { ("general", CLEAN) };
            let passage = Passage::new(format!("p{i}"), *source, domain, text, &lex).unwrap();
            engine.analyze_passage(&passage)
        })
        .collect()
}

fn corpus() -> Vec<PassageAnalysis> {
    analyses(&[
        ("llm", true),
        ("llm", true),
        ("llm", true),
        ("llm", false),
        ("human", true),
        ("human", false),
        ("human", false),
        ("human", false),
    ])
}

#[test]
fn test_compare_reference_counts() {
    let a = GroupCounts::new(9, 20).unwrap();
    let b = GroupCounts::new(1, 25).unwrap();
    let c = compare("llm", a, "human", b, 0.05).unwrap();

    assert_eq!(c.table, Table2x2::new(9, 11, 1, 24));
    assert!((c.fisher.greater - 0.001_374_137_505_731_379_8).abs() < 1e-12);
    assert!((c.fisher.two_sided - 0.002_398_767_004_552_597_4).abs() < 1e-12);
    assert!((c.cohens_h.value().unwrap() - 1.067_913_064_052_675_3).abs() < 1e-12);
    assert_eq!(c.effect, "large");
    assert!((c.odds_ratio.value().unwrap() - 19.636_363_636_363_637).abs() < 1e-9);
    assert!((c.power.value().unwrap() - 0.972_244_602_182_572_9).abs() < 1e-6);
    assert!(c.significant);
}

#[test]
fn test_compare_empty_group_is_out_of_band() {
    let c = compare("a", GroupCounts::new(0, 0).unwrap(), "b", GroupCounts::new(3, 10).unwrap(), 0.05)
        .unwrap();
    assert_eq!(c.a.rate, Stat::Undefined);
    assert!(c.a.ci.is_none());
    assert_eq!(c.cohens_h, Stat::Undefined);
    assert_eq!(c.effect, "n/a");
    assert_eq!(c.power, Stat::Undefined);
    assert!(!c.significant);
}

#[test]
fn test_compare_zero_cell_odds_ratio() {
    let c = compare("a", GroupCounts::new(4, 4).unwrap(), "b", GroupCounts::new(0, 5).unwrap(), 0.05)
        .unwrap();
    // b·c = 0·0
    assert_eq!(c.odds_ratio, Stat::Infinite);
}

#[test]
fn test_compare_overflowing_counts() {
    let huge = GroupCounts::new(1, u64::MAX).unwrap();
    let overflow = compare("a", huge, "b", GroupCounts::new(1, 2).unwrap(), 0.05);
    assert!(matches!(overflow, Err(StatisticsError::CountOverflow)));
}

#[test]
fn test_group_counts_validation() {
    assert!(matches!(
        GroupCounts::new(5, 4),
        Err(StatisticsError::InvalidCounts { flagged: 5, total: 4 })
    ));
    assert_eq!(GroupCounts::new(1, 4).unwrap().not_flagged(), 3);
}

#[test]
fn test_comparison_pairs() {
    let labels: Vec<String> = ["gpt", "human", "claude"].iter().map(|s| s.to_string()).collect();
    let pair = |a: &str, b: &str| (a.to_string(), b.to_string());

    assert_eq!(
        comparison_pairs(&labels, None),
        vec![pair("claude", "gpt"), pair("claude", "human"), pair("gpt", "human")]
    );
    assert_eq!(
        comparison_pairs(&labels, Some("human")),
        vec![pair("claude", "human"), pair("gpt", "human")]
    );
    assert!(comparison_pairs(&labels, Some("nobody")).is_empty());
}

#[test]
fn test_build_groups_and_comparisons() {
    let report = StatisticsEngine::new(0.05, 0.6)
        .with_baseline(Some("human".to_string()))
        .build(&corpus(), DimensionSet::FULL)
        .unwrap();

    assert_eq!(report.passages, 8);
    assert_eq!(report.flagged_passages, 4);
    let labels: Vec<&str> = report.groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(labels, vec!["human", "llm"]);

    let llm = &report.groups[1];
    assert_eq!((llm.passages.flagged, llm.passages.total, llm.not_flagged), (3, 4, 1));
    assert_eq!(llm.orphaned_words, 3);
    assert_eq!(llm.integrated_words, 0);

    assert_eq!(report.comparisons.len(), 1);
    let c = &report.comparisons[0];
    assert_eq!((c.group_a.as_str(), c.group_b.as_str()), ("llm", "human"));
    assert_eq!(c.table, Table2x2::new(3, 1, 1, 3));
    assert!(report.ablation.is_none());
}

#[test]
fn test_build_domain_breakdown() {
    let report = StatisticsEngine::new(0.05, 0.6)
        .with_baseline(Some("human".to_string()))
        .build(&corpus(), DimensionSet::FULL)
        .unwrap();

    let domains: Vec<&str> = report.domains.iter().map(|d| d.domain.as_str()).collect();
    assert_eq!(domains, vec!["general", "sawmill"]);
    let sawmill = &report.domains[1];
    assert_eq!(sawmill.passages, 4);
    assert!(sawmill.groups.iter().all(|g| g.passages.flagged == g.passages.total));
    assert_eq!(sawmill.comparisons.len(), 1);
}

#[test]
fn test_build_skips_domains_without_baseline() {
    let analyses = analyses(&[("llm", true), ("human", false), ("llm", false)]);
    let report = StatisticsEngine::new(0.05, 0.6)
        .with_baseline(Some("human".to_string()))
        .build(&analyses, DimensionSet::FULL)
        .unwrap();
    let sawmill = report.domains.iter().find(|d| d.domain == "sawmill").unwrap();
    assert!(sawmill.comparisons.is_empty());
}

#[test]
fn test_build_errors() {
    assert!(matches!(
        StatisticsEngine::new(0.05, 0.6).build(&[], DimensionSet::FULL),
        Err(StatisticsError::NoPassages)
    ));
    let err = StatisticsEngine::new(0.05, 0.6)
        .with_baseline(Some("nobody".to_string()))
        .build(&corpus(), DimensionSet::FULL)
        .unwrap_err();
    assert!(err.to_string().contains("human, llm"));
}

#[test]
fn test_ablation_rows() {
    let report = StatisticsEngine::new(0.05, 0.6)
        .with_ablation(true)
        .build(&corpus(), DimensionSet::FULL)
        .unwrap();
    let rows = report.ablation.unwrap();
    let names: Vec<String> = rows.iter().map(|r| r.configuration.name()).collect();
    assert_eq!(names, vec!["full", "no_isolation", "no_chain", "no_preparation"]);

    assert_eq!(rows[0].flagged_passages, report.flagged_passages);
    for row in &rows {
        let total: u64 = row.groups.iter().map(|g| g.passages.total).sum();
        assert_eq!(total, 8);
        assert_eq!(row.comparisons.len(), 1);
    }
    assert_eq!(rows[0].comparisons[0].delta_h, Stat::Value(0.0));
}

#[test]
fn test_report_is_deterministic() {
    let engine = StatisticsEngine::new(0.05, 0.6).with_ablation(true);
    let first = serde_json::to_string(&engine.build(&corpus(), DimensionSet::FULL).unwrap()).unwrap();
    let second = serde_json::to_string(&engine.build(&corpus(), DimensionSet::FULL).unwrap()).unwrap();
    assert_eq!(first, second);
}

mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_ablation_counts_sum_to_total(
            spec in proptest::collection::vec((0usize..3, any::<bool>()), 1..12)
        ) {
            const SOURCES: [&str; 3] = ["a", "b", "c"];
            let spec: Vec<(&str, bool)> = spec.iter().map(|(s, o)| (SOURCES[*s], *o)).collect();
            let report = StatisticsEngine::new(0.05, 0.6)
                .with_ablation(true)
                .build(&analyses(&spec), DimensionSet::FULL)
                .unwrap();
            let n = spec.len() as u64;
            prop_assert_eq!(report.passages, n);
            for row in report.ablation.unwrap() {
                let total: u64 = row.groups.iter().map(|g| g.passages.flagged + g.not_flagged).sum();
                prop_assert_eq!(total, n);
            }
            let by_domain: u64 = report.domains.iter().map(|d| d.passages).sum();
            prop_assert_eq!(by_domain, n);
        }
    }
}
