use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::effect::{cohens_h, effect_label, odds_ratio, power_two_proportions};
use super::fisher::{fisher_exact, FisherResult, Table2x2};
use super::proportion::Proportion;
use super::stat::Stat;
use crate::config::StatisticsConfig;
use crate::detectors::{DimensionSet, PassageAnalysis};

#[derive(Debug, Error)]
pub enum StatisticsError {
    #[error("baseline source '{baseline}' does not occur in the corpus (sources: {known})")]
    UnknownBaseline { baseline: String, known: String },

    #[error("no passages to summarise")]
    NoPassages,

    #[error("invalid counts {flagged}/{total}: flagged exceeds total")]
    InvalidCounts { flagged: u64, total: u64 },

    #[error("contingency table counts overflow")]
    CountOverflow,
}

/// Flagged and total passage counts for one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupCounts {
    pub flagged: u64,
    pub total: u64,
}

impl GroupCounts {
    pub fn new(flagged: u64, total: u64) -> Result<Self, StatisticsError> {
        if flagged > total {
            return Err(StatisticsError::InvalidCounts { flagged, total });
        }
        Ok(Self { flagged, total })
    }

    pub fn not_flagged(&self) -> u64 {
        self.total - self.flagged
    }
}

/// Pairwise comparison of two groups' flag rates.
///
/// One-sided p-values test "group A is flagged more often than group B".
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub group_a: String,
    pub group_b: String,
    pub a: Proportion,
    pub b: Proportion,
    pub table: Table2x2,
    pub fisher: FisherResult,
    pub cohens_h: Stat,
    pub effect: String,
    pub odds_ratio: Stat,
    pub power: Stat,
    /// One-sided p below alpha
    pub significant: bool,
}

/// Compare two groups at level `alpha`.
///
/// Fails only when the combined counts do not fit in a `u64`.
pub fn compare(
    label_a: &str,
    a: GroupCounts,
    label_b: &str,
    b: GroupCounts,
    alpha: f64,
) -> Result<Comparison, StatisticsError> {
    let table = Table2x2::from_counts(a.flagged, a.total, b.flagged, b.total);
    let fisher = fisher_exact(&table)?;
    let pa = Proportion::new(a.flagged, a.total, alpha);
    let pb = Proportion::new(b.flagged, b.total, alpha);

    let (h, effect) = match (pa.rate.value(), pb.rate.value()) {
        (Some(ra), Some(rb)) => {
            let h = cohens_h(ra, rb);
            (Stat::from_f64(h), effect_label(h).to_string())
        }
        _ => (Stat::Undefined, "n/a".to_string()),
    };
    let power = match h {
        Stat::Value(h) => power_two_proportions(h, a.total, b.total, alpha),
        _ => Stat::Undefined,
    };

    Ok(Comparison {
        group_a: label_a.to_string(),
        group_b: label_b.to_string(),
        a: pa,
        b: pb,
        table,
        fisher,
        cohens_h: h,
        effect,
        odds_ratio: odds_ratio(&table),
        power,
        significant: fisher.greater < alpha,
    })
}

/// Ordered (A, B) label pairs to compare.
///
/// With a baseline, every other label is compared against it. Without one,
/// every unordered pair in lexicographic order.
pub fn comparison_pairs(labels: &[String], baseline: Option<&str>) -> Vec<(String, String)> {
    let mut sorted: Vec<&String> = labels.iter().collect();
    sorted.sort();
    sorted.dedup();

    match baseline {
        Some(base) => {
            if !sorted.iter().any(|l| l.as_str() == base) {
                return Vec::new();
            }
            sorted
                .iter()
                .filter(|l| l.as_str() != base)
                .map(|l| ((*l).clone(), base.to_string()))
                .collect()
        }
        None => sorted
            .iter()
            .enumerate()
            .flat_map(|(i, a)| sorted[i + 1..].iter().map(move |b| ((*a).clone(), (*b).clone())))
            .collect(),
    }
}

/// One row of the source × {flagged, not flagged} contingency table.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub label: String,
    pub passages: Proportion,
    pub not_flagged: u64,
    /// Scored word positions
    pub candidates: u64,
    pub orphaned_words: u64,
    pub integrated_words: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DomainBreakdown {
    pub domain: String,
    pub passages: u64,
    pub groups: Vec<GroupSummary>,
    pub comparisons: Vec<Comparison>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AblationComparison {
    #[serde(flatten)]
    pub comparison: Comparison,
    /// Cohen's h under this configuration minus h under the full model
    pub delta_h: Stat,
}

#[derive(Debug, Clone, Serialize)]
pub struct AblationRow {
    pub configuration: DimensionSet,
    pub flagged_passages: u64,
    pub groups: Vec<GroupSummary>,
    pub comparisons: Vec<AblationComparison>,
}

/// Corpus-level statistics for one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct CorpusReport {
    pub dimensions: DimensionSet,
    pub alpha: f64,
    pub orphan_threshold: f64,
    pub baseline: Option<String>,
    pub passages: u64,
    pub flagged_passages: u64,
    pub groups: Vec<GroupSummary>,
    pub comparisons: Vec<Comparison>,
    pub domains: Vec<DomainBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ablation: Option<Vec<AblationRow>>,
}

/// Per-passage outcome under one dimension set.
struct Outcome<'a> {
    source: &'a str,
    domain: &'a str,
    flagged: bool,
    orphaned: u64,
    integrated: u64,
}

#[derive(Default, Clone, Copy)]
struct Tally {
    counts: GroupCounts,
    orphaned: u64,
    integrated: u64,
}

impl Tally {
    fn add(&mut self, outcome: &Outcome<'_>) {
        self.counts.total += 1;
        self.counts.flagged += u64::from(outcome.flagged);
        self.orphaned += outcome.orphaned;
        self.integrated += outcome.integrated;
    }
}

/// Builds a [`CorpusReport`] in one pass over finished passage analyses
#[derive(Debug, Clone)]
pub struct StatisticsEngine {
    alpha: f64,
    threshold: f64,
    baseline: Option<String>,
    ablation: bool,
}

impl StatisticsEngine {
    pub fn new(alpha: f64, threshold: f64) -> Self {
        Self {
            alpha,
            threshold,
            baseline: None,
            ablation: false,
        }
    }

    pub fn from_config(config: &StatisticsConfig, threshold: f64) -> Self {
        Self::new(config.alpha, threshold)
            .with_baseline(config.baseline.clone())
            .with_ablation(config.ablation)
    }

    pub fn with_baseline(mut self, baseline: Option<String>) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn with_ablation(mut self, ablation: bool) -> Self {
        self.ablation = ablation;
        self
    }

    pub fn build(
        &self,
        analyses: &[PassageAnalysis],
        active: DimensionSet,
    ) -> Result<CorpusReport, StatisticsError> {
        if analyses.is_empty() {
            return Err(StatisticsError::NoPassages);
        }
        if let Some(base) = &self.baseline {
            if !analyses.iter().any(|a| &a.source == base) {
                let mut known: Vec<&str> = analyses.iter().map(|a| a.source.as_str()).collect();
                known.sort_unstable();
                known.dedup();
                return Err(StatisticsError::UnknownBaseline {
                    baseline: base.clone(),
                    known: known.join(", "),
                });
            }
        }

        let outcomes = self.outcomes(analyses, active);
        let by_source = tally(outcomes.iter());
        let flagged_passages = outcomes.iter().filter(|o| o.flagged).count() as u64;
        info!(
            "Statistics over {} passages ({} flagged) with dimensions {}",
            outcomes.len(),
            flagged_passages,
            active
        );

        let mut by_domain: BTreeMap<&str, Vec<&Outcome<'_>>> = BTreeMap::new();
        for outcome in &outcomes {
            by_domain.entry(outcome.domain).or_default().push(outcome);
        }
        let domains = by_domain
            .into_iter()
            .map(|(domain, members)| {
                let groups = tally(members.iter().copied());
                Ok(DomainBreakdown {
                    domain: domain.to_string(),
                    passages: members.len() as u64,
                    groups: self.summaries(&groups),
                    comparisons: self.comparisons(&groups)?,
                })
            })
            .collect::<Result<Vec<_>, StatisticsError>>()?;

        let ablation = if self.ablation {
            Some(self.ablation_rows(analyses)?)
        } else {
            None
        };

        Ok(CorpusReport {
            dimensions: active,
            alpha: self.alpha,
            orphan_threshold: self.threshold,
            baseline: self.baseline.clone(),
            passages: outcomes.len() as u64,
            flagged_passages,
            groups: self.summaries(&by_source),
            comparisons: self.comparisons(&by_source)?,
            domains,
            ablation,
        })
    }

    fn outcomes<'a>(&self, analyses: &'a [PassageAnalysis], active: DimensionSet) -> Vec<Outcome<'a>> {
        analyses
            .iter()
            .map(|analysis| {
                let words = analysis.word_records(active, self.threshold);
                let orphaned = words.iter().filter(|w| w.verdict.is_orphaned()).count() as u64;
                Outcome {
                    source: &analysis.source,
                    domain: &analysis.domain,
                    flagged: orphaned > 0,
                    orphaned,
                    integrated: words.len() as u64 - orphaned,
                }
            })
            .collect()
    }

    fn summaries(&self, groups: &BTreeMap<String, Tally>) -> Vec<GroupSummary> {
        groups
            .iter()
            .map(|(label, t)| GroupSummary {
                label: label.clone(),
                passages: Proportion::new(t.counts.flagged, t.counts.total, self.alpha),
                not_flagged: t.counts.not_flagged(),
                candidates: t.orphaned + t.integrated,
                orphaned_words: t.orphaned,
                integrated_words: t.integrated,
            })
            .collect()
    }

    fn comparisons(
        &self,
        groups: &BTreeMap<String, Tally>,
    ) -> Result<Vec<Comparison>, StatisticsError> {
        let labels: Vec<String> = groups.keys().cloned().collect();
        comparison_pairs(&labels, self.baseline.as_deref())
            .into_iter()
            .filter_map(|(a, b)| {
                let (ta, tb) = (groups.get(&a)?, groups.get(&b)?);
                Some(compare(&a, ta.counts, &b, tb.counts, self.alpha))
            })
            .collect()
    }

    fn ablation_rows(
        &self,
        analyses: &[PassageAnalysis],
    ) -> Result<Vec<AblationRow>, StatisticsError> {
        let mut full_h: BTreeMap<(String, String), Stat> = BTreeMap::new();
        DimensionSet::ablation_configs()
            .into_iter()
            .map(|config| {
                let outcomes = self.outcomes(analyses, config);
                let groups = tally(outcomes.iter());
                let comparisons = self
                    .comparisons(&groups)?
                    .into_iter()
                    .map(|comparison| {
                        let key = (comparison.group_a.clone(), comparison.group_b.clone());
                        let full = *full_h.entry(key).or_insert(comparison.cohens_h);
                        let delta_h = match (comparison.cohens_h.value(), full.value()) {
                            (Some(h), Some(f)) => Stat::from_f64(h - f),
                            _ => Stat::Undefined,
                        };
                        AblationComparison { comparison, delta_h }
                    })
                    .collect();
                let flagged_passages = outcomes.iter().filter(|o| o.flagged).count() as u64;
                debug!("Ablation {}: {} flagged", config, flagged_passages);
                Ok(AblationRow {
                    configuration: config,
                    flagged_passages,
                    groups: self.summaries(&groups),
                    comparisons,
                })
            })
            .collect()
    }
}

/// Group outcomes by source label.
fn tally<'a, 'o: 'a>(outcomes: impl Iterator<Item = &'a Outcome<'o>>) -> BTreeMap<String, Tally> {
    let mut groups: BTreeMap<String, Tally> = BTreeMap::new();
    for outcome in outcomes {
        groups.entry(outcome.source.to_string()).or_default().add(outcome);
    }
    groups
}

#[cfg(test)]
mod tests;
