//! Corpus statistics
//!
//! Flag rates per source label, pairwise exact tests and effect sizes,
//! per-domain breakdowns and the dimension ablation table. Everything here
//! is recomputed from the complete set of passage analyses on every run.
//!
//! | Module | Contents |
//! |---|---|
//! | `fisher` | 2x2 tables and Fisher's exact test |
//! | `proportion` | Clopper–Pearson intervals |
//! | `effect` | Cohen's h, power, odds ratio |
//! | `report` | contingency tables, comparisons, ablation |

pub mod effect;
pub mod fisher;
pub mod proportion;
mod report;
mod stat;

pub use effect::{cohens_h, effect_label, odds_ratio, power_two_proportions};
pub use fisher::{fisher_exact, FisherResult, Table2x2};
pub use proportion::{clopper_pearson, Interval, Proportion};
pub use report::{
    compare, comparison_pairs, AblationComparison, AblationRow, Comparison, CorpusReport,
    DomainBreakdown, GroupCounts, GroupSummary, StatisticsEngine, StatisticsError,
};
pub use stat::Stat;
