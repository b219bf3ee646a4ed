//! CLI command definitions and handlers

mod analyze;
mod init;
mod lexicon;
mod output;
mod probe;
mod score;
mod stats;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::detectors::Dimension;

/// Parse and validate workers count (0 = auto, up to 64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// Parse `FLAGGED/TOTAL`
fn parse_counts(s: &str) -> Result<(u64, u64), String> {
    let (flagged, total) = s
        .split_once('/')
        .ok_or_else(|| format!("'{}' is not of the form FLAGGED/TOTAL", s))?;
    let flagged: u64 = flagged
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a valid count", flagged))?;
    let total: u64 = total
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a valid count", total))?;
    if flagged > total {
        return Err(format!("flagged count {} exceeds total {}", flagged, total));
    }
    Ok((flagged, total))
}

/// Orphanhood - orphaned figurative construction detector
///
/// Scores register-field words in prose passages for isolation, chaining and
/// preparation, and compares flag rates across labeled corpora.
#[derive(Parser, Debug)]
#[command(name = "orphanhood")]
#[command(
    version,
    about = "Detect orphaned figurative constructions in prose and compare flag rates across corpora",
    long_about = "Orphanhood finds words whose figurative sense is activated by a thematic \
register but which lack the structural support of deliberate craft: they spike in \
figurative density, are not reinforced by nearby words of the same field, and arrive \
without signposting.\n\n\
Passages are read from JSON or JSON Lines records with id, source, domain and text.",
    after_help = "\
Examples:
  orphanhood analyze corpus/                        Analyze every .json/.jsonl file
  orphanhood analyze corpus.jsonl --format json     JSON output for scripting
  orphanhood analyze corpus/ --baseline human --ablation
  orphanhood score passage.txt --domain sawmill     Score one passage
  orphanhood stats compare --a 9/20 --b 1/25        Compare two flag rates
  orphanhood lexicon check my-lexicon.toml          Validate a lexicon"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (0 = auto, max 64)
    #[arg(long, global = true, value_parser = parse_workers, env = "ORPHANHOOD_WORKERS")]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a corpus of labeled passages
    #[command(after_help = "\
Examples:
  orphanhood analyze corpus/                         Text report
  orphanhood analyze corpus/ -f markdown -o report.md
  orphanhood analyze corpus/ --dimensions chain,preparation
  orphanhood analyze corpus/ --orphaned-only -f json")]
    Analyze {
        /// Corpus file or directory (.json / .jsonl)
        corpus: PathBuf,

        /// Output format: text, json, markdown (or md)
        #[arg(long, short = 'f', value_parser = ["text", "json", "markdown", "md"])]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Configuration file (default: orphanhood.toml next to the corpus)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Lexicon file (default: built-in lexicon)
        #[arg(long)]
        lexicon: Option<PathBuf>,

        /// Compare every other source against this one
        #[arg(long)]
        baseline: Option<String>,

        /// Add the dimension ablation table
        #[arg(long)]
        ablation: bool,

        /// Active dimensions, comma separated
        #[arg(long, value_delimiter = ',')]
        dimensions: Option<Vec<Dimension>>,

        /// Significance level
        #[arg(long)]
        alpha: Option<f64>,

        /// List only orphaned words
        #[arg(long)]
        orphaned_only: bool,
    },

    /// Score a single passage (FILE or - for stdin)
    Score {
        /// Passage text file; stdin when omitted or "-"
        file: Option<PathBuf>,

        /// Domain label of the passage
        #[arg(long)]
        domain: String,

        /// Passage identifier
        #[arg(long, default_value = "passage")]
        id: String,

        /// Source label
        #[arg(long, default_value = "unknown")]
        source: String,

        /// Output format: text, json, markdown (or md)
        #[arg(long, short = 'f', value_parser = ["text", "json", "markdown", "md"])]
        format: Option<String>,

        /// Configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Lexicon file (default: built-in lexicon)
        #[arg(long)]
        lexicon: Option<PathBuf>,
    },

    /// Flag-rate statistics without a corpus
    Stats {
        #[command(subcommand)]
        command: StatsCommand,
    },

    /// Count literary versus equivalent vocabulary per source
    Probe {
        /// Corpus file or directory (.json / .jsonl)
        corpus: PathBuf,

        /// Probe definitions (TOML)
        #[arg(long)]
        probes: PathBuf,

        /// Output format: text, json, markdown (or md)
        #[arg(long, short = 'f', value_parser = ["text", "json", "markdown", "md"])]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Lexicon file (default: built-in lexicon)
        #[arg(long)]
        lexicon: Option<PathBuf>,
    },

    /// Inspect and validate lexicons
    Lexicon {
        #[command(subcommand)]
        command: LexiconCommand,
    },

    /// Write a default orphanhood.toml
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum StatsCommand {
    /// Fisher's exact test, intervals and effect size for two groups
    #[command(after_help = "\
Example:
  orphanhood stats compare --a 9/20 --b 1/25 --label-a llm --label-b human")]
    Compare {
        /// Group A counts as FLAGGED/TOTAL
        #[arg(long = "a", value_parser = parse_counts)]
        a: (u64, u64),

        /// Group B counts as FLAGGED/TOTAL
        #[arg(long = "b", value_parser = parse_counts)]
        b: (u64, u64),

        #[arg(long, default_value = "A")]
        label_a: String,

        #[arg(long, default_value = "B")]
        label_b: String,

        /// Significance level
        #[arg(long, default_value = "0.05")]
        alpha: f64,

        /// Output format: text, json, markdown (or md)
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
        format: String,
    },

    /// A priori power of a one-sided two-proportion test
    Power {
        /// Cohen's h
        #[arg(long)]
        h: f64,

        #[arg(long)]
        n1: u64,

        #[arg(long)]
        n2: u64,

        /// Significance level
        #[arg(long, default_value = "0.05")]
        alpha: f64,
    },
}

#[derive(Subcommand, Debug)]
pub enum LexiconCommand {
    /// Validate a lexicon file (the built-in one when omitted)
    Check {
        file: Option<PathBuf>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the built-in lexicon
    Dump,
}

/// Run the CLI command
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            corpus,
            format,
            output,
            config,
            lexicon,
            baseline,
            ablation,
            dimensions,
            alpha,
            orphaned_only,
        } => analyze::run(analyze::AnalyzeOptions {
            corpus,
            format,
            output,
            config,
            lexicon,
            baseline,
            ablation,
            dimensions,
            alpha,
            orphaned_only,
            workers: cli.workers,
        }),

        Commands::Score {
            file,
            domain,
            id,
            source,
            format,
            config,
            lexicon,
        } => score::run(score::ScoreOptions {
            file,
            domain,
            id,
            source,
            format,
            config,
            lexicon,
        }),

        Commands::Stats { command } => match command {
            StatsCommand::Compare {
                a,
                b,
                label_a,
                label_b,
                alpha,
                format,
            } => stats::compare(a, b, &label_a, &label_b, alpha, &format),
            StatsCommand::Power { h, n1, n2, alpha } => stats::power(h, n1, n2, alpha),
        },

        Commands::Probe {
            corpus,
            probes,
            format,
            output,
            lexicon,
        } => probe::run(
            &corpus,
            &probes,
            format.as_deref(),
            output.as_deref(),
            lexicon.as_deref(),
        ),

        Commands::Lexicon { command } => match command {
            LexiconCommand::Check { file, json } => lexicon::check(file.as_deref(), json),
            LexiconCommand::Dump => lexicon::dump(),
        },

        Commands::Init { dir, force } => init::run(&dir, force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_workers() {
        assert_eq!(parse_workers("0"), Ok(0));
        assert_eq!(parse_workers("8"), Ok(8));
        assert!(parse_workers("65").is_err());
        assert!(parse_workers("x").is_err());
    }

    #[test]
    fn test_parse_counts() {
        assert_eq!(parse_counts("9/20"), Ok((9, 20)));
        assert_eq!(parse_counts(" 1 / 25 "), Ok((1, 25)));
        assert!(parse_counts("21/20").is_err());
        assert!(parse_counts("9").is_err());
        assert!(parse_counts("a/b").is_err());
    }

    #[test]
    fn test_analyze_dimensions_flag() {
        let cli = Cli::try_parse_from([
            "orphanhood",
            "analyze",
            "corpus",
            "--dimensions",
            "chain,preparation",
            "--workers",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.workers, Some(2));
        match cli.command {
            Commands::Analyze { dimensions, .. } => {
                assert_eq!(dimensions, Some(vec![Dimension::Chain, Dimension::Preparation]));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_stats_compare_flags() {
        let cli = Cli::try_parse_from(["orphanhood", "stats", "compare", "--a", "9/20", "--b", "1/25"])
            .unwrap();
        match cli.command {
            Commands::Stats {
                command: StatsCommand::Compare { a, b, .. },
            } => assert_eq!((a, b), ((9, 20), (1, 25))),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
