//! Vocabulary preference probing
//!
//! Counts how often passages reach for "literary" register words versus
//! plain equivalents that would serve the same descriptive purpose. Probes
//! are read from a TOML file:
//!
//! ```toml
//! [[probes]]
//! id = "SAW_BITE"
//! domain = "sawmill"
//! literary_words = ["bite", "bit", "teeth"]
//! equivalent_words = ["cut", "slice", "rip"]
//! register = "consumption vocabulary for machinery"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::corpus::Passage;
use crate::lexicon::Lexicon;
use crate::statistics::Stat;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to read probe file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid probe file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("probe file defines no probes")]
    Empty,

    #[error("duplicate probe id '{0}'")]
    DuplicateProbe(String),

    #[error("probe '{probe}' uses unknown domain '{domain}'")]
    UnknownDomain { probe: String, domain: String },

    #[error("probe '{probe}' has an empty {list} list")]
    EmptyWords { probe: String, list: &'static str },

    #[error("probe '{probe}' lists '{word}' as both literary and equivalent")]
    OverlappingWord { probe: String, word: String },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProbeFile {
    #[serde(default)]
    probes: Vec<Probe>,
}

/// One literary-versus-equivalent word contrast
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Probe {
    pub id: String,
    pub domain: String,
    pub literary_words: Vec<String>,
    pub equivalent_words: Vec<String>,
    #[serde(default)]
    pub register: Option<String>,
}

/// Validated probes with lowercased word sets
#[derive(Debug, Clone)]
pub struct ProbeSet {
    probes: Vec<CompiledProbe>,
}

#[derive(Debug, Clone)]
struct CompiledProbe {
    probe: Probe,
    literary: FxHashSet<String>,
    equivalent: FxHashSet<String>,
}

impl ProbeSet {
    pub fn load(path: &Path, lexicon: &Lexicon) -> Result<Self, ProbeError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProbeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, lexicon)
    }

    pub fn from_toml_str(content: &str, lexicon: &Lexicon) -> Result<Self, ProbeError> {
        let file: ProbeFile = toml::from_str(content)?;
        if file.probes.is_empty() {
            return Err(ProbeError::Empty);
        }

        let mut seen = FxHashSet::default();
        let mut probes = Vec::with_capacity(file.probes.len());
        for probe in file.probes {
            if !seen.insert(probe.id.clone()) {
                return Err(ProbeError::DuplicateProbe(probe.id));
            }
            if lexicon.domain(&probe.domain).is_none() {
                return Err(ProbeError::UnknownDomain {
                    probe: probe.id,
                    domain: probe.domain,
                });
            }
            let literary = word_set(&probe.literary_words);
            let equivalent = word_set(&probe.equivalent_words);
            if literary.is_empty() {
                return Err(ProbeError::EmptyWords { probe: probe.id, list: "literary_words" });
            }
            if equivalent.is_empty() {
                return Err(ProbeError::EmptyWords { probe: probe.id, list: "equivalent_words" });
            }
            let mut shared: Vec<&String> = literary.intersection(&equivalent).collect();
            shared.sort();
            if let Some(word) = shared.first() {
                return Err(ProbeError::OverlappingWord {
                    probe: probe.id.clone(),
                    word: (*word).clone(),
                });
            }
            probes.push(CompiledProbe { probe, literary, equivalent });
        }
        Ok(Self { probes })
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub fn probes(&self) -> impl Iterator<Item = &Probe> {
        self.probes.iter().map(|p| &p.probe)
    }

    /// Count every probe against the passages of its domain, per source label.
    pub fn run(&self, passages: &[Passage]) -> ProbeReport {
        let probes = self
            .probes
            .iter()
            .map(|compiled| {
                let mut by_source: BTreeMap<&str, SourceTally> = BTreeMap::new();
                for passage in passages.iter().filter(|p| p.domain_label == compiled.probe.domain) {
                    by_source
                        .entry(passage.source.as_str())
                        .or_default()
                        .add(&passage.text, compiled);
                }
                debug!(
                    "Probe {}: {} sources in domain {}",
                    compiled.probe.id,
                    by_source.len(),
                    compiled.probe.domain
                );
                ProbeResult {
                    id: compiled.probe.id.clone(),
                    domain: compiled.probe.domain.clone(),
                    register: compiled.probe.register.clone(),
                    sources: by_source
                        .into_iter()
                        .map(|(source, tally)| tally.finish(source))
                        .collect(),
                }
            })
            .collect();
        ProbeReport { probes }
    }
}

fn word_set(words: &[String]) -> FxHashSet<String> {
    words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Lowercased runs of ASCII letters.
fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_lowercase())
}

#[derive(Default)]
struct SourceTally {
    passages: u64,
    literary_total: u64,
    equivalent_total: u64,
    literary_passages: u64,
    equivalent_passages: u64,
    both_passages: u64,
    neither_passages: u64,
    literary_found: FxHashMap<String, u64>,
    equivalent_found: FxHashMap<String, u64>,
}

impl SourceTally {
    fn add(&mut self, text: &str, probe: &CompiledProbe) {
        let (mut literary, mut equivalent) = (0u64, 0u64);
        for word in words(text) {
            if probe.literary.contains(&word) {
                literary += 1;
                *self.literary_found.entry(word).or_default() += 1;
            } else if probe.equivalent.contains(&word) {
                equivalent += 1;
                *self.equivalent_found.entry(word).or_default() += 1;
            }
        }

        self.passages += 1;
        self.literary_total += literary;
        self.equivalent_total += equivalent;
        match (literary > 0, equivalent > 0) {
            (true, true) => {
                self.literary_passages += 1;
                self.equivalent_passages += 1;
                self.both_passages += 1;
            }
            (true, false) => self.literary_passages += 1,
            (false, true) => self.equivalent_passages += 1,
            (false, false) => self.neither_passages += 1,
        }
    }

    fn finish(self, source: &str) -> SourceProbe {
        let n = self.passages as f64;
        SourceProbe {
            source: source.to_string(),
            passages: self.passages,
            literary_total: self.literary_total,
            equivalent_total: self.equivalent_total,
            literary_passages: self.literary_passages,
            equivalent_passages: self.equivalent_passages,
            both_passages: self.both_passages,
            neither_passages: self.neither_passages,
            literary_rate: Stat::ratio(self.literary_passages as f64, n),
            equivalent_rate: Stat::ratio(self.equivalent_passages as f64, n),
            preference_ratio: Stat::ratio(self.literary_total as f64, self.equivalent_total as f64),
            literary_words_found: most_common(self.literary_found),
            equivalent_words_found: most_common(self.equivalent_found),
        }
    }
}

/// Descending by count, then alphabetical.
fn most_common(found: FxHashMap<String, u64>) -> Vec<WordCount> {
    let mut counts: Vec<WordCount> = found
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    counts
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

/// Counts for one source label within one probe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceProbe {
    pub source: String,
    pub passages: u64,
    pub literary_total: u64,
    pub equivalent_total: u64,
    pub literary_passages: u64,
    pub equivalent_passages: u64,
    pub both_passages: u64,
    pub neither_passages: u64,
    pub literary_rate: Stat,
    pub equivalent_rate: Stat,
    /// literary_total / equivalent_total
    pub preference_ratio: Stat,
    pub literary_words_found: Vec<WordCount>,
    pub equivalent_words_found: Vec<WordCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    pub id: String,
    pub domain: String,
    pub register: Option<String>,
    pub sources: Vec<SourceProbe>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub probes: Vec<ProbeResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBES: &str = r#"
[[probes]]
id = "SAW_BITE"
domain = "sawmill"
literary_words = ["bite", "bit", "teeth"]
equivalent_words = ["cut", "slice"]
register = "consumption vocabulary for machinery"
"#;

    fn lexicon() -> Lexicon {
        Lexicon::builtin().unwrap()
    }

    fn passage(lex: &Lexicon, id: &str, source: &str, domain: &str, text: &str) -> Passage {
        Passage::new(id, source, domain, text, lex).unwrap()
    }

    #[test]
    fn test_counts_per_source() {
        let lex = lexicon();
        let probes = ProbeSet::from_toml_str(PROBES, &lex).unwrap();
        let passages = vec![
            passage(&lex, "1", "llm", "sawmill", "The blade bit deep. Its teeth bit again."),
            passage(&lex, "2", "llm", "sawmill", "The blade cut the log."),
            passage(&lex, "3", "human", "sawmill", "They cut it. Then a slice."),
            passage(&lex, "4", "human", "general", "The dog bit the mailman."),
        ];
        let report = probes.run(&passages);
        let result = &report.probes[0];
        assert_eq!(result.sources.len(), 2);

        let human = &result.sources[0];
        assert_eq!(human.source, "human");
        assert_eq!(human.passages, 1);
        assert_eq!((human.literary_total, human.equivalent_total), (0, 2));
        assert_eq!(human.preference_ratio, Stat::Value(0.0));
        assert_eq!(human.neither_passages, 0);

        let llm = &result.sources[1];
        assert_eq!(llm.passages, 2);
        assert_eq!((llm.literary_total, llm.equivalent_total), (3, 1));
        assert_eq!((llm.literary_passages, llm.equivalent_passages), (1, 1));
        assert_eq!(llm.both_passages, 0);
        assert_eq!(llm.literary_rate, Stat::Value(0.5));
        assert_eq!(llm.preference_ratio, Stat::Value(3.0));
        assert_eq!(
            llm.literary_words_found,
            vec![
                WordCount { word: "bit".into(), count: 2 },
                WordCount { word: "teeth".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_preference_ratio_out_of_band() {
        let lex = lexicon();
        let probes = ProbeSet::from_toml_str(PROBES, &lex).unwrap();
        let passages = vec![
            passage(&lex, "1", "a", "sawmill", "Its teeth gleamed."),
            passage(&lex, "2", "b", "sawmill", "The crew went home."),
        ];
        let report = probes.run(&passages);
        assert_eq!(report.probes[0].sources[0].preference_ratio, Stat::Infinite);
        assert_eq!(report.probes[0].sources[1].preference_ratio, Stat::Undefined);
        assert_eq!(report.probes[0].sources[1].neither_passages, 1);
    }

    #[test]
    fn test_validation_errors() {
        let lex = lexicon();
        assert!(matches!(ProbeSet::from_toml_str("", &lex), Err(ProbeError::Empty)));

        let unknown = PROBES.replace("\"sawmill\"", "\"moon\"");
        assert!(matches!(
            ProbeSet::from_toml_str(&unknown, &lex),
            Err(ProbeError::UnknownDomain { .. })
        ));

        let dup = format!("{PROBES}\n{PROBES}");
        assert!(matches!(
            ProbeSet::from_toml_str(&dup, &lex),
            Err(ProbeError::DuplicateProbe(id)) if id == "SAW_BITE"
        ));

        let empty = PROBES.replace("[\"cut\", \"slice\"]", "[]");
        assert!(matches!(
            ProbeSet::from_toml_str(&empty, &lex),
            Err(ProbeError::EmptyWords { list: "equivalent_words", .. })
        ));

        let overlap = PROBES.replace("[\"cut\", \"slice\"]", "[\"cut\", \"Teeth\"]");
        assert!(matches!(
            ProbeSet::from_toml_str(&overlap, &lex),
            Err(ProbeError::OverlappingWord { word, .. }) if word == "teeth"
        ));

        let extra = format!("{PROBES}context = \"Describe a sawmill shift.\"\n");
        assert!(matches!(ProbeSet::from_toml_str(&extra, &lex), Err(ProbeError::Parse(_))));
    }
}
