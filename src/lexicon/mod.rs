//! Lexicon Store
//!
//! Static reference data for the detectors: stopwords, the animacy word lists
//! used by the figurative-use patterns, per-domain literal sets, register
//! fields and signpost patterns. A lexicon is built once, validated in full,
//! and then shared read-only (behind an `Arc`) by every worker.
//!
//! The file format is TOML; see `default.toml` for the built-in lexicon.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::text::normalize;

/// Built-in lexicon, embedded at compile time.
pub const DEFAULT_LEXICON: &str = include_str!("default.toml");

/// Configuration errors detected while loading a lexicon.
#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("Failed to read lexicon {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse lexicon: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Lexicon declares no domains")]
    NoDomains,
    #[error("Domain '{0}' is declared more than once")]
    DuplicateDomain(String),
    #[error("{set} references unknown domain '{domain}'")]
    UnknownDomain { set: String, domain: String },
    #[error("Register field '{0}' is declared more than once")]
    DuplicateField(String),
    #[error("Register field '{0}' has no words")]
    EmptyField(String),
    #[error("Duplicate entry '{word}' in {set}")]
    DuplicateEntry { set: String, word: String },
    #[error("Entry '{word}' in {set} is not a normalized word form")]
    InvalidEntry { set: String, word: String },
    #[error("'{word}' is both a stopword and a member of register field '{field}'")]
    StopwordConflict { word: String, field: String },
    #[error("Invalid signpost pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Index of a domain label in lexicon order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainId(u16);

/// Index of a register field in lexicon order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(u16);

impl FieldId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// On-disk shape of a lexicon file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LexiconFile {
    #[serde(default)]
    version: Option<String>,
    domains: Vec<String>,
    #[serde(default)]
    stopwords: Vec<String>,
    #[serde(default)]
    inanimate_nouns: Vec<String>,
    #[serde(default)]
    animate_verbs: Vec<String>,
    #[serde(default)]
    animate_qualities: Vec<String>,
    #[serde(default)]
    signposts: Vec<String>,
    #[serde(default)]
    domain_literals: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    register_fields: Vec<RegisterFieldFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegisterFieldFile {
    name: String,
    words: Vec<String>,
    #[serde(default)]
    domains: Vec<String>,
}

/// A named set of words sharing a figurative theme.
#[derive(Debug, Clone)]
pub struct RegisterField {
    pub name: String,
    words: FxHashSet<String>,
    /// Domains the field applies to; empty means all
    domains: Vec<DomainId>,
}

impl RegisterField {
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn applies_to(&self, domain: DomainId) -> bool {
        self.domains.is_empty() || self.domains.contains(&domain)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Immutable, validated lexicon.
#[derive(Debug, Clone)]
pub struct Lexicon {
    version: Option<String>,
    domains: Vec<String>,
    domain_index: FxHashMap<String, DomainId>,
    stopwords: FxHashSet<String>,
    inanimate_nouns: FxHashSet<String>,
    animate_verbs: FxHashSet<String>,
    animate_qualities: FxHashSet<String>,
    signposts: Vec<Regex>,
    /// Indexed by `DomainId`
    domain_literals: Vec<FxHashSet<String>>,
    fields: Vec<RegisterField>,
    /// word -> fields containing it, in lexicon order
    word_fields: FxHashMap<String, Vec<FieldId>>,
}

impl Lexicon {
    /// The embedded default lexicon.
    pub fn builtin() -> Result<Self, LexiconError> {
        Self::from_toml_str(DEFAULT_LEXICON)
    }

    /// Load and validate a lexicon file.
    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let content = std::fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let lexicon = Self::from_toml_str(&content)?;
        debug!("Loaded lexicon from {}", path.display());
        Ok(lexicon)
    }

    /// `path` when given, the built-in lexicon otherwise.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, LexiconError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::builtin(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, LexiconError> {
        let file: LexiconFile = toml::from_str(content)?;
        Self::from_file(file)
    }

    fn from_file(file: LexiconFile) -> Result<Self, LexiconError> {
        if file.domains.is_empty() {
            return Err(LexiconError::NoDomains);
        }

        let mut domain_index = FxHashMap::default();
        for (i, name) in file.domains.iter().enumerate() {
            check_entry("domains", name)?;
            if domain_index.insert(name.clone(), DomainId(i as u16)).is_some() {
                return Err(LexiconError::DuplicateDomain(name.clone()));
            }
        }

        let stopwords = word_set("stopwords", file.stopwords)?;
        let inanimate_nouns = word_set("inanimate_nouns", file.inanimate_nouns)?;
        let animate_verbs = word_set("animate_verbs", file.animate_verbs)?;
        let animate_qualities = word_set("animate_qualities", file.animate_qualities)?;

        let signposts = file
            .signposts
            .into_iter()
            .map(|pattern| {
                Regex::new(&pattern).map_err(|source| LexiconError::InvalidPattern { pattern, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut domain_literals = vec![FxHashSet::default(); file.domains.len()];
        for (domain, words) in file.domain_literals {
            let set_name = format!("domain_literals.{domain}");
            let id = *domain_index
                .get(&domain)
                .ok_or_else(|| LexiconError::UnknownDomain {
                    set: "domain_literals".to_string(),
                    domain: domain.clone(),
                })?;
            domain_literals[id.0 as usize] = word_set(&set_name, words)?;
        }

        let mut fields: Vec<RegisterField> = Vec::with_capacity(file.register_fields.len());
        let mut word_fields: FxHashMap<String, Vec<FieldId>> = FxHashMap::default();
        for raw in file.register_fields {
            check_entry("register_fields", &raw.name)?;
            if fields.iter().any(|f| f.name == raw.name) {
                return Err(LexiconError::DuplicateField(raw.name));
            }
            if raw.words.is_empty() {
                return Err(LexiconError::EmptyField(raw.name));
            }
            let set_name = format!("register field '{}'", raw.name);
            let mut domains = Vec::with_capacity(raw.domains.len());
            for domain in &raw.domains {
                let id = *domain_index
                    .get(domain)
                    .ok_or_else(|| LexiconError::UnknownDomain {
                        set: set_name.clone(),
                        domain: domain.clone(),
                    })?;
                if domains.contains(&id) {
                    return Err(LexiconError::DuplicateEntry {
                        set: format!("{set_name} domains"),
                        word: domain.clone(),
                    });
                }
                domains.push(id);
            }

            let words = word_set(&set_name, raw.words)?;
            if let Some(word) = first_sorted(words.intersection(&stopwords)) {
                return Err(LexiconError::StopwordConflict {
                    word,
                    field: raw.name,
                });
            }

            let id = FieldId(fields.len() as u16);
            for word in &words {
                word_fields.entry(word.clone()).or_default().push(id);
            }
            fields.push(RegisterField {
                name: raw.name,
                words,
                domains,
            });
        }

        debug!(
            "Lexicon: {} domains, {} register fields, {} signposts",
            file.domains.len(),
            fields.len(),
            signposts.len()
        );

        Ok(Self {
            version: file.version,
            domains: file.domains,
            domain_index,
            stopwords,
            inanimate_nouns,
            animate_verbs,
            animate_qualities,
            signposts,
            domain_literals,
            fields,
            word_fields,
        })
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Domain labels in declaration order.
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn domain(&self, label: &str) -> Option<DomainId> {
        self.domain_index.get(label).copied()
    }

    pub fn domain_name(&self, id: DomainId) -> &str {
        &self.domains[id.0 as usize]
    }

    pub fn fields(&self) -> &[RegisterField] {
        &self.fields
    }

    pub fn field(&self, id: FieldId) -> &RegisterField {
        &self.fields[id.index()]
    }

    /// First signpost pattern matching `text` (expected lowercased).
    pub fn signpost_match(&self, text: &str) -> Option<&Regex> {
        self.signposts.iter().find(|re| re.is_match(text))
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn is_inanimate(&self, word: &str) -> bool {
        self.inanimate_nouns.contains(word)
    }

    pub fn is_animate_verb(&self, word: &str) -> bool {
        self.animate_verbs.contains(word)
    }

    pub fn is_animate_quality(&self, word: &str) -> bool {
        self.animate_qualities.contains(word)
    }

    pub fn is_domain_literal(&self, word: &str, domain: DomainId) -> bool {
        self.domain_literals
            .get(domain.0 as usize)
            .is_some_and(|set| set.contains(word))
    }

    /// Register fields containing `word` that apply to `domain`, in lexicon order.
    pub fn fields_of<'a>(&'a self, word: &str, domain: DomainId) -> impl Iterator<Item = FieldId> + 'a {
        self.word_fields
            .get(word)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter(move |id| self.fields[id.index()].applies_to(domain))
    }

    /// Member of at least one register field active for `domain`.
    pub fn is_register_word(&self, word: &str, domain: DomainId) -> bool {
        self.fields_of(word, domain).next().is_some()
    }

    /// Register-bearing and not literal in `domain`.
    pub fn is_figurative_bearing(&self, word: &str, domain: DomainId) -> bool {
        !self.is_domain_literal(word, domain) && self.is_register_word(word, domain)
    }

    /// Counts per set, for `lexicon check`.
    pub fn summary(&self) -> LexiconSummary {
        LexiconSummary {
            version: self.version.clone(),
            domains: self
                .domains
                .iter()
                .zip(&self.domain_literals)
                .map(|(name, set)| (name.clone(), set.len()))
                .collect(),
            register_fields: self
                .fields
                .iter()
                .map(|f| FieldSummary {
                    name: f.name.clone(),
                    words: f.len(),
                    domains: f.domains.iter().map(|d| self.domain_name(*d).to_string()).collect(),
                })
                .collect(),
            stopwords: self.stopwords.len(),
            inanimate_nouns: self.inanimate_nouns.len(),
            animate_verbs: self.animate_verbs.len(),
            animate_qualities: self.animate_qualities.len(),
            signposts: self.signposts.len(),
        }
    }
}

/// Shape of a loaded lexicon.
#[derive(Debug, Clone, Serialize)]
pub struct LexiconSummary {
    pub version: Option<String>,
    /// (domain, literal word count) in declaration order
    pub domains: Vec<(String, usize)>,
    pub register_fields: Vec<FieldSummary>,
    pub stopwords: usize,
    pub inanimate_nouns: usize,
    pub animate_verbs: usize,
    pub animate_qualities: usize,
    pub signposts: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSummary {
    pub name: String,
    pub words: usize,
    pub domains: Vec<String>,
}

fn check_entry(set: &str, word: &str) -> Result<(), LexiconError> {
    if word.is_empty() || word.chars().any(char::is_whitespace) || normalize(word) != word {
        return Err(LexiconError::InvalidEntry {
            set: set.to_string(),
            word: word.to_string(),
        });
    }
    Ok(())
}

fn word_set(set: &str, words: Vec<String>) -> Result<FxHashSet<String>, LexiconError> {
    let mut out = FxHashSet::default();
    out.reserve(words.len());
    for word in words {
        check_entry(set, &word)?;
        if out.contains(&word) {
            return Err(LexiconError::DuplicateEntry {
                set: set.to_string(),
                word,
            });
        }
        out.insert(word);
    }
    Ok(out)
}

/// Smallest element, so errors name the same word on every run.
fn first_sorted<'a>(words: impl Iterator<Item = &'a String>) -> Option<String> {
    words.min().cloned()
}

#[cfg(test)]
mod tests;
