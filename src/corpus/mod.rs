//! Corpus loading
//!
//! A corpus is a set of labeled passage records read from a JSON array file,
//! a JSON Lines file, or a directory of such files. Every record is
//! validated before any scoring starts; a malformed record stops the run
//! rather than being skipped, since a silent skip would change the
//! denominators of every corpus statistic.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::{debug, info};

use crate::lexicon::{DomainId, Lexicon};
use crate::models::PassageRecord;
use crate::text::{segment, Segmentation};

/// File extensions read from a corpus directory
pub const CORPUS_EXTENSIONS: &[&str] = &["json", "jsonl"];

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Passage '{id}' has empty text")]
    EmptyText { id: String },
    #[error("Passage '{id}' has unknown domain '{domain}' (known: {known})")]
    UnknownDomain {
        id: String,
        domain: String,
        known: String,
    },
    #[error("Passage '{id}' has an empty source label")]
    EmptySource { id: String },
    #[error("Record {index} in {path} has an empty id")]
    EmptyId { path: PathBuf, index: usize },
    #[error("Passage id '{id}' appears more than once ({path})")]
    DuplicateId { id: String, path: PathBuf },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path} (line {line}): {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to walk corpus directory: {0}")]
    Walk(#[from] ignore::Error),
    #[error("Corpus {0} contains no passages")]
    Empty(PathBuf),
}

/// A validated, segmented passage. Immutable once built.
#[derive(Debug, Clone)]
pub struct Passage {
    pub id: String,
    pub source: String,
    pub domain: DomainId,
    pub domain_label: String,
    pub text: String,
    pub segmentation: Segmentation,
}

impl Passage {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        domain: &str,
        text: impl Into<String>,
        lexicon: &Lexicon,
    ) -> Result<Self, CorpusError> {
        let id = id.into();
        let source = source.into();
        let text = text.into();

        if text.trim().is_empty() {
            return Err(CorpusError::EmptyText { id });
        }
        if source.trim().is_empty() {
            return Err(CorpusError::EmptySource { id });
        }
        let Some(domain_id) = lexicon.domain(domain) else {
            return Err(CorpusError::UnknownDomain {
                id,
                domain: domain.to_string(),
                known: lexicon.domains().join(", "),
            });
        };

        let segmentation = segment(&text);
        Ok(Self {
            id,
            source,
            domain: domain_id,
            domain_label: domain.to_string(),
            text,
            segmentation,
        })
    }

    pub fn from_record(record: PassageRecord, lexicon: &Lexicon) -> Result<Self, CorpusError> {
        Self::new(record.id, record.source, &record.domain, record.text, lexicon)
    }
}

/// Parse records from file content: a JSON array when the first
/// non-whitespace character is `[`, JSON Lines otherwise (blank lines skipped).
pub fn parse_records(content: &str, path: &Path) -> Result<Vec<PassageRecord>, CorpusError> {
    let parse_err = |line: usize, source: serde_json::Error| CorpusError::Parse {
        path: path.to_path_buf(),
        line,
        source,
    };

    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content).map_err(|e| {
            let line = e.line();
            parse_err(line, e)
        });
    }

    let mut records = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: PassageRecord = serde_json::from_str(line).map_err(|e| parse_err(i + 1, e))?;
        records.push(record);
    }
    Ok(records)
}

/// Corpus files under `path`: the file itself, or every `.json`/`.jsonl`
/// file below a directory in sorted order. Hidden files are skipped.
pub fn corpus_files(path: &Path) -> Result<Vec<PathBuf>, CorpusError> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let walker = WalkBuilder::new(path)
        .hidden(true)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .require_git(false)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        let p = entry.path();
        if !p.is_file() {
            continue;
        }
        if let Some(ext) = p.extension().and_then(|e| e.to_str()) {
            if CORPUS_EXTENSIONS.contains(&ext) {
                files.push(p.to_path_buf());
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Read every record under `path` in file order.
pub fn read_records(path: &Path) -> Result<Vec<(PathBuf, PassageRecord)>, CorpusError> {
    let mut out = Vec::new();
    for file in corpus_files(path)? {
        let content = std::fs::read_to_string(&file).map_err(|source| CorpusError::Io {
            path: file.clone(),
            source,
        })?;
        let records = parse_records(&content, &file)?;
        debug!("Read {} records from {}", records.len(), file.display());
        out.extend(records.into_iter().map(|r| (file.clone(), r)));
    }
    Ok(out)
}

/// Load, validate and segment a corpus.
pub fn load_corpus(path: &Path, lexicon: &Lexicon) -> Result<Vec<Passage>, CorpusError> {
    let records = read_records(path)?;
    if records.is_empty() {
        return Err(CorpusError::Empty(path.to_path_buf()));
    }

    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut passages = Vec::with_capacity(records.len());
    for (index, (file, record)) in records.into_iter().enumerate() {
        if record.id.trim().is_empty() {
            return Err(CorpusError::EmptyId { path: file, index });
        }
        if !seen.insert(record.id.clone()) {
            return Err(CorpusError::DuplicateId {
                id: record.id,
                path: file,
            });
        }
        passages.push(Passage::from_record(record, lexicon)?);
    }

    info!("Loaded {} passages from {}", passages.len(), path.display());
    Ok(passages)
}
