//! Probe command - literary versus equivalent vocabulary counts

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::output::{emit, resolve_format};
use crate::corpus::load_corpus;
use crate::lexicon::Lexicon;
use crate::probe::ProbeSet;
use crate::reporters;

/// Run the probe command
pub(super) fn run(
    corpus: &Path,
    probes: &Path,
    format: Option<&str>,
    output: Option<&Path>,
    lexicon: Option<&Path>,
) -> Result<()> {
    let format = resolve_format(format, None)?;
    let lexicon = Lexicon::load_or_builtin(lexicon).context("Failed to load lexicon")?;
    let probe_set = ProbeSet::load(probes, &lexicon)
        .with_context(|| format!("Failed to load probes {}", probes.display()))?;
    let passages = load_corpus(corpus, &lexicon)
        .with_context(|| format!("Failed to load corpus {}", corpus.display()))?;
    info!("Running {} probes over {} passages", probe_set.len(), passages.len());

    let report = probe_set.run(&passages);
    if output.is_some() {
        console::set_colors_enabled(false);
    }
    let rendered = reporters::probe_report(&report, format)?;
    emit(&rendered, output, format)
}
