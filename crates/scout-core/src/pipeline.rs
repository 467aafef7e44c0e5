//! End-to-end labeling run driven by [`ScoutConfig`]

use std::path::PathBuf;

use scout_config::{HintConfig, HintKind, ScoutConfig};
use scout_features::{FeatureBuilder, HintTable, TypeHint};
use scout_telemetry::StageTimer;
use serde::Serialize;
use tracing::{info, warn};

use crate::corpus::{self, Synthesis, Synthesizer};
use crate::dataset::write_dataset;
use crate::labeler::{LabelDistribution, Labeler, SkippedFile};
use crate::Result;

/// What a run did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Distinct files handed to the labeler
    pub files_scanned: usize,
    /// Synthetic compressed samples written before scanning
    pub synthetic_written: usize,
    /// Sources left without a synthetic sample
    pub synthesis_skipped: Vec<SkippedFile>,
    /// Samples in the dataset
    pub labeled: usize,
    /// Files left out
    pub skipped: Vec<SkippedFile>,
    /// Codec failures over the run
    pub codec_failures: usize,
    /// Label counts
    pub distribution: LabelDistribution,
    /// Dataset file
    pub output: PathBuf,
}

/// Standard hint table with the configured entries applied on top
pub fn hint_table(config: &HintConfig) -> Result<HintTable> {
    let mut table = HintTable::standard();
    for (kind, key, value) in config.entries() {
        let hint: TypeHint = value.parse()?;
        match kind {
            HintKind::Extension => table.insert_extension(key, hint),
            HintKind::Basename => table.insert_basename(key, hint),
            HintKind::Suffix => table.insert_suffix(key, hint),
        }
    }
    Ok(table)
}

/// Synthesize, scan, label and export according to `config`
pub fn run(config: &ScoutConfig) -> Result<RunSummary> {
    let _run = StageTimer::start("run");
    let corpus_config = &config.corpus;

    let mut synthesis = Synthesis::default();
    let mut scan_dirs = corpus_config.dirs.clone();
    if corpus_config.synthesize_compressed {
        let _stage = StageTimer::start("synthesize");
        match corpus_config.resolved_synthetic_dir() {
            Some(out_dir) => {
                let mut synthesizer = Synthesizer::new(&out_dir, corpus_config.synthetic_level)?;
                for dir in &corpus_config.dirs {
                    synthesizer.add_dir(dir)?;
                }
                synthesis = synthesizer.finish();
                scan_dirs.push(out_dir);
            }
            None => warn!("No corpus directory to place synthetic samples in"),
        }
    }

    let paths = {
        let _stage = StageTimer::start("scan");
        let mut paths = Vec::new();
        for dir in &scan_dirs {
            paths.extend(corpus::scan(dir, corpus_config.recursive)?);
        }
        paths.sort();
        paths.dedup();
        paths
    };
    info!(files = paths.len(), dirs = scan_dirs.len(), "Corpus scanned");

    let labeler = Labeler::new(FeatureBuilder::new(hint_table(&config.hints)?));
    let outcome = {
        let _stage = StageTimer::start("label");
        labeler.label_all(&paths, config.labeling.workers)?
    };

    {
        let _stage = StageTimer::start("export");
        write_dataset(&config.output.path, config.output.format, &outcome.samples)?;
    }

    let distribution = outcome.distribution();
    info!(
        samples = outcome.samples.len(),
        skipped = outcome.skipped.len(),
        labels = %distribution,
        "Run complete"
    );

    Ok(RunSummary {
        files_scanned: paths.len(),
        synthetic_written: synthesis.written.len(),
        synthesis_skipped: synthesis.skipped,
        labeled: outcome.samples.len(),
        skipped: outcome.skipped,
        codec_failures: outcome.codec_failures,
        distribution,
        output: config.output.path.clone(),
    })
}
