//! Per-file ground-truth labeling and the parallel batch driver

use std::fmt;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use scout_compress::Codec;
use scout_features::{FeatureBuilder, FeatureVector};
use scout_label::{AlgorithmRacer, GroundTruthRacer, Label, RaceResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::Result;

/// One labeled file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    /// File the sample came from
    pub path: PathBuf,
    /// Features from the sampled windows
    pub features: FeatureVector,
    /// Ground-truth label from the full-file race
    pub label: Label,
    /// Compressed sizes behind the label
    pub race: RaceResult,
    /// Codecs that failed during the race (0-2)
    pub codec_failures: usize,
}

/// A file left out of the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    /// File that could not be labeled
    pub path: PathBuf,
    /// Error message
    pub reason: String,
}

/// Number of samples per label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDistribution {
    counts: [usize; 3],
}

impl LabelDistribution {
    /// Count the labels of `samples`
    pub fn from_samples<'a>(samples: impl IntoIterator<Item = &'a LabeledSample>) -> Self {
        let mut dist = Self::default();
        for sample in samples {
            dist.record(sample.label);
        }
        dist
    }

    /// Add one sample with `label`
    pub fn record(&mut self, label: Label) {
        self.counts[usize::from(label.code())] += 1;
    }

    /// Samples carrying `label`
    #[must_use]
    pub fn count(&self, label: Label) -> usize {
        self.counts[usize::from(label.code())]
    }

    /// All samples
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(label, count)` in label-code order
    pub fn iter(&self) -> impl Iterator<Item = (Label, usize)> + '_ {
        Label::ALL.into_iter().map(|label| (label, self.count(label)))
    }
}

impl fmt::Display for LabelDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(label, count)| format!("{label}={count}"))
            .collect();
        f.write_str(&parts.join(" "))
    }
}

/// Everything a batch produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// Labeled files, in input order
    pub samples: Vec<LabeledSample>,
    /// Files that could not be read, in input order
    pub skipped: Vec<SkippedFile>,
    /// Codec failures over all samples
    pub codec_failures: usize,
}

impl BatchOutcome {
    fn push(mut self, item: FileOutcome) -> Self {
        match item {
            FileOutcome::Labeled(sample) => {
                self.codec_failures += sample.codec_failures;
                self.samples.push(sample);
            }
            FileOutcome::Skipped(skipped) => self.skipped.push(skipped),
        }
        self
    }

    /// Append `other` after `self`
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.samples.extend(other.samples);
        self.skipped.extend(other.skipped);
        self.codec_failures += other.codec_failures;
        self
    }

    /// Label counts over the samples
    #[must_use]
    pub fn distribution(&self) -> LabelDistribution {
        LabelDistribution::from_samples(&self.samples)
    }

    /// Files seen, labeled or skipped
    #[must_use]
    pub fn files_seen(&self) -> usize {
        self.samples.len() + self.skipped.len()
    }
}

enum FileOutcome {
    Labeled(LabeledSample),
    Skipped(SkippedFile),
}

/// Extracts features and runs the ground-truth race for each file
#[derive(Debug, Clone)]
pub struct Labeler {
    builder: FeatureBuilder,
}

impl Labeler {
    /// Labeler using `builder` for features
    #[must_use]
    pub fn new(builder: FeatureBuilder) -> Self {
        Self { builder }
    }

    /// Labeler with the standard sampler and hint table
    #[must_use]
    pub fn standard() -> Self {
        Self::new(FeatureBuilder::standard())
    }

    /// Feature builder in use
    #[must_use]
    pub fn builder(&self) -> &FeatureBuilder {
        &self.builder
    }

    /// Label one file with the ground-truth codecs
    pub fn label_file(&self, path: &Path) -> Result<LabeledSample> {
        let mut racer = GroundTruthRacer::ground_truth()?;
        self.label_with(&mut racer, path)
    }

    /// Label one file using `racer`.
    ///
    /// Features come from the sampled windows only; the race reads the
    /// whole file.
    pub fn label_with<A: Codec, B: Codec>(
        &self,
        racer: &mut AlgorithmRacer<A, B>,
        path: &Path,
    ) -> Result<LabeledSample> {
        let features = self.builder.build_from_path(path)?;
        let report = racer.race_path(path)?;
        let label = report.label();

        info!(
            file = %display_name(path),
            entropy = (features.avg_entropy() * 100.0).round() / 100.0,
            size = report.result.original_size,
            winner = %label,
            "Labeled file"
        );

        Ok(LabeledSample {
            path: path.to_path_buf(),
            features,
            label,
            race: report.result,
            codec_failures: report.failures(),
        })
    }

    /// Label `paths` on `workers` threads (0 = available parallelism)
    /// with the ground-truth codecs.
    pub fn label_all(&self, paths: &[PathBuf], workers: usize) -> Result<BatchOutcome> {
        self.label_all_with(paths, workers, GroundTruthRacer::ground_truth)
    }

    /// Label `paths` on `workers` threads, each owning a racer from
    /// `make_racer`.
    ///
    /// Unreadable files are skipped and reported in the outcome. Samples
    /// keep the order of `paths`.
    pub fn label_all_with<A, B, F>(
        &self,
        paths: &[PathBuf],
        workers: usize,
        make_racer: F,
    ) -> Result<BatchOutcome>
    where
        A: Codec,
        B: Codec,
        F: Fn() -> scout_label::Result<AlgorithmRacer<A, B>> + Send + Sync,
    {
        // Surface codec setup errors once instead of per file
        drop(make_racer()?);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("scout-label-{i}"))
            .build()?;
        debug!(files = paths.len(), workers = pool.current_num_threads(), "Labeling batch");

        let outcome = pool.install(|| {
            paths
                .par_iter()
                .map_init(make_racer, |racer, path| match racer {
                    Ok(racer) => self.label_or_skip(racer, path),
                    Err(e) => FileOutcome::Skipped(SkippedFile {
                        path: path.clone(),
                        reason: e.to_string(),
                    }),
                })
                .fold(BatchOutcome::default, BatchOutcome::push)
                .reduce(BatchOutcome::default, BatchOutcome::merge)
        });

        info!(
            labeled = outcome.samples.len(),
            skipped = outcome.skipped.len(),
            codec_failures = outcome.codec_failures,
            "Batch complete"
        );
        Ok(outcome)
    }

    fn label_or_skip<A: Codec, B: Codec>(
        &self,
        racer: &mut AlgorithmRacer<A, B>,
        path: &Path,
    ) -> FileOutcome {
        match self.label_with(racer, path) {
            Ok(sample) => FileOutcome::Labeled(sample),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping file");
                FileOutcome::Skipped(SkippedFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
