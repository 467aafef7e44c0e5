//! Training dataset export
//!
//! Rows are `[avg_entropy, log10_size, type_hint] -> label` with integer
//! hint and label codes. The trainer reads nothing else.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use scout_features::FEATURE_NAMES;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::labeler::LabeledSample;
use crate::{Error, Result};

/// Dataset file format
pub use scout_config::OutputFormat as DatasetFormat;

/// One training example in the frozen layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    /// `[avg_entropy, log10_size, type_hint]`
    pub features: [f32; 3],
    /// Label code
    pub label: u8,
}

impl From<&LabeledSample> for DatasetRow {
    fn from(sample: &LabeledSample) -> Self {
        Self {
            features: sample.features.to_array(),
            label: sample.label.code(),
        }
    }
}

/// Streams dataset rows to a writer
pub struct DatasetWriter<W: Write> {
    inner: W,
    format: DatasetFormat,
    rows: usize,
}

impl<W: Write> DatasetWriter<W> {
    /// Start a dataset; CSV output gets its header immediately.
    pub fn new(mut inner: W, format: DatasetFormat) -> std::io::Result<Self> {
        if format == DatasetFormat::Csv {
            writeln!(inner, "{},label", FEATURE_NAMES.join(","))?;
        }
        Ok(Self {
            inner,
            format,
            rows: 0,
        })
    }

    /// Append one sample
    pub fn write_sample(&mut self, sample: &LabeledSample) -> std::io::Result<()> {
        let row = DatasetRow::from(sample);
        match self.format {
            DatasetFormat::Csv => {
                let [entropy, size, _] = row.features;
                writeln!(
                    self.inner,
                    "{entropy},{size},{},{}",
                    sample.features.type_hint().code(),
                    row.label
                )?;
            }
            DatasetFormat::JsonLines => {
                serde_json::to_writer(&mut self.inner, &row)?;
                self.inner.write_all(b"\n")?;
            }
        }
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and hand back the writer
    pub fn finish(mut self) -> std::io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Write `samples` to `path` in `format`, replacing any existing file.
/// Returns the number of rows written.
pub fn write_dataset(path: &Path, format: DatasetFormat, samples: &[LabeledSample]) -> Result<usize> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer =
        DatasetWriter::new(BufWriter::new(file), format).map_err(|e| Error::io(path, e))?;
    for sample in samples {
        writer.write_sample(sample).map_err(|e| Error::io(path, e))?;
    }
    let rows = writer.rows();
    writer.finish().map_err(|e| Error::io(path, e))?;

    info!(path = %path.display(), rows, format = ?format, "Wrote dataset");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_features::{FeatureVector, TypeHint};
    use scout_label::{Label, RaceResult};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sample(entropy: f64, size: u64, hint: TypeHint, label: Label) -> LabeledSample {
        LabeledSample {
            path: PathBuf::from("sample"),
            features: FeatureVector::new(entropy, size, hint),
            label,
            race: RaceResult::ZERO,
            codec_failures: 0,
        }
    }

    #[test]
    fn test_row_layout() {
        let row = DatasetRow::from(&sample(4.5, 99, TypeHint::Media, Label::None));
        assert_eq!(row.features, [4.5, 2.0, 2.0]);
        assert_eq!(row.label, 2);
    }

    #[test]
    fn test_csv_output() {
        let mut writer = DatasetWriter::new(Vec::new(), DatasetFormat::Csv).unwrap();
        writer
            .write_sample(&sample(4.5, 99, TypeHint::Text, Label::AlgoA))
            .unwrap();
        writer
            .write_sample(&sample(0.0, 0, TypeHint::Generic, Label::None))
            .unwrap();
        assert_eq!(writer.rows(), 2);

        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(
            out,
            "avg_entropy,log10_size,type_hint,label\n4.5,2,1,0\n0,0,0,2\n"
        );
    }

    #[test]
    fn test_jsonl_output() {
        let mut writer = DatasetWriter::new(Vec::new(), DatasetFormat::JsonLines).unwrap();
        writer
            .write_sample(&sample(4.5, 99, TypeHint::Generic, Label::AlgoB))
            .unwrap();
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(out, "{\"features\":[4.5,2.0,0.0],\"label\":1}\n");

        let row: DatasetRow = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(row.label, Label::AlgoB.code());
    }

    #[test]
    fn test_empty_csv_has_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        assert_eq!(write_dataset(&path, DatasetFormat::Csv, &[]).unwrap(), 0);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "avg_entropy,log10_size,type_hint,label\n"
        );
    }

    #[test]
    fn test_write_dataset_replaces_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jsonl");
        std::fs::write(&path, "stale\nstale\nstale\n").unwrap();

        let samples = vec![sample(7.9, 1_000_000, TypeHint::Media, Label::None)];
        assert_eq!(write_dataset(&path, DatasetFormat::JsonLines, &samples).unwrap(), 1);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_write_dataset_bad_path() {
        let err = write_dataset(
            Path::new("/nonexistent/packscout/out.csv"),
            DatasetFormat::Csv,
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_surfaces_io_errors() {
        let mut writer = DatasetWriter::new(Broken, DatasetFormat::JsonLines).unwrap();
        let err = writer
            .write_sample(&sample(1.0, 10, TypeHint::Text, Label::AlgoA))
            .unwrap_err();
        assert!(err.to_string().contains("disk full"));
        assert_eq!(writer.rows(), 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_write_dataset_error_names_output_path() {
        let path = Path::new("/dev/full");
        if !path.exists() {
            return;
        }
        let samples = vec![sample(3.0, 4096, TypeHint::Text, Label::AlgoA)];
        match write_dataset(path, DatasetFormat::Csv, &samples).unwrap_err() {
            Error::Io { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;
    use scout_features::{FeatureVector, TypeHint};
    use scout_label::{Label, RaceResult};
    use std::path::PathBuf;

    proptest! {
        #[test]
        fn csv_row_parses_back(
            entropy in 0.0f64..=8.0,
            size in any::<u64>(),
            hint_code in 0u8..3,
            label_code in 0u8..3,
        ) {
            let hint = TypeHint::from_code(hint_code).unwrap();
            let label = Label::from_code(label_code).unwrap();
            let sample = LabeledSample {
                path: PathBuf::from("p"),
                features: FeatureVector::new(entropy, size, hint),
                label,
                race: RaceResult::ZERO,
                codec_failures: 0,
            };

            let mut writer = DatasetWriter::new(Vec::new(), DatasetFormat::Csv).unwrap();
            writer.write_sample(&sample).unwrap();
            let out = String::from_utf8(writer.finish().unwrap()).unwrap();
            let row = out.lines().nth(1).unwrap();
            let fields: Vec<&str> = row.split(',').collect();

            prop_assert_eq!(fields.len(), 4);
            let expected = sample.features.to_array();
            prop_assert_eq!(fields[0].parse::<f32>().unwrap(), expected[0]);
            prop_assert_eq!(fields[1].parse::<f32>().unwrap(), expected[1]);
            prop_assert_eq!(fields[2].parse::<u8>().unwrap(), hint_code);
            prop_assert_eq!(fields[3].parse::<u8>().unwrap(), label_code);
        }
    }
}
