//! Corpus discovery and synthetic compressed samples

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use scout_compress::{Codec, ZstdCodec};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::labeler::SkippedFile;
use crate::{Error, Result};

/// Extension appended to synthetic samples
pub const SYNTHETIC_EXTENSION: &str = "zst";

/// List the regular files under `dir`, sorted by path.
///
/// Without `recursive` only the top level is listed. Symlinks are not
/// followed, so a link to a file is not reported. Failing to read `dir`
/// itself is an error; entries below it that cannot be read are logged
/// and left out.
pub fn scan(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(dir).min_depth(1).follow_links(false);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(walk_error(dir, e)),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Skipping unreadable corpus entry");
                continue;
            }
        };
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();

    debug!(dir = %dir.display(), recursive, files = files.len(), "Scanned corpus");
    Ok(files)
}

fn walk_error(root: &Path, err: walkdir::Error) -> Error {
    let path = err.path().unwrap_or(root).to_path_buf();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
    Error::io(path, source)
}

/// Synthetic samples written by a [`Synthesizer`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Synthesis {
    /// Written samples in source order
    pub written: Vec<PathBuf>,
    /// Sources with no sample: unreadable, or their name was already taken
    pub skipped: Vec<SkippedFile>,
}

/// Writes Zstd-compressed copies `<name>.zst` of corpus files into one
/// output directory.
///
/// Gives the corpus samples that no codec can shrink further. Existing
/// copies from earlier runs are overwritten; within one synthesizer the
/// first source to claim a name keeps it.
#[derive(Debug)]
pub struct Synthesizer {
    codec: ZstdCodec,
    out_dir: PathBuf,
    level: i32,
    claimed: HashMap<PathBuf, PathBuf>,
    outcome: Synthesis,
}

impl Synthesizer {
    /// Create `out_dir` and a Zstd context at `level`
    pub fn new(out_dir: &Path, level: i32) -> Result<Self> {
        let codec = ZstdCodec::new(level)?;
        fs::create_dir_all(out_dir).map_err(|e| Error::io(out_dir, e))?;
        Ok(Self {
            codec,
            out_dir: out_dir.to_path_buf(),
            level,
            claimed: HashMap::new(),
            outcome: Synthesis::default(),
        })
    }

    /// Compress every top-level regular file of `src_dir`
    pub fn add_dir(&mut self, src_dir: &Path) -> Result<()> {
        let files = scan(src_dir, false)?;
        self.add_files(&files)
    }

    /// Compress each of `files`.
    ///
    /// A source that cannot be read is skipped; failing to write the output
    /// is an error.
    pub fn add_files(&mut self, files: &[PathBuf]) -> Result<()> {
        for path in files {
            let Some(name) = path.file_name() else {
                continue;
            };
            let mut target_name = name.to_os_string();
            target_name.push(".");
            target_name.push(SYNTHETIC_EXTENSION);
            let target = self.out_dir.join(target_name);

            if let Some(first) = self.claimed.get(&target) {
                warn!(
                    source = %path.display(),
                    first = %first.display(),
                    target = %target.display(),
                    "Synthetic sample name already taken"
                );
                let reason = format!("{} already written from {}", target.display(), first.display());
                self.skip(path, reason);
                continue;
            }

            let data = match fs::read(path) {
                Ok(data) => data,
                Err(e) => {
                    warn!(source = %path.display(), error = %e, "Skipping unreadable file");
                    self.skip(path, Error::io(path, e).to_string());
                    continue;
                }
            };
            let compressed = self.codec.compress(&data)?;
            fs::write(&target, &compressed).map_err(|e| Error::io(&target, e))?;

            debug!(
                source = %path.display(),
                original = data.len(),
                compressed = compressed.len(),
                "Wrote synthetic sample"
            );
            self.claimed.insert(target.clone(), path.clone());
            self.outcome.written.push(target);
        }
        Ok(())
    }

    fn skip(&mut self, path: &Path, reason: String) {
        self.outcome.skipped.push(SkippedFile {
            path: path.to_path_buf(),
            reason,
        });
    }

    /// Written and skipped sources so far
    #[must_use]
    pub fn finish(self) -> Synthesis {
        info!(
            dir = %self.out_dir.display(),
            samples = self.outcome.written.len(),
            skipped = self.outcome.skipped.len(),
            level = self.level,
            "Generated already-compressed samples"
        );
        self.outcome
    }
}

/// Synthesize samples for the top-level files of `src_dir` into `out_dir`
pub fn synthesize_compressed(src_dir: &Path, out_dir: &Path, level: i32) -> Result<Synthesis> {
    let mut synthesizer = Synthesizer::new(out_dir, level)?;
    synthesizer.add_dir(src_dir)?;
    Ok(synthesizer.finish())
}
