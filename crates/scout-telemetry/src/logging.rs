//! Structured Logging with Tracing

use crate::{Result, TelemetryError};
use parking_lot::Mutex;
use scout_config::{LogConfig, LogFormat, LogOutput};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Initialize global logging with the given configuration
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed, if file
/// output is requested without a path, or if the log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = build_filter(config);

    match config.output {
        LogOutput::Stdout => apply_fmt(config.format, std::io::stdout, filter),
        LogOutput::Stderr => apply_fmt(config.format, std::io::stderr, filter),
        LogOutput::File => {
            let file = open_log_file(config.file_path.as_deref())?;
            apply_fmt(config.format, LogWriter::file_only(file), filter)
        }
        LogOutput::Both => {
            let file = open_log_file(config.file_path.as_deref())?;
            apply_fmt(config.format, LogWriter::with_stderr(file), filter)
        }
    }
}

/// Filter from `RUST_LOG`, falling back to the configured level
pub fn build_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_str()))
}

fn open_log_file(path: Option<&Path>) -> Result<File> {
    let path = path.ok_or_else(|| {
        TelemetryError::Logging("file_path is required for file output".to_string())
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?)
}

/// Writer shared by every event, optionally mirrored to stderr
#[derive(Clone)]
struct LogWriter {
    stderr: Option<Arc<Mutex<std::io::Stderr>>>,
    file: Arc<Mutex<File>>,
}

impl LogWriter {
    fn file_only(file: File) -> Self {
        Self {
            stderr: None,
            file: Arc::new(Mutex::new(file)),
        }
    }

    fn with_stderr(file: File) -> Self {
        Self {
            stderr: Some(Arc::new(Mutex::new(std::io::stderr()))),
            file: Arc::new(Mutex::new(file)),
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Some(ref stderr) = self.stderr {
            stderr.lock().write_all(buf)?;
        }
        self.file.lock().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref stderr) = self.stderr {
            stderr.lock().flush()?;
        }
        self.file.lock().flush()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogWriter {
    type Writer = Self;
    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn apply_fmt<W>(format: LogFormat, writer: W, filter: EnvFilter) -> Result<()>
where
    W: for<'a> tracing_subscriber::fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let init_result = match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_env_filter(filter)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .pretty()
            .with_writer(writer)
            .with_target(true)
            .with_env_filter(filter)
            .try_init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .compact()
            .with_writer(writer)
            .with_target(false)
            .with_env_filter(filter)
            .try_init(),
    };
    init_result.map_err(|e| TelemetryError::Init(format!("Failed to init subscriber: {e}")))
}

/// RAII guard that keeps a stage span entered and logs its duration on drop
pub struct StageTimer {
    _span: tracing::span::EnteredSpan,
    stage: &'static str,
    start: Instant,
}

impl StageTimer {
    /// Enter an info-level span for `stage`
    #[must_use]
    pub fn start(stage: &'static str) -> Self {
        Self {
            _span: tracing::info_span!("stage", stage).entered(),
            stage,
            start: Instant::now(),
        }
    }

    /// Time since the stage started
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = self.start.elapsed().as_millis() as u64;
        tracing::debug!(stage = self.stage, duration_ms, "stage completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_config::LogLevel;
    use tempfile::TempDir;

    #[test]
    fn test_log_writer_file_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("writer.log");
        let file = open_log_file(Some(&path)).unwrap();
        let mut writer = LogWriter::file_only(file);
        writer.write_all(b"first line\n").unwrap();
        let mut clone = writer.clone();
        clone.write_all(b"second line\n").unwrap();
        clone.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first line\nsecond line\n");
    }

    #[test]
    fn test_open_log_file_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("logs").join("run.log");
        open_log_file(Some(&path)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_log_file_requires_path() {
        assert!(matches!(open_log_file(None), Err(TelemetryError::Logging(_))));
    }

    #[test]
    fn test_stage_timer_elapsed() {
        let timer = StageTimer::start("unit");
        std::thread::sleep(Duration::from_millis(2));
        assert!(timer.elapsed() >= Duration::from_millis(2));
    }

    // The only test in this crate that installs the global subscriber.
    #[test]
    fn test_init_logging_file_then_reinit_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("packscout.log");
        let config = LogConfig {
            level: LogLevel::Debug,
            format: LogFormat::Json,
            output: LogOutput::File,
            file_path: Some(path.clone()),
        };
        init_logging(&config).unwrap();
        assert!(path.exists());

        let again = init_logging(&LogConfig::default());
        assert!(matches!(again, Err(TelemetryError::Init(_))));
    }

    #[test]
    fn test_init_logging_missing_file_path() {
        let config = LogConfig {
            output: LogOutput::Both,
            file_path: None,
            ..LogConfig::default()
        };
        assert!(matches!(init_logging(&config), Err(TelemetryError::Logging(_))));
    }
}
