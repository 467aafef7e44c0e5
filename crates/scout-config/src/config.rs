//! `ScoutConfig` and the loader that assembles it
//!
//! Sources are applied in the order they are added to a [`ConfigLoader`],
//! each later one replacing or overriding the earlier ones. Environment
//! overrides use `{PREFIX}_SECTION_FIELD`, e.g. `PACKSCOUT_LABELING_WORKERS`.

use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default environment variable prefix
pub const ENV_PREFIX: &str = "PACKSCOUT";

/// Where a layer of configuration comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Load from a file
    File(PathBuf),
    /// `{prefix}_SECTION_FIELD` overrides
    Env,
    /// Use default values
    Default,
    /// TOML text already in memory
    Memory(String),
}

/// Minimum level written to the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level
    Trace,
    /// Debug level
    Debug,
    /// Info level
    #[default]
    Info,
    /// Warn level
    Warn,
    /// Error level
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError::InvalidValue {
                field: "log.level".to_string(),
                message: format!("Invalid log level: {s}"),
            }),
        }
    }
}

/// How log lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Pretty format
    #[default]
    Pretty,
    /// Compact format
    Compact,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            _ => Err(ConfigError::InvalidValue {
                field: "log.format".to_string(),
                message: format!("Invalid log format: {s}"),
            }),
        }
    }
}

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Output to stdout
    Stdout,
    /// Output to stderr
    #[default]
    Stderr,
    /// Output to file
    File,
    /// Output to both stderr and file
    Both,
}

impl FromStr for LogOutput {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            "file" => Ok(Self::File),
            "both" => Ok(Self::Both),
            _ => Err(ConfigError::InvalidValue {
                field: "log.output".to_string(),
                message: format!("Invalid log output: {s}"),
            }),
        }
    }
}

/// Dataset file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    /// Comma-separated values with a header row
    #[default]
    #[serde(rename = "csv")]
    Csv,
    /// One JSON object per line
    #[serde(rename = "jsonl")]
    JsonLines,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "jsonl" | "json-lines" | "jsonlines" => Ok(Self::JsonLines),
            _ => Err(ConfigError::InvalidValue {
                field: "output.format".to_string(),
                message: format!("Invalid output format: {s}"),
            }),
        }
    }
}

/// Corpus location configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Directories of files to label
    pub dirs: Vec<PathBuf>,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Write Zstd-compressed copies of the corpus and label them too
    pub synthesize_compressed: bool,
    /// Where compressed copies go (default: `<first dir>/synthetic_compressed`)
    pub synthetic_dir: Option<PathBuf>,
    /// Zstd level for compressed copies
    pub synthetic_level: i32,
}

impl CorpusConfig {
    /// Directory for synthetic samples, resolved against the first corpus dir
    pub fn resolved_synthetic_dir(&self) -> Option<PathBuf> {
        self.synthetic_dir.clone().or_else(|| {
            self.dirs
                .first()
                .map(|dir| dir.join("synthetic_compressed"))
        })
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            dirs: vec![PathBuf::from("./dataset")],
            recursive: false,
            synthesize_compressed: false,
            synthetic_dir: None,
            synthetic_level: 3,
        }
    }
}

/// Labeling pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LabelingConfig {
    /// Worker threads; 0 uses the available parallelism
    pub workers: usize,
}

impl LabelingConfig {
    /// Worker count with 0 resolved to the machine's parallelism
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        } else {
            self.workers
        }
    }
}

/// Dataset output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output file
    pub path: PathBuf,
    /// Output format
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("dataset.csv"),
            format: OutputFormat::Csv,
        }
    }
}

/// Additional filename hint entries, values are `text`, `media` or `generic`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HintConfig {
    /// Extension to hint
    pub extensions: BTreeMap<String, String>,
    /// Exact basename to hint
    pub basenames: BTreeMap<String, String>,
    /// Filename suffix to hint
    pub suffixes: BTreeMap<String, String>,
}

/// Which hint table an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HintKind {
    /// `[hints.extensions]`
    Extension,
    /// `[hints.basenames]`
    Basename,
    /// `[hints.suffixes]`
    Suffix,
}

impl HintKind {
    /// Table name under `[hints]`
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Extension => "extensions",
            Self::Basename => "basenames",
            Self::Suffix => "suffixes",
        }
    }
}

impl fmt::Display for HintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

impl HintConfig {
    /// Every entry as `(kind, key, value)`
    pub fn entries(&self) -> impl Iterator<Item = (HintKind, &str, &str)> {
        let tables = [
            (HintKind::Extension, &self.extensions),
            (HintKind::Basename, &self.basenames),
            (HintKind::Suffix, &self.suffixes),
        ];
        tables.into_iter().flat_map(|(table, map)| {
            map.iter()
                .map(move |(key, value)| (table, key.as_str(), value.as_str()))
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level
    pub level: LogLevel,
    /// Log format
    pub format: LogFormat,
    /// Log output
    pub output: LogOutput,
    /// Log file, required for `file` and `both`
    pub file_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            output: LogOutput::Stderr,
            file_path: None,
        }
    }
}

/// Top-level packscout configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScoutConfig {
    /// Corpus configuration
    pub corpus: CorpusConfig,
    /// Labeling configuration
    pub labeling: LabelingConfig,
    /// Output configuration
    pub output: OutputConfig,
    /// Extra filename hints
    pub hints: HintConfig,
    /// Logging configuration
    pub log: LogConfig,
}

/// Configuration loader
pub struct ConfigLoader {
    sources: Vec<ConfigSource>,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Loader holding only the defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            sources: vec![ConfigSource::Default],
            env_prefix: None,
        }
    }

    /// Add a file source
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.sources
            .push(ConfigSource::File(path.as_ref().to_path_buf()));
        self
    }

    /// Add an in-memory TOML source
    pub fn with_str(mut self, toml: impl Into<String>) -> Self {
        self.sources.push(ConfigSource::Memory(toml.into()));
        self
    }

    /// Apply `{prefix}_*` environment overrides at this point
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self.sources.push(ConfigSource::Env);
        self
    }

    /// Apply every source in order and expand `~` in paths
    pub fn load(&self) -> Result<ScoutConfig> {
        let mut config = ScoutConfig::default();

        for source in &self.sources {
            match source {
                ConfigSource::Default => {
                    // Starting point
                }
                ConfigSource::File(path) => {
                    let content =
                        std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                            path: path.clone(),
                            source,
                        })?;
                    config = Self::parse(&content)?;
                }
                ConfigSource::Env => {
                    if let Some(prefix) = &self.env_prefix {
                        config = Self::apply_env_overrides(config, prefix)?;
                    }
                }
                ConfigSource::Memory(content) => {
                    config = Self::parse(content)?;
                }
            }
        }

        Ok(Self::expand_paths(config))
    }

    /// Parse TOML text on top of the defaults
    pub fn load_from_str(toml: &str) -> Result<ScoutConfig> {
        Ok(Self::expand_paths(Self::parse(toml)?))
    }

    /// Built-in defaults
    #[must_use]
    pub fn default_config() -> ScoutConfig {
        ScoutConfig::default()
    }

    fn parse(toml: &str) -> Result<ScoutConfig> {
        Ok(toml::from_str(toml)?)
    }

    /// Apply `{prefix}_SECTION_FIELD` overrides
    fn apply_env_overrides(mut config: ScoutConfig, prefix: &str) -> Result<ScoutConfig> {
        if let Some((_, val)) = env_value(prefix, "CORPUS_DIRS") {
            config.corpus.dirs = std::env::split_paths(&val).collect();
        }
        if let Some(recursive) = env_parse(prefix, "CORPUS_RECURSIVE")? {
            config.corpus.recursive = recursive;
        }
        if let Some(synthesize) = env_parse(prefix, "CORPUS_SYNTHESIZE_COMPRESSED")? {
            config.corpus.synthesize_compressed = synthesize;
        }
        if let Some(dir) = env_parse(prefix, "CORPUS_SYNTHETIC_DIR")? {
            config.corpus.synthetic_dir = Some(dir);
        }
        if let Some(level) = env_parse(prefix, "CORPUS_SYNTHETIC_LEVEL")? {
            config.corpus.synthetic_level = level;
        }

        if let Some(workers) = env_parse(prefix, "LABELING_WORKERS")? {
            config.labeling.workers = workers;
        }

        if let Some(path) = env_parse(prefix, "OUTPUT_PATH")? {
            config.output.path = path;
        }
        if let Some(format) = env_parse(prefix, "OUTPUT_FORMAT")? {
            config.output.format = format;
        }

        if let Some(level) = env_parse(prefix, "LOG_LEVEL")? {
            config.log.level = level;
        }
        if let Some(format) = env_parse(prefix, "LOG_FORMAT")? {
            config.log.format = format;
        }
        if let Some(output) = env_parse(prefix, "LOG_OUTPUT")? {
            config.log.output = output;
        }
        if let Some(path) = env_parse(prefix, "LOG_FILE_PATH")? {
            config.log.file_path = Some(path);
        }

        Ok(config)
    }

    fn expand_paths(mut config: ScoutConfig) -> ScoutConfig {
        config.corpus.dirs = config
            .corpus
            .dirs
            .iter()
            .map(|dir| Self::expand_path(dir))
            .collect();
        if let Some(ref path) = config.corpus.synthetic_dir {
            config.corpus.synthetic_dir = Some(Self::expand_path(path));
        }
        config.output.path = Self::expand_path(&config.output.path);
        if let Some(ref path) = config.log.file_path {
            config.log.file_path = Some(Self::expand_path(path));
        }
        config
    }

    /// Replace a leading `~/` with the home directory
    fn expand_path(path: &Path) -> PathBuf {
        if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/"))
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        path.to_path_buf()
    }
}

fn env_value(prefix: &str, key: &str) -> Option<(String, String)> {
    let var = format!("{prefix}_{key}");
    std::env::var(&var).ok().map(|value| (var, value))
}

fn env_parse<T: FromStr>(prefix: &str, key: &str) -> Result<Option<T>> {
    match env_value(prefix, key) {
        None => Ok(None),
        Some((var, value)) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVar { var, value }),
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
