//! Configuration checks run before a labeling run starts

use crate::config::{
    CorpusConfig, HintConfig, LabelingConfig, LogConfig, LogOutput, OutputConfig, ScoutConfig,
};
use crate::ConfigError;
use std::fmt;
use std::path::Path;

/// Hint names accepted in the `[hints]` tables
pub const HINT_NAMES: [&str; 3] = ["generic", "text", "media"];

/// Upper bound on configured worker threads
pub const MAX_WORKERS: usize = 1024;

/// Problems found in a configuration.
///
/// Errors block the run; warnings are logged and the run continues.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// Blocking problems
    pub errors: Vec<ValidationError>,
    /// Non-blocking problems
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// No problems
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// True when nothing blocks the run
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when at least one warning was raised
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Record a blocking problem
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Record a non-blocking problem
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Append everything found by another check
    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Warnings if the configuration is usable, otherwise every error
    /// joined into one [`ConfigError::Validation`]
    pub fn into_result(self) -> crate::Result<Vec<ValidationWarning>> {
        if self.errors.is_empty() {
            return Ok(self.warnings);
        }
        let joined = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(ConfigError::Validation(joined))
    }
}

/// A blocking problem with one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted field name, e.g. `corpus.dirs`
    pub field: String,
    /// What is wrong
    pub message: String,
    /// Kind of problem
    pub code: ErrorCode,
}

impl ValidationError {
    /// Error on `field`
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}): {}", self.field, self.code, self.message)
    }
}

/// A non-blocking problem with one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Dotted field name
    pub field: String,
    /// What looks wrong
    pub message: String,
    /// How to fix it, if known
    pub suggestion: Option<String>,
}

impl ValidationWarning {
    /// Warning on `field` without a suggested fix
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Warning on `field` with a suggested fix
    pub fn with_suggestion(
        field: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            suggestion: Some(suggestion.into()),
            ..Self::new(field, message)
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)?;
        match &self.suggestion {
            Some(hint) => write!(f, " ({hint})"),
            None => Ok(()),
        }
    }
}

/// Kind of validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Missing or empty value
    Required,
    /// Number outside its range
    OutOfRange,
    /// Value outside its vocabulary
    InvalidFormat,
    /// Path that should exist does not
    PathNotFound,
}

/// Checks a [`ScoutConfig`] section by section
#[derive(Debug)]
pub struct Validator {
    /// Also warn about settings that are legal but wasteful
    strict_mode: bool,
}

impl Validator {
    /// Validator without strict checks
    #[must_use]
    pub const fn new() -> Self {
        Self { strict_mode: false }
    }

    /// Turn strict checks on or off
    #[must_use]
    pub const fn with_strict_mode(mut self, enabled: bool) -> Self {
        self.strict_mode = enabled;
        self
    }

    /// Run every section check plus the cross-section rules
    #[must_use]
    pub fn validate(&self, config: &ScoutConfig) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.merge(self.validate_corpus(&config.corpus));
        result.merge(self.validate_labeling(&config.labeling));
        result.merge(self.validate_output(&config.output));
        result.merge(self.validate_hints(&config.hints));
        result.merge(self.validate_log(&config.log));
        result.merge(OverlapRule.check(config));
        result
    }

    /// Validates corpus directories and synthetic sample settings
    #[must_use]
    pub fn validate_corpus(&self, config: &CorpusConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        if config.dirs.is_empty() {
            result.add_error(ValidationError::new(
                "corpus.dirs",
                "At least one corpus directory is required",
                ErrorCode::Required,
            ));
        }

        for dir in &config.dirs {
            if !dir.is_dir() {
                result.add_error(ValidationError::new(
                    "corpus.dirs",
                    format!("Corpus directory does not exist: {}", dir.display()),
                    ErrorCode::PathNotFound,
                ));
            }
        }

        if config.synthesize_compressed {
            if !(1..=22).contains(&config.synthetic_level) {
                result.add_error(ValidationError::new(
                    "corpus.synthetic_level",
                    format!(
                        "Zstd level {} is outside 1..=22",
                        config.synthetic_level
                    ),
                    ErrorCode::OutOfRange,
                ));
            }
            if config.resolved_synthetic_dir().is_none() {
                result.add_error(ValidationError::new(
                    "corpus.synthetic_dir",
                    "synthetic_dir must be set when no corpus directory is configured",
                    ErrorCode::Required,
                ));
            }
        }
        result
    }

    /// Validates the worker count
    #[must_use]
    pub fn validate_labeling(&self, config: &LabelingConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        if config.workers > MAX_WORKERS {
            result.add_error(ValidationError::new(
                "labeling.workers",
                format!(
                    "Worker count {} exceeds limit of {MAX_WORKERS}",
                    config.workers
                ),
                ErrorCode::OutOfRange,
            ));
        }

        if self.strict_mode
            && let Ok(cores) = std::thread::available_parallelism()
            && config.workers > cores.get()
        {
            result.add_warning(ValidationWarning::with_suggestion(
                "labeling.workers",
                format!(
                    "{} workers configured on a machine with {} cores",
                    config.workers, cores
                ),
                "Set workers = 0 to match the available parallelism",
            ));
        }
        result
    }

    /// Validates the dataset output location
    #[must_use]
    pub fn validate_output(&self, config: &OutputConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        if config.path.as_os_str().is_empty() {
            result.add_error(ValidationError::new(
                "output.path",
                "Output path must not be empty",
                ErrorCode::Required,
            ));
            return result;
        }

        if let Some(parent) = non_empty_parent(&config.path)
            && !parent.exists()
        {
            result.add_error(ValidationError::new(
                "output.path",
                format!("Parent directory does not exist: {}", parent.display()),
                ErrorCode::PathNotFound,
            ));
        }
        result
    }

    /// Validates extra hint table entries
    #[must_use]
    pub fn validate_hints(&self, config: &HintConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        for (kind, key, value) in config.entries() {
            let field = format!("hints.{kind}");
            if key.trim().is_empty() {
                result.add_error(ValidationError::new(
                    field.clone(),
                    "Hint keys must not be empty",
                    ErrorCode::Required,
                ));
            }
            if !HINT_NAMES.contains(&value.to_lowercase().as_str()) {
                result.add_error(ValidationError::new(
                    field,
                    format!("Unknown hint '{value}' for '{key}', expected one of {HINT_NAMES:?}"),
                    ErrorCode::InvalidFormat,
                ));
            }
        }
        result
    }

    /// Check that file logging has somewhere to write
    #[must_use]
    pub fn validate_log(&self, config: &LogConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        if matches!(config.output, LogOutput::File | LogOutput::Both)
            && config.file_path.is_none()
        {
            result.add_error(ValidationError::new(
                "log.file_path",
                "file_path must be set when output is 'file' or 'both'",
                ErrorCode::Required,
            ));
        }

        if let Some(ref path) = config.file_path
            && let Some(parent) = non_empty_parent(path)
            && !parent.exists()
        {
            result.add_error(ValidationError::new(
                "log.file_path",
                format!("Parent directory does not exist: {}", parent.display()),
                ErrorCode::PathNotFound,
            ));
        }
        result
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Flags outputs that would be picked up as corpus input on the next run
struct OverlapRule;

impl OverlapRule {
    fn check(&self, config: &ScoutConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        for dir in &config.corpus.dirs {
            if config.output.path.starts_with(dir) {
                result.add_warning(ValidationWarning::with_suggestion(
                    "output.path",
                    format!(
                        "Output file {} is inside corpus directory {}",
                        config.output.path.display(),
                        dir.display()
                    ),
                    "Write the dataset outside the corpus",
                ));
            }
        }

        if config.corpus.synthesize_compressed
            && config.corpus.recursive
            && let Some(synthetic) = config.corpus.resolved_synthetic_dir()
            && config.corpus.dirs.iter().any(|dir| synthetic.starts_with(dir))
        {
            result.add_warning(ValidationWarning::with_suggestion(
                "corpus.synthetic_dir",
                "Synthetic samples inside a recursively scanned corpus are labeled twice on rerun",
                "Point synthetic_dir outside the corpus",
            ));
        }
        result
    }
}

fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}
