#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::return_self_not_must_use)]

//! Configuration for packscout
//!
//! - `packscout.toml` sections: `corpus`, `labeling`, `output`, `hints`, `log`
//! - `PACKSCOUT_SECTION_FIELD` environment overrides
//! - Validation with errors and warnings

pub mod config;
pub mod validate;

pub use config::*;
pub use validate::*;

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading or checking a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config file {}: {source}", .path.display())]
    Read {
        /// File that was requested
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for [`ScoutConfig`]
    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation found errors
    #[error("configuration rejected: {0}")]
    Validation(String),

    /// A field holds a value outside its vocabulary
    #[error("bad value for `{field}`: {message}")]
    InvalidValue {
        /// Dotted field name
        field: String,
        /// What was wrong
        message: String,
    },

    /// An environment override could not be parsed
    #[error("environment override {var}={value:?} is not valid")]
    EnvVar {
        /// Variable name
        var: String,
        /// Raw value
        value: String,
    },
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
