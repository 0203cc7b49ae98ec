//! Error types for settings operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from settings reads and persistence.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A stored string failed its declared coercion on read.
    ///
    /// Distinct from "absent": the option exists, its value is garbage.
    #[error("option '{section}.{option}': cannot read '{value}' as {expected}")]
    Coerce {
        /// Section name.
        section: String,
        /// Option name.
        option: String,
        /// The raw stored string.
        value: String,
        /// Declared coercion type ("float" or "int").
        expected: &'static str,
    },

    /// Failed to write a settings file.
    #[error("failed to write settings '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize settings to TOML.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl SettingsError {
    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SettingsError::WriteFile {
            path: path.into(),
            source,
        }
    }
}
