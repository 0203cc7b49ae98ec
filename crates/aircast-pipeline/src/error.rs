//! Error types for template handling.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading or parsing a pipeline template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Failed to read a template file.
    #[error("failed to read template '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The template parsed into no elements at all.
    #[error("template contains no elements")]
    Empty,

    /// An element chunk between separators was blank.
    #[error("empty element at position {index}")]
    EmptyElement {
        /// Zero-based position of the blank chunk.
        index: usize,
    },
}

impl TemplateError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TemplateError::ReadFile {
            path: path.into(),
            source,
        }
    }
}
