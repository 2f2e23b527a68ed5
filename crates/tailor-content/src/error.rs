//! Content loading errors.

use crate::frontmatter::FrontmatterError;

/// Errors that can occur while loading site content.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Input directory not found: {0}")]
    InputNotFound(String),

    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid frontmatter in {path}: {source}")]
    Frontmatter {
        path: String,
        #[source]
        source: FrontmatterError,
    },

    #[error("Invalid data file {path}: {message}")]
    Data { path: String, message: String },

    #[error("Invalid permalink in {path}: {value}")]
    InvalidPermalink { path: String, value: String },

    #[error("Failed to walk input directory: {0}")]
    Walk(String),
}
