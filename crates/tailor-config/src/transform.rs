//! Content transforms applied to every emitted file.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// A hook that may rewrite rendered content before it is written to disk.
pub trait Transform: Send + Sync {
    /// Rewrite `content` destined for `output_path`.
    ///
    /// `output_path` is `None` for pages that are rendered but not written.
    fn apply(&self, content: &str, output_path: Option<&Path>) -> Result<String, TransformError>;
}

/// Errors that can occur in a transform.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Failed to minify {}: {message}", path.display())]
    Minify { path: PathBuf, message: String },

    #[error("Transform failed: {0}")]
    Failed(String),
}

/// Whether the site is built for production or development.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    #[default]
    Development,
    Production,
}

impl BuildMode {
    /// Environment variable selecting production builds.
    pub const ENV_VAR: &'static str = "TAILOR_PRODUCTION";

    /// Read the build mode from [`BuildMode::ENV_VAR`].
    pub fn from_env() -> Self {
        Self::from_flag(std::env::var_os(Self::ENV_VAR).as_deref())
    }

    /// Any non-empty value selects production.
    pub fn from_flag(value: Option<&OsStr>) -> Self {
        match value {
            Some(v) if !v.is_empty() => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Minifies HTML output in production builds.
///
/// Content is only rewritten when the mode is production and the output path
/// ends in `.html`; everything else passes through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct HtmlMinify {
    mode: BuildMode,
}

impl HtmlMinify {
    pub fn new(mode: BuildMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }
}

impl Transform for HtmlMinify {
    fn apply(&self, content: &str, output_path: Option<&Path>) -> Result<String, TransformError> {
        match output_path {
            Some(path) if self.mode.is_production() && is_html(path) => minify(content, path),
            _ => Ok(content.to_string()),
        }
    }
}

fn is_html(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "html")
}

static DOCTYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!doctype[^>]*>").expect("doctype pattern is valid"));

/// Collapse whitespace, strip comments and shorten the doctype.
pub fn minify(content: &str, path: &Path) -> Result<String, TransformError> {
    let content = DOCTYPE.replace(content, "<!DOCTYPE html>");

    let mut cfg = minify_html::Cfg::new();
    cfg.keep_comments = false;
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.do_not_minify_doctype = true;
    cfg.keep_spaces_between_attributes = true;
    cfg.ensure_spec_compliant_unquoted_attribute_values = true;

    let minified = minify_html::minify(content.as_bytes(), &cfg);

    String::from_utf8(minified).map_err(|e| TransformError::Minify {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
