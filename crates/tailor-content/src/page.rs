//! Pages and their output routes.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tailor_config::Orderable;

use crate::error::ContentError;

/// Template language of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    /// Templated, then rendered from markdown
    Markdown,
    /// Templated HTML
    Html,
}

impl PageKind {
    /// Determine the page kind from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "md" | "markdown" => Some(Self::Markdown),
            "html" | "jinja" => Some(Self::Html),
            _ => None,
        }
    }
}

/// A page discovered in the input directory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Source path relative to the input directory
    pub input_path: PathBuf,

    /// File name without extension; the parent directory name for `index`
    pub file_slug: String,

    /// Public URL, `None` when the page is not written
    pub url: Option<String>,

    /// Output path relative to the output directory
    pub output_path: Option<PathBuf>,

    /// Merged data cascade for this page
    pub data: Value,

    pub kind: PageKind,

    /// Template source without frontmatter
    #[serde(skip)]
    pub body: String,
}

impl Page {
    /// Create a page, deriving its route from `data.permalink` when present.
    pub fn new(
        input_path: PathBuf,
        kind: PageKind,
        data: Value,
        body: String,
    ) -> Result<Self, ContentError> {
        let output_path = match data.get("permalink") {
            None | Some(Value::Null) | Some(Value::Bool(true)) => {
                Some(default_output_path(&input_path))
            }
            Some(Value::Bool(false)) => None,
            Some(Value::String(permalink)) => Some(permalink_output_path(permalink).ok_or_else(
                || ContentError::InvalidPermalink {
                    path: input_path.display().to_string(),
                    value: permalink.clone(),
                },
            )?),
            Some(other) => {
                return Err(ContentError::InvalidPermalink {
                    path: input_path.display().to_string(),
                    value: other.to_string(),
                })
            }
        };

        let url = output_path.as_deref().map(url_for);

        Ok(Self {
            file_slug: file_slug(&input_path),
            input_path,
            url,
            output_path,
            data,
            kind,
            body,
        })
    }

    /// The layout this page renders into, if any.
    pub fn layout(&self) -> Option<&str> {
        self.data.get("layout").and_then(Value::as_str)
    }

    /// Tags from `data.tags`, which may be a single string or a list.
    pub fn tags(&self) -> Vec<&str> {
        match self.data.get("tags") {
            Some(Value::String(tag)) => vec![tag.as_str()],
            Some(Value::Array(tags)) => tags.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

impl Orderable for Page {
    fn order_value(&self) -> Option<&Value> {
        self.data.get("order")
    }
}

/// `index.md -> index.html`, `about.md -> about/index.html`.
fn default_output_path(relative: &Path) -> PathBuf {
    let parent = relative.parent().unwrap_or(Path::new(""));
    let stem = relative
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("index");

    if stem == "index" {
        parent.join("index.html")
    } else {
        parent.join(stem).join("index.html")
    }
}

/// `/docs/` -> `docs/index.html`, `/feed.xml` -> `feed.xml`.
///
/// Returns `None` for permalinks that escape the output directory.
fn permalink_output_path(permalink: &str) -> Option<PathBuf> {
    let trimmed = permalink.trim_start_matches('/');
    let path = Path::new(trimmed);

    if path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }

    if trimmed.is_empty() || trimmed.ends_with('/') {
        Some(path.join("index.html"))
    } else {
        Some(path.to_path_buf())
    }
}

fn url_for(output_path: &Path) -> String {
    let joined = output_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");

    match joined.strip_suffix("index.html") {
        Some(dir) => format!("/{dir}"),
        None => format!("/{joined}"),
    }
}

fn file_slug(relative: &Path) -> String {
    let stem = relative
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    if stem == "index" {
        relative
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string()
    } else {
        stem.to_string()
    }
}
