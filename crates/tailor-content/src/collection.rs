//! Page discovery and collections.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ignore::WalkBuilder;
use serde::Serialize;

use crate::data::{DataCascade, GLOBAL_DATA_DIR};
use crate::error::ContentError;
use crate::frontmatter::extract_frontmatter;
use crate::page::{Page, PageKind};

/// Directory holding layouts and partials, relative to the input directory.
pub const INCLUDES_DIR: &str = "_includes";

/// Options controlling page discovery.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscoverOptions {
    /// Skip templates matched by `.gitignore` files
    pub use_gitignore: bool,

    /// Merge the data cascade recursively
    pub data_deep_merge: bool,
}

/// Find and load every page under `input_dir`, sorted by input path.
pub fn discover(input_dir: &Path, options: DiscoverOptions) -> Result<Vec<Page>, ContentError> {
    if !input_dir.is_dir() {
        return Err(ContentError::InputNotFound(input_dir.display().to_string()));
    }

    let mut cascade = DataCascade::load(input_dir, options.data_deep_merge)?;
    let mut pages = Vec::new();

    let walker = WalkBuilder::new(input_dir)
        .hidden(true)
        .ignore(false)
        .parents(false)
        .git_global(false)
        .git_ignore(options.use_gitignore)
        .git_exclude(options.use_gitignore)
        .require_git(false)
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            entry.depth() == 0
                || !(name == INCLUDES_DIR || name == GLOBAL_DATA_DIR || name == "node_modules")
        })
        .build();

    for entry in walker {
        let entry = entry.map_err(|e| ContentError::Walk(e.to_string()))?;
        let path = entry.path();

        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Some(kind) = PageKind::from_path(path) else {
            continue;
        };

        let source = fs::read_to_string(path).map_err(|e| ContentError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let (frontmatter, body) =
            extract_frontmatter(&source).map_err(|e| ContentError::Frontmatter {
                path: path.display().to_string(),
                source: e,
            })?;

        let relative = path.strip_prefix(input_dir).unwrap_or(path).to_path_buf();
        let data = cascade.data_for(&relative, frontmatter)?;

        pages.push(Page::new(relative, kind, data, body.to_string())?);
    }

    pages.sort_by(|a, b| a.input_path.cmp(&b.input_path));
    tracing::debug!("Discovered {} pages in {}", pages.len(), input_dir.display());

    Ok(pages)
}

/// Pages grouped by tag, plus `all`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Collections {
    collections: BTreeMap<String, Vec<Page>>,
}

impl Collections {
    pub const ALL: &'static str = "all";

    /// Build collections from pages, keeping their order.
    pub fn from_pages(pages: &[Page]) -> Self {
        let mut collections: BTreeMap<String, Vec<Page>> = BTreeMap::new();
        collections.insert(Self::ALL.to_string(), pages.to_vec());

        for page in pages {
            for tag in page.tags() {
                if tag == Self::ALL {
                    continue;
                }
                collections
                    .entry(tag.to_string())
                    .or_default()
                    .push(page.clone());
            }
        }

        Self { collections }
    }

    pub fn get(&self, name: &str) -> Option<&[Page]> {
        self.collections.get(name).map(Vec::as_slice)
    }

    pub fn all(&self) -> &[Page] {
        self.get(Self::ALL).unwrap_or_default()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }
}
