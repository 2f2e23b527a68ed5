//! Static site builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde_json::{Map, Value};

use tailor_config::SiteConfig;
use tailor_content::{discover, Collections, ContentError, DiscoverOptions, Page, PageKind, INCLUDES_DIR};

use crate::markdown::render_markdown;
use crate::passthrough::copy_passthrough;
use crate::templates::TemplateEngine;

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages written
    pub pages: usize,

    /// Number of passthrough files copied
    pub copied: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    ContentError(#[from] ContentError),

    #[error("Failed to render {path}: {message}")]
    TemplateError { path: String, message: String },

    #[error("Transform `{name}` failed: {message}")]
    TransformError { name: String, message: String },

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("Failed to copy {from} to {to}: {message}")]
    CopyError {
        from: String,
        to: String,
        message: String,
    },
}

/// Static site builder.
///
/// Discovers pages under the input directory, renders them through the
/// template engine, runs every registered transform over the result and
/// writes it beneath the output directory. Passthrough copies run last.
pub struct StaticBuilder {
    root: PathBuf,
    config: SiteConfig,
    templates: TemplateEngine,
}

impl StaticBuilder {
    /// Create a builder for the project at `root`.
    pub fn new(root: impl Into<PathBuf>, config: SiteConfig) -> Self {
        let root = root.into();
        let includes = root.join(&config.dirs().input).join(INCLUDES_DIR);
        let templates = TemplateEngine::new(&includes, &config);

        Self {
            root,
            config,
            templates,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.join(&self.config.dirs().input)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.dirs().output)
    }

    /// Build the site.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let input_dir = self.input_dir();
        let output_dir = self.output_dir();

        let mut pages = discover(
            &input_dir,
            DiscoverOptions {
                use_gitignore: self.config.use_gitignore(),
                data_deep_merge: self.config.data_deep_merge(),
            },
        )?;

        // The output directory may sit inside the input directory.
        if let Ok(previous) = output_dir.strip_prefix(&input_dir) {
            pages.retain(|page| !page.input_path.starts_with(previous));
        }

        fs::create_dir_all(&output_dir).map_err(|e| BuildError::WriteError(e.to_string()))?;

        let collections = serde_json::to_value(Collections::from_pages(&pages)).map_err(|e| {
            BuildError::TemplateError {
                path: "collections".to_string(),
                message: e.to_string(),
            }
        })?;

        let results: Vec<Result<bool, BuildError>> = pages
            .par_iter()
            .map(|page| self.build_page(page, &collections, &output_dir))
            .collect();

        let mut written = 0;
        for result in results {
            if result? {
                written += 1;
            }
        }

        let copied = copy_passthrough(self.config.passthrough_copies(), &self.root, &output_dir)?;

        tracing::debug!(
            "Wrote {} pages and copied {} files to {}",
            written,
            copied,
            output_dir.display()
        );

        Ok(BuildResult {
            pages: written,
            copied,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir,
        })
    }

    /// Build a single page. Returns whether a file was written.
    fn build_page(
        &self,
        page: &Page,
        collections: &Value,
        output_dir: &Path,
    ) -> Result<bool, BuildError> {
        let Some(relative) = page.output_path.as_deref() else {
            tracing::debug!("Skipping {} (permalink: false)", page.input_path.display());
            return Ok(false);
        };
        let output_path = output_dir.join(relative);

        let ctx = page_context(page, collections);
        let html = self.render_page(page, &ctx)?;
        let content = self.apply_transforms(html, &output_path)?;

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
        }
        fs::write(&output_path, content)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", output_path.display(), e)))?;

        Ok(true)
    }

    /// Template the page body, render markdown, then wrap it in its layouts.
    fn render_page(&self, page: &Page, ctx: &Value) -> Result<String, BuildError> {
        let name = page.input_path.to_string_lossy();
        let template_error = |e: crate::templates::TemplateError| BuildError::TemplateError {
            path: page.input_path.display().to_string(),
            message: e.to_string(),
        };

        let rendered = self
            .templates
            .render_str(&name, &page.body, ctx)
            .map_err(template_error)?;

        let content = match page.kind {
            PageKind::Markdown => render_markdown(&rendered, self.config.highlighter()),
            PageKind::Html => rendered,
        };

        self.templates
            .apply_layouts(page.layout(), content, ctx)
            .map_err(template_error)
    }

    /// Run every transform in registration order.
    fn apply_transforms(&self, content: String, output_path: &Path) -> Result<String, BuildError> {
        self.config
            .transforms()
            .try_fold(content, |content, (name, transform)| {
                transform
                    .apply(&content, Some(output_path))
                    .map_err(|e| BuildError::TransformError {
                        name: name.to_string(),
                        message: e.to_string(),
                    })
            })
    }
}

/// Template context: the page's data plus `page` and `collections`.
fn page_context(page: &Page, collections: &Value) -> Value {
    let mut ctx = match &page.data {
        Value::Object(data) => data.clone(),
        _ => Map::new(),
    };

    let mut info = Map::new();
    info.insert(
        "inputPath".to_string(),
        Value::String(page.input_path.to_string_lossy().into_owned()),
    );
    info.insert("fileSlug".to_string(), Value::String(page.file_slug.clone()));
    info.insert(
        "url".to_string(),
        page.url.clone().map(Value::String).unwrap_or(Value::Null),
    );
    info.insert(
        "outputPath".to_string(),
        page.output_path
            .as_ref()
            .map(|p| Value::String(p.to_string_lossy().into_owned()))
            .unwrap_or(Value::Null),
    );

    ctx.insert("page".to_string(), Value::Object(info));
    ctx.insert("collections".to_string(), collections.clone());

    Value::Object(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tailor_config::{BuildMode, Dirs, SiteConfigBuilder, Transform, TransformError};
    use tempfile::tempdir;

    fn write(root: &Path, path: &str, content: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn scaffold(root: &Path) {
        write(
            root,
            "src/_includes/base.html",
            "<!doctype html>\n<html>\n<head><title>{{ title }}</title><link rel=\"stylesheet\" href=\"/style.css?v={{ version() }}\"></head>\n<body>\n  <!-- layout -->\n  {{ content | safe }}\n</body>\n</html>\n",
        );
        write(
            root,
            "src/index.html",
            "---\ntitle: Home\nlayout: base.html\n---\n<ul>{% for doc in collections.docs | order %}<li><a href=\"{{ doc.url }}\">{{ doc.data.title }}</a></li>{% endfor %}</ul>",
        );
        write(
            root,
            "src/docs/docs.json",
            r#"{ "tags": ["docs"], "layout": "base.html" }"#,
        );
        write(root, "src/docs/b.md", "---\ntitle: Second\norder: 2\n---\n# Second\n");
        write(
            root,
            "src/docs/a.md",
            "---\ntitle: First\norder: 1\n---\n# First\n\n```rust\nfn main() {}\n```\n",
        );
        write(root, "src/draft.md", "---\npermalink: false\n---\n# Draft\n");
        write(root, "_tmp/style.css", "body{margin:0}");
        write(root, "images/logo.svg", "<svg/>");
    }

    #[test]
    fn builds_configured_site() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        scaffold(root);

        let builder = StaticBuilder::new(root, SiteConfig::load(BuildMode::Development));
        let result = builder.build().unwrap();

        assert_eq!(result.pages, 3);
        assert_eq!(result.copied, 2);
        assert_eq!(result.output_dir, root.join("_site"));

        let index = fs::read_to_string(root.join("_site/index.html")).unwrap();
        assert!(index.contains(
            "<li><a href=\"/docs/a/\">First</a></li><li><a href=\"/docs/b/\">Second</a></li>"
        ));
        assert!(index.contains("<!-- layout -->"));
        assert!(!index.contains("{{"));

        let first = fs::read_to_string(root.join("_site/docs/a/index.html")).unwrap();
        assert!(first.contains("<title>First</title>"));
        assert!(first.contains("<h1>First</h1>"));
        assert!(first.contains("<pre"));

        assert!(!root.join("_site/draft/index.html").exists());
        assert_eq!(
            fs::read_to_string(root.join("_site/style.css")).unwrap(),
            "body{margin:0}"
        );
        assert!(root.join("_site/images/logo.svg").is_file());
    }

    #[test]
    fn production_build_minifies_html_only() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        scaffold(root);

        let builder = StaticBuilder::new(root, SiteConfig::load(BuildMode::Production));
        builder.build().unwrap();

        let index = fs::read_to_string(root.join("_site/index.html")).unwrap();
        assert!(index.to_ascii_lowercase().starts_with("<!doctype html>"));
        assert!(!index.contains("<!-- layout -->"));

        assert_eq!(
            fs::read_to_string(root.join("_site/style.css")).unwrap(),
            "body{margin:0}"
        );
    }

    #[test]
    fn unordered_collection_fails_the_build() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "src/index.html", "{% for p in collections.all | order %}{% endfor %}");
        write(root, "src/about.md", "# About");

        let builder = StaticBuilder::new(root, SiteConfig::load(BuildMode::Development));
        let err = builder.build().unwrap_err();

        match err {
            BuildError::TemplateError { path, message } => {
                assert_eq!(path, "index.html");
                assert!(message.contains("data.order"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    struct Stamp(&'static str);

    impl Transform for Stamp {
        fn apply(&self, content: &str, _: Option<&Path>) -> Result<String, TransformError> {
            Ok(format!("{content}{}", self.0))
        }
    }

    struct Reject;

    impl Transform for Reject {
        fn apply(&self, _: &str, _: Option<&Path>) -> Result<String, TransformError> {
            Err(TransformError::Failed("rejected".to_string()))
        }
    }

    #[test]
    fn runs_transforms_in_order() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "index.html", "x");

        let mut site = SiteConfigBuilder::new();
        site.add_transform("a", Stamp("1")).add_transform("b", Stamp("2"));

        let builder = StaticBuilder::new(root, site.build());
        builder.build().unwrap();
        builder.build().unwrap();

        assert_eq!(fs::read_to_string(root.join("_site/index.html")).unwrap(), "x12");
        assert!(!root.join("_site/_site").exists());
    }

    #[test]
    fn transform_errors_abort_the_build() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "src/index.html", "x");

        let mut site = SiteConfigBuilder::new();
        site.dirs(Dirs::new("src", "out")).add_transform("reject", Reject);

        let err = StaticBuilder::new(root, site.build()).build().unwrap_err();

        assert!(matches!(err, BuildError::TransformError { ref name, .. } if name == "reject"));
        assert!(!root.join("out/index.html").exists());
    }

    #[test]
    fn exposes_page_metadata() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(
            root,
            "guide.html",
            "{{ page.url }}|{{ page.fileSlug }}|{{ page.inputPath }}",
        );

        StaticBuilder::new(root, SiteConfigBuilder::new().build())
            .build()
            .unwrap();

        assert_eq!(
            fs::read_to_string(root.join("_site/guide/index.html")).unwrap(),
            "/guide/|guide|guide.html"
        );
    }
}
