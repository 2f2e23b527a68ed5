//! Template engine bridging configured filters and shortcodes into minijinja.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use minijinja::value::{Rest, Value};
use minijinja::{AutoEscape, Environment, Error, ErrorKind};
use serde::Serialize;

use tailor_config::{Filter, Shortcode, SiteConfig};
use tailor_content::{extract_frontmatter, merge, FrontmatterError};

/// Longest allowed chain of layouts wrapping a page.
pub const MAX_LAYOUT_DEPTH: usize = 10;

/// Errors that can occur when rendering templates.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("{0:#}")]
    Render(#[from] Error),

    #[error("Layout not found: {0}")]
    MissingLayout(String),

    #[error("Invalid frontmatter in layout {name}: {source}")]
    LayoutFrontmatter {
        name: String,
        #[source]
        source: FrontmatterError,
    },

    #[error("Layout chain is deeper than {0}")]
    LayoutTooDeep(usize),
}

/// Template engine using minijinja.
///
/// Partials and layouts are loaded from the includes directory. Every
/// configured filter is available under its name, every shortcode as a
/// global function. Output is not auto-escaped.
pub struct TemplateEngine {
    env: Environment<'static>,
    includes_dir: PathBuf,
}

impl TemplateEngine {
    pub fn new(includes_dir: &Path, config: &SiteConfig) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(includes_dir));
        env.set_auto_escape_callback(|_| AutoEscape::None);

        for (name, filter) in config.filters() {
            register_filter(&mut env, name, Arc::clone(filter));
        }
        for (name, shortcode) in config.shortcodes() {
            register_shortcode(&mut env, name, Arc::clone(shortcode));
        }

        Self {
            env,
            includes_dir: includes_dir.to_path_buf(),
        }
    }

    /// Render template `source`; `name` appears in error messages.
    pub fn render_str<S: Serialize>(
        &self,
        name: &str,
        source: &str,
        ctx: S,
    ) -> Result<String, TemplateError> {
        Ok(self.env.render_named_str(name, source, ctx)?)
    }

    /// Wrap `content` in `layout` and any layouts it names in turn.
    ///
    /// Layout frontmatter sits below the page's own data; the wrapped content
    /// is available as `content`.
    pub fn apply_layouts(
        &self,
        layout: Option<&str>,
        mut content: String,
        ctx: &serde_json::Value,
    ) -> Result<String, TemplateError> {
        let mut next = layout.map(str::to_string);
        let mut depth = 0;

        while let Some(name) = next.take() {
            depth += 1;
            if depth > MAX_LAYOUT_DEPTH {
                return Err(TemplateError::LayoutTooDeep(MAX_LAYOUT_DEPTH));
            }

            let source = fs::read_to_string(self.includes_dir.join(&name))
                .map_err(|_| TemplateError::MissingLayout(name.clone()))?;

            let (layout_data, body) =
                extract_frontmatter(&source).map_err(|e| TemplateError::LayoutFrontmatter {
                    name: name.clone(),
                    source: e,
                })?;

            next = layout_data
                .get("layout")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string);

            let mut layout_ctx = serde_json::Value::Object(layout_data);
            merge(&mut layout_ctx, ctx.clone(), false);
            if let Some(map) = layout_ctx.as_object_mut() {
                map.insert("content".to_string(), serde_json::Value::String(content));
            }

            content = self.render_str(&name, body, &layout_ctx)?;
        }

        Ok(content)
    }
}

fn register_filter(env: &mut Environment<'static>, name: &str, filter: Arc<dyn Filter>) {
    env.add_filter(
        name.to_string(),
        move |value: Value, args: Rest<Value>| -> Result<Value, Error> {
            let input = to_json(&value)?;
            let args = args.iter().map(to_json).collect::<Result<Vec<_>, _>>()?;

            let output = filter
                .apply(&input, &args)
                .map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))?;

            Ok(match output {
                serde_json::Value::String(s) if filter.returns_markup() => {
                    Value::from_safe_string(s)
                }
                other => Value::from_serialize(&other),
            })
        },
    );
}

fn register_shortcode(env: &mut Environment<'static>, name: &str, shortcode: Arc<dyn Shortcode>) {
    env.add_function(
        name.to_string(),
        move |args: Rest<Value>| -> Result<Value, Error> {
            let args = args.iter().map(to_json).collect::<Result<Vec<_>, _>>()?;

            let output = shortcode
                .render(&args)
                .map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))?;

            Ok(Value::from_safe_string(output))
        },
    );
}

fn to_json(value: &Value) -> Result<serde_json::Value, Error> {
    serde_json::to_value(value).map_err(|e| Error::new(ErrorKind::BadSerialization, e.to_string()))
}
