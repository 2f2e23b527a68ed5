//! Plugins and the syntax highlighting plugin.

use std::sync::Arc;

use serde_json::Value;
use syntect::{highlighting::ThemeSet, html::highlighted_html_for_string, parsing::SyntaxSet};

use crate::builder::SiteConfigBuilder;
use crate::filter::{kind, Filter, FilterError};

/// A bundle of registrations applied to a builder in one call.
pub trait Plugin {
    fn name(&self) -> &'static str;

    fn register(&self, site: &mut SiteConfigBuilder);
}

/// Renders a fenced code block to HTML.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str, lang: Option<&str>) -> String;
}

/// Syntax highlighting for markdown code blocks and the `highlight` filter.
#[derive(Debug, Clone)]
pub struct SyntaxHighlight {
    theme: String,
}

impl SyntaxHighlight {
    pub fn new(theme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
        }
    }
}

impl Default for SyntaxHighlight {
    fn default() -> Self {
        Self::new("base16-ocean.dark")
    }
}

impl Plugin for SyntaxHighlight {
    fn name(&self) -> &'static str {
        "syntax-highlight"
    }

    fn register(&self, site: &mut SiteConfigBuilder) {
        let highlighter = Arc::new(SyntectHighlighter::new(&self.theme));

        site.set_highlighter(highlighter.clone());
        site.add_filter("highlight", HighlightFilter { highlighter });
    }
}

/// Highlighter backed by syntect's bundled syntaxes and themes.
#[derive(Debug)]
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme: String,
}

impl SyntectHighlighter {
    pub fn new(theme: &str) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme: theme.to_string(),
        }
    }
}

impl Highlighter for SyntectHighlighter {
    /// Unknown languages fall back to an escaped `<pre><code>` block.
    fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let syntax = lang.and_then(|l| self.syntax_set.find_syntax_by_token(l));
        let theme = self
            .theme_set
            .themes
            .get(&self.theme)
            .or_else(|| self.theme_set.themes.values().next());

        match (syntax, theme) {
            (Some(syntax), Some(theme)) => {
                highlighted_html_for_string(code, &self.syntax_set, syntax, theme)
                    .unwrap_or_else(|_| plain_block(code, lang))
            }
            _ => plain_block(code, lang),
        }
    }
}

fn plain_block(code: &str, lang: Option<&str>) -> String {
    let lang_class = lang
        .filter(|l| !l.is_empty())
        .map(|l| format!(" class=\"language-{}\"", html_escape(l)))
        .unwrap_or_default();
    format!("<pre><code{lang_class}>{}</code></pre>", html_escape(code))
}

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// `{{ source | highlight("rust") }}`
struct HighlightFilter {
    highlighter: Arc<dyn Highlighter>,
}

impl Filter for HighlightFilter {
    fn apply(&self, input: &Value, args: &[Value]) -> Result<Value, FilterError> {
        let code = input
            .as_str()
            .ok_or_else(|| FilterError::NotAString(kind(input)))?;

        let lang = match args.first() {
            None | Some(Value::Null) => None,
            Some(Value::String(lang)) => Some(lang.as_str()),
            Some(other) => {
                return Err(FilterError::InvalidArgument(format!(
                    "language must be a string, got {}",
                    kind(other)
                )))
            }
        };

        Ok(Value::String(self.highlighter.highlight(code, lang)))
    }

    fn returns_markup(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn highlights_known_language() {
        let highlighter = SyntectHighlighter::new("base16-ocean.dark");

        let html = highlighter.highlight("fn main() {}\n", Some("rust"));

        assert!(html.contains("<pre"));
        assert!(html.contains("style="));
        assert!(html.contains("main"));
    }

    #[test]
    fn falls_back_for_unknown_language() {
        let highlighter = SyntectHighlighter::new("base16-ocean.dark");

        let html = highlighter.highlight("a < b", Some("no-such-lang"));

        assert_eq!(
            html,
            "<pre><code class=\"language-no-such-lang\">a &lt; b</code></pre>"
        );
    }

    #[test]
    fn filter_highlights_strings() {
        let filter = HighlightFilter {
            highlighter: Arc::new(SyntectHighlighter::new("base16-ocean.dark")),
        };

        let out = filter
            .apply(&json!("<b>"), &[json!("unknown-xyz")])
            .unwrap();

        assert_eq!(
            out,
            json!("<pre><code class=\"language-unknown-xyz\">&lt;b&gt;</code></pre>")
        );
        assert!(filter.returns_markup());
    }

    #[test]
    fn filter_rejects_non_string_language() {
        let filter = HighlightFilter {
            highlighter: Arc::new(SyntectHighlighter::new("base16-ocean.dark")),
        };

        let err = filter.apply(&json!("x"), &[json!(3)]).unwrap_err();

        assert!(matches!(err, FilterError::InvalidArgument(_)));
    }

    #[test]
    fn plugin_registers_filter_and_highlighter() {
        let mut builder = SiteConfigBuilder::new();
        builder.add_plugin(&SyntaxHighlight::default());

        let config = builder.build();

        assert!(config.filter("highlight").is_some());
        assert!(config.highlighter().is_some());
        assert_eq!(config.plugins(), &["syntax-highlight"]);
    }
}
