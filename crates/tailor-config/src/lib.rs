//! Site build configuration for tailor.
//!
//! A [`SiteConfigBuilder`] accumulates named filters, shortcodes, transforms,
//! watch targets and passthrough copies, and hands the resulting
//! [`SiteConfig`] to the build host. [`configure`] applies this site's
//! registrations; [`ThemeConfig`] describes its stylesheet theme.

pub mod builder;
pub mod filter;
pub mod passthrough;
pub mod plugin;
pub mod shortcode;
pub mod site;
pub mod theme;
pub mod transform;

pub use builder::{Dirs, SiteConfig, SiteConfigBuilder};
pub use filter::{sort_by_order, Filter, FilterError, OrderError, OrderFilter, Orderable};
pub use passthrough::PassthroughCopy;
pub use plugin::{Highlighter, Plugin, SyntaxHighlight, SyntectHighlighter};
pub use shortcode::{Shortcode, ShortcodeError, VersionShortcode};
pub use site::{configure, INPUT_DIR, OUTPUT_DIR};
pub use theme::{ThemeConfig, ThemeError};
pub use transform::{BuildMode, HtmlMinify, Transform, TransformError};
