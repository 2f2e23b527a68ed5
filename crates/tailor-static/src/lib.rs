//! Static site build host for tailor.
//!
//! Renders the pages discovered by `tailor-content` with the filters,
//! shortcodes and transforms registered in a `tailor_config::SiteConfig`.

pub mod builder;
pub mod markdown;
pub mod passthrough;
pub mod templates;

pub use builder::{BuildError, BuildResult, StaticBuilder};
pub use markdown::render_markdown;
pub use passthrough::copy_passthrough;
pub use templates::{TemplateEngine, TemplateError, MAX_LAYOUT_DEPTH};
