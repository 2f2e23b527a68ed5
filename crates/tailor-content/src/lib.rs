//! Site content for tailor.
//!
//! Discovers templates in the input directory, parses their frontmatter,
//! layers the data cascade over it and groups pages into collections.

pub mod collection;
pub mod data;
pub mod error;
pub mod frontmatter;
pub mod page;

pub use collection::{discover, Collections, DiscoverOptions, INCLUDES_DIR};
pub use data::{merge, DataCascade, GLOBAL_DATA_DIR};
pub use error::ContentError;
pub use frontmatter::{extract_frontmatter, FrontmatterError};
pub use page::{Page, PageKind};
