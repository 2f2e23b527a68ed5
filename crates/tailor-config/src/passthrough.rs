//! Passthrough copy declarations.

use std::path::{Component, Path, PathBuf};

/// A source path copied verbatim to a destination under the output directory.
///
/// The source is relative to the project root and may name a file or a
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PassthroughCopy {
    source: PathBuf,
    dest: PathBuf,
}

impl PassthroughCopy {
    pub fn new(source: impl AsRef<Path>, dest: impl AsRef<Path>) -> Self {
        Self {
            source: normalize(source.as_ref()),
            dest: normalize(dest.as_ref()),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }
}

/// Drop `.` components so `./images` and `images` name the same path.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_dot_segments() {
        let copy = PassthroughCopy::new("./node_modules/alpinejs/dist/cdn.js", "./js/alpine.js");

        assert_eq!(copy.source(), Path::new("node_modules/alpinejs/dist/cdn.js"));
        assert_eq!(copy.dest(), Path::new("js/alpine.js"));
    }

    #[test]
    fn keeps_plain_paths() {
        let copy = PassthroughCopy::new("images", "images");

        assert_eq!(copy.source(), Path::new("images"));
        assert_eq!(copy.dest(), Path::new("images"));
    }
}
