//! Verbatim copying of passthrough files.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use tailor_config::PassthroughCopy;

use crate::builder::BuildError;

/// Copy every passthrough entry from `root` into `output_dir`.
///
/// Directories are copied recursively. Sources that do not exist are
/// skipped with a warning. Returns the number of files copied.
pub fn copy_passthrough(
    copies: &[PassthroughCopy],
    root: &Path,
    output_dir: &Path,
) -> Result<usize, BuildError> {
    let mut copied = 0;

    for copy in copies {
        let source = root.join(copy.source());
        let dest = output_dir.join(copy.dest());

        if source.is_file() {
            copy_file(&source, &dest)?;
            copied += 1;
        } else if source.is_dir() {
            for entry in WalkDir::new(&source)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry.path().strip_prefix(&source).unwrap_or(entry.path());
                copy_file(entry.path(), &dest.join(relative))?;
                copied += 1;
            }
        } else {
            tracing::warn!("Passthrough source not found: {}", source.display());
        }
    }

    Ok(copied)
}

fn copy_file(from: &Path, to: &Path) -> Result<(), BuildError> {
    let copy_error = |e: std::io::Error| BuildError::CopyError {
        from: from.display().to_string(),
        to: to.display().to_string(),
        message: e.to_string(),
    };

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(copy_error)?;
    }
    fs::copy(from, to).map_err(copy_error)?;

    Ok(())
}
