//! Static site build command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tailor_config::SiteConfig;
use tailor_static::StaticBuilder;

use crate::config::ProjectConfig;

/// Run the build command.
pub async fn run(root: PathBuf, production: bool) -> Result<()> {
    let project = ProjectConfig::load(&root)?;
    let mode = project.build_mode(production);

    tracing::info!(
        "Building site ({})...",
        if mode.is_production() { "production" } else { "development" }
    );

    let builder = StaticBuilder::new(root, SiteConfig::load(mode));
    let result = tokio::task::spawn_blocking(move || builder.build())
        .await
        .context("Build task panicked")?
        .context("Build failed")?;

    tracing::info!(
        "Built {} pages and copied {} files in {}ms",
        result.pages,
        result.copied,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
