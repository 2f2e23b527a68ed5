//! Theme description command.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tailor_config::ThemeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeFormat {
    /// The theme configuration as JSON
    Json,
    /// Custom properties, keyframes and utility classes
    Css,
}

/// Run the theme command.
pub fn run(format: ThemeFormat, minify: bool, output: Option<PathBuf>) -> Result<()> {
    let rendered = render(&ThemeConfig::site(), format, minify)?;

    match output {
        Some(path) => {
            fs::write(&path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote theme to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}

fn render(theme: &ThemeConfig, format: ThemeFormat, minify: bool) -> Result<String> {
    match format {
        ThemeFormat::Json => theme.to_json().context("Failed to serialize theme"),
        ThemeFormat::Css if minify => theme.to_css_minified().context("Failed to minify theme CSS"),
        ThemeFormat::Css => Ok(theme.to_css()),
    }
}
