//! Development server command.

use std::path::PathBuf;

use anyhow::Result;
use tailor_server::{DevServer, DevServerConfig};

use crate::config::ProjectConfig;

/// Command-line values that take precedence over tailor.toml.
#[derive(Debug, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub open: Option<bool>,
    pub production: bool,
}

/// Run the dev server.
pub async fn run(root: PathBuf, overrides: Overrides) -> Result<()> {
    let project = ProjectConfig::load(&root)?;
    let config = server_config(root, &project, overrides);

    tracing::info!("Starting development server on port {}", config.port);

    DevServer::new(config).start().await?;

    Ok(())
}

fn server_config(root: PathBuf, project: &ProjectConfig, overrides: Overrides) -> DevServerConfig {
    DevServerConfig {
        mode: project.build_mode(overrides.production),
        port: overrides.port.unwrap_or(project.serve.port),
        host: overrides
            .host
            .unwrap_or_else(|| project.serve.host.clone()),
        open: overrides.open.unwrap_or(project.serve.open),
        root,
    }
}
