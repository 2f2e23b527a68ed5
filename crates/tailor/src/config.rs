//! Project configuration file (tailor.toml).

use std::ffi::OsString;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tailor_config::BuildMode;

pub const CONFIG_FILE: &str = "tailor.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub build: BuildSettings,
    pub serve: ServeSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Build for production unless overridden
    pub production: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServeSettings {
    pub host: String,
    pub port: u16,
    pub open: bool,
}

impl Default for ServeSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            open: true,
        }
    }
}

impl ProjectConfig {
    /// Load `tailor.toml` from `root`, falling back to defaults when absent.
    /// Returns an error if the file exists but is malformed.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve the build mode: the CLI flag wins, then `TAILOR_PRODUCTION`
    /// when set, then `[build] production`.
    pub fn build_mode(&self, production_flag: bool) -> BuildMode {
        self.resolve_mode(production_flag, std::env::var_os(BuildMode::ENV_VAR))
    }

    fn resolve_mode(&self, production_flag: bool, env: Option<OsString>) -> BuildMode {
        if production_flag {
            BuildMode::Production
        } else if env.is_some() {
            BuildMode::from_flag(env.as_deref())
        } else if self.build.production {
            BuildMode::Production
        } else {
            BuildMode::Development
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn defaults_without_file() {
        let temp = tempdir().unwrap();

        let config = ProjectConfig::load(temp.path()).unwrap();

        assert!(!config.build.production);
        assert_eq!(config.serve.host, "127.0.0.1");
        assert_eq!(config.serve.port, 8080);
        assert!(config.serve.open);
    }

    #[test]
    fn reads_partial_file() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            "[build]\nproduction = true\n\n[serve]\nport = 3000\n",
        )
        .unwrap();

        let config = ProjectConfig::load(temp.path()).unwrap();

        assert!(config.build.production);
        assert_eq!(config.serve.port, 3000);
        assert_eq!(config.serve.host, "127.0.0.1");
    }

    #[test]
    fn rejects_malformed_file() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "[serve]\nport = \"x\"\n").unwrap();

        let err = ProjectConfig::load(temp.path()).unwrap_err();

        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn flag_overrides_env_and_file() {
        let config = ProjectConfig::default();

        assert_eq!(
            config.resolve_mode(true, Some(OsString::new())),
            BuildMode::Production
        );
    }

    #[test]
    fn env_overrides_file_when_set() {
        let mut config = ProjectConfig::default();
        config.build.production = true;

        assert_eq!(
            config.resolve_mode(false, Some(OsString::new())),
            BuildMode::Development
        );
        assert_eq!(
            config.resolve_mode(false, Some(OsString::from("1"))),
            BuildMode::Production
        );
        assert_eq!(config.resolve_mode(false, None), BuildMode::Production);
    }

    #[test]
    fn defaults_to_development() {
        assert_eq!(
            ProjectConfig::default().resolve_mode(false, None),
            BuildMode::Development
        );
    }
}
