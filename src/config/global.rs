use crate::config::schema::LauncherConfig;
use crate::config::validation::validate_config;
use crate::core::error::Result;
use anyhow::Context;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tokio::fs;

const CONFIG_FILE: &str = "config.toml";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "VENV_LAUNCHER_CONFIG";

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let config_path = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => Self::get_config_dir().join(CONFIG_FILE),
        };

        Ok(Self { config_path })
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    fn get_config_dir() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("com", "venv-launcher", "venv-launcher") {
            proj_dirs.config_dir().to_path_buf()
        } else {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".venv-launcher")
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Loads the configuration, falling back to the built-in defaults when no file exists.
    pub async fn load(&self) -> Result<LauncherConfig> {
        let config = if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)
                .await
                .with_context(|| format!("failed to read {}", self.config_path.display()))?;
            toml::from_str(&content)?
        } else {
            LauncherConfig::default()
        };

        validate_config(&config)?;
        Ok(config)
    }
}
