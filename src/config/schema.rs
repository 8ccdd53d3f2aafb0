use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Application root used when no configuration file overrides it.
#[cfg(not(windows))]
pub const DEFAULT_APP_ROOT: &str = "/opt/venv-launcher/app";
#[cfg(windows)]
pub const DEFAULT_APP_ROOT: &str = "C:\\venv-launcher\\app";

pub const DEFAULT_SENTINEL: &str = "VIRTUAL_ENV";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LauncherConfig {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub activation: ActivationConfig,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_app_root")]
    pub root: String,
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
    /// Program used to run the entry point. Empty runs the entry point directly.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            root: default_app_root(),
            entry_point: default_entry_point(),
            interpreter: default_interpreter(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActivationConfig {
    #[serde(default)]
    pub mode: ActivationMode,
    #[serde(default = "default_activation_script")]
    pub script: String,
    #[serde(default = "default_venv_dir")]
    pub venv: String,
    #[serde(default = "default_sentinel")]
    pub sentinel: String,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            mode: ActivationMode::default(),
            script: default_activation_script(),
            venv: default_venv_dir(),
            sentinel: default_sentinel(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivationMode {
    /// Run the activation script in a child shell and capture the environment it leaves.
    #[default]
    Source,
    /// Derive the environment from the virtualenv layout without running any script.
    Direct,
}

impl ActivationMode {
    pub fn to_str(&self) -> &str {
        match self {
            ActivationMode::Source => "source",
            ActivationMode::Direct => "direct",
        }
    }
}

fn default_app_name() -> String {
    "application".to_string()
}

fn default_app_root() -> String {
    DEFAULT_APP_ROOT.to_string()
}

fn default_entry_point() -> String {
    "src/main.py".to_string()
}

fn default_interpreter() -> String {
    "python".to_string()
}

fn default_activation_script() -> String {
    if cfg!(windows) {
        ".venv\\Scripts\\activate.bat".to_string()
    } else {
        ".venv/bin/activate".to_string()
    }
}

fn default_venv_dir() -> String {
    ".venv".to_string()
}

fn default_sentinel() -> String {
    DEFAULT_SENTINEL.to_string()
}
