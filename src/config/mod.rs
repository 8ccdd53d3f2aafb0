pub mod global;
pub mod schema;
pub mod validation;

pub use global::{ConfigManager, CONFIG_PATH_ENV};
pub use schema::{
    ActivationConfig, ActivationMode, AppConfig, LauncherConfig, DEFAULT_APP_ROOT,
    DEFAULT_SENTINEL,
};
pub use validation::validate_config;
