use crate::config::schema::LauncherConfig;
use crate::core::error::{LauncherError, Result};
use std::path::Path;

pub fn validate_config(config: &LauncherConfig) -> Result<()> {
    if config.app.root.trim().is_empty() {
        return Err(LauncherError::Config("app.root cannot be empty".to_string()));
    }

    if !Path::new(&config.app.root).is_absolute() {
        return Err(LauncherError::Config(format!(
            "app.root must be an absolute path, got '{}'",
            config.app.root
        )));
    }

    if config.app.entry_point.trim().is_empty() {
        return Err(LauncherError::Config(
            "app.entry_point cannot be empty".to_string(),
        ));
    }

    if config.activation.script.trim().is_empty() {
        return Err(LauncherError::Config(
            "activation.script cannot be empty".to_string(),
        ));
    }

    if config.activation.venv.trim().is_empty() {
        return Err(LauncherError::Config(
            "activation.venv cannot be empty".to_string(),
        ));
    }

    validate_shell_identifier("activation.sentinel", &config.activation.sentinel)?;

    for key in config.environment.keys() {
        validate_variable_name("environment", key)?;
    }

    Ok(())
}

fn validate_variable_name(field: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(LauncherError::Config(format!(
            "{} cannot contain an empty variable name",
            field
        )));
    }

    if name.contains('=') || name.contains('\0') {
        return Err(LauncherError::Config(format!(
            "{}: invalid variable name '{}'",
            field, name
        )));
    }

    Ok(())
}

/// The sentinel is exported by name inside the activation shell.
fn validate_shell_identifier(field: &str, name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid {
        return Err(LauncherError::Config(format!(
            "{} must be a shell variable name (letters, digits, _), got '{}'",
            field, name
        )));
    }

    Ok(())
}
