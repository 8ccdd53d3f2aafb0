use std::path::PathBuf;
use thiserror::Error;

/// Exit code used when a required path or program cannot be found.
pub const EXIT_NOT_FOUND: i32 = 127;
/// Exit code used when the application could not be started.
pub const EXIT_CANNOT_EXECUTE: i32 = 126;
/// Exit code used for an invalid configuration file (sysexits `EX_CONFIG`).
pub const EXIT_CONFIG: i32 = 78;
/// Exit code for internal failures (sysexits `EX_SOFTWARE`).
pub const EXIT_INTERNAL: i32 = 70;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Virtual environment was not activated: {sentinel} is empty or unset")]
    ActivationFailed { sentinel: String },

    #[error("Application root not found: {}", .0.display())]
    AppRootMissing(PathBuf),

    #[error("Activation artifact not found: {}", .0.display())]
    ActivationArtifactMissing(PathBuf),

    #[error("Entry point not found: {}", .0.display())]
    EntryPointMissing(PathBuf),

    #[error("Interpreter '{0}' not found in the activated environment")]
    InterpreterNotFound(String),

    #[error("Failed to start {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LauncherError {
    /// Process exit code reported for this error at the binary boundary.
    pub fn exit_code(&self) -> i32 {
        match self {
            LauncherError::ActivationFailed { .. } => 1,
            LauncherError::AppRootMissing(_)
            | LauncherError::ActivationArtifactMissing(_)
            | LauncherError::EntryPointMissing(_)
            | LauncherError::InterpreterNotFound(_) => EXIT_NOT_FOUND,
            LauncherError::SpawnFailed { .. } => EXIT_CANNOT_EXECUTE,
            LauncherError::Config(_) | LauncherError::Toml(_) => EXIT_CONFIG,
            LauncherError::Io(_) | LauncherError::Other(_) => EXIT_INTERNAL,
        }
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_failure_maps_to_one() {
        let err = LauncherError::ActivationFailed {
            sentinel: "VIRTUAL_ENV".to_string(),
        };
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("VIRTUAL_ENV"));
    }

    #[test]
    fn missing_paths_map_to_not_found() {
        let paths = [
            LauncherError::AppRootMissing(PathBuf::from("/nope")),
            LauncherError::ActivationArtifactMissing(PathBuf::from("/nope/.venv/bin/activate")),
            LauncherError::EntryPointMissing(PathBuf::from("/nope/src/main.py")),
            LauncherError::InterpreterNotFound("python".to_string()),
        ];
        for err in paths {
            assert_eq!(err.exit_code(), EXIT_NOT_FOUND, "{}", err);
        }
    }

    #[test]
    fn config_errors_are_distinct_from_activation() {
        let err = LauncherError::Config("bad".to_string());
        assert_eq!(err.exit_code(), EXIT_CONFIG);
        assert_ne!(err.exit_code(), 1);
    }
}
