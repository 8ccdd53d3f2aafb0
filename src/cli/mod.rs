use crate::config::ConfigManager;
use crate::core::error::{LauncherError, Result};
use crate::launcher::{LaunchOutcome, Launcher};
use clap::Parser;
use colored::Colorize;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "venv-launcher",
    version,
    about = "Activate an application's virtual environment and run it, relaying its exit code",
    long_about = None
)]
pub struct Cli {}

/// Runs one launch and returns the exit code the process should terminate with.
pub async fn run(_cli: Cli) -> i32 {
    match launch().await {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            // The activation failure already has its banner on stdout.
            if !matches!(e, LauncherError::ActivationFailed { .. }) {
                eprintln!("{} {}", "Error:".red().bold(), e);
            }
            e.exit_code()
        }
    }
}

async fn launch() -> Result<LaunchOutcome> {
    let manager = ConfigManager::new()?;
    debug!(path = %manager.config_path().display(), "loading configuration");
    let config = manager.load().await?;

    let mut stdout = std::io::stdout();
    Launcher::new(config).run(&mut stdout).await
}
