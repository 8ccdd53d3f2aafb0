use crate::config::LauncherConfig;
use crate::core::error::{LauncherError, Result};
use crate::core::{exit_code_of, find_executable, resolve_path, InterruptGuard};
use crate::python::activation::ActivatedEnv;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs the application entry point inside an activated environment.
pub struct AppExecutor {
    app_root: PathBuf,
    entry_point: PathBuf,
    interpreter: Option<String>,
    args: Vec<String>,
    overrides: BTreeMap<String, String>,
}

impl AppExecutor {
    pub fn new(config: &LauncherConfig) -> Self {
        let app_root = PathBuf::from(&config.app.root);
        let entry_point = resolve_path(&app_root, &config.app.entry_point);
        let interpreter = Some(config.app.interpreter.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self {
            app_root,
            entry_point,
            interpreter,
            args: config.app.args.clone(),
            overrides: config.environment.clone(),
        }
    }

    pub fn entry_point(&self) -> &Path {
        &self.entry_point
    }

    /// Resolves the program to spawn and its arguments against `env`.
    pub fn command_line(&self, env: &ActivatedEnv) -> Result<(PathBuf, Vec<OsString>)> {
        if !self.entry_point.is_file() {
            return Err(LauncherError::EntryPointMissing(self.entry_point.clone()));
        }

        let extra = self.args.iter().map(OsString::from);

        match &self.interpreter {
            Some(interpreter) => {
                let program = find_executable(interpreter, env.path_var(), &self.app_root)
                    .ok_or_else(|| LauncherError::InterpreterNotFound(interpreter.clone()))?;
                let args = std::iter::once(self.entry_point.clone().into_os_string())
                    .chain(extra)
                    .collect();
                Ok((program, args))
            }
            None => Ok((self.entry_point.clone(), extra.collect())),
        }
    }

    /// Spawns the application with inherited stdio and waits for it to finish.
    pub async fn run(&self, env: &ActivatedEnv) -> Result<i32> {
        let (program, args) = self.command_line(env)?;

        debug!(
            program = %program.display(),
            cwd = %self.app_root.display(),
            "spawning application"
        );

        let mut guard = InterruptGuard::install()?;

        let mut child = Command::new(&program)
            .args(&args)
            .env_clear()
            .envs(env.vars())
            .envs(&self.overrides)
            .current_dir(&self.app_root)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| LauncherError::SpawnFailed {
                program: program.display().to_string(),
                source: e,
            })?;

        let status = guard.wait(&mut child).await?;

        let code = exit_code_of(status);
        debug!(code, "application exited");
        Ok(code)
    }
}
