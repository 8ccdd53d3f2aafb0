pub mod banner;

use crate::config::LauncherConfig;
use crate::core::error::{LauncherError, Result};
use crate::python::{AppExecutor, EnvironmentResolver};
use std::io::Write;
use tracing::{debug, warn};

/// How a launch that reached the application ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    Succeeded,
    ChildFailed { code: i32 },
}

impl LaunchOutcome {
    pub fn from_exit_code(code: i32) -> Self {
        if code == 0 {
            LaunchOutcome::Succeeded
        } else {
            LaunchOutcome::ChildFailed { code }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchOutcome::Succeeded => 0,
            LaunchOutcome::ChildFailed { code } => *code,
        }
    }
}

pub struct Launcher {
    config: LauncherConfig,
}

impl Launcher {
    pub fn new(config: LauncherConfig) -> Self {
        Self { config }
    }

    /// Activates the environment, runs the application once and reports how it ended.
    ///
    /// Status banners go to `out`. The application is never started when the
    /// sentinel variable is empty after activation.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<LaunchOutcome> {
        let resolver = EnvironmentResolver::new(&self.config);
        banner::header(out, &self.config.app.name, resolver.app_root())?;

        let env = resolver.resolve().await?;

        let sentinel = &self.config.activation.sentinel;
        let Some(venv) = env.sentinel_value(sentinel) else {
            banner::activation_failed(out, sentinel)?;
            out.flush()?;
            return Err(LauncherError::ActivationFailed {
                sentinel: sentinel.clone(),
            });
        };
        banner::activation_ok(out, &venv)?;

        let executor = AppExecutor::new(&self.config);
        banner::launching(out, executor.entry_point())?;
        // The child shares our stdout; everything so far must land before its output.
        out.flush()?;

        let code = executor.run(&env).await?;
        let outcome = LaunchOutcome::from_exit_code(code);
        debug!(?outcome, "launch finished");

        // The child's status wins over a stdout that went away while it ran.
        if let Err(e) = banner::summary(out, &outcome).and_then(|_| out.flush()) {
            warn!(error = %e, "failed to write launch summary");
        }
        Ok(outcome)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;

    const SENTINEL: &str = "VENV_LAUNCHER_TEST_SENTINEL";

    fn write_app(root: &Path, activate: Option<&str>, entry: &str) -> LauncherConfig {
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(root.join("src/main.py"), entry).unwrap();
        if let Some(body) = activate {
            std::fs::create_dir_all(root.join(".venv/bin")).unwrap();
            std::fs::write(root.join(".venv/bin/activate"), body).unwrap();
        }

        let mut config = LauncherConfig::default();
        config.app.name = "fixture".to_string();
        config.app.root = root.display().to_string();
        config.app.interpreter = "sh".to_string();
        config.activation.sentinel = SENTINEL.to_string();
        config
    }

    fn sets_sentinel(value: &str) -> String {
        format!("{}=\"{}\"\nexport {}\n", SENTINEL, value, SENTINEL)
    }

    async fn launch(config: LauncherConfig) -> (Result<LaunchOutcome>, String) {
        let mut out = Vec::new();
        let result = Launcher::new(config).run(&mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn successful_child_reports_success() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_app(dir.path(), Some(&sets_sentinel("1")), "exit 0\n");

        let (result, out) = launch(config).await;
        let outcome = result.unwrap();
        assert_eq!(outcome, LaunchOutcome::Succeeded);
        assert_eq!(outcome.exit_code(), 0);
        assert!(out.contains("Virtual environment activated"), "{}", out);
        assert!(out.contains("Application exited successfully"), "{}", out);
    }

    #[tokio::test]
    async fn empty_sentinel_aborts_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_app(dir.path(), Some(&sets_sentinel("")), "touch spawned\n");

        let (result, out) = launch(config).await;
        let err = result.unwrap_err();
        assert!(matches!(err, LauncherError::ActivationFailed { .. }), "{}", err);
        assert_eq!(err.exit_code(), 1);
        assert!(out.contains("could not be activated"), "{}", out);
        assert!(!out.contains("Launching"), "{}", out);
        assert!(!dir.path().join("spawned").exists());
    }

    #[tokio::test]
    async fn failing_child_code_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_app(dir.path(), Some(&sets_sentinel("1")), "exit 42\n");

        let (result, out) = launch(config).await;
        let outcome = result.unwrap();
        assert_eq!(outcome, LaunchOutcome::ChildFailed { code: 42 });
        assert_eq!(outcome.exit_code(), 42);
        assert!(out.contains("42"), "{}", out);
    }

    #[tokio::test]
    async fn missing_activation_artifact_is_nonzero() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_app(dir.path(), None, "touch spawned\n");

        let (result, _) = launch(config).await;
        let err = result.unwrap_err();
        assert!(
            matches!(err, LauncherError::ActivationArtifactMissing(_)),
            "{}",
            err
        );
        assert_ne!(err.exit_code(), 0);
        assert!(!dir.path().join("spawned").exists());
    }

    #[tokio::test]
    async fn missing_entry_point_is_nonzero() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_app(dir.path(), Some(&sets_sentinel("1")), "");
        std::fs::remove_file(dir.path().join("src/main.py")).unwrap();

        let (result, _) = launch(config).await;
        let err = result.unwrap_err();
        assert!(matches!(err, LauncherError::EntryPointMissing(_)), "{}", err);
        assert_ne!(err.exit_code(), 0);
    }

    #[tokio::test]
    async fn child_runs_in_application_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_app(dir.path(), Some(&sets_sentinel("1")), "pwd -P > cwd.txt\n");

        let (result, _) = launch(config).await;
        assert_eq!(result.unwrap(), LaunchOutcome::Succeeded);

        let recorded = std::fs::read_to_string(dir.path().join("cwd.txt")).unwrap();
        assert_eq!(
            Path::new(recorded.trim()),
            dir.path().canonicalize().unwrap()
        );
    }

    /// Accepts writes until flushed after the launch banner, then fails like a closed pipe.
    #[derive(Default)]
    struct ClosesAfterLaunch {
        buf: Vec<u8>,
        closed: bool,
    }

    impl Write for ClosesAfterLaunch {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            if self.closed {
                return Err(io::Error::from(io::ErrorKind::BrokenPipe));
            }
            self.buf.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            if String::from_utf8_lossy(&self.buf).contains("Launching") {
                self.closed = true;
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn child_status_survives_closed_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_app(dir.path(), Some(&sets_sentinel("1")), "exit 42\n");

        let mut out = ClosesAfterLaunch::default();
        let outcome = Launcher::new(config).run(&mut out).await.unwrap();
        assert_eq!(outcome.exit_code(), 42);
        assert!(out.closed);
    }

    #[tokio::test]
    async fn interrupt_during_run_relays_clean_exit() {
        let dir = tempfile::tempdir().unwrap();
        let entry = "trap 'exit 0' INT\nkill -INT $PPID\nkill -INT $$\nsleep 5\nexit 7\n";
        let config = write_app(dir.path(), Some(&sets_sentinel("1")), entry);

        let (result, out) = launch(config).await;
        let outcome = result.unwrap();
        assert_eq!(outcome, LaunchOutcome::Succeeded);
        assert_eq!(outcome.exit_code(), 0);
        assert!(out.contains("Application exited successfully"), "{}", out);
    }

    #[tokio::test]
    async fn plain_assignment_in_activation_script_activates() {
        let dir = tempfile::tempdir().unwrap();
        let activate = format!("{}=1\n", SENTINEL);
        let config = write_app(dir.path(), Some(&activate), "exit 0\n");

        let (result, out) = launch(config).await;
        assert_eq!(result.unwrap(), LaunchOutcome::Succeeded);
        assert!(out.contains("Virtual environment activated"), "{}", out);
    }

    #[tokio::test]
    async fn activation_state_reaches_the_child() {
        let dir = tempfile::tempdir().unwrap();
        let activate = format!("{}export APP_MODE=robot\n", sets_sentinel("ready"));
        let entry = format!(
            "[ \"${}\" = ready ] && [ \"$APP_MODE\" = robot ]\n",
            SENTINEL
        );
        let config = write_app(dir.path(), Some(&activate), &entry);

        let (result, _) = launch(config).await;
        assert_eq!(result.unwrap(), LaunchOutcome::Succeeded);
    }
}
