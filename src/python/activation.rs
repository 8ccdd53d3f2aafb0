use crate::config::{ActivationMode, LauncherConfig};
use crate::core::error::{LauncherError, Result};
use crate::core::{find_executable, resolve_path};
use anyhow::anyhow;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Sources the script given as `$1`, exports the sentinel named by `$2` (a plain
/// assignment is enough under `source`), then dumps the environment NUL-separated.
/// The script's own output goes to stderr so it cannot corrupt the dump.
#[cfg(unix)]
const SOURCE_AND_DUMP: &str = r#". "$1" >&2; export "$2" 2>/dev/null; exec env -0"#;

/// The complete, explicit environment handed to the application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivatedEnv {
    vars: BTreeMap<OsString, OsString>,
}

impl ActivatedEnv {
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        let key = key.as_ref();
        self.vars.get(key).map(OsString::as_os_str).or_else(|| {
            if cfg!(windows) {
                self.find_key(key)
                    .and_then(|k| self.vars.get(&k))
                    .map(OsString::as_os_str)
            } else {
                None
            }
        })
    }

    pub fn set(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        let key = key.into();
        let key = self.find_key(&key).unwrap_or(key);
        self.vars.insert(key, value.into());
    }

    pub fn remove(&mut self, key: impl AsRef<OsStr>) -> Option<OsString> {
        let key = self.find_key(key.as_ref())?;
        self.vars.remove(&key)
    }

    /// The sentinel's value, if activation left it non-empty.
    pub fn sentinel_value(&self, sentinel: &str) -> Option<String> {
        self.get(sentinel)
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string_lossy().into_owned())
    }

    /// The activation state: whether `sentinel` holds a non-empty value.
    pub fn is_active(&self, sentinel: &str) -> bool {
        self.sentinel_value(sentinel).is_some()
    }

    pub fn path_var(&self) -> Option<&OsStr> {
        self.get("PATH")
    }

    pub fn vars(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    // Windows variable names are case-insensitive.
    fn find_key(&self, key: &OsStr) -> Option<OsString> {
        if self.vars.contains_key(key) {
            return Some(key.to_os_string());
        }
        if !cfg!(windows) {
            return None;
        }
        let wanted = key.to_string_lossy();
        self.vars
            .keys()
            .find(|k| k.to_string_lossy().eq_ignore_ascii_case(&wanted))
            .cloned()
    }
}

/// Turns the activation configuration into an [`ActivatedEnv`] without touching
/// the launcher's own process environment.
pub struct EnvironmentResolver<'a> {
    config: &'a LauncherConfig,
    app_root: PathBuf,
}

impl<'a> EnvironmentResolver<'a> {
    pub fn new(config: &'a LauncherConfig) -> Self {
        Self {
            app_root: PathBuf::from(&config.app.root),
            config,
        }
    }

    pub fn app_root(&self) -> &Path {
        &self.app_root
    }

    pub fn venv_dir(&self) -> PathBuf {
        resolve_path(&self.app_root, &self.config.activation.venv)
    }

    /// The file whose presence proves the environment can be activated.
    pub fn activation_artifact(&self) -> PathBuf {
        match self.config.activation.mode {
            ActivationMode::Source => resolve_path(&self.app_root, &self.config.activation.script),
            ActivationMode::Direct => self.venv_dir().join("pyvenv.cfg"),
        }
    }

    pub async fn resolve(&self) -> Result<ActivatedEnv> {
        if !self.app_root.is_dir() {
            return Err(LauncherError::AppRootMissing(self.app_root.clone()));
        }

        let artifact = self.activation_artifact();
        if !artifact.is_file() {
            return Err(LauncherError::ActivationArtifactMissing(artifact));
        }

        debug!(
            mode = self.config.activation.mode.to_str(),
            artifact = %artifact.display(),
            "resolving environment"
        );

        let env = match self.config.activation.mode {
            ActivationMode::Source => self.source_script(&artifact).await?,
            ActivationMode::Direct => self.direct_env()?,
        };

        debug!(vars = env.len(), "environment resolved");
        Ok(env)
    }

    #[cfg(unix)]
    async fn source_script(&self, script: &Path) -> Result<ActivatedEnv> {
        let shell = activation_shell();
        debug!(shell = %shell.display(), "sourcing activation script");

        let output = Command::new(&shell)
            .arg("-c")
            .arg(SOURCE_AND_DUMP)
            .arg("venv-launcher")
            .arg(script)
            .arg(&self.config.activation.sentinel)
            .current_dir(&self.app_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|e| LauncherError::SpawnFailed {
                program: shell.display().to_string(),
                source: e,
            })?;

        if !output.status.success() {
            warn!(
                status = %output.status,
                script = %script.display(),
                "activation shell exited unsuccessfully"
            );
        }

        Ok(parse_env_dump(&output.stdout))
    }

    #[cfg(windows)]
    async fn source_script(&self, script: &Path) -> Result<ActivatedEnv> {
        let output = Command::new("cmd")
            .arg("/C")
            .raw_arg(format!("call \"{}\" >NUL & set", script.display()))
            .current_dir(&self.app_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|e| LauncherError::SpawnFailed {
                program: "cmd".to_string(),
                source: e,
            })?;

        if !output.status.success() {
            warn!(
                status = %output.status,
                script = %script.display(),
                "activation shell exited unsuccessfully"
            );
        }

        let text = String::from_utf8_lossy(&output.stdout);
        Ok(ActivatedEnv::from_vars(
            text.lines()
                .filter_map(|line| line.split_once('='))
                .filter(|(k, _)| !k.is_empty())
                .map(|(k, v)| (k.to_string(), v.to_string())),
        ))
    }

    fn direct_env(&self) -> Result<ActivatedEnv> {
        let venv = self.venv_dir();
        let bin_dir = if cfg!(windows) {
            venv.join("Scripts")
        } else {
            venv.join("bin")
        };

        let mut env = ActivatedEnv::from_vars(std::env::vars_os());

        let mut dirs = vec![bin_dir];
        if let Some(existing) = env.path_var() {
            dirs.extend(std::env::split_paths(existing));
        }
        let path = std::env::join_paths(dirs)
            .map_err(|e| LauncherError::Other(anyhow!("cannot build PATH: {}", e)))?;

        env.set("VIRTUAL_ENV", venv.into_os_string());
        env.set("PATH", path);
        env.remove("PYTHONHOME");

        Ok(env)
    }
}

/// `bash` when available, since activation scripts are written for `source`;
/// POSIX `sh` otherwise.
#[cfg(unix)]
fn activation_shell() -> PathBuf {
    let path = std::env::var_os("PATH");
    find_executable("bash", path.as_deref(), Path::new("/")).unwrap_or_else(|| PathBuf::from("sh"))
}

#[cfg(unix)]
fn parse_env_dump(raw: &[u8]) -> ActivatedEnv {
    use std::os::unix::ffi::OsStrExt;

    ActivatedEnv::from_vars(
        raw.split(|b| *b == 0)
            .filter_map(|entry| {
                let eq = entry.iter().position(|b| *b == b'=')?;
                if eq == 0 {
                    return None;
                }
                Some((
                    OsStr::from_bytes(&entry[..eq]).to_os_string(),
                    OsStr::from_bytes(&entry[eq + 1..]).to_os_string(),
                ))
            }),
    )
}
