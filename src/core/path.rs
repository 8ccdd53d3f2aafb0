use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Joins `configured` to `base_dir` unless it is already absolute.
pub fn resolve_path(base_dir: &Path, configured: &str) -> PathBuf {
    let path = PathBuf::from(configured);
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

/// Looks a program up the way a shell would, but against an explicit `PATH` value.
///
/// Names containing a path separator are not searched; they are resolved against
/// `base_dir` and returned only if they exist.
pub fn find_executable(name: &str, path_var: Option<&OsStr>, base_dir: &Path) -> Option<PathBuf> {
    if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
        let candidate = resolve_path(base_dir, name);
        return is_executable(&candidate).then_some(candidate);
    }

    let path_var = path_var?;
    for dir in std::env::split_paths(path_var) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        for candidate in executable_candidates(&dir, name) {
            if is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }

    None
}

#[cfg(windows)]
fn executable_candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    if Path::new(name).extension().is_some() {
        return vec![dir.join(name)];
    }
    vec![
        dir.join(format!("{}.exe", name)),
        dir.join(format!("{}.cmd", name)),
        dir.join(format!("{}.bat", name)),
    ]
}

#[cfg(not(windows))]
fn executable_candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![dir.join(name)]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
