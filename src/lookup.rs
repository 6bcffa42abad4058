//! Executable lookup on `PATH`.

use crate::error::SpawnError;
use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Resolve `command` to an executable file.
///
/// Names containing a path separator are checked as given; bare names are
/// searched for in every `PATH` entry, first match wins.
pub fn find_executable(command: &str) -> Result<PathBuf, SpawnError> {
    let path_var = env::var_os("PATH").unwrap_or_default();
    find_in(command, &path_var).ok_or_else(|| SpawnError::NotFound {
        command: command.to_string(),
        path: path_var.to_string_lossy().into_owned(),
    })
}

fn find_in(command: &str, path_var: &OsStr) -> Option<PathBuf> {
    if command.is_empty() {
        return None;
    }
    let candidate = Path::new(command);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }
    env::split_paths(path_var)
        .map(|dir| dir.join(command))
        .find(|p| is_executable(p))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
