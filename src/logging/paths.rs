//! Where log files live.
use std::path::PathBuf;

const APP_DIR: &str = "gitlab-enforcer";

/// `$XDG_CACHE_HOME` when set and non-empty, else `<home>/.cache`, else
/// `./.cache`.
fn cache_root(xdg_cache: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    xdg_cache
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| home.unwrap_or_else(|| PathBuf::from(".")).join(".cache"))
}

/// Log file for `command`, creating its directory on the way.
///
/// Returns `None` if the directory cannot be created; logging then stays
/// console-only.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from);
    let dir = cache_root(std::env::var_os("XDG_CACHE_HOME").map(PathBuf::from), home).join(APP_DIR);
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}
