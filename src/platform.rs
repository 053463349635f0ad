use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

const APP_DIR: &str = "instamojo";

/// Resolve the per-user data directory from environment lookups.
///
/// `XDG_DATA_HOME` wins everywhere; otherwise the home directory's
/// platform-conventional data location is used.
fn resolve_data_dir(var: impl Fn(&str) -> Option<String>, macos: bool) -> Option<PathBuf> {
    if let Some(xdg) = var("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(xdg).join(APP_DIR));
    }

    let home = var("HOME").or_else(|| var("USERPROFILE")).map(PathBuf::from)?;
    let base = if macos {
        home.join("Library").join("Application Support")
    } else {
        home.join(".local").join("share")
    };
    Some(base.join(APP_DIR))
}

/// Directory holding the token file and `config.toml`.
pub fn data_dir() -> Result<PathBuf> {
    resolve_data_dir(|key| env::var(key).ok(), cfg!(target_os = "macos"))
        .context("Cannot determine data directory: neither XDG_DATA_HOME nor HOME is set")
}
