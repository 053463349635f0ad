//! Token persistence.
//!
//! The token file holds a single JSON value: the token string, or `null`
//! once the session has been revoked.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, warn};

use super::{ApiError, ApiResult};

/// Write `token` to `path`, replacing any previous file.
pub(crate) fn save(path: &Path, token: Option<&str>) -> ApiResult<()> {
    let persistence = |source: std::io::Error| ApiError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(persistence)?;
    }

    let content = serde_json::to_string(&token).map_err(|e| persistence(e.into()))?;

    // Write to temp file first for atomic operation
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, &content).map_err(persistence)?;

    // The file holds a bearer credential: owner read/write only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600)).map_err(persistence)?;
    }

    fs::rename(&temp_path, path).map_err(persistence)?;

    debug!(
        "Saved {} to {}",
        if token.is_some() { "token" } else { "empty session" },
        path.display()
    );
    Ok(())
}

/// Read a token from `path`.
///
/// Returns `Ok(None)` when the file cannot be opened and `strict` is off.
/// Otherwise returns the stored value, which is itself `None` for a file
/// containing `null`.
pub(crate) fn load(path: &Path, strict: bool) -> ApiResult<Option<Option<String>>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(source) if strict => {
            return Err(ApiError::TokenLoad {
                path: path.to_path_buf(),
                source,
            });
        }
        Err(e) => {
            if e.kind() == ErrorKind::NotFound {
                debug!("No token file at {}", path.display());
            } else {
                warn!("Unable to open file for loading token: {}: {}", path.display(), e);
            }
            return Ok(None);
        }
    };

    let token: Option<String> =
        serde_json::from_str(&content).map_err(|e| ApiError::TokenFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    debug!(
        "Loaded {} from {}",
        if token.is_some() { "token" } else { "empty session" },
        path.display()
    );
    Ok(Some(token))
}
