// ABOUTME: JSON file persistence helpers shared by the roster, session and MFA stores
// ABOUTME: Writes go to a sibling temp file that is renamed over the target with owner-only permissions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use squad_core::errors::{AppError, AppResult};
use tokio::fs;

/// Temp-file sibling used while writing `path`
#[must_use]
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serialize `value` as pretty JSON and atomically replace `path`
///
/// Parent directories are created as needed. On unix the file is readable and
/// writable by the owner only.
///
/// # Errors
///
/// Returns a serialization error if `value` cannot be encoded, or a storage
/// error if any filesystem step fails
pub async fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> AppResult<()> {
    let json = serde_json::to_vec_pretty(value)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(|e| {
            AppError::storage(format!("cannot create {}: {e}", parent.display())).with_source(e)
        })?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, &json).await.map_err(|e| {
        AppError::storage(format!("cannot write {}: {e}", tmp.display())).with_source(e)
    })?;
    restrict_permissions(&tmp).await?;
    fs::rename(&tmp, path).await.map_err(|e| {
        AppError::storage(format!("cannot replace {}: {e}", path.display())).with_source(e)
    })
}

/// Read and decode a JSON file; a missing file is `Ok(None)`
///
/// # Errors
///
/// Returns a storage error for unreadable files and a serialization error for
/// malformed content
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<Option<T>> {
    match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            AppError::serialization(format!("malformed {}: {e}", path.display())).with_source(e)
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(
            AppError::storage(format!("cannot read {}: {e}", path.display())).with_source(e),
        ),
    }
}

/// Delete a file, returning whether it existed
///
/// # Errors
///
/// Returns a storage error for failures other than the file being absent
pub async fn remove_file(path: &Path) -> AppResult<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(
            AppError::storage(format!("cannot remove {}: {e}", path.display())).with_source(e),
        ),
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> AppResult<()> {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, Permissions::from_mode(0o600))
        .await
        .map_err(|e| {
            AppError::storage(format!("cannot chmod {}: {e}", path.display())).with_source(e)
        })
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> AppResult<()> {
    Ok(())
}
