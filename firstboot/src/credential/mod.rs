//! Write-once files for first boot.
//!
//! A file is written at most once per machine lifetime: if it already exists
//! the call is a no-op. New contents go to a temporary file in the target
//! directory, are synced, and are then linked into place without replacing
//! anything, so readers never see a partial file. Two bootstrap processes
//! racing on the same path are not coordinated beyond that no-clobber link.

use crate::constants::modes;
use firstboot_shared::errors::{FirstbootError, FirstbootResult};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs::Permissions;
use std::io::{ErrorKind, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Outcome of a write-once request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteResult {
    Written,
    AlreadyPresent,
}

/// Persist the validation credential unless one already exists.
///
/// The file is created with owner-only permissions.
pub fn ensure_credential(path: &Path, payload: &[u8]) -> FirstbootResult<WriteResult> {
    let result = write_once(path, payload, modes::CREDENTIAL)?;
    match result {
        WriteResult::Written => tracing::info!(
            path = %path.display(),
            fingerprint = %fingerprint(payload),
            "Wrote validation credential"
        ),
        WriteResult::AlreadyPresent => {
            tracing::debug!(path = %path.display(), "Validation credential already present")
        }
    }
    Ok(result)
}

/// Persist node attributes as pretty-printed JSON unless the file exists.
pub fn ensure_attributes_file(path: &Path, attributes: &Value) -> FirstbootResult<WriteResult> {
    let mut contents = serde_json::to_vec_pretty(attributes)?;
    contents.push(b'\n');
    let result = write_once(path, &contents, modes::ATTRIBUTES)?;
    tracing::debug!(path = %path.display(), result = ?result, "Ensured attributes file");
    Ok(result)
}

/// Short SHA-256 fingerprint for log lines; the credential itself is never logged.
pub fn fingerprint(payload: &[u8]) -> String {
    let digest = Sha256::digest(payload);
    hex::encode(&digest[..8])
}

fn write_once(path: &Path, contents: &[u8], mode: u32) -> FirstbootResult<WriteResult> {
    if path.try_exists()? {
        return Ok(WriteResult::AlreadyPresent);
    }

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| {
        FirstbootError::Storage(format!("Failed to create directory {}: {}", dir.display(), e))
    })?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".firstboot-")
        .tempfile_in(dir)
        .map_err(|e| {
            FirstbootError::Storage(format!(
                "Failed to create temporary file in {}: {}",
                dir.display(),
                e
            ))
        })?;

    std::fs::set_permissions(tmp.path(), Permissions::from_mode(mode))?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;

    match tmp.persist_noclobber(path) {
        Ok(_) => {
            sync_dir(dir)?;
            Ok(WriteResult::Written)
        }
        // Lost a race with another writer; the temporary file is removed on drop.
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(WriteResult::AlreadyPresent),
        Err(e) => Err(FirstbootError::Storage(format!(
            "Failed to persist {}: {}",
            path.display(),
            e.error
        ))),
    }
}

/// Flush directory entries so a new link survives power loss.
fn sync_dir(dir: &Path) -> FirstbootResult<()> {
    std::fs::File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| FirstbootError::Storage(format!("Failed to sync directory {}: {}", dir.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_second_write_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("validation.pem");

        assert_eq!(ensure_credential(&path, b"first").unwrap(), WriteResult::Written);
        assert_eq!(
            ensure_credential(&path, b"second").unwrap(),
            WriteResult::AlreadyPresent
        );
        assert_eq!(std::fs::read(&path).unwrap(), b"first");
    }

    #[test]
    fn test_credential_is_owner_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("validation.pem");
        ensure_credential(&path, b"key").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_creates_missing_directories_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("etc/chef/validation.pem");
        ensure_credential(&path, b"key").unwrap();

        let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("validation.pem")]);
    }

    #[test]
    fn test_attributes_file_pretty_printed_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("client-config.json");

        let attrs = json!({"run_list": ["role[base]"]});
        assert_eq!(ensure_attributes_file(&path, &attrs).unwrap(), WriteResult::Written);
        assert_eq!(
            ensure_attributes_file(&path, &json!({"other": 1})).unwrap(),
            WriteResult::AlreadyPresent
        );

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  \"run_list\""));
        let parsed: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, attrs);
    }

    #[test]
    fn test_sync_dir() {
        let dir = TempDir::new().unwrap();
        sync_dir(dir.path()).unwrap();

        let err = sync_dir(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, FirstbootError::Storage(_)));
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        assert_eq!(fingerprint(b"abc"), fingerprint(b"abc"));
        assert_ne!(fingerprint(b"abc"), fingerprint(b"abd"));
        assert_eq!(fingerprint(b"abc").len(), 16);
    }
}
