//! Metadata read from a directory of per-key files.
//!
//! Layout mirrors the metadata endpoint paths:
//!
//! ```text
//! <root>/instance-id        (required)
//! <root>/ami-launch-index   (optional)
//! <root>/user-data          (optional)
//! ```

use super::{InstanceMetadata, MetadataSource, parse_launch_index};
use firstboot_shared::errors::{FirstbootError, FirstbootResult};
use std::io::ErrorKind;
use std::path::PathBuf;

pub const INSTANCE_ID_FILE: &str = "instance-id";
pub const LAUNCH_INDEX_FILE: &str = "ami-launch-index";
pub const USER_DATA_FILE: &str = "user-data";

#[derive(Debug, Clone)]
pub struct MetadataDir {
    root: PathBuf,
}

impl MetadataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Read an optional file; a missing file is `None`.
    fn read_optional(&self, name: &str) -> std::io::Result<Option<Vec<u8>>> {
        match std::fs::read(self.root.join(name)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn read_instance_id(&self) -> FirstbootResult<String> {
        let path = self.root.join(INSTANCE_ID_FILE);
        let unavailable = |reason: String| {
            FirstbootError::MetadataUnavailable(format!("{}: {}", path.display(), reason))
        };

        let raw = self
            .read_optional(INSTANCE_ID_FILE)
            .map_err(|e| unavailable(format!("failed to read: {}", e)))?
            .ok_or_else(|| unavailable("no instance id".to_string()))?;
        let id = String::from_utf8(raw).map_err(|e| unavailable(e.to_string()))?;

        let id = id.trim();
        if id.is_empty() {
            return Err(unavailable("no instance id".to_string()));
        }
        Ok(id.to_string())
    }

    /// User-data is opaque bytes; anything that is not readable UTF-8 text
    /// is logged and treated as absent.
    fn read_user_data(&self) -> Option<String> {
        let raw = match self.read_optional(USER_DATA_FILE) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(root = %self.root.display(), error = %e, "Failed to read user data, ignoring it");
                return None;
            }
        };

        String::from_utf8(raw)
            .inspect_err(|e| {
                tracing::warn!(
                    root = %self.root.display(),
                    bytes = e.as_bytes().len(),
                    "User data is not UTF-8 text, ignoring it"
                )
            })
            .ok()
    }
}

impl MetadataSource for MetadataDir {
    fn fetch(&self) -> FirstbootResult<InstanceMetadata> {
        let instance_id = self.read_instance_id()?;

        let launch_index = match self.read_optional(LAUNCH_INDEX_FILE) {
            Ok(raw) => raw.and_then(|raw| parse_launch_index(&String::from_utf8_lossy(&raw))),
            Err(e) => {
                tracing::warn!(root = %self.root.display(), error = %e, "Failed to read launch index");
                None
            }
        };
        let user_data = self.read_user_data();

        tracing::debug!(
            root = %self.root.display(),
            instance_id = %instance_id,
            launch_index = ?launch_index,
            has_user_data = user_data.is_some(),
            "Read instance metadata directory"
        );

        Ok(InstanceMetadata {
            instance_id,
            launch_index,
            user_data,
        })
    }

    fn describe(&self) -> String {
        format!("dir:{}", self.root.display())
    }
}
