//! NFS mount resource.
//!
//! Node attributes describe NFS mounts as a map from mount target to its
//! settings:
//!
//! ```json
//! { "/home": { "owner": "root", "remote_path": "/exports/home" } }
//! ```

use super::{ParentRef, Resource, from_settings};
use firstboot_shared::errors::{FirstbootError, FirstbootResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NfsMount {
    target: String,
    owner: Option<String>,
    group: Option<String>,
    /// Full `server:path` device; overrides `remote_path`.
    device: Option<String>,
    remote_path: Option<String>,

    #[serde(skip)]
    parent: Option<ParentRef>,
}

impl Resource for NfsMount {
    const KIND: &'static str = "nfs_mount";

    const KEYS: &'static [&'static str] = &["target", "owner", "group", "device", "remote_path"];

    fn name(&self) -> Option<&str> {
        Some(self.target.as_str())
    }

    fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    fn set_parent(&mut self, parent: Option<ParentRef>) {
        self.parent = parent;
    }

    fn validate(&self) -> FirstbootResult<()> {
        if !self.target.starts_with('/') {
            return Err(FirstbootError::Config(format!(
                "nfs_mount target must be an absolute path, got: '{}'",
                self.target
            )));
        }
        Ok(())
    }
}

impl NfsMount {
    /// Build mounts from a `{ target: settings }` attribute map.
    pub fn from_attributes(parent: Option<ParentRef>, mounts: &Value) -> FirstbootResult<Vec<Self>> {
        let Value::Object(map) = mounts else {
            return Err(FirstbootError::Config(
                "nfs mounts must be a JSON object keyed by target".to_string(),
            ));
        };

        map.iter()
            .map(|(target, settings)| {
                let mut settings = settings.clone();
                match settings.as_object_mut() {
                    Some(obj) => {
                        obj.insert("target".to_string(), Value::String(target.clone()));
                    }
                    None => {
                        return Err(FirstbootError::Config(format!(
                            "nfs mount '{}' settings must be a JSON object",
                            target
                        )));
                    }
                }
                from_settings(parent.clone(), settings)
            })
            .collect()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Group owning the target directory; defaults to the owner.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref().or(self.owner())
    }

    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    pub fn remote_path(&self) -> Option<&str> {
        self.remote_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_attributes_sets_target() {
        let mounts = NfsMount::from_attributes(
            None,
            &json!({
                "/home": {"owner": "ubuntu", "remote_path": "/exports/home"},
                "/data": {"device": "10.0.0.5:/data", "group": "staff"}
            }),
        )
        .unwrap();

        assert_eq!(mounts.len(), 2);
        let home = mounts.iter().find(|m| m.target() == "/home").unwrap();
        assert_eq!(home.owner(), Some("ubuntu"));
        assert_eq!(home.group(), Some("ubuntu"));
        assert_eq!(home.remote_path(), Some("/exports/home"));

        let data = mounts.iter().find(|m| m.target() == "/data").unwrap();
        assert_eq!(data.device(), Some("10.0.0.5:/data"));
        assert_eq!(data.owner(), None);
        assert_eq!(data.group(), Some("staff"));
    }

    #[test]
    fn test_relative_target_rejected() {
        let err = from_settings::<NfsMount>(None, json!({"target": "home"})).unwrap_err();
        assert!(matches!(err, FirstbootError::Config(_)));
    }

    #[test]
    fn test_unknown_mount_key_rejected() {
        let err = NfsMount::from_attributes(None, &json!({"/home": {"fstype": "nfs4"}}))
            .unwrap_err();
        assert!(matches!(err, FirstbootError::UnrecognizedKey { kind: "nfs_mount", .. }));
    }
}
