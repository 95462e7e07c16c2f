//! Volume resource: internal or external block storage.
//!
//! ```json
//! { "name": "data", "device": "/dev/sdj", "mount_point": "/ebs1", "fs_type": "xfs",
//!   "mount_options": "defaults,nouuid,noatime", "size": 1024,
//!   "snapshot_id": "snap-66494a08", "tags": {}, "keep": false }
//! ```

use super::{ParentRef, Resource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What the cloud provider reports for a volume that already exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudVolume {
    pub volume_id: String,
    /// Server the volume is attached to, if any.
    pub server_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Volume {
    keep: bool,
    name: Option<String>,
    volume_id: Option<String>,
    snapshot_id: Option<String>,
    /// Size in GiB.
    size: Option<u64>,
    device: Option<String>,
    mount_point: Option<String>,
    mount_options: Option<String>,
    fs_type: Option<String>,
    availability_zone: Option<String>,
    tags: BTreeMap<String, String>,

    #[serde(skip)]
    parent: Option<ParentRef>,
    #[serde(skip)]
    cloud: Option<CloudVolume>,
}

impl Resource for Volume {
    const KIND: &'static str = "volume";

    const KEYS: &'static [&'static str] = &[
        "keep",
        "name",
        "volume_id",
        "snapshot_id",
        "size",
        "device",
        "mount_point",
        "mount_options",
        "fs_type",
        "availability_zone",
        "tags",
    ];

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    fn set_parent(&mut self, parent: Option<ParentRef>) {
        self.parent = parent;
    }
}

impl Volume {
    /// Keep the volume when the instance terminates.
    pub fn keep(&self) -> bool {
        self.keep
    }

    pub fn volume_id(&self) -> Option<&str> {
        self.volume_id.as_deref()
    }

    pub fn snapshot_id(&self) -> Option<&str> {
        self.snapshot_id.as_deref()
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    pub fn mount_point(&self) -> Option<&str> {
        self.mount_point.as_deref()
    }

    pub fn mount_options(&self) -> Option<&str> {
        self.mount_options.as_deref()
    }

    pub fn fs_type(&self) -> Option<&str> {
        self.fs_type.as_deref()
    }

    pub fn availability_zone(&self) -> Option<&str> {
        self.availability_zone.as_deref()
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn cloud(&self) -> Option<&CloudVolume> {
        self.cloud.as_ref()
    }

    /// Record the volume id once the provider has created the volume.
    pub fn set_volume_id(&mut self, volume_id: Option<String>) {
        self.volume_id = volume_id;
    }

    pub fn attach_cloud(&mut self, cloud: Option<CloudVolume>) {
        self.cloud = cloud;
    }

    /// Instance-store device, named by convention (`ephemeral0`, ...).
    pub fn is_ephemeral(&self) -> bool {
        self.volume_id().is_some_and(|id| id.starts_with("ephemeral"))
    }

    /// Snapshot given but no volume yet: the provider creates it at launch.
    pub fn create_at_launch(&self) -> bool {
        self.volume_id().is_none_or(str::is_empty)
            && self.snapshot_id().is_some_and(|id| !id.is_empty())
    }

    pub fn in_cloud(&self) -> bool {
        self.cloud.is_some()
    }

    pub fn has_server(&self) -> bool {
        self.cloud
            .as_ref()
            .and_then(|c| c.server_id.as_deref())
            .is_some_and(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{Resource, from_settings};
    use serde_json::json;

    fn volume(settings: serde_json::Value) -> Volume {
        from_settings(None, settings).unwrap()
    }

    #[test]
    fn test_absent_keys_are_none() {
        let v = volume(json!({}));
        assert_eq!(v.name(), None);
        assert_eq!(v.size(), None);
        assert!(!v.keep());
        assert!(v.tags().is_empty());
        assert_eq!(v.parent(), None);
    }

    #[test]
    fn test_accessors() {
        let v = volume(json!({
            "name": "data",
            "device": "/dev/sdj",
            "mount_point": "/ebs1",
            "fs_type": "xfs",
            "mount_options": "defaults,nouuid,noatime",
            "size": 1024,
            "availability_zone": "us-east-1d",
            "tags": {"cluster": "web"},
            "keep": true
        }));
        assert_eq!(v.name(), Some("data"));
        assert_eq!(v.device(), Some("/dev/sdj"));
        assert_eq!(v.mount_point(), Some("/ebs1"));
        assert_eq!(v.fs_type(), Some("xfs"));
        assert_eq!(v.mount_options(), Some("defaults,nouuid,noatime"));
        assert_eq!(v.size(), Some(1024));
        assert_eq!(v.availability_zone(), Some("us-east-1d"));
        assert_eq!(v.tags().get("cluster").map(String::as_str), Some("web"));
        assert!(v.keep());
    }

    #[test]
    fn test_ephemeral_predicate() {
        assert!(volume(json!({"volume_id": "ephemeral0"})).is_ephemeral());
        assert!(!volume(json!({"volume_id": "vol-ephemeral"})).is_ephemeral());
        assert!(!volume(json!({})).is_ephemeral());
    }

    #[test]
    fn test_create_at_launch_predicate() {
        assert!(volume(json!({"snapshot_id": "snap-1"})).create_at_launch());
        assert!(volume(json!({"snapshot_id": "snap-1", "volume_id": ""})).create_at_launch());
        assert!(!volume(json!({"snapshot_id": "snap-1", "volume_id": "vol-1"})).create_at_launch());
        assert!(!volume(json!({"snapshot_id": ""})).create_at_launch());
    }

    #[test]
    fn test_predicates_follow_current_state() {
        let mut v = volume(json!({"snapshot_id": "snap-1"}));
        assert!(v.create_at_launch());

        v.set_volume_id(Some("vol-123".to_string()));
        assert!(!v.create_at_launch());

        assert!(!v.in_cloud());
        v.attach_cloud(Some(CloudVolume {
            volume_id: "vol-123".to_string(),
            server_id: None,
        }));
        assert!(v.in_cloud());
        assert!(!v.has_server());

        v.attach_cloud(Some(CloudVolume {
            volume_id: "vol-123".to_string(),
            server_id: Some("i-1".to_string()),
        }));
        assert!(v.has_server());
    }
}
