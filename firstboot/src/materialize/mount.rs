//! Mount entries for volumes and NFS exports.

use crate::resources::{NfsMount, Volume};
use firstboot_shared::errors::{FirstbootError, FirstbootResult};
use serde::Serialize;
use std::fmt;

/// Options for NFS client mounts.
pub const NFS_OPTIONS: &[&str] = &["rw", "soft", "intr"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountEntry {
    pub device: String,
    pub mount_point: String,
    pub fs_type: String,
    pub options: Vec<String>,
    pub dump: u8,
    pub pass: u8,
}

impl MountEntry {
    /// Render as an `/etc/fstab` line.
    pub fn fstab_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MountEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = if self.options.is_empty() {
            "defaults".to_string()
        } else {
            self.options.join(",")
        };
        write!(
            f,
            "{} {} {} {} {} {}",
            self.device, self.mount_point, self.fs_type, options, self.dump, self.pass
        )
    }
}

/// Mount entry for a volume with both a device and a mount point.
pub fn mount_entry(volume: &Volume) -> Option<MountEntry> {
    let device = volume.device()?;
    let mount_point = volume.mount_point()?;

    Some(MountEntry {
        device: device.to_string(),
        mount_point: mount_point.to_string(),
        fs_type: volume.fs_type().unwrap_or("auto").to_string(),
        options: volume
            .mount_options()
            .map(|opts| {
                opts.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        dump: 0,
        pass: 0,
    })
}

/// Mount entry for an NFS export.
///
/// The device is the mount's explicit `device`, else `server:remote_path`.
pub fn nfs_mount_entry(mount: &NfsMount, server: Option<&str>) -> FirstbootResult<MountEntry> {
    let device = match (mount.device(), server, mount.remote_path()) {
        (Some(device), _, _) => device.to_string(),
        (None, Some(server), Some(remote_path)) => format!("{}:{}", server, remote_path),
        _ => {
            return Err(FirstbootError::Config(format!(
                "nfs mount {} needs a device, or a server and remote_path",
                mount.target()
            )));
        }
    };

    Ok(MountEntry {
        device,
        mount_point: mount.target().to_string(),
        fs_type: "nfs".to_string(),
        options: NFS_OPTIONS.iter().map(|o| o.to_string()).collect(),
        dump: 0,
        pass: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::from_settings;
    use serde_json::json;

    #[test]
    fn test_volume_mount_entry() {
        let volume: Volume = from_settings(
            None,
            json!({
                "device": "/dev/sdj",
                "mount_point": "/ebs1",
                "fs_type": "xfs",
                "mount_options": "defaults,nouuid,noatime"
            }),
        )
        .unwrap();

        let entry = mount_entry(&volume).unwrap();
        assert_eq!(entry.fstab_line(), "/dev/sdj /ebs1 xfs defaults,nouuid,noatime 0 0");
    }

    #[test]
    fn test_volume_without_mount_point() {
        let volume: Volume = from_settings(None, json!({"device": "/dev/sdj"})).unwrap();
        assert_eq!(mount_entry(&volume), None);
    }

    #[test]
    fn test_volume_defaults_in_fstab() {
        let volume: Volume =
            from_settings(None, json!({"device": "/dev/sdc", "mount_point": "/mnt"})).unwrap();
        assert_eq!(mount_entry(&volume).unwrap().fstab_line(), "/dev/sdc /mnt auto defaults 0 0");
    }

    #[test]
    fn test_nfs_entry_from_server() {
        let mount: NfsMount =
            from_settings(None, json!({"target": "/home", "remote_path": "/exports/home"}))
                .unwrap();
        let entry = nfs_mount_entry(&mount, Some("10.0.0.5")).unwrap();
        assert_eq!(entry.fstab_line(), "10.0.0.5:/exports/home /home nfs rw,soft,intr 0 0");
    }

    #[test]
    fn test_nfs_explicit_device_wins() {
        let mount: NfsMount = from_settings(
            None,
            json!({"target": "/data", "device": "nas:/vol/data", "remote_path": "/ignored"}),
        )
        .unwrap();
        assert_eq!(nfs_mount_entry(&mount, Some("10.0.0.5")).unwrap().device, "nas:/vol/data");
    }

    #[test]
    fn test_nfs_without_source_is_error() {
        let mount: NfsMount =
            from_settings(None, json!({"target": "/home", "remote_path": "/exports/home"}))
                .unwrap();
        assert!(nfs_mount_entry(&mount, None).is_err());
    }
}
