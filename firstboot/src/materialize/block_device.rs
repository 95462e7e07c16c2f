//! Block-device mappings for instance launch requests.

use crate::resources::Volume;
use serde::Serialize;
use serde_json::{Map, Value};

/// A block device the provider should set up when launching the instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BlockDeviceMapping {
    /// Instance-store device.
    Ephemeral {
        device: Option<String>,
        virtual_name: String,
    },
    /// Volume created from a snapshot at launch.
    Snapshot {
        device: Option<String>,
        snapshot_id: String,
        size: Option<u64>,
        delete_on_termination: bool,
    },
}

/// Mapping for a volume, or `None` when the volume already exists and must
/// be attached after launch instead of being requested at launch.
///
/// Precedence: ephemeral, then create-from-snapshot, then attach-existing.
pub fn block_device_mapping(volume: &Volume) -> Option<BlockDeviceMapping> {
    let device = volume.device().map(str::to_string);

    if volume.is_ephemeral() {
        return Some(BlockDeviceMapping::Ephemeral {
            device,
            virtual_name: volume.volume_id()?.to_string(),
        });
    }

    if volume.create_at_launch() {
        return Some(BlockDeviceMapping::Snapshot {
            device,
            snapshot_id: volume.snapshot_id()?.to_string(),
            size: volume.size(),
            delete_on_termination: !volume.keep(),
        });
    }

    None
}

/// Mappings for every volume that belongs in the launch request, in order.
pub fn launch_mappings<'a>(volumes: impl IntoIterator<Item = &'a Volume>) -> Vec<BlockDeviceMapping> {
    volumes
        .into_iter()
        .filter_map(|volume| {
            let mapping = block_device_mapping(volume);
            if mapping.is_none() {
                tracing::debug!(
                    volume_id = ?volume.volume_id(),
                    device = ?volume.device(),
                    "Volume exists, leaving it out of the launch request"
                );
            }
            mapping
        })
        .collect()
}

impl BlockDeviceMapping {
    pub fn device(&self) -> Option<&str> {
        match self {
            BlockDeviceMapping::Ephemeral { device, .. }
            | BlockDeviceMapping::Snapshot { device, .. } => device.as_deref(),
        }
    }

    /// Render with the provider's flat, dotted request keys.
    pub fn to_provider_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(
            "DeviceName".to_string(),
            self.device().map_or(Value::Null, |d| Value::String(d.to_string())),
        );

        match self {
            BlockDeviceMapping::Ephemeral { virtual_name, .. } => {
                map.insert("VirtualName".to_string(), Value::String(virtual_name.clone()));
            }
            BlockDeviceMapping::Snapshot {
                snapshot_id,
                size,
                delete_on_termination,
                ..
            } => {
                map.insert("Ebs.SnapshotId".to_string(), Value::String(snapshot_id.clone()));
                map.insert(
                    "Ebs.VolumeSize".to_string(),
                    size.map_or(Value::Null, Value::from),
                );
                map.insert(
                    "Ebs.DeleteOnTermination".to_string(),
                    Value::String(delete_on_termination.to_string()),
                );
            }
        }

        map
    }
}
