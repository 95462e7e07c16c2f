//! Provider-facing descriptors derived from declarative resources.
//!
//! Descriptors are pure functions of resource state at the time of the call
//! and are never cached:
//! - `BlockDeviceMapping` - Launch-request entry for a `Volume`
//! - `MountEntry` - fstab entry for a `Volume` or `NfsMount`
//! - expanded run lists for a set of `Role`s

mod block_device;
mod mount;
mod run_list;

pub use block_device::{BlockDeviceMapping, block_device_mapping, launch_mappings};
pub use mount::{MountEntry, NFS_OPTIONS, mount_entry, nfs_mount_entry};
pub use run_list::expand_run_list;
