//! Firstboot - node identity and declarative resources for cloud VMs.
//!
//! On first boot a machine reads its instance metadata, decides who it is,
//! persists its registration credential exactly once, and hands a settings
//! record to the configuration client. Cluster definitions describe volumes,
//! NFS mounts and roles, which are materialized into launch-time block device
//! mappings, fstab entries and ordered run lists.

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod credential;
pub mod identity;
pub mod logging;
pub mod materialize;
pub mod metadata;
pub mod pipeline;
pub mod resources;

pub use bootstrap::{BootstrapReport, ClientSettings, CredentialOutcome, run as bootstrap};
pub use config::{BootstrapConfig, ClientPaths, IdentityDefaults, LogConfig, SslVerifyMode};
pub use firstboot_shared::errors::{FirstbootError, FirstbootResult};
pub use identity::{NameSource, NodeIdentity, UserPayload, resolve};
pub use metadata::{InstanceMetadata, MetadataDir, MetadataSource, OhaiDocument, StaticMetadata};
pub use resources::{NfsMount, ParentRef, Resource, ResourceRegistry, Role, RunListItem, Volume};
