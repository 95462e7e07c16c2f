//! Cloud instance metadata.
//!
//! Provides the immutable [`InstanceMetadata`] snapshot and the sources it
//! can be read from:
//! - `StaticMetadata` - In-memory snapshot supplied by the caller
//! - `MetadataDir` - One file per metadata key, as laid out by the metadata endpoint
//! - `OhaiDocument` - JSON document with an `ec2` section

mod dir;
mod ohai;

pub use dir::MetadataDir;
pub use ohai::OhaiDocument;

use firstboot_shared::errors::FirstbootResult;
use serde::{Deserialize, Serialize};

/// Facts the cloud provider reports about this instance.
///
/// Created once at process start and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceMetadata {
    pub instance_id: String,
    /// Position of this instance within a batch launch.
    pub launch_index: Option<u32>,
    /// Raw user-data blob, if any was supplied at launch.
    pub user_data: Option<String>,
}

impl InstanceMetadata {
    pub fn new(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            launch_index: None,
            user_data: None,
        }
    }

    pub fn with_launch_index(mut self, launch_index: u32) -> Self {
        self.launch_index = Some(launch_index);
        self
    }

    pub fn with_user_data(mut self, user_data: impl Into<String>) -> Self {
        self.user_data = Some(user_data.into());
        self
    }
}

/// Anything that can produce an [`InstanceMetadata`] snapshot.
///
/// Retry and timeout policy belong to the implementation. A failed fetch
/// must be reported as `FirstbootError::MetadataUnavailable`.
pub trait MetadataSource {
    fn fetch(&self) -> FirstbootResult<InstanceMetadata>;

    /// Human-readable source description for logging.
    fn describe(&self) -> String;
}

/// Metadata known up front.
#[derive(Debug, Clone)]
pub struct StaticMetadata(InstanceMetadata);

impl StaticMetadata {
    pub fn new(metadata: InstanceMetadata) -> Self {
        Self(metadata)
    }
}

impl MetadataSource for StaticMetadata {
    fn fetch(&self) -> FirstbootResult<InstanceMetadata> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// Parse a launch index, logging and discarding values that are not
/// non-negative integers.
pub(crate) fn parse_launch_index(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<u32>() {
        Ok(index) => Some(index),
        Err(e) => {
            tracing::warn!(value = %trimmed, error = %e, "Ignoring unparseable launch index");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_metadata_returns_snapshot() {
        let metadata = InstanceMetadata::new("i-0abc")
            .with_launch_index(2)
            .with_user_data("{}");
        let source = StaticMetadata::new(metadata.clone());
        assert_eq!(source.fetch().unwrap(), metadata);
    }

    #[test]
    fn test_parse_launch_index() {
        assert_eq!(parse_launch_index("3\n"), Some(3));
        assert_eq!(parse_launch_index(""), None);
        assert_eq!(parse_launch_index("-1"), None);
        assert_eq!(parse_launch_index("three"), None);
    }
}
