//! Metadata read from an ohai-style JSON document.
//!
//! Only the `ec2` section is consulted:
//!
//! ```json
//! { "ec2": { "instance_id": "i-0abc", "ami_launch_index": "0", "userdata": "..." } }
//! ```
//!
//! `ami_launch_index` may be a number or a numeric string.

use super::{InstanceMetadata, MetadataSource, parse_launch_index};
use firstboot_shared::errors::{FirstbootError, FirstbootResult};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct OhaiDocument {
    path: PathBuf,
}

impl OhaiDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MetadataSource for OhaiDocument {
    fn fetch(&self) -> FirstbootResult<InstanceMetadata> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            FirstbootError::MetadataUnavailable(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let document: Value = serde_json::from_str(&raw).map_err(|e| {
            FirstbootError::MetadataUnavailable(format!(
                "{} is not valid JSON: {}",
                self.path.display(),
                e
            ))
        })?;
        metadata_from_document(&document)
    }

    fn describe(&self) -> String {
        format!("ohai:{}", self.path.display())
    }
}

fn metadata_from_document(document: &Value) -> FirstbootResult<InstanceMetadata> {
    let ec2 = document
        .get("ec2")
        .and_then(Value::as_object)
        .ok_or_else(|| FirstbootError::MetadataUnavailable("no ec2 section".to_string()))?;

    let instance_id = ec2
        .get("instance_id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| FirstbootError::MetadataUnavailable("no ec2.instance_id".to_string()))?
        .to_string();

    let launch_index = match ec2.get("ami_launch_index") {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => parse_launch_index(s),
        _ => None,
    };

    let user_data = ec2
        .get("userdata")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(InstanceMetadata {
        instance_id,
        launch_index,
        user_data,
    })
}
