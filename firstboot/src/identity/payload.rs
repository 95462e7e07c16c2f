//! User-data payload parsing.
//!
//! User-data is either a single JSON object or an ordered list of objects,
//! one per instance of a batch launch. Parsing never fails the boot: the
//! parser returns a `Result`, and [`payload_for`] turns every failure into an
//! absent payload.

use crate::metadata::InstanceMetadata;
use firstboot_shared::errors::{FirstbootError, FirstbootResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Recognized user-data keys. Keys outside this set are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserPayload {
    pub node_name: Option<String>,
    pub cluster_name: Option<String>,
    pub cluster_role: Option<String>,
    pub chef_server: Option<String>,
    pub validation_client_name: Option<String>,
    pub validation_key: Option<String>,
    /// Node attributes to persist as the client's JSON attributes file.
    /// Present whenever the key is, even when its value is `null`.
    pub attributes: Option<Value>,
}

impl UserPayload {
    /// Extract recognized keys from a user-data object.
    ///
    /// Each key is taken on its own: a value of the wrong type is logged and
    /// dropped without affecting the other keys.
    pub fn from_object(mut object: Map<String, Value>) -> Self {
        let mut text = |key: &str| match object.remove(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(value)) => Some(value),
            Some(other) => {
                tracing::warn!(key, found = json_type(&other), "Ignoring user data key that is not a string");
                None
            }
        };

        let mut payload = Self {
            node_name: text("node_name"),
            cluster_name: text("cluster_name"),
            cluster_role: text("cluster_role"),
            chef_server: text("chef_server"),
            validation_client_name: text("validation_client_name"),
            validation_key: text("validation_key"),
            attributes: None,
        };
        payload.attributes = object.remove("attributes");
        payload
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parsed user-data before launch-index selection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum UserData {
    /// Template shared by a batch launch; entry N configures launch index N.
    Fleet(Vec<Value>),
    Single(Map<String, Value>),
}

impl UserData {
    pub fn parse(raw: &str) -> FirstbootResult<Self> {
        serde_json::from_str(raw).map_err(|e| FirstbootError::PayloadMalformed(e.to_string()))
    }

    /// Pick the payload for one instance.
    ///
    /// A fleet entry that is missing, out of range, or not an object yields
    /// an empty payload so resolution falls through to defaults.
    pub fn select(self, launch_index: Option<u32>) -> UserPayload {
        let entries = match self {
            UserData::Single(object) => return UserPayload::from_object(object),
            UserData::Fleet(entries) => entries,
        };

        let Some(index) = launch_index else {
            tracing::warn!(
                entries = entries.len(),
                "User data is a list but no launch index is known, using defaults"
            );
            return UserPayload::default();
        };

        let len = entries.len();
        match entries.into_iter().nth(index as usize) {
            Some(Value::Object(object)) => UserPayload::from_object(object),
            Some(_) => {
                tracing::warn!(index, "User data entry is not an object, using defaults");
                UserPayload::default()
            }
            None => {
                tracing::warn!(index, len, "Launch index out of range for user data, using defaults");
                UserPayload::default()
            }
        }
    }
}

/// Payload for this instance, or `None` when user-data is absent or malformed.
pub fn payload_for(metadata: &InstanceMetadata) -> Option<UserPayload> {
    let raw = metadata.user_data.as_deref()?.trim();
    if raw.is_empty() {
        return None;
    }

    match UserData::parse(raw) {
        Ok(data) => Some(data.select(metadata.launch_index)),
        Err(e) => {
            tracing::warn!(error = %e, "User data is not usable, continuing with defaults");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(user_data: &str, launch_index: Option<u32>) -> InstanceMetadata {
        let metadata = InstanceMetadata::new("i-1").with_user_data(user_data);
        match launch_index {
            Some(i) => metadata.with_launch_index(i),
            None => metadata,
        }
    }

    #[test]
    fn test_single_object_ignores_unknown_keys() {
        let payload = payload_for(&metadata(r#"{"node_name":"db1","region":"us-east-1"}"#, None))
            .unwrap();
        assert_eq!(payload.node_name.as_deref(), Some("db1"));
    }

    #[test]
    fn test_fleet_selects_by_launch_index() {
        let raw = json!([{"node_name": "first"}, {"node_name": "second"}]).to_string();
        let payload = payload_for(&metadata(&raw, Some(1))).unwrap();
        assert_eq!(payload.node_name.as_deref(), Some("second"));
    }

    #[test]
    fn test_fleet_out_of_range_is_empty() {
        let raw = json!([{"node_name": "first"}, {"node_name": "second"}]).to_string();
        let payload = payload_for(&metadata(&raw, Some(5))).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn test_fleet_without_launch_index_is_empty() {
        let raw = json!([{"node_name": "first"}]).to_string();
        assert!(payload_for(&metadata(&raw, None)).unwrap().is_empty());
    }

    #[test]
    fn test_fleet_non_object_entry_is_empty() {
        let raw = json!(["first", ["nested"]]).to_string();
        assert!(payload_for(&metadata(&raw, Some(0))).unwrap().is_empty());
        assert!(payload_for(&metadata(&raw, Some(1))).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_and_blank_user_data_are_absent() {
        assert_eq!(payload_for(&metadata("#!/bin/sh\necho hi", None)), None);
        assert_eq!(payload_for(&metadata("   \n", None)), None);
        assert_eq!(payload_for(&InstanceMetadata::new("i-1")), None);
    }

    #[test]
    fn test_mistyped_key_dropped_alone() {
        let raw = json!({
            "node_name": "db1",
            "cluster_role": 3,
            "validation_key": ["not", "a", "key"],
            "chef_server": "https://chef.example.com"
        })
        .to_string();
        let payload = payload_for(&metadata(&raw, None)).unwrap();
        assert_eq!(payload.node_name.as_deref(), Some("db1"));
        assert_eq!(payload.cluster_role, None);
        assert_eq!(payload.validation_key, None);
        assert_eq!(payload.chef_server.as_deref(), Some("https://chef.example.com"));
    }

    #[test]
    fn test_mistyped_fleet_entry_key_dropped_alone() {
        let raw = json!([{}, {"node_name": "db1", "chef_server": 4000}]).to_string();
        let payload = payload_for(&metadata(&raw, Some(1))).unwrap();
        assert_eq!(payload.node_name.as_deref(), Some("db1"));
        assert_eq!(payload.chef_server, None);
    }

    #[test]
    fn test_only_mistyped_keys_is_empty_payload() {
        let payload = payload_for(&metadata(r#"{"node_name": 42}"#, None)).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn test_null_attributes_key_is_kept() {
        let payload = payload_for(&metadata(r#"{"attributes": null}"#, None)).unwrap();
        assert_eq!(payload.attributes, Some(Value::Null));
    }

    #[test]
    fn test_scalar_user_data_is_malformed() {
        assert!(matches!(UserData::parse("42"), Err(FirstbootError::PayloadMalformed(_))));
        assert_eq!(payload_for(&metadata(r#""text""#, None)), None);
    }

    #[test]
    fn test_parse_reports_malformed() {
        let err = UserData::parse("not json").unwrap_err();
        assert!(matches!(err, FirstbootError::PayloadMalformed(_)));
    }
}
