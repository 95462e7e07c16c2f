//! Node identity resolution.
//!
//! Decides the node name, control-server URL and validation client name a
//! machine registers with. Resolution is deterministic and infallible: every
//! missing or malformed input degrades to a default, so first boot always
//! ends up with an identity.

mod payload;

pub use payload::{UserData, UserPayload, payload_for};

use crate::config::IdentityDefaults;
use crate::metadata::InstanceMetadata;
use serde::Serialize;

/// Which rule produced the node name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameSource {
    /// `node_name` from user-data.
    NodeName,
    /// `cluster_name`, `cluster_role` and launch index.
    Cluster,
    /// Fallback to the cloud instance id.
    InstanceId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeIdentity {
    pub name: String,
    pub server_url: String,
    pub validation_client_name: String,
    pub name_source: NameSource,
}

/// Resolve the node identity.
///
/// Name priority, first match wins:
/// 1. non-empty `node_name`
/// 2. `cluster_name` and `cluster_role` joined with the launch index
///    (`web-app-3`, or `web-app` when the index is unknown)
/// 3. the instance id
///
/// Server URL and validation client name come from the payload when set,
/// otherwise from `defaults`.
pub fn resolve(
    metadata: &InstanceMetadata,
    payload: Option<&UserPayload>,
    defaults: &IdentityDefaults,
) -> NodeIdentity {
    let (name, name_source) = resolve_name(metadata, payload);

    let server_url = payload
        .and_then(|p| non_empty(&p.chef_server))
        .unwrap_or(defaults.server_url.as_str())
        .to_string();
    let validation_client_name = payload
        .and_then(|p| non_empty(&p.validation_client_name))
        .unwrap_or(defaults.validation_client_name.as_str())
        .to_string();

    NodeIdentity {
        name,
        server_url,
        validation_client_name,
        name_source,
    }
}

fn resolve_name(metadata: &InstanceMetadata, payload: Option<&UserPayload>) -> (String, NameSource) {
    if let Some(payload) = payload {
        if let Some(name) = non_empty(&payload.node_name) {
            return (name.to_string(), NameSource::NodeName);
        }

        if let (Some(cluster), Some(role)) =
            (non_empty(&payload.cluster_name), non_empty(&payload.cluster_role))
        {
            let mut parts = vec![cluster.to_string(), role.to_string()];
            if let Some(index) = metadata.launch_index {
                parts.push(index.to_string());
            }
            return (parts.join("-"), NameSource::Cluster);
        }
    }

    (metadata.instance_id.clone(), NameSource::InstanceId)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defaults() -> IdentityDefaults {
        IdentityDefaults::default()
    }

    fn resolve_raw(user_data: Option<&str>, launch_index: Option<u32>) -> NodeIdentity {
        let mut metadata = InstanceMetadata::new("i-0feed");
        metadata.launch_index = launch_index;
        metadata.user_data = user_data.map(str::to_string);
        let payload = payload_for(&metadata);
        resolve(&metadata, payload.as_ref(), &defaults())
    }

    #[test]
    fn test_node_name_wins_over_everything() {
        let raw = json!({
            "node_name": "explicit",
            "cluster_name": "web",
            "cluster_role": "app",
            "chef_server": "https://chef.example.com"
        })
        .to_string();
        let identity = resolve_raw(Some(&raw), Some(3));
        assert_eq!(identity.name, "explicit");
        assert_eq!(identity.name_source, NameSource::NodeName);
        assert_eq!(identity.server_url, "https://chef.example.com");
    }

    #[test]
    fn test_cluster_name_role_and_index() {
        let raw = json!({"cluster_name": "web", "cluster_role": "app"}).to_string();
        let identity = resolve_raw(Some(&raw), Some(3));
        assert_eq!(identity.name, "web-app-3");
        assert_eq!(identity.name_source, NameSource::Cluster);
    }

    #[test]
    fn test_node_name_survives_mistyped_fields() {
        let cases = [
            json!({"node_name": "db1", "cluster_name": "web", "cluster_role": 3}),
            json!({"node_name": "db1", "validation_key": ["a", "b"]}),
        ];
        for raw in cases {
            let identity = resolve_raw(Some(&raw.to_string()), Some(0));
            assert_eq!(identity.name, "db1");
            assert_eq!(identity.name_source, NameSource::NodeName);
        }

        let fleet = json!([{"node_name": "db1", "chef_server": 4000}]).to_string();
        let identity = resolve_raw(Some(&fleet), Some(0));
        assert_eq!(identity.name, "db1");
        assert_eq!(identity.server_url, defaults().server_url);
    }

    #[test]
    fn test_cluster_without_launch_index() {
        let raw = json!({"cluster_name": "web", "cluster_role": "app"}).to_string();
        assert_eq!(resolve_raw(Some(&raw), None).name, "web-app");
    }

    #[test]
    fn test_cluster_requires_both_parts() {
        let raw = json!({"cluster_name": "web"}).to_string();
        let identity = resolve_raw(Some(&raw), Some(0));
        assert_eq!(identity.name, "i-0feed");
        assert_eq!(identity.name_source, NameSource::InstanceId);
    }

    #[test]
    fn test_empty_node_name_falls_through() {
        let raw = json!({"node_name": "", "cluster_name": "db", "cluster_role": "master"})
            .to_string();
        assert_eq!(resolve_raw(Some(&raw), Some(0)).name, "db-master-0");
    }

    #[test]
    fn test_fleet_index_selects_entry() {
        let raw = json!([
            {"node_name": "zero", "validation_client_name": "v0"},
            {"node_name": "one", "validation_client_name": "v1"}
        ])
        .to_string();
        let identity = resolve_raw(Some(&raw), Some(1));
        assert_eq!(identity.name, "one");
        assert_eq!(identity.validation_client_name, "v1");
    }

    #[test]
    fn test_fleet_out_of_range_matches_absent_payload() {
        let raw = json!([{"node_name": "zero"}, {"node_name": "one"}]).to_string();
        assert_eq!(resolve_raw(Some(&raw), Some(5)), resolve_raw(None, Some(5)));
    }

    #[test]
    fn test_malformed_matches_absent_payload() {
        let identity = resolve_raw(Some("{not json"), Some(0));
        assert_eq!(identity, resolve_raw(None, Some(0)));
        assert_eq!(identity.name, "i-0feed");
        assert_eq!(identity.server_url, defaults().server_url);
        assert_eq!(identity.validation_client_name, "chef-validator");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let raw = json!({"cluster_name": "es", "cluster_role": "data"}).to_string();
        assert_eq!(resolve_raw(Some(&raw), Some(2)), resolve_raw(Some(&raw), Some(2)));
    }
}
