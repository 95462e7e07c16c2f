//! Declarative resources.
//!
//! Each resource kind is an explicit struct with a fixed set of declared
//! keys. Settings are accepted as a JSON object; any key outside the
//! declared set is rejected with `FirstbootError::UnrecognizedKey`, for
//! every kind alike.
//!
//! - `Volume` - Cloud block storage and where to mount it
//! - `NfsMount` - NFS export mounted on the node
//! - `Role` - Named run list

mod nfs_mount;
mod role;
mod volume;

pub use nfs_mount::NfsMount;
pub use role::{Role, RunListItem};
pub use volume::{CloudVolume, Volume};

use firstboot_shared::errors::{FirstbootError, FirstbootResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Name of the resource that owns another one.
///
/// Non-owning: it is only ever resolved by lookup.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParentRef(String);

impl ParentRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A schema-constrained resource kind.
pub trait Resource: DeserializeOwned {
    /// Kind name used in errors and logs.
    const KIND: &'static str;

    /// Every key accepted by [`from_settings`].
    const KEYS: &'static [&'static str];

    fn name(&self) -> Option<&str>;

    fn parent(&self) -> Option<&ParentRef>;

    fn set_parent(&mut self, parent: Option<ParentRef>);

    /// Checks that need more than the key set, run after construction.
    fn validate(&self) -> FirstbootResult<()> {
        Ok(())
    }
}

/// Build a resource from a settings object.
pub fn from_settings<R: Resource>(parent: Option<ParentRef>, settings: Value) -> FirstbootResult<R> {
    let Value::Object(map) = settings else {
        return Err(FirstbootError::Config(format!(
            "{} settings must be a JSON object",
            R::KIND
        )));
    };

    if let Some(key) = map.keys().find(|key| !R::KEYS.contains(&key.as_str())) {
        return Err(FirstbootError::UnrecognizedKey {
            kind: R::KIND,
            key: key.clone(),
        });
    }

    let mut resource: R = serde_json::from_value(Value::Object(map))
        .map_err(|e| FirstbootError::Config(format!("invalid {} settings: {}", R::KIND, e)))?;
    resource.set_parent(parent);
    resource.validate()?;
    Ok(resource)
}

/// Build every resource of a settings list, failing on the first bad entry.
pub fn from_settings_list<R: Resource>(
    parent: Option<ParentRef>,
    settings: Value,
) -> FirstbootResult<Vec<R>> {
    let Value::Array(entries) = settings else {
        return Err(FirstbootError::Config(format!(
            "{} settings list must be a JSON array",
            R::KIND
        )));
    };

    entries
        .into_iter()
        .map(|entry| from_settings(parent.clone(), entry))
        .collect()
}

/// Named resources of one kind.
///
/// Resources are keyed by name; unnamed resources and duplicate names are
/// rejected. Parent references are resolved here by name.
#[derive(Debug, Clone)]
pub struct ResourceRegistry<R> {
    entries: BTreeMap<String, R>,
}

impl<R> Default for ResourceRegistry<R> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<R: Resource> ResourceRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, resource: R) -> FirstbootResult<()> {
        let name = resource
            .name()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| FirstbootError::Config(format!("{} must have a name", R::KIND)))?
            .to_string();

        if self.entries.contains_key(&name) {
            return Err(FirstbootError::Config(format!(
                "{} '{}' already registered",
                R::KIND,
                name
            )));
        }

        tracing::trace!(kind = R::KIND, name = %name, parent = ?resource.parent(), "Registering resource");
        self.entries.insert(name, resource);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&R> {
        self.entries.get(name)
    }

    /// Parent reference of the named resource.
    pub fn parent_of(&self, name: &str) -> Option<&ParentRef> {
        self.get(name).and_then(Resource::parent)
    }

    /// Resources whose parent is `parent`, in name order.
    pub fn children_of<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a R> + 'a {
        self.entries
            .values()
            .filter(move |r| r.parent().is_some_and(|p| p.name() == parent))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unrecognized_key_rejected() {
        let err = from_settings::<Volume>(None, json!({"device": "/dev/sdj", "iops": 300}))
            .unwrap_err();
        match err {
            FirstbootError::UnrecognizedKey { kind, key } => {
                assert_eq!(kind, "volume");
                assert_eq!(key, "iops");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_object_settings_rejected() {
        let err = from_settings::<Volume>(None, json!(["device"])).unwrap_err();
        assert!(matches!(err, FirstbootError::Config(_)));
    }

    #[test]
    fn test_wrong_value_type_rejected() {
        let err = from_settings::<Volume>(None, json!({"size": "big"})).unwrap_err();
        assert!(matches!(err, FirstbootError::Config(_)));
    }

    #[test]
    fn test_settings_list_propagates_parent() {
        let volumes: Vec<Volume> = from_settings_list(
            Some(ParentRef::new("web-app-0")),
            json!([{"name": "root"}, {"name": "data"}]),
        )
        .unwrap();
        assert_eq!(volumes.len(), 2);
        assert!(volumes.iter().all(|v| v.parent() == Some(&ParentRef::new("web-app-0"))));
    }

    #[test]
    fn test_registry_parent_lookup() {
        let mut registry = ResourceRegistry::new();
        let web = Some(ParentRef::new("web-app-0"));
        let db = Some(ParentRef::new("db-master-0"));
        registry
            .insert(from_settings::<Volume>(web.clone(), json!({"name": "web-data"})).unwrap())
            .unwrap();
        registry
            .insert(from_settings::<Volume>(db.clone(), json!({"name": "db-data"})).unwrap())
            .unwrap();
        registry
            .insert(from_settings::<Volume>(web.clone(), json!({"name": "web-logs"})).unwrap())
            .unwrap();

        let names: Vec<_> = registry
            .children_of("web-app-0")
            .filter_map(Volume::name)
            .collect();
        assert_eq!(names, vec!["web-data", "web-logs"]);
        assert_eq!(registry.parent_of("db-data"), db.as_ref());
        assert_eq!(registry.parent_of("missing"), None);
    }

    #[test]
    fn test_registry_rejects_duplicates_and_unnamed() {
        let mut registry = ResourceRegistry::new();
        assert!(registry.is_empty());
        registry
            .insert(from_settings::<Volume>(None, json!({"name": "data"})).unwrap())
            .unwrap();
        assert!(
            registry
                .insert(from_settings::<Volume>(None, json!({"name": "data"})).unwrap())
                .is_err()
        );
        assert!(
            registry
                .insert(from_settings::<Volume>(None, json!({"device": "/dev/sdf"})).unwrap())
                .is_err()
        );
        assert_eq!(registry.len(), 1);
    }
}
