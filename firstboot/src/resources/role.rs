//! Role resource: a named, ordered run list.

use super::{ParentRef, Resource};
use firstboot_shared::errors::{FirstbootError, FirstbootResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of a run list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RunListItem {
    /// `cookbook::recipe`; a bare `cookbook` means its `default` recipe.
    Recipe { cookbook: String, recipe: String },
    /// `role[name]`
    Role(String),
}

impl RunListItem {
    pub fn parse(raw: &str) -> FirstbootResult<Self> {
        let raw = raw.trim();
        if let Some(name) = bracketed(raw, "role") {
            return Ok(RunListItem::Role(identifier(name, raw)?.to_string()));
        }

        let recipe_ref = bracketed(raw, "recipe").unwrap_or(raw);
        let (cookbook, recipe) = match recipe_ref.split_once("::") {
            Some((cookbook, recipe)) => (cookbook, recipe),
            None => (recipe_ref, "default"),
        };

        Ok(RunListItem::Recipe {
            cookbook: identifier(cookbook, raw)?.to_string(),
            recipe: identifier(recipe, raw)?.to_string(),
        })
    }
}

fn bracketed<'a>(raw: &'a str, prefix: &str) -> Option<&'a str> {
    raw.strip_prefix(prefix)?.strip_prefix('[')?.strip_suffix(']')
}

fn identifier<'a>(part: &'a str, raw: &str) -> FirstbootResult<&'a str> {
    let valid = !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(part)
    } else {
        Err(FirstbootError::Config(format!("invalid run list item '{}'", raw)))
    }
}

impl fmt::Display for RunListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunListItem::Recipe { cookbook, recipe } => write!(f, "{}::{}", cookbook, recipe),
            RunListItem::Role(name) => write!(f, "role[{}]", name),
        }
    }
}

impl TryFrom<String> for RunListItem {
    type Error = FirstbootError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<RunListItem> for String {
    fn from(item: RunListItem) -> Self {
        item.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Role {
    name: String,
    description: Option<String>,
    run_list: Vec<RunListItem>,

    #[serde(skip)]
    parent: Option<ParentRef>,
}

impl Resource for Role {
    const KIND: &'static str = "role";

    const KEYS: &'static [&'static str] = &["name", "description", "run_list"];

    fn name(&self) -> Option<&str> {
        Some(self.name.as_str())
    }

    fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    fn set_parent(&mut self, parent: Option<ParentRef>) {
        self.parent = parent;
    }

    fn validate(&self) -> FirstbootResult<()> {
        if self.name.is_empty() {
            return Err(FirstbootError::Config("role must have a name".to_string()));
        }
        Ok(())
    }
}

impl Role {
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn run_list(&self) -> &[RunListItem] {
        &self.run_list
    }
}
