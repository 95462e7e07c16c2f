//! Run-list expansion.

use crate::resources::{ResourceRegistry, Role, RunListItem};
use firstboot_shared::errors::{FirstbootError, FirstbootResult};
use std::collections::HashSet;

/// Expand roles into the ordered list of recipes to apply.
///
/// Nested `role[...]` entries are expanded in place. A recipe that appears
/// more than once is kept at its first position. Unknown roles and role
/// cycles are configuration errors.
pub fn expand_run_list(
    roles: &ResourceRegistry<Role>,
    names: &[&str],
) -> FirstbootResult<Vec<RunListItem>> {
    let mut expanded = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = Vec::new();

    for name in names.iter().copied() {
        expand_role(roles, name, &mut stack, &mut seen, &mut expanded)?;
    }

    tracing::debug!(roles = ?names, recipes = expanded.len(), "Expanded run list");
    Ok(expanded)
}

fn expand_role<'a>(
    roles: &'a ResourceRegistry<Role>,
    name: &'a str,
    stack: &mut Vec<&'a str>,
    seen: &mut HashSet<RunListItem>,
    expanded: &mut Vec<RunListItem>,
) -> FirstbootResult<()> {
    if stack.contains(&name) {
        return Err(FirstbootError::Config(format!(
            "role cycle: {} -> {}",
            stack.join(" -> "),
            name
        )));
    }

    let role = roles
        .get(name)
        .ok_or_else(|| FirstbootError::Config(format!("unknown role '{}'", name)))?;

    stack.push(name);
    for item in role.run_list() {
        match item {
            RunListItem::Role(nested) => expand_role(roles, nested, stack, seen, expanded)?,
            recipe => {
                if seen.insert(recipe.clone()) {
                    expanded.push(recipe.clone());
                }
            }
        }
    }
    stack.pop();

    Ok(())
}
