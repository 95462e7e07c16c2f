//! Bootstrap pipeline tasks.

mod attributes;
mod identity;
mod metadata;
mod validation_key;

pub use attributes::AttributesTask;
pub use identity::ResolveIdentityTask;
pub use metadata::FetchMetadataTask;
pub use validation_key::ValidationKeyTask;

use firstboot_shared::errors::FirstbootError;

fn log_task_error(task_name: &str, error: &FirstbootError) {
    tracing::warn!(task = task_name, error = %error, "Bootstrap task failed");
}
