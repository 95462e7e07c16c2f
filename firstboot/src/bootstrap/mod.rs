//! First-boot orchestration.
//!
//! ## Architecture
//!
//! Bootstrap is table-driven and runs to completion on the calling thread:
//!
//! ```text
//! identity:
//!   1. FetchMetadata     (instance id, launch index, user-data; fatal on failure)
//!   2. ResolveIdentity   (parse user-data, pick node name and server)
//! persist:
//!   3. ValidationKey     (write credential once, unless already registered)
//!   4. Attributes        (write JSON attributes once, when provided)
//! ```
//!
//! Only metadata failures and local I/O errors abort a run. Everything
//! derived from user-data degrades to defaults, and every file write is
//! write-once and all-or-nothing, so running bootstrap again on the same
//! machine yields the same identity and leaves existing files untouched.

mod tasks;
mod types;

pub use types::{
    AttributesOutcome, BootstrapContext, BootstrapReport, ClientSettings, CredentialOutcome,
};

use crate::config::BootstrapConfig;
use crate::metadata::MetadataSource;
use crate::pipeline::{BoxedTask, ExecutionPlan, PipelineExecutor, Stage};
use firstboot_shared::errors::FirstbootResult;

use tasks::{AttributesTask, FetchMetadataTask, ResolveIdentityTask, ValidationKeyTask};

fn execution_plan<'a>() -> ExecutionPlan<BootstrapContext<'a>> {
    let stages: Vec<Stage<BoxedTask<BootstrapContext<'a>>>> = vec![
        Stage::new(
            "identity",
            vec![Box::new(FetchMetadataTask), Box::new(ResolveIdentityTask)],
        ),
        Stage::new(
            "persist",
            vec![Box::new(ValidationKeyTask), Box::new(AttributesTask)],
        ),
    ];
    ExecutionPlan::new(stages)
}

/// Run first-boot bootstrap.
///
/// # Errors
///
/// Returns error if:
/// - Instance metadata is unavailable
/// - The credential or attributes file cannot be written
pub fn run(config: &BootstrapConfig, source: &dyn MetadataSource) -> FirstbootResult<BootstrapReport> {
    tracing::info!(source = %source.describe(), "Starting first-boot bootstrap");

    let mut ctx = BootstrapContext::new(config, source);
    let metrics = PipelineExecutor::execute(execution_plan(), &mut ctx)?;
    let report = ctx.into_report(metrics)?;

    tracing::info!(
        node_name = %report.identity.name,
        server_url = %report.identity.server_url,
        validation_key = ?report.validation_key,
        attributes = ?report.attributes,
        duration_ms = report.metrics.total_duration_ms,
        "Bootstrap complete"
    );
    Ok(report)
}
