//! Task: Persist node attributes for the configuration client.

use super::log_task_error;
use crate::bootstrap::{AttributesOutcome, BootstrapContext};
use crate::credential::ensure_attributes_file;
use crate::pipeline::PipelineTask;
use firstboot_shared::errors::FirstbootResult;

pub struct AttributesTask;

impl<'a> PipelineTask<BootstrapContext<'a>> for AttributesTask {
    fn run(&self, ctx: &mut BootstrapContext<'a>) -> FirstbootResult<()> {
        let attributes = ctx.payload.as_ref().and_then(|p| p.attributes.as_ref());

        let outcome = match attributes {
            Some(attributes) => AttributesOutcome::from(
                ensure_attributes_file(&ctx.config.paths.client_config_file, attributes)
                    .inspect_err(|e| log_task_error(self.name(), e))?,
            ),
            None => AttributesOutcome::NotProvided,
        };

        ctx.attributes = Some(outcome);
        Ok(())
    }

    fn name(&self) -> &str {
        "attributes"
    }
}
