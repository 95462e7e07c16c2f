//! Task: Fetch instance metadata.

use super::log_task_error;
use crate::bootstrap::BootstrapContext;
use crate::pipeline::PipelineTask;
use firstboot_shared::errors::FirstbootResult;

pub struct FetchMetadataTask;

impl<'a> PipelineTask<BootstrapContext<'a>> for FetchMetadataTask {
    fn run(&self, ctx: &mut BootstrapContext<'a>) -> FirstbootResult<()> {
        let metadata = ctx
            .source
            .fetch()
            .inspect_err(|e| log_task_error(self.name(), e))?;

        tracing::info!(
            instance_id = %metadata.instance_id,
            launch_index = ?metadata.launch_index,
            user_data_bytes = metadata.user_data.as_ref().map_or(0, String::len),
            "Fetched instance metadata"
        );

        ctx.metadata = Some(metadata);
        Ok(())
    }

    fn name(&self) -> &str {
        "fetch_metadata"
    }
}
