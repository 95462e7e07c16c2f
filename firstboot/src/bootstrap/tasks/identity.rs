//! Task: Resolve node identity from metadata and user-data.

use crate::bootstrap::BootstrapContext;
use crate::identity::{payload_for, resolve};
use crate::pipeline::PipelineTask;
use firstboot_shared::errors::FirstbootResult;

pub struct ResolveIdentityTask;

impl<'a> PipelineTask<BootstrapContext<'a>> for ResolveIdentityTask {
    fn run(&self, ctx: &mut BootstrapContext<'a>) -> FirstbootResult<()> {
        let metadata = ctx.metadata()?;
        let payload = payload_for(metadata);
        let identity = resolve(metadata, payload.as_ref(), &ctx.config.defaults);

        tracing::info!(
            node_name = %identity.name,
            name_source = ?identity.name_source,
            server_url = %identity.server_url,
            validation_client_name = %identity.validation_client_name,
            "Resolved node identity"
        );

        ctx.payload = payload;
        ctx.identity = Some(identity);
        Ok(())
    }

    fn name(&self) -> &str {
        "resolve_identity"
    }
}
