//! Task: Persist the validation credential.
//!
//! A node that already holds a client key has registered; it gets no
//! validation credential even if user-data carries one.

use super::log_task_error;
use crate::bootstrap::{BootstrapContext, CredentialOutcome};
use crate::credential::ensure_credential;
use crate::pipeline::PipelineTask;
use firstboot_shared::errors::FirstbootResult;

pub struct ValidationKeyTask;

impl<'a> PipelineTask<BootstrapContext<'a>> for ValidationKeyTask {
    fn run(&self, ctx: &mut BootstrapContext<'a>) -> FirstbootResult<()> {
        let paths = &ctx.config.paths;

        let outcome = if paths.client_key.try_exists()? {
            tracing::info!(
                client_key = %paths.client_key.display(),
                "Client key present, skipping validation credential"
            );
            CredentialOutcome::ClientKeyPresent
        } else {
            let key = ctx
                .payload
                .as_ref()
                .and_then(|p| p.validation_key.as_deref())
                .filter(|k| !k.is_empty());

            match key {
                Some(key) => CredentialOutcome::from(
                    ensure_credential(&paths.validation_key, key.as_bytes())
                        .inspect_err(|e| log_task_error(self.name(), e))?,
                ),
                None => {
                    tracing::warn!("No validation key in user-data");
                    CredentialOutcome::NotProvided
                }
            }
        };

        ctx.validation_key = Some(outcome);
        Ok(())
    }

    fn name(&self) -> &str {
        "validation_key"
    }
}
