//! Generic task trait for pipeline execution.

use firstboot_shared::errors::FirstbootResult;

/// Trait for tasks that can be executed in a pipeline.
///
/// Tasks read their inputs from, and record their outputs in, the shared
/// pipeline context.
pub trait PipelineTask<Ctx> {
    /// Execute the task against the pipeline context.
    fn run(&self, ctx: &mut Ctx) -> FirstbootResult<()>;

    /// Get human-readable task name for logging.
    fn name(&self) -> &str;
}

pub type BoxedTask<Ctx> = Box<dyn PipelineTask<Ctx>>;
