//! Sequential, table-driven step runner.
//!
//! A plan is an ordered list of named stages, each an ordered list of tasks
//! sharing one mutable context. Tasks run on the calling thread and the
//! first error ends the run. Each task and stage is timed, and the timings
//! are returned as [`PipelineMetrics`] for the bootstrap report.
//!
//! ```ignore
//! let plan = ExecutionPlan::new(vec![
//!     Stage::new("identity", vec![Box::new(FetchMetadataTask) as BoxedTask<_>]),
//! ]);
//! let metrics = PipelineExecutor::execute(plan, &mut ctx)?;
//! assert_eq!(metrics.task_names(), vec!["fetch_metadata"]);
//! ```

mod metrics;
#[allow(clippy::module_inception)]
mod pipeline;
mod stage;
mod task;

pub use metrics::{PipelineMetrics, StageMetrics, TaskMetrics};
pub use pipeline::{ExecutionPlan, PipelineExecutor};
pub use stage::Stage;
pub use task::{BoxedTask, PipelineTask};
