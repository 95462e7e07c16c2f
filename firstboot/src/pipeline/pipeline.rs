//! Generic pipeline execution framework.
//!
//! Provides a table-driven executor that runs stages of tasks in order
//! against a shared context.

use super::metrics::{PipelineMetrics, StageMetrics, TaskMetrics};
use super::stage::Stage;
use super::task::BoxedTask;
use firstboot_shared::errors::FirstbootResult;
use std::time::Instant;

pub struct ExecutionPlan<Ctx> {
    stages: Vec<Stage<BoxedTask<Ctx>>>,
}

impl<Ctx> ExecutionPlan<Ctx> {
    pub fn new(stages: Vec<Stage<BoxedTask<Ctx>>>) -> Self {
        Self { stages }
    }

    pub fn stages(self) -> Vec<Stage<BoxedTask<Ctx>>> {
        self.stages
    }
}

/// Pipeline executor framework.
///
/// This provides the generic infrastructure for executing a table-driven pipeline.
/// The actual task execution logic is provided by task implementations.
pub struct PipelineExecutor;

impl PipelineExecutor {
    /// Execute a plan.
    ///
    /// Iterates through stages and runs each stage's tasks in order. Stops at
    /// the first task error and returns it.
    pub fn execute<Ctx>(plan: ExecutionPlan<Ctx>, ctx: &mut Ctx) -> FirstbootResult<PipelineMetrics> {
        let total_start = Instant::now();
        let mut stage_metrics = Vec::new();

        for (index, stage) in plan.stages().into_iter().enumerate() {
            let stage_start = Instant::now();
            let mut task_metrics = Vec::with_capacity(stage.tasks.len());

            for task in stage.tasks {
                let name = task.name().to_string();
                let task_start = Instant::now();
                tracing::debug!(stage = stage.name, task = %name, "Task starting");

                task.run(ctx).inspect_err(|e| {
                    tracing::error!(stage = stage.name, task = %name, error = %e, "Task failed");
                })?;

                task_metrics.push(TaskMetrics {
                    name,
                    duration_ms: task_start.elapsed().as_millis(),
                });
            }

            stage_metrics.push(StageMetrics {
                index,
                name: stage.name.to_string(),
                duration_ms: stage_start.elapsed().as_millis(),
                tasks: task_metrics,
            });
        }

        Ok(PipelineMetrics {
            total_duration_ms: total_start.elapsed().as_millis(),
            stages: stage_metrics,
        })
    }
}
