use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TaskMetrics {
    pub name: String,
    pub duration_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageMetrics {
    pub index: usize,
    pub name: String,
    pub duration_ms: u128,
    pub tasks: Vec<TaskMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineMetrics {
    pub total_duration_ms: u128,
    pub stages: Vec<StageMetrics>,
}

impl PipelineMetrics {
    pub fn task_duration_ms(&self, name: &str) -> Option<u128> {
        self.stages
            .iter()
            .flat_map(|stage| stage.tasks.iter())
            .find(|task| task.name == name)
            .map(|task| task.duration_ms)
    }

    /// Names of all executed tasks, in execution order.
    pub fn task_names(&self) -> Vec<&str> {
        self.stages
            .iter()
            .flat_map(|stage| stage.tasks.iter())
            .map(|task| task.name.as_str())
            .collect()
    }
}
