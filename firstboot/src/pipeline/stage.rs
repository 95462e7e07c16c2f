//! Stage definition for table-driven pipeline execution.

/// A named group of tasks, executed in order.
///
/// Generic over task type T to allow different pipeline implementations.
#[derive(Debug, Clone)]
pub struct Stage<T> {
    pub name: &'static str,
    pub tasks: Vec<T>,
}

impl<T> Stage<T> {
    pub fn new(name: &'static str, tasks: Vec<T>) -> Self {
        Self { name, tasks }
    }
}
