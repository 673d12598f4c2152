//! Task-engine-backed implementation of the refinement task directory.

use async_trait::async_trait;
use std::sync::Arc;

use crate::refinement::ports::{TaskAccessView, TaskDirectory, TaskDirectoryError};
use crate::task::{domain::TaskId, ports::TaskRepository};

/// Adapter exposing task ownership and visibility to the refinement
/// thread through the [`TaskDirectory`] port.
#[derive(Debug, Clone)]
pub struct LifecycleTaskDirectory<R>
where
    R: TaskRepository,
{
    tasks: Arc<R>,
}

impl<R> LifecycleTaskDirectory<R>
where
    R: TaskRepository,
{
    /// Creates a directory over the given task repository.
    #[must_use]
    pub const fn new(tasks: Arc<R>) -> Self {
        Self { tasks }
    }
}

#[async_trait]
impl<R> TaskDirectory for LifecycleTaskDirectory<R>
where
    R: TaskRepository,
{
    async fn access_view(
        &self,
        id: TaskId,
    ) -> Result<Option<TaskAccessView>, TaskDirectoryError> {
        let task = self
            .tasks
            .find(id)
            .await
            .map_err(TaskDirectoryError::unavailable)?;
        Ok(task.map(|task| TaskAccessView {
            owner: task.owner().clone(),
            shared_with: task.shares().iter().cloned().collect(),
        }))
    }
}
