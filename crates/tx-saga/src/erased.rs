use async_trait::async_trait;

use crate::context::ResultContext;
use crate::error::BoxError;
use crate::task::Task;
use crate::value::TaskValue;

/// Object-safe view of a [`Task`] so tasks with different output and error
/// types can live in one list.
#[async_trait]
pub(crate) trait ErasedTask: Send {
    fn name(&self) -> &str;

    async fn execute_erased(&mut self, ctx: &ResultContext) -> Result<TaskValue, BoxError>;

    async fn rollback_erased(&mut self, ctx: &ResultContext) -> Result<(), BoxError>;

    fn rollback_description(&self) -> String;
}

pub(crate) struct TaskWrapper<T> {
    task: T,
}

impl<T> TaskWrapper<T> {
    pub(crate) fn new(task: T) -> Self {
        Self { task }
    }
}

#[async_trait]
impl<T> ErasedTask for TaskWrapper<T>
where
    T: Task,
{
    fn name(&self) -> &str {
        self.task.name()
    }

    async fn execute_erased(&mut self, ctx: &ResultContext) -> Result<TaskValue, BoxError> {
        let output = self.task.execute(ctx).await?;
        Ok(TaskValue::new(output))
    }

    async fn rollback_erased(&mut self, ctx: &ResultContext) -> Result<(), BoxError> {
        self.task.rollback(ctx).await?;
        Ok(())
    }

    fn rollback_description(&self) -> String {
        self.task.rollback_description()
    }
}
