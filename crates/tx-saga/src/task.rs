use async_trait::async_trait;

use crate::context::ResultContext;

/// A unit of work inside a transaction that can be executed and rolled back.
///
/// `execute` reads the results of the tasks that ran before it from the
/// context and produces this task's result. `rollback` undoes the effects of
/// a successful `execute` when a later task fails, or when a finished
/// transaction is rolled back by hand. A task that never awaits is simply a
/// synchronous task.
///
/// The context is shared read-only: the transaction records a task's output
/// only after its `execute` returns, so a task never sees its own result or
/// the results of later tasks.
#[async_trait]
pub trait Task: Send {
    /// Result recorded in the context under this task's name.
    type Output: Send + Sync + 'static;

    /// Error type for execution and rollback failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Name under which the result is recorded and errors are reported.
    fn name(&self) -> &str;

    /// Perform the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task fails. The owning transaction then rolls
    /// back every task that completed before this one.
    async fn execute(&mut self, ctx: &ResultContext) -> Result<Self::Output, Self::Error>;

    /// Undo the effects of a successful `execute`.
    ///
    /// Called at most once per successful execution. The default
    /// implementation does nothing, which suits read-only tasks.
    ///
    /// # Errors
    ///
    /// Returns an error if compensation fails. The error is collected and
    /// the remaining tasks are still rolled back.
    async fn rollback(&mut self, ctx: &ResultContext) -> Result<(), Self::Error> {
        let _ = ctx;
        Ok(())
    }

    /// Human-readable description of what rollback will do.
    fn rollback_description(&self) -> String {
        format!("undo {}", self.name())
    }
}
