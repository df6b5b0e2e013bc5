use async_trait::async_trait;
use tracing::{debug, warn};

use crate::audit::AuditLog;
use crate::config::TransactionConfig;
use crate::context::ResultContext;
use crate::erased::{ErasedTask, TaskWrapper};
use crate::error::{RollbackError, TransactionError};
use crate::state::TransactionState;
use crate::task::Task;

/// An ordered list of tasks executed as a unit.
///
/// Tasks run one at a time in the order they were added. Each task sees the
/// results of the tasks before it through a [`ResultContext`]. If a task
/// fails, every task that already completed is rolled back in reverse order
/// and the failure is returned together with any rollback failures.
///
/// A transaction implements [`Task`], so it can be added to another
/// transaction. The outer transaction records the inner transaction's
/// [`ResultContext`] under the inner transaction's name and, if a later outer
/// task fails, rolls the whole inner transaction back as one unit.
pub struct Transaction {
    config: TransactionConfig,
    tasks: Vec<Box<dyn ErasedTask>>,
    state: TransactionState,
    results: ResultContext,
    audit_log: AuditLog,
}

impl Transaction {
    /// Create an empty transaction with default settings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(TransactionConfig::default().with_name(name))
    }

    #[must_use]
    pub fn with_config(config: TransactionConfig) -> Self {
        let audit_log = if config.audit() {
            AuditLog::new()
        } else {
            AuditLog::disabled()
        };
        Self {
            config,
            tasks: Vec::new(),
            state: TransactionState::NotStarted,
            results: ResultContext::new(),
            audit_log,
        }
    }

    /// Append a task. Tasks run in the order they are added.
    ///
    /// Adding tasks once execution has started is not supported.
    pub fn add<T>(&mut self, task: T) -> &mut Self
    where
        T: Task + 'static,
    {
        self.tasks.push(Box::new(TaskWrapper::new(task)));
        self
    }

    /// Append several tasks of the same type, keeping their order.
    pub fn add_all<I>(&mut self, tasks: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Task + 'static,
    {
        for task in tasks {
            self.add(task);
        }
        self
    }

    /// Builder-style [`add`](Self::add).
    #[must_use]
    pub fn with_task<T>(mut self, task: T) -> Self
    where
        T: Task + 'static,
    {
        self.add(task);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.config.name()
    }

    #[must_use]
    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Number of registered tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Names of the registered tasks in execution order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|task| task.name())
    }

    /// Results of the most recent execution.
    ///
    /// After a failed execution this holds the results of the tasks that
    /// completed before the failure; the final slot is empty.
    #[must_use]
    pub fn results(&self) -> &ResultContext {
        &self.results
    }

    /// Audit log of the most recent execution and any rollback since.
    #[must_use]
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit_log
    }

    /// Run every task in order and return the collected results.
    ///
    /// A transaction can be executed once. If a task fails, the tasks that
    /// completed before it are rolled back in reverse order and the
    /// transaction returns to [`TransactionState::NotStarted`], so it may be
    /// executed again.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::NoTasks`] if no task was added and
    /// [`TransactionError::AlreadyStarted`] if the transaction is not in the
    /// `NotStarted` state; in both cases no task runs. Returns
    /// [`TransactionError::TaskFailed`] if a task fails, carrying the task's
    /// error and every rollback error.
    pub async fn execute(&mut self) -> Result<ResultContext, TransactionError> {
        if self.tasks.is_empty() {
            return Err(TransactionError::NoTasks {
                transaction: self.name().to_string(),
            });
        }
        if self.state != TransactionState::NotStarted {
            return Err(TransactionError::AlreadyStarted {
                transaction: self.name().to_string(),
                state: self.state,
            });
        }

        self.state = TransactionState::Running;
        self.results = ResultContext::new();
        self.audit_log.clear();
        debug!(
            transaction = %self.config.name(),
            tasks = self.tasks.len(),
            "executing transaction"
        );

        let mut completed: Option<usize> = None;
        let mut failure = None;

        for (stage, task) in self.tasks.iter_mut().enumerate() {
            self.audit_log.record_start(task.name());

            match task.execute_erased(&self.results).await {
                Ok(value) => {
                    self.results.record(task.name(), value);
                    self.audit_log.record_success(task.rollback_description());
                    completed = Some(stage);
                    debug!(
                        transaction = %self.config.name(),
                        task = task.name(),
                        stage,
                        "task completed"
                    );
                }
                Err(cause) => {
                    self.audit_log.record_failure();
                    warn!(
                        transaction = %self.config.name(),
                        task = task.name(),
                        stage,
                        error = %cause,
                        "task failed, rolling back completed tasks"
                    );
                    failure = Some((stage, task.name().to_string(), cause));
                    break;
                }
            }
        }

        if let Some((stage, task, cause)) = failure {
            let rollback_errors = match completed {
                Some(last) => self.compensate(last).await,
                None => Vec::new(),
            };
            self.state = TransactionState::NotStarted;
            return Err(TransactionError::TaskFailed {
                transaction: self.name().to_string(),
                task,
                stage,
                cause,
                rollback_errors,
            });
        }

        if let Some(last) = self.results.get_at(self.tasks.len() - 1).cloned() {
            self.results.set_final(last);
        }
        self.state = TransactionState::Finished;
        debug!(transaction = %self.config.name(), "transaction finished");

        Ok(self.results.clone())
    }

    /// Roll back every task of a finished transaction, last task first.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::NotFinished`] unless the transaction is
    /// finished, and [`TransactionError::RollbackFailed`] if any task's
    /// rollback fails. Every task is attempted either way.
    pub async fn rollback(&mut self) -> Result<(), TransactionError> {
        let last = self.tasks.len().saturating_sub(1);
        self.rollback_to(last).await
    }

    /// Roll back the tasks at stages `stage` down to 0 of a finished
    /// transaction. Tasks after `stage` are left untouched.
    ///
    /// The transaction returns to [`TransactionState::NotStarted`] whether
    /// or not every rollback succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::NotFinished`] unless the transaction is
    /// finished, [`TransactionError::StageOutOfRange`] if `stage` is not a
    /// registered stage, and [`TransactionError::RollbackFailed`] if any
    /// task's rollback fails.
    pub async fn rollback_to(&mut self, stage: usize) -> Result<(), TransactionError> {
        if self.state != TransactionState::Finished {
            return Err(TransactionError::NotFinished {
                transaction: self.name().to_string(),
                state: self.state,
            });
        }
        if stage >= self.tasks.len() {
            return Err(TransactionError::StageOutOfRange {
                transaction: self.name().to_string(),
                stage,
                len: self.tasks.len(),
            });
        }

        debug!(
            transaction = %self.config.name(),
            stage,
            "rolling back finished transaction"
        );
        let errors = self.compensate(stage).await;
        self.state = TransactionState::NotStarted;

        if errors.is_empty() {
            Ok(())
        } else {
            Err(TransactionError::RollbackFailed {
                transaction: self.name().to_string(),
                errors,
            })
        }
    }

    /// Attempt rollback of stages `through..=0` exactly once each, in
    /// descending order, collecting every failure.
    async fn compensate(&mut self, through: usize) -> Vec<RollbackError> {
        let mut errors = Vec::new();

        for (stage, task) in self.tasks.iter_mut().enumerate().take(through + 1).rev() {
            match task.rollback_erased(&self.results).await {
                Ok(()) => {
                    self.audit_log.record_rolled_back(stage);
                    debug!(
                        transaction = %self.config.name(),
                        task = task.name(),
                        stage,
                        "task rolled back"
                    );
                }
                Err(error) => {
                    self.audit_log.record_rollback_failed(stage);
                    warn!(
                        transaction = %self.config.name(),
                        task = task.name(),
                        stage,
                        error = %error,
                        "task rollback failed"
                    );
                    errors.push(RollbackError {
                        task: task.name().to_string(),
                        stage,
                        description: task.rollback_description(),
                        error,
                    });
                }
            }
        }

        errors
    }
}

#[async_trait]
impl Task for Transaction {
    type Output = ResultContext;
    type Error = TransactionError;

    fn name(&self) -> &str {
        self.config.name()
    }

    async fn execute(&mut self, _ctx: &ResultContext) -> Result<Self::Output, Self::Error> {
        Transaction::execute(self).await
    }

    async fn rollback(&mut self, _ctx: &ResultContext) -> Result<(), Self::Error> {
        Transaction::rollback(self).await
    }

    fn rollback_description(&self) -> String {
        format!(
            "roll back {} task(s) of transaction '{}'",
            self.tasks.len(),
            self.config.name()
        )
    }
}
