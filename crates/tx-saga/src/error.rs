use thiserror::Error;

use crate::state::TransactionState;

/// Boxed error carried across the task boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failed rollback of one task.
#[derive(Debug, Error)]
#[error("rollback failed for task '{task}' at stage {stage}: {description}")]
pub struct RollbackError {
    /// Name of the task whose rollback failed.
    pub task: String,
    /// Stage of the task within its transaction.
    pub stage: usize,
    /// Description of what the rollback was trying to do.
    pub description: String,
    /// The underlying error.
    #[source]
    pub error: BoxError,
}

/// Error from executing or rolling back a transaction.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransactionError {
    #[error("transaction '{transaction}' has no tasks to execute")]
    NoTasks { transaction: String },

    #[error("transaction '{transaction}' cannot be executed: it is {state}")]
    AlreadyStarted {
        transaction: String,
        state: TransactionState,
    },

    #[error("transaction '{transaction}' cannot be rolled back: it is {state}")]
    NotFinished {
        transaction: String,
        state: TransactionState,
    },

    #[error("transaction '{transaction}' has no stage {stage} ({len} task(s) registered)")]
    StageOutOfRange {
        transaction: String,
        stage: usize,
        len: usize,
    },

    /// A task failed; every task before it was rolled back, and
    /// `rollback_errors` lists the rollbacks that failed in attempt order.
    #[error(
        "task '{task}' failed in transaction '{transaction}'{}",
        rollback_suffix(rollback_errors)
    )]
    TaskFailed {
        transaction: String,
        task: String,
        stage: usize,
        #[source]
        cause: BoxError,
        rollback_errors: Vec<RollbackError>,
    },

    /// A requested rollback of a finished transaction failed for some tasks.
    #[error("rollback of transaction '{transaction}' failed for {} task(s)", errors.len())]
    RollbackFailed {
        transaction: String,
        errors: Vec<RollbackError>,
    },
}

fn rollback_suffix(errors: &[RollbackError]) -> String {
    if errors.is_empty() {
        String::new()
    } else {
        format!(", and {} rollback(s) also failed", errors.len())
    }
}

impl TransactionError {
    /// Whether the error comes from calling an operation in the wrong state
    /// rather than from a task.
    #[must_use]
    pub fn is_invalid_operation(&self) -> bool {
        matches!(
            self,
            Self::NoTasks { .. }
                | Self::AlreadyStarted { .. }
                | Self::NotFinished { .. }
                | Self::StageOutOfRange { .. }
        )
    }

    /// The task failure that triggered rollback.
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::TaskFailed { cause, .. } => Some(&**cause),
            _ => None,
        }
    }

    /// Every rollback failure, in the order rollback was attempted.
    #[must_use]
    pub fn rollback_errors(&self) -> &[RollbackError] {
        match self {
            Self::TaskFailed {
                rollback_errors, ..
            } => rollback_errors,
            Self::RollbackFailed { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Name of the task whose execution failed.
    #[must_use]
    pub fn failed_task(&self) -> Option<&str> {
        match self {
            Self::TaskFailed { task, .. } => Some(task),
            _ => None,
        }
    }
}

/// Error loading a [`TransactionConfig`](crate::TransactionConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse transaction config")]
    Parse(#[from] toml::de::Error),
}
