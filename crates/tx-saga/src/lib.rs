//! Compensating transactions for async multi-step operations.
//!
//! A [`Transaction`] runs an ordered list of [`Task`]s one at a time. Every
//! task sees the results of the tasks before it through a shared
//! [`ResultContext`]. If a task fails, every task that already completed is
//! rolled back in reverse order and the original failure is reported together
//! with any rollback failures. A transaction is itself a task, so
//! transactions nest to any depth.

mod audit;
mod config;
mod context;
mod erased;
mod error;
mod state;
mod task;
mod transaction;
mod value;

pub use audit::{AuditLog, TaskRecord, TaskStatus};
pub use config::TransactionConfig;
pub use context::ResultContext;
pub use error::{BoxError, ConfigError, RollbackError, TransactionError};
pub use state::TransactionState;
pub use task::Task;
pub use transaction::Transaction;
pub use value::TaskValue;
