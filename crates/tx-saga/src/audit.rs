use std::time::Instant;

/// Status of a task in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TaskStatus {
    /// Task executed successfully.
    Executed,
    /// Task failed during execution.
    Failed,
    /// Task was rolled back successfully.
    RolledBack,
    /// Task rollback failed.
    RollbackFailed,
}

/// Record of one task's execution in a transaction.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    /// Name of the task.
    pub name: String,
    /// Stage of the task within the transaction.
    pub stage: usize,
    /// Current status.
    pub status: TaskStatus,
    /// When the task started executing.
    pub started_at: Instant,
    /// When the task completed (execution or rollback).
    pub completed_at: Option<Instant>,
    /// Description of the rollback (if the task executed).
    pub rollback_description: Option<String>,
}

/// Audit log tracking the tasks of the most recent execution.
///
/// Records are kept in stage order. A disabled log ignores every update.
#[derive(Debug, Clone)]
pub struct AuditLog {
    records: Vec<TaskRecord>,
    enabled: bool,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLog {
    /// Create a new empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            enabled: true,
        }
    }

    /// Create a log that records nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            records: Vec::new(),
            enabled: false,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Drop all records, keeping the enabled flag.
    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }

    pub(crate) fn record_start(&mut self, name: &str) {
        if !self.enabled {
            return;
        }
        let stage = self.records.len();
        self.records.push(TaskRecord {
            name: name.to_string(),
            stage,
            status: TaskStatus::Executed,
            started_at: Instant::now(),
            completed_at: None,
            rollback_description: None,
        });
    }

    /// Mark the last task as failed.
    pub(crate) fn record_failure(&mut self) {
        if let Some(record) = self.records.last_mut() {
            record.status = TaskStatus::Failed;
            record.completed_at = Some(Instant::now());
        }
    }

    /// Mark the last task as completed successfully.
    pub(crate) fn record_success(&mut self, rollback_description: String) {
        if let Some(record) = self.records.last_mut() {
            record.status = TaskStatus::Executed;
            record.completed_at = Some(Instant::now());
            record.rollback_description = Some(rollback_description);
        }
    }

    pub(crate) fn record_rolled_back(&mut self, stage: usize) {
        self.update(stage, TaskStatus::RolledBack);
    }

    pub(crate) fn record_rollback_failed(&mut self, stage: usize) {
        self.update(stage, TaskStatus::RollbackFailed);
    }

    fn update(&mut self, stage: usize, status: TaskStatus) {
        if let Some(record) = self.records.get_mut(stage) {
            record.status = status;
            record.completed_at = Some(Instant::now());
        }
    }

    /// Get all records in the audit log.
    #[must_use]
    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    /// Get a summary of the execution for display.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for record in &self.records {
            let status = match record.status {
                TaskStatus::Executed => "✓",
                TaskStatus::Failed => "✗",
                TaskStatus::RolledBack => "↩",
                TaskStatus::RollbackFailed => "⚠",
            };
            lines.push(format!("{status} {}", record.name));
        }
        lines.join("\n")
    }
}
