use std::fmt;

/// Lifecycle of a transaction.
///
/// A transaction starts in `NotStarted`, moves to `Running` while its tasks
/// execute and to `Finished` once all of them succeed. Any rollback, whether
/// triggered by a failing task or requested on a finished transaction,
/// returns it to `NotStarted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionState {
    #[default]
    NotStarted,
    Running,
    Finished,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotStarted => "not started",
            Self::Running => "running",
            Self::Finished => "finished",
        };
        f.write_str(label)
    }
}
