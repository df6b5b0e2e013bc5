//! Integration tests for transactions nested inside transactions.

mod common;

use async_trait::async_trait;
use common::{CallLog, RecordingTask, TestError};
use tx_saga::{ResultContext, Task, Transaction, TransactionError};

/// Reads the final value of a nested transaction and adds to it.
struct UseInner {
    inner: &'static str,
}

#[async_trait]
impl Task for UseInner {
    type Output = i32;
    type Error = TestError;

    fn name(&self) -> &str {
        "use_inner"
    }

    async fn execute(&mut self, ctx: &ResultContext) -> Result<Self::Output, Self::Error> {
        let inner = ctx
            .get_as::<ResultContext>(self.inner)
            .ok_or_else(|| TestError("inner results missing".to_string()))?;
        let final_value = inner
            .final_as::<i32>()
            .ok_or_else(|| TestError("inner final missing".to_string()))?;
        Ok(final_value * 10)
    }
}

fn inner_transaction(log: &CallLog) -> Transaction {
    Transaction::new("inner")
        .with_task(RecordingTask::new("inner_a", 1, log))
        .with_task(RecordingTask::new("inner_b", 2, log))
}

#[tokio::test]
async fn inner_results_are_visible_under_the_inner_name() -> anyhow::Result<()> {
    let log = CallLog::default();
    let mut outer = Transaction::new("outer");
    outer
        .add(inner_transaction(&log))
        .add(UseInner { inner: "inner" });

    let results = outer.execute().await?;

    let inner = results
        .get_as::<ResultContext>("inner")
        .expect("inner results recorded");
    assert_eq!(inner.final_as::<i32>(), Some(&2));
    assert_eq!(inner.get_as::<i32>("inner_a"), Some(&1));
    assert_eq!(inner.get_at_as::<i32>(1), Some(&2));
    assert_eq!(results.get_as::<i32>("use_inner"), Some(&20));
    assert_eq!(results.final_as::<i32>(), Some(&20));
    assert!(!results.contains("inner_a"));
    Ok(())
}

#[tokio::test]
async fn later_outer_failure_rolls_back_finished_inner_as_one_unit() {
    let log = CallLog::default();
    let mut outer = Transaction::new("outer");
    outer
        .add(RecordingTask::new("before", 0, &log))
        .add(inner_transaction(&log))
        .add(RecordingTask::failing("after", &log));

    let err = outer.execute().await.expect_err("after fails");

    assert_eq!(
        log.entries(),
        vec![
            "execute before",
            "execute inner_a",
            "execute inner_b",
            "execute after",
            "rollback inner_b",
            "rollback inner_a",
            "rollback before",
        ]
    );
    assert_eq!(err.failed_task(), Some("after"));
    assert!(err.rollback_errors().is_empty());
}

#[tokio::test]
async fn failing_inner_compensates_itself_and_fails_the_outer() {
    let log = CallLog::default();
    let inner = Transaction::new("inner")
        .with_task(RecordingTask::new("inner_a", 1, &log))
        .with_task(RecordingTask::failing("inner_b", &log));
    let mut outer = Transaction::new("outer");
    outer
        .add(RecordingTask::new("before", 0, &log))
        .add(inner)
        .add(RecordingTask::new("after", 2, &log));

    let err = outer.execute().await.expect_err("inner fails");

    assert_eq!(
        log.entries(),
        vec![
            "execute before",
            "execute inner_a",
            "execute inner_b",
            "rollback inner_a",
            "rollback before",
        ]
    );
    assert_eq!(err.failed_task(), Some("inner"));
    let inner_err = err
        .cause()
        .and_then(|cause| cause.downcast_ref::<TransactionError>())
        .expect("cause is the inner transaction error");
    assert_eq!(inner_err.failed_task(), Some("inner_b"));
}

#[tokio::test]
async fn inner_rollback_failures_surface_as_one_outer_rollback_error() {
    let log = CallLog::default();
    let inner = Transaction::new("inner")
        .with_task(RecordingTask::new("inner_a", 1, &log).with_failing_rollback())
        .with_task(RecordingTask::new("inner_b", 2, &log));
    let mut outer = Transaction::new("outer");
    outer
        .add(inner)
        .add(RecordingTask::failing("after", &log));

    let err = outer.execute().await.expect_err("after fails");

    let rollback_errors = err.rollback_errors();
    assert_eq!(rollback_errors.len(), 1);
    assert_eq!(rollback_errors[0].task, "inner");
    assert_eq!(
        rollback_errors[0].description,
        "roll back 2 task(s) of transaction 'inner'"
    );
    let inner_err = rollback_errors[0]
        .error
        .downcast_ref::<TransactionError>()
        .expect("inner rollback error");
    assert!(matches!(
        inner_err,
        TransactionError::RollbackFailed { errors, .. } if errors.len() == 1 && errors[0].task == "inner_a"
    ));
    assert_eq!(
        log.rollbacks(),
        vec!["rollback inner_b", "rollback inner_a"]
    );
}

#[tokio::test]
async fn transactions_nest_more_than_one_level() -> anyhow::Result<()> {
    let log = CallLog::default();
    let innermost = Transaction::new("innermost").with_task(RecordingTask::new("leaf", 5, &log));
    let middle = Transaction::new("middle").with_task(innermost);
    let mut outer = Transaction::new("outer");
    outer.add(middle);

    let results = outer.execute().await?;

    let leaf = results
        .final_as::<ResultContext>()
        .and_then(|middle| middle.final_as::<ResultContext>())
        .and_then(|innermost| innermost.final_as::<i32>());
    assert_eq!(leaf, Some(&5));
    Ok(())
}
