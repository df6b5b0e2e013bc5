//! Tasks shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tx_saga::{ResultContext, Task};

/// Ordered record of every execute and rollback call, shared between tasks.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: String) {
        self.0.lock().expect("call log lock").push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().expect("call log lock").clone()
    }

    pub fn rollbacks(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.starts_with("rollback "))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TestError(pub String);

/// A task that returns a fixed value and can be told to fail either step.
pub struct RecordingTask {
    name: String,
    output: i32,
    fail_execute: bool,
    fail_rollback: bool,
    log: CallLog,
}

impl RecordingTask {
    pub fn new(name: &str, output: i32, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            output,
            fail_execute: false,
            fail_rollback: false,
            log: log.clone(),
        }
    }

    pub fn failing(name: &str, log: &CallLog) -> Self {
        Self {
            fail_execute: true,
            ..Self::new(name, 0, log)
        }
    }

    pub fn with_failing_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }
}

#[async_trait]
impl Task for RecordingTask {
    type Output = i32;
    type Error = TestError;

    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&mut self, _ctx: &ResultContext) -> Result<Self::Output, Self::Error> {
        self.log.push(format!("execute {}", self.name));
        tokio::task::yield_now().await;
        if self.fail_execute {
            Err(TestError(format!("{} failed", self.name)))
        } else {
            Ok(self.output)
        }
    }

    async fn rollback(&mut self, _ctx: &ResultContext) -> Result<(), Self::Error> {
        self.log.push(format!("rollback {}", self.name));
        tokio::task::yield_now().await;
        if self.fail_rollback {
            Err(TestError(format!("{} rollback failed", self.name)))
        } else {
            Ok(())
        }
    }
}

/// Adds a constant to the `i32` result of an earlier task.
pub struct AddToPrevious {
    name: &'static str,
    source: &'static str,
    amount: i32,
}

impl AddToPrevious {
    pub fn new(name: &'static str, source: &'static str, amount: i32) -> Self {
        Self {
            name,
            source,
            amount,
        }
    }
}

#[async_trait]
impl Task for AddToPrevious {
    type Output = i32;
    type Error = TestError;

    fn name(&self) -> &str {
        self.name
    }

    async fn execute(&mut self, ctx: &ResultContext) -> Result<Self::Output, Self::Error> {
        let previous = ctx
            .get_as::<i32>(self.source)
            .ok_or_else(|| TestError(format!("no i32 result for '{}'", self.source)))?;
        Ok(previous + self.amount)
    }
}
