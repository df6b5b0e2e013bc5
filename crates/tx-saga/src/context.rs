use std::any::Any;

use indexmap::IndexMap;

use crate::value::TaskValue;

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    value: TaskValue,
}

/// Results of the tasks that have completed so far, in completion order.
///
/// Each entry is addressable both by its stage (the 0-based position of the
/// task) and by the task's name. After every task of a transaction succeeds,
/// the final slot holds the result of the last task.
///
/// Task names are not required to be unique. When two tasks share a name the
/// later one wins the name lookup; both stay reachable by stage.
#[derive(Debug, Clone, Default)]
pub struct ResultContext {
    entries: Vec<Entry>,
    by_name: IndexMap<String, usize>,
    final_value: Option<TaskValue>,
}

impl ResultContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Result recorded under the task name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TaskValue> {
        self.by_name
            .get(name)
            .and_then(|&stage| self.get_at(stage))
    }

    /// Result recorded at the stage.
    #[must_use]
    pub fn get_at(&self, stage: usize) -> Option<&TaskValue> {
        self.entries.get(stage).map(|entry| &entry.value)
    }

    /// Result recorded under the task name, borrowed as `T`.
    #[must_use]
    pub fn get_as<T: Any>(&self, name: &str) -> Option<&T> {
        self.get(name).and_then(TaskValue::downcast_ref::<T>)
    }

    /// Result recorded at the stage, borrowed as `T`.
    #[must_use]
    pub fn get_at_as<T: Any>(&self, stage: usize) -> Option<&T> {
        self.get_at(stage).and_then(TaskValue::downcast_ref::<T>)
    }

    /// Result of the last task, present only once every task has succeeded.
    #[must_use]
    pub fn final_value(&self) -> Option<&TaskValue> {
        self.final_value.as_ref()
    }

    /// The final result borrowed as `T`.
    #[must_use]
    pub fn final_as<T: Any>(&self) -> Option<&T> {
        self.final_value().and_then(TaskValue::downcast_ref::<T>)
    }

    /// Name of the task that completed at the stage.
    #[must_use]
    pub fn name_at(&self, stage: usize) -> Option<&str> {
        self.entries.get(stage).map(|entry| entry.name.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of recorded results, not counting the final slot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(stage, name, value)` in completion order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, &TaskValue)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(stage, entry)| (stage, entry.name.as_str(), &entry.value))
    }

    /// Append the result of the task that just completed and return its stage.
    pub(crate) fn record(&mut self, name: &str, value: TaskValue) -> usize {
        let stage = self.entries.len();
        self.entries.push(Entry {
            name: name.to_string(),
            value,
        });
        self.by_name.insert(name.to_string(), stage);
        stage
    }

    pub(crate) fn set_final(&mut self, value: TaskValue) {
        self.final_value = Some(value);
    }
}
