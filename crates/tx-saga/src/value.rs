use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// Type-erased result produced by a task.
///
/// Cloning is cheap: clones share the same underlying value. The engine never
/// looks inside; tasks recover the concrete type with [`TaskValue::downcast_ref`].
#[derive(Clone)]
pub struct TaskValue {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl TaskValue {
    /// Wrap a value produced by a task.
    #[must_use]
    pub fn new<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Borrow the value as `T`, or `None` if it holds a different type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.value).downcast_ref::<T>()
    }

    /// Whether the value is a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        (*self.value).is::<T>()
    }

    /// Name of the type the value was created from.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether both handles point at the same value.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for TaskValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskValue")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}
