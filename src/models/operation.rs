//! Lifecycle of a simulated chain operation: submit -> pending -> success | failure

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Operation<T> {
    #[default]
    Idle,
    Pending,
    Succeeded(T),
    Failed(String),
}

impl<T> Operation<T> {
    /// Mark the operation in flight. Returns false when one is already pending.
    pub fn begin(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        *self = Operation::Pending;
        true
    }

    pub fn finish<E: ToString>(&mut self, result: Result<T, E>) {
        *self = match result {
            Ok(value) => Operation::Succeeded(value),
            Err(e) => Operation::Failed(e.to_string()),
        };
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Operation::Pending)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Operation::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        *self = Operation::Idle;
    }
}
