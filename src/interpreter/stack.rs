use super::error::{RuntimeError, RuntimeResult};
use super::value::Value;

/// Fixed capacity of the execution stack, in value slots.
pub const STACK_CAPACITY: usize = 64;

/// Bounds-checked operand stack. Pushing past `STACK_CAPACITY` and popping
/// while empty both surface as typed runtime errors.
#[derive(Debug, Default)]
pub(super) struct Stack {
    slots: Vec<Value>,
}

impl Stack {
    pub(super) fn push(&mut self, value: Value) -> RuntimeResult<()> {
        if self.slots.len() == STACK_CAPACITY {
            return Err(RuntimeError::StackOverflow {
                capacity: STACK_CAPACITY,
            });
        }
        self.slots.push(value);
        Ok(())
    }

    pub(super) fn pop(&mut self) -> RuntimeResult<Value> {
        self.slots.pop().ok_or(RuntimeError::StackUnderflow)
    }

    /// Slots in push order; the last element is the top of the stack.
    pub(super) fn values(&self) -> &[Value] {
        &self.slots
    }
}
