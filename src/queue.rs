use crate::error::FsmError;
use crate::StateId;

/// Fixed-capacity FIFO of states, used by the worklist walks over an automaton.
pub struct Queue {
    buf: Box<[StateId]>,
    head: usize,
    len: usize,
}

impl Queue {
    pub fn new(capacity: usize) -> Result<Self, FsmError> {
        if capacity == 0 {
            return Err(FsmError::ZeroCapacity);
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)?;
        buf.resize(capacity, 0);
        Ok(Queue { buf: buf.into_boxed_slice(), head: 0, len: 0 })
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `false` and leaves the queue untouched when it is full.
    pub fn push(&mut self, state: StateId) -> bool {
        if self.len == self.capacity() {
            return false;
        }
        let tail = (self.head + self.len) % self.capacity();
        self.buf[tail] = state;
        self.len += 1;
        true
    }

    pub fn pop(&mut self) -> Option<StateId> {
        if self.len == 0 {
            return None;
        }
        let state = self.buf[self.head];
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        Some(state)
    }
}
