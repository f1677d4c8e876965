use std::collections::TryReserveError;

use smallvec::CollectionAllocErr;
use thiserror::Error;

use crate::StateId;

#[derive(Error, Debug)]
pub enum FsmError {
    /// Storage for states, edges or a queue could not be obtained.
    #[error("allocation failed")]
    Alloc,

    /// The automaton already holds as many states as its options allow.
    #[error("state limit of {limit} reached")]
    StateLimit { limit: usize },

    /// Duplication was asked for an empty or inverted range of states.
    #[error("nothing captured in [{start}, {end})")]
    EmptyCapture { start: StateId, end: StateId },

    #[error("queue capacity must be non-zero")]
    ZeroCapacity,

    #[error("invalid options: {0}")]
    Options(#[from] serde_json::Error),
}

impl From<TryReserveError> for FsmError {
    fn from(_: TryReserveError) -> Self {
        FsmError::Alloc
    }
}

impl From<CollectionAllocErr> for FsmError {
    fn from(_: CollectionAllocErr) -> Self {
        FsmError::Alloc
    }
}
