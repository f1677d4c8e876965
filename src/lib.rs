//! Transition storage for byte automata.
//!
//! Every state of an [`Fsm`] owns an [`EdgeSet`] of literal edges and a [`StateSet`] of epsilon
//! edges. Edge sets are tuned for the common case of a single edge and are kept consistent with
//! the state numbering through `compact`, `rebase` and `replace_state` when states are deleted,
//! renumbered or spliced in from another automaton.

pub mod bitmap;
pub mod capture;
pub mod edge_set;
pub mod error;
pub mod fsm;
pub mod options;
pub mod queue;
pub mod state_set;

pub type StateId = u32;

pub use bitmap::SymbolBitmap;
pub use capture::{Capture, Duplicate};
pub use edge_set::{Edge, EdgeIter, EdgeSet};
pub use error::FsmError;
pub use fsm::{Fsm, State};
pub use options::FsmOptions;
pub use queue::Queue;
pub use state_set::StateSet;
