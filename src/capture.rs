//! Cloning a contiguous range of states.
//!
//! A fragment built between [`Capture::start`] and [`Capture::stop`] occupies the half-open
//! range of states allocated meanwhile. [`Fsm::capture_duplicate`] copies that range behind the
//! existing states, together with the epsilon and literal edges that stay inside it. Edges
//! leaving the range are not copied.

use crate::error::FsmError;
use crate::fsm::Fsm;
use crate::StateId;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Capture {
    pub start: StateId,
    pub end: StateId,
}

impl Capture {
    pub fn start(fsm: &Fsm) -> Self {
        let n = fsm.count_states() as StateId;
        Capture { start: n, end: n }
    }

    pub fn stop(&mut self, fsm: &Fsm) {
        self.end = fsm.count_states() as StateId;
    }

    pub fn contains(&self, state: StateId) -> bool {
        self.start <= state && state < self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Duplicate {
    /// The copy of `capture.start`.
    pub start: StateId,
    /// The copy of the tracked state, or the tracked state itself if it lies outside the range.
    pub tracked: Option<StateId>,
}

impl Fsm {
    /// Copies the captured states and the edges between them into fresh states.
    ///
    /// On failure the states and edges created so far are left in place; the automaton should
    /// be discarded.
    pub fn capture_duplicate(
        &mut self,
        capture: &Capture,
        tracked: Option<StateId>,
    ) -> Result<Duplicate, FsmError> {
        let Capture { start: old_start, end: old_end } = *capture;
        debug_assert!(tracked.map_or(true, |x| capture.contains(x)));

        if capture.is_empty() {
            return Err(FsmError::EmptyCapture { start: old_start, end: old_end });
        }
        assert!(old_end as usize <= self.count_states());

        let new_start = self.count_states() as StateId;
        for old in old_start..old_end {
            let q = self.add_state()?;
            debug_assert_eq!(q, new_start + (old - old_start));
            self.set_end(q, self.is_end(old));
        }

        let offset = new_start - old_start;
        let (old_states, new_states) = self.states.split_at_mut(new_start as usize);
        let sources = &old_states[old_start as usize..old_end as usize];
        for (src, dst) in sources.iter().zip(new_states.iter_mut()) {
            for old_dst in src.epsilons.iter().filter(|s| capture.contains(*s)) {
                dst.epsilons.insert(old_dst + offset)?;
            }
            for edge in src.edges.iter().filter(|edge| capture.contains(edge.state)) {
                dst.edges.insert(edge.symbol, edge.state + offset)?;
            }
        }

        let tracked = tracked.map(|x| if capture.contains(x) { x + offset } else { x });
        tracing::debug!(old_start, old_end, new_start, "duplicated captured states");
        Ok(Duplicate { start: new_start, tracked })
    }
}
