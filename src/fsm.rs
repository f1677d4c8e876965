use crate::bitmap::SymbolBitmap;
use crate::edge_set::EdgeSet;
use crate::error::FsmError;
use crate::options::FsmOptions;
use crate::queue::Queue;
use crate::state_set::StateSet;
use crate::StateId;

#[derive(Clone, Default, Debug)]
pub struct State {
    pub edges: EdgeSet,
    pub epsilons: StateSet,
    pub end: bool,
}

/// An automaton over bytes. States are numbered densely from zero in allocation order.
#[derive(Clone, Debug, Default)]
pub struct Fsm {
    opts: FsmOptions,
    pub(crate) states: Vec<State>,
    start: Option<StateId>,
}

impl Fsm {
    pub fn new(opts: FsmOptions) -> Result<Self, FsmError> {
        let mut states = Vec::new();
        states.try_reserve(opts.state_capacity)?;
        Ok(Fsm { opts, states, start: None })
    }

    pub fn options(&self) -> &FsmOptions {
        &self.opts
    }

    fn reserve_states(&mut self, n: usize) -> Result<(), FsmError> {
        let wanted = self.states.len() + n;
        if let Some(limit) = self.opts.max_states {
            if wanted > limit {
                tracing::warn!(limit, wanted, "refusing to grow past the state limit");
                return Err(FsmError::StateLimit { limit });
            }
        }
        if wanted > StateId::MAX as usize {
            return Err(FsmError::StateLimit { limit: StateId::MAX as usize });
        }
        self.states.try_reserve(n)?;
        Ok(())
    }

    pub fn add_state(&mut self) -> Result<StateId, FsmError> {
        self.reserve_states(1)?;
        let id = self.states.len() as StateId;
        self.states.push(State::default());
        Ok(id)
    }

    pub fn count_states(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id as usize]
    }

    pub fn edges(&self, id: StateId) -> &EdgeSet {
        &self.state(id).edges
    }

    pub fn epsilons(&self, id: StateId) -> &StateSet {
        &self.state(id).epsilons
    }

    pub fn start(&self) -> Option<StateId> {
        self.start
    }

    pub fn set_start(&mut self, id: StateId) {
        self.check(id);
        self.start = Some(id);
    }

    pub fn clear_start(&mut self) {
        self.start = None;
    }

    pub fn is_end(&self, id: StateId) -> bool {
        self.state(id).end
    }

    pub fn set_end(&mut self, id: StateId, end: bool) {
        self.states[id as usize].end = end;
    }

    pub fn add_edge_literal(
        &mut self,
        from: StateId,
        to: StateId,
        symbol: u8,
    ) -> Result<(), FsmError> {
        self.check(to);
        self.states[from as usize].edges.insert(symbol, to)
    }

    pub fn add_edge_epsilon(&mut self, from: StateId, to: StateId) -> Result<(), FsmError> {
        self.check(to);
        self.states[from as usize].epsilons.insert(to)?;
        Ok(())
    }

    pub fn add_edges_to_set(
        &mut self,
        from: StateId,
        symbol: u8,
        to: &StateSet,
    ) -> Result<(), FsmError> {
        to.iter().for_each(|state| self.check(state));
        self.states[from as usize].edges.insert_many(symbol, to)
    }

    fn check(&self, id: StateId) {
        assert!((id as usize) < self.states.len(), "state {id} does not exist");
    }

    /// States reachable from `state` through epsilon edges only, `state` included.
    pub fn epsilon_closure(&self, state: StateId) -> Result<StateSet, FsmError> {
        self.check(state);
        let mut closure = StateSet::singleton(state);
        let mut queue = Queue::new(self.states.len())?;
        queue.push(state);
        while let Some(q) = queue.pop() {
            for next in self.epsilons(q).iter() {
                if closure.insert(next)? {
                    let pushed = queue.push(next);
                    debug_assert!(pushed);
                }
            }
        }
        Ok(closure)
    }

    /// Whether some symbol leaves the epsilon closure of `state` more than once.
    pub fn has_nondeterminism(&self, state: StateId) -> Result<bool, FsmError> {
        let mut bm = SymbolBitmap::new();
        for q in self.epsilon_closure(state)?.iter() {
            if self.edges(q).has_nondeterminism(&mut bm) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn is_dfa(&self) -> bool {
        let mut bm = SymbolBitmap::new();
        self.states.iter().all(|state| {
            bm.reset();
            state.epsilons.is_empty() && !state.edges.has_nondeterminism(&mut bm)
        })
    }

    pub fn transition(&self, state: StateId, symbol: u8) -> Option<StateId> {
        self.edges(state).transition(symbol)
    }

    /// Walks a DFA from its start state, returning where the input ends up.
    pub fn run(&self, input: &[u8]) -> Option<StateId> {
        input.iter().try_fold(self.start?, |state, symbol| self.transition(state, *symbol))
    }

    pub fn accepts(&self, input: &[u8]) -> bool {
        self.run(input).is_some_and(|state| self.is_end(state))
    }

    /// Appends the states of `other` behind the states of `self` and returns the id that
    /// `other`'s state 0 got. The start state of `self` is kept.
    pub fn merge(&mut self, other: Fsm) -> Result<StateId, FsmError> {
        self.reserve_states(other.states.len())?;
        let base = self.states.len() as StateId;
        for mut state in other.states {
            state.edges.rebase(base);
            state.epsilons.rebase(base);
            self.states.push(state);
        }
        tracing::debug!(base, states = self.states.len(), "merged automata");
        Ok(base)
    }

    /// Deletes the states selected by `doomed` and renumbers the rest densely, keeping their
    /// order. Edges into deleted states disappear. Returns how many states were deleted.
    pub fn remove_states<F: FnMut(StateId) -> bool>(
        &mut self,
        mut doomed: F,
    ) -> Result<usize, FsmError> {
        let mut remap: Vec<Option<StateId>> = Vec::new();
        remap.try_reserve_exact(self.states.len())?;
        let mut next: StateId = 0;
        for id in 0..self.states.len() as StateId {
            if doomed(id) {
                remap.push(None);
            } else {
                remap.push(Some(next));
                next += 1;
            }
        }

        let mut id = 0;
        self.states.retain(|_| {
            let keep = remap[id].is_some();
            id += 1;
            keep
        });
        for state in self.states.iter_mut() {
            state.edges.compact(|s| remap[s as usize]);
            state.epsilons.compact(|s| remap[s as usize]);
        }
        self.start = self.start.and_then(|s| remap[s as usize]);

        let removed = remap.len() - self.states.len();
        tracing::debug!(removed, remaining = self.states.len(), "removed states");
        Ok(removed)
    }

    /// Removes every state that cannot be reached from the start state.
    pub fn trim(&mut self) -> Result<usize, FsmError> {
        let mut reachable = Vec::new();
        reachable.try_reserve_exact(self.states.len())?;
        reachable.resize(self.states.len(), false);

        if let Some(start) = self.start {
            let mut queue = Queue::new(self.states.len())?;
            reachable[start as usize] = true;
            queue.push(start);
            while let Some(q) = queue.pop() {
                let state = &self.states[q as usize];
                let nexts = state.epsilons.iter().chain(state.edges.iter().map(|edge| edge.state));
                for next in nexts {
                    if !reachable[next as usize] {
                        reachable[next as usize] = true;
                        let pushed = queue.push(next);
                        debug_assert!(pushed);
                    }
                }
            }
        }

        self.remove_states(|id| !reachable[id as usize])
    }
}
