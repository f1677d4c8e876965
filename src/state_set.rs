use smallvec::SmallVec;

use crate::error::FsmError;
use crate::StateId;

// Sorted and duplicate-free. A single member lives inline, which covers most epsilon sets.
#[derive(Clone, Default, PartialEq, Eq, Hash, Debug)]
pub struct StateSet(SmallVec<[StateId; 1]>);

impl StateSet {
    pub fn new() -> Self {
        StateSet(SmallVec::new())
    }

    pub fn singleton(state: StateId) -> Self {
        StateSet(SmallVec::from_elem(state, 1))
    }

    /// Returns whether the state was not present before.
    pub fn insert(&mut self, state: StateId) -> Result<bool, FsmError> {
        match self.0.binary_search(&state) {
            Ok(_) => Ok(false),
            Err(ix) => {
                self.0.try_reserve(1)?;
                self.0.insert(ix, state);
                Ok(true)
            }
        }
    }

    pub fn contains(&self, state: StateId) -> bool {
        self.0.binary_search(&state).is_ok()
    }

    pub fn remove(&mut self, state: StateId) -> bool {
        match self.0.binary_search(&state) {
            Ok(ix) => {
                self.0.remove(ix);
                true
            }
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, StateId>> {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[StateId] {
        &self.0
    }

    pub fn clear(&mut self) {
        self.0 = SmallVec::new();
    }

    pub fn rebase(&mut self, base: StateId) {
        for state in self.0.iter_mut() {
            *state += base;
        }
    }

    /// Renumbers members through `remap`; `None` drops the member.
    pub fn compact<F: FnMut(StateId) -> Option<StateId>>(&mut self, mut remap: F) {
        self.0.retain(|state| match remap(*state) {
            Some(new_id) => {
                debug_assert!(new_id <= *state);
                *state = new_id;
                true
            }
            None => false,
        });
        self.0.sort_unstable();
        self.0.dedup();
    }

    pub fn replace(&mut self, old: StateId, new: StateId) -> Result<(), FsmError> {
        if self.remove(old) {
            self.insert(new)?;
        }
        Ok(())
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        let mut states: SmallVec<[StateId; 1]> = iter.into_iter().collect();
        states.sort_unstable();
        states.dedup();
        StateSet(states)
    }
}

impl<'a> IntoIterator for &'a StateSet {
    type Item = StateId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, StateId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}
