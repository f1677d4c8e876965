//! Per-state transition storage.
//!
//! Most states have exactly one outgoing edge, so a set is either empty, a single inline edge,
//! or a linear-probing hash table keyed by the edge symbol. The table starts with
//! [`SET_INITIAL`] buckets and is rehashed before an insert would push the used buckets (live
//! edges and tombstones) past half of the capacity.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::bitmap::SymbolBitmap;
use crate::error::FsmError;
use crate::state_set::StateSet;
use crate::StateId;

pub const SET_INITIAL: usize = 8;

// 32-bit approximation of the inverse golden ratio times 2^32, see Knuth 6.4.
const PHI32: u32 = 0x9e37_79b9;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Edge {
    pub symbol: u8,
    pub state: StateId,
}

impl Edge {
    pub fn new(symbol: u8, state: StateId) -> Self {
        Edge { symbol, state }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Slot {
    Unused,
    // A removed edge. Later members of the probe chain may sit behind it, so lookups continue
    // past it while inserts may reuse it.
    Tombstone,
    Occupied(Edge),
}

#[inline]
fn hash(symbol: u8) -> usize {
    PHI32.wrapping_mul(symbol as u32) as usize
}

#[inline]
fn probe(symbol: u8, ceil: usize) -> impl Iterator<Item = usize> {
    let h = hash(symbol);
    let mask = ceil - 1;
    (0..ceil).map(move |i| h.wrapping_add(i) & mask)
}

#[derive(Clone, Debug)]
struct Table {
    buckets: Box<[Slot]>,
    count: usize,
    tombstones: usize,
}

impl Table {
    fn with_capacity(ceil: usize) -> Result<Self, FsmError> {
        assert!(ceil.is_power_of_two());
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(ceil)?;
        buckets.resize(ceil, Slot::Unused);
        Ok(Table { buckets: buckets.into_boxed_slice(), count: 0, tombstones: 0 })
    }

    fn capacity(&self) -> usize {
        self.buckets.len()
    }

    // Stores the edge in the first free bucket of its probe chain. The caller has already
    // made sure that such a bucket exists.
    fn place(&mut self, edge: Edge) {
        for b_i in probe(edge.symbol, self.capacity()) {
            match self.buckets[b_i] {
                Slot::Occupied(_) => continue,
                Slot::Tombstone => self.tombstones -= 1,
                Slot::Unused => {}
            }
            self.buckets[b_i] = Slot::Occupied(edge);
            self.count += 1;
            return;
        }
        unreachable!("no free bucket in edge set table");
    }

    // Makes room for one more edge. This is the only point where tombstones are reclaimed: a
    // mostly-dead table is rehashed at its current capacity, otherwise the capacity doubles.
    fn reserve_one(&mut self) -> Result<(), FsmError> {
        let ceil = self.capacity();
        if self.count + self.tombstones < ceil / 2 {
            return Ok(());
        }

        let new_ceil = if self.count < ceil / 4 { ceil } else { ceil * 2 };
        let mut table = Table::with_capacity(new_ceil)?;
        for slot in self.buckets.iter() {
            if let Slot::Occupied(edge) = slot {
                table.place(*edge);
            }
        }
        debug_assert_eq!(table.count, self.count);

        tracing::trace!(
            old_capacity = ceil,
            new_capacity = new_ceil,
            live = self.count,
            tombstones = self.tombstones,
            "rehashing edge set"
        );
        *self = table;
        Ok(())
    }

    fn find(&self, symbol: u8) -> Option<Edge> {
        for b_i in probe(symbol, self.capacity()) {
            match self.buckets[b_i] {
                Slot::Unused => break,
                Slot::Tombstone => continue,
                Slot::Occupied(edge) if edge.symbol == symbol => return Some(edge),
                Slot::Occupied(_) => continue,
            }
        }
        None
    }

    fn bury(&mut self, b_i: usize) {
        debug_assert!(matches!(self.buckets[b_i], Slot::Occupied(_)));
        self.buckets[b_i] = Slot::Tombstone;
        self.count -= 1;
        self.tombstones += 1;
    }

    fn remove_symbol(&mut self, symbol: u8) {
        for b_i in probe(symbol, self.capacity()) {
            match self.buckets[b_i] {
                Slot::Unused => break,
                Slot::Occupied(edge) if edge.symbol == symbol => self.bury(b_i),
                _ => continue,
            }
        }
    }

    fn remove_state(&mut self, state: StateId) {
        let found = self.buckets.iter().position(|slot| {
            matches!(slot, Slot::Occupied(edge) if edge.state == state)
        });
        if let Some(b_i) = found {
            self.bury(b_i);
        }
    }

    fn compact<F: FnMut(StateId) -> Option<StateId>>(&mut self, remap: &mut F) {
        for b_i in 0..self.capacity() {
            let Slot::Occupied(edge) = self.buckets[b_i] else { continue };
            match remap(edge.state) {
                None => self.bury(b_i),
                Some(new_id) => {
                    debug_assert!(new_id <= edge.state);
                    self.buckets[b_i] = Slot::Occupied(Edge::new(edge.symbol, new_id));
                }
            }
        }
    }

    fn live_mut(&mut self) -> impl Iterator<Item = &mut Edge> + '_ {
        self.buckets.iter_mut().filter_map(|slot| match slot {
            Slot::Occupied(edge) => Some(edge),
            _ => None,
        })
    }
}

#[derive(Clone, Default, Debug)]
enum Repr {
    #[default]
    Empty,
    Singleton(Edge),
    Table(Box<Table>),
}

/// The outgoing edges of one state.
///
/// Symbols are not required to be unique; several edges sharing a symbol is how an NFA state
/// is represented before determinization. Queries that return a single edge pick the first one
/// on the probe chain.
#[derive(Clone, Default, Debug)]
pub struct EdgeSet(Repr);

impl EdgeSet {
    pub fn new() -> Self {
        EdgeSet(Repr::Empty)
    }

    pub fn insert(&mut self, symbol: u8, state: StateId) -> Result<(), FsmError> {
        let edge = Edge::new(symbol, state);
        match &mut self.0 {
            Repr::Empty => {
                self.0 = Repr::Singleton(edge);
            }
            Repr::Singleton(prev) => {
                let prev = *prev;
                let mut table = Box::new(Table::with_capacity(SET_INITIAL)?);
                table.place(prev);
                table.place(edge);
                self.0 = Repr::Table(table);
            }
            Repr::Table(table) => {
                table.reserve_one()?;
                table.place(edge);
            }
        }
        debug_assert!(self.contains(symbol));
        Ok(())
    }

    /// Adds one edge via `symbol` per state of `states`. Edges added before a failure stay.
    pub fn insert_many<I>(&mut self, symbol: u8, states: I) -> Result<(), FsmError>
    where
        I: IntoIterator<Item = StateId>,
    {
        for state in states {
            self.insert(symbol, state)?;
        }
        Ok(())
    }

    pub fn find(&self, symbol: u8) -> Option<Edge> {
        match &self.0 {
            Repr::Empty => None,
            Repr::Singleton(edge) => (edge.symbol == symbol).then_some(*edge),
            Repr::Table(table) => table.find(symbol),
        }
    }

    pub fn contains(&self, symbol: u8) -> bool {
        self.find(symbol).is_some()
    }

    /// The destination via `symbol`. Only meaningful for a DFA state, where there is at most one.
    pub fn transition(&self, symbol: u8) -> Option<StateId> {
        self.find(symbol).map(|edge| edge.state)
    }

    pub fn count(&self) -> usize {
        match &self.0 {
            Repr::Empty => 0,
            Repr::Singleton(_) => 1,
            Repr::Table(table) => table.count,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.0, Repr::Empty)
    }

    pub fn copy_from(&mut self, src: &EdgeSet) -> Result<(), FsmError> {
        for edge in src.iter() {
            self.insert(edge.symbol, edge.state)?;
        }
        Ok(())
    }

    /// Removes every edge via `symbol`.
    pub fn remove(&mut self, symbol: u8) {
        match &mut self.0 {
            Repr::Empty => {}
            Repr::Singleton(edge) => {
                if edge.symbol == symbol {
                    self.0 = Repr::Empty;
                }
            }
            Repr::Table(table) => table.remove_symbol(symbol),
        }
        self.release_if_drained();
        debug_assert!(!self.contains(symbol));
    }

    /// Removes the first edge, in bucket order, leading to `state`. Other edges to `state` stay.
    pub fn remove_state(&mut self, state: StateId) {
        match &mut self.0 {
            Repr::Empty => {}
            Repr::Singleton(edge) => {
                if edge.state == state {
                    self.0 = Repr::Empty;
                }
            }
            Repr::Table(table) => table.remove_state(state),
        }
        self.release_if_drained();
    }

    /// Renumbers every destination through `remap`, dropping the edges it maps to `None`.
    ///
    /// States are only ever renumbered downwards.
    pub fn compact<F>(&mut self, mut remap: F)
    where
        F: FnMut(StateId) -> Option<StateId>,
    {
        match &mut self.0 {
            Repr::Empty => {}
            Repr::Singleton(edge) => match remap(edge.state) {
                None => self.0 = Repr::Empty,
                Some(new_id) => {
                    debug_assert!(new_id <= edge.state);
                    edge.state = new_id;
                }
            },
            Repr::Table(table) => table.compact(&mut remap),
        }
        self.release_if_drained();
    }

    pub fn rebase(&mut self, base: StateId) {
        match &mut self.0 {
            Repr::Empty => {}
            Repr::Singleton(edge) => edge.state += base,
            Repr::Table(table) => table.live_mut().for_each(|edge| edge.state += base),
        }
    }

    /// Redirects every edge leading to `old` to `new`.
    pub fn replace_state(&mut self, old: StateId, new: StateId) {
        match &mut self.0 {
            Repr::Empty => {}
            Repr::Singleton(edge) => {
                if edge.state == old {
                    edge.state = new;
                }
            }
            Repr::Table(table) => {
                for edge in table.live_mut().filter(|edge| edge.state == old) {
                    edge.state = new;
                }
            }
        }
    }

    /// Marks the symbols of this set in `bm`, reporting whether one of them was marked already.
    ///
    /// `bm` is shared across all states scanned together (typically an epsilon closure) and
    /// reset by the caller between scans. The scan stops at the first repeated symbol.
    pub fn has_nondeterminism(&self, bm: &mut SymbolBitmap) -> bool {
        for edge in self.iter() {
            if bm.get(edge.symbol) {
                return true;
            }
            bm.set(edge.symbol);
        }
        false
    }

    pub fn iter(&self) -> EdgeIter<'_> {
        EdgeIter { set: self, i: 0 }
    }

    /// Releases the storage and leaves the set empty.
    pub fn clear(&mut self) {
        self.0 = Repr::Empty;
    }

    pub fn destinations_by_symbol(&self) -> Result<HashMap<u8, StateSet>, FsmError> {
        let mut result: HashMap<u8, StateSet> = HashMap::new();
        for edge in self.iter() {
            result.try_reserve(1).map_err(|_| FsmError::Alloc)?;
            result.entry(edge.symbol).or_default().insert(edge.state)?;
        }
        Ok(result)
    }

    fn release_if_drained(&mut self) {
        if let Repr::Table(table) = &self.0 {
            if table.count == 0 {
                self.0 = Repr::Empty;
            }
        }
    }

    #[cfg(test)]
    fn table_capacity(&self) -> Option<usize> {
        match &self.0 {
            Repr::Table(table) => Some(table.capacity()),
            _ => None,
        }
    }
}

/// Cursor over the live edges of a set, in bucket order.
///
/// The order changes whenever the set is rehashed and carries no meaning. The set cannot be
/// mutated while a cursor borrows it.
pub struct EdgeIter<'a> {
    set: &'a EdgeSet,
    i: usize,
}

impl<'a> Iterator for EdgeIter<'a> {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        let set = self.set;
        match &set.0 {
            Repr::Empty => None,
            Repr::Singleton(edge) => {
                if self.i >= 1 {
                    return None;
                }
                self.i += 1;
                Some(*edge)
            }
            Repr::Table(table) => {
                while self.i < table.capacity() {
                    let slot = table.buckets[self.i];
                    self.i += 1;
                    if let Slot::Occupied(edge) = slot {
                        return Some(edge);
                    }
                }
                None
            }
        }
    }
}

impl<'a> IntoIterator for &'a EdgeSet {
    type Item = Edge;
    type IntoIter = EdgeIter<'a>;

    fn into_iter(self) -> EdgeIter<'a> {
        self.iter()
    }
}
