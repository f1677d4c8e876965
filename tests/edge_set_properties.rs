use std::collections::BTreeMap;

use fsm_edges::{Edge, EdgeSet, StateId, SymbolBitmap};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Insert(u8, StateId),
    Remove(u8),
    RemoveState(StateId),
}

fn op() -> impl Strategy<Value = Op> {
    // Few symbols and states, so that collisions and duplicates are frequent.
    prop_oneof![
        3 => (0u8..24, 0u32..16).prop_map(|(symbol, state)| Op::Insert(symbol, state)),
        1 => (0u8..24).prop_map(Op::Remove),
        1 => (0u32..16).prop_map(Op::RemoveState),
    ]
}

fn sorted(set: &EdgeSet) -> Vec<Edge> {
    let mut edges: Vec<_> = set.iter().collect();
    edges.sort();
    edges
}

proptest! {
    /// Distinct symbols are all found with their destination and counted once.
    #[test]
    fn distinct_symbols_round_trip(edges in prop::collection::btree_map(any::<u8>(), any::<StateId>(), 0..256)) {
        let mut set = EdgeSet::new();
        for (symbol, state) in edges.iter() {
            set.insert(*symbol, *state).unwrap();
        }
        prop_assert_eq!(set.count(), edges.len());
        prop_assert_eq!(set.is_empty(), edges.is_empty());
        for (symbol, state) in edges.iter() {
            prop_assert_eq!(set.transition(*symbol), Some(*state));
        }
        for symbol in 0..=u8::MAX {
            prop_assert_eq!(set.contains(symbol), edges.contains_key(&symbol));
        }
    }

    /// The set behaves like a multiset of edges whatever its representation.
    #[test]
    fn matches_multiset_model(ops in prop::collection::vec(op(), 0..200)) {
        let mut set = EdgeSet::new();
        let mut model: Vec<Edge> = Vec::new();
        for op in ops {
            match op {
                Op::Insert(symbol, state) => {
                    set.insert(symbol, state).unwrap();
                    model.push(Edge::new(symbol, state));
                }
                Op::Remove(symbol) => {
                    set.remove(symbol);
                    model.retain(|edge| edge.symbol != symbol);
                }
                Op::RemoveState(state) => {
                    set.remove_state(state);
                    // Which matching edge goes is up to the bucket order; exactly one must go.
                    let mut rest = sorted(&set);
                    let mut gone = Vec::new();
                    for edge in model.iter() {
                        match rest.iter().position(|e| e == edge) {
                            Some(ix) => { rest.remove(ix); }
                            None => gone.push(*edge),
                        }
                    }
                    prop_assert!(rest.is_empty());
                    if model.iter().any(|edge| edge.state == state) {
                        prop_assert_eq!(gone.len(), 1);
                        prop_assert_eq!(gone[0].state, state);
                        let ix = model.iter().position(|edge| *edge == gone[0]).unwrap();
                        model.remove(ix);
                    } else {
                        prop_assert!(gone.is_empty());
                    }
                }
            }

            model.sort();
            prop_assert_eq!(sorted(&set), model.clone());
            prop_assert_eq!(set.count(), model.len());
            prop_assert_eq!(set.is_empty(), model.is_empty());
            for symbol in 0u8..24 {
                let expected = model.iter().any(|edge| edge.symbol == symbol);
                prop_assert_eq!(set.contains(symbol), expected);
                if let Some(edge) = set.find(symbol) {
                    prop_assert!(model.contains(&edge));
                }
            }
        }
    }

    /// Compaction drops exactly the edges mapped to nothing and renumbers the others.
    #[test]
    fn compact_drops_and_renumbers(
        edges in prop::collection::vec((any::<u8>(), 0u32..1000), 0..64),
        modulus in 2u32..7,
    ) {
        let mut set = EdgeSet::new();
        set.insert_many(0, std::iter::empty()).unwrap();
        for (symbol, state) in edges.iter() {
            set.insert(*symbol, *state).unwrap();
        }
        let remap = |s: StateId| if s % modulus == 0 { None } else { Some(s / 2) };
        set.compact(remap);

        let mut expected: Vec<Edge> = edges.iter()
            .filter_map(|(symbol, state)| remap(*state).map(|s| Edge::new(*symbol, s)))
            .collect();
        expected.sort();
        prop_assert_eq!(set.count(), expected.len());
        prop_assert_eq!(sorted(&set), expected);
    }

    /// Promotion to a table and back to a single live edge does not change any answer.
    #[test]
    fn singleton_and_table_agree(first in (any::<u8>(), any::<StateId>()), second in (any::<u8>(), any::<StateId>())) {
        prop_assume!(first.0 != second.0);
        let mut single = EdgeSet::new();
        single.insert(first.0, first.1).unwrap();

        let mut table = EdgeSet::new();
        table.insert(first.0, first.1).unwrap();
        table.insert(second.0, second.1).unwrap();
        prop_assert_eq!(table.transition(first.0), Some(first.1));
        table.remove(second.0);

        prop_assert_eq!(single.count(), table.count());
        prop_assert_eq!(sorted(&single), sorted(&table));
        for symbol in 0..=u8::MAX {
            prop_assert_eq!(single.find(symbol), table.find(symbol));
        }
        let (mut bm1, mut bm2) = (SymbolBitmap::new(), SymbolBitmap::new());
        prop_assert_eq!(single.has_nondeterminism(&mut bm1), table.has_nondeterminism(&mut bm2));
        prop_assert_eq!(bm1, bm2);
    }

    /// Rebasing shifts every destination and leaves the symbols alone.
    #[test]
    fn rebase_shifts(edges in prop::collection::btree_map(any::<u8>(), 0u32..1000, 0..40), base in 0u32..1000) {
        let mut set = EdgeSet::new();
        for (symbol, state) in edges.iter() {
            set.insert(*symbol, *state).unwrap();
        }
        set.rebase(base);
        let shifted: BTreeMap<u8, StateId> = set.iter().map(|edge| (edge.symbol, edge.state)).collect();
        let expected: BTreeMap<u8, StateId> = edges.iter().map(|(symbol, state)| (*symbol, state + base)).collect();
        prop_assert_eq!(shifted, expected);
    }
}
