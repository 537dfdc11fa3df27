#![cfg(test)]

// Property tests for KeyedTable kept inside the crate so they can call the
// crate-private structural checks after every operation.

use crate::keyed_table::KeyedTable;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, u32),
    Remove(usize),
    Get(usize),
    Bump(usize, u32),
    Iterate,
    Clear,
}

// Every key in a scenario has the same length, honouring the one-length-per-key
// contract; the length itself varies so every tail size is covered.
fn arb_pool() -> impl Strategy<Value = Vec<Vec<u8>>> {
    (0usize..=9).prop_flat_map(|len| {
        proptest::collection::vec(proptest::collection::vec(any::<u8>(), len), 1..=16)
    })
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<Vec<u8>>, Vec<OpI>)> {
    (1usize..=8, arb_pool()).prop_flat_map(|(slots, pool)| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            6 => (idx.clone(), any::<u32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            3 => idx.clone().prop_map(OpI::Remove),
            3 => idx.clone().prop_map(OpI::Get),
            2 => (idx.clone(), any::<u32>()).prop_map(|(i, d)| OpI::Bump(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (slots, pool.clone(), ops))
    })
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - insert returns the displaced handle exactly when the model held the key.
// - Updates never change the slot count; growth only follows a new key.
// - get/remove parity with the model; removing an absent key is a no-op.
// - iter yields exactly the model's contents.
// - After each op: every chained entry sits in its own bucket, every entry
//   is reachable once, and 4 * len <= 3 * slots.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((slots, pool, ops) in arb_scenario()) {
        let mut sut: KeyedTable<u32> = KeyedTable::with_slots(slots).unwrap();
        let mut model: HashMap<Vec<u8>, u32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = &pool[i];
                    let slots_before = sut.slot_count();
                    let old = sut.insert(k, v).unwrap();
                    let model_old = model.insert(k.clone(), v);
                    prop_assert_eq!(old, model_old);
                    if model_old.is_some() {
                        prop_assert_eq!(sut.slot_count(), slots_before, "update must not grow");
                    } else {
                        prop_assert!(sut.slot_count() == slots_before || sut.slot_count() == 2 * slots_before);
                    }
                }
                OpI::Remove(i) => {
                    let k = &pool[i];
                    let slots_before = sut.slot_count();
                    prop_assert_eq!(sut.remove(k), model.remove(k));
                    prop_assert_eq!(sut.get(k), None);
                    prop_assert_eq!(sut.slot_count(), slots_before, "remove must not shrink");
                }
                OpI::Get(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.get(k), model.get(k).copied());
                    prop_assert_eq!(sut.contains_key(k), model.contains_key(k));
                }
                OpI::Bump(i, d) => {
                    let k = &pool[i];
                    match (sut.get_mut(k), model.get_mut(k)) {
                        (Some(s), Some(m)) => {
                            *s = s.wrapping_add(d);
                            *m = m.wrapping_add(d);
                        }
                        (None, None) => {}
                        (s, m) => prop_assert!(false, "presence mismatch: {:?} vs {:?}", s, m),
                    }
                }
                OpI::Iterate => {
                    let s: BTreeMap<Vec<u8>, u32> = sut.iter().map(|(k, v)| (k.to_vec(), v)).collect();
                    let m: BTreeMap<Vec<u8>, u32> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    prop_assert_eq!(s, m);
                }
                OpI::Clear => {
                    sut.clear();
                    model.clear();
                }
            }

            sut.assert_invariants();
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
        }

        // Everything still live is retrievable with its last-set handle.
        for (k, v) in &model {
            prop_assert_eq!(sut.get(k), Some(*v));
        }
    }
}

// Property: a table that started with a single slot and grew through many
// doublings holds the same contents as one created large enough up front.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_growth_matches_presized(keys in proptest::collection::hash_set(proptest::collection::vec(any::<u8>(), 8), 0..300)) {
        let mut grown: KeyedTable<usize> = KeyedTable::with_slots(1).unwrap();
        let mut presized: KeyedTable<usize> = KeyedTable::with_slots(1024).unwrap();
        for (i, k) in keys.iter().enumerate() {
            grown.insert(k, i).unwrap();
            presized.insert(k, i).unwrap();
        }
        grown.assert_invariants();
        presized.assert_invariants();
        prop_assert_eq!(presized.slot_count(), 1024);
        for k in &keys {
            prop_assert_eq!(grown.get(k), presized.get(k));
        }
    }
}
