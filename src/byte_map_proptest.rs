#![cfg(test)]

// Property tests for ByteMap kept inside the crate so they can check
// structural counters that are not part of the public surface.

use crate::byte_map::{ByteMap, GetOrInsert};
use crate::slot_table::{Entry, SlotTable};
use proptest::prelude::*;
use std::cell::Cell;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, usize),
    GetOrInsert(usize, usize),
    SoftInsert(usize, usize),
    Remove(usize),
    RemoveWith(usize),
    Get(usize),
    Contains(Vec<u8>),
    Resize,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<Vec<u8>>, Vec<OpI>)> {
    proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..12), 1..=24).prop_flat_map(
        |pool| {
            let idxs: Vec<usize> = (0..pool.len()).collect();
            let idx = proptest::sample::select(idxs);
            let contains_pool = proptest::sample::select(pool.clone());
            let op = prop_oneof![
                4 => (idx.clone(), any::<usize>()).prop_map(|(i, v)| OpI::Insert(i, v)),
                2 => (idx.clone(), any::<usize>()).prop_map(|(i, v)| OpI::GetOrInsert(i, v)),
                2 => (idx.clone(), any::<usize>()).prop_map(|(i, v)| OpI::SoftInsert(i, v)),
                3 => idx.clone().prop_map(OpI::Remove),
                1 => idx.clone().prop_map(OpI::RemoveWith),
                2 => idx.clone().prop_map(OpI::Get),
                1 => prop_oneof![
                    contains_pool,
                    proptest::collection::vec(any::<u8>(), 0..12)
                ]
                .prop_map(OpI::Contains),
                1 => Just(OpI::Resize),
                1 => Just(OpI::Iterate),
            ];
            proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
        },
    )
}

// Ordered model: first-insertion order, overwrite in place, remove closes the gap.
#[derive(Default)]
struct Model {
    entries: Vec<(Vec<u8>, usize)>,
}

impl Model {
    fn position(&self, k: &[u8]) -> Option<usize> {
        self.entries.iter().position(|(kk, _)| kk == k)
    }
    fn get(&self, k: &[u8]) -> Option<usize> {
        self.position(k).map(|p| self.entries[p].1)
    }
    fn insert(&mut self, k: &[u8], v: usize) -> Option<usize> {
        match self.position(k) {
            Some(p) => Some(std::mem::replace(&mut self.entries[p].1, v)),
            None => {
                self.entries.push((k.to_vec(), v));
                None
            }
        }
    }
    fn remove(&mut self, k: &[u8]) -> Option<usize> {
        self.position(k).map(|p| self.entries.remove(p).1)
    }
}

fn run_scenario(
    mut sut: ByteMap<Vec<u8>>,
    pool: &[Vec<u8>],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model = Model::default();

    for op in ops {
        let capacity_before = sut.capacity();
        match op {
            OpI::Insert(i, v) => {
                let k = &pool[i];
                let prev = sut.insert(k.clone(), v);
                prop_assert_eq!(prev, model.insert(k, v));
            }
            OpI::GetOrInsert(i, v) => {
                let k = &pool[i];
                let res = sut.get_or_insert(k.clone(), v);
                match model.get(k) {
                    Some(existing) => prop_assert_eq!(res, GetOrInsert::Existing(existing)),
                    None => {
                        prop_assert_eq!(res, GetOrInsert::Inserted(v));
                        model.insert(k, v);
                    }
                }
            }
            OpI::SoftInsert(i, v) => {
                let k = &pool[i];
                let calls = Cell::new(0);
                let mut evicted = None;
                sut.soft_insert(k.clone(), v, |kk, vv| {
                    calls.set(calls.get() + 1);
                    evicted = Some((kk, vv));
                });
                match model.insert(k, v) {
                    Some(prev) => {
                        prop_assert_eq!(calls.get(), 1, "evict runs once on overwrite");
                        prop_assert_eq!(evicted, Some((k.clone(), prev)));
                    }
                    None => prop_assert_eq!(calls.get(), 0, "evict never runs on a miss"),
                }
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                let removed = sut.remove(k);
                let expected = model.remove(k).map(|v| (k.clone(), v));
                prop_assert_eq!(removed, expected);
            }
            OpI::RemoveWith(i) => {
                let k = &pool[i];
                let mut got = Vec::new();
                sut.remove_with(k, |kk, vv| got.push((kk, vv)));
                let expected: Vec<_> = model.remove(k).map(|v| (k.clone(), v)).into_iter().collect();
                prop_assert_eq!(got, expected);
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
            }
            OpI::Contains(k) => {
                prop_assert_eq!(sut.contains_key(&k), model.get(&k).is_some());
            }
            OpI::Resize => {
                let before: Vec<(Vec<u8>, usize)> =
                    sut.iter().map(|(k, v)| (k.clone(), v)).collect();
                sut.resize();
                prop_assert_eq!(sut.capacity(), capacity_before * 2);
                prop_assert_eq!(sut.tombstones(), 0);
                let after: Vec<(Vec<u8>, usize)> =
                    sut.iter().map(|(k, v)| (k.clone(), v)).collect();
                prop_assert_eq!(before, after, "growth is transparent");
            }
            OpI::Iterate => {
                let got: Vec<(Vec<u8>, usize)> = sut.iter().map(|(k, v)| (k.clone(), v)).collect();
                prop_assert_eq!(&got, &model.entries);
            }
        }

        // Post-conditions after each op
        // 1) Size parity and counter ordering
        prop_assert_eq!(sut.len(), model.entries.len());
        prop_assert_eq!(sut.is_empty(), model.entries.is_empty());
        let live = sut.len() + sut.tombstones();
        prop_assert!(live < sut.capacity(), "an empty slot always remains");
        // 2) Capacity never shrinks
        prop_assert!(sut.capacity() >= capacity_before);
        // 3) Order parity
        let order: Vec<&Vec<u8>> = sut.keys().collect();
        let model_order: Vec<&Vec<u8>> = model.entries.iter().map(|(k, _)| k).collect();
        prop_assert_eq!(order, model_order);
    }
    Ok(())
}

// Property: State-machine equivalence against an ordered Vec model.
// Invariants exercised across random operation sequences:
// - insert returns the previous value; get/contains parity with the model.
// - get_or_insert never overwrites; soft_insert evicts exactly once on overwrite.
// - remove/remove_with hand back the removed pair only when present.
// - iteration order equals first-insertion order among survivors.
// - growth (automatic or manual) preserves contents and order.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(ByteMap::new(), &pool, ops)?;
    }
}

// Property: Same state machine starting from a single slot, so growth,
// wrap-around probing and tombstone-heavy chains happen constantly.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_from_one_slot((pool, ops) in arb_scenario()) {
        run_scenario(ByteMap::with_capacity(1), &pool, ops)?;
    }
}

// Property: Worst-case collisions at the structural layer. Every key gets
// the same hash, so resolution must fall back on byte comparison alone.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_slot_table_constant_hash(
        keys in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..6), 1..24),
        removals in proptest::collection::vec(any::<prop::sample::Index>(), 0..12),
    ) {
        let mut distinct: Vec<Vec<u8>> = Vec::new();
        for k in keys {
            if !distinct.contains(&k) {
                distinct.push(k);
            }
        }

        let mut table: SlotTable<Vec<u8>> = SlotTable::try_with_capacity(distinct.len() * 2).unwrap();
        for (v, k) in distinct.iter().enumerate() {
            let idx = table.resolve(k, 0);
            prop_assert!(table.entry(idx).is_none());
            table.occupy(idx, Entry { key: k.clone(), hash: 0, value: v });
        }

        let mut removed = Vec::new();
        for r in removals {
            let k = r.get(&distinct).clone();
            let idx = table.resolve(&k, 0);
            let was_live = !removed.contains(&k);
            prop_assert_eq!(table.bury(idx).is_some(), was_live);
            if was_live {
                removed.push(k);
            }
        }

        for (v, k) in distinct.iter().enumerate() {
            let idx = table.resolve(k, 0);
            let expected = if removed.contains(k) { None } else { Some(v) };
            prop_assert_eq!(table.entry(idx).map(|e| e.value), expected);
        }
        prop_assert_eq!(table.len(), distinct.len() - removed.len());
    }
}

// Property: Lookup never depends on where the key bytes live.
proptest! {
    #[test]
    fn prop_borrowed_and_owned_keys_agree(
        keys in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..20), 1..40),
    ) {
        let mut borrowed: ByteMap<&[u8]> = ByteMap::new();
        let mut owned: ByteMap<Box<[u8]>> = ByteMap::new();
        for (v, k) in keys.iter().enumerate() {
            borrowed.insert(k.as_slice(), v);
            owned.insert(k.clone().into_boxed_slice(), v);
        }
        for k in &keys {
            prop_assert_eq!(borrowed.get(k), owned.get(k));
            prop_assert!(borrowed.get(k).is_some());
        }
        prop_assert_eq!(borrowed.len(), owned.len());
    }
}
