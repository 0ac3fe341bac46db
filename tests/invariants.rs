mod common;

use common::{assert_sound, init_logging};
use proptest::prelude::*;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use rbtree_bits::RbTree;
use std::collections::BTreeMap;

#[test]
fn test_shuffled_round_trip() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for round in 0..20 {
        let mut keys: Vec<u32> = (0..500).collect();
        keys.shuffle(&mut rng);

        let mut tree = RbTree::new();
        for &k in &keys {
            assert_eq!(tree.insert(k, round), None);
        }
        assert_sound(&tree);
        assert_eq!(tree.len(), keys.len());

        keys.shuffle(&mut rng);
        for (i, &k) in keys.iter().enumerate() {
            assert_eq!(tree.remove(&k), Some(round));
            if i % 25 == 0 {
                assert_sound(&tree);
            }
        }
        assert_eq!(tree.len(), 0);
        assert!(tree.root().is_none());
        assert_sound(&tree);
    }
}

#[test]
fn test_interleaved_churn_matches_btreemap() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut tree = RbTree::new();
    let mut model = BTreeMap::new();
    let mut pool: Vec<i64> = (-300..300).collect();
    for step in 0..5_000 {
        pool.shuffle(&mut rng);
        let k = pool[0];
        if step % 3 == 0 {
            assert_eq!(tree.remove(&k), model.remove(&k));
        } else {
            assert_eq!(tree.insert(k, step), model.insert(k, step));
        }
        if step % 100 == 0 {
            assert_sound(&tree);
        }
    }
    assert_sound(&tree);
    assert!(tree.iter().eq(model.iter()));
}

#[derive(Debug, Clone)]
enum Op {
    Insert(u8, u32),
    Delete(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<u8>(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        any::<u8>().prop_map(Op::Delete),
    ]
}

proptest! {
    #[test]
    fn prop_invariants_hold_after_every_op(ops in proptest::collection::vec(op(), 0..300)) {
        let mut tree = RbTree::new();
        let mut model = BTreeMap::new();
        for op in ops {
            match op {
                Op::Insert(k, v) => prop_assert_eq!(tree.insert(k, v), model.insert(k, v)),
                Op::Delete(k) => prop_assert_eq!(tree.delete(&k), model.remove(&k).is_some()),
            }
            prop_assert_eq!(tree.validate(), Ok(()));
            prop_assert_eq!(tree.len(), model.len());
        }
        for (k, v) in &model {
            prop_assert_eq!(tree.get(k), Some(v));
        }
        prop_assert!(tree.keys().eq(model.keys()));
        prop_assert!(tree.keys().rev().eq(model.keys().rev()));
    }

    #[test]
    fn prop_insert_all_then_delete_all_empties(
        keys in proptest::collection::hash_set(any::<i32>(), 0..200),
        seed in any::<u64>(),
    ) {
        let mut keys: Vec<i32> = keys.into_iter().collect();
        let mut tree: RbTree<i32, ()> = keys.iter().map(|&k| (k, ())).collect();
        prop_assert_eq!(tree.len(), keys.len());
        keys.shuffle(&mut StdRng::seed_from_u64(seed));
        for k in &keys {
            prop_assert!(tree.delete(k));
            prop_assert_eq!(tree.validate(), Ok(()));
        }
        prop_assert!(tree.is_empty());
        prop_assert!(tree.root().is_none());
    }
}
