use rbtree_bits::RbTree;
use simplelog::{Config, LevelFilter, TestLogger};

/// Routes the tree's log records to the test output. Safe to call from
/// every test; only the first call installs the logger. Fix-up traces are
/// filtered out at this level.
pub fn init_logging() {
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
}

/// Asserts every invariant plus agreement of both sorted walks with `len`.
pub fn assert_sound<K: Ord, V>(tree: &RbTree<K, V>) {
    if let Err(violation) = tree.validate() {
        panic!("{violation}");
    }
    assert_eq!(tree.iter().count(), tree.len());
    assert_eq!(tree.iter().rev().count(), tree.len());
    match tree.root() {
        Some(root) => assert!(root.is_black()),
        None => assert!(tree.is_empty()),
    }
}
