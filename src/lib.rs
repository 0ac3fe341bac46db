//! Red-black tree containers.
//!
//! [`RbTree`] is an ordered map whose search, insert and remove stay
//! `O(log n)` for any `Ord` key; [`RbSet`] wraps it for key-only use.
//! Nodes live in an index arena, so parent back-links never own anything.
//! [`NodeRef`] cursors expose the structure for sorted walks and inspection.

mod error;
pub mod rbtree;

pub use error::InvariantViolation;
pub use rbtree::{Color, NodeRef, RbSet, RbTree};
