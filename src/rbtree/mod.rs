mod iter;
mod node;
mod set;
mod tree;
mod validate;

pub use iter::{Iter, Keys, Values};
pub use node::{Color, NodeRef};
pub use set::RbSet;
pub use tree::RbTree;
