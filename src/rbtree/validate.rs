use super::node::{Color, NodeId};
use super::RbTree;
use crate::InvariantViolation;
use smallvec::SmallVec;

impl<K, V> RbTree<K, V> {
    /// Checks every invariant that does not need the key order: root color,
    /// no red-red edge, equal black height on every path, parent links and
    /// node count.
    pub fn validate_structure(&self) -> Result<(), InvariantViolation> {
        let Some(root) = self.root else {
            return self.check_counts(0);
        };
        if self.nodes[root].parent.is_some() {
            return Err(InvariantViolation::RootHasParent);
        }
        if self.nodes[root].color == Color::Red {
            return Err(InvariantViolation::RedRoot);
        }

        let mut black_height = None;
        let mut reachable = 0;
        // (node, black nodes on the path including this one, depth)
        let mut stack: SmallVec<[(NodeId, usize, usize); 64]> = SmallVec::new();
        stack.push((root, 1, 0));
        while let Some((id, blacks, depth)) = stack.pop() {
            reachable += 1;
            let node = &self.nodes[id];
            for child in [node.left, node.right] {
                let Some(child) = child else {
                    match black_height {
                        None => black_height = Some(blacks),
                        Some(expected) if expected != blacks => {
                            return Err(InvariantViolation::BlackHeightMismatch {
                                expected,
                                found: blacks,
                                depth,
                            });
                        }
                        Some(_) => {}
                    }
                    continue;
                };
                let child_node = &self.nodes[child];
                if child_node.parent != Some(id) {
                    return Err(InvariantViolation::BrokenParentLink { depth: depth + 1 });
                }
                if node.color == Color::Red && child_node.color == Color::Red {
                    return Err(InvariantViolation::RedRedEdge { depth });
                }
                let blacks = blacks + usize::from(child_node.color == Color::Black);
                stack.push((child, blacks, depth + 1));
            }
        }
        self.check_counts(reachable)
    }

    fn check_counts(&self, reachable: usize) -> Result<(), InvariantViolation> {
        if self.len != reachable {
            return Err(InvariantViolation::LengthMismatch {
                recorded: self.len,
                reachable,
            });
        }
        let live = self.nodes.live();
        if live != reachable {
            return Err(InvariantViolation::LeakedNodes { live, reachable });
        }
        Ok(())
    }
}

impl<K: Ord, V> RbTree<K, V> {
    /// Checks all red-black invariants plus strict key order, walking the
    /// tree forwards with `successor` and backwards with `predecessor`.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.validate_structure()?;

        let mut position = 0;
        let mut cursor = self.min_node();
        while let Some(node) = cursor {
            let next = node.successor();
            if let Some(next) = next {
                if node.key() >= next.key() {
                    return Err(InvariantViolation::OutOfOrder { position });
                }
            }
            position += 1;
            cursor = next;
        }
        if position != self.len {
            return Err(InvariantViolation::LengthMismatch {
                recorded: self.len,
                reachable: position,
            });
        }

        let mut remaining = self.len;
        let mut cursor = self.max_node();
        while let Some(node) = cursor {
            let prev = node.predecessor();
            remaining -= 1;
            if let Some(prev) = prev {
                if prev.key() >= node.key() {
                    return Err(InvariantViolation::OutOfOrder {
                        position: remaining,
                    });
                }
            }
            cursor = prev;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RbTree<u32, ()> {
        (0..20).map(|k| (k, ())).collect()
    }

    #[test]
    fn test_valid_tree_passes() {
        assert_eq!(RbTree::<u32, ()>::new().validate(), Ok(()));
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn test_detects_red_root() {
        let mut tree = sample();
        let root = tree.root.unwrap();
        tree.nodes[root].color = Color::Red;
        assert_eq!(tree.validate(), Err(InvariantViolation::RedRoot));
    }

    #[test]
    fn test_detects_black_height_mismatch() {
        let mut tree = sample();
        let leaf = tree.nodes.subtree_min(tree.root.unwrap());
        tree.nodes[leaf].color = match tree.nodes[leaf].color {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        };
        assert!(matches!(
            tree.validate(),
            Err(InvariantViolation::BlackHeightMismatch { .. })
                | Err(InvariantViolation::RedRedEdge { .. })
        ));
    }

    #[test]
    fn test_detects_broken_parent_link() {
        let mut tree = sample();
        let root = tree.root.unwrap();
        let left = tree.nodes[root].left.unwrap();
        let right = tree.nodes[root].right.unwrap();
        tree.nodes[left].parent = Some(right);
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::BrokenParentLink { depth: 1 })
        );
    }

    #[test]
    fn test_detects_length_mismatch() {
        let mut tree = sample();
        tree.len += 1;
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::LengthMismatch {
                recorded: 21,
                reachable: 20
            })
        );
    }

    #[test]
    fn test_detects_out_of_order_keys() {
        let mut tree = sample();
        let min = tree.nodes.subtree_min(tree.root.unwrap());
        tree.nodes[min].key = 100;
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::OutOfOrder { position: 0 })
        );
    }
}
