use super::iter::{Iter, Keys, Values};
use super::node::{Arena, Color, Link, Node, NodeId, NodeRef};
use log::{debug, trace};
use smallvec::SmallVec;
use std::{borrow::Borrow, cmp::Ordering, fmt::Debug, mem};

/// An ordered map backed by a red-black tree.
///
/// Search, insert and remove are `O(log n)`: after every mutation the root is
/// black, no red node has a red child and every root-to-leaf path crosses the
/// same number of black nodes.
pub struct RbTree<K, V> {
    pub(super) nodes: Arena<K, V>,
    pub(super) root: Link,
    pub(super) len: usize,
}

impl<K: Debug, V: Debug> Debug for RbTree<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for RbTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RbTree<K, V> {
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every node and resets the tree to empty.
    pub fn clear(&mut self) {
        debug!("clearing red-black tree of {} nodes", self.len);
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    pub fn root(&self) -> Option<NodeRef<'_, K, V>> {
        self.cursor(self.root)
    }

    /// Node holding the smallest key.
    pub fn min_node(&self) -> Option<NodeRef<'_, K, V>> {
        self.root().map(|r| r.min())
    }

    /// Node holding the largest key.
    pub fn max_node(&self) -> Option<NodeRef<'_, K, V>> {
        self.root().map(|r| r.max())
    }

    pub fn first(&self) -> Option<(&K, &V)> {
        self.min_node().map(|n| (n.key(), n.value()))
    }

    pub fn last(&self) -> Option<(&K, &V)> {
        self.max_node().map(|n| (n.key(), n.value()))
    }

    /// Sorted iterator over the entries.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(
            &self.nodes,
            self.root.map(|r| self.nodes.subtree_min(r)),
            self.root.map(|r| self.nodes.subtree_max(r)),
            self.len,
        )
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    /// Longest root-to-node path, counted in nodes.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: SmallVec<[(NodeId, usize); 64]> = SmallVec::new();
        if let Some(root) = self.root {
            stack.push((root, 1));
        }
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            for child in [self.nodes[id].left, self.nodes[id].right].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }
        height
    }

    fn cursor(&self, link: Link) -> Option<NodeRef<'_, K, V>> {
        link.map(|id| NodeRef::new(&self.nodes, id))
    }

    fn find<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            cursor = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    /// Looks up the node holding `key`.
    pub fn search<Q>(&self, key: &Q) -> Option<NodeRef<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.cursor(self.find(key))
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|id| &self.nodes[id].value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find(key)?;
        Some(&mut self.nodes[id].value)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|id| {
            let node = &self.nodes[id];
            (&node.key, &node.value)
        })
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    fn rotate_left(&mut self, id: NodeId) {
        let was_root = self.nodes[id].parent.is_none();
        let top = self.nodes.rotate_left(id);
        if was_root {
            self.root = Some(top);
        }
    }

    fn rotate_right(&mut self, id: NodeId) {
        let was_root = self.nodes[id].parent.is_none();
        let top = self.nodes.rotate_right(id);
        if was_root {
            self.root = Some(top);
        }
    }
}

impl<K: Ord, V> RbTree<K, V> {
    /// Inserts `key` with `value`. When the key is already present its value
    /// is replaced in place and the old one returned; the length is unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut parent = None;
        let mut went_left = false;
        let mut cursor = self.root;
        while let Some(id) = cursor {
            parent = Some(id);
            let node = &mut self.nodes[id];
            match key.cmp(&node.key) {
                Ordering::Less => {
                    went_left = true;
                    cursor = node.left;
                }
                Ordering::Greater => {
                    went_left = false;
                    cursor = node.right;
                }
                Ordering::Equal => return Some(mem::replace(&mut node.value, value)),
            }
        }

        let id = self.nodes.alloc(Node::new_with_parent(key, value, parent));
        match parent {
            None => self.root = Some(id),
            Some(p) if went_left => self.nodes[p].left = Some(id),
            Some(p) => self.nodes[p].right = Some(id),
        }
        self.len += 1;
        self.insert_fixup(id);
        self.check_invariants();
        None
    }

    /// Resolves a red node sitting under a red parent, the only violation a
    /// red insertion can cause. Only the uncle-red case climbs, two levels
    /// at a time.
    fn insert_fixup(&mut self, mut node: NodeId) {
        loop {
            let Some(mut parent) = self.nodes[node].parent else {
                trace!("insert fix-up: reached root, painting it black");
                self.nodes[node].color = Color::Black;
                return;
            };
            if self.nodes[parent].color == Color::Black {
                return;
            }

            let grandparent = self.nodes[parent]
                .parent
                .expect("a red parent is never the root");
            let uncle = self
                .nodes
                .uncle(Some(node))
                .filter(|&u| self.nodes[u].color == Color::Red);
            if let Some(uncle) = uncle {
                trace!("insert fix-up: red uncle, pushing red up to the grandparent");
                self.nodes[parent].color = Color::Black;
                self.nodes[uncle].color = Color::Black;
                self.nodes[grandparent].color = Color::Red;
                node = grandparent;
                continue;
            }

            let node_is_left = self.nodes.is_left_child(node);
            let parent_is_left = self.nodes.is_left_child(parent);
            if node_is_left != parent_is_left {
                trace!("insert fix-up: inner grandchild, straightening");
                if parent_is_left {
                    self.rotate_left(parent);
                } else {
                    self.rotate_right(parent);
                }
                // the old parent now hangs below the old node
                (node, parent) = (parent, node);
            }

            trace!("insert fix-up: outer grandchild, rotating grandparent");
            if self.nodes[parent].left == Some(node) {
                self.rotate_right(grandparent);
            } else {
                self.rotate_left(grandparent);
            }
            self.nodes[parent].color = Color::Black;
            self.nodes[grandparent].color = Color::Red;
            return;
        }
    }
}

impl<K, V> RbTree<K, V> {
    /// Removes `key`, returning the stored entry if it was present.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let target = self.find(key)?;
        let doomed = match (self.nodes[target].left, self.nodes[target].right) {
            (Some(_), Some(right)) => {
                // Trade places with the in-order successor, which has at most
                // one child, and remove that slot instead.
                let successor = self.nodes.subtree_min(right);
                let (t, s) = self.nodes.pair_mut(target, successor);
                mem::swap(&mut t.key, &mut s.key);
                mem::swap(&mut t.value, &mut s.value);
                successor
            }
            _ => target,
        };
        let entry = self.splice_out(doomed);
        self.len -= 1;
        self.check_structure();
        Some(entry)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes `key` if present. Returns whether anything was removed.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).is_some()
    }

    /// Unlinks a node with at most one child and restores the colors.
    fn splice_out(&mut self, id: NodeId) -> (K, V) {
        let node = &self.nodes[id];
        let child = node.left.or(node.right);
        let parent = node.parent;
        let color = node.color;

        if let Some(c) = child {
            self.nodes[c].parent = parent;
        }
        match parent {
            Some(p) => self.nodes.replace_child(p, Some(id), child),
            None => self.root = child,
        }

        if color == Color::Black {
            match child {
                Some(c) if self.nodes[c].color == Color::Red => {
                    self.nodes[c].color = Color::Black;
                }
                _ => self.delete_fixup(child, parent),
            }
        }

        let node = self.nodes.release(id);
        (node.key, node.value)
    }

    /// Pays back the black unit owed by the position `node` (possibly
    /// absent) under `parent`. Checks run in a fixed order; each case relies
    /// on the earlier ones having been ruled out.
    fn delete_fixup(&mut self, mut node: Link, mut parent: Link) {
        while let Some(p) = parent {
            let node_is_left = self.nodes[p].left == node;
            let far_of = |arena: &Arena<K, V>, s: NodeId| {
                if node_is_left {
                    arena[s].right
                } else {
                    arena[s].left
                }
            };
            let near_of = |arena: &Arena<K, V>, s: NodeId| {
                if node_is_left {
                    arena[s].left
                } else {
                    arena[s].right
                }
            };
            let sibling_of = |arena: &Arena<K, V>| {
                let sibling = if node_is_left {
                    arena[p].right
                } else {
                    arena[p].left
                };
                sibling.expect("a double-black position always has a sibling")
            };

            let mut sibling = sibling_of(&self.nodes);
            if self.nodes[sibling].color == Color::Red {
                trace!("delete fix-up: red sibling, rotating it above the parent");
                self.nodes[sibling].color = Color::Black;
                self.nodes[p].color = Color::Red;
                if node_is_left {
                    self.rotate_left(p);
                } else {
                    self.rotate_right(p);
                }
                sibling = sibling_of(&self.nodes);
            }

            let near = near_of(&self.nodes, sibling);
            let far = far_of(&self.nodes, sibling);
            if self.nodes.color_of(near) == Color::Black && self.nodes.color_of(far) == Color::Black
            {
                self.nodes[sibling].color = Color::Red;
                if self.nodes[p].color == Color::Black {
                    trace!("delete fix-up: all black, moving the deficit up");
                    node = Some(p);
                    parent = self.nodes[p].parent;
                    continue;
                }
                trace!("delete fix-up: red parent absorbs the deficit");
                self.nodes[p].color = Color::Black;
                return;
            }

            if self.nodes.color_of(far) == Color::Black {
                trace!("delete fix-up: near nephew red, rotating it to the far side");
                let near = near.expect("a red nephew exists");
                self.nodes[sibling].color = Color::Red;
                self.nodes[near].color = Color::Black;
                if node_is_left {
                    self.rotate_right(sibling);
                } else {
                    self.rotate_left(sibling);
                }
                sibling = near;
            }

            trace!("delete fix-up: far nephew red, rotating parent");
            self.nodes[sibling].color = self.nodes[p].color;
            self.nodes[p].color = Color::Black;
            let far = far_of(&self.nodes, sibling).expect("far nephew is red");
            self.nodes[far].color = Color::Black;
            if node_is_left {
                self.rotate_left(p);
            } else {
                self.rotate_right(p);
            }
            return;
        }
        trace!("delete fix-up: deficit reached the root");
    }
}

impl<K, V> RbTree<K, V> {
    #[cfg(feature = "check-invariants")]
    fn check_structure(&self) {
        if let Err(violation) = self.validate_structure() {
            panic!("red-black invariant broken: {violation}");
        }
    }

    #[cfg(not(feature = "check-invariants"))]
    #[inline(always)]
    fn check_structure(&self) {}
}

impl<K: Ord, V> RbTree<K, V> {
    #[cfg(feature = "check-invariants")]
    fn check_invariants(&self) {
        if let Err(violation) = self.validate() {
            panic!("red-black invariant broken: {violation}");
        }
    }

    #[cfg(not(feature = "check-invariants"))]
    #[inline(always)]
    fn check_invariants(&self) {}
}

impl<K: Ord, V> FromIterator<(K, V)> for RbTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = RbTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for RbTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a RbTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors(tree: &RbTree<i32, ()>) -> Vec<(i32, Color)> {
        let mut out = vec![];
        let mut cursor = tree.min_node();
        while let Some(node) = cursor {
            out.push((*node.key(), node.color()));
            cursor = node.successor();
        }
        out
    }

    #[test]
    fn test_root_rotation_repoints_root() {
        let mut tree = RbTree::new();
        for k in [1, 2, 3] {
            tree.insert(k, ());
        }
        // ascending inserts force a left rotation of the original root
        assert_eq!(*tree.root().unwrap().key(), 2);
        assert_eq!(
            colors(&tree),
            vec![(1, Color::Red), (2, Color::Black), (3, Color::Red)]
        );
    }

    #[test]
    fn test_kinked_insert_straightens_first() {
        let mut tree = RbTree::new();
        for k in [3, 1, 2] {
            tree.insert(k, ());
        }
        let root = tree.root().unwrap();
        assert_eq!(*root.key(), 2);
        assert_eq!(*root.left().unwrap().key(), 1);
        assert_eq!(*root.right().unwrap().key(), 3);
        assert!(root.left().unwrap().is_red());
        assert!(root.right().unwrap().is_red());
    }

    #[test]
    fn test_delete_leaf_black_with_red_sibling() {
        let mut tree: RbTree<i32, ()> = (1..=6).map(|k| (k, ())).collect();
        tree.validate().unwrap();
        assert!(tree.delete(&1));
        tree.validate().unwrap();
        assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_released_slots_are_reused() {
        let mut tree = RbTree::new();
        for round in 0..10 {
            for k in 0..32 {
                tree.insert(k, round);
            }
            for k in 0..32 {
                assert_eq!(tree.remove(&k), Some(round));
            }
        }
        assert!(tree.is_empty());
        assert_eq!(tree.nodes.live(), 0);
        tree.insert(7, 7);
        assert_eq!(tree.nodes.live(), 1);
    }

    #[test]
    fn test_remove_two_child_node_returns_its_own_entry() {
        let mut tree: RbTree<i32, String> = (0..10).map(|k| (k, k.to_string())).collect();
        let root_key = *tree.root().unwrap().key();
        assert_eq!(tree.remove_entry(&root_key), Some((root_key, root_key.to_string())));
        assert_eq!(tree.get(&(root_key + 1)), Some(&(root_key + 1).to_string()));
        tree.validate().unwrap();
    }
}
