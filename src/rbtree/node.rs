use std::{
    fmt::Debug,
    ops::{Index, IndexMut},
    ptr,
};

/// Node color. Absent children count as black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

/// Stable handle of a node inside its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

pub(crate) type Link = Option<NodeId>;

pub(crate) struct Node<K, V> {
    pub(crate) color: Color,
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) parent: Link,
    pub(crate) left: Link,
    pub(crate) right: Link,
}

impl<K, V> Node<K, V> {
    /// Fresh insertions are always red.
    pub(crate) fn new_with_parent(key: K, value: V, parent: Link) -> Self {
        Self {
            color: Color::Red,
            key,
            value,
            parent,
            left: None,
            right: None,
        }
    }
}

/// Backing store for the nodes of one tree. Parent and child links are
/// indices into `slots`, so the parent back-reference never owns anything.
pub(crate) struct Arena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<NodeId>,
}

impl<K, V> Arena<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id.0] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    pub(crate) fn release(&mut self, id: NodeId) -> Node<K, V> {
        let node = self.slots[id.0].take().expect("released a vacant slot");
        self.free.push(id);
        node
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Number of occupied slots.
    pub(crate) fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Two distinct nodes borrowed mutably at once.
    pub(crate) fn pair_mut(
        &mut self,
        a: NodeId,
        b: NodeId,
    ) -> (&mut Node<K, V>, &mut Node<K, V>) {
        assert_ne!(a, b, "pair_mut needs two distinct nodes");
        let (low, high, flipped) = if a.0 < b.0 {
            (a.0, b.0, false)
        } else {
            (b.0, a.0, true)
        };
        let (head, tail) = self.slots.split_at_mut(high);
        let first = head[low].as_mut().expect("dangling node id");
        let second = tail[0].as_mut().expect("dangling node id");
        if flipped {
            (second, first)
        } else {
            (first, second)
        }
    }

    pub(crate) fn color_of(&self, link: Link) -> Color {
        link.map(|id| self[id].color).unwrap_or(Color::Black)
    }

    pub(crate) fn parent(&self, link: Link) -> Link {
        link.and_then(|id| self[id].parent)
    }

    pub(crate) fn grandparent(&self, link: Link) -> Link {
        self.parent(self.parent(link))
    }

    pub(crate) fn sibling(&self, link: Link) -> Link {
        let id = link?;
        let parent = self[id].parent?;
        if self[parent].left == Some(id) {
            self[parent].right
        } else {
            self[parent].left
        }
    }

    pub(crate) fn uncle(&self, link: Link) -> Link {
        self.sibling(self.parent(link))
    }

    pub(crate) fn is_left_child(&self, id: NodeId) -> bool {
        self.parent(Some(id))
            .map(|p| self[p].left == Some(id))
            .unwrap_or(false)
    }

    pub(crate) fn subtree_min(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self[id].left {
            id = left;
        }
        id
    }

    pub(crate) fn subtree_max(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self[id].right {
            id = right;
        }
        id
    }

    /// In-order successor: the next strictly greater node.
    pub(crate) fn successor(&self, id: NodeId) -> Link {
        if let Some(right) = self[id].right {
            return Some(self.subtree_min(right));
        }
        let mut child = id;
        let mut parent = self[id].parent;
        while let Some(p) = parent {
            if self[p].right != Some(child) {
                break;
            }
            child = p;
            parent = self[p].parent;
        }
        parent
    }

    /// In-order predecessor: the last strictly smaller node.
    pub(crate) fn predecessor(&self, id: NodeId) -> Link {
        if let Some(left) = self[id].left {
            return Some(self.subtree_max(left));
        }
        let mut child = id;
        let mut parent = self[id].parent;
        while let Some(p) = parent {
            if self[p].left != Some(child) {
                break;
            }
            child = p;
            parent = self[p].parent;
        }
        parent
    }

    /// Points `parent`'s link that held `old` at `new` instead.
    pub(crate) fn replace_child(&mut self, parent: NodeId, old: Link, new: Link) {
        let p = &mut self[parent];
        if p.left == old {
            p.left = new;
        } else {
            p.right = new;
        }
    }

    /// Lifts `id`'s right child into its place and returns it. The caller
    /// re-points the tree root when `id` was the root.
    pub(crate) fn rotate_left(&mut self, id: NodeId) -> NodeId {
        let pivot = self[id].right.expect("rotate_left without a right child");
        let inner = self[pivot].left;
        self[id].right = inner;
        if let Some(inner) = inner {
            self[inner].parent = Some(id);
        }
        let parent = self[id].parent;
        if let Some(p) = parent {
            self.replace_child(p, Some(id), Some(pivot));
        }
        self[pivot].parent = parent;
        self[pivot].left = Some(id);
        self[id].parent = Some(pivot);
        pivot
    }

    /// Mirror of [`Arena::rotate_left`].
    pub(crate) fn rotate_right(&mut self, id: NodeId) -> NodeId {
        let pivot = self[id].left.expect("rotate_right without a left child");
        let inner = self[pivot].right;
        self[id].left = inner;
        if let Some(inner) = inner {
            self[inner].parent = Some(id);
        }
        let parent = self[id].parent;
        if let Some(p) = parent {
            self.replace_child(p, Some(id), Some(pivot));
        }
        self[pivot].parent = parent;
        self[pivot].right = Some(id);
        self[id].parent = Some(pivot);
        pivot
    }
}

impl<K, V> Index<NodeId> for Arena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Self::Output {
        self.slots[id.0].as_ref().expect("dangling node id")
    }
}

impl<K, V> IndexMut<NodeId> for Arena<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        self.slots[id.0].as_mut().expect("dangling node id")
    }
}

/// Read-only cursor on a node of an [`RbTree`](super::RbTree).
///
/// Holds a shared borrow of the tree, so it can never observe a node that a
/// later mutation moved or released. Walking `successor` from the tree's
/// minimum (or `predecessor` from its maximum) visits every key in order
/// without extra storage.
pub struct NodeRef<'a, K, V> {
    arena: &'a Arena<K, V>,
    id: NodeId,
}

impl<'a, K, V> NodeRef<'a, K, V> {
    pub(crate) fn new(arena: &'a Arena<K, V>, id: NodeId) -> Self {
        Self { arena, id }
    }

    fn wrap(&self, link: Link) -> Option<Self> {
        link.map(|id| Self::new(self.arena, id))
    }

    pub fn key(&self) -> &'a K {
        &self.arena[self.id].key
    }

    pub fn value(&self) -> &'a V {
        &self.arena[self.id].value
    }

    pub fn color(&self) -> Color {
        self.arena[self.id].color
    }

    pub fn is_red(&self) -> bool {
        self.color() == Color::Red
    }

    pub fn is_black(&self) -> bool {
        self.color() == Color::Black
    }

    pub fn left(&self) -> Option<Self> {
        self.wrap(self.arena[self.id].left)
    }

    pub fn right(&self) -> Option<Self> {
        self.wrap(self.arena[self.id].right)
    }

    /// `None` only for the root.
    pub fn parent(&self) -> Option<Self> {
        self.wrap(self.arena[self.id].parent)
    }

    pub fn grandparent(&self) -> Option<Self> {
        self.wrap(self.arena.grandparent(Some(self.id)))
    }

    /// The parent's other child.
    pub fn sibling(&self) -> Option<Self> {
        self.wrap(self.arena.sibling(Some(self.id)))
    }

    /// The parent's sibling.
    pub fn uncle(&self) -> Option<Self> {
        self.wrap(self.arena.uncle(Some(self.id)))
    }

    /// Smallest node of this subtree, which may be the node itself.
    pub fn min(&self) -> Self {
        Self::new(self.arena, self.arena.subtree_min(self.id))
    }

    /// Largest node of this subtree, which may be the node itself.
    pub fn max(&self) -> Self {
        Self::new(self.arena, self.arena.subtree_max(self.id))
    }

    /// Next node in key order.
    pub fn successor(&self) -> Option<Self> {
        self.wrap(self.arena.successor(self.id))
    }

    /// Previous node in key order.
    pub fn predecessor(&self) -> Option<Self> {
        self.wrap(self.arena.predecessor(self.id))
    }
}

impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<'_, K, V> {}

/// Two cursors are equal when they point at the same node of the same tree.
impl<K, V> PartialEq for NodeRef<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.arena, other.arena) && self.id == other.id
    }
}

impl<K, V> Eq for NodeRef<'_, K, V> {}

impl<K: Debug, V: Debug> Debug for NodeRef<'_, K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key())
            .field("value", self.value())
            .field("color", &self.color())
            .field("has_parent", &self.arena[self.id].parent.is_some())
            .finish()
    }
}
