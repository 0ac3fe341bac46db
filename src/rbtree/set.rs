use super::{Keys, RbTree};
use crate::InvariantViolation;
use std::{borrow::Borrow, fmt::Debug};

/// An ordered set of keys on top of [`RbTree`].
pub struct RbSet<K> {
    inner: RbTree<K, ()>,
}

impl<K: Debug> Debug for RbSet<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K> Default for RbSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RbSet<K> {
    pub fn new() -> Self {
        Self {
            inner: RbTree::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn iter(&self) -> Keys<'_, K, ()> {
        self.inner.keys()
    }

    pub fn first(&self) -> Option<&K> {
        self.inner.first().map(|(k, _)| k)
    }

    pub fn last(&self) -> Option<&K> {
        self.inner.last().map(|(k, _)| k)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.contains_key(key)
    }

    /// Returns whether the key was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.delete(key)
    }
}

impl<K: Ord> RbSet<K> {
    /// Returns whether the key was newly added.
    pub fn insert(&mut self, key: K) -> bool {
        self.inner.insert(key, ()).is_none()
    }

    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.inner.validate()
    }
}

impl<K: Ord> FromIterator<K> for RbSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = RbSet::new();
        set.extend(iter);
        set
    }
}

impl<K: Ord> Extend<K> for RbSet<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K> IntoIterator for &'a RbSet<K> {
    type Item = &'a K;
    type IntoIter = Keys<'a, K, ()>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
