// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-identifier stacks of detached page views.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::DEFAULT_PAGE_IDENTIFIER;

/// A pool of detached page views, bucketed by page identifier.
///
/// Each bucket is a stack: the most recently enqueued view is dequeued first.
/// The pool never inspects the views it holds; callers are responsible for
/// detaching a view from its slot before enqueueing it.
#[derive(Debug)]
pub struct ReusePool<V> {
    buckets: HashMap<String, Vec<V>>,
}

impl<V> Default for ReusePool<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ReusePool<V> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }

    /// Adds a detached view to the bucket for `identifier`.
    pub fn enqueue(&mut self, identifier: &str, view: V) {
        match self.buckets.get_mut(identifier) {
            Some(bucket) => bucket.push(view),
            None => {
                self.buckets.insert(identifier.into(), alloc::vec![view]);
            }
        }
    }

    /// Removes and returns the most recently enqueued view for `identifier`.
    pub fn dequeue(&mut self, identifier: &str) -> Option<V> {
        self.buckets.get_mut(identifier)?.pop()
    }

    /// [`ReusePool::dequeue`] for [`DEFAULT_PAGE_IDENTIFIER`].
    pub fn dequeue_default(&mut self) -> Option<V> {
        self.dequeue(DEFAULT_PAGE_IDENTIFIER)
    }

    /// Number of pooled views for `identifier`.
    #[must_use]
    pub fn count(&self, identifier: &str) -> usize {
        self.buckets.get(identifier).map_or(0, Vec::len)
    }

    /// Total number of pooled views across every identifier.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Returns `true` if no views are pooled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }

    /// Iterates over every pooled view.
    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.buckets.values().flatten()
    }

    /// Drops every pooled view.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::ReusePool;
    use crate::DEFAULT_PAGE_IDENTIFIER;

    #[test]
    fn buckets_are_lifo_and_independent() {
        let mut pool = ReusePool::new();
        pool.enqueue("a", 1);
        pool.enqueue("a", 2);
        pool.enqueue("b", 3);

        assert_eq!(pool.len(), 3);
        assert_eq!(pool.count("a"), 2);
        assert_eq!(pool.dequeue("a"), Some(2));
        assert_eq!(pool.dequeue("a"), Some(1));
        assert_eq!(pool.dequeue("a"), None);
        assert_eq!(pool.dequeue("b"), Some(3));
        assert!(pool.is_empty());
    }

    #[test]
    fn default_bucket_and_clear() {
        let mut pool = ReusePool::new();
        assert_eq!(pool.dequeue_default(), None);
        pool.enqueue(DEFAULT_PAGE_IDENTIFIER, 'x');
        pool.enqueue("other", 'y');
        assert_eq!(pool.iter().count(), 2);
        assert_eq!(pool.dequeue_default(), Some('x'));

        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.count("other"), 0);
    }
}
