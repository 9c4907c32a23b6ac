// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page view capabilities, factories, and the dequeue entry point handed to
//! data sources.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use hashbrown::HashMap;

use crate::{DEFAULT_PAGE_IDENTIFIER, PagerError, ReuseError, ReusePool};

/// Optional capabilities of a page view.
///
/// Every method has a default, so a view type that needs none of them can use
/// an empty `impl PageView for MyView {}`.
pub trait PageView {
    /// Identifier of the reuse pool this view belongs to.
    ///
    /// Views that return the same identifier are interchangeable for reuse.
    fn page_identifier(&self) -> &str {
        DEFAULT_PAGE_IDENTIFIER
    }

    /// Called when the view leaves its slot, just before it enters the reuse pool.
    fn release(&mut self) {}

    /// Resets per-page state before the view is handed out again.
    ///
    /// Called exactly once each time the view leaves the reuse pool. If this
    /// fails the view is dropped rather than reused.
    fn prepare_for_reuse(&mut self) -> Result<(), ReuseError> {
        Ok(())
    }
}

type Factory<V> = Box<dyn Fn() -> V>;

/// Factories for creating page views when the reuse pool runs dry, keyed by
/// page identifier.
pub(crate) struct PageFactories<V> {
    factories: HashMap<String, Factory<V>>,
}

impl<V> fmt::Debug for PageFactories<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageFactories")
            .field("identifiers", &self.factories.keys().collect::<alloc::vec::Vec<_>>())
            .finish()
    }
}

impl<V> Default for PageFactories<V> {
    fn default() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }
}

impl<V> PageFactories<V> {
    /// Registers `factory` for `identifier`, replacing any previous factory.
    pub(crate) fn register(
        &mut self,
        identifier: impl Into<String>,
        factory: impl Fn() -> V + 'static,
    ) {
        self.factories.insert(identifier.into(), Box::new(factory));
    }

    /// Returns `true` if a factory is registered for `identifier`.
    #[must_use]
    pub(crate) fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    fn build(&self, identifier: &str) -> Option<V> {
        self.factories.get(identifier).map(|factory| factory())
    }
}

/// Dequeue access to a pager's reuse pool and registered factories.
///
/// Data sources receive one of these in [`crate::PagerDataSource::page_view`]
/// so they can recycle views without holding a reference to the pager.
#[derive(Debug)]
pub struct PageRecycler<'a, V> {
    pool: &'a mut ReusePool<V>,
    factories: &'a PageFactories<V>,
}

impl<'a, V: PageView> PageRecycler<'a, V> {
    pub(crate) fn new(pool: &'a mut ReusePool<V>, factories: &'a PageFactories<V>) -> Self {
        Self { pool, factories }
    }

    /// Returns a view from the default pool, or a fresh one from the default factory.
    pub fn dequeue_reusable_page_view(&mut self) -> Result<V, PagerError> {
        self.dequeue_reusable_page_view_for_identifier(DEFAULT_PAGE_IDENTIFIER)
    }

    /// Returns a view from the pool for `identifier`, falling back to the
    /// factory registered for `identifier`.
    ///
    /// Pooled views are prepared for reuse before being returned. Fails with
    /// [`PagerError::NoPageFactory`] when the pool is empty and no factory is
    /// registered; the pool is left untouched in that case.
    pub fn dequeue_reusable_page_view_for_identifier(
        &mut self,
        identifier: &str,
    ) -> Result<V, PagerError> {
        if let Some(mut view) = self.pool.dequeue(identifier) {
            log::trace!("reusing pooled page view for {identifier:?}");
            view.prepare_for_reuse()
                .map_err(|source| PagerError::PrepareForReuse {
                    identifier: identifier.into(),
                    source,
                })?;
            return Ok(view);
        }
        match self.factories.build(identifier) {
            Some(view) => {
                log::trace!("creating page view for {identifier:?}");
                Ok(view)
            }
            None => {
                log::warn!("no reusable page view or factory for {identifier:?}");
                Err(PagerError::NoPageFactory {
                    identifier: identifier.into(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::{PageFactories, PageRecycler, PageView};
    use crate::{DEFAULT_PAGE_IDENTIFIER, PagerError, ReuseError, ReusePool};

    #[derive(Debug, PartialEq)]
    struct Card {
        label: String,
        resets: u32,
        broken: bool,
    }

    impl Card {
        fn new(label: &str) -> Self {
            Self {
                label: label.into(),
                resets: 0,
                broken: false,
            }
        }
    }

    impl PageView for Card {
        fn prepare_for_reuse(&mut self) -> Result<(), ReuseError> {
            if self.broken {
                return Err(ReuseError::new("broken card"));
            }
            self.resets += 1;
            Ok(())
        }
    }

    #[test]
    fn pooled_views_are_prepared_once() {
        let mut pool = ReusePool::new();
        let factories = PageFactories::default();
        pool.enqueue(DEFAULT_PAGE_IDENTIFIER, Card::new("a"));

        let mut recycler = PageRecycler::new(&mut pool, &factories);
        let card = recycler.dequeue_reusable_page_view().unwrap();
        assert_eq!(card.label, "a");
        assert_eq!(card.resets, 1);
        assert!(pool.is_empty());
    }

    #[test]
    fn empty_pool_falls_back_to_factory() {
        let mut pool = ReusePool::new();
        let mut factories = PageFactories::default();
        factories.register("card", || Card::new("fresh"));

        let mut recycler = PageRecycler::new(&mut pool, &factories);
        let card = recycler
            .dequeue_reusable_page_view_for_identifier("card")
            .unwrap();
        assert_eq!(card.label, "fresh");
        assert_eq!(card.resets, 0);
    }

    #[test]
    fn missing_factory_is_a_configuration_error() {
        let mut pool = ReusePool::<Card>::new();
        pool.enqueue("other", Card::new("kept"));
        let factories = PageFactories::default();

        let mut recycler = PageRecycler::new(&mut pool, &factories);
        let err = recycler
            .dequeue_reusable_page_view_for_identifier("X")
            .unwrap_err();
        assert_eq!(
            err,
            PagerError::NoPageFactory {
                identifier: "X".into()
            }
        );
        assert_eq!(pool.count("other"), 1);
    }

    #[test]
    fn failed_preparation_drops_the_view() {
        let mut pool = ReusePool::new();
        let factories = PageFactories::default();
        let mut card = Card::new("bad");
        card.broken = true;
        pool.enqueue(DEFAULT_PAGE_IDENTIFIER, card);

        let mut recycler = PageRecycler::new(&mut pool, &factories);
        let err = recycler.dequeue_reusable_page_view().unwrap_err();
        assert!(matches!(err, PagerError::PrepareForReuse { .. }));
        assert!(pool.is_empty());
    }
}
