// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator interfaces consumed by [`crate::Pager`].

use crate::{PageRecycler, PagerError, TransitionId, VirtualIndex};

/// Supplies the page count and page views.
///
/// The pager holds data sources through a `Weak<RefCell<_>>`, so the host
/// keeps ownership. Callbacks must not call back into the pager; doing so
/// surfaces as [`PagerError::Reentrant`].
pub trait PagerDataSource<V> {
    /// Number of real pages, excluding header and footer.
    fn number_of_pages(&self) -> usize;

    /// Produces the view for page `index`.
    ///
    /// Only called for real pages, never for the header or footer. Use
    /// `recycler` to pick up a previously used view of the right kind.
    fn page_view(
        &mut self,
        index: usize,
        recycler: &mut PageRecycler<'_, V>,
    ) -> Result<V, PagerError>;
}

/// Observes pager events. Every hook defaults to doing nothing.
pub trait PagerDelegate<V> {
    /// The header view is about to be inserted into the strip.
    fn will_insert_header_view(&mut self, header: &mut V) {
        let _ = header;
    }

    /// The footer view is about to be inserted into the strip.
    fn will_insert_footer_view(&mut self, footer: &mut V) {
        let _ = footer;
    }

    /// The pager is about to jump to virtual index `index`.
    fn will_jump_to_page(&mut self, index: VirtualIndex) {
        let _ = index;
    }
}

/// Drives animated scrolling on behalf of the pager.
///
/// The host animates the viewport from `from` to `to`, reporting intermediate
/// offsets through [`crate::Pager::advance_transition`] and the end of the
/// animation through [`crate::Pager::complete_transition`], both tagged with
/// the transition's id.
pub trait ScrollAnimator {
    /// Starts animating the viewport offset.
    fn animate_scroll(&mut self, transition: TransitionId, from: f64, to: f64);

    /// Stops a transition that has been superseded.
    fn cancel(&mut self, transition: TransitionId) {
        let _ = transition;
    }
}
