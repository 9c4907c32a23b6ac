// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_pager --heading-base-level=0

//! Understory Pager: a headless horizontal paging core.
//!
//! This crate decides *which* page occupies *which* slot of a horizontally
//! paged strip, and *when* a page view has to be created, reused, or released.
//! It never draws, animates, or handles input itself.
//!
//! The strip is addressed by **virtual indices**: real pages are `0..n`, an
//! optional header sits at `-1` and an optional footer at `n`. Slots are laid
//! out edge to edge with a configurable gap, either left to right or mirrored
//! for right-to-left locales.
//!
//! The core concepts are:
//!
//! - [`PageLayout`]: pure geometry. Maps virtual indices to offsets and frames
//!   and back, including fractional and rounded scroll indices.
//! - [`ReusePool`]: stacks of detached page views keyed by page identifier.
//! - [`PageView`]: optional per-view capabilities (reuse identifier and reset
//!   before reuse).
//! - [`PagerDataSource`], [`PagerDelegate`], and [`ScrollAnimator`]: the host's
//!   collaborators.
//! - [`Pager`]: the coordinator tying these together. It keeps the current page
//!   plus one neighbor on each side materialized, and recycles everything else.
//!
//! Host frameworks are responsible for:
//!
//! - Reporting scroll offsets via [`Pager::set_scroll_offset`].
//! - Positioning their views at each [`PageSlot::frame`] after an update.
//! - Driving animations started through [`ScrollAnimator`] and reporting
//!   progress back with [`Pager::advance_transition`] and
//!   [`Pager::complete_transition`].
//!
//! ## Minimal example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use kurbo::Size;
//! use understory_pager::{
//!     DEFAULT_PAGE_IDENTIFIER, PageRecycler, PageView, Pager, PagerDataSource, PagerError,
//! };
//!
//! #[derive(Debug)]
//! struct Card {
//!     page: usize,
//! }
//!
//! impl PageView for Card {}
//!
//! struct Deck {
//!     pages: usize,
//! }
//!
//! impl PagerDataSource<Card> for Deck {
//!     fn number_of_pages(&self) -> usize {
//!         self.pages
//!     }
//!
//!     fn page_view(
//!         &mut self,
//!         index: usize,
//!         recycler: &mut PageRecycler<'_, Card>,
//!     ) -> Result<Card, PagerError> {
//!         let mut card = recycler.dequeue_reusable_page_view()?;
//!         card.page = index;
//!         Ok(card)
//!     }
//! }
//!
//! let deck = Rc::new(RefCell::new(Deck { pages: 5 }));
//! let mut pager = Pager::new(Size::new(320.0, 480.0));
//! pager.register_page_view_class(DEFAULT_PAGE_IDENTIFIER, || Card { page: 0 });
//! pager.bind_data_source(&deck);
//!
//! pager.reload_page_scroll_view()?;
//! assert_eq!(pager.live_indices().as_slice(), &[0, 1]);
//!
//! pager.turn_to_page_at_index(3, false)?;
//! assert_eq!(pager.page_index(), Some(3));
//! assert_eq!(pager.live_indices().as_slice(), &[2, 3, 4]);
//! // Pages 0 and 1 went back to the pool.
//! assert_eq!(pager.reusable_view_total(), 2);
//! # Ok::<(), PagerError>(())
//! ```
//!
//! All extents and offsets live in a caller-chosen 1D coordinate space
//! (typically logical pixels). This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod delegate;
mod direction;
mod error;
mod layout;
mod page;
mod pager;
mod pool;
mod position;
mod transition;

pub use delegate::{PagerDataSource, PagerDelegate, ScrollAnimator};
pub use direction::PageDirection;
pub use error::{ErrorKind, PagerError, ReuseError};
pub use layout::{PageLayout, SlotExtent};
pub use page::{PageRecycler, PageView};
pub use pager::{Accessory, PageSlot, Pager, PagerDebugInfo, PagerState, SlotContent};
pub use pool::ReusePool;
pub use position::ScrollPosition;
pub use transition::{PendingTransition, TransitionId};

/// Signed slot index: `-1` is the header, `0..n` are pages, `n` is the footer.
pub type VirtualIndex = isize;

/// Reuse identifier used when a view does not pick its own.
pub const DEFAULT_PAGE_IDENTIFIER: &str = "default";

/// Gap between adjacent slots unless configured otherwise.
pub const DEFAULT_PAGE_SPACING: f64 = 40.0;

/// Offsets closer than this are considered equal.
pub const OFFSET_EPSILON: f64 = 1e-6;
