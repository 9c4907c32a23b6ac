// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions from a continuous scroll offset to virtual and page indices.

use crate::layout::to_scalar;
use crate::{PageLayout, VirtualIndex};

/// A scroll offset together with the indices derived from it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollPosition {
    /// Physical offset of the viewport's leading edge.
    pub offset: f64,
    /// Fractional virtual index, accessories included.
    pub fractional_index: f64,
    /// Nearest virtual index, accessories included.
    pub scroll_index: VirtualIndex,
    /// Nearest real page, or `None` if the layout has no pages.
    ///
    /// Resting on the header reports page `0`; resting on the footer reports
    /// the last page.
    pub page_index: Option<usize>,
}

impl PageLayout {
    /// Converts a scroll offset into a fractional virtual index.
    ///
    /// Slot anchors are searched with a binary search and the result is
    /// interpolated linearly between neighboring anchors, so accessories whose
    /// extent differs from the page extent are handled exactly. Offsets before
    /// the first slot or past the last one are clamped.
    ///
    /// Returns `0.0` for an empty layout.
    #[must_use]
    pub fn index_for_offset(&self, offset: f64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let first = self.first_index();
        let last = self.last_index();
        let target = self
            .direction()
            .unplace(offset, self.total_content_extent());

        if target <= self.anchor_of(first) {
            return index_scalar(first);
        }
        if target >= self.anchor_of(last) {
            return index_scalar(last);
        }

        // Invariant: anchor(lo) <= target < anchor(hi).
        let (mut lo, mut hi) = (first, last);
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.anchor_of(mid) <= target {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        let start = self.anchor_of(lo);
        let stride = self.anchor_of(lo + 1) - start;
        if stride <= 0.0 {
            return index_scalar(lo);
        }
        index_scalar(lo) + (target - start) / stride
    }

    /// Rounds the fractional index at `offset` to the nearest valid virtual index.
    ///
    /// Halfway positions round towards the higher index. Returns `0` for an
    /// empty layout.
    #[must_use]
    pub fn discrete_scroll_index(&self, offset: f64) -> VirtualIndex {
        if self.is_empty() {
            return 0;
        }
        let first = self.first_index();
        let above_first = self.index_for_offset(offset) - index_scalar(first) + 0.5;
        // `above_first` is non-negative, so truncation is a floor.
        #[expect(
            clippy::cast_possible_truncation,
            reason = "Index is clamped to bounds immediately after the cast"
        )]
        let steps = above_first as VirtualIndex;
        (first + steps).clamp(first, self.last_index())
    }

    /// The closest real page at `offset`, ignoring accessories.
    ///
    /// The header is treated as a neighbor of page `0` and the footer as a
    /// neighbor of the last page. Returns `None` when there are no pages.
    #[must_use]
    pub fn current_page_index(&self, offset: f64) -> Option<usize> {
        let last_page = self.page_count().checked_sub(1)?;
        let index = self.discrete_scroll_index(offset);
        Some(usize::try_from(index).unwrap_or(0).min(last_page))
    }

    /// Computes every derived index for `offset` at once.
    #[must_use]
    pub fn position_at(&self, offset: f64) -> ScrollPosition {
        ScrollPosition {
            offset,
            fractional_index: self.index_for_offset(offset),
            scroll_index: self.discrete_scroll_index(offset),
            page_index: self.current_page_index(offset),
        }
    }
}

pub(crate) fn index_scalar(index: VirtualIndex) -> f64 {
    let magnitude = to_scalar(index.unsigned_abs());
    if index < 0 { -magnitude } else { magnitude }
}
