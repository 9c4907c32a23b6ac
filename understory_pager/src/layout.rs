// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot geometry for a strip of pages plus optional header and footer slots.

use core::ops::RangeInclusive;

use kurbo::Rect;

use crate::{PageDirection, VirtualIndex};

/// Extent of an accessory (header or footer) slot along the paging axis.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum SlotExtent {
    /// The slot is exactly as wide as a page.
    #[default]
    MatchPage,
    /// The slot has its own fixed extent.
    Fixed(f64),
}

/// Geometry of a horizontal page strip.
///
/// The strip is made of contiguous slots addressed by [`VirtualIndex`]:
/// an optional header at `-1`, pages at `0..page_count`, and an optional
/// footer at `page_count`. Slots are separated by `spacing`; there is no
/// spacing before the first or after the last slot.
///
/// `PageLayout` is a pure value: it never owns views and every query is a
/// function of its configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct PageLayout {
    page_count: usize,
    page_extent: f64,
    cross_extent: f64,
    spacing: f64,
    direction: PageDirection,
    header: Option<SlotExtent>,
    footer: Option<SlotExtent>,
}

impl PageLayout {
    /// Creates a layout of `page_count` pages, each `page_extent` wide.
    ///
    /// Negative extents and spacing are clamped to zero. The cross extent
    /// starts at zero; see [`PageLayout::set_cross_extent`].
    #[must_use]
    pub fn new(
        page_count: usize,
        page_extent: f64,
        spacing: f64,
        direction: PageDirection,
    ) -> Self {
        Self {
            page_count,
            page_extent: non_negative(page_extent),
            cross_extent: 0.0,
            spacing: non_negative(spacing),
            direction,
            header: None,
            footer: None,
        }
    }

    /// Adds (or removes) a header slot at virtual index `-1`.
    #[must_use]
    pub fn with_header(mut self, header: Option<SlotExtent>) -> Self {
        self.header = header;
        self
    }

    /// Adds (or removes) a footer slot at virtual index `page_count`.
    #[must_use]
    pub fn with_footer(mut self, footer: Option<SlotExtent>) -> Self {
        self.footer = footer;
        self
    }

    /// Number of real pages, excluding accessories.
    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.page_count
    }

    /// Extent of a single page along the paging axis.
    #[must_use]
    pub const fn page_extent(&self) -> f64 {
        self.page_extent
    }

    /// Sets the page extent (typically the viewport width).
    pub fn set_page_extent(&mut self, extent: f64) {
        debug_assert!(extent.is_finite(), "page extent must be finite; got {extent:?}");
        self.page_extent = non_negative(extent);
    }

    /// Extent of every slot across the paging axis (typically the viewport height).
    #[must_use]
    pub const fn cross_extent(&self) -> f64 {
        self.cross_extent
    }

    /// Sets the cross-axis extent used by [`PageLayout::slot_frame`].
    pub fn set_cross_extent(&mut self, extent: f64) {
        self.cross_extent = non_negative(extent);
    }

    /// Gap between adjacent slots.
    #[must_use]
    pub const fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Layout direction.
    #[must_use]
    pub const fn direction(&self) -> PageDirection {
        self.direction
    }

    /// Returns `true` if a header slot exists.
    #[must_use]
    pub const fn has_header(&self) -> bool {
        self.header.is_some()
    }

    /// Returns `true` if a footer slot exists.
    #[must_use]
    pub const fn has_footer(&self) -> bool {
        self.footer.is_some()
    }

    /// Total number of slots, accessories included.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.page_count + usize::from(self.has_header()) + usize::from(self.has_footer())
    }

    /// Returns `true` if the layout has no slots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slot_count() == 0
    }

    /// Lowest valid virtual index: `-1` with a header, otherwise `0`.
    #[must_use]
    pub fn first_index(&self) -> VirtualIndex {
        if self.has_header() { -1 } else { 0 }
    }

    /// Highest valid virtual index: `page_count` with a footer, otherwise
    /// `page_count - 1`.
    ///
    /// For an empty layout this is smaller than [`PageLayout::first_index`].
    #[must_use]
    pub fn last_index(&self) -> VirtualIndex {
        let pages = to_index(self.page_count);
        if self.has_footer() { pages } else { pages - 1 }
    }

    /// Range of valid virtual indices, or `None` if the layout is empty.
    #[must_use]
    pub fn valid_range(&self) -> Option<RangeInclusive<VirtualIndex>> {
        (!self.is_empty()).then(|| self.first_index()..=self.last_index())
    }

    /// Returns `true` if `index` addresses a slot of this layout.
    #[must_use]
    pub fn contains(&self, index: VirtualIndex) -> bool {
        !self.is_empty() && index >= self.first_index() && index <= self.last_index()
    }

    /// Returns `true` if `index` is the header slot.
    #[must_use]
    pub fn is_header(&self, index: VirtualIndex) -> bool {
        self.has_header() && index == -1
    }

    /// Returns `true` if `index` is the footer slot.
    #[must_use]
    pub fn is_footer(&self, index: VirtualIndex) -> bool {
        self.has_footer() && index == to_index(self.page_count)
    }

    /// Converts a virtual index into a page index, if it addresses a real page.
    #[must_use]
    pub fn page_of(&self, index: VirtualIndex) -> Option<usize> {
        usize::try_from(index).ok().filter(|&page| page < self.page_count)
    }

    /// Extent of the slot at `index` along the paging axis.
    ///
    /// Returns zero for indices outside the layout.
    #[must_use]
    pub fn extent_of(&self, index: VirtualIndex) -> f64 {
        if self.is_header(index) {
            self.resolve(self.header)
        } else if self.is_footer(index) {
            self.resolve(self.footer)
        } else if self.page_of(index).is_some() {
            self.page_extent
        } else {
            0.0
        }
    }

    /// Start of the slot at `index` in ascending (left-to-right) coordinates.
    ///
    /// This is the cumulative extent of every preceding slot plus one spacing
    /// per preceding slot.
    #[must_use]
    pub fn start_of(&self, index: VirtualIndex) -> f64 {
        if !self.contains(index) || self.is_header(index) {
            return 0.0;
        }
        let leading = if self.has_header() {
            self.resolve(self.header) + self.spacing
        } else {
            0.0
        };
        // Pages and the footer follow the header at a uniform stride.
        let preceding_pages = to_scalar(usize::try_from(index).unwrap_or(0));
        leading + preceding_pages * (self.page_extent + self.spacing)
    }

    /// Physical offset of the slot at `index` on the paging axis.
    ///
    /// For [`PageDirection::RightToLeft`] the strip is mirrored, so index `0`
    /// sits towards the high end of [`PageLayout::total_content_extent`].
    #[must_use]
    pub fn offset_for_index(&self, index: VirtualIndex) -> f64 {
        self.direction.place(
            self.start_of(index),
            self.extent_of(index),
            self.total_content_extent(),
        )
    }

    /// Length of the whole strip: every slot extent plus `spacing * (slots - 1)`.
    #[must_use]
    pub fn total_content_extent(&self) -> f64 {
        let slots = self.slot_count();
        if slots == 0 {
            return 0.0;
        }
        let pages = to_scalar(self.page_count) * self.page_extent;
        let accessories = self.resolve(self.header) + self.resolve(self.footer);
        pages + accessories + to_scalar(slots - 1) * self.spacing
    }

    /// Frame of the slot at `index`, spanning the cross extent.
    #[must_use]
    pub fn slot_frame(&self, index: VirtualIndex) -> Rect {
        let x = self.offset_for_index(index);
        Rect::new(x, 0.0, x + self.extent_of(index), self.cross_extent)
    }

    /// Ascending coordinate that the scroll offset is compared against when
    /// it rests on the slot at `index`.
    pub(crate) fn anchor_of(&self, index: VirtualIndex) -> f64 {
        self.direction.anchor(self.start_of(index), self.extent_of(index))
    }

    fn resolve(&self, extent: Option<SlotExtent>) -> f64 {
        match extent {
            None => 0.0,
            Some(SlotExtent::MatchPage) => self.page_extent,
            Some(SlotExtent::Fixed(extent)) => non_negative(extent),
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_sign_negative() { 0.0 } else { value }
}

pub(crate) fn to_index(value: usize) -> VirtualIndex {
    VirtualIndex::try_from(value).unwrap_or(VirtualIndex::MAX)
}

pub(crate) fn to_scalar(value: usize) -> f64 {
    value as f64
}

#[cfg(test)]
mod tests {
    use super::{PageLayout, SlotExtent};
    use crate::PageDirection;

    fn five_pages(direction: PageDirection) -> PageLayout {
        PageLayout::new(5, 320.0, 40.0, direction)
    }

    #[test]
    fn pages_without_accessories() {
        let layout = five_pages(PageDirection::LeftToRight);
        assert_eq!(layout.total_content_extent(), 1760.0);
        assert_eq!(layout.offset_for_index(2), 720.0);
        assert_eq!(layout.valid_range(), Some(0..=4));
        assert_eq!(layout.page_of(-1), None);
        assert_eq!(layout.page_of(4), Some(4));
    }

    #[test]
    fn header_and_footer_shift_pages() {
        let layout = five_pages(PageDirection::LeftToRight)
            .with_header(Some(SlotExtent::MatchPage))
            .with_footer(Some(SlotExtent::Fixed(320.0)));
        assert_eq!(layout.valid_range(), Some(-1..=5));
        assert_eq!(layout.offset_for_index(-1), 0.0);
        assert_eq!(layout.offset_for_index(0), 360.0);
        assert_eq!(layout.offset_for_index(5), 6.0 * 360.0);
        assert_eq!(layout.total_content_extent(), 7.0 * 320.0 + 6.0 * 40.0);
        assert!(layout.is_header(-1));
        assert!(layout.is_footer(5));
    }

    #[test]
    fn narrow_header_only_moves_following_slots() {
        let layout = PageLayout::new(3, 300.0, 10.0, PageDirection::LeftToRight)
            .with_header(Some(SlotExtent::Fixed(100.0)));
        assert_eq!(layout.extent_of(-1), 100.0);
        assert_eq!(layout.offset_for_index(0), 110.0);
        assert_eq!(layout.offset_for_index(2), 110.0 + 2.0 * 310.0);
        assert_eq!(layout.total_content_extent(), 100.0 + 900.0 + 30.0);
    }

    #[test]
    fn accessories_without_pages() {
        let layout = PageLayout::new(0, 320.0, 40.0, PageDirection::LeftToRight)
            .with_header(Some(SlotExtent::MatchPage))
            .with_footer(Some(SlotExtent::MatchPage));
        assert_eq!(layout.valid_range(), Some(-1..=0));
        assert_eq!(layout.total_content_extent(), 680.0);
        assert!(layout.is_footer(0));

        let header_only = PageLayout::new(0, 320.0, 40.0, PageDirection::LeftToRight)
            .with_header(Some(SlotExtent::MatchPage));
        assert_eq!(header_only.total_content_extent(), 320.0);
    }

    #[test]
    fn empty_layout_has_no_slots() {
        let layout = PageLayout::new(0, 320.0, 40.0, PageDirection::LeftToRight);
        assert!(layout.is_empty());
        assert_eq!(layout.valid_range(), None);
        assert_eq!(layout.total_content_extent(), 0.0);
        assert!(!layout.contains(0));
    }

    #[test]
    fn right_to_left_mirrors_left_to_right() {
        let ltr = five_pages(PageDirection::LeftToRight)
            .with_header(Some(SlotExtent::Fixed(120.0)))
            .with_footer(Some(SlotExtent::MatchPage));
        let rtl = five_pages(PageDirection::RightToLeft)
            .with_header(Some(SlotExtent::Fixed(120.0)))
            .with_footer(Some(SlotExtent::MatchPage));
        let total = ltr.total_content_extent();
        assert_eq!(total, rtl.total_content_extent());
        for index in -1..=5 {
            let mirrored = total - ltr.offset_for_index(index) - ltr.extent_of(index);
            assert!(
                (rtl.offset_for_index(index) - mirrored).abs() < 1e-9,
                "index {index} is not mirrored"
            );
        }
        // Page 0 sits at the high end, left of the header.
        assert_eq!(rtl.offset_for_index(-1), total - 120.0);
    }

    #[test]
    fn slot_frame_spans_cross_extent() {
        let mut layout = five_pages(PageDirection::LeftToRight);
        layout.set_cross_extent(480.0);
        let frame = layout.slot_frame(1);
        assert_eq!(frame.x0, 360.0);
        assert_eq!(frame.width(), 320.0);
        assert_eq!(frame.height(), 480.0);
    }
}
