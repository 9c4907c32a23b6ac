// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The pager coordinator: owns slots and the reuse pool, and drives reloads,
//! visibility updates, and page turns.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;

use hashbrown::HashMap;
use kurbo::{Rect, Size};
use smallvec::SmallVec;

use crate::page::PageFactories;
use crate::position::index_scalar;
use crate::transition::Transitions;
use crate::{
    DEFAULT_PAGE_SPACING, OFFSET_EPSILON, PageDirection, PageLayout, PageRecycler,
    PageView, PagerDataSource, PagerDelegate, PagerError, PendingTransition, ReusePool,
    ScrollAnimator, ScrollPosition, SlotExtent, TransitionId, VirtualIndex,
};

type IndexSet = SmallVec<[VirtualIndex; 4]>;
type Staged<V> = SmallVec<[(VirtualIndex, V); 4]>;

/// Whether the pager currently shows anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PagerState {
    /// Never reloaded, or reloaded with no pages and no accessories.
    #[default]
    Empty,
    /// Slots are materialized for the current scroll offset.
    Loaded,
}

/// A header or footer view together with its extent along the paging axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Accessory<V> {
    /// The accessory view.
    pub view: V,
    /// Extent of the accessory slot.
    pub extent: SlotExtent,
}

impl<V> Accessory<V> {
    /// An accessory exactly as wide as a page.
    #[must_use]
    pub fn new(view: V) -> Self {
        Self {
            view,
            extent: SlotExtent::MatchPage,
        }
    }

    /// An accessory with its own fixed extent.
    #[must_use]
    pub fn with_extent(view: V, extent: f64) -> Self {
        Self {
            view,
            extent: SlotExtent::Fixed(extent),
        }
    }
}

#[derive(Debug)]
enum Accessories<V> {
    Separate {
        header: Option<Accessory<V>>,
        footer: Option<Accessory<V>>,
    },
    /// One view that moves between the header and footer slots.
    Shared(Accessory<V>),
}

impl<V> Accessories<V> {
    fn header(&self) -> Option<&Accessory<V>> {
        match self {
            Self::Separate { header, .. } => header.as_ref(),
            Self::Shared(shared) => Some(shared),
        }
    }

    fn footer(&self) -> Option<&Accessory<V>> {
        match self {
            Self::Separate { footer, .. } => footer.as_ref(),
            Self::Shared(shared) => Some(shared),
        }
    }

    fn header_mut(&mut self) -> Option<&mut Accessory<V>> {
        match self {
            Self::Separate { header, .. } => header.as_mut(),
            Self::Shared(shared) => Some(shared),
        }
    }

    fn footer_mut(&mut self) -> Option<&mut Accessory<V>> {
        match self {
            Self::Separate { footer, .. } => footer.as_mut(),
            Self::Shared(shared) => Some(shared),
        }
    }

    /// Takes the separate header and footer, leaving none configured.
    ///
    /// A shared view is dropped and reported as neither.
    fn take_separate(&mut self) -> (Option<Accessory<V>>, Option<Accessory<V>>) {
        let none = Self::Separate {
            header: None,
            footer: None,
        };
        match core::mem::replace(self, none) {
            Self::Separate { header, footer } => (header, footer),
            Self::Shared(_) => (None, None),
        }
    }
}

/// What occupies a slot.
#[derive(Clone, Debug, PartialEq)]
pub enum SlotContent<V> {
    /// A page view owned by the slot.
    Page(V),
    /// The configured header view.
    Header,
    /// The configured footer view (or the shared header/footer view).
    Footer,
}

/// A materialized slot: one virtual index, its content, and its frame.
#[derive(Clone, Debug, PartialEq)]
pub struct PageSlot<V> {
    index: VirtualIndex,
    frame: Rect,
    content: SlotContent<V>,
}

impl<V> PageSlot<V> {
    /// Virtual index of this slot.
    #[must_use]
    pub fn index(&self) -> VirtualIndex {
        self.index
    }

    /// Frame of this slot in content coordinates.
    #[must_use]
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// What this slot holds.
    #[must_use]
    pub fn content(&self) -> &SlotContent<V> {
        &self.content
    }

    /// The page view, if this slot holds a page.
    #[must_use]
    pub fn page_view(&self) -> Option<&V> {
        match &self.content {
            SlotContent::Page(view) => Some(view),
            SlotContent::Header | SlotContent::Footer => None,
        }
    }

    /// Mutable access to the page view, if this slot holds a page.
    pub fn page_view_mut(&mut self) -> Option<&mut V> {
        match &mut self.content {
            SlotContent::Page(view) => Some(view),
            SlotContent::Header | SlotContent::Footer => None,
        }
    }
}

/// Horizontal pager over a data source's pages plus optional header and
/// footer accessories.
///
/// The pager decides which virtual index occupies which slot and when a page
/// view must be created, reused, or released. It never draws anything: hosts
/// read [`Pager::live_slots`] after each update and position their views at
/// [`PageSlot::frame`].
///
/// Layout-affecting configuration (page spacing, direction, accessories, and
/// the page count) is staged and applied by
/// [`Pager::reload_page_scroll_view`]. Viewport size changes apply
/// immediately.
pub struct Pager<V> {
    data_source: Option<Weak<RefCell<dyn PagerDataSource<V>>>>,
    delegate: Option<Weak<RefCell<dyn PagerDelegate<V>>>>,
    animator: Option<Box<dyn ScrollAnimator>>,

    page_spacing: f64,
    direction: PageDirection,
    accessories: Accessories<V>,
    viewport: Size,

    layout: PageLayout,
    state: PagerState,
    scroll_offset: f64,
    slots: HashMap<VirtualIndex, PageSlot<V>>,
    pool: ReusePool<V>,
    factories: PageFactories<V>,
    transitions: Transitions,
}

impl<V: fmt::Debug> fmt::Debug for Pager<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("state", &self.state)
            .field("layout", &self.layout)
            .field("scroll_offset", &self.scroll_offset)
            .field("slots", &self.slots)
            .field("pool", &self.pool)
            .field("accessories", &self.accessories)
            .finish_non_exhaustive()
    }
}

impl<V: PageView> Pager<V> {
    /// Creates an empty pager for a viewport of the given size.
    ///
    /// The viewport width is the page extent; its height is the cross extent
    /// of every slot.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        let mut layout = PageLayout::new(
            0,
            viewport.width,
            DEFAULT_PAGE_SPACING,
            PageDirection::default(),
        );
        layout.set_cross_extent(viewport.height);
        Self {
            data_source: None,
            delegate: None,
            animator: None,
            page_spacing: DEFAULT_PAGE_SPACING,
            direction: PageDirection::default(),
            accessories: Accessories::Separate {
                header: None,
                footer: None,
            },
            viewport,
            layout,
            state: PagerState::Empty,
            scroll_offset: 0.0,
            slots: HashMap::new(),
            pool: ReusePool::new(),
            factories: PageFactories::default(),
            transitions: Transitions::default(),
        }
    }

    // --- Collaborators -------------------------------------------------------

    /// Binds the data source. The pager only keeps a weak reference.
    ///
    /// Binding does not trigger a reload.
    pub fn bind_data_source<S: PagerDataSource<V> + 'static>(&mut self, source: &Rc<RefCell<S>>) {
        let weak = Rc::downgrade(source);
        let weak: Weak<RefCell<dyn PagerDataSource<V>>> = weak;
        self.data_source = Some(weak);
    }

    /// Unbinds the data source.
    pub fn unbind_data_source(&mut self) {
        self.data_source = None;
    }

    /// Binds the delegate. The pager only keeps a weak reference.
    pub fn bind_delegate<D: PagerDelegate<V> + 'static>(&mut self, delegate: &Rc<RefCell<D>>) {
        let weak = Rc::downgrade(delegate);
        let weak: Weak<RefCell<dyn PagerDelegate<V>>> = weak;
        self.delegate = Some(weak);
    }

    /// Unbinds the delegate.
    pub fn unbind_delegate(&mut self) {
        self.delegate = None;
    }

    /// Installs (or removes) the animator used for animated page turns.
    ///
    /// Without an animator, animated turns complete immediately.
    pub fn set_scroll_animator(&mut self, animator: Option<Box<dyn ScrollAnimator>>) {
        self.cancel_transition();
        self.animator = animator;
    }

    /// Returns `true` if a factory is registered for `identifier`.
    #[must_use]
    pub fn has_page_view_class(&self, identifier: &str) -> bool {
        self.factories.contains(identifier)
    }

    /// Registers a factory used when the reuse pool for `identifier` is empty.
    pub fn register_page_view_class(
        &mut self,
        identifier: impl Into<alloc::string::String>,
        factory: impl Fn() -> V + 'static,
    ) {
        self.factories.register(identifier, factory);
    }

    // --- Configuration -------------------------------------------------------

    /// Gap between adjacent slots. Defaults to [`DEFAULT_PAGE_SPACING`].
    #[must_use]
    pub fn page_spacing(&self) -> f64 {
        self.page_spacing
    }

    /// Stages a new page spacing, applied on the next reload.
    pub fn set_page_spacing(&mut self, spacing: f64) {
        self.page_spacing = spacing;
    }

    /// Configured layout direction.
    #[must_use]
    pub fn page_direction(&self) -> PageDirection {
        self.direction
    }

    /// Stages a new layout direction, applied on the next reload.
    pub fn set_page_direction(&mut self, direction: PageDirection) {
        self.direction = direction;
    }

    /// The configured header view (the shared view if one is set).
    #[must_use]
    pub fn header_view(&self) -> Option<&V> {
        self.accessories.header().map(|header| &header.view)
    }

    /// The configured footer view (the shared view if one is set).
    #[must_use]
    pub fn footer_view(&self) -> Option<&V> {
        self.accessories.footer().map(|footer| &footer.view)
    }

    /// Sets the header, replacing a shared header/footer view if one was set.
    ///
    /// A header slot showing the previous view is detached immediately; the
    /// new slot geometry applies on the next reload.
    pub fn set_header_view(&mut self, header: Option<Accessory<V>>) {
        let (_, footer) = self.accessories.take_separate();
        self.accessories = Accessories::Separate { header, footer };
        self.detach_accessory_slots();
    }

    /// Sets the footer, replacing a shared header/footer view if one was set.
    pub fn set_footer_view(&mut self, footer: Option<Accessory<V>>) {
        let (header, _) = self.accessories.take_separate();
        self.accessories = Accessories::Separate { header, footer };
        self.detach_accessory_slots();
    }

    /// Uses a single view as both header and footer.
    ///
    /// This replaces any separate header and footer. The view is shown in
    /// whichever accessory slot is closer to the current scroll position.
    pub fn set_header_footer_view(&mut self, accessory: Accessory<V>) {
        self.accessories = Accessories::Shared(accessory);
        self.detach_accessory_slots();
    }

    /// Current viewport size.
    #[must_use]
    pub fn viewport_size(&self) -> Size {
        self.viewport
    }

    /// Resizes the viewport and re-lays out immediately.
    ///
    /// The pager keeps resting on the same virtual index (or heads for the
    /// target of an in-flight transition, which is cancelled).
    pub fn set_viewport_size(&mut self, viewport: Size) -> Result<(), PagerError> {
        let keep = self.target_index();
        self.viewport = viewport;
        self.layout.set_page_extent(viewport.width);
        self.layout.set_cross_extent(viewport.height);
        self.cancel_transition();
        if self.state == PagerState::Empty {
            return Ok(());
        }
        log::debug!("viewport resized to {viewport:?}; keeping virtual index {keep}");
        self.scroll_offset = self.layout.offset_for_index(keep);
        self.position_slots();
        self.update_visible_slots(self.scroll_offset)
    }

    // --- Reloading -----------------------------------------------------------

    /// Rebuilds everything from the data source and staged configuration.
    ///
    /// Every page slot is drained into the reuse pool, the page count is
    /// re-read, and slots are re-materialized around the current virtual
    /// index (index `0` on first load), clamped into the new range.
    ///
    /// If the data source fails while re-materializing, the new geometry is
    /// kept and the missing slots are filled by the next update.
    pub fn reload_page_scroll_view(&mut self) -> Result<(), PagerError> {
        let source = self.upgrade_data_source()?;
        let page_count = source
            .try_borrow()
            .map_err(|_| PagerError::Reentrant)?
            .number_of_pages();

        let keep = match self.state {
            PagerState::Loaded => self.target_index(),
            PagerState::Empty => 0,
        };
        self.cancel_transition();
        let drained: IndexSet = self.slots.keys().copied().collect();
        for index in drained {
            self.retire_slot(index);
        }

        let mut layout = PageLayout::new(
            page_count,
            self.viewport.width,
            self.page_spacing,
            self.direction,
        )
        .with_header(self.accessories.header().map(|header| header.extent))
        .with_footer(self.accessories.footer().map(|footer| footer.extent));
        layout.set_cross_extent(self.viewport.height);
        self.layout = layout;

        let Some(valid) = self.layout.valid_range() else {
            log::debug!("reloaded pager with no pages and no accessories");
            self.state = PagerState::Empty;
            self.scroll_offset = 0.0;
            return Ok(());
        };
        self.state = PagerState::Loaded;
        let index = keep.clamp(*valid.start(), *valid.end());
        log::debug!("reloaded pager: {page_count} pages, resting on virtual index {index}");
        // Rest on the target even if materializing fails, so a retry at the
        // current offset fills the slots for the right index.
        self.scroll_offset = self.layout.offset_for_index(index);
        self.update_visible_slots(self.scroll_offset)
    }

    // --- Scrolling -----------------------------------------------------------

    /// Reports a new viewport offset, e.g. from the host's scroll handling.
    ///
    /// Offsets within [`OFFSET_EPSILON`] of the current one are treated as
    /// unchanged.
    pub fn set_scroll_offset(&mut self, offset: f64) -> Result<(), PagerError> {
        let offset = if (offset - self.scroll_offset).abs() < OFFSET_EPSILON {
            self.scroll_offset
        } else {
            offset
        };
        self.update_visible_slots(offset)
    }

    /// Brings the set of materialized slots in line with `offset`.
    ///
    /// The slot at the current virtual index and one neighbor on each side are
    /// kept alive. Departing page views go to the reuse pool; arriving pages
    /// are requested from the data source, which may dequeue from the pool.
    /// Calling this twice with the same offset does no further work.
    ///
    /// All arriving views are obtained before anything is committed: if the
    /// data source fails, the views it already produced go back to the pool
    /// and the slots and offset are left as they were.
    pub fn update_visible_slots(&mut self, offset: f64) -> Result<(), PagerError> {
        if self.state == PagerState::Empty {
            self.scroll_offset = offset;
            return Ok(());
        }
        let wanted = self.wanted_indices(offset);

        let (arriving_pages, arriving_accessories): (IndexSet, IndexSet) = wanted
            .iter()
            .copied()
            .filter(|index| !self.slots.contains_key(index))
            .partition(|index| self.layout.page_of(*index).is_some());

        let staged = self.stage_pages(&arriving_pages)?;

        let bound_delegate = self.upgrade_delegate();
        let borrowed = bound_delegate
            .as_ref()
            .map(|delegate| delegate.try_borrow_mut());
        let mut delegate = match borrowed {
            Some(Ok(delegate)) => Some(delegate),
            Some(Err(_)) if !arriving_accessories.is_empty() => {
                self.unstage(staged);
                return Err(PagerError::Reentrant);
            }
            _ => None,
        };

        self.scroll_offset = offset;

        let departing: IndexSet = self
            .slots
            .keys()
            .copied()
            .filter(|index| !wanted.contains(index))
            .collect();
        for index in departing {
            self.retire_slot(index);
        }

        for (index, view) in staged {
            log::trace!("materialized page slot {index}");
            self.insert_slot(index, SlotContent::Page(view));
        }

        for index in arriving_accessories {
            let content = if self.layout.is_header(index) {
                if let (Some(delegate), Some(header)) =
                    (delegate.as_mut(), self.accessories.header_mut())
                {
                    delegate.will_insert_header_view(&mut header.view);
                }
                SlotContent::Header
            } else {
                if let (Some(delegate), Some(footer)) =
                    (delegate.as_mut(), self.accessories.footer_mut())
                {
                    delegate.will_insert_footer_view(&mut footer.view);
                }
                SlotContent::Footer
            };
            log::trace!("inserted accessory slot {index}");
            self.insert_slot(index, content);
        }

        self.position_slots();
        Ok(())
    }

    // --- Navigation ----------------------------------------------------------

    /// Turns to virtual index `index` (`-1` for the header, the page count for
    /// the footer).
    ///
    /// The delegate is told about the jump before the offset changes. With
    /// `animated` and an installed [`ScrollAnimator`] the turn is handed to
    /// the animator and any in-flight turn is cancelled; otherwise the offset
    /// changes and slots update synchronously.
    pub fn turn_to_page_at_index(
        &mut self,
        index: VirtualIndex,
        animated: bool,
    ) -> Result<(), PagerError> {
        if !self.layout.contains(index) {
            log::warn!("rejected turn to virtual index {index}");
            return Err(PagerError::IndexOutOfRange {
                index,
                valid: self.layout.valid_range(),
            });
        }
        if let Some(delegate) = self.upgrade_delegate() {
            delegate
                .try_borrow_mut()
                .map_err(|_| PagerError::Reentrant)?
                .will_jump_to_page(index);
        }

        let target = self.layout.offset_for_index(index);
        if animated {
            if let Some(animator) = self.animator.as_mut() {
                let (next, superseded) = self.transitions.begin(index, self.scroll_offset, target);
                if let Some(old) = superseded {
                    log::debug!("transition {:?} superseded by {:?}", old.id, next.id);
                    animator.cancel(old.id);
                }
                log::debug!("animating to virtual index {index} as {:?}", next.id);
                animator.animate_scroll(next.id, self.scroll_offset, target);
                return Ok(());
            }
        }
        self.cancel_transition();
        log::debug!("jumping to virtual index {index}");
        self.update_visible_slots(target)
    }

    /// Turns one slot forward (towards the footer). Does nothing if
    /// [`Pager::can_go_forward`] is `false`.
    pub fn turn_to_next_page(&mut self, animated: bool) -> Result<(), PagerError> {
        if !self.can_go_forward() {
            return Ok(());
        }
        self.turn_to_page_at_index(self.target_index() + 1, animated)
    }

    /// Turns one slot back (towards the header). Does nothing if
    /// [`Pager::can_go_back`] is `false`.
    pub fn turn_to_previous_page(&mut self, animated: bool) -> Result<(), PagerError> {
        if !self.can_go_back() {
            return Ok(());
        }
        self.turn_to_page_at_index(self.target_index() - 1, animated)
    }

    /// Returns `true` if there is a slot after the current one.
    ///
    /// Always `false` when there are no pages.
    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        self.layout.page_count() > 0 && self.target_index() < self.layout.last_index()
    }

    /// Returns `true` if there is a slot before the current one.
    ///
    /// Always `false` when there are no pages.
    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.layout.page_count() > 0 && self.target_index() > self.layout.first_index()
    }

    /// Reports animation progress for transition `id`.
    ///
    /// Returns `Ok(false)` without doing anything if `id` has been superseded
    /// or already completed.
    pub fn advance_transition(
        &mut self,
        id: TransitionId,
        offset: f64,
    ) -> Result<bool, PagerError> {
        if self.transitions.current(id).is_none() {
            return Ok(false);
        }
        self.set_scroll_offset(offset)?;
        Ok(true)
    }

    /// Completes transition `id`, settling on its target.
    ///
    /// Returns `Ok(false)` without doing anything if `id` has been superseded
    /// or already completed.
    pub fn complete_transition(&mut self, id: TransitionId) -> Result<bool, PagerError> {
        let Some(pending) = self.transitions.current(id) else {
            log::trace!("ignoring stale transition {id:?}");
            return Ok(false);
        };
        self.update_visible_slots(pending.target_offset)?;
        self.transitions.clear();
        log::debug!("completed transition {id:?} at virtual index {}", pending.target_index);
        Ok(true)
    }

    /// The in-flight animated turn, if any.
    #[must_use]
    pub fn pending_transition(&self) -> Option<PendingTransition> {
        self.transitions.pending()
    }

    // --- Reuse ---------------------------------------------------------------

    /// Dequeues a view from the default pool, falling back to the default factory.
    pub fn dequeue_reusable_page_view(&mut self) -> Result<V, PagerError> {
        PageRecycler::new(&mut self.pool, &self.factories).dequeue_reusable_page_view()
    }

    /// Dequeues a view for `identifier`, falling back to its factory.
    pub fn dequeue_reusable_page_view_for_identifier(
        &mut self,
        identifier: &str,
    ) -> Result<V, PagerError> {
        PageRecycler::new(&mut self.pool, &self.factories)
            .dequeue_reusable_page_view_for_identifier(identifier)
    }

    /// Number of pooled views for `identifier`.
    #[must_use]
    pub fn reusable_view_count(&self, identifier: &str) -> usize {
        self.pool.count(identifier)
    }

    /// Number of pooled views across every identifier.
    #[must_use]
    pub fn reusable_view_total(&self) -> usize {
        self.pool.len()
    }

    // --- Queries -------------------------------------------------------------

    /// Current state.
    #[must_use]
    pub fn state(&self) -> PagerState {
        self.state
    }

    /// Active layout, as applied by the last reload or resize.
    #[must_use]
    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Number of pages read by the last reload.
    #[must_use]
    pub fn number_of_pages(&self) -> usize {
        self.layout.page_count()
    }

    /// Current viewport offset.
    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Total extent of the strip.
    #[must_use]
    pub fn content_extent(&self) -> f64 {
        self.layout.total_content_extent()
    }

    /// Current virtual index, accessories included.
    #[must_use]
    pub fn scroll_index(&self) -> VirtualIndex {
        self.layout.discrete_scroll_index(self.scroll_offset)
    }

    /// Closest real page, accessories excluded. `None` when there are no pages.
    #[must_use]
    pub fn page_index(&self) -> Option<usize> {
        self.layout.current_page_index(self.scroll_offset)
    }

    /// Every index derived from the current offset.
    #[must_use]
    pub fn position(&self) -> ScrollPosition {
        self.layout.position_at(self.scroll_offset)
    }

    /// The slot at `index`, if materialized.
    #[must_use]
    pub fn slot(&self, index: VirtualIndex) -> Option<&PageSlot<V>> {
        self.slots.get(&index)
    }

    /// Mutable access to the slot at `index`, if materialized.
    pub fn slot_mut(&mut self, index: VirtualIndex) -> Option<&mut PageSlot<V>> {
        self.slots.get_mut(&index)
    }

    /// Iterates over every materialized slot in no particular order.
    pub fn live_slots(&self) -> impl Iterator<Item = &PageSlot<V>> {
        self.slots.values()
    }

    /// Materialized virtual indices in ascending order.
    #[must_use]
    pub fn live_indices(&self) -> SmallVec<[VirtualIndex; 4]> {
        let mut indices: IndexSet = self.slots.keys().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// Snapshot of the pager for debugging and inspection.
    #[must_use]
    pub fn debug_info(&self) -> PagerDebugInfo {
        PagerDebugInfo {
            state: self.state,
            number_of_pages: self.layout.page_count(),
            position: self.position(),
            content_extent: self.content_extent(),
            live_indices: self.live_indices(),
            pooled_views: self.pool.len(),
            pending_transition: self.transitions.pending(),
        }
    }

    // --- Internals -----------------------------------------------------------

    /// Where navigation counts from: an in-flight transition's target, or the
    /// current scroll index.
    fn target_index(&self) -> VirtualIndex {
        self.transitions
            .pending()
            .map_or_else(|| self.scroll_index(), |pending| pending.target_index)
    }

    fn wanted_indices(&self, offset: f64) -> IndexSet {
        let Some(valid) = self.layout.valid_range() else {
            return IndexSet::new();
        };
        let center = self.layout.discrete_scroll_index(offset);
        let lo = (center - 1).max(*valid.start());
        let hi = (center + 1).min(*valid.end());
        let mut wanted: IndexSet = (lo..=hi)
            .filter(|&index| {
                if self.layout.is_header(index) {
                    self.accessories.header().is_some()
                } else if self.layout.is_footer(index) {
                    self.accessories.footer().is_some()
                } else {
                    true
                }
            })
            .collect();

        // A shared view staged over a layout without both accessory slots
        // occupies at most one of them already.
        let both_accessories = self.layout.has_header() && self.layout.has_footer();
        if matches!(self.accessories, Accessories::Shared(_)) && both_accessories {
            let footer = self.layout.last_index();
            if wanted.contains(&-1) && wanted.contains(&footer) {
                // The shared view can only be in one place; keep the nearer slot.
                let fractional = self.layout.index_for_offset(offset);
                let farther = if fractional + 1.0 <= index_scalar(footer) - fractional {
                    footer
                } else {
                    -1
                };
                wanted.retain(|index| *index != farther);
            }
        }
        wanted
    }

    /// Requests views for `pages` from the data source without committing them.
    fn stage_pages(&mut self, pages: &[VirtualIndex]) -> Result<Staged<V>, PagerError> {
        let mut staged = SmallVec::new();
        if pages.is_empty() {
            return Ok(staged);
        }
        let source = self.upgrade_data_source()?;
        let mut source = source.try_borrow_mut().map_err(|_| PagerError::Reentrant)?;
        for &index in pages {
            let Some(page) = self.layout.page_of(index) else {
                continue;
            };
            let mut recycler = PageRecycler::new(&mut self.pool, &self.factories);
            match source.page_view(page, &mut recycler) {
                Ok(view) => staged.push((index, view)),
                Err(err) => {
                    log::warn!("data source failed to provide page {page}: {err}");
                    self.unstage(staged);
                    return Err(err);
                }
            }
        }
        Ok(staged)
    }

    fn unstage(&mut self, staged: Staged<V>) {
        for (_, mut view) in staged {
            view.release();
            let identifier = alloc::string::String::from(view.page_identifier());
            self.pool.enqueue(&identifier, view);
        }
    }

    fn insert_slot(&mut self, index: VirtualIndex, content: SlotContent<V>) {
        let slot = PageSlot {
            index,
            frame: self.layout.slot_frame(index),
            content,
        };
        let previous = self.slots.insert(index, slot);
        debug_assert!(previous.is_none(), "slot {index} materialized twice");
    }

    /// Removes the slot at `index`, sending its page view to the reuse pool.
    fn retire_slot(&mut self, index: VirtualIndex) {
        let Some(slot) = self.slots.remove(&index) else {
            return;
        };
        if let SlotContent::Page(mut view) = slot.content {
            view.release();
            let identifier = alloc::string::String::from(view.page_identifier());
            log::trace!("recycling page slot {index} into {identifier:?}");
            self.pool.enqueue(&identifier, view);
        }
    }

    fn detach_accessory_slots(&mut self) {
        self.slots
            .retain(|_, slot| matches!(slot.content, SlotContent::Page(_)));
    }

    fn position_slots(&mut self) {
        for slot in self.slots.values_mut() {
            slot.frame = self.layout.slot_frame(slot.index);
        }
    }

    fn cancel_transition(&mut self) {
        let Some(pending) = self.transitions.clear() else {
            return;
        };
        if let Some(animator) = self.animator.as_mut() {
            animator.cancel(pending.id);
        }
    }

    fn upgrade_data_source(&self) -> Result<Rc<RefCell<dyn PagerDataSource<V>>>, PagerError> {
        self.data_source
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or_else(|| {
                log::warn!("pager operation needs a data source but none is bound");
                PagerError::MissingDataSource
            })
    }

    fn upgrade_delegate(&self) -> Option<Rc<RefCell<dyn PagerDelegate<V>>>> {
        self.delegate.as_ref().and_then(Weak::upgrade)
    }
}

/// Debug snapshot of a [`Pager`].
#[derive(Clone, Debug, PartialEq)]
pub struct PagerDebugInfo {
    /// Current state.
    pub state: PagerState,
    /// Number of real pages.
    pub number_of_pages: usize,
    /// Current offset and derived indices.
    pub position: ScrollPosition,
    /// Total extent of the strip.
    pub content_extent: f64,
    /// Materialized virtual indices in ascending order.
    pub live_indices: SmallVec<[VirtualIndex; 4]>,
    /// Number of views waiting in the reuse pool.
    pub pooled_views: usize,
    /// In-flight animated turn, if any.
    pub pending_transition: Option<PendingTransition>,
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use kurbo::Size;

    use super::{Accessory, Pager, PagerState, SlotContent};
    use crate::{DEFAULT_PAGE_IDENTIFIER, PageRecycler, PageView, PagerDataSource, PagerError};

    #[derive(Debug, PartialEq)]
    struct Tile(usize);

    impl PageView for Tile {}

    struct Source {
        pages: usize,
        fail_on: Option<usize>,
        requested: Vec<usize>,
    }

    impl PagerDataSource<Tile> for Source {
        fn number_of_pages(&self) -> usize {
            self.pages
        }

        fn page_view(
            &mut self,
            index: usize,
            recycler: &mut PageRecycler<'_, Tile>,
        ) -> Result<Tile, PagerError> {
            self.requested.push(index);
            if self.fail_on == Some(index) {
                return recycler.dequeue_reusable_page_view_for_identifier("missing");
            }
            let mut tile = recycler.dequeue_reusable_page_view()?;
            tile.0 = index;
            Ok(tile)
        }
    }

    fn pager(pages: usize) -> (Pager<Tile>, Rc<RefCell<Source>>) {
        let source = Rc::new(RefCell::new(Source {
            pages,
            fail_on: None,
            requested: Vec::new(),
        }));
        let mut pager = Pager::new(Size::new(320.0, 480.0));
        pager.register_page_view_class(DEFAULT_PAGE_IDENTIFIER, || Tile(usize::MAX));
        pager.bind_data_source(&source);
        (pager, source)
    }

    #[test]
    fn shared_accessory_occupies_the_nearer_slot() {
        let (mut pager, _source) = pager(1);
        pager.set_header_footer_view(Accessory::new(Tile(99)));
        pager.reload_page_scroll_view().unwrap();

        // Header (-1), page 0 and footer (1) are all within one slot of page 0,
        // but the shared view can only sit in one of them.
        assert_eq!(pager.live_indices().as_slice(), &[-1, 0]);
        assert_eq!(pager.slot(-1).unwrap().content(), &SlotContent::Header);

        pager.turn_to_page_at_index(1, false).unwrap();
        assert_eq!(pager.live_indices().as_slice(), &[0, 1]);
        assert_eq!(pager.slot(1).unwrap().content(), &SlotContent::Footer);
    }

    #[test]
    fn failed_arrival_leaves_slots_and_offset_untouched() {
        let (mut pager, source) = pager(6);
        pager.reload_page_scroll_view().unwrap();
        let before = pager.debug_info();

        source.borrow_mut().fail_on = Some(3);
        let offset = pager.layout().offset_for_index(3);
        let err = pager.set_scroll_offset(offset).unwrap_err();
        assert!(matches!(err, PagerError::NoPageFactory { .. }));

        let after = pager.debug_info();
        assert_eq!(after.live_indices, before.live_indices);
        assert_eq!(after.position, before.position);
        // Page 2 was produced before page 3 failed; it is parked in the pool.
        assert_eq!(pager.reusable_view_count(DEFAULT_PAGE_IDENTIFIER), 1);
    }

    #[test]
    fn reload_with_nothing_to_show_is_empty() {
        let (mut pager, source) = pager(0);
        pager.reload_page_scroll_view().unwrap();
        assert_eq!(pager.state(), PagerState::Empty);
        assert_eq!(pager.live_slots().count(), 0);
        assert!(source.borrow().requested.is_empty());
        assert_eq!(pager.scroll_index(), 0);
        assert_eq!(pager.page_index(), None);
    }

    #[test]
    fn replacing_an_accessory_detaches_its_slot() {
        let (mut pager, _source) = pager(3);
        pager.set_header_view(Some(Accessory::new(Tile(100))));
        pager.reload_page_scroll_view().unwrap();
        pager.turn_to_page_at_index(-1, false).unwrap();
        assert!(pager.slot(-1).is_some());

        pager.set_header_view(None);
        assert!(pager.slot(-1).is_none());
        assert!(pager.header_view().is_none());
        // Geometry still has a header slot until the next reload.
        assert!(pager.layout().has_header());

        pager.reload_page_scroll_view().unwrap();
        assert!(!pager.layout().has_header());
        assert_eq!(pager.scroll_index(), 0);
    }

    #[test]
    fn staged_shared_view_keeps_pages_over_a_header_only_layout() {
        let (mut pager, _source) = pager(2);
        pager.set_header_view(Some(Accessory::new(Tile(100))));
        pager.reload_page_scroll_view().unwrap();
        assert_eq!(pager.live_indices().as_slice(), &[-1, 0, 1]);

        // The layout has no footer slot until the next reload, so the shared
        // view can only go in the header slot and page 1 stays.
        pager.set_header_footer_view(Accessory::new(Tile(7)));
        let offset = pager.layout().offset_for_index(0);
        pager.update_visible_slots(offset).unwrap();
        assert_eq!(pager.live_indices().as_slice(), &[-1, 0, 1]);
        assert_eq!(pager.slot(-1).unwrap().content(), &SlotContent::Header);
        assert_eq!(pager.slot(1).unwrap().page_view(), Some(&Tile(1)));
    }

    #[test]
    fn failed_reload_rests_on_its_target_and_retries() {
        let (mut pager, source) = pager(5);
        pager.set_header_view(Some(Accessory::new(Tile(100))));
        source.borrow_mut().fail_on = Some(1);

        let err = pager.reload_page_scroll_view().unwrap_err();
        assert!(matches!(err, PagerError::NoPageFactory { .. }));
        assert_eq!(pager.state(), PagerState::Loaded);
        assert_eq!(pager.live_slots().count(), 0);
        assert_eq!(pager.scroll_index(), 0);
        assert_eq!(pager.scroll_offset(), pager.layout().offset_for_index(0));

        source.borrow_mut().fail_on = None;
        pager.set_scroll_offset(pager.scroll_offset()).unwrap();
        assert_eq!(pager.live_indices().as_slice(), &[-1, 0, 1]);
        assert_eq!(pager.slot(1).unwrap().page_view(), Some(&Tile(1)));
    }
}
