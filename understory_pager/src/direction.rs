// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout direction along the paging axis.

/// The order in which pages are laid out along the paging axis.
///
/// Changing the direction redefines where every virtual index lives, so
/// [`crate::Pager`] only applies a new direction on the next reload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PageDirection {
    /// Pages ascend from the left edge towards the right.
    #[default]
    LeftToRight,
    /// Pages ascend from the right edge towards the left.
    ///
    /// Index `0` (or the header) sits at the high end of the content extent.
    RightToLeft,
}

impl PageDirection {
    /// Returns `true` if ascending indices move towards lower offsets.
    #[must_use]
    pub const fn is_mirrored(self) -> bool {
        matches!(self, Self::RightToLeft)
    }

    /// Maps a slot given in ascending (left-to-right) coordinates onto the
    /// physical paging axis.
    ///
    /// `start` and `extent` describe the slot as if pages ascended from the
    /// left; `content_extent` is the length of the whole strip.
    #[must_use]
    pub fn place(self, start: f64, extent: f64, content_extent: f64) -> f64 {
        let (origin, sign, lead) = self.frame(content_extent);
        origin + sign * (start + lead * extent)
    }

    /// The point of a slot that the scroll offset refers to, in ascending
    /// coordinates.
    ///
    /// This is the slot start for [`PageDirection::LeftToRight`] and the slot
    /// end for [`PageDirection::RightToLeft`], so that the physical offset of
    /// a slot always lines up with the viewport's leading edge.
    #[must_use]
    pub fn anchor(self, start: f64, extent: f64) -> f64 {
        let (_, _, lead) = self.frame(0.0);
        start + lead * extent
    }

    /// Converts a physical scroll offset into the ascending coordinate space
    /// used by [`PageDirection::anchor`].
    #[must_use]
    pub fn unplace(self, offset: f64, content_extent: f64) -> f64 {
        let (origin, sign, _) = self.frame(content_extent);
        (offset - origin) * sign
    }

    /// `(origin, sign, lead)`: physical = origin + sign * (start + lead * extent).
    fn frame(self, content_extent: f64) -> (f64, f64, f64) {
        if self.is_mirrored() {
            (content_extent, -1.0, 1.0)
        } else {
            (0.0, 1.0, 0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PageDirection;

    #[test]
    fn left_to_right_is_identity() {
        let dir = PageDirection::LeftToRight;
        assert!(!dir.is_mirrored());
        assert_eq!(dir.place(360.0, 320.0, 1000.0), 360.0);
        assert_eq!(dir.anchor(360.0, 320.0), 360.0);
        assert_eq!(dir.unplace(360.0, 1000.0), 360.0);
    }

    #[test]
    fn right_to_left_mirrors_slot() {
        let dir = PageDirection::RightToLeft;
        assert!(dir.is_mirrored());
        // Slot [360, 680) in a 1000-long strip lands at [320, 640).
        assert_eq!(dir.place(360.0, 320.0, 1000.0), 320.0);
        // The anchor is the slot end, and unplacing the physical offset finds it.
        assert_eq!(dir.anchor(360.0, 320.0), 680.0);
        assert_eq!(dir.unplace(320.0, 1000.0), 680.0);
    }
}
