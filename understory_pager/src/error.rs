// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by the pager and by page views.

use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;
use core::ops::RangeInclusive;

use crate::VirtualIndex;

/// Failure reported by [`crate::PageView::prepare_for_reuse`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReuseError {
    /// Human-readable reason.
    pub reason: Cow<'static, str>,
}

impl ReuseError {
    /// Creates an error with the given reason.
    #[must_use]
    pub fn new(reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ReuseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl core::error::Error for ReuseError {}

/// Broad category of a [`PagerError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A collaborator, factory, or pooled view needed by the operation is missing.
    Configuration,
    /// A requested index lies outside the valid virtual index range.
    Range,
    /// The pager was re-entered from inside a collaborator callback.
    State,
}

/// Errors returned by [`crate::Pager`] operations.
///
/// A rejected operation leaves the pager's slots, reuse pool, and scroll
/// offset exactly as they were.
#[derive(Clone, Debug, PartialEq)]
pub enum PagerError {
    /// No data source is bound, or the bound data source has been dropped.
    MissingDataSource,
    /// The reuse pool is empty for `identifier` and no factory is registered for it.
    NoPageFactory {
        /// Identifier that was requested.
        identifier: String,
    },
    /// A page turn targeted an index outside the valid range.
    IndexOutOfRange {
        /// Requested virtual index.
        index: VirtualIndex,
        /// Valid virtual indices, or `None` if there are no slots at all.
        valid: Option<RangeInclusive<VirtualIndex>>,
    },
    /// A collaborator was already borrowed, meaning the pager was called back
    /// into from one of its own callbacks.
    Reentrant,
    /// A dequeued view failed to prepare for reuse and was dropped.
    PrepareForReuse {
        /// Identifier of the pool the view came from.
        identifier: String,
        /// Reason reported by the view.
        source: ReuseError,
    },
}

impl PagerError {
    /// Returns the broad category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingDataSource | Self::NoPageFactory { .. } | Self::PrepareForReuse { .. } => {
                ErrorKind::Configuration
            }
            Self::IndexOutOfRange { .. } => ErrorKind::Range,
            Self::Reentrant => ErrorKind::State,
        }
    }
}

impl fmt::Display for PagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDataSource => f.write_str("no data source is bound to the pager"),
            Self::NoPageFactory { identifier } => write!(
                f,
                "no reusable page view and no registered factory for identifier {identifier:?}"
            ),
            Self::IndexOutOfRange {
                index,
                valid: Some(valid),
            } => write!(
                f,
                "virtual index {index} is outside {}..={}",
                valid.start(),
                valid.end()
            ),
            Self::IndexOutOfRange { index, valid: None } => {
                write!(f, "virtual index {index} requested but the pager has no slots")
            }
            Self::Reentrant => f.write_str("pager re-entered from a collaborator callback"),
            Self::PrepareForReuse { identifier, source } => write!(
                f,
                "page view from pool {identifier:?} failed to prepare for reuse: {source}"
            ),
        }
    }
}

impl core::error::Error for PagerError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::PrepareForReuse { source, .. } => Some(source),
            _ => None,
        }
    }
}
