// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bookkeeping for animated page turns.

use crate::VirtualIndex;

/// Identifies one animated page turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(u64);

impl TransitionId {
    /// Raw generation number. Later transitions have larger values.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// An animated page turn that has been started but not completed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingTransition {
    /// Identifier handed to the animator.
    pub id: TransitionId,
    /// Virtual index the turn is heading to.
    pub target_index: VirtualIndex,
    /// Offset the viewport started from.
    pub from_offset: f64,
    /// Offset the viewport will rest at.
    pub target_offset: f64,
}

/// At most one in-flight transition; starting a new one supersedes the old.
#[derive(Debug, Default)]
pub(crate) struct Transitions {
    generation: u64,
    pending: Option<PendingTransition>,
}

impl Transitions {
    /// Starts a transition and returns it with whichever one it superseded.
    pub(crate) fn begin(
        &mut self,
        target_index: VirtualIndex,
        from_offset: f64,
        target_offset: f64,
    ) -> (PendingTransition, Option<PendingTransition>) {
        self.generation += 1;
        let next = PendingTransition {
            id: TransitionId(self.generation),
            target_index,
            from_offset,
            target_offset,
        };
        (next, self.pending.replace(next))
    }

    pub(crate) fn pending(&self) -> Option<PendingTransition> {
        self.pending
    }

    /// Returns the pending transition if `id` is still the current one.
    pub(crate) fn current(&self, id: TransitionId) -> Option<PendingTransition> {
        self.pending.filter(|pending| pending.id == id)
    }

    /// Forgets the pending transition, returning it.
    pub(crate) fn clear(&mut self) -> Option<PendingTransition> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::Transitions;

    #[test]
    fn newer_transition_supersedes_older() {
        let mut transitions = Transitions::default();
        let (first, superseded) = transitions.begin(2, 0.0, 720.0);
        assert!(superseded.is_none());

        let (second, superseded) = transitions.begin(3, 400.0, 1080.0);
        assert_eq!(superseded, Some(first));
        assert!(second.id > first.id);
        assert!(transitions.current(first.id).is_none());
        assert_eq!(transitions.current(second.id), Some(second));

        assert_eq!(transitions.clear(), Some(second));
        assert!(transitions.pending().is_none());
    }
}
