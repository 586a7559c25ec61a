//! Mutation filtering and the debounced re-sweep slot.
//!
//! The host observer delivers batches of mutation records. Each record is
//! summarized into [`ChangeKind`] flags at the boundary, so the decision
//! logic here never sees host types and tests drive it directly.

use bitflags::bitflags;

/// Delay between the first significant batch and the re-sweep.
///
/// Long enough to coalesce the DOM churn of an SPA route transition,
/// short enough that content never flashes for a perceptible beat.
pub const DEBOUNCE_MS: u32 = 120;

bitflags! {
    /// Summary of one host mutation record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChangeKind: u8 {
        /// A watched attribute changed (see [`crate::rules::WATCHED_ATTRIBUTES`]).
        const ATTRIBUTE = 1 << 0;
        /// At least one inserted node was an element.
        const ADDED_ELEMENT = 1 << 1;
        /// Inserted nodes were text or comments only.
        const ADDED_TEXT = 1 << 2;
        /// Nodes were removed.
        const REMOVED = 1 << 3;
    }
}

/// Kinds that can create a new match. Removals cannot (markings leave the
/// tree with their element), and [`crate::rules::MARK_ATTR`] writes are
/// kept out of the observer's attribute filter, so ATTRIBUTE records never
/// echo our own writes.
const SIGNIFICANT: ChangeKind = ChangeKind::ATTRIBUTE.union(ChangeKind::ADDED_ELEMENT);

/// A batch warrants a re-sweep iff it contains at least one attribute
/// record or at least one added element node.
pub fn batch_is_significant<I>(batch: I) -> bool
where
    I: IntoIterator<Item = ChangeKind>,
{
    batch.into_iter().any(|kind| kind.intersects(SIGNIFICANT))
}

/// What to do with a delivered batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchDisposition {
    /// Nothing in the batch can affect matching.
    Ignored,
    /// A sweep is already pending; this batch folds into it.
    Coalesced,
    /// Schedule a full sweep after `delay_ms`.
    Schedule { delay_ms: u32 },
}

/// Owns the single pending-sweep slot.
///
/// The coordinator only decides; the host layer owns the actual timer and
/// must call [`SweepCoordinator::timer_fired`] from its callback before
/// running the sweep, so a batch arriving mid-sweep can schedule again.
#[derive(Debug)]
pub struct SweepCoordinator {
    delay_ms: u32,
    pending: bool,
}

impl SweepCoordinator {
    pub fn new() -> Self {
        Self::with_delay(DEBOUNCE_MS)
    }

    pub fn with_delay(delay_ms: u32) -> Self {
        Self {
            delay_ms,
            pending: false,
        }
    }

    /// Feed one observer batch and decide.
    pub fn on_batch<I>(&mut self, batch: I) -> BatchDisposition
    where
        I: IntoIterator<Item = ChangeKind>,
    {
        if !batch_is_significant(batch) {
            return BatchDisposition::Ignored;
        }
        if self.pending {
            return BatchDisposition::Coalesced;
        }
        self.pending = true;
        BatchDisposition::Schedule {
            delay_ms: self.delay_ms,
        }
    }

    /// The host timer fired; clears the slot. Returns false on a spurious
    /// callback with no sweep pending.
    pub fn timer_fired(&mut self) -> bool {
        let was_pending = self.pending;
        self.pending = false;
        was_pending
    }

    pub fn sweep_pending(&self) -> bool {
        self.pending
    }
}

impl Default for SweepCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_records_are_significant() {
        assert!(batch_is_significant([ChangeKind::ATTRIBUTE]));
        assert!(batch_is_significant([ChangeKind::REMOVED, ChangeKind::ATTRIBUTE]));
    }

    #[test]
    fn added_elements_are_significant() {
        assert!(batch_is_significant([ChangeKind::ADDED_ELEMENT]));
        assert!(batch_is_significant([
            ChangeKind::ADDED_TEXT,
            ChangeKind::ADDED_ELEMENT | ChangeKind::REMOVED,
        ]));
    }

    #[test]
    fn text_only_and_removal_only_batches_are_not() {
        assert!(!batch_is_significant([ChangeKind::ADDED_TEXT]));
        assert!(!batch_is_significant([ChangeKind::REMOVED]));
        assert!(!batch_is_significant([ChangeKind::ADDED_TEXT, ChangeKind::REMOVED]));
        assert!(!batch_is_significant([]));
    }

    #[test]
    fn first_significant_batch_schedules() {
        let mut coordinator = SweepCoordinator::new();
        assert_eq!(
            coordinator.on_batch([ChangeKind::ADDED_ELEMENT]),
            BatchDisposition::Schedule { delay_ms: DEBOUNCE_MS }
        );
        assert!(coordinator.sweep_pending());
    }

    #[test]
    fn batches_coalesce_while_a_sweep_is_pending() {
        let mut coordinator = SweepCoordinator::with_delay(100);

        let mut scheduled = 0;
        for _ in 0..5 {
            match coordinator.on_batch([ChangeKind::ATTRIBUTE]) {
                BatchDisposition::Schedule { .. } => scheduled += 1,
                BatchDisposition::Coalesced => {}
                BatchDisposition::Ignored => panic!("significant batch ignored"),
            }
        }
        assert_eq!(scheduled, 1);
    }

    #[test]
    fn timer_fire_reopens_the_slot() {
        let mut coordinator = SweepCoordinator::with_delay(100);

        assert!(matches!(
            coordinator.on_batch([ChangeKind::ADDED_ELEMENT]),
            BatchDisposition::Schedule { delay_ms: 100 }
        ));
        assert!(coordinator.timer_fired());
        assert!(!coordinator.sweep_pending());

        assert!(matches!(
            coordinator.on_batch([ChangeKind::ADDED_ELEMENT]),
            BatchDisposition::Schedule { .. }
        ));
    }

    #[test]
    fn insignificant_batches_never_occupy_the_slot() {
        let mut coordinator = SweepCoordinator::new();
        assert_eq!(
            coordinator.on_batch([ChangeKind::ADDED_TEXT]),
            BatchDisposition::Ignored
        );
        assert!(!coordinator.sweep_pending());
        assert!(!coordinator.timer_fired());
    }
}
