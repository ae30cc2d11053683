//! Keeps only the most recently requested result.
//!
//! Overlapping fetches are not cancelled. Each one takes a [`Ticket`] when
//! it starts, and its result is accepted only if no newer ticket has been
//! issued since.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct LatestOnly {
    latest: AtomicU64,
}

impl LatestOnly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, superseding every earlier ticket.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Returns `value` if `ticket` is still the latest, drops it otherwise.
    pub fn accept<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        if self.is_latest(ticket) {
            Some(value)
        } else {
            tracing::debug!(ticket = ticket.0, "Discarding stale result");
            None
        }
    }
}
