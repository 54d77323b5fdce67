//! Latest-only fetch tracking.
//!
//! A view that starts a fetch takes a [`Ticket`]; when the response arrives
//! it is applied only if no newer fetch was started and the view was not
//! abandoned in the meantime.

use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome of a fetch guarded by [`LatestOnly`].
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    /// The result belongs to the most recent fetch.
    Current(T),
    /// A newer fetch or a navigation superseded this one; drop the result.
    Superseded,
}

impl<T> Fetched<T> {
    /// The result, if it is still current.
    pub fn into_current(self) -> Option<T> {
        match self {
            Fetched::Current(value) => Some(value),
            Fetched::Superseded => None,
        }
    }

    /// Whether the result was superseded.
    pub fn is_superseded(&self) -> bool {
        matches!(self, Fetched::Superseded)
    }
}

/// Generation marker handed out by [`LatestOnly::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Monotonic generation counter.
#[derive(Debug, Default)]
pub struct LatestOnly {
    generation: AtomicU64,
}

impl LatestOnly {
    /// Create a new tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch, superseding any fetch still in flight.
    pub fn begin(&self) -> Ticket {
        Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` belongs to the most recent fetch.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Supersede every in-flight fetch without starting a new one.
    pub fn abandon(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Wrap `value` according to whether `ticket` is still current.
    pub fn settle<T>(&self, ticket: Ticket, value: T) -> Fetched<T> {
        if self.is_current(ticket) {
            Fetched::Current(value)
        } else {
            Fetched::Superseded
        }
    }
}
