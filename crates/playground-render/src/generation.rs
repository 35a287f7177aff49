//! Render generations
//!
//! Library loads are asynchronous, so a render pass can finish after the user
//! has already switched artifacts. Each pass carries a [`RenderTicket`]; a
//! pass whose ticket is no longer current must discard its result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared, monotonically increasing generation counter
#[derive(Debug, Clone, Default)]
pub struct Generation {
    current: Arc<AtomicU64>,
}

impl Generation {
    /// Create counter at generation zero
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, invalidating every outstanding ticket
    pub fn advance(&self) -> RenderTicket {
        let value = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        RenderTicket {
            current: Arc::clone(&self.current),
            value,
        }
    }

    /// Ticket for the current generation
    #[must_use]
    pub fn ticket(&self) -> RenderTicket {
        RenderTicket {
            current: Arc::clone(&self.current),
            value: self.current.load(Ordering::SeqCst),
        }
    }

    /// Current generation number
    #[inline]
    #[must_use]
    pub fn value(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

/// Proof that a render pass belongs to a given generation
#[derive(Debug, Clone)]
pub struct RenderTicket {
    current: Arc<AtomicU64>,
    value: u64,
}

impl RenderTicket {
    /// Whether no newer generation has started
    #[inline]
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.value
    }

    /// Generation this ticket was issued for
    #[inline]
    #[must_use]
    pub fn value(&self) -> u64 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_invalidates_older_tickets() {
        let generation = Generation::new();
        let first = generation.advance();
        assert!(first.is_current());

        let second = generation.advance();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(second.value(), 2);
    }

    #[test]
    fn clones_share_the_counter() {
        let generation = Generation::new();
        let ticket = generation.ticket();
        generation.clone().advance();
        assert!(!ticket.is_current());
        assert_eq!(generation.value(), 1);
    }
}
