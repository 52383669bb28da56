//! Request tickets and per-panel fetch state
//!
//! Every outbound API call is tagged with a `Ticket`. A panel remembers the
//! ticket (and the key it asked for) of its latest request and ignores any
//! completion carrying a different ticket, so the last selection always wins.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Process-unique, monotonically increasing request tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    /// Issue a fresh ticket
    pub fn next() -> Self {
        Ticket(NEXT_TICKET.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An in-flight request: the ticket it was issued under and the key it asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending<K> {
    pub ticket: Ticket,
    pub key: K,
}

impl<K: PartialEq> Pending<K> {
    pub fn new(key: K) -> Self {
        Self {
            ticket: Ticket::next(),
            key,
        }
    }

    /// Whether a completion with `ticket` answers this request
    pub fn answers(&self, ticket: Ticket) -> bool {
        self.ticket == ticket
    }
}

/// Result state owned by a panel
///
/// `Loaded` with an empty payload ("no data") and `Failed` ("fetch failed")
/// are distinct states and render differently.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Fetch<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Fetch<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Fetch::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Fetch::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Fetch::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tickets_are_increasing() {
        let a = Ticket::next();
        let b = Ticket::next();
        assert!(b > a);
        assert_ne!(a, b);
    }

    #[test]
    fn test_pending_answers_only_its_ticket() {
        let first = Pending::new("r1".to_string());
        let second = Pending::new("r1".to_string());
        assert!(first.answers(first.ticket));
        assert!(!first.answers(second.ticket));
    }

    #[test]
    fn test_fetch_accessors() {
        let loaded: Fetch<Vec<u8>> = Fetch::Loaded(vec![]);
        assert_eq!(loaded.loaded(), Some(&vec![]));
        assert!(loaded.error().is_none());

        let failed: Fetch<Vec<u8>> = Fetch::Failed("boom".to_string());
        assert_eq!(failed.error(), Some("boom"));
        assert!(failed.loaded().is_none());
        assert!(Fetch::<u8>::Loading.is_loading());
        assert_eq!(Fetch::<u8>::default(), Fetch::Idle);
    }
}
