use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one recommendation search
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchToken(u64);

impl std::fmt::Display for SearchToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out monotonically increasing search tokens
///
/// Starting a search makes every earlier token stale. In-flight work of a
/// stale search is not cancelled; its result is discarded on arrival.
#[derive(Debug, Default)]
pub struct SearchTracker {
    latest: AtomicU64,
}

impl SearchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> SearchToken {
        SearchToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: SearchToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}
