//! Cooperative cancellation for in-flight `analyze()` calls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheap, cloneable cancellation flag checked at pipeline boundaries.
///
/// Deliberately not `tokio_util::sync::CancellationToken`: the orchestrator
/// only needs a single "has this been cancelled" check, not task trees or
/// child tokens, so a bare `AtomicBool` avoids pulling in `tokio-util`.
#[derive(Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_uncancelled() {
        assert!(!Cancellation::new().is_cancelled());
    }

    #[test]
    fn test_cancel_is_visible_through_clone() {
        let token = Cancellation::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
