//! Cooperative cancellation for C7 (spec §5: "Search honors a cooperative
//! cancellation token; cancellation between retrieval and fusion surfaces
//! the partial-result policy as 'fail with SearchError(cancelled)'").
//! A single shared flag is enough here — the engine only checks it at one
//! well-defined boundary, unlike `tokio_util`'s tree-shaped tokens meant for
//! cascading cancellation across many tasks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
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
    fn fresh_token_is_not_cancelled() {
        assert!(!CancellationToken::new().is_cancelled());
    }

    #[test]
    fn cancel_is_observed_through_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
