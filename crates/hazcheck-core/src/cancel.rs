//! Cooperative cancellation
//!
//! Long-running OCR and inference calls accept a `CancelToken` bound to the
//! caller's lifetime. Cancellation is checked between pages and raced
//! against the model call; it is never merely informational.

use crate::error::{HazCheckError, Result};
use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable cancellation token.
///
/// Any clone may cancel; all clones observe it.
#[derive(Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        // send_replace updates the value even with no live receivers
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Error out if cancellation was requested. Call between units of work.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(HazCheckError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolve once cancellation is requested; suitable for `select!`.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Sender gone without cancelling; never resolves.
                futures::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fresh_token_not_cancelled() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert!(token.check().is_ok());
    }

    #[test]
    fn test_cancel_visible_through_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(HazCheckError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancelled_future_resolves() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("resolved")
            .expect("joined");
    }
}
