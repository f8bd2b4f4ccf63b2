//! Platform location service seam.

use async_trait::async_trait;
use catchlog_core::LocationError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::types::{LocationPoint, LocationUpdate, PermissionStatus, WatchOptions};

/// Host platform location API.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Ask for location access while the app is in the foreground.
    async fn request_foreground_permission(&self) -> Result<PermissionStatus, LocationError>;

    /// One-shot position fix.
    async fn current_position(&self) -> Result<LocationUpdate, LocationError>;

    /// Start continuous updates. Updates flow until the returned
    /// [`Subscription`] is removed or dropped.
    async fn watch_position(&self, options: &WatchOptions) -> Result<Subscription, LocationError>;
}

/// Receiving end of a position watch. Dropping it removes the watch.
#[derive(Debug)]
pub struct Subscription {
    updates: mpsc::Receiver<LocationUpdate>,
    token: CancellationToken,
}

/// Producing end of a position watch, kept by the provider.
#[derive(Debug, Clone)]
pub struct UpdateSink {
    tx: mpsc::Sender<LocationUpdate>,
    token: CancellationToken,
}

impl Subscription {
    /// Create a connected sink/subscription pair buffering up to `buffer`
    /// undelivered updates (at least one).
    pub fn channel(buffer: usize) -> (UpdateSink, Subscription) {
        let (tx, updates) = mpsc::channel(buffer.max(1));
        let token = CancellationToken::new();
        (
            UpdateSink {
                tx,
                token: token.clone(),
            },
            Subscription { updates, token },
        )
    }

    /// Next update, or `None` once the provider stops producing.
    pub async fn next(&mut self) -> Option<LocationUpdate> {
        self.updates.recv().await
    }

    /// Stop accepting updates and return the ones already delivered but not
    /// yet read, oldest first.
    pub fn drain(&mut self) -> Vec<LocationUpdate> {
        self.updates.close();
        let mut pending = Vec::new();
        while let Ok(update) = self.updates.try_recv() {
            pending.push(update);
        }
        pending
    }

    /// Token cancelled when the subscription is removed.
    pub fn cancel_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_removed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stop the watch. Equivalent to dropping the subscription.
    pub fn remove(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl UpdateSink {
    /// Deliver an update. Returns `false` if the subscription is gone.
    pub async fn send(&self, update: LocationUpdate) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.tx.send(update).await.is_ok()
    }

    pub fn is_removed(&self) -> bool {
        self.token.is_cancelled() || self.tx.is_closed()
    }

    /// Resolves once the subscriber removed the watch.
    pub async fn removed(&self) {
        self.token.cancelled().await;
    }
}

/// Request permission, then take a single position fix.
///
/// # Errors
/// [`LocationError::PermissionDenied`] when access is refused, or whatever the
/// provider reports for the fix itself.
pub async fn current_location(
    provider: &dyn LocationProvider,
) -> Result<LocationPoint, LocationError> {
    match provider.request_foreground_permission().await? {
        PermissionStatus::Granted => {}
        PermissionStatus::Denied => return Err(LocationError::PermissionDenied),
    }

    let update = provider.current_position().await?;
    Ok(update.to_point())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drop_removes_watch() {
        let (sink, subscription) = Subscription::channel(4);
        assert!(!sink.is_removed());
        drop(subscription);
        assert!(sink.is_removed());
        assert!(!sink.send(LocationUpdate::new(0.0, 0.0, 0)).await);
    }

    #[tokio::test]
    async fn test_updates_flow_in_order() {
        let (sink, mut subscription) = Subscription::channel(4);
        assert!(sink.send(LocationUpdate::new(1.0, 1.0, 1)).await);
        assert!(sink.send(LocationUpdate::new(2.0, 2.0, 2)).await);
        drop(sink);

        assert_eq!(subscription.next().await.map(|u| u.timestamp), Some(1));
        assert_eq!(subscription.next().await.map(|u| u.timestamp), Some(2));
        assert_eq!(subscription.next().await, None);
    }

    #[tokio::test]
    async fn test_drain_returns_buffered_updates() {
        let (sink, mut subscription) = Subscription::channel(8);
        for ts in 1..=3 {
            assert!(sink.send(LocationUpdate::new(0.0, 0.0, ts)).await);
        }
        subscription.cancel_token().cancel();

        let pending: Vec<i64> = subscription.drain().iter().map(|u| u.timestamp).collect();
        assert_eq!(pending, vec![1, 2, 3]);
        assert!(sink.is_removed());
        assert!(!sink.send(LocationUpdate::new(0.0, 0.0, 4)).await);
        assert!(subscription.drain().is_empty());
    }

    #[tokio::test]
    async fn test_zero_buffer_still_delivers() {
        let (sink, mut subscription) = Subscription::channel(0);
        assert!(sink.send(LocationUpdate::new(1.0, 2.0, 3)).await);
        assert_eq!(subscription.next().await.map(|u| u.timestamp), Some(3));
    }

    #[tokio::test]
    async fn test_remove_cancels_token() {
        let (sink, subscription) = Subscription::channel(1);
        let token = subscription.cancel_token();
        subscription.remove();
        assert!(token.is_cancelled());
        sink.removed().await;
    }
}
