//! Channel-backed location provider for driving a RouteTracker in tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use catchlog_core::LocationError;
use parking_lot::Mutex;
use catchlog_tracking::{
    LocationProvider, LocationUpdate, PermissionStatus, RouteTracker, Subscription,
    TrackingSession, UpdateSink, WatchOptions,
};

pub const TIMEOUT: Duration = Duration::from_secs(2);

pub struct FakeProvider {
    permission: Mutex<Result<PermissionStatus, LocationError>>,
    watch_error: Option<LocationError>,
    position: Option<LocationUpdate>,
    sinks: Mutex<Vec<UpdateSink>>,
    permission_requests: AtomicUsize,
    last_options: Mutex<Option<WatchOptions>>,
}

impl FakeProvider {
    fn with_permission(permission: Result<PermissionStatus, LocationError>) -> Self {
        Self {
            permission: Mutex::new(permission),
            watch_error: None,
            position: None,
            sinks: Mutex::new(Vec::new()),
            permission_requests: AtomicUsize::new(0),
            last_options: Mutex::new(None),
        }
    }

    pub fn granted() -> Self {
        Self::with_permission(Ok(PermissionStatus::Granted))
    }

    pub fn denied() -> Self {
        Self::with_permission(Ok(PermissionStatus::Denied))
    }

    pub fn permission_error(err: LocationError) -> Self {
        Self::with_permission(Err(err))
    }

    /// Change the answer to later permission requests.
    pub fn set_permission(&self, permission: Result<PermissionStatus, LocationError>) {
        *self.permission.lock() = permission;
    }

    pub fn failing_watch(mut self, err: LocationError) -> Self {
        self.watch_error = Some(err);
        self
    }

    pub fn at_position(mut self, update: LocationUpdate) -> Self {
        self.position = Some(update);
        self
    }

    pub fn watch_count(&self) -> usize {
        self.sinks.lock().len()
    }

    pub fn permission_requests(&self) -> usize {
        self.permission_requests.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<WatchOptions> {
        self.last_options.lock().clone()
    }

    /// Sink of the `index`-th watch opened on this provider.
    pub fn sink(&self, index: usize) -> UpdateSink {
        self.sinks.lock()[index].clone()
    }

    pub fn latest_sink(&self) -> UpdateSink {
        self.sinks.lock().last().unwrap().clone()
    }

    /// Push an update through the most recent watch.
    pub async fn emit(&self, latitude: f64, longitude: f64, timestamp: i64) -> bool {
        let sink = self.latest_sink();
        sink.send(LocationUpdate::new(latitude, longitude, timestamp)).await
    }

    /// Simulate the platform ending the stream on its own.
    pub fn close_latest(&self) {
        self.sinks.lock().pop();
    }
}

#[async_trait]
impl LocationProvider for FakeProvider {
    async fn request_foreground_permission(&self) -> Result<PermissionStatus, LocationError> {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        self.permission.lock().clone()
    }

    async fn current_position(&self) -> Result<LocationUpdate, LocationError> {
        self.position
            .ok_or_else(|| LocationError::Unavailable("no fix".to_string()))
    }

    async fn watch_position(&self, options: &WatchOptions) -> Result<Subscription, LocationError> {
        if let Some(err) = &self.watch_error {
            return Err(err.clone());
        }
        *self.last_options.lock() = Some(options.clone());

        let (sink, subscription) = Subscription::channel(64);
        self.sinks.lock().push(sink);
        Ok(subscription)
    }
}

/// Wait until the tracker's route holds exactly `len` points.
pub async fn wait_for_route_len(tracker: &RouteTracker, len: usize) -> TrackingSession {
    let mut rx = tracker.subscribe();
    let session = tokio::time::timeout(TIMEOUT, rx.wait_for(|s| s.route.len() == len))
        .await
        .expect("timed out waiting for route")
        .expect("session channel closed")
        .clone();
    session
}

/// Wait until the tracker's state satisfies `pred`.
pub async fn wait_for_session<F>(tracker: &RouteTracker, pred: F) -> TrackingSession
where
    F: FnMut(&TrackingSession) -> bool,
{
    let mut rx = tracker.subscribe();
    let session = tokio::time::timeout(TIMEOUT, rx.wait_for(pred))
        .await
        .expect("timed out waiting for session")
        .expect("session channel closed")
        .clone();
    session
}
