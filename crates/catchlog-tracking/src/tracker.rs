//! Route tracking state machine.
//!
//! ```text
//!            start()                 granted
//!   Idle ───────────────► RequestingPermission ──────────► Tracking
//!    ▲                          │ denied / watch failed        │
//!    └──────────────────────────┴──────────────────────────────┘
//!                                         stop() / pause() / stream ended
//! ```
//!
//! The session snapshot lives in a `watch` channel. Only the tracker and its
//! pump task write to it; consumers read via [`RouteTracker::subscribe`].

use std::sync::Arc;

use catchlog_core::LocationError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::provider::{LocationProvider, Subscription};
use crate::summary::RouteSummary;
use crate::types::{LocationPoint, PermissionStatus, TrackingSession, TrackingState, WatchOptions};

/// Running subscription: the pump task and the token that stops both the
/// task and the platform watch. Updates already buffered when the token
/// fires are still recorded.
struct Pump {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns one tracking lifecycle. Dropping the tracker removes any active
/// position watch.
pub struct RouteTracker {
    provider: Arc<dyn LocationProvider>,
    options: WatchOptions,
    session: Arc<watch::Sender<TrackingSession>>,
    pump: Option<Pump>,
}

impl RouteTracker {
    pub fn new(provider: Arc<dyn LocationProvider>, options: WatchOptions) -> Self {
        let (session, _) = watch::channel(TrackingSession::default());
        Self {
            provider,
            options,
            session: Arc::new(session),
            pump: None,
        }
    }

    /// Current session snapshot.
    pub fn session(&self) -> TrackingSession {
        self.session.borrow().clone()
    }

    /// Receiver notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<TrackingSession> {
        self.session.subscribe()
    }

    pub fn state(&self) -> TrackingState {
        self.session.borrow().state
    }

    pub fn is_tracking(&self) -> bool {
        self.state() == TrackingState::Tracking
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    pub fn summary(&self) -> RouteSummary {
        RouteSummary::from_route(&self.session.borrow().route)
    }

    /// Start recording, continuing from `initial_route`.
    ///
    /// An active watch is torn down first. If permission is refused or the
    /// watch can't be opened, the session goes back to idle with
    /// `last_error` set and the route untouched.
    pub async fn start(&mut self, initial_route: Vec<LocationPoint>) -> TrackingState {
        self.teardown().await;

        self.session.send_modify(|s| {
            s.state = TrackingState::RequestingPermission;
            s.last_error = None;
        });

        match self.provider.request_foreground_permission().await {
            Ok(PermissionStatus::Granted) => {}
            Ok(PermissionStatus::Denied) => return self.fail(LocationError::PermissionDenied),
            Err(e) => return self.fail(e),
        }

        let subscription = match self.provider.watch_position(&self.options).await {
            Ok(s) => s,
            Err(e) => return self.fail(e),
        };

        let resumed = initial_route.len();
        self.session.send_modify(|s| {
            s.route = initial_route;
            s.state = TrackingState::Tracking;
        });

        let cancel = subscription.cancel_token();
        let handle = tokio::spawn(pump(
            subscription,
            Arc::clone(&self.session),
            cancel.clone(),
        ));
        self.pump = Some(Pump { cancel, handle });

        tracing::info!(
            "Location tracking started ({} points carried over, {:?} / {} m)",
            resumed,
            self.options.min_interval,
            self.options.min_distance_m
        );
        TrackingState::Tracking
    }

    /// Resume recording on top of the current route, e.g. after [`pause`](Self::pause).
    pub async fn resume(&mut self) -> TrackingState {
        let route = self.session.borrow().route.clone();
        self.start(route).await
    }

    /// End the session: remove the watch and clear the route. The finished
    /// route is handed back so the caller can persist it.
    pub async fn stop(&mut self) -> Vec<LocationPoint> {
        self.teardown().await;

        let mut finished = Vec::new();
        self.session.send_modify(|s| {
            s.state = TrackingState::Idle;
            finished = std::mem::take(&mut s.route);
        });

        tracing::info!("Location tracking stopped ({} points)", finished.len());
        finished
    }

    /// Remove the watch but keep the recorded route.
    pub async fn pause(&mut self) {
        self.teardown().await;
        self.session.send_modify(|s| s.state = TrackingState::Idle);
        tracing::info!("Location tracking paused");
    }

    /// Forget the route, last known location and last error.
    pub async fn reset(&mut self) {
        self.teardown().await;
        self.session.send_replace(TrackingSession::default());
    }

    /// Release the tracker. Same as dropping it.
    pub fn dispose(self) {}

    async fn teardown(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.cancel.cancel();
            if let Err(e) = pump.handle.await {
                tracing::warn!("Location pump ended abnormally: {}", e);
            }
        }
    }

    fn fail(&self, err: LocationError) -> TrackingState {
        tracing::warn!("Location tracking not started: {}", err);
        self.session.send_modify(|s| {
            s.state = TrackingState::Idle;
            s.last_error = Some(err.to_string());
        });
        TrackingState::Idle
    }
}

impl Drop for RouteTracker {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.cancel.cancel();
            pump.handle.abort();
        }
    }
}

async fn pump(
    mut subscription: Subscription,
    session: Arc<watch::Sender<TrackingSession>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let pending = subscription.drain();
                if !pending.is_empty() {
                    tracing::debug!(
                        "Recording {} buffered updates before teardown",
                        pending.len()
                    );
                    session.send_modify(|s| pending.iter().for_each(|u| s.record(u)));
                }
                break;
            }
            update = subscription.next() => match update {
                Some(update) => session.send_modify(|s| s.record(&update)),
                None => {
                    let err = LocationError::Unavailable("location updates stopped".to_string());
                    tracing::warn!("{}", err);
                    session.send_modify(|s| {
                        s.state = TrackingState::Idle;
                        s.last_error = Some(err.to_string());
                    });
                    break;
                }
            },
        }
    }
}
