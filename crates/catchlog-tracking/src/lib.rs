//! GPS route tracking for fishing sessions.
//!
//! A [`RouteTracker`] owns one tracking lifecycle: it asks the platform for
//! location permission, holds the position subscription while tracking, and
//! accumulates every update into an ordered route.

pub mod provider;
pub mod summary;
pub mod tracker;
pub mod types;

pub use provider::{current_location, LocationProvider, Subscription, UpdateSink};
pub use summary::RouteSummary;
pub use tracker::RouteTracker;
pub use types::*;
