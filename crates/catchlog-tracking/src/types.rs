use std::time::Duration;

use catchlog_core::{Coordinates, LocationAccuracy, TrackingConfig};
use serde::{Deserialize, Serialize};

/// One recorded position of a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl LocationPoint {
    pub fn new(latitude: f64, longitude: f64, timestamp: i64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Raw fix delivered by the platform location service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationUpdate {
    pub coords: Coordinates,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Horizontal accuracy radius in meters
    pub accuracy: Option<f64>,
    pub altitude: Option<f64>,
    /// Ground speed in m/s
    pub speed: Option<f64>,
    /// Course over ground in degrees from true north
    pub heading: Option<f64>,
}

impl LocationUpdate {
    pub fn new(latitude: f64, longitude: f64, timestamp: i64) -> Self {
        Self {
            coords: Coordinates::new(latitude, longitude),
            timestamp,
            accuracy: None,
            altitude: None,
            speed: None,
            heading: None,
        }
    }

    pub fn to_point(&self) -> LocationPoint {
        LocationPoint::new(self.coords.latitude, self.coords.longitude, self.timestamp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Sampling parameters handed to the platform. Updates closer together than
/// these limits are suppressed by the platform itself.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchOptions {
    pub accuracy: LocationAccuracy,
    pub min_interval: Duration,
    pub min_distance_m: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self::from(&TrackingConfig::default())
    }
}

impl From<&TrackingConfig> for WatchOptions {
    fn from(config: &TrackingConfig) -> Self {
        Self {
            accuracy: config.accuracy,
            min_interval: Duration::from_millis(config.min_interval_ms),
            min_distance_m: config.min_distance_m,
        }
    }
}

/// Lifecycle of a tracker. Every state can be re-entered; there is no
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    #[default]
    Idle,
    RequestingPermission,
    Tracking,
}

/// Snapshot of a tracking session as seen by consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingSession {
    pub state: TrackingState,
    pub route: Vec<LocationPoint>,
    pub last_known_location: Option<LocationPoint>,
    pub last_error: Option<String>,
}

impl TrackingSession {
    pub fn is_active(&self) -> bool {
        self.state == TrackingState::Tracking
    }

    /// Append an update in arrival order.
    pub(crate) fn record(&mut self, update: &LocationUpdate) {
        let point = update.to_point();
        if let Some(last) = self.route.last() {
            if point.timestamp < last.timestamp {
                tracing::warn!(
                    "Location update went back in time ({} < {})",
                    point.timestamp,
                    last.timestamp
                );
            }
        }
        self.last_known_location = Some(point);
        self.route.push(point);
    }
}
