use std::time::Duration;

use catchlog_core::format::{format_duration_minutes, format_elapsed};
use catchlog_core::geo::path_length_km;
use catchlog_core::MapRegion;
use serde::Serialize;

use crate::types::LocationPoint;

/// Aggregate figures for a recorded route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub point_count: usize,
    pub distance_km: f64,
    /// Time between the first and last point
    pub elapsed: Duration,
    /// Map area framing the whole route
    pub region: Option<MapRegion>,
}

impl RouteSummary {
    pub fn from_route(route: &[LocationPoint]) -> Self {
        let elapsed_ms = match (route.first(), route.last()) {
            (Some(first), Some(last)) => last.timestamp.saturating_sub(first.timestamp).max(0),
            _ => 0,
        };

        Self {
            point_count: route.len(),
            distance_km: path_length_km(route.iter().map(LocationPoint::coordinates)),
            elapsed: Duration::from_millis(elapsed_ms.unsigned_abs()),
            region: MapRegion::fit(route.iter().map(LocationPoint::coordinates)),
        }
    }

    /// Elapsed time as `HH:MM:SS`.
    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed.as_secs())
    }

    /// Session length rounded down to the minute, e.g. `"1h 15min"`.
    pub fn duration_display(&self) -> Option<String> {
        let minutes = i64::try_from(self.elapsed.as_secs() / 60).ok()?;
        format_duration_minutes(minutes)
    }
}
