//! Coordinate math shared by route summaries and map previews.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Delta used to frame a route made of a single point (~550 m).
const SINGLE_POINT_DELTA: f64 = 0.005;
/// Extra margin around a route so it doesn't touch the map edge.
const REGION_PADDING_FACTOR: f64 = 1.05;
/// Smallest span a region may have (~11 m).
const MIN_REGION_SPAN: f64 = 0.0001;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in kilometers (haversine).
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// `"lat,lon"`, the query format weather and geocoding APIs expect.
    pub fn to_query(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Sum of the segment lengths along `points`, in kilometers.
pub fn path_length_km<I>(points: I) -> f64
where
    I: IntoIterator<Item = Coordinates>,
{
    let mut iter = points.into_iter();
    let Some(mut prev) = iter.next() else {
        return 0.0;
    };

    let mut total = 0.0;
    for point in iter {
        total += prev.distance_km(&point);
        prev = point;
    }
    total
}

/// Visible map area: a center and the span shown around it, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    /// Square region framing every point of a route, or `None` for an empty
    /// route.
    pub fn fit<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinates>,
    {
        let points: Vec<Coordinates> = points.into_iter().collect();

        match points.as_slice() {
            [] => None,
            [only] => Some(Self {
                latitude: only.latitude,
                longitude: only.longitude,
                latitude_delta: SINGLE_POINT_DELTA,
                longitude_delta: SINGLE_POINT_DELTA,
            }),
            _ => {
                let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
                let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
                for p in &points {
                    min_lat = min_lat.min(p.latitude);
                    max_lat = max_lat.max(p.latitude);
                    min_lon = min_lon.min(p.longitude);
                    max_lon = max_lon.max(p.longitude);
                }

                let lat_span = ((max_lat - min_lat) * REGION_PADDING_FACTOR).max(MIN_REGION_SPAN);
                let lon_span = ((max_lon - min_lon) * REGION_PADDING_FACTOR).max(MIN_REGION_SPAN);
                let span = lat_span.max(lon_span);

                Some(Self {
                    latitude: (min_lat + max_lat) / 2.0,
                    longitude: (min_lon + max_lon) / 2.0,
                    latitude_delta: span,
                    longitude_delta: span,
                })
            }
        }
    }
}
