//! Reverse geocoding: convert coordinates to human-readable place names.
//!
//! [`Geocoder`] is the seam: the mobile platform's geocoder implements it on
//! device, [`NominatimGeocoder`] (OpenStreetMap, no API key) everywhere else.

use std::time::Duration;

use async_trait::async_trait;
use catchlog_core::{Coordinates, WeatherConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::types::WeatherError;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("catchlog/", env!("CARGO_PKG_VERSION"));

/// One candidate address for a coordinate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceAddress {
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl PlaceAddress {
    /// `"City, Region"`. The place falls back to region then country; the
    /// suffix falls back to country and is dropped when it repeats the place.
    pub fn display_name(&self) -> Option<String> {
        let place = non_empty(&self.city)
            .or_else(|| non_empty(&self.region))
            .or_else(|| non_empty(&self.country))?;

        let suffix = non_empty(&self.region)
            .filter(|r| *r != place)
            .or_else(|| non_empty(&self.country).filter(|c| *c != place));

        Some(match suffix {
            Some(s) => format!("{}, {}", place, s),
            None => place.to_string(),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Candidate addresses for `coords`, best match first.
    async fn reverse_geocode(
        &self,
        coords: Coordinates,
    ) -> Result<Vec<PlaceAddress>, WeatherError>;
}

/// Resolve `coords` to a `"City, Region"` label. Returns `None` when the
/// geocoder fails or knows nothing about the place.
pub async fn reverse_geocode(geocoder: &dyn Geocoder, coords: Coordinates) -> Option<String> {
    let candidates = match geocoder.reverse_geocode(coords).await {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Reverse geocode failed: {}", e);
            return None;
        }
    };

    let name = candidates.iter().find_map(PlaceAddress::display_name);
    match &name {
        Some(n) => tracing::debug!("Reverse geocoded to: {}", n),
        None => tracing::debug!(
            "No place name for {} ({} candidates)",
            coords.to_query(),
            candidates.len()
        ),
    }
    name
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state: Option<String>,
    state_district: Option<String>,
    county: Option<String>,
    country: Option<String>,
}

impl From<NominatimAddress> for PlaceAddress {
    fn from(addr: NominatimAddress) -> Self {
        Self {
            city: addr
                .city
                .or(addr.town)
                .or(addr.village)
                .or(addr.municipality),
            region: addr.state.or(addr.state_district).or(addr.county),
            country: addr.country,
        }
    }
}

/// Geocoder backed by the Nominatim `/reverse` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    url: String,
}

impl NominatimGeocoder {
    /// # Errors
    /// Fails if the HTTP client cannot be built.
    pub fn new() -> Result<Self, WeatherError> {
        Self::with_url(NOMINATIM_URL)
    }

    /// # Errors
    /// Fails if the HTTP client cannot be built.
    pub fn with_url(url: &str) -> Result<Self, WeatherError> {
        Self::build(url, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    /// # Errors
    /// Fails if the HTTP client cannot be built.
    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let timeout =
            Duration::from_secs(config.request_timeout_secs.unwrap_or(REQUEST_TIMEOUT_SECS));
        Self::build(&config.geocoder_url, timeout)
    }

    fn build(url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn reverse_geocode(
        &self,
        coords: Coordinates,
    ) -> Result<Vec<PlaceAddress>, WeatherError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
                ("layer", "address".to_string()),
                ("zoom", "10".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::Geocode(format!(
                "Nominatim returned status {}",
                response.status()
            )));
        }

        let body: NominatimResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::MalformedResponse(e.to_string()))?;

        Ok(body.address.map(PlaceAddress::from).into_iter().collect())
    }
}
