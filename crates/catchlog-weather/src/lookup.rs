//! weatherapi.com client.
//!
//! The `get_*` methods are what the app calls: any failure is logged and
//! turned into `None` so a session simply goes without a weather annotation.
//! The `try_*` variants expose the underlying error. Nothing here retries.

use std::time::Duration;

use catchlog_core::{Coordinates, WeatherConfig};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::aggregate::{summarize_day, DEFAULT_REPRESENTATIVE_HOUR};
use crate::types::{
    ApiCurrentResponse, ApiErrorEnvelope, ApiHistoryResponse, WeatherError, WeatherReading,
};

const WEATHER_API_BASE: &str = "http://api.weatherapi.com/v1";

#[derive(Debug, Clone)]
pub struct WeatherLookup {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    language: Option<String>,
    representative_hour: usize,
}

impl WeatherLookup {
    /// Lookup against the public API with the transport's default timeout.
    ///
    /// # Errors
    /// Fails if the HTTP client cannot be built.
    pub fn new(api_key: Option<String>) -> Result<Self, WeatherError> {
        Ok(Self {
            client: Client::builder().build()?,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: WEATHER_API_BASE.to_string(),
            language: None,
            representative_hour: DEFAULT_REPRESENTATIVE_HOUR,
        })
    }

    /// # Errors
    /// Fails if the HTTP client cannot be built.
    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            api_key: config.api_key().ok().map(str::to_string),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            representative_hour: config.representative_hour,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_representative_hour(mut self, hour: usize) -> Self {
        self.representative_hour = hour;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Live conditions at a coordinate, or `None` when unavailable.
    pub async fn get_current(&self, latitude: f64, longitude: f64) -> Option<WeatherReading> {
        self.try_current(latitude, longitude)
            .await
            .map_err(|e| log_failure("current", &e))
            .ok()
    }

    /// Conditions for the UTC calendar day containing `date`, or `None` when
    /// unavailable. The time of day is ignored.
    pub async fn get_historical(
        &self,
        latitude: f64,
        longitude: f64,
        date: DateTime<Utc>,
    ) -> Option<WeatherReading> {
        self.try_historical(latitude, longitude, date.date_naive())
            .await
            .map_err(|e| log_failure("historical", &e))
            .ok()
    }

    /// [`get_historical`](Self::get_historical) for a route point timestamp
    /// in milliseconds since the epoch.
    pub async fn get_historical_at(
        &self,
        latitude: f64,
        longitude: f64,
        timestamp_ms: i64,
    ) -> Option<WeatherReading> {
        match DateTime::from_timestamp_millis(timestamp_ms) {
            Some(date) => self.get_historical(latitude, longitude, date).await,
            None => {
                log_failure("historical", &WeatherError::InvalidTimestamp(timestamp_ms));
                None
            }
        }
    }

    /// # Errors
    /// Missing key, transport failure, non-success status or unexpected payload.
    #[instrument(skip(self), level = "debug")]
    pub async fn try_current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherReading, WeatherError> {
        let query = Coordinates::new(latitude, longitude).to_query();
        let response = self.request("current.json", &query, None).await?;
        let body: ApiCurrentResponse = parse_body(response).await?;
        Ok(body.current.into())
    }

    /// # Errors
    /// Missing key, transport failure, non-success status, or a payload
    /// without hourly data for the day.
    #[instrument(skip(self), level = "debug")]
    pub async fn try_historical(
        &self,
        latitude: f64,
        longitude: f64,
        day: NaiveDate,
    ) -> Result<WeatherReading, WeatherError> {
        let query = Coordinates::new(latitude, longitude).to_query();
        let response = self.request("history.json", &query, Some(day)).await?;
        let body: ApiHistoryResponse = parse_body(response).await?;

        let day_data = body
            .forecast
            .and_then(|f| f.forecastday.into_iter().next())
            .ok_or_else(|| WeatherError::MalformedResponse("missing forecast day".to_string()))?;

        let hours: Vec<WeatherReading> = day_data.hour.into_iter().map(Into::into).collect();
        tracing::debug!("Averaging {} hourly samples for {}", hours.len(), day);

        summarize_day(&hours, self.representative_hour)
            .ok_or_else(|| WeatherError::MalformedResponse("no hourly samples".to_string()))
    }

    async fn request(
        &self,
        endpoint: &str,
        query: &str,
        day: Option<NaiveDate>,
    ) -> Result<Response, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;
        let url = format!("{}/{}", self.base_url, endpoint);

        let mut params: Vec<(&str, String)> =
            vec![("key", api_key.to_string()), ("q", query.to_string())];
        if let Some(day) = day {
            params.push(("dt", day.format("%Y-%m-%d").to_string()));
        }
        if let Some(lang) = &self.language {
            params.push(("lang", lang.clone()));
        }

        let response = self.client.get(&url).query(&params).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        Err(match serde_json::from_str::<ApiErrorEnvelope>(&text) {
            Ok(envelope) => WeatherError::Api {
                status: status.as_u16(),
                code: envelope.error.code,
                message: envelope.error.message,
            },
            Err(_) => WeatherError::Api {
                status: status.as_u16(),
                code: None,
                message: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            },
        })
    }
}

async fn parse_body<T: DeserializeOwned>(response: Response) -> Result<T, WeatherError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| WeatherError::MalformedResponse(e.to_string()))
}

fn log_failure(what: &str, err: &WeatherError) {
    match err {
        WeatherError::MissingApiKey => {
            tracing::error!("Skipping {} weather lookup: {}", what, err)
        }
        _ => tracing::warn!("{} weather lookup failed: {}", what, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_unconfigured() {
        let lookup = WeatherLookup::new(Some("  ".to_string())).unwrap();
        assert!(!lookup.is_configured());
    }

    #[test]
    fn test_from_config() {
        let config = WeatherConfig {
            api_key: Some("secret".to_string()),
            base_url: "http://localhost:9999/v1/".to_string(),
            representative_hour: 6,
            request_timeout_secs: Some(5),
            ..WeatherConfig::default()
        };
        let lookup = WeatherLookup::from_config(&config).unwrap();
        assert!(lookup.is_configured());
        assert_eq!(lookup.base_url, "http://localhost:9999/v1");
        assert_eq!(lookup.language.as_deref(), Some("fr"));
        assert_eq!(lookup.representative_hour, 6);
    }

    #[tokio::test]
    async fn test_missing_key_skips_request() {
        let lookup = WeatherLookup::new(None)
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let err = lookup.try_current(1.0, 2.0).await.unwrap_err();
        assert!(matches!(err, WeatherError::MissingApiKey));
        assert!(lookup.get_current(1.0, 2.0).await.is_none());
    }

    #[tokio::test]
    async fn test_out_of_range_timestamp() {
        let lookup = WeatherLookup::new(Some("k".to_string())).unwrap();
        assert!(lookup.get_historical_at(0.0, 0.0, i64::MAX).await.is_none());
    }
}
