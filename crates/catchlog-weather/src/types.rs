use catchlog_core::{ErrorKind, NetworkError, ReqwestErrorExt};
use serde::{Deserialize, Serialize};

/// Normalized weather snapshot for a coordinate and time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Air temperature in °C
    pub temperature: f64,
    /// Condition text in the requested language
    pub conditions: String,
    /// Wind speed in kph
    pub wind_speed: f64,
    /// 16-point compass direction, e.g. "NNW"
    pub wind_direction: String,
    /// Pressure in millibars
    pub pressure: f64,
}

impl WeatherReading {
    pub fn wind_strength(&self) -> WindStrength {
        WindStrength::from_kph(self.wind_speed)
    }
}

/// Wind category shown on a fishing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindStrength {
    Calm,
    Light,
    Moderate,
    Strong,
}

impl WindStrength {
    pub fn from_kph(speed_kph: f64) -> Self {
        if speed_kph < 5.0 {
            Self::Calm
        } else if speed_kph < 20.0 {
            Self::Light
        } else if speed_kph < 40.0 {
            Self::Moderate
        } else {
            Self::Strong
        }
    }

}

impl std::fmt::Display for WindStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Calm => "Calm",
            Self::Light => "Light",
            Self::Moderate => "Moderate",
            Self::Strong => "Strong",
        };
        f.write_str(label)
    }
}

/// Weather and geocoding errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather API key is not configured")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Weather API error {status}: {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Timestamp out of range: {0}")]
    InvalidTimestamp(i64),

    #[error("Geocoding failed: {0}")]
    Geocode(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key; keep it out of logs.
        WeatherError::Network(err.without_url().into_network_error())
    }
}

impl WeatherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::MissingApiKey => ErrorKind::Configuration,
            WeatherError::Network(e) => e.kind(),
            WeatherError::Api { .. } | WeatherError::Geocode(_) => ErrorKind::NetworkFailure,
            WeatherError::MalformedResponse(_) | WeatherError::InvalidTimestamp(_) => {
                ErrorKind::MalformedResponse
            }
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::MissingApiKey => "Weather API key is missing. Check settings.",
            WeatherError::Network(e) => e.user_message(),
            WeatherError::Api { code: Some(1006), .. } => "No weather data for this location.",
            WeatherError::Api { status: 401 | 403, .. } => {
                "Weather API key is invalid. Check settings."
            }
            WeatherError::Api { .. } => "Weather service error. Please try again.",
            WeatherError::MalformedResponse(_) | WeatherError::InvalidTimestamp(_) => {
                "Weather data unavailable for this session."
            }
            WeatherError::Geocode(_) => "Place name unavailable.",
        }
    }
}

// weatherapi.com wire format

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCurrentResponse {
    pub current: ApiConditions,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiHistoryResponse {
    pub forecast: Option<ApiForecast>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiForecast {
    #[serde(default)]
    pub forecastday: Vec<ApiForecastDay>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiForecastDay {
    #[serde(default)]
    pub hour: Vec<ApiConditions>,
}

/// Shape shared by `current` and every `hour` entry.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiConditions {
    pub temp_c: f64,
    pub condition: ApiConditionText,
    pub wind_kph: f64,
    pub wind_dir: String,
    pub pressure_mb: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiConditionText {
    pub text: String,
}

impl From<ApiConditions> for WeatherReading {
    fn from(api: ApiConditions) -> Self {
        Self {
            temperature: api.temp_c,
            conditions: api.condition.text,
            wind_speed: api.wind_kph,
            wind_direction: api.wind_dir,
            pressure: api.pressure_mb,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: Option<i64>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wind_strength_thresholds() {
        assert_eq!(WindStrength::from_kph(0.0), WindStrength::Calm);
        assert_eq!(WindStrength::from_kph(4.9), WindStrength::Calm);
        assert_eq!(WindStrength::from_kph(5.0), WindStrength::Light);
        assert_eq!(WindStrength::from_kph(19.9), WindStrength::Light);
        assert_eq!(WindStrength::from_kph(20.0), WindStrength::Moderate);
        assert_eq!(WindStrength::from_kph(40.0), WindStrength::Strong);
    }

    #[test]
    fn test_wind_strength_display() {
        assert_eq!(WindStrength::Calm.to_string(), "Calm");
        assert_eq!(WindStrength::from_kph(55.0).to_string(), "Strong");
    }

    #[test]
    fn test_wind_strength_serializes_lowercase() {
        let json = serde_json::to_string(&WindStrength::Moderate).unwrap();
        assert_eq!(json, "\"moderate\"");
    }

    #[test]
    fn test_current_payload_maps_to_reading() {
        let payload = r#"{
            "location": {"name": "Annecy"},
            "current": {
                "temp_c": 18.5,
                "condition": {"text": "Partiellement nuageux", "code": 1003},
                "wind_kph": 12.2,
                "wind_dir": "NNW",
                "pressure_mb": 1016.0
            }
        }"#;
        let parsed: ApiCurrentResponse = serde_json::from_str(payload).unwrap();
        let reading = WeatherReading::from(parsed.current);
        assert_eq!(reading.temperature, 18.5);
        assert_eq!(reading.conditions, "Partiellement nuageux");
        assert_eq!(reading.wind_direction, "NNW");
        assert_eq!(reading.wind_strength(), WindStrength::Light);
    }

    #[test]
    fn test_history_without_forecast_parses() {
        let parsed: ApiHistoryResponse = serde_json::from_str(r#"{"location": {}}"#).unwrap();
        assert!(parsed.forecast.is_none());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(WeatherError::MissingApiKey.kind(), ErrorKind::Configuration);
        assert_eq!(
            WeatherError::MalformedResponse("no hours".into()).kind(),
            ErrorKind::MalformedResponse
        );
        let api = WeatherError::Api {
            status: 400,
            code: Some(1006),
            message: "No matching location found.".into(),
        };
        assert_eq!(api.kind(), ErrorKind::NetworkFailure);
        assert!(!api.kind().requires_alert());
        assert_eq!(api.user_message(), "No weather data for this location.");
    }
}
