pub mod config;
pub mod error;
pub mod format;
pub mod geo;

pub use config::{
    Config, LocationAccuracy, MapsConfig, TrackingConfig, ValidationResult, WeatherConfig,
};
pub use error::{ConfigError, ErrorKind, LocationError, NetworkError, ReqwestErrorExt};
pub use geo::{Coordinates, MapRegion};

use anyhow::Result;

/// Initialize logging for the catchlog binaries.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("catchlog core initialized");
    Ok(())
}
