use anyhow::Result;
use catchlog_weather::WeatherLookup;

fn main() -> Result<()> {
    catchlog_core::init()?;

    let (config, validation) = catchlog_core::Config::load_validated()?;

    let lookup = WeatherLookup::from_config(&config.weather)?;

    tracing::info!("catchlog started");

    println!("catchlog - fishing route & weather log");
    println!("\nConfiguration:");
    println!("  Config directory: {}", config.config_dir.display());
    println!("  Weather API:      {}", config.weather.base_url);
    println!(
        "  Weather lookups:  {}",
        if lookup.is_configured() { "enabled" } else { "disabled (no API key)" }
    );
    println!("  Geocoder:         {}", config.weather.geocoder_url);
    println!(
        "  GPS sampling:     {:?}, every {} ms / {} m",
        config.tracking.accuracy, config.tracking.min_interval_ms, config.tracking.min_distance_m
    );

    if !validation.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &validation.warnings {
            println!("  - {}", warning);
        }
    }

    Ok(())
}
