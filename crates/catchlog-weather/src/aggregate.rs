//! Reduce a day of hourly samples to one reading.

use crate::types::WeatherReading;

/// Hour used for conditions, wind direction and pressure by default (noon).
pub const DEFAULT_REPRESENTATIVE_HOUR: usize = 12;

/// Summarize the hourly samples of one day.
///
/// Temperature and wind speed are the unweighted mean over every sample
/// present. Conditions, wind direction and pressure are taken from the sample
/// at `representative_hour`, or from the first sample when the day has fewer
/// entries. Returns `None` when `hours` is empty.
pub fn summarize_day(
    hours: &[WeatherReading],
    representative_hour: usize,
) -> Option<WeatherReading> {
    let representative = hours.get(representative_hour).or_else(|| hours.first())?;

    let count = hours.len() as f64;
    let temperature = hours.iter().map(|h| h.temperature).sum::<f64>() / count;
    let wind_speed = hours.iter().map(|h| h.wind_speed).sum::<f64>() / count;

    Some(WeatherReading {
        temperature,
        conditions: representative.conditions.clone(),
        wind_speed,
        wind_direction: representative.wind_direction.clone(),
        pressure: representative.pressure,
    })
}
