//! Weather annotations for recorded fishing routes.
//!
//! Fetches live and historical conditions from weatherapi.com, reduces a day
//! of hourly samples to one representative reading, and resolves coordinates
//! to place names.

pub mod aggregate;
pub mod geocode;
pub mod lookup;
pub mod types;

pub use aggregate::summarize_day;
pub use geocode::{reverse_geocode, Geocoder, NominatimGeocoder, PlaceAddress};
pub use lookup::WeatherLookup;
pub use types::*;
