use async_trait::async_trait;
use std::fmt::Debug;

use crate::{Location, WeatherError};

pub mod openweather;

pub use openweather::OpenWeatherGeocoder;

/// Turns a free-form query into a single [`Location`].
#[async_trait]
pub trait GeocodingProvider: Send + Sync + Debug {
    /// Resolve `query` exactly as the user typed it.
    ///
    /// Fails with [`WeatherError::LocationNotFound`] when nothing matches.
    async fn geocode(&self, query: &str) -> Result<Location, WeatherError>;
}
