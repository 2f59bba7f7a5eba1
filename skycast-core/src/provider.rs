use crate::{
    Config, CurrentWeather, ForecastDay, Location, WeatherError,
    geocoding::{GeocodingProvider, OpenWeatherGeocoder},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Current conditions and a daily forecast for already-geocoded coordinates.
///
/// Each call is a single attempt; retries belong to the caller.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fails with [`WeatherError::BadLocation`] when the provider rejects the
    /// coordinates and [`WeatherError::ProviderRequest`] on any other failure status.
    async fn current_weather(&self, location: &Location) -> Result<CurrentWeather, WeatherError>;

    /// Daily forecast, ascending by date.
    async fn forecast(&self, location: &Location) -> Result<Vec<ForecastDay>, WeatherError>;
}

/// The production provider pair, sharing one credential.
#[derive(Debug, Clone)]
pub struct Providers {
    pub geocoding: Arc<dyn GeocodingProvider>,
    pub weather: Arc<dyn WeatherProvider>,
}

/// Construct the OpenWeatherMap providers from config.
pub fn providers_from_config(config: &Config) -> anyhow::Result<Providers> {
    let api_key = config.api_key()?;
    let timeout = config.request_timeout();

    let geocoding = OpenWeatherGeocoder::new(api_key.to_owned(), &config.geocoding_url, timeout)?;
    let weather = OpenWeatherProvider::new(api_key.to_owned(), &config.weather_url, timeout)?;

    Ok(Providers {
        geocoding: Arc::new(geocoding),
        weather: Arc::new(weather),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn providers_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = providers_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No OpenWeatherMap API key configured"));
    }

    #[test]
    fn providers_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        let providers = providers_from_config(&cfg).expect("providers build");
        let debug = format!("{providers:?}");
        assert!(debug.contains("OpenWeatherProvider"));
        assert!(debug.contains("OpenWeatherGeocoder"));
        assert!(!debug.contains("\"KEY\""));
    }
}
