//! Orchestration: geocode (cached) → fetch weather (cached) → stamp hit status.

use anyhow::Context;
use chrono::Utc;
use std::{sync::Arc, time::Duration};

use crate::{
    Cache, Config, Location, WeatherBundle, WeatherError, WeatherReport,
    cache::{FileStore, MemoryStore},
    config::CacheBackend,
    geocoding::GeocodingProvider,
    provider::{WeatherProvider, providers_from_config},
};

pub const GEOCODING_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const WEATHER_TTL: Duration = Duration::from_secs(30 * 60);

/// `"geocoding:" + lowercase(trim(query))`.
pub fn geocoding_cache_key(query: &str) -> String {
    format!("geocoding:{}", query.trim().to_lowercase())
}

/// `"weather:<lat>:<lon>"` using the default float formatting.
pub fn weather_cache_key(location: &Location) -> String {
    format!("weather:{}:{}", location.latitude, location.longitude)
}

#[derive(Debug, Clone)]
pub struct WeatherService {
    geocoder: Arc<dyn GeocodingProvider>,
    weather: Arc<dyn WeatherProvider>,
    cache: Cache,
    geocoding_ttl: Duration,
    weather_ttl: Duration,
}

impl WeatherService {
    pub fn new(
        geocoder: Arc<dyn GeocodingProvider>,
        weather: Arc<dyn WeatherProvider>,
        cache: Cache,
    ) -> Self {
        Self {
            geocoder,
            weather,
            cache,
            geocoding_ttl: GEOCODING_TTL,
            weather_ttl: WEATHER_TTL,
        }
    }

    pub fn with_ttls(mut self, geocoding: Duration, weather: Duration) -> Self {
        self.geocoding_ttl = geocoding;
        self.weather_ttl = weather;
        self
    }

    /// Wire OpenWeatherMap providers and the configured cache backend.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let providers = providers_from_config(config)?;

        let cache = match config.cache.backend {
            CacheBackend::Memory => Cache::new(Arc::new(MemoryStore::new())),
            CacheBackend::File => {
                let path = Config::cache_file_path().context("Failed to locate cache file")?;
                Cache::new(Arc::new(FileStore::open(path)))
            }
        };

        Ok(Self::new(providers.geocoding, providers.weather, cache)
            .with_ttls(config.cache.geocoding_ttl(), config.cache.weather_ttl()))
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Resolve a free-form query into current weather plus a daily forecast.
    ///
    /// Errors from the providers and the cache propagate unchanged.
    pub async fn resolve(&self, query: &str) -> Result<WeatherBundle, WeatherError> {
        if query.trim().is_empty() {
            return Err(WeatherError::InvalidArgument("query is empty".into()));
        }

        let geo_key = geocoding_cache_key(query);
        let (location, _) = self
            .cache
            .fetch(&geo_key, self.geocoding_ttl, || self.geocoder.geocode(query))
            .await?;

        let weather_key = weather_cache_key(&location);
        // Captured before the fetch below, which populates on a miss.
        let from_cache = self.cache.exists(&weather_key).await?;

        let (report, _) = self
            .cache
            .fetch(&weather_key, self.weather_ttl, || self.fetch_fresh(&location))
            .await?;

        tracing::info!(query, name = %report.location.name, from_cache, "resolved weather");

        Ok(WeatherBundle { report, from_cache })
    }

    /// Hit both weather endpoints and assemble an uncached report.
    pub async fn fetch_fresh(&self, location: &Location) -> Result<WeatherReport, WeatherError> {
        let (current, forecast) = tokio::try_join!(
            self.weather.current_weather(location),
            self.weather.forecast(location),
        )?;

        Ok(WeatherReport {
            location: location.clone(),
            current,
            forecast,
            updated_at: Utc::now(),
        })
    }
}
