//! Core library for the `skycast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Geocoding and weather provider abstractions, with OpenWeatherMap implementations
//! - Mapping of provider payloads into daily forecasts
//! - A TTL cache and the [`WeatherService`] that ties it all together
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod error;
pub mod geocoding;
mod http;
pub mod mapper;
pub mod model;
pub mod provider;
pub mod service;

pub use cache::{Cache, CacheStore, FileStore, MemoryStore};
pub use config::{CacheBackend, CacheConfig, Config};
pub use error::WeatherError;
pub use geocoding::GeocodingProvider;
pub use http::redact_credential;
pub use model::{Condition, CurrentWeather, ForecastDay, Location, WeatherBundle, WeatherReport};
pub use provider::WeatherProvider;
pub use service::{WeatherService, geocoding_cache_key, weather_cache_key};
