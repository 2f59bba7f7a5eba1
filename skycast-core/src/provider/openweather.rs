use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::{fmt, time::Duration};

use crate::{
    CurrentWeather, ForecastDay, Location, WeatherError,
    http::{self, CREDENTIAL_PARAM, truncate_body},
    mapper::{self, OwCurrentResponse, OwForecastResponse},
};

use super::WeatherProvider;

/// OpenWeatherMap 2.5 API: `GET /weather` and `GET /forecast`, metric units.
#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("api_key", &"[FILTERED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: http::build_client(timeout)?,
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        location: &Location,
    ) -> Result<T, WeatherError> {
        location.validate()?;

        let url = format!("{}/{endpoint}", self.base_url);
        let lat = location.latitude.to_string();
        let lon = location.longitude.to_string();

        let request = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("units", "metric"),
                (CREDENTIAL_PARAM, self.api_key.as_str()),
            ])
            .build()?;

        let res = http::send(&self.http, request).await?;

        if !res.status.is_success() {
            tracing::error!(
                endpoint,
                lat = location.latitude,
                lon = location.longitude,
                status = res.status.as_u16(),
                body = %truncate_body(&res.body),
                "weather request failed"
            );

            return Err(if res.status == StatusCode::BAD_REQUEST {
                WeatherError::BadLocation {
                    latitude: location.latitude,
                    longitude: location.longitude,
                }
            } else {
                WeatherError::ProviderRequest { status: res.status.as_u16() }
            });
        }

        http::decode(&res.body, endpoint)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, location: &Location) -> Result<CurrentWeather, WeatherError> {
        let raw: OwCurrentResponse = self.fetch("weather", location).await?;
        Ok(mapper::map_current(&raw))
    }

    async fn forecast(&self, location: &Location) -> Result<Vec<ForecastDay>, WeatherError> {
        let raw: OwForecastResponse = self.fetch("forecast", location).await?;
        Ok(mapper::map_forecast(&raw.list))
    }
}
