use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt, time::Duration};

use crate::{
    Location, WeatherError,
    http::{self, CREDENTIAL_PARAM, truncate_body},
};

use super::GeocodingProvider;

/// OpenWeatherMap direct geocoding (`GET /direct`).
#[derive(Clone)]
pub struct OpenWeatherGeocoder {
    api_key: String,
    base_url: String,
    http: Client,
}

impl fmt::Debug for OpenWeatherGeocoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherGeocoder")
            .field("api_key", &"[FILTERED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoCandidate {
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

impl OpenWeatherGeocoder {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: http::build_client(timeout)?,
        })
    }
}

#[async_trait]
impl GeocodingProvider for OpenWeatherGeocoder {
    async fn geocode(&self, query: &str) -> Result<Location, WeatherError> {
        let url = format!("{}/direct", self.base_url);

        let request = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("limit", "1"),
                (CREDENTIAL_PARAM, self.api_key.as_str()),
            ])
            .build()?;

        let res = http::send(&self.http, request).await?;

        if !res.status.is_success() {
            tracing::error!(
                query,
                status = res.status.as_u16(),
                body = %truncate_body(&res.body),
                "geocoding request failed"
            );
            return Err(WeatherError::ProviderRequest { status: res.status.as_u16() });
        }

        let candidates: Vec<OwGeoCandidate> = http::decode(&res.body, "geocoding response")?;

        let Some(first) = candidates.into_iter().next() else {
            return Err(WeatherError::LocationNotFound { query: query.to_string() });
        };

        tracing::debug!(
            query,
            name = %first.name,
            country = ?first.country,
            state = ?first.state,
            "geocoded"
        );

        Location::new(first.lat, first.lon, first.name)
            .map_err(|e| WeatherError::Decode(format!("geocoding candidate: {e}")))
    }
}
