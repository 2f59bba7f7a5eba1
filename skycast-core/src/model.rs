use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::WeatherError;

/// A geocoded place. Coordinates are validated on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, name: impl Into<String>) -> Result<Self, WeatherError> {
        let location = Self { latitude, longitude, name: name.into() };
        location.validate()?;
        Ok(location)
    }

    /// Re-check the coordinate invariant, e.g. for values that came out of a cache.
    pub fn validate(&self) -> Result<(), WeatherError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(WeatherError::InvalidArgument(format!(
                "latitude {} is outside [-90, 90]",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(WeatherError::InvalidArgument(format!(
                "longitude {} is outside [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// Closed set of conditions the rest of the app knows how to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    ClearSky,
    FewClouds,
    ScatteredClouds,
    BrokenClouds,
    ShowerRain,
    Rain,
    Thunderstorm,
    Snow,
    Mist,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::ClearSky => "clear_sky",
            Condition::FewClouds => "few_clouds",
            Condition::ScatteredClouds => "scattered_clouds",
            Condition::BrokenClouds => "broken_clouds",
            Condition::ShowerRain => "shower_rain",
            Condition::Rain => "rain",
            Condition::Thunderstorm => "thunderstorm",
            Condition::Snow => "snow",
            Condition::Mist => "mist",
        }
    }

    pub const fn all() -> &'static [Condition] {
        &[
            Condition::ClearSky,
            Condition::FewClouds,
            Condition::ScatteredClouds,
            Condition::BrokenClouds,
            Condition::ShowerRain,
            Condition::Rain,
            Condition::Thunderstorm,
            Condition::Snow,
            Condition::Mist,
        ]
    }

    /// Look up an OpenWeatherMap "main" label (case-insensitive).
    ///
    /// Returns `None` for labels outside the table; callers decide the fallback.
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();

        match lower.as_str() {
            "clear" => Some(Condition::ClearSky),
            "clouds" => Some(Condition::FewClouds),
            "rain" => Some(Condition::Rain),
            "drizzle" => Some(Condition::ShowerRain),
            "thunderstorm" => Some(Condition::Thunderstorm),
            "snow" => Some(Condition::Snow),
            "mist" | "smoke" | "haze" | "dust" | "fog" | "sand" | "ash" | "squall" | "tornado" => {
                Some(Condition::Mist)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Conditions right now at a location. Temperature in °C, wind in km/h.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub condition: Condition,
    pub pressure: i32,
    pub humidity: i32,
    pub wind_speed: f64,
    pub wind_direction: i32,
}

/// One calendar day aggregated from sub-daily forecast entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub condition: Condition,
    pub pressure: i32,
    pub humidity: i32,
}

/// The value stored in the weather cache. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: Location,
    pub current: CurrentWeather,
    pub forecast: Vec<ForecastDay>,
    pub updated_at: DateTime<Utc>,
}

/// What `WeatherService::resolve` hands back: the report plus whether it was
/// already cached before this call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherBundle {
    #[serde(flatten)]
    pub report: WeatherReport,
    pub from_cache: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_accepts_bounds() {
        assert!(Location::new(90.0, 180.0, "pole").is_ok());
        assert!(Location::new(-90.0, -180.0, "pole").is_ok());
    }

    #[test]
    fn location_rejects_out_of_range() {
        let err = Location::new(91.0, 0.0, "nowhere").unwrap_err();
        assert!(matches!(err, WeatherError::InvalidArgument(_)));

        let err = Location::new(0.0, -180.5, "nowhere").unwrap_err();
        assert!(matches!(err, WeatherError::InvalidArgument(_)));

        let err = Location::new(f64::NAN, 0.0, "nowhere").unwrap_err();
        assert!(matches!(err, WeatherError::InvalidArgument(_)));
    }

    #[test]
    fn condition_labels_are_case_insensitive() {
        assert_eq!(Condition::from_label("Clear"), Some(Condition::ClearSky));
        assert_eq!(Condition::from_label("CLOUDS"), Some(Condition::FewClouds));
        assert_eq!(Condition::from_label("drizzle"), Some(Condition::ShowerRain));
        assert_eq!(Condition::from_label("Thunderstorm"), Some(Condition::Thunderstorm));
        assert_eq!(Condition::from_label("Unknown"), None);
    }

    #[test]
    fn atmosphere_labels_map_to_mist() {
        for label in ["Mist", "Smoke", "Haze", "Dust", "Fog", "Sand", "Ash", "Squall", "Tornado"] {
            assert_eq!(Condition::from_label(label), Some(Condition::Mist), "{label}");
        }
    }

    #[test]
    fn condition_serializes_as_snake_case() {
        for condition in Condition::all() {
            let json = serde_json::to_string(condition).expect("serialize");
            assert_eq!(json, format!("\"{}\"", condition.as_str()));
        }
    }

    #[test]
    fn bundle_serializes_flat() {
        let bundle = WeatherBundle {
            report: WeatherReport {
                location: Location::new(40.7128, -74.006, "New York").expect("valid"),
                current: CurrentWeather {
                    temperature: 22.5,
                    condition: Condition::ClearSky,
                    pressure: 1013,
                    humidity: 65,
                    wind_speed: 18.7,
                    wind_direction: 180,
                },
                forecast: vec![],
                updated_at: Utc::now(),
            },
            from_cache: true,
        };

        let value = serde_json::to_value(&bundle).expect("serialize");
        assert_eq!(value["from_cache"], serde_json::json!(true));
        assert_eq!(value["location"]["name"], serde_json::json!("New York"));
        assert_eq!(value["current"]["condition"], serde_json::json!("clear_sky"));
    }
}
