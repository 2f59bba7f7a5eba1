//! Pure transforms from OpenWeatherMap payloads into the internal model.
//!
//! Nothing here touches the network or the cache. The only side effect is a
//! `warn!` when a condition label is not in the lookup table.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

use crate::model::{Condition, CurrentWeather, ForecastDay};

/// Metres per second to kilometres per hour.
const MPS_TO_KMH: f64 = 3.6;

const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Deserialize)]
pub struct OwWeather {
    pub main: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwCurrentMain {
    pub temp: f64,
    pub pressure: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwWind {
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub deg: f64,
}

/// Body of `GET /weather`.
#[derive(Debug, Clone, Deserialize)]
pub struct OwCurrentResponse {
    pub main: OwCurrentMain,
    #[serde(default)]
    pub weather: Vec<OwWeather>,
    #[serde(default)]
    pub wind: OwWind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwForecastMain {
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwForecastEntry {
    #[serde(deserialize_with = "deserialize_dt_txt")]
    pub dt_txt: NaiveDateTime,
    pub main: OwForecastMain,
    #[serde(default)]
    pub weather: Vec<OwWeather>,
}

/// Body of `GET /forecast`.
#[derive(Debug, Clone, Deserialize)]
pub struct OwForecastResponse {
    #[serde(default)]
    pub list: Vec<OwForecastEntry>,
}

fn deserialize_dt_txt<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, DT_TXT_FORMAT).map_err(serde::de::Error::custom)
}

/// Map a provider label onto [`Condition`], falling back to clear sky.
pub fn map_condition(label: Option<&str>) -> Condition {
    match label.and_then(Condition::from_label) {
        Some(condition) => condition,
        None => {
            tracing::warn!(label = ?label, "unrecognized weather condition, falling back to clear_sky");
            Condition::ClearSky
        }
    }
}

fn primary_label(weather: &[OwWeather]) -> Option<&str> {
    weather.first().map(|w| w.main.as_str())
}

pub fn map_current(raw: &OwCurrentResponse) -> CurrentWeather {
    CurrentWeather {
        temperature: raw.main.temp,
        condition: map_condition(primary_label(&raw.weather)),
        pressure: raw.main.pressure.round() as i32,
        humidity: raw.main.humidity.round() as i32,
        wind_speed: raw.wind.speed * MPS_TO_KMH,
        wind_direction: (raw.wind.deg.round() as i32).rem_euclid(360),
    }
}

/// Group sub-daily entries by calendar date and aggregate each group.
///
/// Output is ascending by date with one entry per date. Empty in, empty out.
pub fn map_forecast(entries: &[OwForecastEntry]) -> Vec<ForecastDay> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&OwForecastEntry>> = BTreeMap::new();
    for entry in entries {
        by_date.entry(entry.dt_txt.date()).or_default().push(entry);
    }

    by_date
        .into_iter()
        .map(|(date, group)| aggregate_day(date, &group))
        .collect()
}

fn aggregate_day(date: NaiveDate, group: &[&OwForecastEntry]) -> ForecastDay {
    let min_temperature = group
        .iter()
        .map(|e| e.main.temp_min)
        .fold(f64::INFINITY, f64::min);
    let max_temperature = group
        .iter()
        .map(|e| e.main.temp_max)
        .fold(f64::NEG_INFINITY, f64::max);

    let conditions: Vec<Condition> = group
        .iter()
        .map(|e| map_condition(primary_label(&e.weather)))
        .collect();

    ForecastDay {
        date,
        min_temperature,
        max_temperature,
        condition: most_frequent(&conditions),
        pressure: rounded_mean(group.iter().map(|e| e.main.pressure)),
        humidity: rounded_mean(group.iter().map(|e| e.main.humidity)),
    }
}

/// Mode of `conditions`; ties go to whichever was seen first.
fn most_frequent(conditions: &[Condition]) -> Condition {
    let mut counts: Vec<(Condition, usize)> = Vec::new();
    for condition in conditions {
        match counts.iter_mut().find(|(c, _)| c == condition) {
            Some((_, n)) => *n += 1,
            None => counts.push((*condition, 1)),
        }
    }

    let mut best: Option<(Condition, usize)> = None;
    for (condition, count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((condition, count));
        }
    }

    best.map(|(condition, _)| condition).unwrap_or_default()
}

fn rounded_mean(values: impl Iterator<Item = f64>) -> i32 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if count == 0 {
        return 0;
    }
    (sum / count as f64).round() as i32
}
