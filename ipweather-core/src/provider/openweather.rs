use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    error::{Result, WeatherError},
    http::fetch_text,
    model::{Location, Sky, Units, WeatherReport},
};

use super::{ProviderId, WeatherProvider};

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    url: String,
    http: Client,
}

impl OpenWeatherProvider {
    const SERVICE: &'static str = "OpenWeather";
    const URL: &'static str = "https://api.openweathermap.org/data/2.5/weather";

    pub fn new(api_key: String, http: Client) -> Self {
        Self { api_key, url: Self::URL.to_string(), http }
    }

    #[cfg(test)]
    fn with_url(api_key: String, http: Client, url: impl Into<String>) -> Self {
        Self { api_key, url: url.into(), http }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    async fn current(&self, location: &Location, units: Units) -> Result<WeatherReport> {
        let request = self.http.get(&self.url).query(&[
            ("lat", location.latitude.to_string().as_str()),
            ("lon", location.longitude.to_string().as_str()),
            ("units", units_param(units)),
            ("appid", self.api_key.as_str()),
        ]);

        let body = match fetch_text(Self::SERVICE, request).await {
            Err(WeatherError::Status { status, .. }) if status == StatusCode::UNAUTHORIZED => {
                return Err(WeatherError::InvalidArgument(
                    "OpenWeather rejected the API key (HTTP 401)".into(),
                ));
            }
            other => other?,
        };

        let report = parse_current(&body, location, units)?;
        debug!("OpenWeather reports {} {} at {}", report.temperature, report.condition, report.location_name);
        Ok(report)
    }
}

fn units_param(units: Units) -> &'static str {
    match units {
        Units::Celsius => "metric",
        Units::Fahrenheit => "imperial",
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    dt: Option<i64>,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

/// Decodes a `/data/2.5/weather` body fetched with the given units.
pub fn parse_current(body: &str, location: &Location, units: Units) -> Result<WeatherReport> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::data(OpenWeatherProvider::SERVICE, e))?;

    let weather = parsed.weather.first().ok_or_else(|| {
        WeatherError::data(OpenWeatherProvider::SERVICE, "no conditions reported for this location")
    })?;

    let mut location_name = location.display_name();
    if location.city.trim().is_empty() && !parsed.name.is_empty() {
        location_name = parsed.name.clone();
    }

    Ok(WeatherReport {
        provider: ProviderId::OpenWeather.to_string(),
        location_name,
        temperature: parsed.main.temp,
        units,
        condition: weather.description.clone(),
        sky: sky_from_icon(&weather.icon),
        humidity_pct: parsed.main.humidity.round().clamp(0.0, 100.0) as u8,
        wind_speed: parsed.wind.speed,
        observation_time: parsed.dt.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
    })
}

/// Icon codes look like "01d"/"10n"; the digits pick the sky.
fn sky_from_icon(icon: &str) -> Sky {
    match icon.get(..2) {
        Some("01") => Sky::Sun,
        Some("02" | "03" | "04") => Sky::Clouds,
        Some("09" | "10" | "11") => Sky::Rain,
        Some("13") => Sky::Snow,
        Some("50") => Sky::Fog,
        _ => Sky::Unknown,
    }
}
