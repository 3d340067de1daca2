use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{Result, WeatherError},
    http::fetch_text,
    model::{Location, Sky, Units, WeatherReport},
};

use super::{ProviderId, WeatherProvider};

/// Open-Meteo forecast API, current block only. No key required.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    http: Client,
}

impl OpenMeteoProvider {
    const SERVICE: &'static str = "Open-Meteo";
    const URL: &'static str = "https://api.open-meteo.com/v1/forecast";
    const CURRENT_FIELDS: &'static str =
        "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m";

    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenMeteo
    }

    async fn current(&self, location: &Location, units: Units) -> Result<WeatherReport> {
        let (temperature_unit, wind_speed_unit) = match units {
            Units::Celsius => ("celsius", "ms"),
            Units::Fahrenheit => ("fahrenheit", "mph"),
        };

        let request = self.http.get(Self::URL).query(&[
            ("latitude", location.latitude.to_string().as_str()),
            ("longitude", location.longitude.to_string().as_str()),
            ("current", Self::CURRENT_FIELDS),
            ("temperature_unit", temperature_unit),
            ("wind_speed_unit", wind_speed_unit),
            ("timezone", "GMT"),
        ]);

        let body = fetch_text(Self::SERVICE, request).await?;
        let report = parse_current(&body, location, units)?;

        debug!("Open-Meteo reports {} {} at {}", report.temperature, report.condition, report.location_name);
        Ok(report)
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    time: Option<String>,
    temperature_2m: f64,
    relative_humidity_2m: f64,
    weather_code: u16,
    wind_speed_10m: f64,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current: OmCurrent,
}

/// Decodes a forecast body requested with `current=` fields and `timezone=GMT`.
pub fn parse_current(body: &str, location: &Location, units: Units) -> Result<WeatherReport> {
    let parsed: OmResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::data(OpenMeteoProvider::SERVICE, e))?;
    let current = parsed.current;

    let (condition, sky) = describe_wmo_code(current.weather_code);

    Ok(WeatherReport {
        provider: ProviderId::OpenMeteo.to_string(),
        location_name: location.display_name(),
        temperature: current.temperature_2m,
        units,
        condition: condition.to_string(),
        sky,
        humidity_pct: current.relative_humidity_2m.round().clamp(0.0, 100.0) as u8,
        wind_speed: current.wind_speed_10m,
        observation_time: current.time.as_deref().and_then(parse_gmt_time),
    })
}

fn parse_gmt_time(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").ok().map(|ndt| ndt.and_utc())
}

/// WMO weather interpretation codes (WW) as used by Open-Meteo.
fn describe_wmo_code(code: u16) -> (&'static str, Sky) {
    match code {
        0 => ("Clear sky", Sky::Sun),
        1 => ("Mainly clear", Sky::Sun),
        2 => ("Partly cloudy", Sky::Clouds),
        3 => ("Overcast", Sky::Clouds),
        45 | 48 => ("Fog", Sky::Fog),
        51 | 53 | 55 => ("Drizzle", Sky::Rain),
        56 | 57 => ("Freezing drizzle", Sky::Rain),
        61 => ("Slight rain", Sky::Rain),
        63 => ("Moderate rain", Sky::Rain),
        65 => ("Heavy rain", Sky::Rain),
        66 | 67 => ("Freezing rain", Sky::Rain),
        71 => ("Slight snow fall", Sky::Snow),
        73 => ("Moderate snow fall", Sky::Snow),
        75 => ("Heavy snow fall", Sky::Snow),
        77 => ("Snow grains", Sky::Snow),
        80..=82 => ("Rain showers", Sky::Rain),
        85 | 86 => ("Snow showers", Sky::Snow),
        95 => ("Thunderstorm", Sky::Rain),
        96 | 99 => ("Thunderstorm with hail", Sky::Rain),
        _ => ("Unknown conditions", Sky::Unknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn tokyo() -> Location {
        Location {
            city: "Tokyo".into(),
            region: "Tokyo".into(),
            country: "Japan".into(),
            latitude: 35.6895,
            longitude: 139.6917,
        }
    }

    #[test]
    fn parses_current_block() {
        let body = r#"{
            "latitude": 35.7, "longitude": 139.6875, "utc_offset_seconds": 0,
            "current_units": {"time": "iso8601", "temperature_2m": "°C"},
            "current": {
                "time": "2024-05-01T12:00", "interval": 900,
                "temperature_2m": 18.4, "relative_humidity_2m": 63,
                "weather_code": 3, "wind_speed_10m": 4.1
            }
        }"#;

        let report = parse_current(body, &tokyo(), Units::Celsius).unwrap();

        assert_eq!(report.provider, "open-meteo");
        assert_eq!(report.location_name, "Tokyo, Tokyo, Japan");
        assert_eq!(report.temperature, 18.4);
        assert_eq!(report.condition, "Overcast");
        assert_eq!(report.sky, Sky::Clouds);
        assert_eq!(report.humidity_pct, 63);
        assert_eq!(report.wind_speed, 4.1);
        assert_eq!(
            report.observation_time.unwrap().format("%Y-%m-%d %H:%M").to_string(),
            "2024-05-01 12:00"
        );
    }

    #[test]
    fn missing_current_block_is_a_data_error() {
        let body = r#"{"latitude": 35.7, "longitude": 139.6875}"#;
        let err = parse_current(body, &tokyo(), Units::Celsius).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataError);
    }

    #[test]
    fn unparseable_time_is_dropped() {
        let body = r#"{"current": {"time": "noon", "temperature_2m": 1.0,
            "relative_humidity_2m": 90.4, "weather_code": 71, "wind_speed_10m": 0.0}}"#;

        let report = parse_current(body, &tokyo(), Units::Celsius).unwrap();

        assert!(report.observation_time.is_none());
        assert_eq!(report.humidity_pct, 90);
        assert_eq!(report.sky, Sky::Snow);
    }

    #[test]
    fn wmo_codes_cover_common_weather() {
        assert_eq!(describe_wmo_code(0), ("Clear sky", Sky::Sun));
        assert_eq!(describe_wmo_code(48).1, Sky::Fog);
        assert_eq!(describe_wmo_code(81).1, Sky::Rain);
        assert_eq!(describe_wmo_code(86).1, Sky::Snow);
        assert_eq!(describe_wmo_code(42).1, Sky::Unknown);
    }
}
