use std::{fmt, net::IpAddr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// One invocation's input: an explicit address (or none, meaning "mine") and units.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeatherRequest {
    pub ip: Option<IpAddr>,
    pub units: Units,
}

/// Where an IP address lives, as reported by the geolocation provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub city: String,
    pub region: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// "City, Region, Country", skipping empty parts.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [&self.city, &self.region, &self.country]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            format!("{:.4}, {:.4}", self.latitude, self.longitude)
        } else {
            parts.join(", ")
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Celsius,
    #[default]
    Fahrenheit,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Celsius => "celsius",
            Units::Fahrenheit => "fahrenheit",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Celsius => "C",
            Units::Fahrenheit => "F",
        }
    }

    pub fn wind_unit(&self) -> &'static str {
        match self {
            Units::Celsius => "m/s",
            Units::Fahrenheit => "mph",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "celsius" | "c" | "metric" => Ok(Units::Celsius),
            "fahrenheit" | "f" | "imperial" => Ok(Units::Fahrenheit),
            _ => Err(WeatherError::InvalidArgument(format!(
                "unknown units '{value}', expected celsius or fahrenheit"
            ))),
        }
    }
}

/// Coarse sky category, only used to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sky {
    Sun,
    Clouds,
    Rain,
    Snow,
    Fog,
    Unknown,
}

impl Sky {
    pub fn icon(&self) -> &'static str {
        match self {
            Sky::Sun => "\u{2600}",
            Sky::Clouds => "\u{2601}",
            Sky::Rain => "\u{2602}",
            Sky::Snow => "\u{2603}",
            Sky::Fog => "\u{2592}",
            Sky::Unknown => "?",
        }
    }
}

/// Current conditions for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub provider: String,
    pub location_name: String,
    pub temperature: f64,
    pub units: Units,
    pub condition: String,
    pub sky: Sky,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub observation_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(city: &str, region: &str, country: &str) -> Location {
        Location {
            city: city.into(),
            region: region.into(),
            country: country.into(),
            latitude: 37.323,
            longitude: -122.0322,
        }
    }

    #[test]
    fn display_name_skips_empty_parts() {
        assert_eq!(
            location("Cupertino", "California", "United States").display_name(),
            "Cupertino, California, United States"
        );
        assert_eq!(location("", " ", "Japan").display_name(), "Japan");
        assert_eq!(location("", "", "").display_name(), "37.3230, -122.0322");
    }

    #[test]
    fn units_parse_aliases() {
        assert_eq!(Units::try_from("Celsius").unwrap(), Units::Celsius);
        assert_eq!(Units::try_from("imperial").unwrap(), Units::Fahrenheit);
        assert!(Units::try_from("kelvin").is_err());
        assert_eq!(Units::default(), Units::Fahrenheit);
    }
}
