use crate::{
    Config,
    error::{Result, WeatherError},
    model::{Location, Units, WeatherReport},
    provider::{openmeteo::OpenMeteoProvider, openweather::OpenWeatherProvider},
};
use async_trait::async_trait;
use reqwest::Client;
use std::{convert::TryFrom, fmt::Debug};

pub mod openmeteo;
pub mod openweather;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ProviderId {
    #[default]
    OpenMeteo,
    OpenWeather,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenMeteo => "open-meteo",
            ProviderId::OpenWeather => "openweather",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenMeteo, ProviderId::OpenWeather]
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderId::OpenWeather)
    }

    /// Environment variable consulted for this provider's key.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderId::OpenMeteo => None,
            ProviderId::OpenWeather => Some("OPENWEATHER_API_KEY"),
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "open-meteo" | "openmeteo" => Ok(ProviderId::OpenMeteo),
            "openweather" | "openweathermap" => Ok(ProviderId::OpenWeather),
            _ => Err(WeatherError::InvalidArgument(format!(
                "unknown provider '{value}', supported providers: open-meteo, openweather"
            ))),
        }
    }
}

/// Current conditions for a location.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn current(&self, location: &Location, units: Units) -> Result<WeatherReport>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
    http: Client,
) -> Result<Box<dyn WeatherProvider>> {
    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::OpenMeteo => Box::new(OpenMeteoProvider::new(http)),
        ProviderId::OpenWeather => {
            let api_key = config.provider_api_key(id).ok_or_else(|| missing_key(id))?;
            Box::new(OpenWeatherProvider::new(api_key.to_owned(), http))
        }
    };

    Ok(boxed)
}

fn missing_key(id: ProviderId) -> WeatherError {
    let env_hint = id.api_key_env().map(|var| format!(" or set {var}")).unwrap_or_default();
    WeatherError::InvalidArgument(format!(
        "no API key configured for provider '{id}'; run `weather configure {id}`{env_hint}"
    ))
}
