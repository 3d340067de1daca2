use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    error::{Result, WeatherError},
    http::DEFAULT_TIMEOUT,
    ip::DEFAULT_IP_ECHO_URL,
    model::Units,
    provider::ProviderId,
};

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Top-level configuration stored on disk. Every field is optional; CLI flags win over it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Weather provider id, e.g. "open-meteo" or "openweather".
    pub default_provider: Option<String>,

    pub units: Option<Units>,

    pub timeout_secs: Option<u64>,

    /// Plain-text service answering with the caller's public address.
    pub ip_echo_url: Option<String>,

    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    /// Configured provider, or the keyless default when none is set.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        match &self.default_provider {
            Some(s) => ProviderId::try_from(s.as_str()),
            None => Ok(ProviderId::default()),
        }
    }

    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    pub fn units(&self) -> Units {
        self.units.unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs.map(Duration::from_secs).unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn ip_echo_url(&self) -> &str {
        self.ip_echo_url.as_deref().unwrap_or(DEFAULT_IP_ECHO_URL)
    }

    /// Load config from the platform config dir, or an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| config_error(path, "read", e))?;
        toml::from_str(&contents).map_err(|e| config_error(path, "parse", e))
    }

    /// Save config to the platform config dir, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| config_error(parent, "create", e))?;
        }

        let toml = toml::to_string_pretty(self).map_err(|e| config_error(path, "serialize", e))?;
        fs::write(path, toml).map_err(|e| config_error(path, "write", e))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "ipweather", "ipweather").ok_or_else(|| {
            WeatherError::InvalidArgument("could not determine platform config directory".into())
        })?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace a provider API key, making it the default provider if none is set.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.set_provider_api_key(provider_id, api_key);

        if self.default_provider.is_none() {
            self.set_default_provider(provider_id);
        }
    }

    pub fn set_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.insert(provider_id.as_str().to_string(), ProviderConfig { api_key });
    }

    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers
            .get(provider_id.as_str())
            .map(|cfg| cfg.api_key.trim())
            .filter(|key| !key.is_empty())
    }
}

fn config_error(path: &Path, action: &str, err: impl std::fmt::Display) -> WeatherError {
    WeatherError::InvalidArgument(format!(
        "failed to {action} config file {}: {}",
        path.display(),
        err.to_string().trim().replace('\n', " ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("ipweather-config-test-{}-{name}", std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = Config::default();

        assert_eq!(cfg.default_provider_id().unwrap(), ProviderId::OpenMeteo);
        assert_eq!(cfg.units(), Units::Fahrenheit);
        assert_eq!(cfg.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(cfg.ip_echo_url(), DEFAULT_IP_ECHO_URL);
        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), None);
    }

    #[test]
    fn unknown_default_provider_is_rejected() {
        let cfg = Config { default_provider: Some("darksky".into()), ..Config::default() };
        let err = cfg.default_provider_id().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn upsert_sets_default_only_once() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "OPEN_KEY".into());
        assert_eq!(cfg.default_provider_id().unwrap(), ProviderId::OpenWeather);
        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), Some("OPEN_KEY"));

        cfg.set_default_provider(ProviderId::OpenMeteo);
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "NEW_KEY".into());
        assert_eq!(cfg.default_provider_id().unwrap(), ProviderId::OpenMeteo);
        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), Some("NEW_KEY"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_provider_api_key(ProviderId::OpenWeather, "   ".into());
        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), None);
    }

    #[test]
    fn parses_full_toml() {
        let cfg: Config = toml::from_str(
            r#"
            default_provider = "openweather"
            units = "celsius"
            timeout_secs = 3
            ip_echo_url = "https://ifconfig.me/ip"

            [providers.openweather]
            api_key = "abc"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.default_provider_id().unwrap(), ProviderId::OpenWeather);
        assert_eq!(cfg.units(), Units::Celsius);
        assert_eq!(cfg.timeout(), Duration::from_secs(3));
        assert_eq!(cfg.ip_echo_url(), "https://ifconfig.me/ip");
        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), Some("abc"));
    }

    #[test]
    fn missing_file_loads_default() {
        let cfg = Config::load_from(&scratch_path("missing")).unwrap();
        assert!(cfg.default_provider.is_none());
        assert!(cfg.providers.is_empty());
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let path = scratch_path("saved");
        let mut cfg = Config { units: Some(Units::Celsius), ..Config::default() };
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "KEY".into());

        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        let _ = fs::remove_dir_all(path.parent().unwrap());

        assert_eq!(loaded.units(), Units::Celsius);
        assert_eq!(loaded.default_provider_id().unwrap(), ProviderId::OpenWeather);
        assert_eq!(loaded.provider_api_key(ProviderId::OpenWeather), Some("KEY"));
    }

    #[test]
    fn malformed_file_is_an_invalid_argument() {
        let path = scratch_path("malformed");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "units = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        let _ = fs::remove_dir_all(path.parent().unwrap());

        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("failed to parse config file"));
    }
}
