use std::io::Write;

use log::{debug, info};

use crate::{
    Config,
    error::Result,
    format::TextFormatter,
    geo::{GeoLocator, IpApiLocator},
    http::build_client,
    ip::{HttpIpEcho, IpEcho, resolve_ip},
    model::{WeatherReport, WeatherRequest},
    provider::{ProviderId, WeatherProvider, provider_from_config},
};

/// resolve IP -> geolocate -> fetch weather -> print. The first failing stage ends the run.
#[derive(Debug)]
pub struct Pipeline {
    echo: Box<dyn IpEcho>,
    locator: Box<dyn GeoLocator>,
    provider: Box<dyn WeatherProvider>,
    formatter: TextFormatter,
}

impl Pipeline {
    pub fn new(
        echo: Box<dyn IpEcho>,
        locator: Box<dyn GeoLocator>,
        provider: Box<dyn WeatherProvider>,
    ) -> Self {
        Self { echo, locator, provider, formatter: TextFormatter::plain() }
    }

    /// Real HTTP stages sharing one client configured from `config`.
    pub fn from_config(config: &Config, provider_id: ProviderId) -> Result<Self> {
        let http = build_client(config.timeout())?;

        let echo = HttpIpEcho::with_url(http.clone(), config.ip_echo_url());
        let locator = IpApiLocator::new(http.clone());
        let provider = provider_from_config(provider_id, config, http)?;

        Ok(Self::new(Box::new(echo), Box::new(locator), provider))
    }

    pub fn with_formatter(mut self, formatter: TextFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn provider_id(&self) -> ProviderId {
        self.provider.id()
    }

    pub async fn fetch(&self, request: &WeatherRequest) -> Result<WeatherReport> {
        let ip = resolve_ip(request.ip, self.echo.as_ref()).await?;
        let location = self.locator.locate(ip).await?;

        info!("fetching {} weather for {}", self.provider.id(), location.display_name());
        let report = self.provider.current(&location, request.units).await?;

        debug!("report: {report:?}");
        Ok(report)
    }

    /// Fetches and writes the report to `out`; nothing is written unless every stage succeeded.
    pub async fn run(&self, request: &WeatherRequest, out: &mut dyn Write) -> Result<WeatherReport> {
        let report = self.fetch(request).await?;
        self.formatter.write_report(&report, out)?;
        Ok(report)
    }
}
