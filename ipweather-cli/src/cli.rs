use std::{ffi::OsString, io, net::IpAddr};

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use inquire::{Confirm, Password, PasswordDisplayMode, Select};
use ipweather_core::{
    Config, Pipeline, ProviderId, TextFormatter, Units, WeatherError, WeatherRequest, parse_ip,
};
use log::debug;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather",
    version,
    about = "Current weather for an IP address, or for your public IP when none is given",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// IPv4 or IPv6 address to look up (also accepted as `-ip`).
    #[arg(short = 'i', long = "ip-address", value_name = "ADDRESS", value_parser = parse_ip_arg)]
    pub ip_address: Option<IpAddr>,

    /// Units of measurement [default: fahrenheit].
    #[arg(short, long, value_name = "celsius|fahrenheit", value_parser = parse_units_arg)]
    pub units: Option<Units>,

    /// Weather provider [default: open-meteo].
    #[arg(short, long, value_name = "open-meteo|openweather", value_parser = parse_provider_arg)]
    pub provider: Option<ProviderId>,

    /// API key for providers that need one.
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds [default: 10].
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Turn on debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store an API key and preferred units for a provider.
    Configure {
        /// Provider short name, e.g. "openweather" or "open-meteo".
        #[arg(value_parser = parse_provider_arg)]
        provider: ProviderId,
    },
}

fn parse_ip_arg(s: &str) -> Result<IpAddr, WeatherError> {
    parse_ip(s)
}

fn parse_units_arg(s: &str) -> Result<Units, WeatherError> {
    Units::try_from(s)
}

fn parse_provider_arg(s: &str) -> Result<ProviderId, WeatherError> {
    ProviderId::try_from(s)
}

/// Rewrites the single-dash `-ip` spelling to `--ip-address`, which clap cannot express.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut after_separator = false;

    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if after_separator {
                return arg;
            }
            match arg.to_str() {
                Some("--") => {
                    after_separator = true;
                    arg
                }
                Some("-ip") => OsString::from("--ip-address"),
                Some(s) if s.starts_with("-ip=") => {
                    OsString::from(format!("--ip-address={}", &s["-ip=".len()..]))
                }
                _ => arg,
            }
        })
        .collect()
}

/// clap's validation errors only point at `--help`; bad input also shows the usage line.
pub fn usage_error(err: &clap::Error) -> String {
    format!("{}\n{}\n", err.render().to_string().trim_end(), Cli::command().render_usage())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Some(Command::Configure { provider }) => configure(provider, config),
            None => self.show(config).await,
        }
    }

    /// Folds command-line overrides into the file config and picks the provider.
    pub fn apply_overrides(&self, config: &mut Config) -> Result<ProviderId, WeatherError> {
        let provider_id = match self.provider {
            Some(id) => id,
            None => config.default_provider_id()?,
        };

        if let Some(key) = self.api_key.as_ref().filter(|_| provider_id.requires_api_key()) {
            config.set_provider_api_key(provider_id, key.clone());
        }
        if let Some(units) = self.units {
            config.units = Some(units);
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = Some(secs);
        }

        Ok(provider_id)
    }

    async fn show(self, mut config: Config) -> anyhow::Result<()> {
        let provider_id = self.apply_overrides(&mut config)?;
        let request = WeatherRequest { ip: self.ip_address, units: config.units() };
        let pipeline =
            Pipeline::from_config(&config, provider_id)?.with_formatter(TextFormatter::colored());
        debug!("request {request:?} via {}", pipeline.provider_id());

        let mut stdout = io::stdout().lock();
        pipeline.run(&request, &mut stdout).await?;

        Ok(())
    }
}

fn configure(provider: ProviderId, mut config: Config) -> anyhow::Result<()> {
    println!("Configuring provider: {provider}");

    if provider.requires_api_key() {
        let api_key = Password::new(&format!("API key for {provider}:"))
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?;

        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(WeatherError::InvalidArgument("API key must not be empty".into()).into());
        }
        config.upsert_provider_api_key(provider, api_key.to_string());
    }

    let make_default = Confirm::new(&format!("Use {provider} by default?"))
        .with_default(true)
        .prompt()
        .context("Failed to read answer")?;
    if make_default {
        config.set_default_provider(provider);
    }

    let choices = vec![Units::Fahrenheit, Units::Celsius];
    let cursor = choices.iter().position(|u| *u == config.units()).unwrap_or(0);
    let units = Select::new("Units:", choices)
        .with_starting_cursor(cursor)
        .prompt()
        .context("Failed to read units")?;
    config.units = Some(units);

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}
