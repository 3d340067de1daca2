//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Public IP resolution and IP geolocation
//! - Abstraction over weather providers
//! - Shared domain models, the error type and the text formatter
//! - Configuration & credentials handling
//!
//! It is used by `ipweather-cli`, but the [`Pipeline`] can be driven by any binary.

pub mod config;
pub mod error;
pub mod format;
pub mod geo;
pub mod http;
pub mod ip;
pub mod model;
pub mod pipeline;
pub mod provider;

pub use config::{Config, ProviderConfig};
pub use error::{ErrorKind, WeatherError};
pub use format::TextFormatter;
pub use geo::{GeoLocator, IpApiLocator};
pub use ip::{HttpIpEcho, IpEcho, parse_ip, resolve_ip};
pub use model::{Location, Sky, Units, WeatherReport, WeatherRequest};
pub use pipeline::Pipeline;
pub use provider::{ProviderId, WeatherProvider};
