use std::{io, net::IpAddr};

use reqwest::StatusCode;
use thiserror::Error;

/// Coarse classification of a [`WeatherError`], used by the binary to pick an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NetworkError,
    LookupError,
    DataError,
    OutputError,
}

/// Everything that can stop the pipeline.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("network error: could not reach {service}")]
    Network {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("network error: {service} answered with status {status}: {body}")]
    Status {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("network error: {service} did not return an address: '{payload}'")]
    NotAnAddress { service: &'static str, payload: String },

    #[error("lookup error: cannot locate {ip}: {reason}")]
    Lookup { ip: IpAddr, reason: String },

    #[error("data error: unexpected response from {service}: {reason}")]
    Data { service: &'static str, reason: String },

    #[error("cannot write report")]
    Output(#[from] io::Error),
}

impl WeatherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            WeatherError::Network { .. }
            | WeatherError::Status { .. }
            | WeatherError::NotAnAddress { .. } => ErrorKind::NetworkError,
            WeatherError::Lookup { .. } => ErrorKind::LookupError,
            WeatherError::Data { .. } => ErrorKind::DataError,
            WeatherError::Output(_) => ErrorKind::OutputError,
        }
    }

    pub(crate) fn network(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| WeatherError::Network { service, source }
    }

    pub(crate) fn data(service: &'static str, reason: impl ToString) -> Self {
        WeatherError::Data { service, reason: reason.to_string() }
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
