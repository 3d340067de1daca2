use std::{
    fmt::Debug,
    net::{IpAddr, Ipv4Addr},
};

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::{
    error::{Result, WeatherError},
    http::{fetch_text, truncate_body},
};

pub const DEFAULT_IP_ECHO_URL: &str = "https://api.ipify.org";

/// Parses an IPv4 (dotted quad) or IPv6 address.
pub fn parse_ip(input: &str) -> Result<IpAddr> {
    let trimmed = input.trim();
    if let Some(v4) = parse_dotted_quad(trimmed) {
        return Ok(IpAddr::V4(v4));
    }

    trimmed.parse::<IpAddr>().map_err(|_| {
        WeatherError::InvalidArgument(format!("'{trimmed}' is not a valid IPv4 or IPv6 address"))
    })
}

/// Four decimal octets of one to three digits; leading zeros are decimal, not octal.
fn parse_dotted_quad(s: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut parts = s.split('.');

    for octet in &mut octets {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse().ok()?;
    }

    match parts.next() {
        Some(_) => None,
        None => Some(Ipv4Addr::from(octets)),
    }
}

/// Reports the caller's public address.
#[async_trait]
pub trait IpEcho: Send + Sync + Debug {
    async fn public_ip(&self) -> Result<IpAddr>;
}

/// IP-echo service answering with the bare address as plain text.
#[derive(Debug, Clone)]
pub struct HttpIpEcho {
    url: String,
    http: Client,
}

impl HttpIpEcho {
    const SERVICE: &'static str = "the IP echo service";

    pub fn with_url(http: Client, url: impl Into<String>) -> Self {
        Self { url: url.into(), http }
    }
}

#[async_trait]
impl IpEcho for HttpIpEcho {
    async fn public_ip(&self) -> Result<IpAddr> {
        let body = fetch_text(Self::SERVICE, self.http.get(&self.url)).await?;
        parse_echo_payload(Self::SERVICE, &body)
    }
}

/// A payload that is not an address counts as a failed call, not as bad input.
fn parse_echo_payload(service: &'static str, body: &str) -> Result<IpAddr> {
    body.trim()
        .parse::<IpAddr>()
        .map_err(|_| WeatherError::NotAnAddress { service, payload: truncate_body(body) })
}

/// Returns the explicit address when given, otherwise asks `echo` once.
pub async fn resolve_ip(explicit: Option<IpAddr>, echo: &dyn IpEcho) -> Result<IpAddr> {
    match explicit {
        Some(ip) => {
            debug!("using explicit address {ip}");
            Ok(ip)
        }
        None => {
            let ip = echo.public_ip().await?;
            debug!("public address is {ip}");
            Ok(ip)
        }
    }
}
