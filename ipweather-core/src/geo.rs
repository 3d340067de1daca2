use std::{fmt::Debug, net::IpAddr};

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{Result, WeatherError},
    http::fetch_text,
    model::Location,
};

/// Maps an IP address to a location.
#[async_trait]
pub trait GeoLocator: Send + Sync + Debug {
    async fn locate(&self, ip: IpAddr) -> Result<Location>;
}

/// ip-api.com JSON endpoint. The free tier is plain HTTP only.
#[derive(Debug, Clone)]
pub struct IpApiLocator {
    base_url: String,
    http: Client,
}

impl IpApiLocator {
    const SERVICE: &'static str = "ip-api.com";
    const FIELDS: &'static str = "status,message,country,regionName,city,lat,lon";

    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, "http://ip-api.com/json")
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http }
    }
}

#[async_trait]
impl GeoLocator for IpApiLocator {
    async fn locate(&self, ip: IpAddr) -> Result<Location> {
        let url = format!("{}/{ip}", self.base_url.trim_end_matches('/'));
        let request = self.http.get(url).query(&[("fields", Self::FIELDS)]);

        let body = fetch_text(Self::SERVICE, request).await?;
        let location = parse_ip_api_response(ip, &body)?;

        debug!("{ip} is in {} ({}, {})", location.display_name(), location.latitude, location.longitude);
        Ok(location)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    #[serde(default)]
    country: String,
    #[serde(default)]
    region_name: String,
    #[serde(default)]
    city: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Decodes an ip-api.com body. `status: "fail"` means the provider could not resolve `ip`.
pub fn parse_ip_api_response(ip: IpAddr, body: &str) -> Result<Location> {
    let parsed: IpApiResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::data(IpApiLocator::SERVICE, e))?;

    if parsed.status != "success" {
        let reason = parsed.message.unwrap_or_else(|| format!("status '{}'", parsed.status));
        return Err(WeatherError::Lookup { ip, reason });
    }

    let (Some(latitude), Some(longitude)) = (parsed.lat, parsed.lon) else {
        return Err(WeatherError::data(IpApiLocator::SERVICE, "coordinates missing"));
    };

    Ok(Location {
        city: parsed.city,
        region: parsed.region_name,
        country: parsed.country,
        latitude,
        longitude,
    })
}
