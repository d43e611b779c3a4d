/// OpenStreetMap Nominatim geocoding client.

use super::{success_body, Coordinates, GeoLookup};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// One search hit; Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    addresstype: String,
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl GeoLookup for NominatimClient {
    async fn coordinates(&self, city: &str) -> Result<Coordinates> {
        tracing::debug!("🌍 Geocoding city '{}'", city);

        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[("q", city), ("format", "json")])
            .send()
            .await
            .context("geocoding request failed")?;

        let body = success_body(response, "geocoding").await?;
        parse_city(&body, city)
    }
}

/// Pick the first hit whose address type is `city`.
fn parse_city(body: &str, city: &str) -> Result<Coordinates> {
    let places: Vec<Place> = serde_json::from_str(body).context("invalid geocoding response")?;

    let place = places
        .into_iter()
        .find(|place| place.addresstype == "city")
        .ok_or_else(|| anyhow!("no city match for '{}'", city))?;

    let latitude = place
        .lat
        .parse::<f64>()
        .with_context(|| format!("invalid latitude '{}'", place.lat))?;
    let longitude = place
        .lon
        .parse::<f64>()
        .with_context(|| format!("invalid longitude '{}'", place.lon))?;

    Ok(Coordinates { latitude, longitude })
}
