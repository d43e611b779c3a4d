/// Open-Meteo current-conditions client.

use super::{success_body, TemperatureLookup};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Forecast {
    current: Current,
}

#[derive(Debug, Deserialize)]
struct Current {
    temperature_2m: f64,
}

#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TemperatureLookup for OpenMeteoClient {
    async fn celsius(&self, latitude: f64, longitude: f64) -> Result<f64> {
        tracing::debug!("🌡️ Fetching temperature at ({}, {})", latitude, longitude);

        let response = self
            .http
            .get(format!("{}/v1/forecast", self.base_url))
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", "temperature_2m".to_string()),
            ])
            .send()
            .await
            .context("temperature request failed")?;

        let body = success_body(response, "temperature").await?;
        parse_temperature(&body)
    }
}

fn parse_temperature(body: &str) -> Result<f64> {
    let forecast: Forecast = serde_json::from_str(body).context("invalid forecast response")?;
    Ok(forecast.current.temperature_2m)
}
