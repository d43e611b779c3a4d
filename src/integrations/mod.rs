/// External capabilities used by node executors
///
/// Executors depend only on the traits below. The reqwest-backed clients talk to
/// OpenStreetMap Nominatim and Open-Meteo; mail delivery is a logging no-op.

pub mod mailer;
pub mod openmeteo;
pub mod openstreetmap;

pub use mailer::NoopMailer;
pub use openmeteo::OpenMeteoClient;
pub use openstreetmap::NominatimClient;

use crate::config::IntegrationsConfig;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// City name → coordinates
#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn coordinates(&self, city: &str) -> Result<Coordinates>;
}

/// Coordinates → current air temperature in °C
#[async_trait]
pub trait TemperatureLookup: Send + Sync {
    async fn celsius(&self, latitude: f64, longitude: f64) -> Result<f64>;
}

/// Outbound notification mail
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Shared HTTP client for all outbound integrations.
pub fn http_client(config: &IntegrationsConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;
    Ok(client)
}

/// Read a response body, turning non-2xx statuses into errors that carry the body text.
pub(crate) async fn success_body(response: reqwest::Response, what: &str) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        anyhow::bail!("{} request failed with status {}: {}", what, status, body);
    }
    Ok(body)
}
