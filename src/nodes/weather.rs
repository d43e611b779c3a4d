/// Weather node: resolves `city` to coordinates, then publishes the current
/// temperature in °C under its single output field.

use super::{cancellable, not_prepared, require_present, require_str, single_output_field, NodeExecutor, NodeKind, NodeOutput};
use crate::error::EngineError;
use crate::integrations::{GeoLookup, TemperatureLookup};
use crate::workflow::types::ExecutionContext;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const EXECUTOR: &str = "weather-api";

/// Context field naming the city to look up.
pub const CITY_FIELD: &str = "city";

pub struct WeatherExecutor {
    geo: Arc<dyn GeoLookup>,
    temperature: Arc<dyn TemperatureLookup>,
    args: ExecutionContext,
    city: Option<String>,
    output_field: Option<String>,
}

impl WeatherExecutor {
    pub fn new(geo: Arc<dyn GeoLookup>, temperature: Arc<dyn TemperatureLookup>) -> Self {
        Self {
            geo,
            temperature,
            args: ExecutionContext::default(),
            city: None,
            output_field: None,
        }
    }
}

#[async_trait]
impl NodeExecutor for WeatherExecutor {
    fn kind(&self) -> NodeKind {
        NodeKind::WeatherApi
    }

    fn set_args(&mut self, args: ExecutionContext) {
        self.args = args;
    }

    fn validate_and_parse(&mut self, required_fields: &[String]) -> Result<(), EngineError> {
        for field in required_fields {
            require_present(EXECUTOR, &self.args, field)?;
        }

        let city = require_str(EXECUTOR, &self.args, CITY_FIELD)?.trim();
        if city.is_empty() {
            return Err(EngineError::validation(EXECUTOR, CITY_FIELD, "must not be empty"));
        }
        self.city = Some(city.to_string());
        Ok(())
    }

    fn set_output_fields(&mut self, fields: Vec<String>) -> Result<(), EngineError> {
        self.output_field = Some(single_output_field(EXECUTOR, fields)?);
        Ok(())
    }

    async fn execute(&self, cancel: &CancellationToken) -> Result<NodeOutput, EngineError> {
        let (Some(city), Some(field)) = (&self.city, &self.output_field) else {
            return Err(not_prepared(EXECUTOR));
        };

        let coordinates = cancellable(cancel, async {
            self.geo
                .coordinates(city)
                .await
                .map_err(|e| EngineError::integration("geocoding", e))
        })
        .await?;

        let celsius = cancellable(cancel, async {
            self.temperature
                .celsius(coordinates.latitude, coordinates.longitude)
                .await
                .map_err(|e| EngineError::integration("temperature", e))
        })
        .await?;

        tracing::info!("🌡️ {}: {}°C", city, celsius);

        let mut output = NodeOutput::new();
        output.insert(field.clone(), json!(celsius));
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::Coordinates;
    use anyhow::anyhow;

    struct FixedGeo;

    #[async_trait]
    impl GeoLookup for FixedGeo {
        async fn coordinates(&self, city: &str) -> anyhow::Result<Coordinates> {
            match city {
                "Sydney" => Ok(Coordinates { latitude: -33.87, longitude: 151.21 }),
                _ => Err(anyhow!("no city match for '{}'", city)),
            }
        }
    }

    struct FixedTemperature(Option<f64>);

    #[async_trait]
    impl TemperatureLookup for FixedTemperature {
        async fn celsius(&self, _latitude: f64, _longitude: f64) -> anyhow::Result<f64> {
            self.0.ok_or_else(|| anyhow!("service unavailable"))
        }
    }

    struct PendingTemperature;

    #[async_trait]
    impl TemperatureLookup for PendingTemperature {
        async fn celsius(&self, _latitude: f64, _longitude: f64) -> anyhow::Result<f64> {
            std::future::pending().await
        }
    }

    fn prepared(city: &str, temperature: Arc<dyn TemperatureLookup>) -> WeatherExecutor {
        let mut executor = WeatherExecutor::new(Arc::new(FixedGeo), temperature);
        executor.set_args(ExecutionContext::from_form(
            json!({ "city": city }).as_object().cloned().unwrap(),
        ));
        executor.validate_and_parse(&["city".to_string()]).unwrap();
        executor.set_output_fields(vec!["temperature".into()]).unwrap();
        executor
    }

    #[tokio::test]
    async fn publishes_temperature() {
        let executor = prepared("Sydney", Arc::new(FixedTemperature(Some(28.5))));
        let output = executor.execute(&CancellationToken::new()).await.unwrap();
        assert_eq!(output.get("temperature"), Some(&json!(28.5)));
    }

    #[tokio::test]
    async fn lookup_failures_are_integration_errors() {
        let unknown = prepared("Atlantis", Arc::new(FixedTemperature(Some(1.0))));
        let err = unknown.execute(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, EngineError::Integration { capability: "geocoding", .. }));

        let down = prepared("Sydney", Arc::new(FixedTemperature(None)));
        let err = down.execute(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, EngineError::Integration { capability: "temperature", .. }));
    }

    #[tokio::test]
    async fn cancellation_interrupts_a_pending_lookup() {
        let executor = prepared("Sydney", Arc::new(PendingTemperature));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = executor.execute(&cancel).await.unwrap_err();
        assert!(matches!(err, EngineError::Cancelled));
    }

    #[test]
    fn city_must_be_a_non_empty_string() {
        let mut executor = WeatherExecutor::new(Arc::new(FixedGeo), Arc::new(FixedTemperature(None)));
        executor.set_args(ExecutionContext::from_form(
            json!({ "city": "  " }).as_object().cloned().unwrap(),
        ));
        assert!(matches!(
            executor.validate_and_parse(&[]),
            Err(EngineError::Validation { field, .. }) if field == "city"
        ));

        executor.set_args(ExecutionContext::from_form(
            json!({ "city": 42 }).as_object().cloned().unwrap(),
        ));
        assert!(executor.validate_and_parse(&[]).is_err());
    }
}
