#![allow(dead_code)]

use async_trait::async_trait;
use flowrunner::integrations::{Coordinates, GeoLookup, MailSender, TemperatureLookup};
use flowrunner::nodes::{Capabilities, ExecutorRegistry};
use flowrunner::runtime::ExecutionEngine;
use flowrunner::workflow::{MemoryWorkflowStore, Workflow, WorkflowRegistry};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};

pub const SYDNEY: Coordinates = Coordinates {
    latitude: -33.87,
    longitude: 151.21,
};

/// Geocoder that knows a single city.
pub struct StaticGeo;

#[async_trait]
impl GeoLookup for StaticGeo {
    async fn coordinates(&self, city: &str) -> anyhow::Result<Coordinates> {
        match city {
            "Sydney" => Ok(SYDNEY),
            other => anyhow::bail!("no city match for '{}'", other),
        }
    }
}

/// Temperature service returning a fixed reading, or failing when `None`.
pub struct StaticTemperature(pub Option<f64>);

#[async_trait]
impl TemperatureLookup for StaticTemperature {
    async fn celsius(&self, _latitude: f64, _longitude: f64) -> anyhow::Result<f64> {
        self.0.ok_or_else(|| anyhow::anyhow!("upstream returned 503"))
    }
}

/// Temperature service that never answers.
pub struct PendingTemperature;

#[async_trait]
impl TemperatureLookup for PendingTemperature {
    async fn celsius(&self, _latitude: f64, _longitude: f64) -> anyhow::Result<f64> {
        std::future::pending().await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailSender for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

pub fn capabilities(temperature: Arc<dyn TemperatureLookup>, mailer: Arc<RecordingMailer>) -> Capabilities {
    Capabilities {
        geo: Arc::new(StaticGeo),
        temperature,
        mailer,
    }
}

pub fn engine(workflows: Vec<Workflow>, capabilities: Capabilities) -> ExecutionEngine {
    let store = Arc::new(MemoryWorkflowStore::with_workflows(workflows));
    ExecutionEngine::new(
        Arc::new(WorkflowRegistry::new(store)),
        Arc::new(ExecutorRegistry::with_builtins(capabilities)),
    )
}

pub fn form_data(city: &str) -> Map<String, Value> {
    json!({ "name": "Alice", "email": "alice@example.com", "city": city })
        .as_object()
        .cloned()
        .unwrap()
}

/// The weather alert workflow as the editor stores it.
pub fn weather_workflow() -> Workflow {
    weather_workflow_with(25, "greater_than")
}

pub fn weather_workflow_with(threshold: impl Into<Value>, operator: &str) -> Workflow {
    let threshold: Value = threshold.into();
    serde_json::from_value(json!({
        "id": "weather-alert",
        "name": "Weather Alert",
        "nodes": [
            {
                "id": "start", "type": "start", "position": { "x": -160, "y": 300 },
                "data": { "label": "Start", "description": "Begin weather check workflow" }
            },
            {
                "id": "form", "type": "form", "position": { "x": 152, "y": 304 },
                "data": {
                    "label": "User Input",
                    "description": "Process collected data - name, email, location",
                    "metadata": {
                        "inputVariables": ["name", "email", "city"],
                        "outputVariables": ["name", "email", "city"]
                    }
                }
            },
            {
                "id": "weather-api", "type": "integration", "position": { "x": 460, "y": 304 },
                "data": {
                    "label": "Weather API",
                    "description": "Fetch current temperature for the city",
                    "metadata": {
                        "inputVariables": ["city"],
                        "outputVariables": ["temperature"]
                    }
                }
            },
            {
                "id": "condition", "type": "condition", "position": { "x": 794, "y": 304 },
                "data": {
                    "label": "Check Condition",
                    "description": "Evaluate temperature threshold",
                    "metadata": {
                        "inputVariables": ["temperature"],
                        "outputVariables": ["conditionMet"],
                        "conditionExpression": "{{temperature}} {{operator}} {{threshold}}",
                        "threshold": threshold,
                        "operator": operator
                    }
                }
            },
            {
                "id": "email", "type": "email", "position": { "x": 1096, "y": 88 },
                "data": {
                    "label": "Send Alert",
                    "description": "Email weather alert notification",
                    "metadata": {
                        "inputVariables": ["name", "city", "temperature"],
                        "outputVariables": ["emailSent"],
                        "emailTemplate": {
                            "subject": "Weather Alert",
                            "body": "Weather alert for {{city}}! Temperature is {{temperature}}°C!"
                        }
                    }
                }
            },
            {
                "id": "end", "type": "end", "position": { "x": 1360, "y": 302 },
                "data": { "label": "Complete", "description": "Workflow execution finished" }
            }
        ],
        "edges": [
            { "id": "e1", "source": "start", "target": "form", "type": "smoothstep", "animated": true },
            { "id": "e2", "source": "form", "target": "weather-api", "type": "smoothstep", "animated": true },
            { "id": "e3", "source": "weather-api", "target": "condition", "type": "smoothstep", "animated": true },
            { "id": "e4", "source": "condition", "target": "email", "sourceHandle": true, "label": "✓ Condition Met" },
            { "id": "e5", "source": "condition", "target": "end", "sourceHandle": false, "label": "✗ No Alert Needed" },
            { "id": "e6", "source": "email", "target": "end" }
        ]
    }))
    .unwrap()
}
