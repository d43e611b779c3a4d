/// Executor registry
///
/// Immutable map from [`NodeKind`] to a factory producing a fresh executor per
/// node visit. Built once at startup and shared by every run.

use super::condition::ConditionExecutor;
use super::email::EmailExecutor;
use super::form::FormExecutor;
use super::weather::WeatherExecutor;
use super::{NodeExecutor, NodeKind};
use crate::error::EngineError;
use crate::integrations::{GeoLookup, MailSender, TemperatureLookup};
use crate::workflow::types::Node;
use std::collections::HashMap;
use std::sync::Arc;

pub type ExecutorFactory = Arc<dyn Fn() -> Box<dyn NodeExecutor> + Send + Sync>;

/// External capabilities handed to the built-in executors.
#[derive(Clone)]
pub struct Capabilities {
    pub geo: Arc<dyn GeoLookup>,
    pub temperature: Arc<dyn TemperatureLookup>,
    pub mailer: Arc<dyn MailSender>,
}

#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    factories: HashMap<NodeKind, ExecutorFactory>,
}

impl ExecutorRegistry {
    /// Registry with the four built-in kinds wired to `capabilities`.
    pub fn with_builtins(capabilities: Capabilities) -> Self {
        let Capabilities { geo, temperature, mailer } = capabilities;

        Self::default()
            .register(NodeKind::Form, Arc::new(|| -> Box<dyn NodeExecutor> { Box::new(FormExecutor::new()) }))
            .register(NodeKind::Condition, Arc::new(|| -> Box<dyn NodeExecutor> { Box::new(ConditionExecutor::new()) }))
            .register(
                NodeKind::WeatherApi,
                Arc::new(move || -> Box<dyn NodeExecutor> {
                    Box::new(WeatherExecutor::new(geo.clone(), temperature.clone()))
                }),
            )
            .register(
                NodeKind::Email,
                Arc::new(move || -> Box<dyn NodeExecutor> { Box::new(EmailExecutor::new(mailer.clone())) }),
            )
    }

    /// Add or replace the factory for `kind`.
    pub fn register(mut self, kind: NodeKind, factory: ExecutorFactory) -> Self {
        self.factories.insert(kind, factory);
        self
    }

    pub fn create(&self, kind: NodeKind) -> Option<Box<dyn NodeExecutor>> {
        self.factories.get(&kind).map(|factory| factory())
    }

    /// Fresh executor for `node`, looked up by its type and then by its id.
    pub fn resolve(&self, node: &Node) -> Result<Box<dyn NodeExecutor>, EngineError> {
        NodeKind::candidates(node)
            .find_map(|kind| self.create(kind))
            .ok_or_else(|| EngineError::not_found("executor", format!("{} ({})", node.kind, node.id)))
    }

    pub fn kinds(&self) -> Vec<NodeKind> {
        let mut kinds: Vec<NodeKind> = self.factories.keys().copied().collect();
        kinds.sort_by_key(|kind| kind.as_str());
        kinds
    }
}

impl std::fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
