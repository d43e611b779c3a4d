/// Engine error taxonomy
///
/// Every failure the core can surface maps onto one [`ErrorCategory`]; the HTTP
/// layer only ever exposes the category name, never the error text.

use serde::Serialize;
use thiserror::Error;

/// Errors produced while loading, configuring or executing a workflow.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A workflow, node or executor kind could not be found.
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    /// A required field is missing or has the wrong type, or an operator is unknown.
    #[error("{executor}: validation failed for '{field}': {reason}")]
    Validation {
        executor: &'static str,
        field: String,
        reason: String,
    },

    /// The node declares an unusable set of output fields.
    #[error("{executor}: {message}")]
    Configuration {
        executor: &'static str,
        message: String,
    },

    /// Placeholder resolution or boolean expression evaluation failed.
    #[error("expression error: {0}")]
    Expression(String),

    /// An external capability call failed.
    #[error("{capability} failed: {source}")]
    Integration {
        capability: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The caller cancelled the run or its deadline passed.
    #[error("execution cancelled")]
    Cancelled,

    /// The workflow store failed for a reason other than a missing id.
    #[error("storage error: {0}")]
    Storage(#[source] anyhow::Error),
}

/// Coarse error class, safe to show to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    NotFound,
    Validation,
    Configuration,
    Expression,
    Integration,
    Cancellation,
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Configuration => "configuration",
            Self::Expression => "expression",
            Self::Integration => "integration",
            Self::Cancellation => "cancellation",
            Self::Internal => "internal",
        }
    }
}

impl EngineError {
    pub fn not_found(what: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            id: id.into(),
        }
    }

    pub fn validation(
        executor: &'static str,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            executor,
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(executor: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            executor,
            message: message.into(),
        }
    }

    pub fn integration(capability: &'static str, source: anyhow::Error) -> Self {
        Self::Integration { capability, source }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Expression(_) => ErrorCategory::Expression,
            Self::Integration { .. } => ErrorCategory::Integration,
            Self::Cancelled => ErrorCategory::Cancellation,
            Self::Storage(_) => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_variants() {
        assert_eq!(
            EngineError::not_found("workflow", "wf-1").category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            EngineError::validation("form", "city", "missing").category(),
            ErrorCategory::Validation
        );
        assert_eq!(EngineError::Cancelled.category(), ErrorCategory::Cancellation);
        assert_eq!(
            EngineError::Storage(anyhow::anyhow!("disk full")).category(),
            ErrorCategory::Internal
        );
    }

    #[test]
    fn integration_error_keeps_its_cause() {
        let err = EngineError::integration("geocoding", anyhow::anyhow!("timeout"));
        assert_eq!(err.to_string(), "geocoding failed: timeout");
        assert!(std::error::Error::source(&err).is_some());
    }
}
