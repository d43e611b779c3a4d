/// Configuration management for the flowrunner service
///
/// Handles server binding, the workflow database, outbound integrations, run
/// limits and CORS. Every value can be overridden with a `FLOWRUNNER_*` variable.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Geocoding/weather client settings
    pub integrations: IntegrationsConfig,
    /// Per-run limits
    pub execution: ExecutionConfig,
    pub cors: CorsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Workflow database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file holding workflow definitions
    pub path: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationsConfig {
    /// Nominatim base URL
    pub geocoding_url: String,
    /// Open-Meteo base URL
    pub weather_url: String,
    /// Nominatim rejects requests without an identifying User-Agent.
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// A run still going after this many seconds is cancelled.
    pub run_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; empty or `*` allows any origin.
    pub allowed_origins: Vec<String>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for k8s/container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env_or("FLOWRUNNER_HOST", "0.0.0.0"),
                port: env_parse("FLOWRUNNER_PORT", 8086),
            },
            database: DatabaseConfig {
                path: env_or("FLOWRUNNER_DATABASE_PATH", "data/workflows.db"),
                max_connections: env_parse("FLOWRUNNER_DATABASE_MAX_CONNECTIONS", 5),
            },
            integrations: IntegrationsConfig {
                geocoding_url: env_or("FLOWRUNNER_GEOCODING_URL", "https://nominatim.openstreetmap.org"),
                weather_url: env_or("FLOWRUNNER_WEATHER_URL", "https://api.open-meteo.com"),
                user_agent: env_or(
                    "FLOWRUNNER_USER_AGENT",
                    concat!("flowrunner/", env!("CARGO_PKG_VERSION")),
                ),
                request_timeout_secs: env_parse("FLOWRUNNER_HTTP_TIMEOUT_SECS", 10),
            },
            execution: ExecutionConfig {
                run_timeout_secs: env_parse("FLOWRUNNER_RUN_TIMEOUT_SECS", 30),
            },
            cors: CorsConfig {
                allowed_origins: env_or("FLOWRUNNER_CORS_ORIGINS", "*")
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect(),
            },
        }
    }
}
