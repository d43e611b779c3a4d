/// Server setup and initialization
///
/// Wires together all components: storage, workflow registry, executors,
/// execution engine and HTTP routes.

use crate::{
    api::workflows::{create_workflow_routes, AppState},
    config::{Config, CorsConfig},
    integrations::{self, NominatimClient, NoopMailer, OpenMeteoClient},
    nodes::{Capabilities, ExecutorRegistry},
    runtime::engine::ExecutionEngine,
    workflow::{registry::WorkflowRegistry, storage::WorkflowStorage},
};
use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::{path::Path, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Open (creating if needed) the SQLite database holding workflow definitions.
pub async fn connect_database(config: &Config) -> Result<SqlitePool> {
    let db_path = Path::new(&config.database.path);
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create data directory '{}': {}", parent.display(), e))?;
    }

    tracing::info!("🗄️ Opening workflow database: {}", db_path.display());
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Build the shared application state from a ready database pool.
pub async fn create_state(config: &Config, pool: SqlitePool, capabilities: Capabilities) -> Result<AppState> {
    tracing::info!("📋 Initializing workflow storage");
    let storage = WorkflowStorage::new(pool);
    storage
        .init_schema()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize workflow schema: {}", e))?;

    tracing::info!("📊 Initializing workflow registry");
    let registry = Arc::new(WorkflowRegistry::new(Arc::new(storage.clone())));

    let executors = Arc::new(ExecutorRegistry::with_builtins(capabilities));
    tracing::info!("⚙️ Registered executors: {:?}", executors.kinds());

    tracing::info!("🚀 Initializing execution engine");
    let engine = Arc::new(ExecutionEngine::new(Arc::clone(&registry), executors));

    Ok(AppState {
        storage,
        registry,
        engine,
        run_timeout: Duration::from_secs(config.execution.run_timeout_secs),
    })
}

/// Assemble the router around an application state.
pub fn create_router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        // Workflow management and execution routes
        .merge(create_workflow_routes().with_state(state))
        .layer(cors_layer(cors))
        .layer(TraceLayer::new_for_http())
}

/// Create the main Axum application with all routes and middleware
///
/// Connects the database and builds the live geocoding, weather and mail clients.
pub async fn create_app(config: Config) -> Result<Router> {
    let pool = connect_database(&config).await?;

    tracing::info!("🌐 Building integration clients");
    let http = integrations::http_client(&config.integrations)?;
    let capabilities = Capabilities {
        geo: Arc::new(NominatimClient::new(http.clone(), &config.integrations.geocoding_url)),
        temperature: Arc::new(OpenMeteoClient::new(http, &config.integrations.weather_url)),
        mailer: Arc::new(NoopMailer),
    };

    let state = create_state(&config, pool, capabilities).await?;

    tracing::info!("📡 Creating HTTP router with all endpoints");
    let app = create_router(state, &config.cors);

    tracing::info!("✅ Application initialized successfully");
    Ok(app)
}

/// Start the HTTP server with the given configuration
///
/// Creates the application and starts the Axum server on the configured address and port.
pub async fn start_server(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting flowrunner server...");

    let app = create_app(config.clone()).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let any_origin = config.allowed_origins.is_empty()
        || config.allowed_origins.iter().any(|origin| origin == "*");

    let origins = if any_origin {
        AllowOrigin::any()
    } else {
        let values: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
