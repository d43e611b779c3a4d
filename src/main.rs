/// flowrunner: workflow graph execution service
///
/// Main entry point. Loads configuration from the environment and starts the
/// HTTP server.

use flowrunner::{config::Config, server::start_server};

/// Application entry point
///
/// The server provides:
/// - Workflow management API at /api/workflows/*
/// - Workflow execution at POST /api/workflows/{id}/execute
/// - Health check at /healthz
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
