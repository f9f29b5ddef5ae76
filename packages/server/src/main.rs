//! Problem Admin HTTP Server Binary
//!
//! # Usage
//!
//! ```bash
//! # Defaults: port 3001, ~/.problem-admin/database/problems.db
//! cargo run --bin problem-admin-server
//!
//! # Custom port and database
//! PROBLEM_ADMIN_PORT=3002 PROBLEM_ADMIN_DB_PATH=/tmp/problems.db cargo run --bin problem-admin-server
//! ```
//!
//! # Environment Variables
//!
//! - `PROBLEM_ADMIN_PORT`: Server port (default: 3001)
//! - `PROBLEM_ADMIN_DB_PATH`: Database file path
//! - `CORS_ALLOW_ORIGIN`: Comma-separated allowed origins
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use problem_admin_server::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    tracing::info!("Problem Admin HTTP Server");
    tracing::info!("Port: {}", config.port);

    start_server(config).await
}
