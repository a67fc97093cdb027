#![allow(
    clippy::type_complexity,
    clippy::too_many_arguments,
    clippy::derivable_impls
)]

pub mod dashboards;
pub mod domain;
pub mod handlers;
pub mod projections;
pub mod routes;
pub mod shared;
pub mod system;

use std::sync::Arc;

use crate::shared::app_state::AppState;
use crate::shared::config::{load_config, DbSettings};
use crate::shared::data::db::ConnectionManager;
use crate::shared::data::mssql::{MssqlConnector, MssqlConnectorFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use tokio::net::TcpListener;

    // .env is optional; real environment variables take precedence
    dotenvy::dotenv().ok();

    system::tracing::initialize()?;

    let config = load_config()?;

    let settings = match DbSettings::from_env(&config.database) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e);
        }
    };
    tracing::info!("[DB] Target: {}", settings.target());

    // The first request opens the connection
    let db = Arc::new(ConnectionManager::new(Arc::new(MssqlConnector::new(settings))));
    let state = AppState::new(db, Arc::new(MssqlConnectorFactory));

    let app = routes::configure_routes(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    config.server.port
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
