use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use contracts::system::connection_test::{ConnectionTestRequest, ConnectionTestResponse, ServerInfo};

use crate::shared::api_error::ApiError;
use crate::shared::app_state::AppState;
use crate::shared::config::DbSettings;

const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for a throw-away test connection; `None` when a field is
/// missing or the port is not a number
fn test_settings(request: &ConnectionTestRequest) -> Option<DbSettings> {
    let field = |v: &Option<String>| {
        v.as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    };

    Some(DbSettings {
        server: field(&request.server)?.trim().to_string(),
        user: field(&request.user)?,
        password: field(&request.password)?,
        database: field(&request.database)?.trim().to_string(),
        port: request.port.as_ref()?.as_port()?,
        instance: field(&request.instance).map(|i| i.trim().to_string()),
        connect_timeout: TEST_TIMEOUT,
        request_timeout: TEST_TIMEOUT,
    })
}

/// POST /api/test-connection
///
/// Opens a separate connection with the submitted credentials and runs
/// `SELECT 1`. The configured connection is not touched. A body that is
/// not JSON is answered like one with missing fields.
pub async fn test_connection(
    State(state): State<AppState>,
    payload: Result<Json<ConnectionTestRequest>, JsonRejection>,
) -> Result<Json<ConnectionTestResponse>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!("[DB] Connection test: unreadable body: {}", rejection.body_text());
            return Err(ApiError::bad_request("Todos los campos son requeridos"));
        }
    };
    let settings = test_settings(&request)
        .ok_or_else(|| ApiError::bad_request("Todos los campos son requeridos"))?;

    let server = match &settings.instance {
        Some(instance) => format!("{}\\{}", settings.server, instance),
        None => settings.server.clone(),
    };
    let server_info = ServerInfo {
        server,
        database: settings.database.clone(),
        port: settings.port,
    };

    tracing::info!("[DB] Testing connection to {}", settings.target());
    let connector = state.connectors.connector(settings);

    let outcome = match connector.connect().await {
        Ok(conn) => conn.query("SELECT 1 AS test", &[]).await.map(|_| ()),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => {
            tracing::info!("[DB] Connection test to {} succeeded", connector.describe());
            Ok(Json(ConnectionTestResponse {
                success: true,
                message: "Conexión exitosa a la base de datos".to_string(),
                server_info,
            }))
        }
        Err(e) => {
            tracing::warn!("[DB] Connection test to {} failed: {}", connector.describe(), e);
            Err(ApiError::bad_request(e.friendly_message()))
        }
    }
}
