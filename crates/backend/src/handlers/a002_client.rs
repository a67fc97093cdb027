use axum::{extract::State, Json};
use contracts::shared::api::{ApiResponse, JsonRow};

use crate::domain::a002_client;
use crate::shared::api_error::ApiError;
use crate::shared::app_state::AppState;

/// GET /api/clientes
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<JsonRow>>>, ApiError> {
    let conn = super::connection(&state, "A002 Client").await?;

    match a002_client::service::list(conn.as_ref()).await {
        Ok(rows) => Ok(Json(ApiResponse::list(rows))),
        Err(e) => {
            tracing::error!("A002 Client: Failed to list clients: {}", e);
            Err(e.into())
        }
    }
}
