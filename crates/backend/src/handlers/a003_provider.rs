use axum::{extract::State, Json};
use contracts::shared::api::{ApiResponse, JsonRow};

use crate::domain::a003_provider;
use crate::shared::api_error::ApiError;
use crate::shared::app_state::AppState;

/// GET /api/proveedores
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<JsonRow>>>, ApiError> {
    let conn = super::connection(&state, "A003 Provider").await?;

    match a003_provider::service::list(conn.as_ref()).await {
        Ok(rows) => Ok(Json(ApiResponse::list(rows))),
        Err(e) => {
            tracing::error!("A003 Provider: Failed to list providers: {}", e);
            Err(e.into())
        }
    }
}
