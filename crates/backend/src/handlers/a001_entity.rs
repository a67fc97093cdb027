use axum::{extract::State, Json};
use contracts::shared::api::{ApiResponse, JsonRow};

use crate::domain::a001_entity;
use crate::shared::api_error::ApiError;
use crate::shared::app_state::AppState;

/// GET /api/datos
pub async fn list_all(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<JsonRow>>>, ApiError> {
    let conn = super::connection(&state, "A001 Entity").await?;

    match a001_entity::service::list_all(conn.as_ref()).await {
        Ok(rows) => Ok(Json(ApiResponse::list(rows))),
        Err(e) => {
            tracing::error!("A001 Entity: Failed to list entities: {}", e);
            Err(e.into())
        }
    }
}
