use axum::{extract::State, Json};
use contracts::shared::api::{ApiResponse, JsonRow};

use crate::projections::p900_entity_totals::repository;
use crate::shared::api_error::ApiError;
use crate::shared::app_state::AppState;

/// GET /api/datos-totales
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<JsonRow>>>, ApiError> {
    let conn = super::connection(&state, "P900 Entity totals").await?;

    match repository::list_entity_totals(conn.as_ref()).await {
        Ok(rows) => Ok(Json(ApiResponse::list(rows))),
        Err(e) => {
            tracing::error!("P900 Entity totals: Failed to load totals: {}", e);
            Err(e.into())
        }
    }
}
