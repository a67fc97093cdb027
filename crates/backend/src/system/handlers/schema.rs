use axum::{
    extract::{Query, State},
    Json,
};
use contracts::shared::schema::{DebtStructureResponse, TableListResponse, TableStructureResponse};
use serde::Deserialize;

use crate::handlers::{connection, non_blank};
use crate::shared::api_error::ApiError;
use crate::shared::app_state::AppState;
use crate::shared::data::schema;

#[derive(Debug, Deserialize)]
pub struct TablesQuery {
    pub prefix: Option<String>,
}

/// GET /api/tablas?prefix=VEN
pub async fn list_tables(
    State(state): State<AppState>,
    Query(query): Query<TablesQuery>,
) -> Result<Json<TableListResponse>, ApiError> {
    let prefix = non_blank(&query.prefix);
    let conn = connection(&state, "[SCHEMA]").await?;

    match schema::list_tables(conn.as_ref(), prefix).await {
        Ok(tables) => {
            tracing::info!("[SCHEMA] {} tables (prefix {:?})", tables.len(), prefix);
            Ok(Json(TableListResponse {
                success: true,
                count: tables.len(),
                prefix: prefix.map(str::to_string),
                tables,
            }))
        }
        Err(e) => {
            tracing::error!("[SCHEMA] Failed to list tables: {}", e);
            Err(e.into())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TableStructureQuery {
    pub tabla: Option<String>,
}

/// GET /api/estructura-tablas?tabla=VEN_FACTUR
pub async fn table_structure(
    State(state): State<AppState>,
    Query(query): Query<TableStructureQuery>,
) -> Result<Json<TableStructureResponse>, ApiError> {
    let tabla = non_blank(&query.tabla)
        .ok_or_else(|| ApiError::bad_request("Nombre de tabla requerido"))?
        .to_string();
    let conn = connection(&state, "[SCHEMA]").await?;

    match schema::table_columns(conn.as_ref(), &tabla).await {
        Ok(columns) => Ok(Json(TableStructureResponse {
            success: true,
            count: columns.len(),
            data: columns,
            tabla,
        })),
        Err(e) => {
            tracing::error!("[SCHEMA] Failed to describe {}: {}", tabla, e);
            Err(e.into())
        }
    }
}

/// GET /api/estructura-cct-deudas
pub async fn debt_structure(
    State(state): State<AppState>,
) -> Result<Json<DebtStructureResponse>, ApiError> {
    let conn = connection(&state, "[SCHEMA]").await?;

    let estructura = schema::table_columns(conn.as_ref(), "CCT_Deudas")
        .await
        .map_err(|e| {
            tracing::error!("[SCHEMA] Failed to describe CCT_Deudas: {}", e);
            ApiError::from(e)
        })?;
    let muestra = conn
        .query("SELECT TOP 3 * FROM CCT_Deudas WITH (NOLOCK)", &[])
        .await
        .map_err(|e| {
            tracing::error!("[SCHEMA] Failed to sample CCT_Deudas: {}", e);
            ApiError::from(e)
        })?;

    tracing::info!("[SCHEMA] CCT_Deudas: {} columns", estructura.len());
    Ok(Json(DebtStructureResponse {
        success: true,
        count: estructura.len(),
        estructura,
        muestra,
    }))
}
