use axum::{
    extract::{Query, State},
    Json,
};
use contracts::projections::p901_related_data::RelatedDataResponse;
use serde::Deserialize;

use super::{non_blank, parse_month, parse_year, period};
use crate::projections::p901_related_data::service;
use crate::shared::api_error::ApiError;
use crate::shared::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct RelatedDataQuery {
    pub id: Option<String>,
    pub mes: Option<String>,
    pub anio: Option<String>,
}

/// GET /api/datos-relacionados?id=42&mes=3&anio=2024
///
/// `mes` only narrows the dates when `anio` is present.
pub async fn get_related_data(
    State(state): State<AppState>,
    Query(query): Query<RelatedDataQuery>,
) -> Result<Json<RelatedDataResponse>, ApiError> {
    let raw_id = non_blank(&query.id).ok_or_else(|| ApiError::bad_request("ID de entidad requerido"))?;
    let id: i32 = raw_id
        .parse()
        .map_err(|_| ApiError::bad_request("ID de entidad debe ser un número válido"))?;

    let month = parse_month(&query.mes)?;
    let range = match parse_year(&query.anio)? {
        Some(year) => Some(period(month.unwrap_or(0), year)?),
        None => None,
    };

    let conn = super::connection(&state, "P901 Related data").await?;
    let data = service::get_related_data(conn.as_ref(), id, range).await;

    tracing::info!(
        "P901 Related data: id {} client={} provider={}",
        id,
        data.cliente.is_some(),
        data.proveedor.is_some()
    );

    Ok(Json(RelatedDataResponse {
        success: true,
        data,
        entidad_id: id,
    }))
}
