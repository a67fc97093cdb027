use axum::{
    extract::{Path, Query, State},
    Json,
};
use contracts::projections::p902_invoice_detail::{
    DetailTablesResponse, InvoiceDetailResponse, InvoiceKeys,
};
use serde::Deserialize;
use serde_json::json;

use super::non_blank;
use crate::projections::p902_invoice_detail::service;
use crate::shared::api_error::ApiError;
use crate::shared::app_state::AppState;

const MISSING_KEYS: &str = "Faltan parámetros requeridos: cveNroId, faTipFa, faNroF1, faNroF2";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetailQuery {
    pub cve_nro_id: Option<String>,
    pub fa_tip_fa: Option<String>,
    pub fa_nro_f1: Option<String>,
    pub fa_nro_f2: Option<String>,
}

impl InvoiceDetailQuery {
    /// All four keys, numeric ones non-zero; unparsable numbers count as 0
    fn keys(&self) -> Option<InvoiceKeys> {
        let number = |v: &Option<String>| {
            non_blank(v)
                .and_then(|s| s.parse::<i32>().ok())
                .filter(|n| *n != 0)
        };
        Some(InvoiceKeys {
            cve_nro_id: number(&self.cve_nro_id)?,
            fa_tip_fa: non_blank(&self.fa_tip_fa)?.to_string(),
            fa_nro_f1: number(&self.fa_nro_f1)?,
            fa_nro_f2: number(&self.fa_nro_f2)?,
        })
    }
}

/// GET /api/factura/:id?cveNroId=3&faTipFa=B&faNroF1=2&faNroF2=1045
///
/// The invoice is identified by the query keys; the path id is only
/// part of the URL shape.
pub async fn get_invoice_detail(
    State(state): State<AppState>,
    Path(_id): Path<String>,
    Query(query): Query<InvoiceDetailQuery>,
) -> Result<Json<InvoiceDetailResponse>, ApiError> {
    let keys = query.keys().ok_or_else(|| ApiError::bad_request(MISSING_KEYS))?;

    let conn = super::connection(&state, "P902 Invoice detail").await?;
    match service::get_invoice_detail(conn.as_ref(), &keys).await {
        Ok(rows) => Ok(Json(InvoiceDetailResponse {
            success: true,
            count: rows.len(),
            data: rows,
            factura_keys: keys,
        })),
        Err(e) => {
            tracing::error!("P902 Invoice detail: Failed to load detail: {}", e);
            Err(e.into())
        }
    }
}

/// POST /api/detalle-factura
pub async fn check_detail_tables(
    State(state): State<AppState>,
) -> Result<Json<DetailTablesResponse>, ApiError> {
    let conn = super::connection(&state, "P902 Invoice detail").await?;
    match service::check_detail_tables(conn.as_ref()).await {
        Ok(resultado) => Ok(Json(DetailTablesResponse {
            success: true,
            message: "Tablas de detalle de factura verificadas".to_string(),
            resultado,
        })),
        Err(e) => {
            tracing::error!("P902 Invoice detail: table check failed: {}", e);
            Err(e.into())
        }
    }
}

/// GET /api/detalle-factura
pub async fn detail_tables_usage() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Endpoint para verificar las tablas de detalle de factura",
        "instructions": "Usar método POST para verificar las tablas"
    }))
}
