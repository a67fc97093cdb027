use axum::{
    extract::{Query, State},
    Json,
};
use contracts::dashboards::d400_sales_statistics::SalesStatistics;
use contracts::shared::period::Period;
use serde::Deserialize;

use super::{non_blank, parse_month, parse_year, period};
use crate::dashboards::d400_sales_statistics::service;
use crate::shared::api_error::ApiError;
use crate::shared::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct SalesStatisticsQuery {
    pub mes: Option<String>,
    pub anio: Option<String>,
    pub search: Option<String>,
}

/// GET /api/estadisticas-ventas?mes=3&anio=2024&search=acme
///
/// Missing `mes`/`anio` default to the current month; `mes=0` is the whole year.
pub async fn get_sales_statistics(
    State(state): State<AppState>,
    Query(query): Query<SalesStatisticsQuery>,
) -> Result<Json<SalesStatistics>, ApiError> {
    let current = Period::current();
    let month = parse_month(&query.mes)?.unwrap_or(current.month() as i64);
    let year = parse_year(&query.anio)?.unwrap_or(current.year() as i64);
    let period = period(month, year)?;
    let search = non_blank(&query.search);

    tracing::info!(
        "D400 Sales statistics: request for {} (search: {:?})",
        period.label(),
        search
    );

    let conn = super::connection(&state, "D400 Sales statistics").await?;
    match service::get_sales_statistics(conn.as_ref(), period, search).await {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => {
            tracing::error!("D400 Sales statistics: Failed for {}: {}", period.label(), e);
            Err(e.into())
        }
    }
}
