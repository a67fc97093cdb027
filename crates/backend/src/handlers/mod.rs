pub mod a001_entity;
pub mod a002_client;
pub mod a003_provider;
pub mod d400_sales_statistics;
pub mod p900_entity_totals;
pub mod p901_related_data;
pub mod p902_invoice_detail;

use std::sync::Arc;

use contracts::shared::period::{Period, PeriodError};

use crate::shared::api_error::ApiError;
use crate::shared::app_state::AppState;
use crate::shared::data::db::SqlExecutor;

/// Connection for a handler; failures are logged under `context` and
/// answered with 500
pub(crate) async fn connection(
    state: &AppState,
    context: &str,
) -> Result<Arc<dyn SqlExecutor>, ApiError> {
    state.conn().await.map_err(|e| {
        tracing::error!("{}: no database connection: {}", context, e);
        ApiError::from(e)
    })
}

/// Query string value with surrounding blanks removed; blank is absent
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_or(value: &str, err: PeriodError) -> Result<i64, ApiError> {
    value
        .parse::<i64>()
        .map_err(|_| ApiError::bad_request(err.to_string()))
}

/// Validated `mes`, if given
pub(crate) fn parse_month(mes: &Option<String>) -> Result<Option<i64>, ApiError> {
    match non_blank(mes) {
        Some(raw) => {
            let month = parse_or(raw, PeriodError::InvalidMonth)?;
            if !(0..=12).contains(&month) {
                return Err(ApiError::bad_request(PeriodError::InvalidMonth.to_string()));
            }
            Ok(Some(month))
        }
        None => Ok(None),
    }
}

/// Validated `anio`, if given
pub(crate) fn parse_year(anio: &Option<String>) -> Result<Option<i64>, ApiError> {
    non_blank(anio)
        .map(|raw| parse_or(raw, PeriodError::InvalidYear))
        .transpose()
}

pub(crate) fn period(month: i64, year: i64) -> Result<Period, ApiError> {
    Period::new(month, year).map_err(|e| ApiError::bad_request(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn test_month_parsing() {
        assert_eq!(parse_month(&None).unwrap(), None);
        assert_eq!(parse_month(&some(" ")).unwrap(), None);
        assert_eq!(parse_month(&some("0")).unwrap(), Some(0));
        assert_eq!(parse_month(&some("12")).unwrap(), Some(12));
        assert_eq!(
            parse_month(&some("13")).unwrap_err().to_string(),
            "El mes debe estar entre 0 y 12 (0 para todo el año)"
        );
        assert!(parse_month(&some("marzo")).is_err());
    }

    #[test]
    fn test_year_range_checked_by_period() {
        let year = parse_year(&some("1999")).unwrap().unwrap();
        assert_eq!(
            period(1, year).unwrap_err().to_string(),
            "El año debe estar entre 2000 y 2100"
        );
        assert!(parse_year(&some("dos mil")).is_err());
    }
}
