use std::future::Future;

use contracts::projections::p901_related_data::RelatedData;
use contracts::shared::api::JsonRow;
use contracts::shared::period::Period;

use super::repository;
use crate::shared::data::db::{DbError, SqlExecutor};

/// Rows of one section, or `None` when the query fails or finds nothing.
/// Some ledger tables are absent in deployed schemas, so a failure only
/// blanks its own section.
async fn section<F>(name: &str, id: i32, rows: F) -> Option<Vec<JsonRow>>
where
    F: Future<Output = Result<Vec<JsonRow>, DbError>>,
{
    match rows.await {
        Ok(rows) if rows.is_empty() => {
            tracing::debug!("P901 Related data: no {} for id {}", name, id);
            None
        }
        Ok(rows) => {
            tracing::info!("P901 Related data: {} {} for id {}", rows.len(), name, id);
            Some(rows)
        }
        Err(e) => {
            tracing::warn!("P901 Related data: {} unavailable for id {}: {}", name, id, e);
            None
        }
    }
}

fn first(rows: Option<Vec<JsonRow>>) -> Option<JsonRow> {
    rows.and_then(|rows| rows.into_iter().next())
}

/// Everything related to entity `id`; with a period, the dated sections
/// are limited to it
pub async fn get_related_data(
    conn: &dyn SqlExecutor,
    id: i32,
    period: Option<Period>,
) -> RelatedData {
    let period = period.as_ref();
    tracing::info!(
        "P901 Related data: loading id {} ({})",
        id,
        period.map(|p| p.label()).unwrap_or_else(|| "all dates".to_string())
    );

    RelatedData {
        entidad: first(section("entidad", id, repository::get_entity(conn, id)).await),
        cliente: first(section("cliente", id, repository::get_client(conn, id)).await),
        proveedor: first(section("proveedor", id, repository::get_provider(conn, id)).await),
        deuda: section("deuda", id, repository::get_debts(conn, id, period)).await,
        movimientos: section("movimientos", id, repository::get_movements(conn, id, period)).await,
        facturas: section("facturas", id, repository::get_invoices(conn, id, period)).await,
        movimientos_level1: section(
            "movimientosLevel1",
            id,
            repository::get_level1_movements(conn, id, period),
        )
        .await,
        movimientos_combinados: section(
            "movimientosCombinados",
            id,
            repository::get_combined_movements(conn, id, period),
        )
        .await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::testing::MockExecutor;
    use serde_json::json;

    #[tokio::test]
    async fn test_failing_sections_are_left_empty() {
        let conn = MockExecutor::empty()
            .fail_on(
                "CCT_MOVIMCCT_MOVIMLEVEL1",
                DbError::Query("Invalid object name 'CCT_MOVIMCCT_MOVIMLEVEL1'.".into()),
            )
            .on("FROM ENT_MAEENTIDAD", vec![json!({"Entnroid": 42, "Entnombr": "ACME"})])
            .on("FROM CLIE_MAECLIENTES WITH", vec![json!({"CliNroId": 42})])
            .on(
                "FROM VEN_FACTUR vf",
                vec![json!({"FactNroId": 1}), json!({"FactNroId": 2})],
            );

        let data = get_related_data(&conn, 42, None).await;

        assert_eq!(data.entidad.unwrap()["Entnombr"], "ACME");
        assert_eq!(data.cliente.unwrap()["CliNroId"], 42);
        assert!(data.proveedor.is_none());
        assert!(data.deuda.is_none());
        assert_eq!(data.facturas.unwrap().len(), 2);
        assert!(data.movimientos_level1.is_none());
        assert!(data.movimientos_combinados.is_none());
        assert_eq!(conn.statements().len(), 8);
    }

    #[tokio::test]
    async fn test_period_reaches_dated_sections_only() {
        let conn = MockExecutor::empty();
        let period = Period::whole_year(2023).unwrap();

        get_related_data(&conn, 7, Some(period)).await;

        let statements = conn.statements();
        let ranged = statements.iter().filter(|(_, params)| params.len() == 3).count();
        assert_eq!(ranged, 5);
        assert_eq!(statements[0].1.len(), 1);
    }
}
