use anyhow::Result;
use contracts::shared::api::JsonRow;

use crate::shared::data::db::SqlExecutor;

/// Every entity with its debt totals (amount, balance, count) and
/// movement totals (absolute amount, count); entities without debts or
/// movements carry zeros.
pub async fn list_entity_totals(conn: &dyn SqlExecutor) -> Result<Vec<JsonRow>> {
    let sql = r#"
        SELECT
            e.Entnroid,
            ISNULL(CAST(e.Entnombr AS NVARCHAR(100)), '') AS Entnombr,
            ISNULL(CAST(e.Entemail AS NVARCHAR(100)), '') AS Entemail,
            ISNULL(CAST(e.EntRazSoc AS NVARCHAR(100)), '') AS EntRazSoc,
            ISNULL(CAST(e.EntTelef AS NVARCHAR(100)), '') AS EntTelef,
            CAST(ISNULL(d.TotalDeudas, 0) AS FLOAT) AS TotalDeudas,
            CAST(ISNULL(d.SaldoTotal, 0) AS FLOAT) AS SaldoTotal,
            ISNULL(d.CantidadDeudas, 0) AS CantidadDeudas,
            CAST(ISNULL(m.TotalMovimientos, 0) AS FLOAT) AS TotalMovimientos,
            ISNULL(m.CantidadMovimientos, 0) AS CantidadMovimientos
        FROM ENT_MAEENTIDAD e WITH (NOLOCK)
        LEFT JOIN (
            SELECT
                EntNroId,
                SUM(DeuImpor) AS TotalDeudas,
                SUM(DeuSaldo) AS SaldoTotal,
                COUNT(*) AS CantidadDeudas
            FROM CCT_Deudas WITH (NOLOCK)
            GROUP BY EntNroId
        ) d ON e.Entnroid = d.EntNroId
        LEFT JOIN (
            SELECT
                EntNroId,
                SUM(ABS(MovImpor)) AS TotalMovimientos,
                COUNT(*) AS CantidadMovimientos
            FROM CCT_MOVIM WITH (NOLOCK)
            GROUP BY EntNroId
        ) m ON e.Entnroid = m.EntNroId
        WHERE e.Entnroid IS NOT NULL
        ORDER BY e.Entnroid
    "#;

    let rows = conn.query(sql, &[]).await?;
    tracing::info!("P900 Entity totals: {} rows", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::DbError;
    use crate::shared::data::testing::MockExecutor;
    use serde_json::json;

    #[tokio::test]
    async fn test_rows_pass_through() {
        let conn = MockExecutor::empty().on(
            "FROM ENT_MAEENTIDAD e",
            vec![json!({"Entnroid": 7, "TotalDeudas": 1500.5, "CantidadDeudas": 2})],
        );

        let rows = list_entity_totals(&conn).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["TotalDeudas"], 1500.5);
        assert!(conn.statements()[0].0.contains("SUM(ABS(MovImpor))"));
    }

    #[tokio::test]
    async fn test_query_error_propagates() {
        let conn = MockExecutor::empty().fail_on(
            "FROM ENT_MAEENTIDAD e",
            DbError::Query("Invalid object name 'CCT_MOVIM'.".into()),
        );

        let err = list_entity_totals(&conn).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid object name 'CCT_MOVIM'.");
    }
}
