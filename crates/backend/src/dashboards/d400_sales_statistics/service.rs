use anyhow::Result;
use contracts::dashboards::d400_sales_statistics::SalesStatistics;
use contracts::shared::period::Period;

use super::{aggregation, repository};
use crate::shared::data::db::SqlExecutor;
use crate::shared::data::schema;
use crate::shared::format::{format_currency_ars, format_percentage, format_quantity};

/// Tables the statistics are computed from
pub const REQUIRED_TABLES: [&str; 4] = ["VEN_FACTUR", "VEN_FACTUR1", "VEN_CODVTA", "ART_ARTICU"];

/// Sales statistics for `period`. A database lacking any of the sales
/// tables yields zero-filled statistics listing what is missing.
pub async fn get_sales_statistics(
    conn: &dyn SqlExecutor,
    period: Period,
    search: Option<&str>,
) -> Result<SalesStatistics> {
    tracing::info!("D400 Sales statistics: computing for {}", period.label());

    let missing = schema::missing_tables(conn, &REQUIRED_TABLES).await?;
    if !missing.is_empty() {
        tracing::warn!(
            "D400 Sales statistics: missing tables {:?}, returning empty statistics",
            missing
        );
        return Ok(SalesStatistics::empty(period.month(), period.year(), missing));
    }

    let invoices = repository::get_invoice_groups(conn, &period).await?;
    let lines = repository::get_line_groups(conn, &period).await?;
    tracing::debug!(
        "D400 Sales statistics: {} invoice groups, {} line groups fetched",
        invoices.len(),
        lines.len()
    );

    let stats = aggregation::build_statistics(period, &invoices, &lines, search);

    tracing::info!(
        "D400 Sales statistics: {} sales, billed {} (net {}), {} articles, {} clients",
        format_quantity(stats.resumen_ventas.total_ventas as f64),
        format_currency_ars(stats.resumen_ventas.total_facturacion),
        format_currency_ars(stats.resumen_ventas.total_facturacion_neto_gravado),
        stats.articulos_mas_vendidos.len(),
        stats.clientes_ranking.len()
    );

    let net = stats.resumen_ventas.total_facturacion_neto_gravado;
    if let Some(top) = stats.clientes_ranking.first().filter(|_| net > 0.0) {
        tracing::debug!(
            "D400 Sales statistics: top client {} holds {} of net billing",
            top.nombre_cliente,
            format_percentage(top.total_facturado / net * 100.0)
        );
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::{DbError, SqlParam};
    use crate::shared::data::testing::MockExecutor;
    use serde_json::json;

    fn all_tables() -> Vec<serde_json::Value> {
        REQUIRED_TABLES
            .iter()
            .map(|t| json!({ "TABLE_NAME": t }))
            .collect()
    }

    /// One sale on the 4th and one credit note on the 9th
    fn invoice_groups(client_id: serde_json::Value) -> Vec<serde_json::Value> {
        vec![
            json!({
                "CliNroId": client_id, "FaNombr": "ACME", "Mes": 3, "Dia": 4, "EsVenta": 1,
                "Facturas": 1, "TotalBruto": 121.0, "Total": 121.0, "NetoGravado": 100.0
            }),
            json!({
                "CliNroId": client_id, "FaNombr": "ACME", "Mes": 3, "Dia": 9, "EsVenta": 0,
                "Facturas": 1, "TotalBruto": 12.1, "Total": -12.1, "NetoGravado": -10.0
            }),
        ]
    }

    /// Four units at 25 with a 10% discount
    fn line_group(client_id: serde_json::Value) -> serde_json::Value {
        json!({
            "CliNroId": client_id, "FaNombr": "ACME", "ArtNroId": 10,
            "Descripcion": "TORNILLO", "Codigo": "T-10", "Positiva": 1, "Lineas": 1,
            "CantidadBruta": 4.0, "Cantidad": 4.0, "Total": 121.0,
            "NetoGravado": 100.0, "NetoConDescuento": 90.0,
            "PrecioPorCantidad": 100.0, "PrecioNetoPorCantidad": 90.0, "SumaDescuentos": 10.0
        })
    }

    #[tokio::test]
    async fn test_missing_article_table_degrades_to_empty() {
        let conn = MockExecutor::empty().on(
            "INFORMATION_SCHEMA.TABLES",
            vec![
                json!({"TABLE_NAME": "VEN_FACTUR"}),
                json!({"TABLE_NAME": "VEN_FACTUR1"}),
                json!({"TABLE_NAME": "VEN_CODVTA"}),
            ],
        );
        let period = Period::new(3, 2024).unwrap();

        let stats = get_sales_statistics(&conn, period, None).await.unwrap();

        assert_eq!(stats.resumen_ventas.total_ventas, 0);
        assert_eq!(
            stats.diagnostico.unwrap().missing_tables,
            vec!["ART_ARTICU".to_string()]
        );
        assert_eq!(conn.statements().len(), 1);
    }

    #[tokio::test]
    async fn test_statistics_from_rows() {
        let conn = MockExecutor::empty()
            .on("INFORMATION_SCHEMA.TABLES", all_tables())
            .on(
                "INNER JOIN VEN_FACTUR1",
                vec![line_group(json!(7))],
            )
            .on("FROM VEN_FACTUR vf", invoice_groups(json!(7)));
        let period = Period::new(3, 2024).unwrap();

        let stats = get_sales_statistics(&conn, period, None).await.unwrap();

        assert!(stats.diagnostico.is_none());
        assert_eq!(stats.resumen_ventas.total_ventas, 1);
        assert!((stats.resumen_ventas.total_facturacion - 108.9).abs() < 1e-9);
        assert_eq!(stats.articulos_mas_vendidos[0].total_neto_gravado_con_descuento, 90.0);
        assert_eq!(stats.ventas_diarias.len(), 2);
        assert_eq!(stats.clientes_ranking[0].cliente_id, 7);

        let statements = conn.statements();
        let (sql, params) = &statements[1];
        assert!(sql.contains("GROUP BY"));
        assert_eq!(params[0], SqlParam::from("20240301"));
        assert_eq!(params[1], SqlParam::from("20240401"));
        assert!(statements[2].0.contains("GROUP BY"));
    }

    #[tokio::test]
    async fn test_numeric_client_ids_are_accepted() {
        let conn = MockExecutor::empty()
            .on("INFORMATION_SCHEMA.TABLES", all_tables())
            .on("INNER JOIN VEN_FACTUR1", vec![line_group(json!(7.0))])
            .on("FROM VEN_FACTUR vf", invoice_groups(json!(7.0)));
        let period = Period::new(3, 2024).unwrap();

        let stats = get_sales_statistics(&conn, period, None).await.unwrap();

        assert_eq!(stats.clientes_ranking.len(), 1);
        assert_eq!(stats.clientes_ranking[0].cliente_id, 7);
        assert_eq!(stats.clientes_ranking[0].productos.len(), 1);
    }

    #[tokio::test]
    async fn test_query_failure_is_an_error() {
        let conn = MockExecutor::empty()
            .on("INFORMATION_SCHEMA.TABLES", all_tables())
            .fail_on("FROM VEN_FACTUR vf", DbError::Query("Invalid column name 'FaNetGr'.".into()));

        let result = get_sales_statistics(&conn, Period::whole_year(2024).unwrap(), None).await;

        assert_eq!(result.unwrap_err().to_string(), "Invalid column name 'FaNetGr'.");
    }
}
