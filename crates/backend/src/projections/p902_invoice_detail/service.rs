use anyhow::{bail, Result};
use contracts::projections::p902_invoice_detail::{DetailTableStatus, InvoiceKeys};
use contracts::shared::api::JsonRow;
use serde_json::Value;

use super::repository;
use crate::shared::data::db::SqlExecutor;
use crate::shared::data::schema;
use crate::shared::pricing::{discount_net, signed};

/// Tables an invoice detail is read from
pub const INVOICE_TABLES: [&str; 4] = ["VEN_FACTUR", "VEN_FACTUR1", "VEN_CODVTA", "ART_ARTICU"];

fn number(row: &JsonRow, column: &str) -> Option<f64> {
    row.get(column).and_then(Value::as_f64)
}

/// Adds `NetoGravado` (header net with the sale-type sign) and
/// `NetoConDto` (line net after discount). Both stay null when the
/// underlying amount is null.
fn with_computed_amounts(mut row: JsonRow) -> JsonRow {
    let sign = number(&row, "CVeSigno").unwrap_or(1.0);
    let neto_gravado = number(&row, "FaNetGr").map(|net| signed(net, sign));
    let discount = number(&row, "DePorDes").unwrap_or(0.0);
    let neto_con_dto = number(&row, "DeNetGr").map(|net| discount_net(net, discount));

    row.insert("NetoGravado".to_string(), neto_gravado.into());
    row.insert("NetoConDto".to_string(), neto_con_dto.into());
    row
}

pub async fn get_invoice_detail(conn: &dyn SqlExecutor, keys: &InvoiceKeys) -> Result<Vec<JsonRow>> {
    tracing::info!(
        "P902 Invoice detail: {} {} {}-{}",
        keys.cve_nro_id,
        keys.fa_tip_fa,
        keys.fa_nro_f1,
        keys.fa_nro_f2
    );

    let rows = repository::get_invoice_lines(conn, keys).await?;
    tracing::info!("P902 Invoice detail: {} lines", rows.len());
    Ok(rows.into_iter().map(with_computed_amounts).collect())
}

/// Existence and columns of every invoice table; fails naming the
/// tables that are missing
pub async fn check_detail_tables(conn: &dyn SqlExecutor) -> Result<Vec<DetailTableStatus>> {
    let mut result = Vec::with_capacity(INVOICE_TABLES.len());
    for table in INVOICE_TABLES {
        let existe = schema::table_exists(conn, table).await?;
        let columnas = if existe {
            schema::table_columns(conn, table).await?
        } else {
            Vec::new()
        };
        tracing::info!(
            "P902 Invoice detail: {} {} ({} columns)",
            table,
            if existe { "present" } else { "missing" },
            columnas.len()
        );
        result.push(DetailTableStatus {
            tabla: table.to_string(),
            existe,
            columnas,
        });
    }

    let missing: Vec<&str> = result
        .iter()
        .filter(|s| !s.existe)
        .map(|s| s.tabla.as_str())
        .collect();
    if !missing.is_empty() {
        bail!(
            "Faltan tablas de detalle de factura: {}",
            missing.join(", ")
        );
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::SqlParam;
    use crate::shared::data::testing::MockExecutor;
    use serde_json::json;

    fn keys() -> InvoiceKeys {
        InvoiceKeys {
            cve_nro_id: 3,
            fa_tip_fa: "B".to_string(),
            fa_nro_f1: 2,
            fa_nro_f2: 1045,
        }
    }

    #[tokio::test]
    async fn test_computed_amounts() {
        let conn = MockExecutor::empty().on(
            "FROM VEN_FACTUR vf",
            vec![
                json!({"DeNroId": 1, "FaNetGr": 1000.0, "CVeSigno": -1, "DeNetGr": 100.0, "DePorDes": 10.0}),
                json!({"DeNroId": 2, "FaNetGr": 1000.0, "CVeSigno": null, "DeNetGr": 50.0, "DePorDes": null}),
                json!({"DeNroId": 3, "FaNetGr": null, "CVeSigno": 1, "DeNetGr": null, "DePorDes": 5.0}),
            ],
        );

        let rows = get_invoice_detail(&conn, &keys()).await.unwrap();

        assert_eq!(rows[0]["NetoGravado"], -1000.0);
        assert_eq!(rows[0]["NetoConDto"], 90.0);
        assert_eq!(rows[1]["NetoGravado"], 1000.0);
        assert_eq!(rows[1]["NetoConDto"], 50.0);
        assert!(rows[2]["NetoGravado"].is_null());
        assert!(rows[2]["NetoConDto"].is_null());

        let (_, params) = &conn.statements()[0];
        assert_eq!(
            params,
            &vec![
                SqlParam::Int(3),
                SqlParam::from("B"),
                SqlParam::Int(2),
                SqlParam::Int(1045)
            ]
        );
    }

    fn column_rows() -> Vec<serde_json::Value> {
        vec![json!({"nombre": "FaNroF1", "tipo": "int", "longitud": null, "nulo": "NO", "posicion": 1})]
    }

    #[tokio::test]
    async fn test_detail_tables_present() {
        let conn = MockExecutor::empty()
            .on(
                "INFORMATION_SCHEMA.TABLES",
                INVOICE_TABLES.iter().map(|t| json!({"TABLE_NAME": t})).collect(),
            )
            .on("INFORMATION_SCHEMA.COLUMNS", column_rows());

        let status = check_detail_tables(&conn).await.unwrap();

        assert_eq!(status.len(), 4);
        assert!(status.iter().all(|s| s.existe && s.columnas.len() == 1));
        assert_eq!(status[3].tabla, "ART_ARTICU");
    }

    #[tokio::test]
    async fn test_missing_detail_tables_are_named() {
        let conn = MockExecutor::empty()
            .on(
                "INFORMATION_SCHEMA.TABLES",
                vec![json!({"TABLE_NAME": "VEN_FACTUR"}), json!({"TABLE_NAME": "VEN_CODVTA"})],
            )
            .on("INFORMATION_SCHEMA.COLUMNS", column_rows());

        let err = check_detail_tables(&conn).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Faltan tablas de detalle de factura: VEN_FACTUR1, ART_ARTICU"
        );
    }
}
