use anyhow::Result;
use contracts::shared::api::JsonRow;

use super::repository;
use crate::shared::data::db::SqlExecutor;
use crate::shared::data::schema;

/// Every entity row with whatever columns the deployed table has
pub async fn list_all(conn: &dyn SqlExecutor) -> Result<Vec<JsonRow>> {
    tracing::info!("A001 Entity: discovering columns of {}", repository::TABLE);
    let columns = schema::column_names(conn, repository::TABLE).await?;

    let rows = repository::list_with_columns(conn, &columns).await?;
    tracing::info!(
        "A001 Entity: {} rows with {} columns",
        rows.len(),
        columns.len()
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::testing::MockExecutor;
    use serde_json::json;

    #[tokio::test]
    async fn test_no_columns_is_an_error() {
        let conn = MockExecutor::empty();
        let err = list_all(&conn).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "La tabla ENT_MAEENTIDAD no tiene columnas disponibles"
        );
    }

    #[tokio::test]
    async fn test_rows_are_returned() {
        let conn = MockExecutor::empty()
            .on(
                "INFORMATION_SCHEMA.COLUMNS",
                vec![json!({"nombre": "EntNroId", "tipo": "int", "longitud": null, "nulo": "NO", "posicion": 1})],
            )
            .on("FROM ENT_MAEENTIDAD", vec![json!({"ENTNROID": 1}), json!({"ENTNROID": 2})]);

        let rows = list_all(&conn).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["ENTNROID"], 2);
    }
}
