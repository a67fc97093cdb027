//! Schema inspection over `INFORMATION_SCHEMA`.
//!
//! Table names are compared case-insensitively; deployed databases mix
//! `CCT_Deudas` and `CCT_DEUDAS` style spellings.

use contracts::shared::schema::{ColumnInfo, TableRef};

use super::db::{decode_rows, DbError, SqlExecutor, SqlParam};

/// All base tables and views, names upper-cased, optionally filtered by a
/// case-insensitive name prefix
pub async fn list_tables(
    conn: &dyn SqlExecutor,
    prefix: Option<&str>,
) -> Result<Vec<TableRef>, DbError> {
    let mut sql = String::from(
        "SELECT UPPER(TABLE_SCHEMA) AS SchemaName, UPPER(TABLE_NAME) AS TableName \
         FROM INFORMATION_SCHEMA.TABLES",
    );
    let mut params = Vec::new();
    if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
        sql.push_str(" WHERE UPPER(TABLE_NAME) LIKE UPPER(@P1) + '%'");
        params.push(SqlParam::from(prefix));
    }
    sql.push_str(" ORDER BY TABLE_SCHEMA, TABLE_NAME");

    decode_rows(conn.query(&sql, &params).await?)
}

/// Columns of `table` in ordinal order
pub async fn table_columns(conn: &dyn SqlExecutor, table: &str) -> Result<Vec<ColumnInfo>, DbError> {
    let rows = conn
        .query(
            "SELECT COLUMN_NAME AS nombre, DATA_TYPE AS tipo, \
             CHARACTER_MAXIMUM_LENGTH AS longitud, IS_NULLABLE AS nulo, \
             ORDINAL_POSITION AS posicion \
             FROM INFORMATION_SCHEMA.COLUMNS \
             WHERE UPPER(TABLE_NAME) = UPPER(@P1) \
             ORDER BY ORDINAL_POSITION",
            &[SqlParam::from(table)],
        )
        .await?;

    decode_rows(rows)
}

pub async fn column_names(conn: &dyn SqlExecutor, table: &str) -> Result<Vec<String>, DbError> {
    Ok(table_columns(conn, table)
        .await?
        .into_iter()
        .map(|c| c.nombre)
        .collect())
}

pub async fn table_exists(conn: &dyn SqlExecutor, table: &str) -> Result<bool, DbError> {
    Ok(missing_tables(conn, &[table]).await?.is_empty())
}

/// Create `table` with `ddl` unless it already exists; true when created
pub async fn ensure_table(conn: &dyn SqlExecutor, table: &str, ddl: &str) -> Result<bool, DbError> {
    if table_exists(conn, table).await? {
        return Ok(false);
    }
    tracing::warn!("[SCHEMA] Table {} not found, creating it", table);
    conn.execute(ddl, &[]).await?;
    tracing::info!("[SCHEMA] Table {} created", table);
    Ok(true)
}

/// Names from `required` that do not exist, in the order given
pub async fn missing_tables(
    conn: &dyn SqlExecutor,
    required: &[&str],
) -> Result<Vec<String>, DbError> {
    if required.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders: Vec<String> = (1..=required.len()).map(|i| format!("@P{}", i)).collect();
    let sql = format!(
        "SELECT UPPER(TABLE_NAME) AS TABLE_NAME FROM INFORMATION_SCHEMA.TABLES \
         WHERE UPPER(TABLE_NAME) IN ({})",
        placeholders.join(", ")
    );
    let params: Vec<SqlParam> = required
        .iter()
        .map(|t| SqlParam::from(t.to_uppercase()))
        .collect();

    let existing: Vec<String> = conn
        .query(&sql, &params)
        .await?
        .into_iter()
        .filter_map(|row| {
            row.get("TABLE_NAME")
                .and_then(|v| v.as_str())
                .map(|s| s.to_uppercase())
        })
        .collect();

    Ok(required
        .iter()
        .filter(|t| !existing.contains(&t.to_uppercase()))
        .map(|t| t.to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::testing::MockExecutor;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_tables_keeps_requested_order() {
        let conn = MockExecutor::empty().on(
            "INFORMATION_SCHEMA.TABLES",
            vec![json!({"TABLE_NAME": "VEN_FACTUR"}), json!({"TABLE_NAME": "VEN_CODVTA"})],
        );

        let missing = missing_tables(&conn, &["VEN_FACTUR", "VEN_FACTUR1", "VEN_CODVTA", "ART_ARTICU"])
            .await
            .unwrap();

        assert_eq!(missing, vec!["VEN_FACTUR1", "ART_ARTICU"]);
        let (sql, params) = &conn.statements()[0];
        assert!(sql.contains("IN (@P1, @P2, @P3, @P4)"));
        assert_eq!(params[3], SqlParam::Text("ART_ARTICU".into()));
    }

    #[tokio::test]
    async fn test_table_exists_is_case_insensitive() {
        let conn = MockExecutor::empty().on(
            "INFORMATION_SCHEMA.TABLES",
            vec![json!({"TABLE_NAME": "CCT_DEUDAS"})],
        );
        assert!(table_exists(&conn, "CCT_Deudas").await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_table_creates_only_when_absent() {
        let absent = MockExecutor::empty();
        assert!(ensure_table(&absent, "PROV_MAEPROV", "CREATE TABLE PROV_MAEPROV (ProNroId INT)")
            .await
            .unwrap());
        assert!(absent.statements()[1].0.starts_with("CREATE TABLE PROV_MAEPROV"));

        let present = MockExecutor::empty().on(
            "INFORMATION_SCHEMA.TABLES",
            vec![json!({"TABLE_NAME": "PROV_MAEPROV"})],
        );
        assert!(!ensure_table(&present, "PROV_MAEPROV", "CREATE TABLE PROV_MAEPROV (ProNroId INT)")
            .await
            .unwrap());
        assert_eq!(present.statements().len(), 1);
    }

    #[tokio::test]
    async fn test_list_tables_binds_prefix() {
        let conn = MockExecutor::empty().on(
            "INFORMATION_SCHEMA.TABLES",
            vec![json!({"SchemaName": "DBO", "TableName": "VEN_FACTUR"})],
        );

        let tables = list_tables(&conn, Some("ven")).await.unwrap();

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].table_name, "VEN_FACTUR");
        let (sql, params) = &conn.statements()[0];
        assert!(sql.contains("LIKE UPPER(@P1)"));
        assert_eq!(params, &vec![SqlParam::Text("ven".into())]);
    }

    #[tokio::test]
    async fn test_table_columns_parses_rows() {
        let conn = MockExecutor::empty().on(
            "INFORMATION_SCHEMA.COLUMNS",
            vec![
                json!({"nombre": "DeuNroId", "tipo": "int", "longitud": null, "nulo": "NO", "posicion": 1}),
                json!({"nombre": "DeuTipfa", "tipo": "char", "longitud": 1, "nulo": "YES", "posicion": 2}),
            ],
        );

        let columns = table_columns(&conn, "CCT_Deudas").await.unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[1].longitud, Some(1));
        assert_eq!(
            column_names(&conn, "CCT_Deudas").await.unwrap(),
            vec!["DeuNroId", "DeuTipfa"]
        );
    }
}
