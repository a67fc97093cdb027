use anyhow::Result;
use contracts::shared::api::JsonRow;

use super::repository;
use crate::shared::data::db::SqlExecutor;
use crate::shared::data::schema;

pub async fn list(conn: &dyn SqlExecutor) -> Result<Vec<JsonRow>> {
    tracing::info!("A003 Provider: checking table {}", repository::TABLE);
    if schema::ensure_table(conn, repository::TABLE, repository::CREATE_TABLE).await? {
        tracing::info!("A003 Provider: created empty {}", repository::TABLE);
    }

    let rows = repository::list_first_page(conn).await?;
    tracing::info!("A003 Provider: {} rows", rows.len());
    Ok(rows)
}
