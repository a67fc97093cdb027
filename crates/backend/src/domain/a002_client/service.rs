use anyhow::Result;
use contracts::shared::api::JsonRow;

use super::repository;
use crate::shared::data::db::SqlExecutor;
use crate::shared::data::schema;

/// First page of clients; creates the client table on databases that lack it
pub async fn list(conn: &dyn SqlExecutor) -> Result<Vec<JsonRow>> {
    tracing::info!("A002 Client: checking table {}", repository::TABLE);
    schema::ensure_table(conn, repository::TABLE, repository::CREATE_TABLE).await?;

    let rows = repository::list_first_page(conn).await?;
    tracing::info!("A002 Client: {} rows", rows.len());
    Ok(rows)
}
