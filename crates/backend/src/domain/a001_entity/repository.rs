use anyhow::Result;
use contracts::shared::api::JsonRow;

use crate::shared::data::db::SqlExecutor;

pub const TABLE: &str = "ENT_MAEENTIDAD";

/// `[name]` with embedded `]` doubled
fn quote_ident(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// SELECT over every discovered column, aliased to its upper-cased name,
/// ordered by `EntNroId` when present (any casing) or the first column
pub fn build_select(columns: &[String]) -> Option<String> {
    let first = columns.first()?;
    let order_by = columns
        .iter()
        .find(|c| c.eq_ignore_ascii_case("entnroid"))
        .unwrap_or(first);

    let select_list = columns
        .iter()
        .map(|c| format!("{} AS {}", quote_ident(c), quote_ident(&c.to_uppercase())))
        .collect::<Vec<_>>()
        .join(",\n            ");

    Some(format!(
        "SELECT\n            {}\n        FROM {} WITH (NOLOCK)\n        ORDER BY {}",
        select_list,
        TABLE,
        quote_ident(order_by)
    ))
}

pub async fn list_with_columns(conn: &dyn SqlExecutor, columns: &[String]) -> Result<Vec<JsonRow>> {
    let sql = build_select(columns)
        .ok_or_else(|| anyhow::anyhow!("La tabla {} no tiene columnas disponibles", TABLE))?;
    Ok(conn.query(&sql, &[]).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_orders_by_entity_id() {
        let columns = vec!["Entnombr".to_string(), "Entnroid".to_string()];
        let sql = build_select(&columns).unwrap();

        assert!(sql.contains("[Entnombr] AS [ENTNOMBR]"));
        assert!(sql.contains("[Entnroid] AS [ENTNROID]"));
        assert!(sql.ends_with("ORDER BY [Entnroid]"));
    }

    #[test]
    fn test_select_falls_back_to_first_column() {
        let columns = vec!["Codigo".to_string(), "Odd]Name".to_string()];
        let sql = build_select(&columns).unwrap();

        assert!(sql.contains("[Odd]]Name] AS [ODD]]NAME]"));
        assert!(sql.ends_with("ORDER BY [Codigo]"));
        assert!(build_select(&[]).is_none());
    }
}
