use serde::{Deserialize, Serialize};

use super::api::JsonRow;

/// Row of `INFORMATION_SCHEMA.TABLES`, names upper-cased
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRef {
    #[serde(rename = "SchemaName")]
    pub schema_name: String,
    #[serde(rename = "TableName")]
    pub table_name: String,
}

/// Column description as shown by the structure endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub nombre: String,
    pub tipo: String,
    pub longitud: Option<i64>,
    pub nulo: String,
    #[serde(default)]
    pub posicion: Option<i64>,
}

/// GET /api/tablas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableListResponse {
    pub success: bool,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub tables: Vec<TableRef>,
}

/// GET /api/estructura-tablas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStructureResponse {
    pub success: bool,
    pub data: Vec<ColumnInfo>,
    pub count: usize,
    pub tabla: String,
}

/// GET /api/estructura-cct-deudas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtStructureResponse {
    pub success: bool,
    pub estructura: Vec<ColumnInfo>,
    pub muestra: Vec<JsonRow>,
    pub count: usize,
}
