use serde::{Deserialize, Serialize};

use crate::shared::api::JsonRow;
use crate::shared::schema::ColumnInfo;

/// Composite key of a sales invoice (VEN_FACTUR)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceKeys {
    #[serde(rename = "CVeNroId")]
    pub cve_nro_id: i32,
    #[serde(rename = "FaTipFa")]
    pub fa_tip_fa: String,
    #[serde(rename = "FaNroF1")]
    pub fa_nro_f1: i32,
    #[serde(rename = "FaNroF2")]
    pub fa_nro_f2: i32,
}

/// GET /api/factura/{id}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetailResponse {
    pub success: bool,
    pub data: Vec<JsonRow>,
    pub count: usize,
    pub factura_keys: InvoiceKeys,
}

/// Existence and layout of one invoice-detail table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailTableStatus {
    pub tabla: String,
    pub existe: bool,
    pub columnas: Vec<ColumnInfo>,
}

/// POST /api/detalle-factura
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailTablesResponse {
    pub success: bool,
    pub message: String,
    pub resultado: Vec<DetailTableStatus>,
}
