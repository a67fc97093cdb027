use serde::{Deserialize, Serialize};

use crate::shared::api::JsonRow;

/// Everything known about one entity id across the master, debt,
/// ledger and sales tables. Sections with no rows serialize as `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedData {
    pub entidad: Option<JsonRow>,
    pub cliente: Option<JsonRow>,
    pub proveedor: Option<JsonRow>,
    pub deuda: Option<Vec<JsonRow>>,
    pub movimientos: Option<Vec<JsonRow>>,
    pub facturas: Option<Vec<JsonRow>>,
    #[serde(rename = "movimientosLevel1")]
    pub movimientos_level1: Option<Vec<JsonRow>>,
    pub movimientos_combinados: Option<Vec<JsonRow>>,
}

/// GET /api/datos-relacionados
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedDataResponse {
    pub success: bool,
    pub data: RelatedData,
    pub entidad_id: i32,
}
