use serde::{Deserialize, Serialize};

/// Sales statistics for one month (or a whole year when `mes == 0`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesStatistics {
    pub mes: u32,
    pub anio: i32,
    pub resumen_ventas: SalesSummary,
    pub articulos_mas_vendidos: Vec<TopArticle>,
    pub ventas_diarias: Vec<DailySales>,
    pub clientes_ranking: Vec<ClientRanking>,
    /// Present only when the schema check failed and the figures are zero-filled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostico: Option<Diagnostics>,
}

impl SalesStatistics {
    /// Well-formed, zero-filled statistics for a database that lacks
    /// some of the sales tables
    pub fn empty(mes: u32, anio: i32, missing_tables: Vec<String>) -> Self {
        Self {
            mes,
            anio,
            resumen_ventas: SalesSummary::default(),
            articulos_mas_vendidos: Vec::new(),
            ventas_diarias: Vec::new(),
            clientes_ranking: Vec::new(),
            diagnostico: Some(Diagnostics { missing_tables }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalesSummary {
    /// Number of invoices with a positive sale-type sign
    pub total_ventas: u64,
    /// Σ header total × sign
    pub total_facturacion: f64,
    /// Σ header net-taxed × sign
    pub total_facturacion_neto_gravado: f64,
    /// Mean header total over positive-sign invoices
    pub promedio_venta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopArticle {
    pub descripcion: String,
    pub codigo: String,
    pub cantidad_vendida: f64,
    pub total_ventas: f64,
    pub total_neto_gravado_con_descuento: f64,
    pub precio_unitario_ponderado: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DailySales {
    pub dia: u32,
    pub mes: u32,
    pub cantidad_ventas: u64,
    pub total_dia: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClientRanking {
    pub nombre_cliente: String,
    pub cliente_id: i64,
    pub total_facturado: f64,
    pub cantidad_facturas: u64,
    #[serde(rename = "productos")]
    pub productos: Vec<ClientProduct>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClientProduct {
    pub producto_descripcion: String,
    pub producto_codigo: String,
    pub cantidad_total: f64,
    pub precio_unitario: f64,
    pub porcentaje_descuento: f64,
    pub precio_unitario_neto_con_descuento: f64,
    pub total_neto_gravado: f64,
    pub total_neto_con_descuento: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub missing_tables: Vec<String>,
}
