//! Period queries for the sales statistics.
//!
//! Both queries sign amounts in a derived table (`amount × CVeSigno`,
//! missing sign = 1) and group on the server, so the row count follows
//! the number of clients, days and articles rather than invoice volume.

use anyhow::Result;
use contracts::shared::period::Period;
use serde::Deserialize;

use crate::shared::data::db::{decode_rows, deserialize_integral_id, SqlExecutor, SqlParam};

/// Invoice headers of one client on one day, sales and credit notes
/// grouped apart
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceGroupRow {
    #[serde(rename = "CliNroId", default, deserialize_with = "deserialize_integral_id")]
    pub client_id: Option<i64>,
    #[serde(rename = "FaNombr")]
    pub client_name: Option<String>,
    #[serde(rename = "Mes")]
    pub month: u32,
    #[serde(rename = "Dia")]
    pub day: u32,
    /// 1 when the sale-type sign is positive
    #[serde(rename = "EsVenta")]
    pub sale: i32,
    #[serde(rename = "Facturas")]
    pub invoices: u64,
    /// Σ header total, unsigned
    #[serde(rename = "TotalBruto")]
    pub raw_total: f64,
    #[serde(rename = "Total")]
    pub total: f64,
    #[serde(rename = "NetoGravado")]
    pub net_taxed: f64,
}

/// Invoice lines of one client for one article. Lines with a positive
/// quantity are grouped apart from zero and negative ones.
#[derive(Debug, Clone, Deserialize)]
pub struct LineGroupRow {
    #[serde(rename = "CliNroId", default, deserialize_with = "deserialize_integral_id")]
    pub client_id: Option<i64>,
    #[serde(rename = "FaNombr")]
    pub client_name: Option<String>,
    #[serde(rename = "ArtNroId")]
    pub article_id: i64,
    #[serde(rename = "Descripcion")]
    pub description: String,
    #[serde(rename = "Codigo")]
    pub code: String,
    #[serde(rename = "Positiva")]
    pub positive: i32,
    #[serde(rename = "Lineas")]
    pub lines: u32,
    /// Σ quantity, unsigned
    #[serde(rename = "CantidadBruta")]
    pub raw_quantity: f64,
    #[serde(rename = "Cantidad")]
    pub quantity: f64,
    #[serde(rename = "Total")]
    pub total: f64,
    #[serde(rename = "NetoGravado")]
    pub net_taxed: f64,
    #[serde(rename = "NetoConDescuento")]
    pub net_with_discount: f64,
    /// Σ unit price × unsigned quantity
    #[serde(rename = "PrecioPorCantidad")]
    pub price_x_qty: f64,
    /// Σ discounted unit price × unsigned quantity
    #[serde(rename = "PrecioNetoPorCantidad")]
    pub net_price_x_qty: f64,
    #[serde(rename = "SumaDescuentos")]
    pub discount_sum: f64,
}

fn period_params(period: &Period) -> Vec<SqlParam> {
    let (from, to) = period.sql_bounds();
    vec![SqlParam::from(from), SqlParam::from(to)]
}

/// Invoice headers dated inside the period, per client and day
pub async fn get_invoice_groups(
    conn: &dyn SqlExecutor,
    period: &Period,
) -> Result<Vec<InvoiceGroupRow>> {
    let sql = r#"
        SELECT
            s.CliNroId,
            s.FaNombr,
            s.Mes,
            s.Dia,
            s.EsVenta,
            COUNT(*) AS Facturas,
            SUM(s.FaTotal) AS TotalBruto,
            SUM(s.FaTotal * s.Sign) AS Total,
            SUM(s.FaNetGr * s.Sign) AS NetoGravado
        FROM (
            SELECT
                CAST(vf.CliNroId AS INT) AS CliNroId,
                vf.FaNombr,
                MONTH(vf.FaFecha) AS Mes,
                DAY(vf.FaFecha) AS Dia,
                CAST(ISNULL(vf.FaTotal, 0) AS FLOAT) AS FaTotal,
                CAST(ISNULL(vf.FaNetGr, 0) AS FLOAT) AS FaNetGr,
                CAST(ISNULL(vc.CVeSigno, 1) AS FLOAT) AS Sign,
                CASE WHEN ISNULL(vc.CVeSigno, 1) > 0 THEN 1 ELSE 0 END AS EsVenta
            FROM VEN_FACTUR vf WITH (NOLOCK)
            LEFT JOIN VEN_CODVTA vc WITH (NOLOCK) ON vf.CVeNroId = vc.CVeNroId
            WHERE vf.FaFecha >= @P1 AND vf.FaFecha < @P2
        ) s
        GROUP BY s.CliNroId, s.FaNombr, s.Mes, s.Dia, s.EsVenta
    "#;

    let rows = conn.query(sql, &period_params(period)).await?;
    Ok(decode_rows(rows)?)
}

/// Invoice lines of the headers dated inside the period, per client and
/// article. Discounts use the same arithmetic as `pricing::discount_net`.
pub async fn get_line_groups(conn: &dyn SqlExecutor, period: &Period) -> Result<Vec<LineGroupRow>> {
    let sql = r#"
        SELECT
            l.CliNroId,
            l.FaNombr,
            l.ArtNroId,
            l.Descripcion,
            l.Codigo,
            l.Positiva,
            COUNT(*) AS Lineas,
            SUM(l.DeCanti) AS CantidadBruta,
            SUM(l.DeCanti * l.Sign) AS Cantidad,
            SUM(l.DeTotal * l.Sign) AS Total,
            SUM(l.DeNetGr * l.Sign) AS NetoGravado,
            SUM((l.DeNetGr - l.DePorDes * l.DeNetGr / 100.0) * l.Sign) AS NetoConDescuento,
            SUM(l.DePreUn * l.DeCanti) AS PrecioPorCantidad,
            SUM((l.DePreUn - l.DePorDes * l.DePreUn / 100.0) * l.DeCanti) AS PrecioNetoPorCantidad,
            SUM(l.DePorDes) AS SumaDescuentos
        FROM (
            SELECT
                CAST(vf.CliNroId AS INT) AS CliNroId,
                vf.FaNombr,
                CAST(ISNULL(vf1.ArtNroId, 0) AS INT) AS ArtNroId,
                ISNULL(RTRIM(art.ArtDescr), ISNULL(RTRIM(vf1.DeArtDescr), 'Producto sin descripción')) AS Descripcion,
                ISNULL(RTRIM(art.ArtCodigo), '') AS Codigo,
                CASE WHEN ISNULL(vf1.DeCanti, 0) > 0 THEN 1 ELSE 0 END AS Positiva,
                CAST(ISNULL(vf1.DeCanti, 0) AS FLOAT) AS DeCanti,
                CAST(ISNULL(vf1.DePreUn, 0) AS FLOAT) AS DePreUn,
                CAST(ISNULL(vf1.DePorDes, 0) AS FLOAT) AS DePorDes,
                CAST(ISNULL(vf1.DeNetGr, 0) AS FLOAT) AS DeNetGr,
                CAST(ISNULL(vf1.DeTotal, 0) AS FLOAT) AS DeTotal,
                CAST(ISNULL(vc.CVeSigno, 1) AS FLOAT) AS Sign
            FROM VEN_FACTUR vf WITH (NOLOCK)
            INNER JOIN VEN_FACTUR1 vf1 WITH (NOLOCK)
                ON vf.FaNroF1 = vf1.FaNroF1
                AND vf.FaNroF2 = vf1.FaNroF2
                AND vf.FaTipFa = vf1.FaTipFa
                AND vf.CVeNroId = vf1.CVeNroId
            LEFT JOIN VEN_CODVTA vc WITH (NOLOCK) ON vf.CVeNroId = vc.CVeNroId
            LEFT JOIN ART_ARTICU art WITH (NOLOCK) ON vf1.ArtNroId = art.ArtNroId
            WHERE vf.FaFecha >= @P1 AND vf.FaFecha < @P2
        ) l
        GROUP BY l.CliNroId, l.FaNombr, l.ArtNroId, l.Descripcion, l.Codigo, l.Positiva
    "#;

    let rows = conn.query(sql, &period_params(period)).await?;
    Ok(decode_rows(rows)?)
}
