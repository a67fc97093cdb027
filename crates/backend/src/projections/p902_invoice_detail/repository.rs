use anyhow::Result;
use contracts::projections::p902_invoice_detail::InvoiceKeys;
use contracts::shared::api::JsonRow;

use crate::shared::data::db::{SqlExecutor, SqlParam};

/// Lines of one invoice with header, sale-type and article columns
pub async fn get_invoice_lines(conn: &dyn SqlExecutor, keys: &InvoiceKeys) -> Result<Vec<JsonRow>> {
    let sql = r#"
        SELECT
            vf.CliNroId,
            vf.FaNroF1,
            vf.FaTipFa,
            vf.FaNroF2,
            vf.CVeNroId,
            vf.FaNombr,
            vf.FaDomic,
            vf.FaLocal,
            vf.FaTipIva,
            vf.FaCuit,
            vf.FaTotal,
            vf.FaNetGr,
            vf.FaDesct,
            vc.CVeDescr,
            vc.CVeSigno,
            vf1.DeNroId,
            vf1.ArtNroId,
            vf1.DeCanti,
            vf1.DePreUn,
            vf1.DeNetGr,
            vf1.DeImIva,
            vf1.DeTotal,
            vf1.DeArtDescr,
            vf1.DePorDes,
            art.ArtDescr,
            art.ArtCodigo,
            art.ArtBarra
        FROM VEN_FACTUR vf WITH (NOLOCK)
        INNER JOIN VEN_FACTUR1 vf1 WITH (NOLOCK)
            ON vf.FaNroF1 = vf1.FaNroF1
            AND vf.FaNroF2 = vf1.FaNroF2
            AND vf1.FaTipFa = vf.FaTipFa
            AND vf.CVeNroId = vf1.CVeNroId
        LEFT JOIN VEN_CODVTA vc WITH (NOLOCK) ON vf.CVeNroId = vc.CVeNroId
        LEFT JOIN ART_ARTICU art WITH (NOLOCK) ON vf1.ArtNroId = art.ArtNroId
        WHERE vf.CVeNroId = @P1 AND vf.FaTipFa = @P2 AND vf.FaNroF1 = @P3 AND vf.FaNroF2 = @P4
        ORDER BY vf1.DeNroId
    "#;

    let params = [
        SqlParam::from(keys.cve_nro_id),
        SqlParam::from(keys.fa_tip_fa.as_str()),
        SqlParam::from(keys.fa_nro_f1),
        SqlParam::from(keys.fa_nro_f2),
    ];
    Ok(conn.query(sql, &params).await?)
}
