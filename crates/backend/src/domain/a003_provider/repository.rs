use anyhow::Result;
use contracts::shared::api::JsonRow;

use crate::shared::data::db::SqlExecutor;

pub const TABLE: &str = "PROV_MAEPROV";

/// Layout used when the deployed database has no provider table
pub const CREATE_TABLE: &str = r#"
    CREATE TABLE PROV_MAEPROV (
        ProNroId INT IDENTITY(1,1) PRIMARY KEY,
        ProContac NVARCHAR(100) NULL,
        ProOrdPag NVARCHAR(100) NULL,
        ProRubCon NVARCHAR(100) NULL,
        IvPNroId INT NULL,
        ZoFNroId INT NULL,
        ProNroCai NVARCHAR(100) NULL,
        ProVtoCai NVARCHAR(100) NULL,
        ProObser NVARCHAR(500) NULL,
        ProEstad NVARCHAR(50) NULL,
        ProFeEst DATETIME NULL,
        ProUslog NVARCHAR(50) NULL,
        ProFeLog DATETIME NULL,
        ProRubConPago NVARCHAR(100) NULL,
        msrepl_tran_version UNIQUEIDENTIFIER NULL,
        ProDocIdeVen NVARCHAR(100) NULL,
        ProConFis NVARCHAR(100) NULL,
        ProTipComAfi NVARCHAR(100) NULL
    )
"#;

pub async fn list_first_page(conn: &dyn SqlExecutor) -> Result<Vec<JsonRow>> {
    let sql = r#"
        SELECT TOP 100
            CAST(ProNroId AS INT) AS id,
            ISNULL(CAST(ProContac AS NVARCHAR(100)), 'Sin nombre') AS nombre,
            ISNULL(CAST(ProObser AS NVARCHAR(100)), 'Sin email') AS email,
            ISNULL(CAST(ProDocIdeVen AS NVARCHAR(100)), 'Sin teléfono') AS telefono,
            ISNULL(CAST(ProRubCon AS NVARCHAR(100)), 'Sin dirección') AS direccion,
            ISNULL(ProFeLog, GETDATE()) AS fecha_registro,
            CAST(CASE WHEN ProEstad = 'A' THEN 1 ELSE 0 END AS BIT) AS activo,
            CAST(ProNroId AS INT) AS ProNroId,
            ISNULL(CAST(ProContac AS NVARCHAR(100)), '') AS ProContac,
            ISNULL(CAST(ProOrdPag AS NVARCHAR(100)), '') AS ProOrdPag,
            ISNULL(CAST(ProRubCon AS NVARCHAR(100)), '') AS ProRubCon,
            ISNULL(CAST(IvPNroId AS NVARCHAR(100)), '') AS IvPNroId,
            ISNULL(CAST(ZoFNroId AS NVARCHAR(100)), '') AS ZoFNroId,
            ISNULL(CAST(ProNroCai AS NVARCHAR(100)), '') AS ProNroCai,
            ISNULL(CAST(ProVtoCai AS NVARCHAR(100)), '') AS ProVtoCai,
            ISNULL(CAST(ProObser AS NVARCHAR(500)), '') AS ProObser,
            ISNULL(CAST(ProEstad AS NVARCHAR(100)), '') AS ProEstad,
            ISNULL(CONVERT(NVARCHAR(100), ProFeEst, 120), '') AS ProFeEst,
            ISNULL(RTRIM(ProUslog), '') AS ProUslog,
            ISNULL(CONVERT(NVARCHAR(100), ProFeLog, 120), '') AS ProFeLog,
            ISNULL(CAST(ProRubConPago AS NVARCHAR(100)), '') AS ProRubConPago,
            ISNULL(CAST(msrepl_tran_version AS NVARCHAR(100)), '') AS msrepl_tran_version,
            ISNULL(CAST(ProDocIdeVen AS NVARCHAR(100)), '') AS ProDocIdeVen,
            ISNULL(CAST(ProConFis AS NVARCHAR(100)), '') AS ProConFis,
            ISNULL(CAST(ProTipComAfi AS NVARCHAR(100)), '') AS ProTipComAfi
        FROM PROV_MAEPROV WITH (NOLOCK)
        ORDER BY ProNroId
    "#;

    Ok(conn.query(sql, &[]).await?)
}
