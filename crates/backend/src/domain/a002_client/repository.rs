use anyhow::Result;
use contracts::shared::api::JsonRow;

use crate::shared::data::db::SqlExecutor;

pub const TABLE: &str = "CLIE_MAECLIENTES";

/// Layout used when the deployed database has no client table
pub const CREATE_TABLE: &str = r#"
    CREATE TABLE CLIE_MAECLIENTES (
        CliNroId INT IDENTITY(1,1) PRIMARY KEY,
        CliConta NVARCHAR(100) NULL,
        CliNotas NVARCHAR(500) NULL,
        IvCNroId INT NULL,
        ZoFNroId INT NULL,
        CliLimCr DECIMAL(18,2) NULL,
        CliEstad NVARCHAR(50) NULL,
        CliFeEst DATETIME NULL,
        CliUsLog NVARCHAR(50) NULL,
        CliFeLog DATETIME NULL,
        CliPanta NVARCHAR(100) NULL,
        CliLprNroId INT NULL,
        GesNroId INT NULL,
        GAfNroid INT NULL,
        CliValida NVARCHAR(50) NULL,
        CliCodigo NVARCHAR(50) NULL,
        CliLimChe DECIMAL(18,2) NULL,
        CliPlaChe NVARCHAR(50) NULL,
        CliPlaCre NVARCHAR(50) NULL,
        CliSucNroid INT NULL,
        msrepl_tran_version UNIQUEIDENTIFIER NULL,
        ZoVNroId INT NULL,
        CliPunTipo NVARCHAR(50) NULL
    )
"#;

/// First 100 clients: display columns, then every attribute as text
pub async fn list_first_page(conn: &dyn SqlExecutor) -> Result<Vec<JsonRow>> {
    let sql = r#"
        SELECT TOP 100
            CAST(CliNroId AS INT) AS id,
            ISNULL(CAST(CliConta AS NVARCHAR(100)), 'Sin nombre') AS nombre,
            ISNULL(CAST(CliNotas AS NVARCHAR(100)), 'Sin email') AS email,
            ISNULL(CAST(CliCodigo AS NVARCHAR(50)), 'Sin teléfono') AS telefono,
            ISNULL(CAST(CliPanta AS NVARCHAR(100)), 'Sin dirección') AS direccion,
            ISNULL(CliFeLog, GETDATE()) AS fecha_registro,
            CAST(CASE WHEN CliEstad = 'A' THEN 1 ELSE 0 END AS BIT) AS activo,
            CAST(CliNroId AS INT) AS CliNroId,
            ISNULL(CAST(CliConta AS NVARCHAR(100)), '') AS CliConta,
            ISNULL(CAST(CliNotas AS NVARCHAR(500)), '') AS CliNotas,
            ISNULL(CAST(IvCNroId AS NVARCHAR(100)), '') AS IvCNroId,
            ISNULL(CAST(ZoFNroId AS NVARCHAR(100)), '') AS ZoFNroId,
            ISNULL(CAST(CliLimCr AS NVARCHAR(100)), '') AS CliLimCr,
            ISNULL(CAST(CliEstad AS NVARCHAR(100)), '') AS CliEstad,
            ISNULL(CONVERT(NVARCHAR(100), CliFeEst, 120), '') AS CliFeEst,
            ISNULL(RTRIM(CliUsLog), '') AS CliUsLog,
            ISNULL(CONVERT(NVARCHAR(100), CliFeLog, 120), '') AS CliFeLog,
            ISNULL(CAST(CliPanta AS NVARCHAR(100)), '') AS CliPanta,
            ISNULL(CAST(CliLprNroId AS NVARCHAR(100)), '') AS CliLprNroId,
            ISNULL(CAST(GesNroId AS NVARCHAR(100)), '') AS GesNroId,
            ISNULL(CAST(GAfNroid AS NVARCHAR(100)), '') AS GAfNroid,
            ISNULL(CAST(CliValida AS NVARCHAR(100)), '') AS CliValida,
            ISNULL(CAST(CliCodigo AS NVARCHAR(100)), '') AS CliCodigo,
            ISNULL(CAST(CliLimChe AS NVARCHAR(100)), '') AS CliLimChe,
            ISNULL(CAST(CliPlaChe AS NVARCHAR(100)), '') AS CliPlaChe,
            ISNULL(CAST(CliPlaCre AS NVARCHAR(100)), '') AS CliPlaCre,
            ISNULL(CAST(CliSucNroid AS NVARCHAR(100)), '') AS CliSucNroid,
            ISNULL(CAST(msrepl_tran_version AS NVARCHAR(100)), '') AS msrepl_tran_version,
            ISNULL(CAST(ZoVNroId AS NVARCHAR(100)), '') AS ZoVNroId,
            ISNULL(CAST(CliPunTipo AS NVARCHAR(100)), '') AS CliPunTipo
        FROM CLIE_MAECLIENTES WITH (NOLOCK)
        ORDER BY CliNroId
    "#;

    Ok(conn.query(sql, &[]).await?)
}
