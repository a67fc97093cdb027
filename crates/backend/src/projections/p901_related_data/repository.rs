use contracts::shared::api::JsonRow;
use contracts::shared::period::Period;

use crate::shared::data::db::{DbError, SqlExecutor, SqlParam};
use crate::shared::pricing::debit_credit;

/// `@P1` is always the entity id; a period adds a `[@P2, @P3)` range on
/// `date_column`.
fn scoped(id: i32, period: Option<&Period>, date_column: &str) -> (String, Vec<SqlParam>) {
    let mut params = vec![SqlParam::from(id)];
    match period {
        Some(p) => {
            let (from, to) = p.sql_bounds();
            params.push(SqlParam::from(from));
            params.push(SqlParam::from(to));
            (
                format!(" AND {col} >= @P2 AND {col} < @P3", col = date_column),
                params,
            )
        }
        None => (String::new(), params),
    }
}

pub async fn get_entity(conn: &dyn SqlExecutor, id: i32) -> Result<Vec<JsonRow>, DbError> {
    let sql = r#"
        SELECT TOP 1
            Entnroid,
            CAST(Entnombr AS NVARCHAR(100)) AS Entnombr,
            CAST(Entemail AS NVARCHAR(100)) AS Entemail,
            CAST(EntRazSoc AS NVARCHAR(100)) AS EntRazSoc,
            CAST(EntDomic AS NVARCHAR(100)) AS EntDomic,
            CAST(EntLocal AS NVARCHAR(100)) AS EntLocal,
            CAST(EntProvi AS NVARCHAR(100)) AS EntProvi,
            CAST(EntCodPo AS NVARCHAR(100)) AS EntCodPo,
            CAST(EntTelef AS NVARCHAR(100)) AS EntTelef,
            CAST(EntCUIT AS NVARCHAR(100)) AS EntCUIT,
            CAST(EntActEc AS NVARCHAR(100)) AS EntActEc
        FROM ENT_MAEENTIDAD WITH (NOLOCK)
        WHERE Entnroid = @P1
    "#;
    conn.query(sql, &[SqlParam::from(id)]).await
}

pub async fn get_client(conn: &dyn SqlExecutor, id: i32) -> Result<Vec<JsonRow>, DbError> {
    let sql = r#"
        SELECT TOP 1
            CliNroId,
            CAST(CliConta AS NVARCHAR(100)) AS CliConta,
            CAST(CliNotas AS NVARCHAR(500)) AS CliNotas,
            CAST(CliEstad AS NVARCHAR(100)) AS CliEstad,
            CAST(CliCodigo AS NVARCHAR(50)) AS CliCodigo
        FROM CLIE_MAECLIENTES WITH (NOLOCK)
        WHERE CliNroId = @P1
    "#;
    conn.query(sql, &[SqlParam::from(id)]).await
}

pub async fn get_provider(conn: &dyn SqlExecutor, id: i32) -> Result<Vec<JsonRow>, DbError> {
    let sql = r#"
        SELECT TOP 1
            ProNroId,
            CAST(ProContac AS NVARCHAR(100)) AS ProContac,
            CAST(ProObser AS NVARCHAR(500)) AS ProObser,
            CAST(ProEstad AS NVARCHAR(100)) AS ProEstad,
            CAST(ProRubCon AS NVARCHAR(100)) AS ProRubCon
        FROM PROV_MAEPROV WITH (NOLOCK)
        WHERE ProNroId = @P1
    "#;
    conn.query(sql, &[SqlParam::from(id)]).await
}

/// Latest 10 client debts, each with a printable document number
pub async fn get_debts(
    conn: &dyn SqlExecutor,
    id: i32,
    period: Option<&Period>,
) -> Result<Vec<JsonRow>, DbError> {
    let (range, params) = scoped(id, period, "cd.DeuFecha");
    let sql = format!(
        r#"
        SELECT TOP 10
            cd.SucNroId,
            cd.DeuNroId,
            cd.EntNroId,
            cd.DeuImpor,
            cd.DeuSaldo,
            cd.DeuFecha,
            cd.DeuCodCom,
            cd.DeuTipfa,
            cd.DeuNroF1,
            cd.DeuNroF2,
            ISNULL(
                SUBSTRING(ISNULL(cc.CCCDescr, ''), 1, 3) + ' ' +
                ISNULL(cd.DeuTipfa, '') + '-' +
                RIGHT('0000' + ISNULL(CAST(cd.DeuNroF1 AS NVARCHAR), '0'), 4) + '-' +
                RIGHT('00000000' + ISNULL(CAST(cd.DeuNroF2 AS NVARCHAR), '0'), 8),
                CAST(cd.DeuNroId AS NVARCHAR)
            ) AS DeudaNumero,
            'CLI' AS TipoEntidad
        FROM CCT_Deudas cd WITH (NOLOCK)
        LEFT JOIN CCT_CODCCT cc WITH (NOLOCK) ON cd.DeuCodCom = cc.CCCNroId
        INNER JOIN CLIE_MAECLIENTES cli WITH (NOLOCK) ON cd.EntNroId = cli.CliNroId
        WHERE cd.EntNroId = @P1{range}
        ORDER BY cd.DeuFecha DESC, cd.DeuNroId DESC
        "#
    );
    conn.query(&sql, &params).await
}

pub async fn get_movements(
    conn: &dyn SqlExecutor,
    id: i32,
    period: Option<&Period>,
) -> Result<Vec<JsonRow>, DbError> {
    let (range, params) = scoped(id, period, "m.MovFecha");
    let sql = format!(
        r#"
        SELECT TOP 5
            m.SucNroId,
            m.MovNroId,
            m.CtmNroId,
            m.EntNroId,
            m.MovImpor,
            m.MovFecha,
            'CLI' AS TipoEntidad
        FROM CCT_MOVIM m WITH (NOLOCK)
        INNER JOIN CLIE_MAECLIENTES cli WITH (NOLOCK) ON m.EntNroId = cli.CliNroId
        WHERE m.EntNroId = @P1{range}
        ORDER BY m.MovFecha DESC, m.MovNroId DESC
        "#
    );
    conn.query(&sql, &params).await
}

/// All invoices of the client, newest first, numbered by date
pub async fn get_invoices(
    conn: &dyn SqlExecutor,
    id: i32,
    period: Option<&Period>,
) -> Result<Vec<JsonRow>, DbError> {
    let (range, params) = scoped(id, period, "vf.FaFecha");
    let sql = format!(
        r#"
        SELECT
            ROW_NUMBER() OVER (ORDER BY vf.FaFecha DESC) AS FactNroId,
            ISNULL(
                SUBSTRING(ISNULL(vc.CVeAbrev, ''), 1, 3) + ' ' +
                ISNULL(vf.FaTipFa, '') + '-' +
                RIGHT('0000' + ISNULL(CAST(vf.FaFisPun AS NVARCHAR), '0'), 4) + '-' +
                RIGHT('00000000' + ISNULL(CAST(vf.FaFiscal AS NVARCHAR), '0'), 8),
                ''
            ) AS FactNumero,
            ISNULL(CONVERT(NVARCHAR(100), vf.FaFecha, 126), '') AS FactFecha,
            ISNULL(RTRIM(vc.CVeDescr), '') AS FactTipo,
            ISNULL(CAST(vf.FaTotal AS FLOAT), 0) AS FactTotal,
            ISNULL(CAST(vf.FaNetGr AS FLOAT), 0) AS FaNetGr,
            ISNULL(vf.FaEstad, '') AS FactEstado,
            vf.CliNroId AS EntNroId,
            vf.CVeNroId,
            vf.FaTipFa,
            vf.FaNroF1,
            vf.FaNroF2
        FROM VEN_FACTUR vf WITH (NOLOCK)
        LEFT JOIN VEN_CODVTA vc WITH (NOLOCK) ON vf.CVeNroId = vc.CVeNroId
        WHERE vf.CliNroId = @P1{range}
        ORDER BY vf.FaFecha DESC
        "#
    );
    conn.query(&sql, &params).await
}

/// Level-1 breakdown of the three latest movements
pub async fn get_level1_movements(
    conn: &dyn SqlExecutor,
    id: i32,
    period: Option<&Period>,
) -> Result<Vec<JsonRow>, DbError> {
    let (range, params) = scoped(id, period, "MovFecha");
    let sql = format!(
        r#"
        SELECT TOP 3
            ml.SucNroId,
            ml.MovNroId,
            ml.DeuNroId,
            ml.CCCNroId,
            ml.MovImpDe,
            ml.DeuDeuNroId,
            ml.DeuSucNroId,
            ISNULL(CAST(cc.CCCDescr AS NVARCHAR(30)), '') AS CCCDescr,
            ISNULL(cc.CCCSigno, 0) AS CCCSigno
        FROM CCT_MOVIMCCT_MOVIMLEVEL1 ml WITH (NOLOCK)
        INNER JOIN (
            SELECT TOP 3 MovNroId
            FROM CCT_MOVIM WITH (NOLOCK)
            WHERE EntNroId = @P1{range}
            ORDER BY MovFecha DESC, MovNroId DESC
        ) m ON ml.MovNroId = m.MovNroId
        LEFT JOIN CCT_CODCCT cc WITH (NOLOCK) ON ml.CCCNroId = cc.CCCNroId
        ORDER BY ml.MovNroId DESC
        "#
    );
    conn.query(&sql, &params).await
}

/// Three latest movements joined with their level-1 detail, each row
/// extended with `Debe` and `Haber`
pub async fn get_combined_movements(
    conn: &dyn SqlExecutor,
    id: i32,
    period: Option<&Period>,
) -> Result<Vec<JsonRow>, DbError> {
    let (range, params) = scoped(id, period, "m.MovFecha");
    let sql = format!(
        r#"
        SELECT TOP 3
            m.SucNroId,
            m.MovNroId,
            m.CtmNroId,
            m.EntNroId,
            m.MovImpor,
            m.MovFecha,
            ml.DeuNroId,
            ml.CCCNroId,
            ml.MovImpDe,
            ISNULL(CAST(cc.CCCDescr AS NVARCHAR(30)), '') AS CCCDescr,
            ISNULL(cc.CCCSigno, 0) AS CCCSigno
        FROM (
            SELECT TOP 3 m.SucNroId, m.MovNroId, m.CtmNroId, m.EntNroId, m.MovImpor, m.MovFecha
            FROM CCT_MOVIM m WITH (NOLOCK)
            INNER JOIN CLIE_MAECLIENTES cli WITH (NOLOCK) ON m.EntNroId = cli.CliNroId
            WHERE m.EntNroId = @P1{range}
            ORDER BY m.MovFecha DESC, m.MovNroId DESC
        ) m
        LEFT JOIN CCT_MOVIMCCT_MOVIMLEVEL1 ml WITH (NOLOCK) ON m.MovNroId = ml.MovNroId
        LEFT JOIN CCT_CODCCT cc WITH (NOLOCK) ON ml.CCCNroId = cc.CCCNroId
        ORDER BY m.MovFecha DESC, m.MovNroId DESC
        "#
    );

    let rows = conn.query(&sql, &params).await?;
    Ok(rows.into_iter().map(with_debit_credit).collect())
}

fn with_debit_credit(mut row: JsonRow) -> JsonRow {
    let sign = row
        .get("CCCSigno")
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .unwrap_or(0);
    let amount = row.get("MovImpDe").and_then(|v| v.as_f64()).unwrap_or(0.0);
    let (debe, haber) = debit_credit(sign, amount);
    row.insert("Debe".to_string(), debe.into());
    row.insert("Haber".to_string(), haber.into());
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::testing::MockExecutor;
    use serde_json::json;

    #[tokio::test]
    async fn test_period_adds_date_range() {
        let conn = MockExecutor::empty();
        let period = Period::new(3, 2024).unwrap();

        get_debts(&conn, 42, Some(&period)).await.unwrap();
        get_debts(&conn, 42, None).await.unwrap();

        let statements = conn.statements();
        let (sql, params) = &statements[0];
        assert!(sql.contains("cd.DeuFecha >= @P2 AND cd.DeuFecha < @P3"));
        assert_eq!(
            params,
            &vec![
                SqlParam::Int(42),
                SqlParam::from("20240301"),
                SqlParam::from("20240401")
            ]
        );

        let (sql, params) = &statements[1];
        assert!(!sql.contains("@P2"));
        assert_eq!(params, &vec![SqlParam::Int(42)]);
    }

    #[tokio::test]
    async fn test_combined_movements_split_debit_and_credit() {
        let conn = MockExecutor::empty().on(
            "CCT_MOVIMCCT_MOVIMLEVEL1 ml",
            vec![
                json!({"MovNroId": 3, "CCCSigno": 1, "MovImpDe": 500.0}),
                json!({"MovNroId": 2, "CCCSigno": -1, "MovImpDe": 200.0}),
                json!({"MovNroId": 1, "CCCSigno": 0, "MovImpDe": null}),
            ],
        );

        let rows = get_combined_movements(&conn, 42, None).await.unwrap();

        assert_eq!(rows[0]["Debe"], 500.0);
        assert_eq!(rows[0]["Haber"], 0.0);
        assert_eq!(rows[1]["Debe"], 0.0);
        assert_eq!(rows[1]["Haber"], 200.0);
        assert_eq!(rows[2]["Debe"], 0.0);
        assert_eq!(rows[2]["Haber"], 0.0);
    }
}
