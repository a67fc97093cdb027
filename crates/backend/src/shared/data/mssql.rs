use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use contracts::shared::api::JsonRow;
use serde_json::Value;
use tiberius::{
    AuthMethod, Client, ColumnData, Config, EncryptionLevel, FromSql, Query, Row, SqlBrowser,
};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use super::db::{
    is_lookup_failure, Connector, ConnectorFactory, DbError, SqlExecutor, SqlParam,
};
use crate::shared::config::DbSettings;

type TdsClient = Client<Compat<TcpStream>>;

/// SQL Server error number for "Login failed for user"
const LOGIN_FAILED: u32 = 18456;

/// Opens TDS connections with the given settings
pub struct MssqlConnector {
    settings: DbSettings,
}

impl MssqlConnector {
    pub fn new(settings: DbSettings) -> Self {
        Self { settings }
    }

    fn tds_config(&self) -> Config {
        let mut config = Config::new();
        config.host(&self.settings.server);
        config.port(self.settings.port);
        config.database(&self.settings.database);
        config.authentication(AuthMethod::sql_server(
            &self.settings.user,
            &self.settings.password,
        ));
        config.application_name("syndeo-backend");
        config.encryption(EncryptionLevel::Off);
        config.trust_cert();
        if let Some(instance) = &self.settings.instance {
            config.instance_name(instance);
        }
        config
    }

    async fn open(&self) -> Result<TdsClient, DbError> {
        let config = self.tds_config();

        let tcp = if self.settings.instance.is_some() {
            // Resolves the instance port through the SQL Browser service
            TcpStream::connect_named(&config)
                .await
                .map_err(map_tiberius_error)?
        } else {
            TcpStream::connect(config.get_addr())
                .await
                .map_err(|e| DbError::from_io(&e))?
        };
        tcp.set_nodelay(true).map_err(|e| DbError::from_io(&e))?;

        match Client::connect(config, tcp.compat_write()).await {
            Ok(client) => Ok(client),
            Err(tiberius::error::Error::Routing { host, port }) => {
                tracing::info!("[DB] Server redirected the connection to {}:{}", host, port);
                let mut config = self.tds_config();
                config.host(&host);
                config.port(port);
                let tcp = TcpStream::connect(config.get_addr())
                    .await
                    .map_err(|e| DbError::from_io(&e))?;
                tcp.set_nodelay(true).map_err(|e| DbError::from_io(&e))?;
                Client::connect(config, tcp.compat_write())
                    .await
                    .map_err(map_tiberius_error)
            }
            Err(e) => Err(map_tiberius_error(e)),
        }
    }
}

#[async_trait]
impl Connector for MssqlConnector {
    async fn connect(&self) -> Result<Arc<dyn SqlExecutor>, DbError> {
        let timeout = self.settings.connect_timeout;
        let client = tokio::time::timeout(timeout, self.open())
            .await
            .map_err(|_| {
                DbError::Timeout(format!(
                    "Failed to connect to {} in {}ms",
                    self.settings.target(),
                    timeout.as_millis()
                ))
            })??;

        Ok(Arc::new(MssqlExecutor::new(
            client,
            self.settings.request_timeout,
        )))
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.settings.target(), self.settings.database)
    }
}

pub struct MssqlConnectorFactory;

impl ConnectorFactory for MssqlConnectorFactory {
    fn connector(&self, settings: DbSettings) -> Arc<dyn Connector> {
        Arc::new(MssqlConnector::new(settings))
    }
}

/// One TDS connection. Statements from concurrent requests queue on the
/// client mutex.
pub struct MssqlExecutor {
    client: Mutex<TdsClient>,
    connected: AtomicBool,
    request_timeout: Duration,
}

impl MssqlExecutor {
    fn new(client: TdsClient, request_timeout: Duration) -> Self {
        Self {
            client: Mutex::new(client),
            connected: AtomicBool::new(true),
            request_timeout,
        }
    }

    fn timeout_error(&self) -> DbError {
        DbError::Timeout(format!(
            "Timeout: Request failed to complete in {}ms",
            self.request_timeout.as_millis()
        ))
    }

    fn track<T>(&self, result: Result<T, DbError>) -> Result<T, DbError> {
        if let Err(e) = &result {
            if e.is_connection_lost() {
                tracing::warn!("[DB] Marking connection as closed: {}", e);
                self.connected.store(false, Ordering::SeqCst);
            }
        }
        result
    }
}

fn bind_params<'a>(query: &mut Query<'a>, params: &'a [SqlParam]) {
    for param in params {
        match param {
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Text(s) => query.bind(s.as_str()),
        }
    }
}

#[async_trait]
impl SqlExecutor for MssqlExecutor {
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<JsonRow>, DbError> {
        let mut client = self.client.lock().await;
        let mut query = Query::new(sql);
        bind_params(&mut query, params);

        let work = async {
            let stream = query.query(&mut *client).await?;
            stream.into_first_result().await
        };

        let result = match tokio::time::timeout(self.request_timeout, work).await {
            Ok(Ok(rows)) => Ok(rows.into_iter().map(row_to_json).collect()),
            Ok(Err(e)) => Err(map_tiberius_error(e)),
            Err(_) => Err(self.timeout_error()),
        };
        self.track(result)
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64, DbError> {
        let mut client = self.client.lock().await;
        let mut query = Query::new(sql);
        bind_params(&mut query, params);

        let result = match tokio::time::timeout(self.request_timeout, query.execute(&mut *client)).await
        {
            Ok(Ok(done)) => Ok(done.total()),
            Ok(Err(e)) => Err(map_tiberius_error(e)),
            Err(_) => Err(self.timeout_error()),
        };
        self.track(result)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

fn map_tiberius_error(err: tiberius::error::Error) -> DbError {
    use tiberius::error::Error;

    match err {
        Error::Server(token) => server_error(token.code(), token.message()),
        Error::Io { kind, message } => match kind {
            std::io::ErrorKind::ConnectionRefused => DbError::Refused(message),
            std::io::ErrorKind::TimedOut => DbError::Timeout(message),
            _ if is_lookup_failure(&message) => DbError::NotFound(message),
            _ => DbError::Connection(message),
        },
        Error::Conversion(msg) => DbError::Query(msg.into_owned()),
        other => DbError::Connection(other.to_string()),
    }
}

/// Error token sent by the server, by its error number
fn server_error(code: u32, message: &str) -> DbError {
    match code {
        LOGIN_FAILED => DbError::Login(message.to_string()),
        _ => DbError::Query(message.to_string()),
    }
}

fn row_to_json(row: Row) -> JsonRow {
    let names: Vec<String> = row
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    names
        .into_iter()
        .zip(row)
        .map(|(name, data)| (name, column_value(data)))
        .collect()
}

fn column_value(data: ColumnData<'static>) -> Value {
    let value = match data {
        ColumnData::U8(v) => v.map(Value::from),
        ColumnData::I16(v) => v.map(Value::from),
        ColumnData::I32(v) => v.map(Value::from),
        ColumnData::I64(v) => v.map(Value::from),
        ColumnData::F32(v) => v.map(|f| Value::from(f as f64)),
        ColumnData::F64(v) => v.map(Value::from),
        ColumnData::Bit(v) => v.map(Value::Bool),
        ColumnData::String(v) => v.map(|s| Value::String(s.into_owned())),
        ColumnData::Guid(v) => v.map(|g| Value::String(g.to_string())),
        ColumnData::Binary(v) => v.map(|b| Value::String(BASE64.encode(b.as_ref()))),
        ColumnData::Numeric(v) => v.map(|n| numeric_value(n.value(), n.scale())),
        other => temporal_value(&other),
    };
    value.unwrap_or(Value::Null)
}

fn numeric_to_f64(value: i128, scale: u8) -> f64 {
    value as f64 / 10f64.powi(scale as i32)
}

/// `NUMERIC(p,0)` keys stay integers
fn numeric_value(value: i128, scale: u8) -> Value {
    match i64::try_from(value) {
        Ok(int) if scale == 0 => Value::from(int),
        _ => Value::from(numeric_to_f64(value, scale)),
    }
}

/// Date and time columns as ISO-8601 strings
fn temporal_value(data: &ColumnData<'static>) -> Option<Value> {
    use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

    if let Ok(Some(dt)) = NaiveDateTime::from_sql(data) {
        return Some(Value::String(
            dt.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
        ));
    }
    if let Ok(Some(dt)) = DateTime::<FixedOffset>::from_sql(data) {
        return Some(Value::String(dt.to_rfc3339()));
    }
    if let Ok(Some(d)) = NaiveDate::from_sql(data) {
        return Some(Value::String(d.format("%Y-%m-%d").to_string()));
    }
    if let Ok(Some(t)) = NaiveTime::from_sql(data) {
        return Some(Value::String(t.format("%H:%M:%S%.3f").to_string()));
    }
    None
}
