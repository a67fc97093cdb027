use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use contracts::shared::api::JsonRow;
use futures::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;

use crate::shared::config::DbSettings;

/// Database failure. `Display` is always the raw driver message; the
/// variant records what kind of failure it was.
#[derive(Debug, Clone, Error)]
pub enum DbError {
    #[error("{0}")]
    Login(String),
    #[error("{0}")]
    Refused(String),
    #[error("{0}")]
    Timeout(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Connection(String),
    #[error("{0}")]
    Query(String),
}

impl DbError {
    /// Text shown by the connection test form
    pub fn friendly_message(&self) -> String {
        match self {
            DbError::Login(_) => "Usuario o contraseña incorrectos".to_string(),
            DbError::Refused(_) => {
                "No se puede conectar al servidor. Verifique la dirección y puerto".to_string()
            }
            DbError::Timeout(_) => {
                "Tiempo de conexión agotado. Verifique la conectividad de red".to_string()
            }
            DbError::NotFound(_) => {
                "Servidor no encontrado. Verifique la dirección del servidor".to_string()
            }
            DbError::Connection(msg) | DbError::Query(msg) => {
                if msg.trim().is_empty() {
                    "Error de conexión a la base de datos".to_string()
                } else {
                    msg.clone()
                }
            }
        }
    }

    /// Classify a socket-level error
    pub fn from_io(err: &std::io::Error) -> Self {
        let message = err.to_string();
        match err.kind() {
            std::io::ErrorKind::ConnectionRefused => DbError::Refused(message),
            std::io::ErrorKind::TimedOut => DbError::Timeout(message),
            _ if is_lookup_failure(&message) => DbError::NotFound(message),
            _ => DbError::Connection(message),
        }
    }

    /// True when the failure means the socket is no longer usable
    pub fn is_connection_lost(&self) -> bool {
        matches!(
            self,
            DbError::Refused(_) | DbError::Timeout(_) | DbError::Connection(_)
        )
    }
}

pub(crate) fn is_lookup_failure(message: &str) -> bool {
    let m = message.to_lowercase();
    m.contains("failed to lookup address")
        || m.contains("name or service not known")
        || m.contains("no such host")
        || m.contains("nodename nor servname")
        || m.contains("temporary failure in name resolution")
}

/// Deserialize result rows into typed records
pub fn decode_rows<T: serde::de::DeserializeOwned>(rows: Vec<JsonRow>) -> Result<Vec<T>, DbError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(serde_json::Value::Object(row))
                .map_err(|e| DbError::Query(format!("Unexpected row shape: {}", e)))
        })
        .collect()
}

/// Key column that may arrive as an integral float (`NUMERIC(p,0)`, `FLOAT`)
pub fn deserialize_integral_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Deserialize};

    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(id) = number.as_i64() {
        return Ok(Some(id));
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
        _ => Err(de::Error::custom(format!("expected an integer id, got {}", number))),
    }
}

/// Positional query parameter, bound as `@P1`, `@P2`, ...
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i32),
    Text(String),
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        SqlParam::Int(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

/// A live database connection
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Run a statement and return the rows of its first result set
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<JsonRow>, DbError>;

    /// Run a statement that returns no rows, yielding the affected row count
    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64, DbError>;

    fn is_connected(&self) -> bool;
}

/// Opens new connections
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn SqlExecutor>, DbError>;

    /// Target description for logs, never includes credentials
    fn describe(&self) -> String;
}

/// Builds a connector for ad-hoc settings (connection test form)
pub trait ConnectorFactory: Send + Sync {
    fn connector(&self, settings: DbSettings) -> Arc<dyn Connector>;
}

type ConnectFuture = Shared<BoxFuture<'static, Result<Arc<dyn SqlExecutor>, DbError>>>;

enum Slot {
    Idle,
    Connecting { attempt: u64, future: ConnectFuture },
    Ready(Arc<dyn SqlExecutor>),
}

/// Lazily opened, memoized database connection.
///
/// - A connected executor is reused.
/// - While a connect is in flight every caller awaits that same attempt
///   and receives its result, so concurrent requests never open a second
///   connection.
/// - A failed attempt leaves the manager idle; the next call tries again.
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    slot: Mutex<Slot>,
    attempts: AtomicU64,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            slot: Mutex::new(Slot::Idle),
            attempts: AtomicU64::new(0),
        }
    }

    pub fn describe(&self) -> String {
        self.connector.describe()
    }

    pub async fn get_connection(&self) -> Result<Arc<dyn SqlExecutor>, DbError> {
        let (attempt, future) = {
            let mut slot = self.lock_slot();
            let pending = match &*slot {
                Slot::Ready(conn) if conn.is_connected() => return Ok(conn.clone()),
                Slot::Connecting { attempt, future } => Some((*attempt, future.clone())),
                Slot::Ready(_) => {
                    tracing::warn!("[DB] Connection lost, reconnecting");
                    None
                }
                Slot::Idle => None,
            };

            match pending {
                Some(pending) => pending,
                None => {
                    let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    let connector = self.connector.clone();
                    tracing::info!(
                        "[DB] Connecting to {} (attempt {})",
                        connector.describe(),
                        attempt
                    );
                    let future = async move { connector.connect().await }.boxed().shared();
                    *slot = Slot::Connecting {
                        attempt,
                        future: future.clone(),
                    };
                    (attempt, future)
                }
            }
        };

        let result = future.await;

        let mut slot = self.lock_slot();
        let still_current =
            matches!(&*slot, Slot::Connecting { attempt: current, .. } if *current == attempt);
        if still_current {
            *slot = match &result {
                Ok(conn) => {
                    tracing::info!("[DB] Connected to {}", self.connector.describe());
                    Slot::Ready(conn.clone())
                }
                Err(e) => {
                    tracing::error!("[DB] Connection to {} failed: {}", self.connector.describe(), e);
                    Slot::Idle
                }
            };
        }

        result
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::testing::{MockConnector, MockExecutor};
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_connect() {
        let connector = MockConnector::new(MockExecutor::empty()).with_delay(Duration::from_millis(50));
        let manager = Arc::new(ConnectionManager::new(Arc::new(connector.clone())));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let manager = manager.clone();
            handles.push(tokio::spawn(async move { manager.get_connection().await }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert_eq!(connector.connect_calls(), 1);
    }

    #[tokio::test]
    async fn test_connected_executor_is_reused() {
        let connector = MockConnector::new(MockExecutor::empty());
        let manager = ConnectionManager::new(Arc::new(connector.clone()));

        let first = manager.get_connection().await.unwrap();
        let second = manager.get_connection().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(connector.connect_calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_the_failure() {
        let connector = MockConnector::failing(DbError::Login("Login failed for user 'sa'.".into()))
            .with_delay(Duration::from_millis(30));
        let manager = Arc::new(ConnectionManager::new(Arc::new(connector.clone())));

        let a = manager.clone();
        let b = manager.clone();
        let (ra, rb) = tokio::join!(a.get_connection(), b.get_connection());

        assert!(matches!(ra, Err(DbError::Login(_))));
        assert!(matches!(rb, Err(DbError::Login(_))));
        assert_eq!(connector.connect_calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_leaves_manager_idle() {
        let connector = MockConnector::failing(DbError::Refused("refused".into()));
        let manager = ConnectionManager::new(Arc::new(connector.clone()));

        assert!(manager.get_connection().await.is_err());
        assert!(manager.get_connection().await.is_err());
        assert_eq!(connector.connect_calls(), 2);
    }

    #[tokio::test]
    async fn test_disconnected_executor_triggers_reconnect() {
        let executor = MockExecutor::empty();
        let connector = MockConnector::new(executor.clone());
        let manager = ConnectionManager::new(Arc::new(connector.clone()));

        manager.get_connection().await.unwrap();
        executor.set_connected(false);
        manager.get_connection().await.unwrap();

        assert_eq!(connector.connect_calls(), 2);
    }

    #[test]
    fn test_io_error_classification() {
        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(DbError::from_io(&refused), DbError::Refused(_)));

        let timeout = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        assert!(matches!(DbError::from_io(&timeout), DbError::Timeout(_)));

        let lookup = std::io::Error::new(
            std::io::ErrorKind::Other,
            "failed to lookup address information: Name or service not known",
        );
        assert!(matches!(DbError::from_io(&lookup), DbError::NotFound(_)));
    }

    #[test]
    fn test_friendly_messages() {
        assert_eq!(
            DbError::Login("Login failed".into()).friendly_message(),
            "Usuario o contraseña incorrectos"
        );
        assert_eq!(
            DbError::Query("Invalid object name 'X'.".into()).friendly_message(),
            "Invalid object name 'X'."
        );
        assert_eq!(
            DbError::Connection(String::new()).friendly_message(),
            "Error de conexión a la base de datos"
        );
    }

    #[derive(Debug, serde::Deserialize)]
    struct KeyRow {
        #[serde(rename = "CliNroId", default, deserialize_with = "deserialize_integral_id")]
        client_id: Option<i64>,
    }

    #[test]
    fn test_integral_ids_decode_from_floats() {
        let rows: Vec<KeyRow> = decode_rows(vec![
            serde_json::json!({"CliNroId": 7}).as_object().cloned().unwrap(),
            serde_json::json!({"CliNroId": 7.0}).as_object().cloned().unwrap(),
            serde_json::json!({"CliNroId": null}).as_object().cloned().unwrap(),
        ])
        .unwrap();

        assert_eq!(rows[0].client_id, Some(7));
        assert_eq!(rows[1].client_id, Some(7));
        assert_eq!(rows[2].client_id, None);

        let fractional: Result<Vec<KeyRow>, _> =
            decode_rows(vec![serde_json::json!({"CliNroId": 7.5}).as_object().cloned().unwrap()]);
        assert!(matches!(fractional, Err(DbError::Query(_))));
    }
}
