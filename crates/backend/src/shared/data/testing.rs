//! In-memory driver doubles for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use contracts::shared::api::JsonRow;

use super::db::{Connector, ConnectorFactory, DbError, SqlExecutor, SqlParam};
use crate::shared::config::DbSettings;

type Answer = Result<Vec<JsonRow>, DbError>;

struct ExecutorInner {
    rules: Mutex<Vec<(String, Answer)>>,
    statements: Mutex<Vec<(String, Vec<SqlParam>)>>,
    connected: AtomicBool,
}

/// Answers each statement with the rows registered for the first pattern
/// the SQL text contains; unmatched statements return no rows.
#[derive(Clone)]
pub struct MockExecutor {
    inner: Arc<ExecutorInner>,
}

impl MockExecutor {
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(ExecutorInner {
                rules: Mutex::new(Vec::new()),
                statements: Mutex::new(Vec::new()),
                connected: AtomicBool::new(true),
            }),
        }
    }

    pub fn on(self, pattern: &str, rows: Vec<serde_json::Value>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        self.inner
            .rules
            .lock()
            .unwrap()
            .push((pattern.to_string(), Ok(rows)));
        self
    }

    pub fn fail_on(self, pattern: &str, err: DbError) -> Self {
        self.inner
            .rules
            .lock()
            .unwrap()
            .push((pattern.to_string(), Err(err)));
        self
    }

    pub fn set_connected(&self, connected: bool) {
        self.inner.connected.store(connected, Ordering::SeqCst);
    }

    /// Every statement run so far, with its parameters
    pub fn statements(&self) -> Vec<(String, Vec<SqlParam>)> {
        self.inner.statements.lock().unwrap().clone()
    }

    fn answer(&self, sql: &str, params: &[SqlParam]) -> Answer {
        self.inner
            .statements
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        let rules = self.inner.rules.lock().unwrap();
        rules
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, answer)| answer.clone())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[async_trait]
impl SqlExecutor for MockExecutor {
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<JsonRow>, DbError> {
        self.answer(sql, params)
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64, DbError> {
        self.answer(sql, params).map(|rows| rows.len() as u64)
    }

    fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }
}

struct ConnectorInner {
    executor: MockExecutor,
    error: Option<DbError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

/// Connector double that counts connect attempts
#[derive(Clone)]
pub struct MockConnector {
    inner: Arc<ConnectorInner>,
}

impl MockConnector {
    pub fn new(executor: MockExecutor) -> Self {
        Self {
            inner: Arc::new(ConnectorInner {
                executor,
                error: None,
                delay: None,
                calls: AtomicUsize::new(0),
            }),
        }
    }

    pub fn failing(err: DbError) -> Self {
        Self {
            inner: Arc::new(ConnectorInner {
                executor: MockExecutor::empty(),
                error: Some(err),
                delay: None,
                calls: AtomicUsize::new(0),
            }),
        }
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        let inner = ConnectorInner {
            executor: self.inner.executor.clone(),
            error: self.inner.error.clone(),
            delay: Some(delay),
            calls: AtomicUsize::new(self.inner.calls.load(Ordering::SeqCst)),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn connect_calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self) -> Result<Arc<dyn SqlExecutor>, DbError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.inner.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.inner.error {
            Some(err) => Err(err.clone()),
            None => Ok(Arc::new(self.inner.executor.clone())),
        }
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

/// Hands out the same mock connector for any settings and remembers them
#[derive(Clone)]
pub struct MockConnectorFactory {
    pub connector: MockConnector,
    pub seen: Arc<Mutex<Vec<DbSettings>>>,
}

impl MockConnectorFactory {
    pub fn new(connector: MockConnector) -> Self {
        Self {
            connector,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ConnectorFactory for MockConnectorFactory {
    fn connector(&self, settings: DbSettings) -> Arc<dyn Connector> {
        self.seen.lock().unwrap().push(settings);
        Arc::new(self.connector.clone())
    }
}
