use std::sync::Arc;

use super::data::db::{ConnectionManager, ConnectorFactory, DbError, SqlExecutor};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Connection configured from the environment
    pub db: Arc<ConnectionManager>,
    /// Builds throw-away connectors for the connection test form
    pub connectors: Arc<dyn ConnectorFactory>,
}

impl AppState {
    pub fn new(db: Arc<ConnectionManager>, connectors: Arc<dyn ConnectorFactory>) -> Self {
        Self { db, connectors }
    }

    pub async fn conn(&self) -> Result<Arc<dyn SqlExecutor>, DbError> {
        self.db.get_connection().await
    }
}
