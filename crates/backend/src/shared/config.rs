use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Driver timeouts. Credentials are never read from this file.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000

[database]
connect_timeout_ms = 15000
request_timeout_ms = 60000
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

pub const DEFAULT_DB_PORT: u16 = 1433;

const REQUIRED_DB_VARS: [&str; 4] = ["DB_SERVER", "DB_USER", "DB_PASSWORD", "DB_DATABASE"];

/// SQL Server connection settings
#[derive(Clone, PartialEq)]
pub struct DbSettings {
    pub server: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
    pub instance: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for DbSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbSettings")
            .field("server", &self.server)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("port", &self.port)
            .field("instance", &self.instance)
            .finish()
    }
}

impl DbSettings {
    /// Read `DB_SERVER, DB_USER, DB_PASSWORD, DB_DATABASE` (required),
    /// `DB_PORT` (default 1433) and `DB_INSTANCE` from the environment
    pub fn from_env(database: &DatabaseConfig) -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), database)
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        database: &DatabaseConfig,
    ) -> anyhow::Result<Self> {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = REQUIRED_DB_VARS
            .iter()
            .copied()
            .filter(|&key| value(key).is_none())
            .collect();
        if !missing.is_empty() {
            anyhow::bail!(
                "[DB] Faltan variables de entorno: {} (defina DB_SERVER, DB_USER, DB_PASSWORD, DB_DATABASE y opcionalmente DB_PORT, DB_INSTANCE)",
                missing.join(", ")
            );
        }

        let port = match value("DB_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("[DB] DB_PORT inválido '{}': {}", raw, e))?,
            None => DEFAULT_DB_PORT,
        };

        Ok(Self {
            server: value("DB_SERVER").unwrap_or_default(),
            user: value("DB_USER").unwrap_or_default(),
            password: value("DB_PASSWORD").unwrap_or_default(),
            database: value("DB_DATABASE").unwrap_or_default(),
            port,
            instance: value("DB_INSTANCE").map(|v| v.trim().to_string()),
            connect_timeout: Duration::from_millis(database.connect_timeout_ms),
            request_timeout: Duration::from_millis(database.request_timeout_ms),
        })
    }

    /// `server\instance:port`, as printed in logs
    pub fn target(&self) -> String {
        match &self.instance {
            Some(instance) => format!("{}\\{}:{}", self.server, instance, self.port),
            None => format!("{}:{}", self.server, self.port),
        }
    }
}
