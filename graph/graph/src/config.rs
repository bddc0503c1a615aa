use crate::error::GraphError;
use log::debug;
use std::ffi::OsStr;

pub const HOST_ENV_VAR: &str = "NEO4J_HOST";
pub const PORT_ENV_VAR: &str = "NEO4J_PORT";
pub const USER_ENV_VAR: &str = "NEO4J_USER";
pub const PASSWORD_ENV_VAR: &str = "NEO4J_PASSWORD";
pub const DATABASE_ENV_VAR: &str = "NEO4J_DATABASE";

pub fn get_optional_config(key: impl AsRef<OsStr>) -> Option<String> {
    std::env::var(key).ok()
}

pub fn get_config_with_default(key: impl AsRef<OsStr>, default: impl Into<String>) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

pub fn require_config(key: impl AsRef<OsStr>) -> Result<String, GraphError> {
    let key_str = key.as_ref().to_string_lossy().to_string();
    std::env::var(key).map_err(|_| GraphError::MissingConfig(key_str))
}

/// Where and as whom to talk to the database. Credentials are held verbatim;
/// encoding them into an Authorization header is the transport's business.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            database: "neo4j".to_string(),
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Reads the `NEO4J_*` environment keys. Host, port and database fall
    /// back to `localhost`, `7474` and `neo4j`; user and password are
    /// required.
    pub fn from_env() -> Result<Self, GraphError> {
        let host = get_config_with_default(HOST_ENV_VAR, "localhost");
        let port_raw = get_config_with_default(PORT_ENV_VAR, "7474");
        let port: u16 = port_raw.parse().map_err(|_| {
            GraphError::ValidationFailed(format!("{PORT_ENV_VAR} is not a port number: {port_raw}"))
        })?;
        let user = require_config(USER_ENV_VAR)?;
        let password = require_config(PASSWORD_ENV_VAR)?;
        let database = get_config_with_default(DATABASE_ENV_VAR, "neo4j");

        debug!("connection config: {host}:{port} database {database} as {user}");

        Ok(Self {
            host,
            port,
            user,
            password,
            database,
        })
    }
}
