//! Configuration for the database connection
//!
//! Provides a builder pattern for connection settings, plus loading from the
//! process environment (optionally seeded from a `.env` file).

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::error::{OrmError, Result};

/// Default MySQL port used when none is configured
pub const DEFAULT_PORT: u16 = 3306;

/// Environment variable prefix used by [`DbConfig::from_env`]
pub const DEFAULT_ENV_PREFIX: &str = "DB_";

/// Database driver behind the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Driver {
    #[default]
    MySql,
    Sqlite,
}

impl Driver {
    /// Parse a driver name as found in configuration (`mysql`, `sqlite`)
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Driver::MySql),
            "sqlite" | "sqlite3" => Ok(Driver::Sqlite),
            other => Err(OrmError::config(format!("Unknown database driver '{}'", other))),
        }
    }
}

/// Options applied to the handle when it is created
///
/// sqlx always binds parameters natively and always surfaces failures as
/// errors, so neither needs a switch here.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOptions {
    /// Connections held by the handle (default: 1, a single logical connection)
    pub max_connections: u32,
    /// How long to wait for the connection before failing (default: 30s)
    pub acquire_timeout: Duration,
    /// Whether sqlx logs every executed statement (default: true)
    pub log_statements: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            log_statements: true,
        }
    }
}

/// Connection settings for a [`crate::Database`]
#[derive(Clone)]
pub struct DbConfig {
    pub driver: Driver,
    pub host: String,
    pub port: u16,
    /// Schema (database) name; for SQLite the file path or `:memory:`
    pub database: String,
    pub username: String,
    pub password: String,
    /// Overrides [`ExecutionOptions::default`] when set
    pub options: Option<ExecutionOptions>,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl DbConfig {
    /// Create a new configuration builder for the given schema name
    pub fn builder(database: impl Into<String>) -> DbConfigBuilder {
        DbConfigBuilder::new(database)
    }

    /// In-memory SQLite configuration, mostly useful in tests
    pub fn sqlite_memory() -> Self {
        Self::builder(":memory:").driver(Driver::Sqlite).build()
    }

    /// Load configuration from `DB_*` environment variables
    ///
    /// Reads `DB_DRIVER`, `DB_HOST`, `DB_PORT`, `DB_DATABASE`, `DB_USERNAME`
    /// and `DB_PASSWORD`. Call [`load_dotenv`] first to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_env_prefixed(DEFAULT_ENV_PREFIX)
    }

    /// Same as [`DbConfig::from_env`] with a custom variable prefix
    pub fn from_env_prefixed(prefix: &str) -> Result<Self> {
        Self::from_lookup(prefix, |key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    ///
    /// Missing required values are reported before any connection attempt.
    /// SQLite only requires the database name.
    pub fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(&format!("{}{}", prefix, name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &str| {
            get(name).ok_or_else(|| {
                OrmError::config(format!(
                    "Missing required environment variable {}{}",
                    prefix, name
                ))
            })
        };

        let driver = match get("DRIVER") {
            Some(name) => Driver::parse(&name)?,
            None => Driver::default(),
        };

        let database = require("DATABASE")?;
        let mut builder = DbConfig::builder(database).driver(driver);

        if driver == Driver::MySql {
            builder = builder
                .host(require("HOST")?)
                .username(require("USERNAME")?)
                .password(get("PASSWORD").unwrap_or_default());

            if let Some(port) = get("PORT") {
                let port = port.parse::<u16>().map_err(|_| {
                    OrmError::config(format!("Invalid value for {}PORT: '{}'", prefix, port))
                })?;
                builder = builder.port(port);
            }
        }

        Ok(builder.build())
    }

    /// Options the handle is created with: the override if set, else defaults
    pub fn execution_options(&self) -> ExecutionOptions {
        self.options.clone().unwrap_or_default()
    }

    /// Render the driver URL for this configuration
    pub fn url(&self) -> String {
        match self.driver {
            Driver::MySql => {
                let credentials = if self.password.is_empty() {
                    urlencoding::encode(&self.username).into_owned()
                } else {
                    format!(
                        "{}:{}",
                        urlencoding::encode(&self.username),
                        urlencoding::encode(&self.password)
                    )
                };
                format!(
                    "mysql://{}@{}:{}/{}",
                    credentials,
                    self.host,
                    self.port,
                    urlencoding::encode(&self.database)
                )
            }
            Driver::Sqlite if self.database == ":memory:" => "sqlite::memory:".to_string(),
            Driver::Sqlite => format!("sqlite://{}?mode=rwc", self.database),
        }
    }
}

/// Builder for DbConfig
#[derive(Debug)]
pub struct DbConfigBuilder {
    config: DbConfig,
}

impl DbConfigBuilder {
    /// Create a new builder with the schema name
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            config: DbConfig {
                driver: Driver::default(),
                host: "localhost".to_string(),
                port: DEFAULT_PORT,
                database: database.into(),
                username: "root".to_string(),
                password: String::new(),
                options: None,
            },
        }
    }

    /// Set the driver (default: MySQL)
    pub fn driver(mut self, driver: Driver) -> Self {
        self.config.driver = driver;
        self
    }

    /// Set the host (default: "localhost")
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the port (default: 3306)
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    /// Replace the default execution options
    pub fn options(mut self, options: ExecutionOptions) -> Self {
        self.config.options = Some(options);
        self
    }

    /// Build the configuration
    pub fn build(self) -> DbConfig {
        self.config
    }
}

/// Load a `.env` file from the current directory (or a parent), if any
///
/// Variables already present in the environment are not overwritten.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded .env from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }
}
