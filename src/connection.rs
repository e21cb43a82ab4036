//! Database - owned connection handle shared by query builders and records
//!
//! The application builds one `Database` at startup and passes it by
//! reference. The underlying handle is opened lazily on the first
//! [`Database::connect`] and reused until [`Database::disconnect`].

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use sqlx::ConnectOptions;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool};
use sqlx::pool::PoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use tracing::{debug, info, warn};

use crate::config::{DbConfig, Driver, ExecutionOptions};
use crate::error::{OrmError, Result};
use crate::model::Model;
use crate::sql::builder::QueryBuilder;
use crate::sql::sanitize::validate_identifier;

/// Driver-specific connection handle
///
/// Cloning is cheap; clones share the same underlying connections.
#[derive(Debug, Clone)]
pub enum DbPool {
    MySql(MySqlPool),
    Sqlite(SqlitePool),
}

impl DbPool {
    pub fn driver(&self) -> Driver {
        match self {
            DbPool::MySql(_) => Driver::MySql,
            DbPool::Sqlite(_) => Driver::Sqlite,
        }
    }

    /// Close every connection held by the handle
    pub async fn close(&self) {
        match self {
            DbPool::MySql(pool) => pool.close().await,
            DbPool::Sqlite(pool) => pool.close().await,
        }
    }

    /// Open a handle for `config`
    async fn open(config: &DbConfig) -> Result<Self> {
        let options = config.execution_options();
        let url = config.url();

        match config.driver {
            Driver::MySql => {
                let mut connect_options: MySqlConnectOptions = url
                    .parse()
                    .map_err(|e: sqlx::Error| OrmError::connection(e.to_string()))?;
                if !options.log_statements {
                    connect_options = connect_options.disable_statement_logging();
                }
                let pool = pool_options(&options)
                    .connect_with(connect_options)
                    .await
                    .map_err(|e| OrmError::connection(e.to_string()))?;
                Ok(DbPool::MySql(pool))
            }
            Driver::Sqlite => {
                let mut connect_options: SqliteConnectOptions = url
                    .parse()
                    .map_err(|e: sqlx::Error| OrmError::connection(e.to_string()))?;
                if !options.log_statements {
                    connect_options = connect_options.disable_statement_logging();
                }
                let pool = pool_options(&options)
                    .connect_with(connect_options)
                    .await
                    .map_err(|e| OrmError::connection(e.to_string()))?;
                Ok(DbPool::Sqlite(pool))
            }
        }
    }
}

/// Pool settings shared by both drivers
///
/// Idle timeout and max lifetime are off so a single in-memory SQLite
/// connection is never recycled.
fn pool_options<DB: sqlx::Database>(options: &ExecutionOptions) -> PoolOptions<DB> {
    PoolOptions::<DB>::new()
        .max_connections(options.max_connections.max(1))
        .acquire_timeout(options.acquire_timeout)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
}

/// Connection manager for one database
///
/// The handle is a driver-specific sqlx pool capped by [`crate::ExecutionOptions::max_connections`]
/// (one connection by default), so statements from concurrent callers are
/// serialized and their relative order is unspecified.
pub struct Database {
    config: DbConfig,
    pool: RwLock<Option<DbPool>>,
    tables: RwLock<HashMap<TypeId, Arc<str>>>,
}

impl Database {
    /// Create a manager; no connection is made until [`Database::connect`]
    pub fn new(config: DbConfig) -> Self {
        Self {
            config,
            pool: RwLock::new(None),
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Return the shared handle, opening it on first use
    pub async fn connect(&self) -> Result<DbPool> {
        if let Some(pool) = self.connection() {
            return Ok(pool);
        }

        info!(
            driver = ?self.config.driver,
            host = %self.config.host,
            database = %self.config.database,
            "opening database connection"
        );

        let pool = DbPool::open(&self.config).await?;

        // Another caller may have connected while this one was awaiting
        let existing = {
            let mut slot = self.pool.write().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(existing) => Some(existing.clone()),
                None => {
                    *slot = Some(pool.clone());
                    None
                }
            }
        };

        if let Some(existing) = existing {
            warn!("discarding duplicate database connection");
            pool.close().await;
            return Ok(existing);
        }

        Ok(pool)
    }

    /// Close the handle; the next [`Database::connect`] opens a fresh one
    pub async fn disconnect(&self) {
        let pool = self
            .pool
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(pool) = pool {
            info!(database = %self.config.database, "closing database connection");
            pool.close().await;
        }
    }

    /// The current handle, or `None` if not connected
    pub fn connection(&self) -> Option<DbPool> {
        self.pool
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resolve, validate and cache the table name of `M`
    ///
    /// Records call this on every operation; calling it up front surfaces an
    /// invalid table name at startup instead.
    pub fn register<M: Model>(&self) -> Result<Arc<str>> {
        let key = TypeId::of::<M>();

        if let Some(table) = self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(table.clone());
        }

        let table = M::table_name();
        validate_identifier(&table).map_err(|e| {
            OrmError::validation(format!("Model '{}' has an invalid table name: {}", M::NAME, e))
        })?;

        debug!(model = M::NAME, table = %table, "registered model");

        let table: Arc<str> = Arc::from(&*table);
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, table.clone());

        Ok(table)
    }

    /// Start a query against an arbitrary table
    pub async fn table(&self, table: impl Into<String>) -> Result<QueryBuilder> {
        Ok(QueryBuilder::new(self.connect().await?, table))
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("connected", &self.connection().is_some())
            .finish()
    }
}
