//! Error types for rowkit operations

use thiserror::Error;

/// Errors that can occur while connecting, building or executing statements
#[derive(Debug, Error)]
pub enum OrmError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed for '{sql}': {message}")]
    Query { sql: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid entity state: {0}")]
    InvalidState(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OrmError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Wrap a driver failure together with the statement that caused it
    pub fn query(sql: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Query {
            sql: sql.into(),
            message: err.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, OrmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_carries_sql_and_message() {
        let err = OrmError::query("SELECT * FROM t", "no such table: t");

        match &err {
            OrmError::Query { sql, message } => {
                assert_eq!(sql, "SELECT * FROM t");
                assert_eq!(message, "no such table: t");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "Query execution failed for 'SELECT * FROM t': no such table: t"
        );
    }

    #[test]
    fn test_connection_error_message() {
        let err = OrmError::connection("Access denied for user 'app'");
        assert_eq!(
            err.to_string(),
            "Database connection failed: Access denied for user 'app'"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: OrmError = io.into();
        assert!(matches!(err, OrmError::Io(_)));
    }
}
