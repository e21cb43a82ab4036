//! Rendered statements and their execution
//!
//! A [`Statement`] is SQL text with `?` placeholders plus the values bound to
//! them, in placeholder order. MySQL and SQLite share that placeholder style,
//! so the same statement runs on either [`DbPool`] variant.

use serde_json::Value;
use sqlx::mysql::MySql;
use sqlx::query::Query;
use sqlx::sqlite::Sqlite;
use sqlx::{Encode, Type};
use tracing::debug;

use crate::connection::DbPool;
use crate::error::{OrmError, Result};
use crate::sql::decode::{mysql_row_to_attributes, sqlite_row_to_attributes};
use crate::types::Attributes;

/// SQL text plus positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Value>,
}

/// Outcome of a statement that returns no rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Id generated by the last INSERT; `None` when the driver reports 0
    pub last_insert_id: Option<i64>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Execute a statement that returns no rows (INSERT, UPDATE, DELETE, DDL)
    pub async fn execute(&self, pool: &DbPool) -> Result<ExecResult> {
        debug!(sql = %self.sql, params = self.params.len(), "executing statement");

        let result = match pool {
            DbPool::MySql(pool) => bind_params::<MySql>(&self.sql, &self.params)
                .execute(pool)
                .await
                .map(|r| ExecResult {
                    rows_affected: r.rows_affected(),
                    last_insert_id: i64::try_from(r.last_insert_id())
                        .ok()
                        .filter(|id| *id != 0),
                }),
            DbPool::Sqlite(pool) => bind_params::<Sqlite>(&self.sql, &self.params)
                .execute(pool)
                .await
                .map(|r| ExecResult {
                    rows_affected: r.rows_affected(),
                    last_insert_id: Some(r.last_insert_rowid()).filter(|id| *id != 0),
                }),
        };

        result.map_err(|e| OrmError::query(&self.sql, e))
    }

    /// Execute a query and decode every row into an attribute map
    pub async fn fetch_all(&self, pool: &DbPool) -> Result<Vec<Attributes>> {
        debug!(sql = %self.sql, params = self.params.len(), "fetching rows");

        let rows: std::result::Result<Vec<Attributes>, sqlx::Error> = match pool {
            DbPool::MySql(pool) => bind_params::<MySql>(&self.sql, &self.params)
                .fetch_all(pool)
                .await
                .map(|rows| rows.iter().map(mysql_row_to_attributes).collect()),
            DbPool::Sqlite(pool) => bind_params::<Sqlite>(&self.sql, &self.params)
                .fetch_all(pool)
                .await
                .map(|rows| rows.iter().map(sqlite_row_to_attributes).collect()),
        };

        rows.map_err(|e| OrmError::query(&self.sql, e))
    }
}

/// A JSON value reduced to something every driver can bind
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Param {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<&Value> for Param {
    /// Integers beyond `i64` and arrays/objects are bound as text so no
    /// precision is lost.
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Param::Null,
            Value::Bool(b) => Param::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Param::Int(i)
                } else if n.is_f64() {
                    n.as_f64().map_or_else(|| Param::Text(n.to_string()), Param::Float)
                } else {
                    Param::Text(n.to_string())
                }
            }
            Value::String(s) => Param::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => Param::Text(value.to_string()),
        }
    }
}

type BoundQuery<'q, DB> = Query<'q, DB, <DB as sqlx::Database>::Arguments<'q>>;

/// Start a query for `sql` with every parameter bound in order
fn bind_params<'q, DB>(sql: &'q str, params: &[Value]) -> BoundQuery<'q, DB>
where
    DB: sqlx::Database,
    bool: Encode<'q, DB> + Type<DB>,
    i64: Encode<'q, DB> + Type<DB>,
    f64: Encode<'q, DB> + Type<DB>,
    String: Encode<'q, DB> + Type<DB>,
    Option<String>: Encode<'q, DB> + Type<DB>,
{
    params
        .iter()
        .fold(sqlx::query::<DB>(sql), |query, value| match Param::from(value) {
            Param::Null => query.bind(None::<String>),
            Param::Bool(b) => query.bind(b),
            Param::Int(i) => query.bind(i),
            Param::Float(f) => query.bind(f),
            Param::Text(s) => query.bind(s),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_statement_accessors() {
        let stmt = Statement::new("DELETE FROM users WHERE id = ?", vec![json!(7)]);

        assert_eq!(stmt.sql(), "DELETE FROM users WHERE id = ?");
        assert_eq!(stmt.params(), &[json!(7)]);
    }

    #[test]
    fn test_statement_equality_is_structural() {
        let a = Statement::new("SELECT * FROM t", vec![]);
        let b = Statement::new(String::from("SELECT * FROM t"), Vec::new());
        assert_eq!(a, b);
    }

    // =========================================================================
    // Parameter Conversion
    // =========================================================================

    #[test]
    fn test_param_scalars() {
        assert_eq!(Param::from(&Value::Null), Param::Null);
        assert_eq!(Param::from(&json!(true)), Param::Bool(true));
        assert_eq!(Param::from(&json!(-12)), Param::Int(-12));
        assert_eq!(Param::from(&json!(2.5)), Param::Float(2.5));
        assert_eq!(Param::from(&json!("abc")), Param::Text("abc".into()));
    }

    #[test]
    fn test_param_large_unsigned_kept_exact() {
        assert_eq!(
            Param::from(&json!(u64::MAX)),
            Param::Text("18446744073709551615".into())
        );
        assert_eq!(Param::from(&json!(i64::MAX as u64)), Param::Int(i64::MAX));
    }

    #[test]
    fn test_param_composites_as_json_text() {
        assert_eq!(Param::from(&json!([1, 2])), Param::Text("[1,2]".into()));
        assert_eq!(
            Param::from(&json!({"a": 1})),
            Param::Text("{\"a\":1}".into())
        );
    }
}
