//! Fluent query builder bound to a connection handle

use serde_json::Value;

use crate::connection::DbPool;
use crate::error::Result;
use crate::sql::select::Select;
use crate::sql::statement::Statement;
use crate::types::Attributes;

/// Chainable SELECT builder for one table
///
/// Every chain method only accumulates state; nothing runs until
/// [`QueryBuilder::get`] or [`QueryBuilder::first`].
///
/// ```rust,no_run
/// # async fn demo(db: &rowkit::Database) -> rowkit::Result<()> {
/// let pool = db.connect().await?;
/// let rows = rowkit::QueryBuilder::new(pool, "users")
///     .select(["users.id", "roles.name"])
///     .join("roles", "users.role_id", "=", "roles.id")
///     .filter("users.active", "=", true)
///     .order_by("users.id", "desc")
///     .limit(10)
///     .get()
///     .await?;
/// # let _ = rows;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    pool: DbPool,
    select: Select,
}

impl QueryBuilder {
    pub fn new(pool: DbPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            select: Select::new(table),
        }
    }

    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = self.select.select(columns);
        self
    }

    /// `WHERE column operator ?`, AND-combined with earlier filters
    pub fn filter(
        mut self,
        column: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.select = self.select.filter(column, operator, value);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: impl AsRef<str>) -> Self {
        self.select = self.select.order_by(column, direction);
        self
    }

    pub fn order_by_asc(self, column: impl Into<String>) -> Self {
        self.order_by(column, "ASC")
    }

    pub fn order_by_desc(self, column: impl Into<String>) -> Self {
        self.order_by(column, "DESC")
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.select = self.select.limit(limit);
        self
    }

    pub fn join(
        mut self,
        table: impl Into<String>,
        first: impl Into<String>,
        operator: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        self.select = self.select.join(table, first, operator, second);
        self
    }

    pub fn left_join(
        mut self,
        table: impl Into<String>,
        first: impl Into<String>,
        operator: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        self.select = self.select.left_join(table, first, operator, second);
        self
    }

    /// The statement [`QueryBuilder::get`] would execute
    pub fn to_statement(&self) -> Statement {
        self.select.to_statement()
    }

    /// Execute the query and return every row
    pub async fn get(&self) -> Result<Vec<Attributes>> {
        self.to_statement().fetch_all(&self.pool).await
    }

    /// Execute the query and return the first row, if any
    pub async fn first(&self) -> Result<Option<Attributes>> {
        Ok(self.get().await?.into_iter().next())
    }
}
