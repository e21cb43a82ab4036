//! SELECT rendering
//!
//! [`Select`] accumulates the parts of a query and renders them in keyword
//! order:
//!
//! ```text
//! SELECT <cols> FROM <table> [<KIND> JOIN ...]* [WHERE ...] [ORDER BY ...] [LIMIT n]
//! ```
//!
//! Only filter values become parameters; joins, orderings and the limit are
//! rendered inline.

use serde_json::Value;

use crate::sql::statement::Statement;
use crate::types::{Filter, Join, JoinKind, Order};

/// SELECT state for a single table, without a connection attached
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    table: String,
    columns: Vec<String>,
    joins: Vec<Join>,
    filters: Vec<Filter>,
    orders: Vec<Order>,
    limit: Option<u64>,
    params: Vec<Value>,
}

impl Select {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: vec!["*".to_string()],
            joins: Vec::new(),
            filters: Vec::new(),
            orders: Vec::new(),
            limit: None,
            params: Vec::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Replace the selected columns
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add an AND-combined `column operator ?` predicate and bind `value` to it
    pub fn filter(
        mut self,
        column: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            operator: operator.into(),
        });
        self.params.push(value.into());
        self
    }

    /// Append an ordering; the direction is upper-cased
    pub fn order_by(mut self, column: impl Into<String>, direction: impl AsRef<str>) -> Self {
        self.orders.push(Order::new(column, direction));
        self
    }

    /// Cap the number of rows; the last call wins
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn join(
        self,
        table: impl Into<String>,
        first: impl Into<String>,
        operator: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        self.push_join(JoinKind::Inner, table, first, operator, second)
    }

    pub fn left_join(
        self,
        table: impl Into<String>,
        first: impl Into<String>,
        operator: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        self.push_join(JoinKind::Left, table, first, operator, second)
    }

    fn push_join(
        mut self,
        kind: JoinKind,
        table: impl Into<String>,
        first: impl Into<String>,
        operator: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        self.joins.push(Join {
            kind,
            table: table.into(),
            first: first.into(),
            operator: operator.into(),
            second: second.into(),
        });
        self
    }

    /// Parameters bound so far, in filter order
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Render the SQL text
    pub fn to_sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.columns.join(", "), self.table);

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.to_string());
        }

        if !self.filters.is_empty() {
            let clauses: Vec<String> = self.filters.iter().map(ToString::to_string).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if !self.orders.is_empty() {
            let clauses: Vec<String> = self.orders.iter().map(ToString::to_string).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&clauses.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        sql
    }

    /// Render the SQL text together with its parameters
    pub fn to_statement(&self) -> Statement {
        Statement::new(self.to_sql(), self.params.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ==================== Basic Rendering ====================

    #[test]
    fn test_default_selects_everything() {
        let stmt = Select::new("users").to_statement();

        assert_eq!(stmt.sql(), "SELECT * FROM users");
        assert!(stmt.params().is_empty());
    }

    #[test]
    fn test_full_query() {
        let stmt = Select::new("t")
            .select(["a", "b"])
            .filter("x", "=", 1)
            .order_by("a", "asc")
            .limit(5)
            .to_statement();

        assert_eq!(stmt.sql(), "SELECT a, b FROM t WHERE x = ? ORDER BY a ASC LIMIT 5");
        assert_eq!(stmt.params(), &[json!(1)]);
    }

    #[test]
    fn test_select_replaces_columns() {
        let sql = Select::new("users")
            .select(["id"])
            .select(vec!["name".to_string(), "email".to_string()])
            .to_sql();

        assert_eq!(sql, "SELECT name, email FROM users");
    }

    // ==================== Filters ====================

    #[test]
    fn test_filters_and_combine_in_call_order() {
        let stmt = Select::new("users")
            .filter("status", "=", "active")
            .filter("age", ">=", 18)
            .filter("name", "LIKE", "a%")
            .to_statement();

        assert_eq!(
            stmt.sql(),
            "SELECT * FROM users WHERE status = ? AND age >= ? AND name LIKE ?"
        );
        assert_eq!(stmt.params(), &[json!("active"), json!(18), json!("a%")]);
    }

    #[test]
    fn test_placeholder_count_matches_params() {
        let mut select = Select::new("events");
        for i in 0..7 {
            select = select.filter(format!("c{}", i), "<>", i);
        }
        select = select.join("a", "a.id", "=", "events.a_id").limit(3);

        let stmt = select.to_statement();
        assert_eq!(stmt.sql().matches('?').count(), stmt.params().len());
        let expected: Vec<Value> = (0..7).map(Value::from).collect();
        assert_eq!(stmt.params(), expected.as_slice());
    }

    #[test]
    fn test_null_filter_value_is_still_a_parameter() {
        let stmt = Select::new("users")
            .filter("deleted_at", "IS", Value::Null)
            .to_statement();

        assert_eq!(stmt.sql(), "SELECT * FROM users WHERE deleted_at IS ?");
        assert_eq!(stmt.params(), &[Value::Null]);
    }

    // ==================== Joins ====================

    #[test]
    fn test_join_renders_after_from_before_where() {
        let sql = Select::new("users")
            .filter("users.active", "=", true)
            .join("roles", "users.role_id", "=", "roles.id")
            .to_sql();

        assert_eq!(
            sql,
            "SELECT * FROM users INNER JOIN roles ON users.role_id = roles.id WHERE users.active = ?"
        );
    }

    #[test]
    fn test_joins_keep_insertion_order() {
        let sql = Select::new("orders")
            .left_join("coupons", "orders.coupon_id", "=", "coupons.id")
            .join("customers", "orders.customer_id", "=", "customers.id")
            .to_sql();

        assert_eq!(
            sql,
            "SELECT * FROM orders LEFT JOIN coupons ON orders.coupon_id = coupons.id \
             INNER JOIN customers ON orders.customer_id = customers.id"
        );
    }

    #[test]
    fn test_joins_add_no_params() {
        let select = Select::new("users").join("roles", "users.role_id", "=", "roles.id");
        assert!(select.params().is_empty());
    }

    // ==================== Ordering & Limit ====================

    #[test]
    fn test_multiple_orderings() {
        let sql = Select::new("users")
            .order_by("last_name", "asc")
            .order_by("created_at", "Desc")
            .to_sql();

        assert_eq!(sql, "SELECT * FROM users ORDER BY last_name ASC, created_at DESC");
    }

    #[test]
    fn test_last_limit_wins() {
        let sql = Select::new("users").limit(10).limit(2).to_sql();
        assert_eq!(sql, "SELECT * FROM users LIMIT 2");
    }

    // ==================== Determinism ====================

    #[test]
    fn test_rendering_is_deterministic() {
        let build = || {
            Select::new("users")
                .select(["users.id", "roles.name"])
                .join("roles", "users.role_id", "=", "roles.id")
                .filter("roles.name", "!=", "guest")
                .order_by("users.id", "desc")
                .limit(20)
        };

        assert_eq!(build().to_statement(), build().to_statement());
        let select = build();
        assert_eq!(select.to_sql(), select.to_sql());
    }
}
