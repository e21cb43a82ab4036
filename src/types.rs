//! Core type definitions
//!
//! Includes the attribute map used for rows and the descriptors the query
//! builder accumulates (joins, filters, orderings).

use std::fmt;

use serde_json::Value;

/// Column name to value mapping for one row, in column order
pub type Attributes = serde_json::Map<String, Value>;

// ============================================================================
// Query Descriptors
// ============================================================================

/// Join flavour rendered before the `JOIN` keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Inner => f.write_str("INNER"),
            JoinKind::Left => f.write_str("LEFT"),
        }
    }
}

/// One `JOIN <table> ON <first> <operator> <second>` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: String,
    pub first: String,
    pub operator: String,
    pub second: String,
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} JOIN {} ON {} {} {}",
            self.kind, self.table, self.first, self.operator, self.second
        )
    }
}

/// One `<column> <operator> ?` predicate; the value lives in the parameter list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub operator: String,
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ?", self.column, self.operator)
    }
}

/// One `ORDER BY` entry; the direction is stored upper-cased
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: String,
}

impl Order {
    pub fn new(column: impl Into<String>, direction: impl AsRef<str>) -> Self {
        Self {
            column: column.into(),
            direction: direction.as_ref().to_uppercase(),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_display() {
        let join = Join {
            kind: JoinKind::Left,
            table: "roles".to_string(),
            first: "users.role_id".to_string(),
            operator: "=".to_string(),
            second: "roles.id".to_string(),
        };
        assert_eq!(join.to_string(), "LEFT JOIN roles ON users.role_id = roles.id");
    }

    #[test]
    fn test_filter_display() {
        let filter = Filter {
            column: "age".to_string(),
            operator: ">=".to_string(),
        };
        assert_eq!(filter.to_string(), "age >= ?");
    }

    #[test]
    fn test_order_direction_uppercased() {
        assert_eq!(Order::new("name", "desc").to_string(), "name DESC");
        assert_eq!(Order::new("name", "Asc").direction, "ASC");
    }
}
