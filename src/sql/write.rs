//! INSERT / UPDATE / DELETE rendering for single rows

use serde_json::Value;

use crate::config::Driver;
use crate::sql::statement::Statement;
use crate::types::Attributes;

/// `INSERT INTO <table> (<cols>) VALUES (?, ...)` with values in column order
///
/// With no columns every value takes its default, spelled the way `driver`
/// accepts it.
pub fn insert_statement(driver: Driver, table: &str, columns: &Attributes) -> Statement {
    if columns.is_empty() {
        let sql = match driver {
            Driver::MySql => format!("INSERT INTO {} () VALUES ()", table),
            Driver::Sqlite => format!("INSERT INTO {} DEFAULT VALUES", table),
        };
        return Statement::new(sql, Vec::new());
    }

    let names: Vec<&str> = columns.keys().map(String::as_str).collect();
    let placeholders = vec!["?"; names.len()];

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        names.join(", "),
        placeholders.join(", ")
    );

    Statement::new(sql, columns.values().cloned().collect())
}

/// `UPDATE <table> SET c = ?, ... WHERE <key_column> = ?`, key bound last
///
/// Returns `None` when there is nothing to set.
pub fn update_statement(
    table: &str,
    key_column: &str,
    key: &Value,
    columns: &Attributes,
) -> Option<Statement> {
    if columns.is_empty() {
        return None;
    }

    let set_clauses: Vec<String> = columns.keys().map(|col| format!("{} = ?", col)).collect();

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        table,
        set_clauses.join(", "),
        key_column
    );

    let mut params: Vec<Value> = columns.values().cloned().collect();
    params.push(key.clone());

    Some(Statement::new(sql, params))
}

/// `DELETE FROM <table> WHERE <key_column> = ?`
pub fn delete_statement(table: &str, key_column: &str, key: &Value) -> Statement {
    Statement::new(
        format!("DELETE FROM {} WHERE {} = ?", table, key_column),
        vec![key.clone()],
    )
}
