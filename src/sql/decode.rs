//! Row decoding into attribute maps
//!
//! Columns are read by their reported type. Temporal values come back as
//! strings, decimals as JSON numbers and JSON columns as parsed values.
//! Anything not covered falls back to text.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use sqlx::mysql::MySqlRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::types::Attributes;

/// Output format for date-time columns; fractional seconds only when present
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Decode a MySQL row, keyed by column name in column order
///
/// Duplicate column names (e.g. `SELECT *` over a join) keep the last value.
pub(crate) fn mysql_row_to_attributes(row: &MySqlRow) -> Attributes {
    row.columns()
        .iter()
        .map(|col| {
            let value = decode_mysql_column(row, col.ordinal(), col.type_info().name());
            (col.name().to_string(), value)
        })
        .collect()
}

/// Decode a SQLite row, keyed by column name in column order
pub(crate) fn sqlite_row_to_attributes(row: &SqliteRow) -> Attributes {
    row.columns()
        .iter()
        .map(|col| {
            let value = decode_sqlite_column(row, col.ordinal(), col.type_info().name());
            (col.name().to_string(), value)
        })
        .collect()
}

fn decode_mysql_column(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if !raw.is_null() => {}
        _ => return Value::Null,
    }

    let decoded = match type_name {
        "BOOLEAN" => row.try_get::<bool, _>(index).map(Value::Bool),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            row.try_get::<i64, _>(index).map(Value::from)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => row.try_get::<u64, _>(index).map(Value::from),
        "YEAR" => row.try_get_unchecked::<u16, _>(index).map(Value::from),
        "FLOAT" => row
            .try_get::<f32, _>(index)
            .map(|v| float_value(f64::from(v))),
        "DOUBLE" => row.try_get::<f64, _>(index).map(float_value),
        "DECIMAL" => row.try_get::<Decimal, _>(index).map(decimal_value),
        "DATETIME" | "TIMESTAMP" => row
            .try_get::<NaiveDateTime, _>(index)
            .map(|v| Value::String(v.format(DATETIME_FORMAT).to_string())),
        "DATE" => row
            .try_get::<NaiveDate, _>(index)
            .map(|v| Value::String(v.to_string())),
        "TIME" => row
            .try_get::<NaiveTime, _>(index)
            .map(|v| Value::String(v.to_string())),
        "JSON" => row.try_get::<Value, _>(index),
        _ => row.try_get::<String, _>(index).map(Value::String),
    };

    decoded.unwrap_or_else(|_| bytes_value(row.try_get_unchecked::<Vec<u8>, _>(index)))
}

/// SQLite values are decoded by storage class; only a declared `BOOLEAN`
/// column is mapped back to a JSON bool.
fn decode_sqlite_column(row: &SqliteRow, index: usize, declared: &str) -> Value {
    let storage = match row.try_get_raw(index) {
        Ok(raw) if !raw.is_null() => raw.type_info().name().to_string(),
        _ => return Value::Null,
    };

    if declared == "BOOLEAN" {
        if let Ok(v) = row.try_get::<bool, _>(index) {
            return Value::Bool(v);
        }
    }

    let decoded = match storage.as_str() {
        "INTEGER" => row.try_get::<i64, _>(index).map(Value::from),
        "REAL" => row.try_get::<f64, _>(index).map(float_value),
        "TEXT" => row.try_get::<String, _>(index).map(Value::String),
        _ => return bytes_value(row.try_get::<Vec<u8>, _>(index)),
    };

    decoded.unwrap_or_else(|_| bytes_value(row.try_get_unchecked::<Vec<u8>, _>(index)))
}

/// NaN and infinities have no JSON form
fn float_value(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

/// Parsed from the decimal text so the nearest JSON number is exact
fn decimal_value(d: Decimal) -> Value {
    let text = d.to_string();
    Number::from_str(&text)
        .map(Value::Number)
        .unwrap_or(Value::String(text))
}

fn bytes_value(bytes: Result<Vec<u8>, sqlx::Error>) -> Value {
    match bytes {
        Ok(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        Err(_) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_float_value() {
        assert_eq!(float_value(2.5), json!(2.5));
        assert_eq!(float_value(f64::NAN), Value::Null);
        assert_eq!(float_value(f64::INFINITY), Value::Null);
    }

    #[test]
    fn test_decimal_value_is_number() {
        let d = Decimal::from_str("19.99").unwrap();
        assert_eq!(decimal_value(d), json!(19.99));
        assert_eq!(decimal_value(Decimal::from(42)), json!(42));
        assert_eq!(decimal_value(Decimal::from_str("-0.5").unwrap()), json!(-0.5));
    }

    #[test]
    fn test_datetime_format() {
        let dt = NaiveDateTime::parse_from_str("2024-05-01 10:30:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        assert_eq!(dt.format(DATETIME_FORMAT).to_string(), "2024-05-01 10:30:00");
    }

    #[test]
    fn test_bytes_value_lossy() {
        assert_eq!(bytes_value(Ok(b"abc".to_vec())), json!("abc"));
        assert_eq!(bytes_value(Err(sqlx::Error::RowNotFound)), Value::Null);
    }
}
