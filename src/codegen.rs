//! Model source generation
//!
//! Turns table names into Rust source files declaring a [`model!`](crate::model)
//! for each table. Used by the `rowkit-gen` binary.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{OrmError, Result};
use crate::model::derive_table_name;
use crate::sql::sanitize::validate_identifier;

/// Type name for a table: strip `prefix`, drop one trailing `s`, CamelCase the rest
///
/// ```
/// use rowkit::codegen::model_name_for_table;
///
/// assert_eq!(model_name_for_table("ngb_alarmes_categoria", Some("ngb_")), "AlarmesCategoria");
/// assert_eq!(model_name_for_table("order_lines", None), "OrderLine");
/// ```
pub fn model_name_for_table(table: &str, strip_prefix: Option<&str>) -> String {
    let name = strip_prefix
        .and_then(|prefix| table.strip_prefix(prefix))
        .unwrap_or(table);
    let name = name.strip_suffix('s').unwrap_or(name);

    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Source text declaring the model for `table`
pub fn render_model(table: &str, strip_prefix: Option<&str>) -> Result<String> {
    validate_identifier(table).map_err(OrmError::validation)?;

    let name = model_name_for_table(table, strip_prefix);
    if name.is_empty() {
        return Err(OrmError::validation(format!(
            "Table '{}' does not yield a type name",
            table
        )));
    }

    Ok(format!(
        r#"use rowkit::model;

model! {{
    pub struct {name};
    table = "{table}";
    fillable = [];
    guarded = ["id"];
}}
"#
    ))
}

/// Write one `<snake_case>.rs` file per table into `out_dir`
///
/// Returns the written paths in input order.
pub fn write_models<I>(tables: I, out_dir: &Path, strip_prefix: Option<&str>) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fs::create_dir_all(out_dir)?;

    let mut written = Vec::new();
    for table in tables {
        let table = table.as_ref();
        let source = render_model(table, strip_prefix)?;
        let name = model_name_for_table(table, strip_prefix);
        let path = out_dir.join(format!("{}.rs", derive_table_name(&name)));

        fs::write(&path, source)?;
        info!("Generated model {} for table {}", name, table);
        written.push(path);
    }

    Ok(written)
}
