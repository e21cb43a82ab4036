//! SQL utilities
//!
//! Provides statement rendering, the fluent query builder, execution, row
//! decoding and identifier validation.

pub mod builder;
mod decode;
pub mod sanitize;
pub mod select;
pub mod statement;
pub mod write;

pub use builder::QueryBuilder;
pub use sanitize::{RESERVED_WORDS, validate_identifier};
pub use select::Select;
pub use statement::{ExecResult, Statement};
pub use write::{delete_statement, insert_statement, update_statement};
