//! Active-record persistence for [`Model`] types
//!
//! A [`Record`] holds one row's attributes in column order and decides on
//! `save` whether to INSERT (no key yet) or UPDATE (key present).

use std::fmt;
use std::marker::PhantomData;

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::config::Driver;
use crate::connection::Database;
use crate::error::{OrmError, Result};
use crate::model::Model;
use crate::sql::builder::QueryBuilder;
use crate::sql::statement::Statement;
use crate::sql::write::{delete_statement, insert_statement, update_statement};
use crate::types::Attributes;

/// Lifecycle position of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    /// No key yet; `save` inserts
    Transient,
    /// Key present; `save` updates
    Persisted,
    /// Removed by `delete`; further writes are rejected
    Deleted,
}

/// One row of the table declared by `M`
pub struct Record<M: Model> {
    attributes: Attributes,
    deleted: bool,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Record<M> {
    /// Empty, transient record
    pub fn new() -> Self {
        Self::from_attributes(Attributes::new())
    }

    /// Hydrate a record from a result row
    pub fn from_attributes(attributes: Attributes) -> Self {
        Self {
            attributes,
            deleted: false,
            _model: PhantomData,
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.attributes.get(column)
    }

    /// Set an attribute, returning the previous value
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes.insert(column.into(), value.into())
    }

    /// Builder-style [`Record::set`]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// All attributes, hidden ones included
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }

    /// The primary-key value; a missing or NULL key counts as unset
    pub fn key(&self) -> Option<&Value> {
        self.attributes
            .get(M::PRIMARY_KEY)
            .filter(|value| !value.is_null())
    }

    pub fn state(&self) -> EntityState {
        if self.deleted {
            EntityState::Deleted
        } else if self.key().is_some() {
            EntityState::Persisted
        } else {
            EntityState::Transient
        }
    }

    /// Whether `column` is declared fillable
    ///
    /// Informational only: `save` writes every non-guarded attribute.
    pub fn is_fillable(column: &str) -> bool {
        M::FILLABLE.contains(&column)
    }

    /// Attributes minus the hidden columns, for serialization
    pub fn visible_attributes(&self) -> Attributes {
        self.attributes
            .iter()
            .filter(|(column, _)| !M::HIDDEN.contains(&column.as_str()))
            .map(|(column, value)| (column.clone(), value.clone()))
            .collect()
    }

    fn writable_attributes(&self, include_key: bool) -> Attributes {
        self.attributes
            .iter()
            .filter(|(column, _)| !M::GUARDED.contains(&column.as_str()))
            .filter(|(column, _)| include_key || column.as_str() != M::PRIMARY_KEY)
            .map(|(column, value)| (column.clone(), value.clone()))
            .collect()
    }

    /// The INSERT `save` would run on a transient record
    pub fn insert_statement(&self, driver: Driver, table: &str) -> Statement {
        insert_statement(driver, table, &self.writable_attributes(true))
    }

    /// The UPDATE `save` would run on a persisted record
    ///
    /// `None` without a key or without any writable column.
    pub fn update_statement(&self, table: &str) -> Option<Statement> {
        let key = self.key()?;
        update_statement(table, M::PRIMARY_KEY, key, &self.writable_attributes(false))
    }

    // =========================================================================
    // Database Operations
    // =========================================================================

    /// Query builder bound to this model's table
    pub async fn query(db: &Database) -> Result<QueryBuilder> {
        let table = db.register::<M>()?;
        Ok(QueryBuilder::new(db.connect().await?, &*table))
    }

    /// Load the row whose primary key equals `id`
    pub async fn find(db: &Database, id: impl Into<Value>) -> Result<Option<Self>> {
        let row = Self::query(db)
            .await?
            .filter(M::PRIMARY_KEY, "=", id)
            .limit(1)
            .first()
            .await?;

        Ok(row.map(Self::from_attributes))
    }

    /// Load every row, in the order the database returns them
    pub async fn all(db: &Database) -> Result<Vec<Self>> {
        let rows = Self::query(db).await?.get().await?;
        Ok(rows.into_iter().map(Self::from_attributes).collect())
    }

    /// Insert or update, depending on whether the key is set
    ///
    /// Returns whether the write affected at least one row. An update with
    /// no writable column runs nothing and returns `false`.
    pub async fn save(&mut self, db: &Database) -> Result<bool> {
        self.ensure_not_deleted("save")?;
        let table = db.register::<M>()?;

        if self.key().is_some() {
            self.perform_update(db, &table).await
        } else {
            self.perform_insert(db, &table).await
        }
    }

    /// Delete the row by primary key
    ///
    /// Returns `false` without touching the database when the key is unset.
    pub async fn delete(&mut self, db: &Database) -> Result<bool> {
        self.ensure_not_deleted("delete")?;

        let Some(key) = self.key() else {
            debug!(model = M::NAME, "delete skipped: no primary key");
            return Ok(false);
        };

        let table = db.register::<M>()?;
        let pool = db.connect().await?;
        delete_statement(&table, M::PRIMARY_KEY, key)
            .execute(&pool)
            .await?;

        self.deleted = true;
        Ok(true)
    }

    async fn perform_insert(&mut self, db: &Database, table: &str) -> Result<bool> {
        let pool = db.connect().await?;
        let result = self
            .insert_statement(pool.driver(), table)
            .execute(&pool)
            .await?;

        let inserted = result.rows_affected > 0;
        if inserted {
            if let Some(id) = result.last_insert_id {
                self.attributes
                    .insert(M::PRIMARY_KEY.to_string(), Value::from(id));
            }
            debug!(model = M::NAME, key = ?self.key(), "inserted record");
        }

        Ok(inserted)
    }

    async fn perform_update(&mut self, db: &Database, table: &str) -> Result<bool> {
        let Some(statement) = self.update_statement(table) else {
            debug!(model = M::NAME, "update skipped: no writable attributes");
            return Ok(false);
        };

        let pool = db.connect().await?;
        let result = statement.execute(&pool).await?;
        Ok(result.rows_affected > 0)
    }

    fn ensure_not_deleted(&self, operation: &str) -> Result<()> {
        if self.deleted {
            return Err(OrmError::invalid_state(format!(
                "cannot {} a deleted {} record",
                operation,
                M::NAME
            )));
        }
        Ok(())
    }
}

impl<M: Model> Default for Record<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> Clone for Record<M> {
    fn clone(&self) -> Self {
        Self {
            attributes: self.attributes.clone(),
            deleted: self.deleted,
            _model: PhantomData,
        }
    }
}

impl<M: Model> PartialEq for Record<M> {
    fn eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes && self.deleted == other.deleted
    }
}

impl<M: Model> fmt::Debug for Record<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("model", &M::NAME)
            .field("state", &self.state())
            .field("attributes", &self.visible_attributes())
            .finish()
    }
}

impl<M: Model> From<Attributes> for Record<M> {
    fn from(attributes: Attributes) -> Self {
        Self::from_attributes(attributes)
    }
}

/// Serializes the visible attributes only
impl<M: Model> Serialize for Record<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.visible_attributes().serialize(serializer)
    }
}
