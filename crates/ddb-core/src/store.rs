//! The boundary to the key-value store.

use std::collections::HashMap;

use ddb_model::AttributeValue;
use ddb_model::input::{DescribeTableInput, GetItemInput};
use ddb_model::output::{DescribeTableOutput, GetItemOutput};
use ddb_model::types::TableDescription;
use thiserror::Error;

use crate::error::{FetchError, Result};

/// The two reads a lookup needs from the store.
///
/// Implementations report their own failures as [`FetchError::External`];
/// wire items they cannot parse as [`FetchError::Codec`]. A missing item is
/// not an error here: it is `GetItemOutput { item: None }`.
#[async_trait::async_trait]
pub trait TableStore: Send + Sync {
    /// Fetch a table's metadata.
    async fn describe_table(&self, input: DescribeTableInput) -> Result<DescribeTableOutput>;

    /// Read one item by primary key.
    async fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput>;
}

/// Failures of [`MemoryStore`], mirroring what DynamoDB itself rejects.
#[derive(Debug, Error)]
pub enum MemoryStoreError {
    /// No table with this name.
    #[error("Requested resource not found: Table: {0} not found")]
    TableNotFound(String),

    /// The key does not name exactly the table's key attributes.
    #[error("The provided key element does not match the schema")]
    KeyMismatch,
}

#[derive(Debug, Clone)]
struct MemoryTable {
    description: TableDescription,
    items: Vec<HashMap<String, AttributeValue>>,
}

impl MemoryTable {
    fn key_names(&self) -> impl Iterator<Item = &str> {
        self.description
            .key_schema
            .iter()
            .map(|e| e.attribute_name.as_str())
    }
}

/// A [`TableStore`] holding tables in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: HashMap<String, MemoryTable>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, keyed by its `table_name`.
    #[must_use]
    pub fn with_table(mut self, description: TableDescription) -> Self {
        let name = description.table_name.clone().unwrap_or_default();
        self.tables.insert(
            name,
            MemoryTable {
                description,
                items: Vec::new(),
            },
        );
        self
    }

    /// Insert or replace an item.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryStoreError::TableNotFound`] for an unknown table and
    /// [`MemoryStoreError::KeyMismatch`] if the item lacks a key attribute.
    pub fn put_item(
        &mut self,
        table_name: &str,
        item: HashMap<String, AttributeValue>,
    ) -> Result<(), MemoryStoreError> {
        let table = self
            .tables
            .get_mut(table_name)
            .ok_or_else(|| MemoryStoreError::TableNotFound(table_name.to_owned()))?;
        if !table.key_names().all(|name| item.contains_key(name)) {
            return Err(MemoryStoreError::KeyMismatch);
        }
        let key_names: Vec<String> = table.key_names().map(ToOwned::to_owned).collect();
        table
            .items
            .retain(|existing| !key_names.iter().all(|k| existing.get(k) == item.get(k)));
        table.items.push(item);
        Ok(())
    }

    fn table(&self, name: &str) -> Result<&MemoryTable> {
        self.tables
            .get(name)
            .ok_or_else(|| FetchError::external(MemoryStoreError::TableNotFound(name.to_owned())))
    }
}

#[async_trait::async_trait]
impl TableStore for MemoryStore {
    async fn describe_table(&self, input: DescribeTableInput) -> Result<DescribeTableOutput> {
        let table = self.table(&input.table_name)?;
        Ok(DescribeTableOutput {
            table: Some(table.description.clone()),
        })
    }

    async fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput> {
        let table = self.table(&input.table_name)?;
        let key_count = table.key_names().count();
        if input.key.len() != key_count
            || !table.key_names().all(|name| input.key.contains_key(name))
        {
            return Err(FetchError::external(MemoryStoreError::KeyMismatch));
        }

        let item = table
            .items
            .iter()
            .find(|item| input.key.iter().all(|(k, v)| item.get(k) == Some(v)))
            .cloned();
        Ok(GetItemOutput { item })
    }
}
