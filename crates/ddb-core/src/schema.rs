//! Key schema resolution from a table description.

use std::collections::HashMap;

use ddb_model::AttributeType;
use ddb_model::types::{KeyType, TableDescription};
use tracing::debug;

use crate::error::{FetchError, Result};

/// A named attribute and its declared wire type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute name.
    pub name: String,
    /// The declared wire type.
    pub wire_type: AttributeType,
}

/// The primary key structure of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    /// Partition (HASH) attribute.
    pub partition: Attribute,
    /// Sort (RANGE) attribute, if the table has one.
    pub sort: Option<Attribute>,
}

impl KeySchema {
    /// Key attributes in schema order: partition first.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        std::iter::once(&self.partition).chain(self.sort.as_ref())
    }
}

/// Join a table's key schema to its attribute definitions.
///
/// # Errors
///
/// Returns [`FetchError::Schema`] if a key element names an attribute with no
/// definition, if there is no `HASH` element, or if a role appears twice.
pub fn resolve_key_schema(table: &TableDescription) -> Result<KeySchema> {
    let table_name = table.table_name.as_deref().unwrap_or("<unnamed>");
    let definitions: HashMap<&str, &AttributeType> = table
        .attribute_definitions
        .iter()
        .map(|def| (def.attribute_name.as_str(), &def.attribute_type))
        .collect();

    let mut partition = None;
    let mut sort = None;

    for element in &table.key_schema {
        let wire_type = definitions
            .get(element.attribute_name.as_str())
            .ok_or_else(|| {
                FetchError::schema(format!(
                    "key attribute '{}' of table '{table_name}' has no attribute definition",
                    element.attribute_name
                ))
            })?;
        let attribute = Attribute {
            name: element.attribute_name.clone(),
            wire_type: (*wire_type).clone(),
        };
        let slot = match element.key_type {
            KeyType::Hash => &mut partition,
            KeyType::Range => &mut sort,
        };
        if slot.replace(attribute).is_some() {
            return Err(FetchError::schema(format!(
                "key schema of table '{table_name}' has more than one {} element",
                element.key_type
            )));
        }
    }

    let partition = partition.ok_or_else(|| {
        FetchError::schema(format!(
            "key schema of table '{table_name}' must contain a HASH key element"
        ))
    })?;

    debug!(
        table = table_name,
        partition = %partition.name,
        partition_type = %partition.wire_type,
        sort = sort.as_ref().map_or("-", |a: &Attribute| a.name.as_str()),
        "Resolved key schema"
    );

    Ok(KeySchema { partition, sort })
}
