//! The lookup pipeline.

use ddb_model::input::{DescribeTableInput, GetItemInput};
use tracing::{debug, info, warn};

use crate::codec::Codec;
use crate::error::{FetchError, Result};
use crate::record::{ItemRecord, KeyScope, RecordSynthesizer};
use crate::schema::resolve_key_schema;
use crate::store::TableStore;
use crate::type_map::TypeMap;

/// What to look up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    /// Table to read from.
    pub table_name: String,
    /// Raw partition key value.
    pub partition_value: String,
    /// Raw sort key value, for tables with a composite key.
    pub sort_value: Option<String>,
    /// Ask for a strongly consistent read.
    pub consistent_read: bool,
}

impl FetchRequest {
    /// Look up `partition_value` in `table_name`.
    pub fn new(table_name: impl Into<String>, partition_value: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            partition_value: partition_value.into(),
            ..Default::default()
        }
    }

    /// Also address the sort key.
    #[must_use]
    pub fn with_sort_value(mut self, sort_value: impl Into<String>) -> Self {
        self.sort_value = Some(sort_value.into());
        self
    }

    /// Request a strongly consistent read.
    #[must_use]
    pub fn with_consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = consistent_read;
        self
    }
}

/// Fetch one item, discovering the table's key schema on the way.
///
/// Describes the table, synthesizes the key record, binds and encodes the raw
/// key values, reads the item and decodes it into an item record whose key
/// fields carry their declared native types.
///
/// A sort value for a table without a sort key is rejected. Omitting the sort
/// value for a table that has one still issues the partition-only read, which
/// the store is expected to refuse.
///
/// # Errors
///
/// Any [`FetchError`]; [`FetchError::NotFound`] when no item has the key.
pub async fn fetch_item(
    store: &dyn TableStore,
    type_map: &TypeMap,
    request: &FetchRequest,
) -> Result<ItemRecord> {
    let table_name = request.table_name.as_str();

    let described = store
        .describe_table(DescribeTableInput::new(table_name))
        .await?;
    let table = described.table.ok_or_else(|| {
        FetchError::Schema(format!("no description returned for table '{table_name}'"))
    })?;
    let schema = resolve_key_schema(&table)?;

    let scope = match (&request.sort_value, &schema.sort) {
        (Some(_), _) => KeyScope::PartitionAndSort,
        (None, Some(sort)) => {
            warn!(
                table = table_name,
                sort_key = %sort.name,
                "Table has a sort key but no sort value was given; looking up by partition key only"
            );
            KeyScope::Partition
        }
        (None, None) => KeyScope::Partition,
    };

    let synthesizer = RecordSynthesizer::new(type_map);
    let key_descriptor = synthesizer.key_record(&schema, scope)?;

    let mut raw = vec![(schema.partition.name.as_str(), request.partition_value.as_str())];
    if let (Some(value), Some(sort)) = (&request.sort_value, &schema.sort) {
        raw.push((sort.name.as_str(), value.as_str()));
    }
    let key = key_descriptor.bind(raw)?;

    let codec = Codec::new(type_map);
    let wire_key = codec.encode_record(&key)?;
    debug!(table = table_name, key = %key, "Encoded lookup key");

    let output = store
        .get_item(GetItemInput {
            table_name: table_name.to_owned(),
            key: wire_key,
            consistent_read: request.consistent_read.then_some(true),
            ..Default::default()
        })
        .await?;

    let wire_item = output.item.ok_or_else(|| FetchError::NotFound {
        table: table_name.to_owned(),
    })?;
    let decoded = codec.decode_item(&wire_item)?;
    let record = synthesizer.item_record(&key_descriptor).validate(decoded)?;

    info!(table = table_name, attributes = record.len(), "Fetched item");
    Ok(record)
}
