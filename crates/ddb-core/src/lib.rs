//! Point-lookup core for ddb.
//!
//! Given only a table name and a raw key value, [`fetch::fetch_item`] asks the
//! store for the table's key schema, synthesizes a runtime record descriptor
//! for the key, binds and encodes the caller's value, issues the read and
//! decodes the result into a [`record::Record`].
//!
//! The store itself sits behind the [`store::TableStore`] trait; the HTTP
//! implementation lives in `ddb-client`.
#![allow(clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod codec;
pub mod error;
pub mod fetch;
pub mod record;
pub mod schema;
pub mod store;
pub mod type_map;
pub mod value;

pub use codec::Codec;
pub use error::{FetchError, Result};
pub use fetch::{FetchRequest, fetch_item};
pub use record::{ItemRecord, KeyScope, Record, RecordDescriptor, RecordSynthesizer};
pub use schema::{Attribute, KeySchema, resolve_key_schema};
pub use store::{MemoryStore, TableStore};
pub use type_map::{TypeMap, TypeMapError};
pub use value::{NativeType, NativeValue};
