//! DynamoDB wire types for ddb.
//!
//! Only the two operations a point lookup needs are modelled here:
//! `DescribeTable` (to discover the key schema) and `GetItem`. The types are
//! hand-written serde structs since DynamoDB's `awsJson1_0` protocol maps
//! directly onto `PascalCase` derives.
// "DynamoDB" appears in virtually every doc comment in this crate.
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod attribute_value;
pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod types;

pub use attribute_value::AttributeValue;
pub use error::{DynamoDBError, DynamoDBErrorCode};
pub use operations::DynamoDBOperation;
pub use types::AttributeType;
