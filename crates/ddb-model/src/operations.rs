//! DynamoDB operation enum.

use std::fmt;

/// Prefix of the `X-Amz-Target` header for the 2012-08-10 API.
pub const TARGET_PREFIX: &str = "DynamoDB_20120810.";

/// Operations issued by the lookup pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynamoDBOperation {
    /// Describe a table.
    DescribeTable,
    /// Get an item by primary key.
    GetItem,
}

impl DynamoDBOperation {
    /// Returns the AWS operation name string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DescribeTable => "DescribeTable",
            Self::GetItem => "GetItem",
        }
    }

    /// Returns the full `X-Amz-Target` header value.
    #[must_use]
    pub fn target(&self) -> String {
        format!("{TARGET_PREFIX}{}", self.as_str())
    }
}

impl fmt::Display for DynamoDBOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
