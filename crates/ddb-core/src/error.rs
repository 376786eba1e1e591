//! Errors raised by the lookup pipeline.
//!
//! Every error is fatal to the invocation; nothing is retried and no partial
//! result is ever returned alongside one.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = FetchError> = std::result::Result<T, E>;

/// Errors raised by [`crate::fetch::fetch_item`] and the pieces it drives.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The table's key schema is malformed or incomplete.
    #[error("schema error: {0}")]
    Schema(String),

    /// A key attribute declares a wire type the type map cannot represent.
    #[error("unsupported type '{wire_type}' for key attribute '{attribute}'")]
    UnsupportedType {
        /// The key attribute.
        attribute: String,
        /// Its declared wire type.
        wire_type: String,
    },

    /// A value does not conform to the type its field declares.
    #[error("validation error: {0}")]
    Validation(String),

    /// A value could not be converted to or from its wire form.
    #[error("codec error: {0}")]
    Codec(String),

    /// No item exists at the given key.
    #[error("item not found in table '{table}'")]
    NotFound {
        /// The table that was read.
        table: String,
    },

    /// A failure reported by the store or the transport, passed through as is.
    #[error(transparent)]
    External(Box<dyn std::error::Error + Send + Sync>),
}

impl FetchError {
    /// Wrap a store or transport error.
    pub fn external(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::External(Box::new(e))
    }

    pub(crate) fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }
}
