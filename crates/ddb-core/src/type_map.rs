//! The mapping from wire type tags to native types.
//!
//! A [`TypeMap`] is built once at start-up and passed by reference to the
//! record synthesizer and the codec. It must be injective: the codec encodes a
//! native scalar through the inverse mapping, which would be ambiguous if two
//! tags shared a native type.

use std::collections::HashMap;

use ddb_model::AttributeType;
use thiserror::Error;

use crate::value::NativeType;

/// Errors raised while building a [`TypeMap`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeMapError {
    /// Two tags map to the same native type.
    #[error("native type '{native}' is mapped from both '{first}' and '{second}'")]
    NotInjective {
        /// The shared native type.
        native: NativeType,
        /// The first tag mapped to it.
        first: String,
        /// The second tag mapped to it.
        second: String,
    },

    /// A tag appears more than once.
    #[error("wire type '{0}' is mapped more than once")]
    DuplicateTag(String),

    /// The native type cannot hold values of the tag.
    #[error("wire type '{tag}' cannot be represented as {native}")]
    Incompatible {
        /// The wire tag.
        tag: String,
        /// The requested native type.
        native: NativeType,
    },

    /// `L` and `M` are decoded structurally and never mapped.
    #[error("wire type '{0}' is structural and cannot be mapped")]
    Structural(String),

    /// The tag is not a known wire type.
    #[error("unknown wire type '{0}'")]
    UnknownTag(String),
}

/// Injective mapping from scalar wire tags to native types.
#[derive(Debug, Clone)]
pub struct TypeMap {
    forward: HashMap<AttributeType, NativeType>,
    inverse: HashMap<NativeType, AttributeType>,
}

impl TypeMap {
    /// Build a map from `(tag, native type)` pairs.
    ///
    /// Besides the natural pairing of each tag with its own native type, `N`
    /// may map to `Text` and `NS` to `TextSet` to keep numbers as their
    /// literal text.
    ///
    /// # Errors
    ///
    /// Returns a [`TypeMapError`] when a pair is not representable or the map
    /// would not be injective.
    pub fn new(
        entries: impl IntoIterator<Item = (AttributeType, NativeType)>,
    ) -> Result<Self, TypeMapError> {
        let mut forward = HashMap::new();
        let mut inverse: HashMap<NativeType, AttributeType> = HashMap::new();

        for (tag, native) in entries {
            match &tag {
                AttributeType::Unknown(s) => return Err(TypeMapError::UnknownTag(s.clone())),
                AttributeType::List | AttributeType::Map => {
                    return Err(TypeMapError::Structural(tag.to_string()));
                }
                _ => {}
            }
            if !is_representable(&tag, native) {
                return Err(TypeMapError::Incompatible {
                    tag: tag.to_string(),
                    native,
                });
            }
            if forward.contains_key(&tag) {
                return Err(TypeMapError::DuplicateTag(tag.to_string()));
            }
            if let Some(first) = inverse.get(&native) {
                return Err(TypeMapError::NotInjective {
                    native,
                    first: first.to_string(),
                    second: tag.to_string(),
                });
            }
            forward.insert(tag.clone(), native);
            inverse.insert(native, tag);
        }

        Ok(Self { forward, inverse })
    }

    /// `S` to text, `N` to decimal, `B` to bytes: every type a key may have.
    #[must_use]
    pub fn standard() -> Self {
        Self::from_natural(&[
            AttributeType::String,
            AttributeType::Number,
            AttributeType::Binary,
        ])
    }

    /// The standard map plus booleans, null and the three set types, enough
    /// to decode any item.
    #[must_use]
    pub fn complete() -> Self {
        Self::from_natural(&[
            AttributeType::String,
            AttributeType::Number,
            AttributeType::Binary,
            AttributeType::Boolean,
            AttributeType::Null,
            AttributeType::StringSet,
            AttributeType::NumberSet,
            AttributeType::BinarySet,
        ])
    }

    fn from_natural(tags: &[AttributeType]) -> Self {
        let mut forward = HashMap::new();
        let mut inverse = HashMap::new();
        for tag in tags {
            if let Some(native) = natural_native_type(tag) {
                forward.insert(tag.clone(), native);
                inverse.insert(native, tag.clone());
            }
        }
        Self { forward, inverse }
    }

    /// The native type a wire tag maps to, if any.
    #[must_use]
    pub fn native_type(&self, tag: &AttributeType) -> Option<NativeType> {
        self.forward.get(tag).copied()
    }

    /// The wire tag a native type encodes to, if any.
    #[must_use]
    pub fn wire_type(&self, native: NativeType) -> Option<&AttributeType> {
        self.inverse.get(&native)
    }

    /// Number of mapped tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Returns `true` if nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

impl Default for TypeMap {
    fn default() -> Self {
        Self::standard()
    }
}

/// The native type that holds a tag's payload without conversion.
#[must_use]
pub fn natural_native_type(tag: &AttributeType) -> Option<NativeType> {
    Some(match tag {
        AttributeType::String => NativeType::Text,
        AttributeType::Number => NativeType::Number,
        AttributeType::Binary => NativeType::Binary,
        AttributeType::Boolean => NativeType::Bool,
        AttributeType::Null => NativeType::Null,
        AttributeType::List => NativeType::List,
        AttributeType::Map => NativeType::Map,
        AttributeType::StringSet => NativeType::TextSet,
        AttributeType::NumberSet => NativeType::NumberSet,
        AttributeType::BinarySet => NativeType::BinarySet,
        AttributeType::Unknown(_) => return None,
    })
}

fn is_representable(tag: &AttributeType, native: NativeType) -> bool {
    natural_native_type(tag) == Some(native)
        || matches!(
            (tag, native),
            (AttributeType::Number, NativeType::Text)
                | (AttributeType::NumberSet, NativeType::TextSet)
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_map_standard_key_types() {
        let map = TypeMap::standard();
        assert_eq!(map.len(), 3);
        assert_eq!(map.native_type(&AttributeType::Number), Some(NativeType::Number));
        assert_eq!(map.wire_type(NativeType::Binary), Some(&AttributeType::Binary));
        assert_eq!(map.native_type(&AttributeType::Boolean), None);
    }

    #[test]
    fn test_should_cover_every_scalar_in_complete_map() {
        let map = TypeMap::complete();
        assert_eq!(map.len(), 8);
        assert_eq!(map.wire_type(NativeType::TextSet), Some(&AttributeType::StringSet));
        assert_eq!(map.native_type(&AttributeType::List), None);
    }

    #[test]
    fn test_should_reject_non_injective_map() {
        let err = TypeMap::new([
            (AttributeType::String, NativeType::Text),
            (AttributeType::Number, NativeType::Text),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            TypeMapError::NotInjective {
                native: NativeType::Text,
                first: "S".to_owned(),
                second: "N".to_owned(),
            }
        );
    }

    #[test]
    fn test_should_allow_numbers_as_text_without_strings() {
        let map = TypeMap::new([(AttributeType::Number, NativeType::Text)]).unwrap();
        assert_eq!(map.wire_type(NativeType::Text), Some(&AttributeType::Number));
    }

    #[test]
    fn test_should_reject_incompatible_pair() {
        let err = TypeMap::new([(AttributeType::String, NativeType::Number)]).unwrap_err();
        assert!(matches!(err, TypeMapError::Incompatible { .. }));
    }

    #[test]
    fn test_should_reject_structural_and_unknown_tags() {
        assert_eq!(
            TypeMap::new([(AttributeType::List, NativeType::List)]).unwrap_err(),
            TypeMapError::Structural("L".to_owned())
        );
        assert_eq!(
            TypeMap::new([(AttributeType::Unknown("X".to_owned()), NativeType::Text)])
                .unwrap_err(),
            TypeMapError::UnknownTag("X".to_owned())
        );
    }

    #[test]
    fn test_should_reject_duplicate_tag() {
        let err = TypeMap::new([
            (AttributeType::Number, NativeType::Number),
            (AttributeType::Number, NativeType::Text),
        ])
        .unwrap_err();
        assert_eq!(err, TypeMapError::DuplicateTag("N".to_owned()));
    }
}
