//! Native values: what attribute values become once their wire tag is gone.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use bytes::Bytes;

/// The in-memory type a wire type maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NativeType {
    /// UTF-8 text.
    Text,
    /// Arbitrary-precision decimal.
    Number,
    /// Raw bytes.
    Binary,
    /// Boolean.
    Bool,
    /// The null marker.
    Null,
    /// Ordered list of values.
    List,
    /// Name to value mapping.
    Map,
    /// Set of texts.
    TextSet,
    /// Set of decimals.
    NumberSet,
    /// Set of byte strings.
    BinarySet,
}

impl NativeType {
    /// Returns a short lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Binary => "binary",
            Self::Bool => "bool",
            Self::Null => "null",
            Self::List => "list",
            Self::Map => "map",
            Self::TextSet => "text set",
            Self::NumberSet => "number set",
            Self::BinarySet => "binary set",
        }
    }

    /// Returns `true` for lists and maps, whose members carry their own types.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::List | Self::Map)
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    /// UTF-8 text.
    Text(String),
    /// Exact decimal.
    Number(BigDecimal),
    /// Raw bytes.
    Binary(Bytes),
    /// Boolean.
    Bool(bool),
    /// The null marker.
    Null,
    /// Ordered list.
    List(Vec<NativeValue>),
    /// Mapping, ordered by name.
    Map(BTreeMap<String, NativeValue>),
    /// Set of texts, in wire order.
    TextSet(Vec<String>),
    /// Set of decimals, in wire order.
    NumberSet(Vec<BigDecimal>),
    /// Set of byte strings, in wire order.
    BinarySet(Vec<Bytes>),
}

impl NativeValue {
    /// Returns the native type of this value.
    #[must_use]
    pub fn native_type(&self) -> NativeType {
        match self {
            Self::Text(_) => NativeType::Text,
            Self::Number(_) => NativeType::Number,
            Self::Binary(_) => NativeType::Binary,
            Self::Bool(_) => NativeType::Bool,
            Self::Null => NativeType::Null,
            Self::List(_) => NativeType::List,
            Self::Map(_) => NativeType::Map,
            Self::TextSet(_) => NativeType::TextSet,
            Self::NumberSet(_) => NativeType::NumberSet,
            Self::BinarySet(_) => NativeType::BinarySet,
        }
    }

    /// Returns the text if this is a `Text` value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the decimal if this is a `Number` value.
    #[must_use]
    pub fn as_number(&self) -> Option<&BigDecimal> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }
}

/// Parse a decimal literal as sent on the wire.
///
/// Surrounding whitespace, `NaN` and infinities are rejected.
#[must_use]
pub fn parse_number(literal: &str) -> Option<BigDecimal> {
    if literal.is_empty() || literal != literal.trim() {
        return None;
    }
    BigDecimal::from_str(literal).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_many_digit_decimal_exactly() {
        let n = parse_number("12345678901234567890.000000000000000001").unwrap();
        assert_eq!(n.to_string(), "12345678901234567890.000000000000000001");
    }

    #[test]
    fn test_should_reject_non_decimal_literals() {
        for bad in ["", "abc", " 1", "1 ", "NaN", "inf", "1.2.3"] {
            assert!(parse_number(bad).is_none(), "{bad:?}");
        }
    }

    #[test]
    fn test_should_accept_signed_and_exponent_forms() {
        assert_eq!(parse_number("-1.5"), Some(BigDecimal::from_str("-1.5").unwrap()));
        assert_eq!(parse_number("1e3"), Some(BigDecimal::from(1000)));
    }

    #[test]
    fn test_should_report_native_type() {
        assert_eq!(NativeValue::Null.native_type(), NativeType::Null);
        assert_eq!(
            NativeValue::TextSet(vec!["a".to_owned()]).native_type(),
            NativeType::TextSet
        );
        assert!(NativeType::Map.is_composite());
        assert!(!NativeType::NumberSet.is_composite());
    }
}
