//! Conversion between native values and tagged wire values.
//!
//! Scalars go through the [`TypeMap`] (forward when decoding, inverse when
//! encoding). Lists and maps are structural and recurse into their members.
//! Numbers stay exact decimals the whole way; they are never routed through a
//! float.

use std::collections::{BTreeMap, HashMap, HashSet};

use bigdecimal::BigDecimal;
use bytes::Bytes;
use ddb_model::{AttributeType, AttributeValue};
use serde::Deserialize;

use crate::error::{FetchError, Result};
use crate::record::Record;
use crate::type_map::TypeMap;
use crate::value::{NativeType, NativeValue, parse_number};

/// Encoder and decoder bound to a [`TypeMap`].
#[derive(Debug, Clone, Copy)]
pub struct Codec<'a> {
    type_map: &'a TypeMap,
}

impl<'a> Codec<'a> {
    /// Convert through `type_map`.
    #[must_use]
    pub fn new(type_map: &'a TypeMap) -> Self {
        Self { type_map }
    }

    /// Encode every field of a record.
    ///
    /// # Errors
    ///
    /// See [`Codec::encode_value`].
    pub fn encode_record(&self, record: &Record) -> Result<HashMap<String, AttributeValue>> {
        record
            .iter()
            .map(|(name, value)| {
                self.encode_value(value)
                    .map(|wire| (name.to_owned(), wire))
                    .map_err(|e| in_attribute(name, e))
            })
            .collect()
    }

    /// Encode a name to value mapping.
    ///
    /// # Errors
    ///
    /// See [`Codec::encode_value`].
    pub fn encode_item(
        &self,
        item: &BTreeMap<String, NativeValue>,
    ) -> Result<HashMap<String, AttributeValue>> {
        item.iter()
            .map(|(name, value)| {
                self.encode_value(value)
                    .map(|wire| (name.clone(), wire))
                    .map_err(|e| in_attribute(name, e))
            })
            .collect()
    }

    /// Decode a name to wire value mapping. Fails as a whole if any attribute
    /// fails.
    ///
    /// # Errors
    ///
    /// See [`Codec::decode_value`].
    pub fn decode_item(
        &self,
        item: &HashMap<String, AttributeValue>,
    ) -> Result<BTreeMap<String, NativeValue>> {
        item.iter()
            .map(|(name, wire)| {
                self.decode_value(wire)
                    .map(|value| (name.clone(), value))
                    .map_err(|e| in_attribute(name, e))
            })
            .collect()
    }

    /// Encode one native value.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Codec`] if a scalar's native type has no wire
    /// type in the map, a text mapped to `N` is not a decimal literal, or a
    /// set is empty or holds duplicates.
    pub fn encode_value(&self, value: &NativeValue) -> Result<AttributeValue> {
        match value {
            NativeValue::List(items) => {
                return items
                    .iter()
                    .map(|v| self.encode_value(v))
                    .collect::<Result<Vec<_>>>()
                    .map(AttributeValue::L);
            }
            NativeValue::Map(members) => {
                return members
                    .iter()
                    .map(|(k, v)| self.encode_value(v).map(|w| (k.clone(), w)))
                    .collect::<Result<HashMap<_, _>>>()
                    .map(AttributeValue::M);
            }
            _ => {}
        }

        let native = value.native_type();
        let tag = self.type_map.wire_type(native).ok_or_else(|| {
            FetchError::codec(format!("no wire type is mapped for native type {native}"))
        })?;

        match (value, tag) {
            (NativeValue::Text(s), AttributeType::String) => Ok(AttributeValue::S(s.clone())),
            (NativeValue::Text(s), AttributeType::Number) => {
                require_number(s)?;
                Ok(AttributeValue::N(s.clone()))
            }
            (NativeValue::Number(n), AttributeType::Number) => {
                Ok(AttributeValue::N(n.to_plain_string()))
            }
            (NativeValue::Binary(b), AttributeType::Binary) => Ok(AttributeValue::B(b.clone())),
            (NativeValue::Bool(b), AttributeType::Boolean) => Ok(AttributeValue::Bool(*b)),
            (NativeValue::Null, AttributeType::Null) => Ok(AttributeValue::Null(true)),
            (NativeValue::TextSet(items), AttributeType::StringSet) => {
                check_text_set(items)?;
                Ok(AttributeValue::Ss(items.clone()))
            }
            (NativeValue::TextSet(items), AttributeType::NumberSet) => {
                let numbers = items
                    .iter()
                    .map(|s| require_number(s))
                    .collect::<Result<Vec<_>>>()?;
                check_number_set(&numbers)?;
                Ok(AttributeValue::Ns(items.clone()))
            }
            (NativeValue::NumberSet(items), AttributeType::NumberSet) => {
                check_number_set(items)?;
                Ok(AttributeValue::Ns(
                    items.iter().map(BigDecimal::to_plain_string).collect(),
                ))
            }
            (NativeValue::BinarySet(items), AttributeType::BinarySet) => {
                check_binary_set(items)?;
                Ok(AttributeValue::Bs(items.clone()))
            }
            (_, tag) => Err(FetchError::codec(format!(
                "native type {native} cannot be encoded as '{tag}'"
            ))),
        }
    }

    /// Decode one wire value.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Codec`] if a scalar tag has no native type in the
    /// map, an `N` payload is not a decimal literal, `NULL` is not `true`, or a
    /// set is empty or holds duplicates.
    pub fn decode_value(&self, wire: &AttributeValue) -> Result<NativeValue> {
        match wire {
            AttributeValue::L(items) => {
                return items
                    .iter()
                    .map(|v| self.decode_value(v))
                    .collect::<Result<Vec<_>>>()
                    .map(NativeValue::List);
            }
            AttributeValue::M(members) => {
                return members
                    .iter()
                    .map(|(k, v)| {
                        self.decode_value(v)
                            .map(|n| (k.clone(), n))
                            .map_err(|e| in_attribute(k, e))
                    })
                    .collect::<Result<BTreeMap<_, _>>>()
                    .map(NativeValue::Map);
            }
            _ => {}
        }

        let tag = wire.attribute_type();
        let native = self.type_map.native_type(&tag).ok_or_else(|| {
            FetchError::codec(format!("wire type '{tag}' has no native type mapped"))
        })?;

        match (wire, native) {
            (AttributeValue::S(s), NativeType::Text) => Ok(NativeValue::Text(s.clone())),
            (AttributeValue::N(s), NativeType::Number) => {
                require_number(s).map(NativeValue::Number)
            }
            (AttributeValue::N(s), NativeType::Text) => {
                require_number(s)?;
                Ok(NativeValue::Text(s.clone()))
            }
            (AttributeValue::B(b), NativeType::Binary) => Ok(NativeValue::Binary(b.clone())),
            (AttributeValue::Bool(b), NativeType::Bool) => Ok(NativeValue::Bool(*b)),
            (AttributeValue::Null(true), NativeType::Null) => Ok(NativeValue::Null),
            (AttributeValue::Null(false), NativeType::Null) => {
                Err(FetchError::codec("NULL must be true"))
            }
            (AttributeValue::Ss(items), NativeType::TextSet) => {
                check_text_set(items)?;
                Ok(NativeValue::TextSet(items.clone()))
            }
            (AttributeValue::Ns(items), NativeType::NumberSet | NativeType::TextSet) => {
                let numbers = items
                    .iter()
                    .map(|s| require_number(s))
                    .collect::<Result<Vec<_>>>()?;
                check_number_set(&numbers)?;
                Ok(if native == NativeType::NumberSet {
                    NativeValue::NumberSet(numbers)
                } else {
                    NativeValue::TextSet(items.clone())
                })
            }
            (AttributeValue::Bs(items), NativeType::BinarySet) => {
                check_binary_set(items)?;
                Ok(NativeValue::BinarySet(items.clone()))
            }
            (_, native) => Err(FetchError::codec(format!(
                "wire type '{tag}' cannot be decoded as {native}"
            ))),
        }
    }
}

/// Parse a raw wire item (a JSON object of tagged values).
///
/// Unknown tags, objects with other than one tag and malformed payloads such
/// as bad base64 are reported as [`FetchError::Codec`].
///
/// # Errors
///
/// Returns [`FetchError::Codec`] if `raw` is not an object or any attribute
/// fails to parse.
pub fn parse_wire_item(raw: &serde_json::Value) -> Result<HashMap<String, AttributeValue>> {
    let object = raw
        .as_object()
        .ok_or_else(|| FetchError::codec("item is not a JSON object"))?;
    object
        .iter()
        .map(|(name, value)| {
            AttributeValue::deserialize(value)
                .map(|wire| (name.clone(), wire))
                .map_err(|e| FetchError::codec(format!("attribute '{name}': {e}")))
        })
        .collect()
}

fn in_attribute(name: &str, error: FetchError) -> FetchError {
    match error {
        FetchError::Codec(message) => FetchError::Codec(format!("attribute '{name}': {message}")),
        other => other,
    }
}

fn require_number(literal: &str) -> Result<BigDecimal> {
    parse_number(literal)
        .ok_or_else(|| FetchError::codec(format!("'{literal}' is not a valid number")))
}

fn check_text_set(items: &[String]) -> Result<()> {
    if items.is_empty() {
        return Err(FetchError::codec("string set must not be empty"));
    }
    let mut seen = HashSet::with_capacity(items.len());
    if let Some(dup) = items.iter().find(|s| !seen.insert(s.as_str())) {
        return Err(FetchError::codec(format!(
            "string set contains duplicate '{dup}'"
        )));
    }
    Ok(())
}

fn check_number_set(items: &[BigDecimal]) -> Result<()> {
    if items.is_empty() {
        return Err(FetchError::codec("number set must not be empty"));
    }
    let mut sorted: Vec<&BigDecimal> = items.iter().collect();
    sorted.sort();
    if let Some(pair) = sorted.windows(2).find(|w| w[0] == w[1]) {
        return Err(FetchError::codec(format!(
            "number set contains duplicate {}",
            pair[0].to_plain_string()
        )));
    }
    Ok(())
}

fn check_binary_set(items: &[Bytes]) -> Result<()> {
    if items.is_empty() {
        return Err(FetchError::codec("binary set must not be empty"));
    }
    let mut seen = HashSet::with_capacity(items.len());
    if items.iter().any(|b| !seen.insert(b)) {
        return Err(FetchError::codec("binary set contains duplicates"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn decimal(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_should_round_trip_every_mapped_scalar() {
        let map = TypeMap::complete();
        let codec = Codec::new(&map);
        let values = [
            NativeValue::Text("héllo".to_owned()),
            NativeValue::Number(decimal("-98765432109876543210.0123456789012345678")),
            NativeValue::Number(decimal("0")),
            NativeValue::Binary(Bytes::from_static(&[0, 159, 146, 150])),
            NativeValue::Bool(false),
            NativeValue::Null,
            NativeValue::TextSet(vec!["b".to_owned(), "a".to_owned()]),
            NativeValue::NumberSet(vec![decimal("1.5"), decimal("2")]),
            NativeValue::BinarySet(vec![Bytes::from_static(b"x"), Bytes::from_static(b"y")]),
        ];
        for value in values {
            let wire = codec.encode_value(&value).unwrap();
            assert_eq!(codec.decode_value(&wire).unwrap(), value);
        }
    }

    #[test]
    fn test_should_encode_number_as_exact_literal() {
        let map = TypeMap::standard();
        let codec = Codec::new(&map);
        let wire = codec
            .encode_value(&NativeValue::Number(decimal("3.14159265358979323846264338327950288")))
            .unwrap();
        assert_eq!(
            wire,
            AttributeValue::N("3.14159265358979323846264338327950288".to_owned())
        );
    }

    #[test]
    fn test_should_encode_small_numbers_without_exponent() {
        let map = TypeMap::complete();
        let codec = Codec::new(&map);
        assert_eq!(
            codec.encode_value(&NativeValue::Number(decimal("0.0000001"))).unwrap(),
            AttributeValue::N("0.0000001".to_owned())
        );
        assert_eq!(
            codec
                .encode_value(&NativeValue::NumberSet(vec![decimal("1E+3"), decimal("0.00000025")]))
                .unwrap(),
            AttributeValue::Ns(vec!["1000".to_owned(), "0.00000025".to_owned()])
        );
    }

    #[test]
    fn test_should_encode_item_with_nested_values() {
        let map = TypeMap::complete();
        let codec = Codec::new(&map);
        let item = BTreeMap::from([
            ("id".to_owned(), NativeValue::Text("u-1".to_owned())),
            ("score".to_owned(), NativeValue::Number(decimal("12.50"))),
            (
                "history".to_owned(),
                NativeValue::List(vec![
                    NativeValue::Bool(true),
                    NativeValue::Map(BTreeMap::from([(
                        "at".to_owned(),
                        NativeValue::Number(decimal("1700000000")),
                    )])),
                ]),
            ),
            (
                "profile".to_owned(),
                NativeValue::Map(BTreeMap::from([
                    ("nick".to_owned(), NativeValue::Text("z".to_owned())),
                    ("avatar".to_owned(), NativeValue::Binary(Bytes::from_static(b"png"))),
                    ("gone".to_owned(), NativeValue::Null),
                ])),
            ),
        ]);

        let wire = codec.encode_item(&item).unwrap();
        assert_eq!(wire["id"], AttributeValue::S("u-1".to_owned()));
        assert_eq!(wire["score"], AttributeValue::N("12.50".to_owned()));
        assert!(matches!(&wire["history"], AttributeValue::L(items) if items.len() == 2));
        assert_eq!(codec.decode_item(&wire).unwrap(), item);
    }

    #[test]
    fn test_should_name_unmapped_attribute_when_encoding_item() {
        let map = TypeMap::standard();
        let codec = Codec::new(&map);
        let item = BTreeMap::from([
            ("id".to_owned(), NativeValue::Text("1".to_owned())),
            ("active".to_owned(), NativeValue::Bool(true)),
        ]);
        let err = codec.encode_item(&item).unwrap_err();
        assert!(
            matches!(err, FetchError::Codec(ref msg) if msg.starts_with("attribute 'active'") && msg.contains("bool")),
            "{err}"
        );
    }

    #[test]
    fn test_should_recurse_into_lists_and_maps() {
        let map = TypeMap::complete();
        let codec = Codec::new(&map);
        let wire = AttributeValue::M(HashMap::from([
            (
                "tags".to_owned(),
                AttributeValue::L(vec![
                    AttributeValue::S("a".to_owned()),
                    AttributeValue::N("1".to_owned()),
                ]),
            ),
            ("ok".to_owned(), AttributeValue::Bool(true)),
        ]));
        let native = codec.decode_value(&wire).unwrap();
        let expected = NativeValue::Map(BTreeMap::from([
            (
                "tags".to_owned(),
                NativeValue::List(vec![
                    NativeValue::Text("a".to_owned()),
                    NativeValue::Number(decimal("1")),
                ]),
            ),
            ("ok".to_owned(), NativeValue::Bool(true)),
        ]));
        assert_eq!(native, expected);
        assert_eq!(codec.encode_value(&native).unwrap(), wire);
    }

    #[test]
    fn test_should_reject_unknown_tag_without_partial_result() {
        let raw = serde_json::json!({
            "id": {"S": "1"},
            "weird": {"X": "?"}
        });
        let err = parse_wire_item(&raw).unwrap_err();
        assert!(matches!(err, FetchError::Codec(msg) if msg.contains("'weird'")));
    }

    #[test]
    fn test_should_reject_bad_base64_while_parsing() {
        let raw = serde_json::json!({"b": {"B": "%%%"}});
        assert!(matches!(parse_wire_item(&raw), Err(FetchError::Codec(_))));
    }

    #[test]
    fn test_should_reject_non_object_item() {
        assert!(matches!(
            parse_wire_item(&serde_json::json!([1, 2])),
            Err(FetchError::Codec(_))
        ));
    }

    #[test]
    fn test_should_reject_malformed_payloads() {
        let map = TypeMap::complete();
        let codec = Codec::new(&map);
        for wire in [
            AttributeValue::N("12abc".to_owned()),
            AttributeValue::Null(false),
            AttributeValue::Ss(vec![]),
            AttributeValue::Ss(vec!["a".to_owned(), "a".to_owned()]),
            AttributeValue::Ns(vec!["1.0".to_owned(), "1".to_owned()]),
            AttributeValue::Bs(vec![Bytes::from_static(b"z"), Bytes::from_static(b"z")]),
        ] {
            assert!(
                matches!(codec.decode_value(&wire), Err(FetchError::Codec(_))),
                "{wire}"
            );
        }
    }

    #[test]
    fn test_should_reject_unmapped_scalar_in_both_directions() {
        let map = TypeMap::standard();
        let codec = Codec::new(&map);
        assert!(matches!(
            codec.decode_value(&AttributeValue::Bool(true)),
            Err(FetchError::Codec(msg)) if msg.contains("BOOL")
        ));
        assert!(matches!(
            codec.encode_value(&NativeValue::Bool(true)),
            Err(FetchError::Codec(msg)) if msg.contains("bool")
        ));
    }

    #[test]
    fn test_should_name_failing_attribute_in_item() {
        let map = TypeMap::standard();
        let codec = Codec::new(&map);
        let item = HashMap::from([
            ("id".to_owned(), AttributeValue::S("1".to_owned())),
            ("price".to_owned(), AttributeValue::N("cheap".to_owned())),
        ]);
        let err = codec.decode_item(&item).unwrap_err();
        assert!(matches!(err, FetchError::Codec(msg) if msg.starts_with("attribute 'price'")));
    }

    #[test]
    fn test_should_keep_number_literals_as_text_when_mapped() {
        let map = TypeMap::new([
            (AttributeType::Number, NativeType::Text),
            (AttributeType::NumberSet, NativeType::TextSet),
        ])
        .unwrap();
        let codec = Codec::new(&map);
        assert_eq!(
            codec.decode_value(&AttributeValue::N("1.50".to_owned())).unwrap(),
            NativeValue::Text("1.50".to_owned())
        );
        assert_eq!(
            codec
                .encode_value(&NativeValue::TextSet(vec!["1".to_owned(), "2".to_owned()]))
                .unwrap(),
            AttributeValue::Ns(vec!["1".to_owned(), "2".to_owned()])
        );
        assert!(matches!(
            codec.encode_value(&NativeValue::Text("x".to_owned())),
            Err(FetchError::Codec(_))
        ));
    }
}
