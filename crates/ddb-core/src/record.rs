//! Runtime record descriptors synthesized from a key schema.
//!
//! A [`RecordDescriptor`] is a list of typed fields plus a flag saying whether
//! other fields are admitted. The key record is closed: it holds exactly the
//! key attributes the lookup addresses. The item record carries the same typed
//! fields and admits anything else the store returns.

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use ddb_model::AttributeType;
use tracing::debug;

use crate::error::{FetchError, Result};
use crate::schema::{Attribute, KeySchema};
use crate::type_map::TypeMap;
use crate::value::{NativeType, NativeValue, parse_number};

/// Which key attributes a key record addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyScope {
    /// Only the partition attribute.
    #[default]
    Partition,
    /// The partition and the sort attribute.
    PartitionAndSort,
}

/// One typed field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Attribute name.
    pub name: String,
    /// Declared wire type.
    pub wire_type: AttributeType,
    /// Native type the wire type maps to.
    pub native_type: NativeType,
}

/// A record shape built at run time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDescriptor {
    fields: Vec<FieldDescriptor>,
    open: bool,
}

impl RecordDescriptor {
    /// The typed fields, in key-schema order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a typed field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether fields beyond the typed ones are admitted.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Build a record from raw text values, coercing each into its field's
    /// native type.
    ///
    /// Text is taken as is. Numbers must be decimal literals, binary must be
    /// base64 and booleans `true` or `false`. Untyped fields of an open record
    /// are kept as text.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Validation`] if a value cannot be coerced, a typed
    /// field is missing or repeated, or a closed record receives an unknown
    /// field.
    pub fn bind<'a>(&self, raw: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Record> {
        let mut values: BTreeMap<String, NativeValue> = BTreeMap::new();
        for (name, text) in raw {
            let value = match self.field(name) {
                Some(field) => coerce(field, text)?,
                None if self.open => NativeValue::Text(text.to_owned()),
                None => {
                    return Err(FetchError::validation(format!(
                        "unexpected attribute '{name}'"
                    )));
                }
            };
            if values.insert(name.to_owned(), value).is_some() {
                return Err(FetchError::validation(format!(
                    "attribute '{name}' given more than once"
                )));
            }
        }
        self.validate(values)
    }

    /// Check decoded values against the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Validation`] if a typed field is missing or holds
    /// another native type, or if a closed record receives other fields.
    pub fn validate(&self, mut values: BTreeMap<String, NativeValue>) -> Result<Record> {
        let mut typed = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let value = values.remove(&field.name).ok_or_else(|| {
                FetchError::validation(format!("missing key attribute '{}'", field.name))
            })?;
            if value.native_type() != field.native_type {
                return Err(FetchError::validation(format!(
                    "key attribute '{}' should be {}, got {}",
                    field.name,
                    field.native_type,
                    value.native_type()
                )));
            }
            typed.push((field.name.clone(), value));
        }

        if !self.open && !values.is_empty() {
            let names: Vec<&str> = values.keys().map(String::as_str).collect();
            return Err(FetchError::validation(format!(
                "unexpected attributes: {}",
                names.join(", ")
            )));
        }

        Ok(Record {
            typed,
            extra: values,
        })
    }
}

fn coerce(field: &FieldDescriptor, text: &str) -> Result<NativeValue> {
    let invalid = |what: &str| {
        FetchError::validation(format!(
            "value '{text}' for key attribute '{}' is not {what}",
            field.name
        ))
    };

    if field.wire_type == AttributeType::Number {
        let number = parse_number(text).ok_or_else(|| invalid("a valid number"))?;
        return Ok(match field.native_type {
            NativeType::Number => NativeValue::Number(number),
            _ => NativeValue::Text(text.to_owned()),
        });
    }

    match field.native_type {
        NativeType::Text => Ok(NativeValue::Text(text.to_owned())),
        NativeType::Number => parse_number(text)
            .map(NativeValue::Number)
            .ok_or_else(|| invalid("a valid number")),
        NativeType::Binary => STANDARD
            .decode(text)
            .map(|b| NativeValue::Binary(Bytes::from(b)))
            .map_err(|_| invalid("valid base64")),
        NativeType::Bool => match text {
            "true" => Ok(NativeValue::Bool(true)),
            "false" => Ok(NativeValue::Bool(false)),
            _ => Err(invalid("a boolean")),
        },
        NativeType::Null => match text {
            "null" => Ok(NativeValue::Null),
            _ => Err(invalid("null")),
        },
        other => Err(FetchError::validation(format!(
            "key attribute '{}' of type {other} cannot be given on the command line",
            field.name
        ))),
    }
}

/// A validated record: typed fields in descriptor order, then everything
/// else ordered by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    typed: Vec<(String, NativeValue)>,
    extra: BTreeMap<String, NativeValue>,
}

/// The record returned by a lookup.
pub type ItemRecord = Record;

impl Record {
    /// Look up any field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&NativeValue> {
        self.typed
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .or_else(|| self.extra.get(name))
    }

    /// The typed fields, in descriptor order.
    pub fn typed_fields(&self) -> impl Iterator<Item = (&str, &NativeValue)> {
        self.typed.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// The untyped fields.
    #[must_use]
    pub fn extra_fields(&self) -> &BTreeMap<String, NativeValue> {
        &self.extra
    }

    /// Every field: typed fields first, then the rest by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NativeValue)> {
        self.typed_fields()
            .chain(self.extra.iter().map(|(n, v)| (n.as_str(), v)))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.typed.len() + self.extra.len()
    }

    /// Returns `true` if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|(n, _)| n).collect();
        write!(f, "Record{{{}}}", names.join(", "))
    }
}

/// Builds key and item record descriptors against a [`TypeMap`].
#[derive(Debug, Clone, Copy)]
pub struct RecordSynthesizer<'a> {
    type_map: &'a TypeMap,
}

impl<'a> RecordSynthesizer<'a> {
    /// Synthesize against `type_map`.
    #[must_use]
    pub fn new(type_map: &'a TypeMap) -> Self {
        Self { type_map }
    }

    /// Build the closed key record for `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::UnsupportedType`] if a key attribute's wire type
    /// has no native mapping, or [`FetchError::Validation`] if `scope` asks for
    /// a sort attribute the table does not have.
    pub fn key_record(&self, schema: &KeySchema, scope: KeyScope) -> Result<RecordDescriptor> {
        let mut fields = vec![self.field(&schema.partition)?];

        if scope == KeyScope::PartitionAndSort {
            let sort = schema.sort.as_ref().ok_or_else(|| {
                FetchError::validation(format!(
                    "a sort key value was given but the table's key is only '{}'",
                    schema.partition.name
                ))
            })?;
            fields.push(self.field(sort)?);
        }

        debug!(
            fields = ?fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            ?scope,
            "Synthesized key record"
        );
        Ok(RecordDescriptor {
            fields,
            open: false,
        })
    }

    /// Build the open item record sharing `key`'s typed fields.
    #[must_use]
    pub fn item_record(&self, key: &RecordDescriptor) -> RecordDescriptor {
        RecordDescriptor {
            fields: key.fields.clone(),
            open: true,
        }
    }

    fn field(&self, attribute: &Attribute) -> Result<FieldDescriptor> {
        let native_type = self.type_map.native_type(&attribute.wire_type).ok_or_else(|| {
            FetchError::UnsupportedType {
                attribute: attribute.name.clone(),
                wire_type: attribute.wire_type.to_string(),
            }
        })?;
        Ok(FieldDescriptor {
            name: attribute.name.clone(),
            wire_type: attribute.wire_type.clone(),
            native_type,
        })
    }
}
