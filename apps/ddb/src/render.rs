//! JSON rendering of fetched items.
//!
//! The item is turned into a [`serde_json::Value`] and printed by
//! `serde_json`. Numbers are written from their exact decimal text, binary
//! values as base64 strings and sets as arrays. Key fields come first.

use std::io;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bigdecimal::BigDecimal;
use colored::Color;
use ddb_core::{ItemRecord, NativeValue};
use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use serde_json::{Map, Number, Value};

const RESET: &str = "\x1b[0m";

/// Output options.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    /// Indent nested values, one entry per line.
    pub pretty: bool,
    /// Colour keys and scalars with ANSI escapes.
    pub color: bool,
}

impl Renderer {
    /// Render `record` as one JSON object.
    ///
    /// # Errors
    ///
    /// Fails if a number cannot be represented as a JSON number literal.
    pub fn render(&self, record: &ItemRecord) -> Result<String> {
        let value = Value::Object(
            record
                .iter()
                .map(|(name, value)| -> Result<(String, Value)> {
                    Ok((name.to_owned(), to_json(value)?))
                })
                .collect::<Result<Map<String, Value>>>()?,
        );

        let mut out = Vec::new();
        match (self.pretty, self.color) {
            (true, false) => write_json(&mut out, &value, PrettyFormatter::new()),
            (false, false) => write_json(&mut out, &value, CompactFormatter),
            (true, true) => write_json(&mut out, &value, Painted::new(PrettyFormatter::new())),
            (false, true) => write_json(&mut out, &value, Painted::new(CompactFormatter)),
        }?;
        String::from_utf8(out).context("rendered item is not valid UTF-8")
    }
}

fn write_json<F: Formatter>(out: &mut Vec<u8>, value: &Value, formatter: F) -> Result<()> {
    let mut serializer = serde_json::Serializer::with_formatter(out, formatter);
    value
        .serialize(&mut serializer)
        .context("failed to serialize item")
}

fn to_json(value: &NativeValue) -> Result<Value> {
    Ok(match value {
        NativeValue::Text(s) => Value::String(s.clone()),
        NativeValue::Number(n) => Value::Number(number(n)?),
        NativeValue::Binary(b) => Value::String(BASE64.encode(b)),
        NativeValue::Bool(b) => Value::Bool(*b),
        NativeValue::Null => Value::Null,
        NativeValue::List(items) => {
            Value::Array(items.iter().map(to_json).collect::<Result<Vec<_>>>()?)
        }
        NativeValue::Map(members) => Value::Object(
            members
                .iter()
                .map(|(k, v)| -> Result<(String, Value)> { Ok((k.clone(), to_json(v)?)) })
                .collect::<Result<Map<String, Value>>>()?,
        ),
        NativeValue::TextSet(items) => {
            Value::Array(items.iter().map(|s| Value::String(s.clone())).collect())
        }
        NativeValue::NumberSet(items) => Value::Array(
            items
                .iter()
                .map(|n| number(n).map(Value::Number))
                .collect::<Result<Vec<_>>>()?,
        ),
        NativeValue::BinarySet(items) => Value::Array(
            items
                .iter()
                .map(|b| Value::String(BASE64.encode(b)))
                .collect(),
        ),
    })
}

fn number(n: &BigDecimal) -> Result<Number> {
    let text = n.to_plain_string();
    text.parse()
        .with_context(|| format!("'{text}' is not a JSON number"))
}

/// Wraps a formatter and colours keys and scalars.
struct Painted<F> {
    inner: F,
    in_key: bool,
    key: String,
    string: String,
    number: String,
    literal: String,
}

impl<F> Painted<F> {
    fn new(inner: F) -> Self {
        let fg = |color: Color| format!("\x1b[{}m", color.to_fg_str());
        Self {
            inner,
            in_key: false,
            key: format!("\x1b[1;{}m", Color::Blue.to_fg_str()),
            string: fg(Color::Green),
            number: fg(Color::Cyan),
            literal: fg(Color::Yellow),
        }
    }
}

fn paint<W: ?Sized + io::Write>(
    writer: &mut W,
    style: &str,
    body: impl FnOnce(&mut W) -> io::Result<()>,
) -> io::Result<()> {
    writer.write_all(style.as_bytes())?;
    body(writer)?;
    writer.write_all(RESET.as_bytes())
}

impl<F: Formatter> Formatter for Painted<F> {
    fn write_null<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        let inner = &mut self.inner;
        paint(writer, &self.literal, |w| inner.write_null(w))
    }

    fn write_bool<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: bool) -> io::Result<()> {
        let inner = &mut self.inner;
        paint(writer, &self.literal, |w| inner.write_bool(w, value))
    }

    fn write_number_str<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        value: &str,
    ) -> io::Result<()> {
        let inner = &mut self.inner;
        paint(writer, &self.number, |w| inner.write_number_str(w, value))
    }

    fn begin_string<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        let style = if self.in_key { &self.key } else { &self.string };
        writer.write_all(style.as_bytes())?;
        self.inner.begin_string(writer)
    }

    fn end_string<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_string(writer)?;
        writer.write_all(RESET.as_bytes())
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.in_key = true;
        self.inner.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.in_key = false;
        self.inner.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }
}
