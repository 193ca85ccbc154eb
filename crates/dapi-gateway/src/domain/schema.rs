//! Declarative argument schemas for gateway operations.
//!
//! One [`Schema`] is compiled per operation during registry assembly and
//! reused for every call; validation is read-only and reports the offending
//! field path (`params.address should be array,string`).

use crate::domain::error::RpcError;
use serde_json::Value;

/// Structural contract for one operation's `params` object.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<Field>,
    spans: Vec<SpanConstraint>,
}

#[derive(Debug, Clone)]
struct Field {
    name: &'static str,
    kind: FieldKind,
    required: bool,
}

/// Supported field shapes.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Integer with optional inclusive bounds
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    /// Boolean flag
    Boolean,
    /// Non-empty string
    String,
    /// Hex string, optionally of an exact character length
    HexString { exact_len: Option<usize> },
    /// Base64 string
    Base64String,
    /// Arbitrary JSON object
    Object,
    /// A single address string or an array of address strings
    AddressList,
}

impl FieldKind {
    /// Integer with a lower bound only.
    pub const fn integer_min(min: i64) -> Self {
        FieldKind::Integer {
            min: Some(min),
            max: None,
        }
    }

    /// Integer without bounds.
    pub const fn integer() -> Self {
        FieldKind::Integer {
            min: None,
            max: None,
        }
    }

    /// Hex string of exactly `len` characters.
    pub const fn hex_exact(len: usize) -> Self {
        FieldKind::HexString {
            exact_len: Some(len),
        }
    }

    /// Hex string of any even length.
    pub const fn hex() -> Self {
        FieldKind::HexString { exact_len: None }
    }

    fn type_label(&self) -> &'static str {
        match self {
            FieldKind::Integer { .. } => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::String => "string",
            FieldKind::HexString { .. } => "hex string",
            FieldKind::Base64String => "base64 string",
            FieldKind::Object => "object",
            FieldKind::AddressList => "array,string",
        }
    }
}

/// Cross-field constraint: `to - from <= max_span`.
#[derive(Debug, Clone)]
struct SpanConstraint {
    from: &'static str,
    to: &'static str,
    max_span: i64,
}

impl Schema {
    /// Start an empty object schema.
    pub fn object() -> Self {
        Self {
            fields: Vec::new(),
            spans: Vec::new(),
        }
    }

    /// Add a required field.
    pub fn required(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(Field {
            name,
            kind,
            required: true,
        });
        self
    }

    /// Add an optional field.
    pub fn optional(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(Field {
            name,
            kind,
            required: false,
        });
        self
    }

    /// Constrain `to - from` to at most `max_span` when both fields are given.
    pub fn span(mut self, from: &'static str, to: &'static str, max_span: i64) -> Self {
        self.spans.push(SpanConstraint { from, to, max_span });
        self
    }

    /// Validate `params` against this schema.
    ///
    /// Side-effect free; safe to call concurrently. A missing or non-object
    /// root fails as a schema-type violation rather than a crash.
    pub fn validate(&self, params: Option<&Value>) -> Result<(), RpcError> {
        let object = match params {
            Some(Value::Object(map)) => map,
            None if self.fields.iter().all(|f| !f.required) => return Ok(()),
            _ => return Err(RpcError::invalid_params("params should be object")),
        };

        for field in &self.fields {
            match object.get(field.name) {
                Some(value) => check_field(field, value)?,
                None if field.required => {
                    return Err(RpcError::invalid_params(format!(
                        "params should have required property '{}'",
                        field.name
                    )));
                }
                None => {}
            }
        }

        for span in &self.spans {
            check_span(object, span)?;
        }

        Ok(())
    }
}

fn check_field(field: &Field, value: &Value) -> Result<(), RpcError> {
    let path = format!("params.{}", field.name);

    match &field.kind {
        FieldKind::Integer { min, max } => {
            let n = value
                .as_i64()
                .ok_or_else(|| type_error(&path, &field.kind))?;
            if let Some(min) = min {
                if n < *min {
                    return Err(RpcError::invalid_params(format!(
                        "{} should be >= {}",
                        path, min
                    )));
                }
            }
            if let Some(max) = max {
                if n > *max {
                    return Err(RpcError::invalid_params(format!(
                        "{} should be <= {}",
                        path, max
                    )));
                }
            }
        }
        FieldKind::Boolean => {
            if !value.is_boolean() {
                return Err(type_error(&path, &field.kind));
            }
        }
        FieldKind::String => {
            let s = value
                .as_str()
                .ok_or_else(|| type_error(&path, &field.kind))?;
            if s.is_empty() {
                return Err(RpcError::invalid_params(format!(
                    "{} should not be empty",
                    path
                )));
            }
        }
        FieldKind::HexString { exact_len } => {
            let s = value
                .as_str()
                .ok_or_else(|| type_error(&path, &field.kind))?;
            if !is_hex(s) {
                return Err(type_error(&path, &field.kind));
            }
            match exact_len {
                Some(len) if s.len() != *len => {
                    return Err(RpcError::invalid_params(format!(
                        "{} should be a {}-character hex string",
                        path, len
                    )));
                }
                None if s.len() % 2 != 0 => {
                    return Err(RpcError::invalid_params(format!(
                        "{} should be a hex string of even length",
                        path
                    )));
                }
                _ => {}
            }
        }
        FieldKind::Base64String => {
            let s = value
                .as_str()
                .ok_or_else(|| type_error(&path, &field.kind))?;
            if s.is_empty() || !is_base64(s) {
                return Err(type_error(&path, &field.kind));
            }
        }
        FieldKind::Object => {
            if !value.is_object() {
                return Err(type_error(&path, &field.kind));
            }
        }
        FieldKind::AddressList => match value {
            Value::String(s) if !s.is_empty() => {}
            Value::Array(items)
                if !items.is_empty()
                    && items.iter().all(|i| matches!(i, Value::String(s) if !s.is_empty())) => {}
            _ => return Err(type_error(&path, &field.kind)),
        },
    }

    Ok(())
}

fn check_span(
    object: &serde_json::Map<String, Value>,
    span: &SpanConstraint,
) -> Result<(), RpcError> {
    let (from, to) = match (
        object.get(span.from).and_then(Value::as_i64),
        object.get(span.to).and_then(Value::as_i64),
    ) {
        (Some(from), Some(to)) => (from, to),
        // Field-level checks already rejected non-integers; absent is fine.
        _ => return Ok(()),
    };

    if to - from > span.max_span {
        return Err(RpcError::invalid_params(format!(
            "params.{} - params.{} should be <= {}",
            span.to, span.from, span.max_span
        )));
    }

    Ok(())
}

fn type_error(path: &str, kind: &FieldKind) -> RpcError {
    RpcError::invalid_params(format!("{} should be {}", path, kind.type_label()))
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_base64(s: &str) -> bool {
    // Standard alphabet with optional trailing padding.
    let trimmed = s.trim_end_matches('=');
    s.len() % 4 == 0
        && trimmed
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
}
