//! Request body schemas.
//!
//! Each schema is a static table of field rules. `validate` walks the whole
//! table and reports every violation at once, keyed by field name.

pub mod definitions;

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

pub use definitions::*;

/// Key used for violations that belong to the body rather than a field.
pub const BODY_KEY: &str = "_body";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Email,
    /// Absolute http(s) URL.
    Uri,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String {
        min_len: usize,
        max_len: Option<usize>,
        format: Option<Format>,
    },
    Integer {
        min: Option<i64>,
    },
    Boolean,
    /// Decimal string between 0 and 1 inclusive.
    Equity,
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [Field],
}

/// All violations found in one request, grouped per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of violations across all fields.
    pub fn len(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// One message per field, multiple violations joined with "; ".
    pub fn field_errors(&self) -> BTreeMap<String, String> {
        self.errors
            .iter()
            .map(|(field, messages)| (field.clone(), messages.join("; ")))
            .collect()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join("; ")))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

impl Schema {
    /// Returns the body as an object when every rule holds.
    pub fn validate(&self, body: &Value) -> Result<Map<String, Value>, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let Value::Object(object) = body else {
            errors.add(BODY_KEY, "must be a JSON object");
            return Err(errors);
        };

        for field in self.fields {
            match object.get(field.name) {
                None if field.required => errors.add(field.name, "is required"),
                None => {}
                Some(Value::Null) if field.nullable => {}
                Some(Value::Null) => errors.add(field.name, "must not be null"),
                Some(value) => check_value(field, value, &mut errors),
            }
        }

        for key in object.keys() {
            if !self.fields.iter().any(|f| f.name == key) {
                errors.add(key.as_str(), "is not allowed");
            }
        }

        tracing::debug!(
            "schema {} validation: {} violation(s)",
            self.name,
            errors.len()
        );

        errors.into_result().map(|_| object.clone())
    }
}

fn check_value(field: &Field, value: &Value, errors: &mut ValidationErrors) {
    match field.kind {
        FieldKind::String {
            min_len,
            max_len,
            format,
        } => {
            let Some(s) = value.as_str() else {
                errors.add(field.name, "must be a string");
                return;
            };
            let len = s.chars().count();
            if len < min_len {
                errors.add(
                    field.name,
                    format!("must be at least {} characters", min_len),
                );
            }
            if let Some(max) = max_len {
                if len > max {
                    errors.add(field.name, format!("must be at most {} characters", max));
                }
            }
            match format {
                Some(Format::Email) if !is_email(s) => {
                    errors.add(field.name, "must be an email address")
                }
                Some(Format::Uri) if !is_http_uri(s) => errors.add(field.name, "must be a URL"),
                _ => {}
            }
        }
        FieldKind::Integer { min } => {
            let Some(n) = value.as_i64() else {
                errors.add(field.name, "must be an integer");
                return;
            };
            if i32::try_from(n).is_err() {
                errors.add(field.name, "is out of range");
            }
            if let Some(min) = min {
                if n < min {
                    errors.add(field.name, format!("must be greater than or equal to {}", min));
                }
            }
        }
        FieldKind::Boolean => {
            if !value.is_boolean() {
                errors.add(field.name, "must be a boolean");
            }
        }
        FieldKind::Equity => match value.as_str() {
            Some(s) if is_valid_equity(s) => {}
            Some(_) => errors.add(field.name, "must be a decimal between 0 and 1"),
            None => errors.add(field.name, "must be a string"),
        },
    }
}

fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.chars().any(char::is_whitespace)
}

fn is_http_uri(s: &str) -> bool {
    url::Url::parse(s)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}

/// Accepts `0`, `0.25`, `.5`, `1`, `1.000`; rejects signs, exponents and anything above 1.
pub fn is_valid_equity(s: &str) -> bool {
    let (int, frac) = match s.split_once('.') {
        Some((int, frac)) => {
            if frac.is_empty() {
                return false;
            }
            (int, frac)
        }
        None => (s, ""),
    };
    if int.is_empty() && frac.is_empty() {
        return false;
    }
    if !int.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    match int.trim_start_matches('0') {
        "" => true,
        "1" => frac.chars().all(|c| c == '0'),
        _ => false,
    }
}
