//! Schema-shaped records exchanged with the persistence store.

use super::schema::FieldKind;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Surrogate identity assigned by storage.
pub type RecordId = i64;

/// One typed column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Integer(_) => FieldKind::Integer,
            Self::Text(_) => FieldKind::Text,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            Self::Integer(_) => None,
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Stored row: identity plus settable field values keyed by field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    pub values: BTreeMap<&'static str, FieldValue>,
}

impl Record {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            values: BTreeMap::new(),
        }
    }

    pub fn from_fields(
        id: RecordId,
        fields: impl IntoIterator<Item = (&'static str, FieldValue)>,
    ) -> Self {
        Self {
            id,
            values: fields.into_iter().collect(),
        }
    }

    pub fn with(mut self, field: &'static str, value: impl Into<FieldValue>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn integer(&self, field: &'static str) -> Result<i64, RecordFieldError> {
        self.get(field)
            .and_then(FieldValue::as_integer)
            .ok_or(RecordFieldError {
                field,
                expected: FieldKind::Integer,
            })
    }

    pub fn text(&self, field: &'static str) -> Result<String, RecordFieldError> {
        self.get(field)
            .and_then(FieldValue::as_text)
            .map(str::to_string)
            .ok_or(RecordFieldError {
                field,
                expected: FieldKind::Text,
            })
    }
}

/// A record lacks a field or carries it with an unexpected type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFieldError {
    pub field: &'static str,
    pub expected: FieldKind,
}

impl Display for RecordFieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "record field `{}` is missing or not {}",
            self.field,
            self.expected.as_str()
        )
    }
}

impl Error for RecordFieldError {}
