//! Static field descriptors for every persisted entity.
//!
//! Settable field sets are declared here once instead of being discovered
//! from the record types at runtime, so storage metadata can never leak into
//! an allowlist.

use std::fmt::{Display, Formatter};

/// Name of the identity key accepted by modification payloads.
pub const ID_FIELD: &str = "id";

/// Entity families managed by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Party,
    Candidate,
    Table,
    Result,
}

impl EntityKind {
    /// Stable lowercase name used in errors and log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Party => "party",
            Self::Candidate => "candidate",
            Self::Table => "table",
            Self::Result => "result",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage type of one settable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Text => "text",
        }
    }
}

/// One externally settable field of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Column name, also the payload key and representation key.
    pub name: &'static str,
    pub kind: FieldKind,
    /// Rejects negative integers on create and modify.
    pub non_negative: bool,
}

impl FieldDescriptor {
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            non_negative: false,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Integer,
            non_negative: false,
        }
    }

    pub const fn count(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Integer,
            non_negative: true,
        }
    }
}

/// Static description of one entity: its table and settable fields.
#[derive(Debug, PartialEq, Eq)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub table: &'static str,
    /// Settable fields in column order. Excludes `id`.
    pub fields: &'static [FieldDescriptor],
}

impl EntitySchema {
    /// Looks up a settable field by name.
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns whether `name` is one of the settable fields.
    pub fn is_settable(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Settable field names in declaration order.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|field| field.name).collect()
    }
}
