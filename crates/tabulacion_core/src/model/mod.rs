//! Election tabulation domain model.
//!
//! # Responsibility
//! - Declare each entity's settable fields once, statically.
//! - Define the plain-data records managers hand back to callers.
//!
//! # Invariants
//! - Identity (`id`) is never part of an entity's settable field set.
//! - Record field names double as wire names for payloads and representations.

pub mod candidate;
pub mod party;
pub mod polling_table;
pub mod record;
pub mod result;
pub mod schema;

use serde::Serialize;

pub use record::{FieldValue, Record, RecordFieldError, RecordId};
pub use schema::{EntityKind, EntitySchema, FieldDescriptor, FieldKind, ID_FIELD};

/// Typed view over one stored record of a statically declared schema.
pub trait Entity: Sized + Serialize {
    /// Field descriptors and table name backing this entity.
    const SCHEMA: &'static EntitySchema;

    /// Decodes a store record into the typed representation.
    fn from_record(record: &Record) -> Result<Self, RecordFieldError>;
}
