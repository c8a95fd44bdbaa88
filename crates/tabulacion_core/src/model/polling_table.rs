//! Polling table ("mesa") record.
//!
//! # Invariants
//! - `numero_mesa` is unique across all tables.
//! - `cantidad_inscritos` is never negative.

use super::record::{Record, RecordFieldError, RecordId};
use super::schema::{EntityKind, EntitySchema, FieldDescriptor};
use super::Entity;
use serde::Serialize;

pub const NUMERO_MESA: &str = "numero_mesa";
pub const CANTIDAD_INSCRITOS: &str = "cantidad_inscritos";

pub const TABLE_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::Table,
    table: "mesas",
    fields: &[
        FieldDescriptor::count(NUMERO_MESA),
        FieldDescriptor::count(CANTIDAD_INSCRITOS),
    ],
};

/// Table representation: `{id, numero_mesa, cantidad_inscritos}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollingTable {
    pub id: RecordId,
    #[serde(rename = "numero_mesa")]
    pub number: i64,
    /// Registered voters at this table.
    #[serde(rename = "cantidad_inscritos")]
    pub registered_voters: i64,
}

impl Entity for PollingTable {
    const SCHEMA: &'static EntitySchema = &TABLE_SCHEMA;

    fn from_record(record: &Record) -> Result<Self, RecordFieldError> {
        Ok(Self {
            id: record.id,
            number: record.integer(NUMERO_MESA)?,
            registered_voters: record.integer(CANTIDAD_INSCRITOS)?,
        })
    }
}
