//! Political party record.

use super::record::{Record, RecordFieldError, RecordId};
use super::schema::{EntityKind, EntitySchema, FieldDescriptor};
use super::Entity;
use serde::Serialize;

pub const NOMBRE: &str = "nombre";
pub const LEMA: &str = "lema";

/// Settable fields of a party. `nombre` is unique.
pub const PARTY_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::Party,
    table: "partidos",
    fields: &[FieldDescriptor::text(NOMBRE), FieldDescriptor::text(LEMA)],
};

/// Party representation: `{id, nombre, lema}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Party {
    pub id: RecordId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "lema")]
    pub slogan: String,
}

impl Entity for Party {
    const SCHEMA: &'static EntitySchema = &PARTY_SCHEMA;

    fn from_record(record: &Record) -> Result<Self, RecordFieldError> {
        Ok(Self {
            id: record.id,
            name: record.text(NOMBRE)?,
            slogan: record.text(LEMA)?,
        })
    }
}
