//! Candidate record.
//!
//! # Invariants
//! - `cedula` is unique across all candidates.
//! - `partido_id` points to an existing party when the row is created.

use super::record::{Record, RecordFieldError, RecordId};
use super::schema::{EntityKind, EntitySchema, FieldDescriptor};
use super::Entity;
use serde::Serialize;

pub const CEDULA: &str = "cedula";
pub const NOMBRE: &str = "nombre";
pub const APELLIDO: &str = "apellido";
pub const PARTIDO_ID: &str = "partido_id";

pub const CANDIDATE_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::Candidate,
    table: "candidatos",
    fields: &[
        FieldDescriptor::text(CEDULA),
        FieldDescriptor::text(NOMBRE),
        FieldDescriptor::text(APELLIDO),
        FieldDescriptor::integer(PARTIDO_ID),
    ],
};

/// Candidate representation: `{id, cedula, nombre, apellido, partido_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub id: RecordId,
    /// National identifier.
    #[serde(rename = "cedula")]
    pub national_id: String,
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
    #[serde(rename = "partido_id")]
    pub party_id: RecordId,
}

impl Entity for Candidate {
    const SCHEMA: &'static EntitySchema = &CANDIDATE_SCHEMA;

    fn from_record(record: &Record) -> Result<Self, RecordFieldError> {
        Ok(Self {
            id: record.id,
            national_id: record.text(CEDULA)?,
            first_name: record.text(NOMBRE)?,
            last_name: record.text(APELLIDO)?,
            party_id: record.integer(PARTIDO_ID)?,
        })
    }
}
