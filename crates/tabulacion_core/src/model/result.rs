//! Per-table, per-candidate vote result record.
//!
//! # Invariants
//! - At most one result row exists per (`mesa_id`, `candidato_id`) pair.
//! - `cantidad_votos` is never negative.
//! - Only `mesa_id`, `candidato_id` and `cantidad_votos` are settable; the
//!   table/candidate back-references are never part of the field set.

use super::record::{Record, RecordFieldError, RecordId};
use super::schema::{EntityKind, EntitySchema, FieldDescriptor};
use super::Entity;
use serde::Serialize;

pub const MESA_ID: &str = "mesa_id";
pub const CANDIDATO_ID: &str = "candidato_id";
pub const CANTIDAD_VOTOS: &str = "cantidad_votos";

pub const RESULT_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::Result,
    table: "resultados",
    fields: &[
        FieldDescriptor::integer(MESA_ID),
        FieldDescriptor::integer(CANDIDATO_ID),
        FieldDescriptor::count(CANTIDAD_VOTOS),
    ],
};

/// Result representation: `{id, mesa_id, candidato_id, cantidad_votos}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateResult {
    pub id: RecordId,
    #[serde(rename = "mesa_id")]
    pub table_id: RecordId,
    #[serde(rename = "candidato_id")]
    pub candidate_id: RecordId,
    #[serde(rename = "cantidad_votos")]
    pub votes: i64,
}

impl Entity for CandidateResult {
    const SCHEMA: &'static EntitySchema = &RESULT_SCHEMA;

    fn from_record(record: &Record) -> Result<Self, RecordFieldError> {
        Ok(Self {
            id: record.id,
            table_id: record.integer(MESA_ID)?,
            candidate_id: record.integer(CANDIDATO_ID)?,
            votes: record.integer(CANTIDAD_VOTOS)?,
        })
    }
}
