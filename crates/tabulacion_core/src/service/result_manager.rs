//! Vote result manager.
//!
//! # Responsibility
//! - Record, correct and remove per-table, per-candidate vote counts.
//!
//! # Invariants
//! - Vote counts are never negative; checked before any write.
//! - Table/candidate references and (table, candidate) pair uniqueness are
//!   left to storage: failures surface as `ForeignKeyViolation` at commit and
//!   `UniqueConstraintViolation` at insert/update.

use super::allowlist::{
    apply_changes, changed_fields, creation_values, parse_value, take_id, Payload,
};
use super::{get_entity, list_entities, log_write, ManagerError, ManagerResult};
use crate::model::result::{CandidateResult, CANTIDAD_VOTOS, RESULT_SCHEMA};
use crate::model::{Entity, EntityKind, Record, RecordId, ID_FIELD};
use crate::store::{FieldValues, StoreSession};

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultManager;

impl ResultManager {
    pub fn new() -> Self {
        Self
    }

    pub fn list<S: StoreSession>(&self, session: &S) -> ManagerResult<Vec<CandidateResult>> {
        list_entities(session)
    }

    pub fn get<S: StoreSession>(
        &self,
        session: &S,
        id: RecordId,
    ) -> ManagerResult<CandidateResult> {
        get_entity(session, id)
    }

    /// Records a result from exactly `{mesa_id, candidato_id, cantidad_votos}`.
    ///
    /// Referenced ids are not looked up here; dangling ones are rejected by
    /// storage when the session commits.
    pub fn create<S: StoreSession>(
        &self,
        session: S,
        payload: &Payload,
    ) -> ManagerResult<CandidateResult> {
        let outcome = create_result(session, payload);
        let id = outcome.as_ref().ok().map(|result| result.id);
        log_write(EntityKind::Result, "create", id, &outcome);
        outcome
    }

    /// Deletes one result. Results have no dependents.
    pub fn delete<S: StoreSession>(&self, session: S, id: RecordId) -> ManagerResult<()> {
        let outcome = delete_result(session, id);
        log_write(EntityKind::Result, "delete", Some(id), &outcome);
        outcome
    }

    /// Applies a partial update to one result.
    ///
    /// # Errors
    /// - `MissingArgument` when `id` is absent.
    /// - `NotFound` when `id` does not resolve.
    /// - `InvalidValue` when `cantidad_votos` is negative, before anything
    ///   else in the payload is looked at.
    /// - `IncorrectAttribute` naming the first unrecognized key.
    pub fn modify<S: StoreSession>(
        &self,
        session: S,
        payload: &Payload,
    ) -> ManagerResult<CandidateResult> {
        let outcome = modify_result(session, payload);
        log_write(EntityKind::Result, "modify", take_id(payload).ok(), &outcome);
        outcome
    }
}

fn create_result<S: StoreSession>(
    mut session: S,
    payload: &Payload,
) -> ManagerResult<CandidateResult> {
    let values = creation_values(&RESULT_SCHEMA, payload)?;
    let id = session.insert(&RESULT_SCHEMA, &values)?;
    session.commit()?;
    Ok(CandidateResult::from_record(&Record::from_fields(id, values))?)
}

fn delete_result<S: StoreSession>(mut session: S, id: RecordId) -> ManagerResult<()> {
    get_entity::<CandidateResult, _>(&session, id)?;
    session.delete(&RESULT_SCHEMA, id)?;
    session.commit()?;
    Ok(())
}

fn modify_result<S: StoreSession>(
    mut session: S,
    payload: &Payload,
) -> ManagerResult<CandidateResult> {
    let id = take_id(payload)?;
    let current = session
        .find_by_id(&RESULT_SCHEMA, id)?
        .ok_or(ManagerError::NotFound {
            entity: EntityKind::Result,
            id: Some(id),
        })?;

    if let (Some(field), Some(votes)) = (
        RESULT_SCHEMA.field(CANTIDAD_VOTOS),
        payload.get(CANTIDAD_VOTOS),
    ) {
        parse_value(field, votes)?;
    }

    let mut values: FieldValues = Vec::with_capacity(payload.len());
    for (key, value) in payload.iter().filter(|(key, _)| *key != ID_FIELD) {
        let field = RESULT_SCHEMA
            .field(key)
            .ok_or_else(|| ManagerError::IncorrectAttribute {
                entity: EntityKind::Result,
                attribute: key.clone(),
            })?;
        values.push((field.name, parse_value(field, value)?));
    }

    let changes = changed_fields(&current, values);
    session.update(&RESULT_SCHEMA, id, &changes)?;
    session.commit()?;
    Ok(CandidateResult::from_record(&apply_changes(&current, changes))?)
}
