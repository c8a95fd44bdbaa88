//! Candidate manager.
//!
//! # Responsibility
//! - Create, modify and delete candidates under the registry rules.
//!
//! # Invariants
//! - `cedula` is unique across candidates.
//! - A candidate can only be created for an existing party.
//! - A candidate with recorded results cannot be deleted.

use super::allowlist::{
    apply_changes, changed_fields, creation_values, modification_values, take_id, value_of,
    Payload,
};
use super::{
    ensure_no_dependents, ensure_unique_for_create, ensure_unique_for_modify, get_entity,
    list_entities, log_write, ManagerError, ManagerResult, PartyManager,
};
use crate::model::candidate::{Candidate, CANDIDATE_SCHEMA, CEDULA, PARTIDO_ID};
use crate::model::result::{CANDIDATO_ID, RESULT_SCHEMA};
use crate::model::{Entity, EntityKind, FieldValue, Record, RecordId};
use crate::store::StoreSession;

#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateManager {
    parties: PartyManager,
}

impl CandidateManager {
    pub fn new() -> Self {
        Self {
            parties: PartyManager::new(),
        }
    }

    /// Lists all candidates in storage order.
    pub fn list<S: StoreSession>(&self, session: &S) -> ManagerResult<Vec<Candidate>> {
        list_entities(session)
    }

    /// Gets one candidate by id.
    ///
    /// # Errors
    /// - `NotFound` when no candidate has `id`.
    pub fn get<S: StoreSession>(&self, session: &S, id: RecordId) -> ManagerResult<Candidate> {
        get_entity(session, id)
    }

    /// Creates a candidate from exactly `{cedula, nombre, apellido, partido_id}`.
    ///
    /// # Errors
    /// - `IncorrectAttributes` when keys differ from the required set.
    /// - `NotFound` when no party exists, or `partido_id` does not resolve.
    /// - `AlreadyExists` when the cedula is taken.
    pub fn create<S: StoreSession>(
        &self,
        session: S,
        payload: &Payload,
    ) -> ManagerResult<Candidate> {
        let outcome = self.create_candidate(session, payload);
        let id = outcome.as_ref().ok().map(|candidate| candidate.id);
        log_write(EntityKind::Candidate, "create", id, &outcome);
        outcome
    }

    /// Deletes a candidate that has no recorded results.
    ///
    /// # Errors
    /// - `NotFound` when no candidate has `id`.
    /// - `RelatedDataExists` while any result references the candidate.
    pub fn delete<S: StoreSession>(&self, session: S, id: RecordId) -> ManagerResult<()> {
        let outcome = delete_candidate(session, id);
        log_write(EntityKind::Candidate, "delete", Some(id), &outcome);
        outcome
    }

    /// Applies a partial update: `id` plus any subset of the settable fields.
    ///
    /// Only fields whose value differs from the stored one are written.
    ///
    /// # Errors
    /// - `IncorrectAttributes` for keys outside the settable set.
    /// - `MissingArgument` when `id` is absent.
    /// - `NotFound` when `id` or a new `partido_id` does not resolve.
    /// - `DuplicateConstraint` when another candidate owns the new cedula.
    pub fn modify<S: StoreSession>(
        &self,
        session: S,
        payload: &Payload,
    ) -> ManagerResult<Candidate> {
        let outcome = self.modify_candidate(session, payload);
        log_write(EntityKind::Candidate, "modify", take_id(payload).ok(), &outcome);
        outcome
    }

    fn create_candidate<S: StoreSession>(
        &self,
        mut session: S,
        payload: &Payload,
    ) -> ManagerResult<Candidate> {
        let values = creation_values(&CANDIDATE_SCHEMA, payload)?;
        if let Some(FieldValue::Integer(party_id)) = value_of(&values, PARTIDO_ID) {
            self.parties.ensure_exists(&session, *party_id)?;
        }
        if let Some(cedula) = value_of(&values, CEDULA) {
            ensure_unique_for_create(&session, &CANDIDATE_SCHEMA, CEDULA, cedula)?;
        }

        let id = session.insert(&CANDIDATE_SCHEMA, &values)?;
        session.commit()?;
        Ok(Candidate::from_record(&Record::from_fields(id, values))?)
    }

    fn modify_candidate<S: StoreSession>(
        &self,
        mut session: S,
        payload: &Payload,
    ) -> ManagerResult<Candidate> {
        let (id, values) = modification_values(&CANDIDATE_SCHEMA, payload)?;
        let current = session
            .find_by_id(&CANDIDATE_SCHEMA, id)?
            .ok_or(ManagerError::NotFound {
                entity: EntityKind::Candidate,
                id: Some(id),
            })?;
        if let Some(cedula) = value_of(&values, CEDULA) {
            ensure_unique_for_modify(&session, &CANDIDATE_SCHEMA, id, CEDULA, cedula)?;
        }
        if let Some(FieldValue::Integer(party_id)) = value_of(&values, PARTIDO_ID) {
            self.parties.ensure_exists(&session, *party_id)?;
        }

        let changes = changed_fields(&current, values);
        session.update(&CANDIDATE_SCHEMA, id, &changes)?;
        session.commit()?;
        Ok(Candidate::from_record(&apply_changes(&current, changes))?)
    }
}

fn delete_candidate<S: StoreSession>(mut session: S, id: RecordId) -> ManagerResult<()> {
    get_entity::<Candidate, _>(&session, id)?;
    ensure_no_dependents(
        &session,
        EntityKind::Candidate,
        id,
        &RESULT_SCHEMA,
        CANDIDATO_ID,
    )?;

    session.delete(&CANDIDATE_SCHEMA, id)?;
    session.commit()?;
    Ok(())
}
