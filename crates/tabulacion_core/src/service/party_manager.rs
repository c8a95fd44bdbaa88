//! Party manager.
//!
//! # Invariants
//! - Party `nombre` is unique.
//! - A party referenced by any candidate cannot be deleted.

use super::allowlist::{
    apply_changes, changed_fields, creation_values, modification_values, take_id, value_of,
    Payload,
};
use super::{
    ensure_no_dependents, ensure_unique_for_create, ensure_unique_for_modify, get_entity,
    list_entities, log_write, ManagerError, ManagerResult,
};
use crate::model::candidate::{CANDIDATE_SCHEMA, PARTIDO_ID};
use crate::model::party::{Party, NOMBRE, PARTY_SCHEMA};
use crate::model::{Entity, EntityKind, Record, RecordId};
use crate::store::StoreSession;

#[derive(Debug, Clone, Copy, Default)]
pub struct PartyManager;

impl PartyManager {
    pub fn new() -> Self {
        Self
    }

    pub fn list<S: StoreSession>(&self, session: &S) -> ManagerResult<Vec<Party>> {
        list_entities(session)
    }

    pub fn get<S: StoreSession>(&self, session: &S, id: RecordId) -> ManagerResult<Party> {
        get_entity(session, id)
    }

    /// Number of registered parties.
    pub fn count<S: StoreSession>(&self, session: &S) -> ManagerResult<u64> {
        Ok(session.count(&PARTY_SCHEMA)?)
    }

    /// Fails with `NotFound` when no party exists at all, or when `id` does
    /// not resolve.
    pub fn ensure_exists<S: StoreSession>(&self, session: &S, id: RecordId) -> ManagerResult<()> {
        if self.count(session)? == 0 {
            return Err(ManagerError::NotFound {
                entity: EntityKind::Party,
                id: None,
            });
        }
        if session.find_by_id(&PARTY_SCHEMA, id)?.is_none() {
            return Err(ManagerError::NotFound {
                entity: EntityKind::Party,
                id: Some(id),
            });
        }
        Ok(())
    }

    /// Creates a party from `{nombre, lema}`.
    pub fn create<S: StoreSession>(&self, session: S, payload: &Payload) -> ManagerResult<Party> {
        let outcome = create_party(session, payload);
        let id = outcome.as_ref().ok().map(|party| party.id);
        log_write(EntityKind::Party, "create", id, &outcome);
        outcome
    }

    /// Deletes a party no candidate references.
    pub fn delete<S: StoreSession>(&self, session: S, id: RecordId) -> ManagerResult<()> {
        let outcome = delete_party(session, id);
        log_write(EntityKind::Party, "delete", Some(id), &outcome);
        outcome
    }

    /// Applies a partial update `{id, ..subset of nombre/lema}`.
    pub fn modify<S: StoreSession>(&self, session: S, payload: &Payload) -> ManagerResult<Party> {
        let outcome = modify_party(session, payload);
        log_write(EntityKind::Party, "modify", take_id(payload).ok(), &outcome);
        outcome
    }
}

fn create_party<S: StoreSession>(mut session: S, payload: &Payload) -> ManagerResult<Party> {
    let values = creation_values(&PARTY_SCHEMA, payload)?;
    if let Some(name) = value_of(&values, NOMBRE) {
        ensure_unique_for_create(&session, &PARTY_SCHEMA, NOMBRE, name)?;
    }

    let id = session.insert(&PARTY_SCHEMA, &values)?;
    session.commit()?;
    Ok(Party::from_record(&Record::from_fields(id, values))?)
}

fn delete_party<S: StoreSession>(mut session: S, id: RecordId) -> ManagerResult<()> {
    get_entity::<Party, _>(&session, id)?;
    ensure_no_dependents(&session, EntityKind::Party, id, &CANDIDATE_SCHEMA, PARTIDO_ID)?;

    session.delete(&PARTY_SCHEMA, id)?;
    session.commit()?;
    Ok(())
}

fn modify_party<S: StoreSession>(mut session: S, payload: &Payload) -> ManagerResult<Party> {
    let (id, values) = modification_values(&PARTY_SCHEMA, payload)?;
    let current = session
        .find_by_id(&PARTY_SCHEMA, id)?
        .ok_or(ManagerError::NotFound {
            entity: EntityKind::Party,
            id: Some(id),
        })?;
    if let Some(name) = value_of(&values, NOMBRE) {
        ensure_unique_for_modify(&session, &PARTY_SCHEMA, id, NOMBRE, name)?;
    }

    let changes = changed_fields(&current, values);
    session.update(&PARTY_SCHEMA, id, &changes)?;
    session.commit()?;
    Ok(Party::from_record(&apply_changes(&current, changes))?)
}
