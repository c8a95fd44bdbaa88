//! Polling table ("mesa") manager.
//!
//! # Invariants
//! - `numero_mesa` is unique across tables.
//! - A table with recorded results cannot be deleted.

use super::allowlist::{
    apply_changes, changed_fields, creation_values, modification_values, take_id, value_of,
    Payload,
};
use super::{
    ensure_no_dependents, ensure_unique_for_create, ensure_unique_for_modify, get_entity,
    list_entities, log_write, ManagerError, ManagerResult,
};
use crate::model::polling_table::{PollingTable, NUMERO_MESA, TABLE_SCHEMA};
use crate::model::result::{MESA_ID, RESULT_SCHEMA};
use crate::model::{Entity, EntityKind, Record, RecordId};
use crate::store::StoreSession;

#[derive(Debug, Clone, Copy, Default)]
pub struct TableManager;

impl TableManager {
    pub fn new() -> Self {
        Self
    }

    pub fn list<S: StoreSession>(&self, session: &S) -> ManagerResult<Vec<PollingTable>> {
        list_entities(session)
    }

    pub fn get<S: StoreSession>(&self, session: &S, id: RecordId) -> ManagerResult<PollingTable> {
        get_entity(session, id)
    }

    /// Returns the registered-voter count of one table.
    pub fn get_max_votantes<S: StoreSession>(
        &self,
        session: &S,
        id: RecordId,
    ) -> ManagerResult<i64> {
        Ok(self.get(session, id)?.registered_voters)
    }

    /// Creates a table from exactly `{numero_mesa, cantidad_inscritos}`.
    ///
    /// # Errors
    /// - `IncorrectAttributes` when keys differ from the required set.
    /// - `InvalidValue` for negative numbers.
    /// - `AlreadyExists` when `numero_mesa` is taken.
    pub fn create<S: StoreSession>(
        &self,
        session: S,
        payload: &Payload,
    ) -> ManagerResult<PollingTable> {
        let outcome = create_table(session, payload);
        let id = outcome.as_ref().ok().map(|table| table.id);
        log_write(EntityKind::Table, "create", id, &outcome);
        outcome
    }

    /// Deletes a table that has no recorded results.
    pub fn delete<S: StoreSession>(&self, session: S, id: RecordId) -> ManagerResult<()> {
        let outcome = delete_table(session, id);
        log_write(EntityKind::Table, "delete", Some(id), &outcome);
        outcome
    }

    /// Applies a partial update; `DuplicateConstraint` when another table
    /// owns the new `numero_mesa`.
    pub fn modify<S: StoreSession>(
        &self,
        session: S,
        payload: &Payload,
    ) -> ManagerResult<PollingTable> {
        let outcome = modify_table(session, payload);
        log_write(EntityKind::Table, "modify", take_id(payload).ok(), &outcome);
        outcome
    }
}

fn create_table<S: StoreSession>(mut session: S, payload: &Payload) -> ManagerResult<PollingTable> {
    let values = creation_values(&TABLE_SCHEMA, payload)?;
    if let Some(number) = value_of(&values, NUMERO_MESA) {
        ensure_unique_for_create(&session, &TABLE_SCHEMA, NUMERO_MESA, number)?;
    }

    let id = session.insert(&TABLE_SCHEMA, &values)?;
    session.commit()?;
    Ok(PollingTable::from_record(&Record::from_fields(id, values))?)
}

fn delete_table<S: StoreSession>(mut session: S, id: RecordId) -> ManagerResult<()> {
    get_entity::<PollingTable, _>(&session, id)?;
    ensure_no_dependents(&session, EntityKind::Table, id, &RESULT_SCHEMA, MESA_ID)?;

    session.delete(&TABLE_SCHEMA, id)?;
    session.commit()?;
    Ok(())
}

fn modify_table<S: StoreSession>(mut session: S, payload: &Payload) -> ManagerResult<PollingTable> {
    let (id, values) = modification_values(&TABLE_SCHEMA, payload)?;
    let current = session
        .find_by_id(&TABLE_SCHEMA, id)?
        .ok_or(ManagerError::NotFound {
            entity: EntityKind::Table,
            id: Some(id),
        })?;
    if let Some(number) = value_of(&values, NUMERO_MESA) {
        ensure_unique_for_modify(&session, &TABLE_SCHEMA, id, NUMERO_MESA, number)?;
    }

    let changes = changed_fields(&current, values);
    session.update(&TABLE_SCHEMA, id, &changes)?;
    session.commit()?;
    Ok(PollingTable::from_record(&apply_changes(&current, changes))?)
}
