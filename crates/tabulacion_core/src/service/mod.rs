//! Entity managers: validation and referential integrity above the store.
//!
//! # Responsibility
//! - Validate payload shape and business rules before any write.
//! - Run each operation on an explicit store session owned by the caller.
//!
//! # Invariants
//! - Read operations borrow the session and never commit.
//! - Write operations consume the session, commit once on success, and
//!   roll back on every error path by dropping it.

pub mod allowlist;
pub mod candidate_manager;
mod error;
pub mod party_manager;
pub mod result_manager;
pub mod table_manager;

pub use allowlist::Payload;
pub use candidate_manager::CandidateManager;
pub use error::{ManagerError, ManagerResult};
pub use party_manager::PartyManager;
pub use result_manager::ResultManager;
pub use table_manager::TableManager;

use crate::model::{Entity, EntityKind, EntitySchema, FieldValue, RecordId};
use crate::store::StoreSession;
use log::{info, warn};

/// Loads every record of `E` in storage order.
fn list_entities<E: Entity, S: StoreSession>(session: &S) -> ManagerResult<Vec<E>> {
    session
        .list_all(E::SCHEMA)?
        .iter()
        .map(|record| E::from_record(record).map_err(ManagerError::from))
        .collect()
}

/// Loads one `E` or fails with `NotFound`.
fn get_entity<E: Entity, S: StoreSession>(session: &S, id: RecordId) -> ManagerResult<E> {
    let record = session
        .find_by_id(E::SCHEMA, id)?
        .ok_or(ManagerError::NotFound {
            entity: E::SCHEMA.kind,
            id: Some(id),
        })?;
    Ok(E::from_record(&record)?)
}

/// Fails with `RelatedDataExists` when any `dependent` row references `id`
/// through `field`.
fn ensure_no_dependents<S: StoreSession>(
    session: &S,
    entity: EntityKind,
    id: RecordId,
    dependent: &EntitySchema,
    field: &str,
) -> ManagerResult<()> {
    if session
        .find_by_filter(dependent, field, &FieldValue::Integer(id))?
        .is_some()
    {
        return Err(ManagerError::RelatedDataExists {
            entity,
            id,
            dependent: dependent.kind,
        });
    }
    Ok(())
}

/// Fails with `AlreadyExists` when `value` is already taken for `field`.
fn ensure_unique_for_create<S: StoreSession>(
    session: &S,
    schema: &EntitySchema,
    field: &'static str,
    value: &FieldValue,
) -> ManagerResult<()> {
    if session.find_by_filter(schema, field, value)?.is_some() {
        return Err(ManagerError::AlreadyExists {
            entity: schema.kind,
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Fails with `DuplicateConstraint` when a record other than `id` owns `value`.
fn ensure_unique_for_modify<S: StoreSession>(
    session: &S,
    schema: &EntitySchema,
    id: RecordId,
    field: &'static str,
    value: &FieldValue,
) -> ManagerResult<()> {
    match session.find_by_filter(schema, field, value)? {
        Some(owner) if owner.id != id => Err(ManagerError::DuplicateConstraint {
            entity: schema.kind,
            field,
            value: value.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Emits the outcome event of one write operation.
fn log_write<T>(
    entity: EntityKind,
    operation: &'static str,
    id: Option<RecordId>,
    outcome: &ManagerResult<T>,
) {
    let id = id.map_or_else(|| "-".to_string(), |id| id.to_string());
    match outcome {
        Ok(_) => info!("event={entity}_{operation} module=service status=ok id={id}"),
        Err(err) => warn!(
            "event={entity}_{operation} module=service status=rejected id={id} error_code={} error={err}",
            err.code()
        ),
    }
}
