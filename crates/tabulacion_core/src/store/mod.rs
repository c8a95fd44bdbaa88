//! Persistence store contract consumed by entity managers.
//!
//! # Responsibility
//! - Define the record-level operations managers rely on.
//! - Classify storage constraint failures into typed errors.
//!
//! # Invariants
//! - One session spans one unit of work; `commit` consumes it.
//! - A session dropped without `commit` leaves no trace in storage.
//! - Uniqueness and reference rules are enforced by storage, whatever the
//!   managers pre-check.

use crate::db::DbError;
use crate::model::{EntityKind, EntitySchema, FieldValue, Record, RecordFieldError, RecordId};
use rusqlite::{ffi, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite;

pub use sqlite::SqliteSession;

pub type StoreResult<T> = Result<T, StoreError>;

/// Field assignments for insert/update, in schema field names.
pub type FieldValues = Vec<(&'static str, FieldValue)>;

/// Errors raised at the persistence boundary.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// A unique constraint rejected the write.
    UniqueViolation(String),
    /// A foreign key constraint rejected the write or the commit.
    ForeignKeyViolation(String),
    /// A CHECK constraint rejected the write.
    CheckViolation(String),
    /// Field name is not declared by the entity schema.
    UnknownField {
        entity: EntityKind,
        field: String,
    },
    /// Value type does not match the declared field kind.
    FieldKindMismatch {
        entity: EntityKind,
        field: &'static str,
    },
    /// Target row of an update/delete does not exist.
    NotFound { entity: EntityKind, id: RecordId },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UniqueViolation(detail) => write!(f, "unique constraint violated: {detail}"),
            Self::ForeignKeyViolation(detail) => {
                write!(f, "foreign key constraint violated: {detail}")
            }
            Self::CheckViolation(detail) => write!(f, "check constraint violated: {detail}"),
            Self::UnknownField { entity, field } => {
                write!(f, "field `{field}` is not declared for {entity}")
            }
            Self::FieldKindMismatch { entity, field } => {
                write!(f, "value for {entity} field `{field}` has the wrong type")
            }
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "store requires table `{table}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &value {
            if failure.code == ErrorCode::ConstraintViolation {
                let detail = message.clone().unwrap_or_else(|| failure.to_string());
                match failure.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        return Self::UniqueViolation(detail);
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return Self::ForeignKeyViolation(detail),
                    ffi::SQLITE_CONSTRAINT_CHECK => return Self::CheckViolation(detail),
                    _ => {}
                }
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RecordFieldError> for StoreError {
    fn from(value: RecordFieldError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// One unit of work against the record store.
///
/// Reads borrow the session; writes need it mutably. `commit` is the only
/// way to make writes durable.
pub trait StoreSession {
    /// Loads one record by identity.
    fn find_by_id(&self, schema: &EntitySchema, id: RecordId) -> StoreResult<Option<Record>>;

    /// Loads the first record (lowest id) whose `field` equals `value`.
    fn find_by_filter(
        &self,
        schema: &EntitySchema,
        field: &str,
        value: &FieldValue,
    ) -> StoreResult<Option<Record>>;

    /// Lists every record in storage order.
    fn list_all(&self, schema: &EntitySchema) -> StoreResult<Vec<Record>>;

    /// Counts every record of the entity.
    fn count(&self, schema: &EntitySchema) -> StoreResult<u64>;

    /// Inserts one record and returns its assigned identity.
    fn insert(&mut self, schema: &EntitySchema, values: &FieldValues) -> StoreResult<RecordId>;

    /// Overwrites the given fields of one record. Empty `changes` is a no-op.
    fn update(
        &mut self,
        schema: &EntitySchema,
        id: RecordId,
        changes: &FieldValues,
    ) -> StoreResult<()>;

    /// Deletes one record by identity.
    fn delete(&mut self, schema: &EntitySchema, id: RecordId) -> StoreResult<()>;

    /// Atomically persists every pending write of this session.
    fn commit(self) -> StoreResult<()>
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::StoreError;
    use rusqlite::Connection;

    fn failing(conn: &Connection, sql: &str) -> StoreError {
        conn.execute_batch(sql).unwrap_err().into()
    }

    #[test]
    fn constraint_failures_are_classified() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE parent (id INTEGER PRIMARY KEY);
             CREATE TABLE child (
                id INTEGER PRIMARY KEY,
                code TEXT UNIQUE,
                qty INTEGER CHECK (qty >= 0),
                parent_id INTEGER REFERENCES parent (id)
             );
             INSERT INTO child (id, code, qty) VALUES (1, 'a', 1);",
        )
        .unwrap();

        let unique = failing(&conn, "INSERT INTO child (code) VALUES ('a');");
        assert!(matches!(unique, StoreError::UniqueViolation(_)));

        let foreign = failing(&conn, "INSERT INTO child (parent_id) VALUES (99);");
        assert!(matches!(foreign, StoreError::ForeignKeyViolation(_)));

        let check = failing(&conn, "INSERT INTO child (qty) VALUES (-1);");
        assert!(matches!(check, StoreError::CheckViolation(_)));

        let other = failing(&conn, "SELECT * FROM missing_table;");
        assert!(matches!(other, StoreError::Db(_)));
    }
}
