//! Typed failures surfaced by entity managers.
//!
//! # Invariants
//! - Validation failures are raised before any write reaches the store.
//! - Storage constraint failures keep their own variants so callers can
//!   tell a pre-check rejection apart from a store rejection.

use crate::model::{EntityKind, RecordFieldError, RecordId};
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ManagerResult<T> = Result<T, ManagerError>;

#[derive(Debug)]
pub enum ManagerError {
    /// Referenced entity does not exist. `id: None` means none exist at all.
    NotFound {
        entity: EntityKind,
        id: Option<RecordId>,
    },
    /// Creation would duplicate a unique field.
    AlreadyExists {
        entity: EntityKind,
        field: &'static str,
        value: String,
    },
    /// Modification would duplicate a unique field owned by another record.
    DuplicateConstraint {
        entity: EntityKind,
        field: &'static str,
        value: String,
    },
    /// Payload key set does not match the allowed set for the operation.
    IncorrectAttributes {
        entity: EntityKind,
        expected: Vec<&'static str>,
    },
    /// One payload key is not a recognized attribute of the entity.
    IncorrectAttribute {
        entity: EntityKind,
        attribute: String,
    },
    /// Required argument absent from a modification payload.
    MissingArgument(&'static str),
    /// Value is present but semantically invalid.
    InvalidValue {
        field: String,
        reason: &'static str,
    },
    /// Deletion blocked by records that still reference the target.
    RelatedDataExists {
        entity: EntityKind,
        id: RecordId,
        dependent: EntityKind,
    },
    /// Storage rejected a dangling reference.
    ForeignKeyViolation(String),
    /// Storage rejected a duplicate value.
    UniqueConstraintViolation(String),
    /// Any other persistence failure.
    Store(StoreError),
}

impl ManagerError {
    /// Stable machine-readable code for logs and response mapping.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::AlreadyExists { .. } => "already_exists",
            Self::DuplicateConstraint { .. } => "duplicate_constraint",
            Self::IncorrectAttributes { .. } => "incorrect_attributes",
            Self::IncorrectAttribute { .. } => "incorrect_attribute",
            Self::MissingArgument(_) => "missing_argument",
            Self::InvalidValue { .. } => "invalid_value",
            Self::RelatedDataExists { .. } => "related_data_exists",
            Self::ForeignKeyViolation(_) => "foreign_key_violation",
            Self::UniqueConstraintViolation(_) => "unique_constraint_violation",
            Self::Store(_) => "store_error",
        }
    }
}

impl Display for ManagerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id: Some(id) } => write!(f, "{entity} not found: {id}"),
            Self::NotFound { entity, id: None } => write!(f, "no {entity} exists"),
            Self::AlreadyExists {
                entity,
                field,
                value,
            } => write!(f, "a {entity} with {field} `{value}` already exists"),
            Self::DuplicateConstraint {
                entity,
                field,
                value,
            } => write!(
                f,
                "another {entity} already owns {field} `{value}`; modification rejected"
            ),
            Self::IncorrectAttributes { entity, expected } => write!(
                f,
                "incorrect attributes for {entity}; expected: {}",
                expected.join(", ")
            ),
            Self::IncorrectAttribute { entity, attribute } => {
                write!(f, "attribute `{attribute}` is not defined for {entity}")
            }
            Self::MissingArgument(name) => write!(f, "missing required argument `{name}`"),
            Self::InvalidValue { field, reason } => write!(f, "invalid value for `{field}`: {reason}"),
            Self::RelatedDataExists {
                entity,
                id,
                dependent,
            } => write!(
                f,
                "{entity} {id} still has {dependent} records; delete them first"
            ),
            Self::ForeignKeyViolation(detail) => write!(f, "{detail}"),
            Self::UniqueConstraintViolation(detail) => write!(f, "{detail}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ManagerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ManagerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::UniqueViolation(detail) => Self::UniqueConstraintViolation(detail),
            StoreError::ForeignKeyViolation(detail) => Self::ForeignKeyViolation(detail),
            StoreError::NotFound { entity, id } => Self::NotFound {
                entity,
                id: Some(id),
            },
            other => Self::Store(other),
        }
    }
}

impl From<RecordFieldError> for ManagerError {
    fn from(value: RecordFieldError) -> Self {
        Self::Store(value.into())
    }
}
