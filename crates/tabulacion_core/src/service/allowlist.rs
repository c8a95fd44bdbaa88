//! Attribute-allowlist validation shared by every entity manager.
//!
//! # Responsibility
//! - Check payload key sets against an entity's static field descriptors.
//! - Convert JSON payload values into typed field values.
//!
//! # Invariants
//! - Creation payloads carry exactly the settable field set.
//! - Modification payloads carry `id` plus a subset of the settable fields.
//! - Key-set violations report the full allowed set.

use super::error::{ManagerError, ManagerResult};
use crate::model::{
    EntitySchema, FieldDescriptor, FieldKind, FieldValue, Record, RecordId, ID_FIELD,
};
use crate::store::FieldValues;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Caller-supplied field map, as decoded from a JSON object.
pub type Payload = Map<String, Value>;

/// Validates a creation payload and returns its values in schema order.
///
/// # Errors
/// - `IncorrectAttributes` when keys differ from the settable set.
/// - `InvalidValue` when a value has the wrong type or sign.
pub fn creation_values(schema: &EntitySchema, payload: &Payload) -> ManagerResult<FieldValues> {
    let expected: BTreeSet<&str> = schema.fields.iter().map(|field| field.name).collect();
    let supplied: BTreeSet<&str> = payload.keys().map(String::as_str).collect();
    if supplied != expected {
        return Err(incorrect_attributes(schema));
    }

    schema
        .fields
        .iter()
        .map(|field| -> ManagerResult<(&'static str, FieldValue)> {
            let value = payload
                .get(field.name)
                .ok_or_else(|| incorrect_attributes(schema))?;
            Ok((field.name, parse_value(field, value)?))
        })
        .collect()
}

/// Validates a modification payload, consuming its `id`.
///
/// Returns the target identity and the requested values. An `id`-only
/// payload yields an empty value list.
///
/// # Errors
/// - `IncorrectAttributes` when the payload is empty or has a key outside
///   the settable set plus `id`.
/// - `MissingArgument` when `id` is absent.
/// - `InvalidValue` when a value has the wrong type or sign.
pub fn modification_values(
    schema: &EntitySchema,
    payload: &Payload,
) -> ManagerResult<(RecordId, FieldValues)> {
    let recognized = |key: &String| key == ID_FIELD || schema.is_settable(key);
    if payload.is_empty() || !payload.keys().all(recognized) {
        return Err(incorrect_attributes(schema));
    }

    let id = take_id(payload)?;
    let mut values = Vec::with_capacity(payload.len() - 1);
    for field in schema.fields {
        if let Some(value) = payload.get(field.name) {
            values.push((field.name, parse_value(field, value)?));
        }
    }
    Ok((id, values))
}

/// Reads the mandatory `id` of a modification payload.
pub fn take_id(payload: &Payload) -> ManagerResult<RecordId> {
    let value = payload
        .get(ID_FIELD)
        .ok_or(ManagerError::MissingArgument(ID_FIELD))?;
    value.as_i64().ok_or_else(|| ManagerError::InvalidValue {
        field: ID_FIELD.to_string(),
        reason: "expected an integer id",
    })
}

/// Converts one JSON value into the descriptor's field kind.
pub fn parse_value(field: &FieldDescriptor, value: &Value) -> ManagerResult<FieldValue> {
    match field.kind {
        FieldKind::Text => value
            .as_str()
            .map(|text| FieldValue::Text(text.to_string()))
            .ok_or_else(|| invalid_value(field, "expected a string")),
        FieldKind::Integer => {
            let number = value
                .as_i64()
                .ok_or_else(|| invalid_value(field, "expected an integer"))?;
            if field.non_negative && number < 0 {
                return Err(invalid_value(field, "must not be negative"));
            }
            Ok(FieldValue::Integer(number))
        }
    }
}

/// Looks up one requested value by field name.
pub fn value_of<'v>(values: &'v FieldValues, field: &str) -> Option<&'v FieldValue> {
    values
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, value)| value)
}

/// Drops requested values equal to what is already stored.
pub fn changed_fields(current: &Record, values: FieldValues) -> FieldValues {
    values
        .into_iter()
        .filter(|(name, value)| current.get(name) != Some(value))
        .collect()
}

/// Returns `current` with `changes` applied.
pub fn apply_changes(current: &Record, changes: FieldValues) -> Record {
    let mut updated = current.clone();
    updated.values.extend(changes);
    updated
}

fn incorrect_attributes(schema: &EntitySchema) -> ManagerError {
    ManagerError::IncorrectAttributes {
        entity: schema.kind,
        expected: schema.field_names(),
    }
}

fn invalid_value(field: &FieldDescriptor, reason: &'static str) -> ManagerError {
    ManagerError::InvalidValue {
        field: field.name.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::{changed_fields, creation_values, modification_values, Payload};
    use crate::model::polling_table::TABLE_SCHEMA;
    use crate::model::{FieldValue, Record};
    use crate::service::ManagerError;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn creation_requires_exact_field_set() {
        let ok = creation_values(
            &TABLE_SCHEMA,
            &payload(json!({"cantidad_inscritos": 200, "numero_mesa": 5})),
        )
        .unwrap();
        assert_eq!(
            ok,
            vec![
                ("numero_mesa", FieldValue::Integer(5)),
                ("cantidad_inscritos", FieldValue::Integer(200)),
            ]
        );

        for bad in [
            json!({"numero_mesa": 5}),
            json!({"numero_mesa": 5, "cantidad_inscritos": 1, "extra": 0}),
            json!({"id": 1, "numero_mesa": 5, "cantidad_inscritos": 1}),
            json!({}),
        ] {
            let err = creation_values(&TABLE_SCHEMA, &payload(bad)).unwrap_err();
            match err {
                ManagerError::IncorrectAttributes { expected, .. } => {
                    assert_eq!(expected, vec!["numero_mesa", "cantidad_inscritos"]);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn creation_rejects_wrong_type_and_negative_count() {
        let err = creation_values(
            &TABLE_SCHEMA,
            &payload(json!({"numero_mesa": "5", "cantidad_inscritos": 1})),
        )
        .unwrap_err();
        assert!(
            matches!(err, ManagerError::InvalidValue { ref field, .. } if field == "numero_mesa")
        );

        let err = creation_values(
            &TABLE_SCHEMA,
            &payload(json!({"numero_mesa": 5, "cantidad_inscritos": -1})),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ManagerError::InvalidValue {
                reason: "must not be negative",
                ..
            }
        ));
    }

    #[test]
    fn modification_checks_keys_before_id() {
        let err = modification_values(&TABLE_SCHEMA, &payload(json!({"bogus": 1}))).unwrap_err();
        assert!(matches!(err, ManagerError::IncorrectAttributes { .. }));

        let err =
            modification_values(&TABLE_SCHEMA, &payload(json!({"numero_mesa": 3}))).unwrap_err();
        assert!(matches!(err, ManagerError::MissingArgument("id")));

        let err = modification_values(&TABLE_SCHEMA, &payload(json!({}))).unwrap_err();
        assert!(matches!(err, ManagerError::IncorrectAttributes { .. }));

        let (id, values) =
            modification_values(&TABLE_SCHEMA, &payload(json!({"id": 9}))).unwrap();
        assert_eq!(id, 9);
        assert!(values.is_empty());
    }

    #[test]
    fn changed_fields_skips_equal_values() {
        let current = Record::new(1)
            .with("numero_mesa", 5_i64)
            .with("cantidad_inscritos", 200_i64);
        let changes = changed_fields(
            &current,
            vec![
                ("numero_mesa", FieldValue::Integer(5)),
                ("cantidad_inscritos", FieldValue::Integer(250)),
            ],
        );
        assert_eq!(changes, vec![("cantidad_inscritos", FieldValue::Integer(250))]);
    }
}
