//! SQLite-backed store session.
//!
//! # Responsibility
//! - Translate schema-level record operations into SQL on one transaction.
//! - Keep SQL text inside the persistence boundary.
//!
//! # Invariants
//! - Every session runs inside one `BEGIN IMMEDIATE` transaction.
//! - Table and column names only ever come from static schemas.
//! - Dropping a session without `commit` rolls back its writes.

use super::{FieldValues, StoreError, StoreResult, StoreSession};
use crate::db::migrations::{latest_version, schema_version};
use crate::model::{
    EntitySchema, FieldDescriptor, FieldKind, FieldValue, Record, RecordId, ID_FIELD,
};
use crate::model::{candidate, party, polling_table, result};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const REQUIRED_SCHEMAS: [&EntitySchema; 4] = [
    &party::PARTY_SCHEMA,
    &candidate::CANDIDATE_SCHEMA,
    &polling_table::TABLE_SCHEMA,
    &result::RESULT_SCHEMA,
];

/// Store session over one SQLite transaction.
pub struct SqliteSession<'conn> {
    tx: Transaction<'conn>,
}

impl<'conn> SqliteSession<'conn> {
    /// Opens an immediate transaction on a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` when an entity table is absent.
    pub fn begin(conn: &'conn mut Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(conn)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(Self { tx })
    }
}

impl StoreSession for SqliteSession<'_> {
    fn find_by_id(&self, schema: &EntitySchema, id: RecordId) -> StoreResult<Option<Record>> {
        let sql = format!("{} WHERE {ID_FIELD} = ?1;", select_sql(schema));
        let mut stmt = self.tx.prepare(&sql)?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(schema, row)?));
        }
        Ok(None)
    }

    fn find_by_filter(
        &self,
        schema: &EntitySchema,
        field: &str,
        value: &FieldValue,
    ) -> StoreResult<Option<Record>> {
        let descriptor = declared_field(schema, field)?;
        ensure_kind(schema, descriptor, value)?;

        let sql = format!(
            "{} WHERE {} = ?1 ORDER BY {ID_FIELD} ASC LIMIT 1;",
            select_sql(schema),
            descriptor.name
        );
        let mut stmt = self.tx.prepare(&sql)?;
        let mut rows = stmt.query([to_sql_value(value)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(schema, row)?));
        }
        Ok(None)
    }

    fn list_all(&self, schema: &EntitySchema) -> StoreResult<Vec<Record>> {
        let sql = format!("{} ORDER BY {ID_FIELD} ASC;", select_sql(schema));
        let mut stmt = self.tx.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(schema, row)?);
        }
        Ok(records)
    }

    fn count(&self, schema: &EntitySchema) -> StoreResult<u64> {
        let count: i64 = self.tx.query_row(
            &format!("SELECT COUNT(*) FROM {};", schema.table),
            [],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("negative row count in {}", schema.table)))
    }

    fn insert(&mut self, schema: &EntitySchema, values: &FieldValues) -> StoreResult<RecordId> {
        let (columns, bind_values) = checked_assignments(schema, values)?;
        let placeholders = (1..=columns.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");

        self.tx.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES ({placeholders});",
                schema.table,
                columns.join(", ")
            ),
            params_from_iter(bind_values),
        )?;

        let id = self.tx.last_insert_rowid();
        debug!(
            "event=store_insert module=store status=ok entity={} id={id}",
            schema.kind
        );
        Ok(id)
    }

    fn update(
        &mut self,
        schema: &EntitySchema,
        id: RecordId,
        changes: &FieldValues,
    ) -> StoreResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let (columns, mut bind_values) = checked_assignments(schema, changes)?;
        let assignments = columns
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        bind_values.push(Value::Integer(id));

        let changed = self.tx.execute(
            &format!(
                "UPDATE {} SET {assignments} WHERE {ID_FIELD} = ?{};",
                schema.table,
                bind_values.len()
            ),
            params_from_iter(bind_values),
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound {
                entity: schema.kind,
                id,
            });
        }

        debug!(
            "event=store_update module=store status=ok entity={} id={id} fields={}",
            schema.kind,
            columns.len()
        );
        Ok(())
    }

    fn delete(&mut self, schema: &EntitySchema, id: RecordId) -> StoreResult<()> {
        let changed = self.tx.execute(
            &format!("DELETE FROM {} WHERE {ID_FIELD} = ?1;", schema.table),
            [id],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound {
                entity: schema.kind,
                id,
            });
        }

        debug!(
            "event=store_delete module=store status=ok entity={} id={id}",
            schema.kind
        );
        Ok(())
    }

    fn commit(self) -> StoreResult<()> {
        self.tx.commit()?;
        Ok(())
    }
}

fn select_sql(schema: &EntitySchema) -> String {
    let mut columns = vec![ID_FIELD];
    columns.extend(schema.fields.iter().map(|field| field.name));
    format!("SELECT {} FROM {}", columns.join(", "), schema.table)
}

fn declared_field(schema: &EntitySchema, field: &str) -> StoreResult<&'static FieldDescriptor> {
    schema.field(field).ok_or_else(|| StoreError::UnknownField {
        entity: schema.kind,
        field: field.to_string(),
    })
}

fn ensure_kind(
    schema: &EntitySchema,
    descriptor: &FieldDescriptor,
    value: &FieldValue,
) -> StoreResult<()> {
    if value.kind() != descriptor.kind {
        return Err(StoreError::FieldKindMismatch {
            entity: schema.kind,
            field: descriptor.name,
        });
    }
    Ok(())
}

fn checked_assignments(
    schema: &EntitySchema,
    values: &FieldValues,
) -> StoreResult<(Vec<&'static str>, Vec<Value>)> {
    let mut columns = Vec::with_capacity(values.len());
    let mut bind_values = Vec::with_capacity(values.len());
    for (field, value) in values {
        let descriptor = declared_field(schema, field)?;
        ensure_kind(schema, descriptor, value)?;
        columns.push(descriptor.name);
        bind_values.push(to_sql_value(value));
    }
    Ok((columns, bind_values))
}

fn to_sql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Integer(value) => Value::Integer(*value),
        FieldValue::Text(value) => Value::Text(value.clone()),
    }
}

fn parse_record_row(schema: &EntitySchema, row: &Row<'_>) -> StoreResult<Record> {
    let mut record = Record::new(row.get(ID_FIELD)?);
    for field in schema.fields {
        let value = match field.kind {
            FieldKind::Integer => FieldValue::Integer(row.get(field.name)?),
            FieldKind::Text => FieldValue::Text(row.get(field.name)?),
        };
        record.values.insert(field.name, value);
    }
    Ok(record)
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for schema in REQUIRED_SCHEMAS {
        if !table_exists(conn, schema.table)? {
            return Err(StoreError::MissingRequiredTable(schema.table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
