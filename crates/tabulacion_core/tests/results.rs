use rusqlite::Connection;
use serde_json::{json, Value};
use tabulacion_core::db::open_db_in_memory;
use tabulacion_core::{
    CandidateManager, CandidateResult, EntityKind, ManagerError, PartyManager, Payload,
    ResultManager, SqliteSession, TableManager,
};

struct Fixture {
    conn: Connection,
    table_id: i64,
    other_table_id: i64,
    candidate_id: i64,
}

fn payload(value: Value) -> Payload {
    value.as_object().cloned().unwrap()
}

fn setup() -> Fixture {
    let mut conn = open_db_in_memory().unwrap();
    let party = PartyManager::new()
        .create(
            SqliteSession::begin(&mut conn).unwrap(),
            &payload(json!({"nombre": "Azul", "lema": "Adelante"})),
        )
        .unwrap();
    let candidate = CandidateManager::new()
        .create(
            SqliteSession::begin(&mut conn).unwrap(),
            &payload(json!({
                "cedula": "1-0001",
                "nombre": "Ana",
                "apellido": "Mora",
                "partido_id": party.id,
            })),
        )
        .unwrap();
    let mut table_ids = Vec::new();
    for number in [1, 2] {
        let table = TableManager::new()
            .create(
                SqliteSession::begin(&mut conn).unwrap(),
                &payload(json!({"numero_mesa": number, "cantidad_inscritos": 300})),
            )
            .unwrap();
        table_ids.push(table.id);
    }

    Fixture {
        conn,
        table_id: table_ids[0],
        other_table_id: table_ids[1],
        candidate_id: candidate.id,
    }
}

fn record_votes(
    conn: &mut Connection,
    table_id: i64,
    candidate_id: i64,
    votes: i64,
) -> CandidateResult {
    ResultManager::new()
        .create(
            SqliteSession::begin(conn).unwrap(),
            &payload(json!({
                "mesa_id": table_id,
                "candidato_id": candidate_id,
                "cantidad_votos": votes,
            })),
        )
        .unwrap()
}

fn stored_results(conn: &mut Connection) -> Vec<CandidateResult> {
    ResultManager::new()
        .list(&SqliteSession::begin(conn).unwrap())
        .unwrap()
}

#[test]
fn create_then_get_round_trips() {
    let mut fixture = setup();
    let created = record_votes(&mut fixture.conn, fixture.table_id, fixture.candidate_id, 120);
    assert_eq!(created.votes, 120);

    let fetched = ResultManager::new()
        .get(&SqliteSession::begin(&mut fixture.conn).unwrap(), created.id)
        .unwrap();
    assert_eq!(fetched, created);
    assert_eq!(
        serde_json::to_value(&fetched).unwrap(),
        json!({
            "id": created.id,
            "mesa_id": fixture.table_id,
            "candidato_id": fixture.candidate_id,
            "cantidad_votos": 120,
        })
    );
}

#[test]
fn dangling_references_fail_at_storage_and_roll_back() {
    let mut fixture = setup();
    let manager = ResultManager::new();

    let err = manager
        .create(
            SqliteSession::begin(&mut fixture.conn).unwrap(),
            &payload(json!({
                "mesa_id": fixture.other_table_id + 50,
                "candidato_id": fixture.candidate_id,
                "cantidad_votos": 10,
            })),
        )
        .unwrap_err();
    assert!(matches!(err, ManagerError::ForeignKeyViolation(_)), "{err}");

    let err = manager
        .create(
            SqliteSession::begin(&mut fixture.conn).unwrap(),
            &payload(json!({
                "mesa_id": fixture.table_id,
                "candidato_id": fixture.candidate_id + 50,
                "cantidad_votos": 10,
            })),
        )
        .unwrap_err();
    assert_eq!(err.code(), "foreign_key_violation");

    assert!(stored_results(&mut fixture.conn).is_empty());
}

#[test]
fn duplicate_table_candidate_pair_fails_at_storage() {
    let mut fixture = setup();
    record_votes(&mut fixture.conn, fixture.table_id, fixture.candidate_id, 120);

    let err = ResultManager::new()
        .create(
            SqliteSession::begin(&mut fixture.conn).unwrap(),
            &payload(json!({
                "mesa_id": fixture.table_id,
                "candidato_id": fixture.candidate_id,
                "cantidad_votos": 5,
            })),
        )
        .unwrap_err();
    assert!(matches!(err, ManagerError::UniqueConstraintViolation(_)), "{err}");
    assert_eq!(stored_results(&mut fixture.conn).len(), 1);
}

#[test]
fn create_rejects_negative_votes_and_bad_shape() {
    let mut fixture = setup();
    let manager = ResultManager::new();

    let err = manager
        .create(
            SqliteSession::begin(&mut fixture.conn).unwrap(),
            &payload(json!({
                "mesa_id": fixture.table_id,
                "candidato_id": fixture.candidate_id,
                "cantidad_votos": -1,
            })),
        )
        .unwrap_err();
    assert_eq!(err.code(), "invalid_value");

    let err = manager
        .create(
            SqliteSession::begin(&mut fixture.conn).unwrap(),
            &payload(json!({"mesa_id": fixture.table_id, "cantidad_votos": 1})),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::IncorrectAttributes {
            entity: EntityKind::Result,
            ..
        }
    ));
}

#[test]
fn negative_votes_are_rejected_before_anything_else() {
    let mut fixture = setup();
    let result = record_votes(&mut fixture.conn, fixture.table_id, fixture.candidate_id, 120);
    let manager = ResultManager::new();

    for body in [
        json!({"id": result.id, "cantidad_votos": -5}),
        json!({"id": result.id, "bogus": 1, "cantidad_votos": -5}),
    ] {
        let err = manager
            .modify(
                SqliteSession::begin(&mut fixture.conn).unwrap(),
                &payload(body),
            )
            .unwrap_err();
        assert!(
            matches!(err, ManagerError::InvalidValue { ref field, .. } if field == "cantidad_votos"),
            "{err}"
        );
    }

    let stored = manager
        .get(&SqliteSession::begin(&mut fixture.conn).unwrap(), result.id)
        .unwrap();
    assert_eq!(stored.votes, 120);
}

#[test]
fn modify_reports_unknown_attribute_and_missing_id() {
    let mut fixture = setup();
    let result = record_votes(&mut fixture.conn, fixture.table_id, fixture.candidate_id, 120);
    let manager = ResultManager::new();

    let err = manager
        .modify(
            SqliteSession::begin(&mut fixture.conn).unwrap(),
            &payload(json!({"id": result.id, "bogus": 1})),
        )
        .unwrap_err();
    match err {
        ManagerError::IncorrectAttribute { entity, attribute } => {
            assert_eq!(entity, EntityKind::Result);
            assert_eq!(attribute, "bogus");
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = manager
        .modify(
            SqliteSession::begin(&mut fixture.conn).unwrap(),
            &payload(json!({"cantidad_votos": 3})),
        )
        .unwrap_err();
    assert!(matches!(err, ManagerError::MissingArgument("id")));

    let err = manager
        .modify(
            SqliteSession::begin(&mut fixture.conn).unwrap(),
            &payload(json!({"id": result.id + 9, "cantidad_votos": 3})),
        )
        .unwrap_err();
    assert_eq!(err.code(), "not_found");
}

#[test]
fn modify_applies_changes_and_leaves_storage_authoritative() {
    let mut fixture = setup();
    let first = record_votes(&mut fixture.conn, fixture.table_id, fixture.candidate_id, 120);
    let second = record_votes(&mut fixture.conn, fixture.other_table_id, fixture.candidate_id, 40);
    let manager = ResultManager::new();

    let same = manager
        .modify(
            SqliteSession::begin(&mut fixture.conn).unwrap(),
            &payload(json!({"id": first.id, "cantidad_votos": 120})),
        )
        .unwrap();
    assert_eq!(same, first);

    let corrected = manager
        .modify(
            SqliteSession::begin(&mut fixture.conn).unwrap(),
            &payload(json!({"id": first.id, "cantidad_votos": 125})),
        )
        .unwrap();
    assert_eq!(corrected.votes, 125);

    let err = manager
        .modify(
            SqliteSession::begin(&mut fixture.conn).unwrap(),
            &payload(json!({"id": second.id, "mesa_id": fixture.table_id})),
        )
        .unwrap_err();
    assert_eq!(err.code(), "unique_constraint_violation");

    let err = manager
        .modify(
            SqliteSession::begin(&mut fixture.conn).unwrap(),
            &payload(json!({"id": second.id, "candidato_id": fixture.candidate_id + 50})),
        )
        .unwrap_err();
    assert_eq!(err.code(), "foreign_key_violation");

    assert_eq!(stored_results(&mut fixture.conn), vec![corrected, second]);
}

#[test]
fn delete_removes_result() {
    let mut fixture = setup();
    let result = record_votes(&mut fixture.conn, fixture.table_id, fixture.candidate_id, 120);
    let manager = ResultManager::new();

    manager
        .delete(SqliteSession::begin(&mut fixture.conn).unwrap(), result.id)
        .unwrap();
    assert!(stored_results(&mut fixture.conn).is_empty());

    let err = manager
        .delete(SqliteSession::begin(&mut fixture.conn).unwrap(), result.id)
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::NotFound {
            entity: EntityKind::Result,
            id: Some(_),
        }
    ));
}
