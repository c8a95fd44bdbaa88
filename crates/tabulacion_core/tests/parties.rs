use rusqlite::Connection;
use serde_json::{json, Value};
use tabulacion_core::db::open_db_in_memory;
use tabulacion_core::{
    CandidateManager, EntityKind, ManagerError, Party, PartyManager, Payload, SqliteSession,
};

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn payload(value: Value) -> Payload {
    value.as_object().cloned().unwrap()
}

fn create_party(conn: &mut Connection, nombre: &str) -> Party {
    PartyManager::new()
        .create(
            SqliteSession::begin(conn).unwrap(),
            &payload(json!({"nombre": nombre, "lema": format!("Vote {nombre}")})),
        )
        .unwrap()
}

#[test]
fn create_then_get_and_list() {
    let mut conn = setup();
    let manager = PartyManager::new();

    let created = create_party(&mut conn, "Azul");
    assert_eq!(created.name, "Azul");
    assert_eq!(created.slogan, "Vote Azul");
    create_party(&mut conn, "Rojo");

    let session = SqliteSession::begin(&mut conn).unwrap();
    assert_eq!(manager.get(&session, created.id).unwrap(), created);
    let names: Vec<String> = manager
        .list(&session)
        .unwrap()
        .into_iter()
        .map(|party| party.name)
        .collect();
    assert_eq!(names, vec!["Azul", "Rojo"]);
    assert_eq!(manager.count(&session).unwrap(), 2);
}

#[test]
fn representation_uses_wire_names() {
    let mut conn = setup();
    let party = create_party(&mut conn, "Azul");

    assert_eq!(
        serde_json::to_value(&party).unwrap(),
        json!({"id": party.id, "nombre": "Azul", "lema": "Vote Azul"})
    );
}

#[test]
fn duplicate_name_is_rejected_on_create() {
    let mut conn = setup();
    create_party(&mut conn, "Azul");

    let err = PartyManager::new()
        .create(
            SqliteSession::begin(&mut conn).unwrap(),
            &payload(json!({"nombre": "Azul", "lema": "Otra vez"})),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::AlreadyExists {
            entity: EntityKind::Party,
            field: "nombre",
            ..
        }
    ));
}

#[test]
fn modify_checks_name_ownership() {
    let mut conn = setup();
    let manager = PartyManager::new();
    let azul = create_party(&mut conn, "Azul");
    create_party(&mut conn, "Rojo");

    let err = manager
        .modify(
            SqliteSession::begin(&mut conn).unwrap(),
            &payload(json!({"id": azul.id, "nombre": "Rojo"})),
        )
        .unwrap_err();
    assert!(matches!(err, ManagerError::DuplicateConstraint { .. }));

    let same = manager
        .modify(
            SqliteSession::begin(&mut conn).unwrap(),
            &payload(json!({"id": azul.id, "nombre": "Azul"})),
        )
        .unwrap();
    assert_eq!(same, azul);

    let renamed = manager
        .modify(
            SqliteSession::begin(&mut conn).unwrap(),
            &payload(json!({"id": azul.id, "lema": "Cielo"})),
        )
        .unwrap();
    assert_eq!(renamed.slogan, "Cielo");
    assert_eq!(renamed.name, "Azul");
}

#[test]
fn party_with_candidates_cannot_be_deleted() {
    let mut conn = setup();
    let manager = PartyManager::new();
    let party = create_party(&mut conn, "Azul");
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

    let err = manager
        .delete(SqliteSession::begin(&mut conn).unwrap(), party.id)
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::RelatedDataExists {
            entity: EntityKind::Party,
            dependent: EntityKind::Candidate,
            ..
        }
    ));

    CandidateManager::new()
        .delete(SqliteSession::begin(&mut conn).unwrap(), candidate.id)
        .unwrap();
    manager
        .delete(SqliteSession::begin(&mut conn).unwrap(), party.id)
        .unwrap();

    let err = manager
        .get(&SqliteSession::begin(&mut conn).unwrap(), party.id)
        .unwrap_err();
    assert_eq!(err.code(), "not_found");
}
