//! Core domain logic for election tabulation.
//! This crate is the single source of truth for registry and result invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{CoreConfig, LoggingConfig};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::candidate::Candidate;
pub use model::party::Party;
pub use model::polling_table::PollingTable;
pub use model::result::CandidateResult;
pub use model::{Entity, EntityKind, FieldValue, Record, RecordId};
pub use service::{
    CandidateManager, ManagerError, ManagerResult, PartyManager, Payload, ResultManager,
    TableManager,
};
pub use store::{SqliteSession, StoreError, StoreSession};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
