//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `tabulacion_core` wiring.
//! - Report the configured store and its per-entity record counts.

use log::error;
use std::process::ExitCode;
use tabulacion_core::{
    init_logging, open_db, open_db_in_memory, CandidateManager, CoreConfig, PartyManager,
    ResultManager, SqliteSession, TableManager,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_probe module=cli status=error error={message}");
            eprintln!("tabulacion_cli error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(logging) = &config.logging {
        init_logging(logging).map_err(|err| err.to_string())?;
    }

    println!("tabulacion_core ping={}", tabulacion_core::ping());
    println!("tabulacion_core version={}", tabulacion_core::core_version());

    let mut conn = match &config.db_path {
        Some(path) => {
            println!("store=file path={}", path.display());
            open_db(path)
        }
        None => {
            println!("store=memory");
            open_db_in_memory()
        }
    }
    .map_err(|err| err.to_string())?;

    let session = SqliteSession::begin(&mut conn).map_err(|err| err.to_string())?;
    let parties = PartyManager::new()
        .list(&session)
        .map_err(|err| err.to_string())?;
    let candidates = CandidateManager::new()
        .list(&session)
        .map_err(|err| err.to_string())?;
    let tables = TableManager::new()
        .list(&session)
        .map_err(|err| err.to_string())?;
    let results = ResultManager::new()
        .list(&session)
        .map_err(|err| err.to_string())?;

    println!("parties={}", parties.len());
    println!("candidates={}", candidates.len());
    println!("tables={}", tables.len());
    println!("results={}", results.len());
    Ok(())
}
