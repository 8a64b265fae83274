use anyhow::Result;
use lotto_six::SharedConnection;
use lotto_six::database::open_database;
use parking_lot::Mutex;
use std::sync::Arc;

/// Opens the database, creating the tables when missing.
pub fn conn(database_url: &str) -> Result<SharedConnection> {
    let conn = open_database(database_url)?;
    Ok(Arc::new(Mutex::new(conn)))
}
