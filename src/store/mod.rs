//! SQLite-backed catalog.
//!
//! A narrow repository layer over rusqlite: explicit structs from
//! [`crate::core::catalog`] go in and out. The connection is constructed by
//! the process entry point and passed down — there is no global handle.

pub mod ingredients;
pub mod loader;
pub mod projects;
pub mod recipes;
pub mod schema;
pub mod tags;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{Connection, ToSql};
use tracing::debug;

use crate::config::Settings;
use crate::core::quantity::Unit;
use crate::error::Result;

/// Open the catalog database per settings, with foreign keys enforced.
pub fn open(settings: &Settings) -> Result<Connection> {
    let conn = if settings.in_memory {
        debug!("using in-memory database");
        Connection::open_in_memory()?
    } else {
        debug!("using database file: {}", settings.database_file);
        Connection::open(&settings.database_file)?
    };
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

/// Units are stored as their canonical names and validated on the way out.
impl ToSql for Unit {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for Unit {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
pub(crate) fn test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    schema::create_tables(&conn).unwrap();
    conn
}
