//! Tag repository.

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::catalog::Tag;
use crate::error::{Error, Result};

pub fn create(conn: &Connection, name: &str) -> Result<Tag> {
    conn.execute("INSERT INTO tag (name) VALUES (?1)", params![name])?;
    Ok(Tag {
        id: Some(conn.last_insert_rowid()),
        name: name.to_string(),
    })
}

pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Tag>> {
    let tag = conn
        .prepare("SELECT id, name FROM tag WHERE name = ?1")?
        .query_row(params![name], |r| {
            Ok(Tag {
                id: Some(r.get(0)?),
                name: r.get(1)?,
            })
        })
        .optional()?;
    Ok(tag)
}

pub fn get_by_name(conn: &Connection, name: &str) -> Result<Tag> {
    find_by_name(conn, name)?.ok_or_else(|| Error::not_found("tag", name))
}

pub fn get_or_create(conn: &Connection, name: &str) -> Result<(Tag, bool)> {
    if let Some(tag) = find_by_name(conn, name)? {
        return Ok((tag, false));
    }
    Ok((create(conn, name)?, true))
}

pub fn list(conn: &Connection) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare("SELECT id, name FROM tag ORDER BY id")?;
    let rows = stmt.query_map([], |r| {
        Ok(Tag {
            id: Some(r.get(0)?),
            name: r.get(1)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn delete(conn: &Connection, name: &str) -> Result<()> {
    let removed = conn.execute("DELETE FROM tag WHERE name = ?1", params![name])?;
    if removed == 0 {
        return Err(Error::not_found("tag", name));
    }
    Ok(())
}

pub fn count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM tag", [], |r| r.get(0))?)
}
