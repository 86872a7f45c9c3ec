//! Ingredient repository. Identity is the (name, unit) pair; the same name
//! may exist under different units as distinct rows.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::core::catalog::{Ingredient, Tag};
use crate::core::parser::normalize_string;
use crate::core::quantity::Unit;
use crate::error::{Error, Result};
use crate::store::is_constraint_violation;

/// Insert a new ingredient. The name is normalized on the way in; a
/// (name, unit) collision is an error.
pub fn insert(conn: &Connection, ingredient: &Ingredient) -> Result<Ingredient> {
    let name = normalize_string(&ingredient.name);
    conn.execute(
        "INSERT INTO ingredient (name, unit, price) VALUES (?1, ?2, ?3)",
        params![name, ingredient.unit, ingredient.price],
    )?;
    Ok(Ingredient {
        id: Some(conn.last_insert_rowid()),
        name,
        unit: ingredient.unit,
        price: ingredient.price,
        tags: Vec::new(),
    })
}

/// Fetch by identity, inserting a priceless ingredient on first sight.
/// Returns the stored ingredient and whether it was created.
pub fn get_or_create(conn: &Connection, name: &str, unit: Unit) -> Result<(Ingredient, bool)> {
    let name = normalize_string(name);
    if let Some(existing) = find_by_name_unit(conn, &name, unit)? {
        return Ok((existing, false));
    }
    let created = insert(conn, &Ingredient::new(&name, unit))?;
    Ok((created, true))
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Ingredient>> {
    let row = conn
        .prepare("SELECT id, name, unit, price FROM ingredient WHERE id = ?1")?
        .query_row(params![id], row_tuple)
        .optional()?;
    row.map(|r| hydrate(conn, r)).transpose()
}

pub fn find_by_name_unit(conn: &Connection, name: &str, unit: Unit) -> Result<Option<Ingredient>> {
    let row = conn
        .prepare("SELECT id, name, unit, price FROM ingredient WHERE name = ?1 AND unit = ?2")?
        .query_row(params![normalize_string(name), unit], row_tuple)
        .optional()?;
    row.map(|r| hydrate(conn, r)).transpose()
}

/// First ingredient with the given name, any unit.
pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Ingredient>> {
    let row = conn
        .prepare("SELECT id, name, unit, price FROM ingredient WHERE name = ?1 ORDER BY id LIMIT 1")?
        .query_row(params![normalize_string(name)], row_tuple)
        .optional()?;
    row.map(|r| hydrate(conn, r)).transpose()
}

pub fn get_by_id(conn: &Connection, id: i64) -> Result<Ingredient> {
    find_by_id(conn, id)?.ok_or_else(|| Error::not_found("ingredient", id.to_string()))
}

pub fn list(conn: &Connection) -> Result<Vec<Ingredient>> {
    let mut stmt = conn.prepare("SELECT id, name, unit, price FROM ingredient ORDER BY id")?;
    let rows = stmt
        .query_map([], row_tuple)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(|r| hydrate(conn, r)).collect()
}

/// Attach a tag. Attaching the same tag twice is a warning, not an error.
pub fn add_tag(conn: &Connection, ingredient: &Ingredient, tag: &Tag) -> Result<()> {
    let ingredient_id = ingredient
        .id
        .ok_or_else(|| Error::Query(format!("ingredient {} is not stored", ingredient.name)))?;
    let tag_id = tag
        .id
        .ok_or_else(|| Error::Query(format!("tag {} is not stored", tag.name)))?;
    match conn.execute(
        "INSERT INTO ingredient_tag (ingredient_id, tag_id) VALUES (?1, ?2)",
        params![ingredient_id, tag_id],
    ) {
        Ok(_) => Ok(()),
        Err(e) if is_constraint_violation(&e) => {
            warn!("tag already existed on {}: {}", ingredient.name, tag.name);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM ingredient", [], |r| r.get(0))?)
}

type Row = (i64, String, Unit, Option<f64>);

fn row_tuple(r: &rusqlite::Row<'_>) -> rusqlite::Result<Row> {
    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
}

fn hydrate(conn: &Connection, (id, name, unit, price): Row) -> Result<Ingredient> {
    Ok(Ingredient {
        id: Some(id),
        name,
        unit,
        price,
        tags: tag_names(conn, id)?,
    })
}

pub(crate) fn tag_names(conn: &Connection, ingredient_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.name FROM tag t
         JOIN ingredient_tag it ON it.tag_id = t.id
         WHERE it.ingredient_id = ?1 ORDER BY it.id",
    )?;
    let rows = stmt.query_map(params![ingredient_id], |r| r.get(0))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
