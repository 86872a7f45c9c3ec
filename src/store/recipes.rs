//! Recipe repository. Items are stored in authoring order; their ingredients
//! are upserted by (name, unit) so recipes can share them.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::core::catalog::{Recipe, RecipeItem};
use crate::core::parser::normalize_string;
use crate::core::quantity::Unit;
use crate::error::{Error, Result};
use crate::store::ingredients;

/// Insert a recipe and its items. Each item's ingredient is fetched or
/// created by (name, unit). Returns the stored recipe with ids filled in.
pub fn insert(conn: &Connection, recipe: &Recipe) -> Result<Recipe> {
    let name = normalize_string(&recipe.name);
    conn.execute(
        "INSERT INTO recipe (name, serves, instructions) VALUES (?1, ?2, ?3)",
        params![name, recipe.serves, recipe.instructions],
    )?;
    let recipe_id = conn.last_insert_rowid();

    let mut stored = Recipe {
        id: Some(recipe_id),
        name,
        serves: recipe.serves,
        items: Vec::with_capacity(recipe.items.len()),
        instructions: recipe.instructions.clone(),
    };
    for item in &recipe.items {
        let (ingredient, created) =
            ingredients::get_or_create(conn, &item.ingredient.name, item.ingredient.unit)?;
        if created {
            debug!("new ingredient created: {}", ingredient.name);
        } else {
            debug!("ingredient found in catalog: {}", ingredient.name);
        }
        conn.execute(
            "INSERT INTO recipe_item (recipe_id, ingredient_id, quantity) VALUES (?1, ?2, ?3)",
            params![recipe_id, ingredient.id, item.quantity],
        )?;
        stored.items.push(RecipeItem {
            ingredient,
            quantity: item.quantity,
        });
    }
    Ok(stored)
}

pub fn exists(conn: &Connection, name: &str) -> Result<bool> {
    Ok(find_by_name(conn, name)?.is_some())
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Recipe>> {
    let row = conn
        .prepare("SELECT id, name, serves, instructions FROM recipe WHERE id = ?1")?
        .query_row(params![id], row_tuple)
        .optional()?;
    row.map(|r| hydrate(conn, r)).transpose()
}

pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Recipe>> {
    let row = conn
        .prepare("SELECT id, name, serves, instructions FROM recipe WHERE name = ?1")?
        .query_row(params![normalize_string(name)], row_tuple)
        .optional()?;
    row.map(|r| hydrate(conn, r)).transpose()
}

pub fn get_by_id(conn: &Connection, id: i64) -> Result<Recipe> {
    find_by_id(conn, id)?.ok_or_else(|| Error::not_found("recipe", id.to_string()))
}

pub fn get_by_name(conn: &Connection, name: &str) -> Result<Recipe> {
    find_by_name(conn, name)?.ok_or_else(|| Error::not_found("recipe", name))
}

pub fn list(conn: &Connection) -> Result<Vec<Recipe>> {
    let mut stmt = conn.prepare("SELECT id, name, serves, instructions FROM recipe ORDER BY id")?;
    let rows = stmt
        .query_map([], row_tuple)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(|r| hydrate(conn, r)).collect()
}

pub fn count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM recipe", [], |r| r.get(0))?)
}

type Row = (i64, String, u32, Option<String>);

fn row_tuple(r: &rusqlite::Row<'_>) -> rusqlite::Result<Row> {
    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
}

fn hydrate(conn: &Connection, (id, name, serves, instructions): Row) -> Result<Recipe> {
    Ok(Recipe {
        id: Some(id),
        name,
        serves,
        items: load_items(conn, id)?,
        instructions,
    })
}

fn load_items(conn: &Connection, recipe_id: i64) -> Result<Vec<RecipeItem>> {
    let mut stmt = conn.prepare(
        "SELECT i.id, i.name, i.unit, i.price, ri.quantity
         FROM recipe_item ri
         JOIN ingredient i ON i.id = ri.ingredient_id
         WHERE ri.recipe_id = ?1 ORDER BY ri.id",
    )?;
    let rows = stmt
        .query_map(params![recipe_id], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, Unit>(2)?,
                r.get::<_, Option<f64>>(3)?,
                r.get::<_, f64>(4)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(ingredient_id, name, unit, price, quantity)| {
            Ok(RecipeItem {
                ingredient: crate::core::catalog::Ingredient {
                    id: Some(ingredient_id),
                    name,
                    unit,
                    price,
                    tags: ingredients::tag_names(conn, ingredient_id)?,
                },
                quantity,
            })
        })
        .collect()
}
