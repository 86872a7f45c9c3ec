//! Catalog schema: creation and destructive reset.

use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

/// Create all tables if they don't exist.
pub fn create_tables(conn: &Connection) -> Result<()> {
    debug!("creating tables");
    conn.execute_batch(
        "
        -- Ingredients: identity is the (name, unit) pair
        CREATE TABLE IF NOT EXISTS ingredient (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            unit TEXT NOT NULL,
            price REAL,
            UNIQUE(name, unit)
        );
        CREATE INDEX IF NOT EXISTS idx_ingredient_name ON ingredient(name);

        -- Tags classify ingredients
        CREATE TABLE IF NOT EXISTS tag (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS ingredient_tag (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ingredient_id INTEGER NOT NULL REFERENCES ingredient(id) ON DELETE CASCADE,
            tag_id INTEGER NOT NULL REFERENCES tag(id) ON DELETE CASCADE,
            UNIQUE(ingredient_id, tag_id)
        );

        -- Recipes and their ordered items
        CREATE TABLE IF NOT EXISTS recipe (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            serves INTEGER NOT NULL,
            instructions TEXT
        );

        CREATE TABLE IF NOT EXISTS recipe_item (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipe(id) ON DELETE CASCADE,
            ingredient_id INTEGER NOT NULL REFERENCES ingredient(id),
            quantity REAL NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_recipe_item_recipe ON recipe_item(recipe_id);

        -- Projects: ordered (recipe, servings) entries
        CREATE TABLE IF NOT EXISTS project (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS project_recipe (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL REFERENCES project(id) ON DELETE CASCADE,
            recipe_id INTEGER NOT NULL REFERENCES recipe(id),
            servings INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_project_recipe_project ON project_recipe(project_id);
        ",
    )?;
    Ok(())
}

/// Drop every table, then recreate the schema. Destructive.
pub fn reset_tables(conn: &Connection) -> Result<()> {
    debug!("resetting tables");
    conn.execute_batch(
        "
        DROP TABLE IF EXISTS project_recipe;
        DROP TABLE IF EXISTS project;
        DROP TABLE IF EXISTS recipe_item;
        DROP TABLE IF EXISTS recipe;
        DROP TABLE IF EXISTS ingredient_tag;
        DROP TABLE IF EXISTS tag;
        DROP TABLE IF EXISTS ingredient;
        ",
    )?;
    create_tables(conn)
}
