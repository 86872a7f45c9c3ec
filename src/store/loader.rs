//! File → catalog ingestion.
//!
//! Recipe and project files go through the core parsers, then into the
//! repositories inside a transaction. Directory loads are all-or-nothing:
//! the first parse failure rolls back every insertion from the batch.

use rusqlite::Connection;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::catalog::{Ingredient, Project, Recipe};
use crate::core::parser::{parse_project_file, parse_recipe_file, ParsedRecipe};
use crate::error::{Error, Result};
use crate::store::{ingredients, is_constraint_violation, projects, recipes, tags};

/// Load one recipe file. Returns `None` when a recipe with that name already
/// exists (the file is skipped, not an error).
pub fn load_recipe_file(conn: &mut Connection, path: &Path) -> Result<Option<Recipe>> {
    debug!("loading recipe file: {}", path.display());
    let parsed = parse_recipe_file(path)?;

    let tx = conn.transaction()?;
    let stored = insert_parsed(&tx, &parsed)?;
    tx.commit()?;

    if let Some(recipe) = &stored {
        info!("recipe created: {}", recipe.name);
    }
    Ok(stored)
}

/// Load every file in a directory inside a single transaction; the first
/// failure aborts the whole batch.
pub fn load_recipe_dir(conn: &mut Connection, dir: &Path) -> Result<Vec<Recipe>> {
    info!("loading recipe directory: {}", dir.display());
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    let tx = conn.transaction()?;
    let mut loaded = Vec::new();
    for path in &paths {
        let parsed = parse_recipe_file(path)?;
        if let Some(recipe) = insert_parsed(&tx, &parsed)? {
            loaded.push(recipe);
        }
    }
    tx.commit()?;

    info!("{} recipes loaded from directory", loaded.len());
    Ok(loaded)
}

fn insert_parsed(conn: &Connection, parsed: &ParsedRecipe) -> Result<Option<Recipe>> {
    if recipes::exists(conn, &parsed.name)? {
        info!("recipe already exists: {}", parsed.name);
        return Ok(None);
    }
    let mut recipe = Recipe::new(&parsed.name, parsed.serves);
    recipe.instructions = parsed.instructions.clone();
    for (quantity, name) in &parsed.items {
        recipe.push_item(Ingredient::new(name, quantity.unit), quantity.number);
    }
    recipes::insert(conn, &recipe).map(Some)
}

/// Load a project file: every named recipe must already be in the catalog.
pub fn load_project_file(conn: &mut Connection, path: &Path) -> Result<Project> {
    debug!("loading project file: {}", path.display());
    let (name, file) = parse_project_file(path)?;

    let tx = conn.transaction()?;
    let project = projects::create(&tx, &name)?;
    for recipe_name in &file.recipes {
        let recipe = recipes::get_by_name(&tx, recipe_name)?;
        projects::add_recipe(&tx, &project, &recipe, file.servings)?;
    }
    tx.commit()?;

    info!("project created: {name}");
    projects::get_by_name(conn, &name)
}

/// Import a multi-document YAML ingredient file. Rows colliding with an
/// existing (name, unit) are skipped with a warning.
pub fn import_ingredients(conn: &Connection, path: &Path) -> Result<usize> {
    info!("importing ingredients from {}", path.display());
    let content = std::fs::read_to_string(path)?;

    let mut imported = 0;
    for document in serde_yaml_ng::Deserializer::from_str(&content) {
        let ingredient = Ingredient::deserialize(document)?;
        match ingredients::insert(conn, &ingredient) {
            Ok(stored) => {
                for tag_name in &ingredient.tags {
                    let (tag, _) = tags::get_or_create(conn, tag_name)?;
                    ingredients::add_tag(conn, &stored, &tag)?;
                }
                debug!("ingredient inserted: {}", stored.name);
                imported += 1;
            }
            Err(Error::Database(e)) if is_constraint_violation(&e) => {
                warn!("ingredient insertion failed: {} ({})", ingredient.name, ingredient.unit);
            }
            Err(e) => return Err(e),
        }
    }
    info!("{imported} ingredients imported");
    Ok(imported)
}

/// Attach tags to existing ingredients from a multi-document YAML file of
/// `{name, tags}` entries. With `create_tags`, unknown tags are created on
/// the fly; otherwise naming a missing tag is an error. Returns the names of
/// ingredients that could not be found.
pub fn update_tags_from_file(
    conn: &Connection,
    path: &Path,
    create_tags: bool,
) -> Result<Vec<String>> {
    #[derive(Deserialize)]
    struct TagUpdate {
        name: String,
        #[serde(default)]
        tags: Vec<String>,
    }

    let content = std::fs::read_to_string(path)?;
    let mut missing = Vec::new();
    for document in serde_yaml_ng::Deserializer::from_str(&content) {
        let update = TagUpdate::deserialize(document)?;
        let Some(ingredient) = ingredients::find_by_name(conn, &update.name)? else {
            warn!("could not find ingredient: {}", update.name);
            missing.push(update.name);
            continue;
        };
        for tag_name in &update.tags {
            let tag = if create_tags {
                let (tag, created) = tags::get_or_create(conn, tag_name)?;
                if created {
                    info!("tag created: {}", tag.name);
                }
                tag
            } else {
                tags::get_by_name(conn, tag_name)?
            };
            ingredients::add_tag(conn, &ingredient, &tag)?;
        }
    }
    Ok(missing)
}

/// Export every ingredient as a sequence of YAML documents.
pub fn export_ingredients(conn: &Connection, path: &Path) -> Result<usize> {
    info!("writing ingredients to {}", path.display());
    let all = ingredients::list(conn)?;

    let mut out = String::new();
    for ingredient in &all {
        out.push_str("---\n");
        out.push_str(&serde_yaml_ng::to_string(ingredient)?);
    }
    std::fs::write(path, out)?;
    Ok(all.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::quantity::Unit;
    use crate::store::test_connection;

    const PAN_CON_TOMATE: &str = "serves: 2\n---\n- 1 pan\n- 100g tomate rallado\n---\ngrate the tomato\nput it on the bread\n";
    const BOCATA_DE_NADA: &str = "serves: 1\n---\n- 1 pancito\n- 1l aire\n";

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_recipe_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "pan con tomate", PAN_CON_TOMATE);
        let mut conn = test_connection();

        let recipe = load_recipe_file(&mut conn, &path).unwrap().unwrap();
        assert_eq!(recipe.name, "pan con tomate");
        assert_eq!(recipe.serves, 2);
        assert_eq!(recipe.items.len(), 2);
        assert_eq!(recipe.items[1].ingredient.name, "tomate rallado");
        assert_eq!(recipe.items[1].ingredient.unit, Unit::Kilogram);
        assert_eq!(recipe.items[1].quantity, 0.1);
    }

    #[test]
    fn test_load_recipe_file_skips_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "pan con tomate", PAN_CON_TOMATE);
        let mut conn = test_connection();

        assert!(load_recipe_file(&mut conn, &path).unwrap().is_some());
        assert!(load_recipe_file(&mut conn, &path).unwrap().is_none());
        assert_eq!(recipes::count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_load_recipe_file_rejects_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "broken", "serves: 2\n---\n- mystery stuff\n");
        let mut conn = test_connection();

        assert!(load_recipe_file(&mut conn, &path).is_err());
        assert_eq!(recipes::count(&conn).unwrap(), 0);
    }

    #[test]
    fn test_load_recipe_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "bocata de nada", BOCATA_DE_NADA);
        write_file(dir.path(), "pan con tomate", PAN_CON_TOMATE);
        let mut conn = test_connection();

        let loaded = load_recipe_dir(&mut conn, dir.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(recipes::count(&conn).unwrap(), 2);
    }

    #[test]
    fn test_load_recipe_dir_aborts_whole_batch() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a good one", PAN_CON_TOMATE);
        write_file(dir.path(), "z broken", "serves: 2\n---\n- mystery stuff\n");
        let mut conn = test_connection();

        assert!(load_recipe_dir(&mut conn, dir.path()).is_err());
        // the good file parsed first (sorted order), but nothing persists
        assert_eq!(recipes::count(&conn).unwrap(), 0);
        assert_eq!(ingredients::count(&conn).unwrap(), 0);
    }

    #[test]
    fn test_load_project_file() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "pan con tomate", PAN_CON_TOMATE);
        let mut conn = test_connection();
        load_recipe_file(&mut conn, &dir.path().join("pan con tomate")).unwrap();

        let path = write_file(
            dir.path(),
            "feast",
            "servings: 5\nrecipes:\n- pan con tomate\n",
        );
        let project = load_project_file(&mut conn, &path).unwrap();
        assert_eq!(project.name, "feast");
        assert_eq!(project.recipes.len(), 1);
        assert_eq!(project.recipes[0].servings, 5);
        assert_eq!(project.recipes[0].recipe.name, "pan con tomate");
    }

    #[test]
    fn test_load_project_file_unknown_recipe() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "feast", "servings: 5\nrecipes:\n- gazpacho\n");
        let mut conn = test_connection();

        let err = load_project_file(&mut conn, &path).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "recipe", .. }));
        // nothing persists, including the project row
        assert_eq!(projects::count(&conn).unwrap(), 0);
    }

    #[test]
    fn test_ingredient_import_export_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let conn = test_connection();
        let tomate = ingredients::insert(
            &conn,
            &Ingredient::new("tomate", Unit::Kilogram).with_price(3.0),
        )
        .unwrap();
        let (fresh, _) = tags::get_or_create(&conn, "fresh").unwrap();
        ingredients::add_tag(&conn, &tomate, &fresh).unwrap();
        ingredients::insert(&conn, &Ingredient::new("pan", Unit::Unit)).unwrap();

        let file = dir.path().join("ingredients.yaml");
        assert_eq!(export_ingredients(&conn, &file).unwrap(), 2);

        let other = test_connection();
        assert_eq!(import_ingredients(&other, &file).unwrap(), 2);
        let tomate = ingredients::find_by_name_unit(&other, "tomate", Unit::Kilogram)
            .unwrap()
            .unwrap();
        assert_eq!(tomate.price, Some(3.0));
        assert_eq!(tomate.tags, vec!["fresh"]);
    }

    #[test]
    fn test_import_skips_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_file(
            dir.path(),
            "ingredients.yaml",
            "---\nname: pan\nunit: unit\n---\nname: pan\nunit: unit\n",
        );
        let conn = test_connection();

        assert_eq!(import_ingredients(&conn, &file).unwrap(), 1);
        assert_eq!(ingredients::count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_update_tags_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let conn = test_connection();
        ingredients::insert(&conn, &Ingredient::new("tomate", Unit::Kilogram)).unwrap();

        let file = write_file(
            dir.path(),
            "tags.yaml",
            "---\nname: tomate\ntags: [fresh]\n---\nname: unicornio\ntags: [uncommon]\n",
        );
        let missing = update_tags_from_file(&conn, &file, true).unwrap();
        assert_eq!(missing, vec!["unicornio"]);

        let tomate = ingredients::find_by_name(&conn, "tomate").unwrap().unwrap();
        assert_eq!(tomate.tags, vec!["fresh"]);
    }

    #[test]
    fn test_update_tags_requires_existing_tag_without_create() {
        let dir = tempfile::tempdir().unwrap();
        let conn = test_connection();
        ingredients::insert(&conn, &Ingredient::new("tomate", Unit::Kilogram)).unwrap();

        let file = write_file(dir.path(), "tags.yaml", "---\nname: tomate\ntags: [fresh]\n");
        let err = update_tags_from_file(&conn, &file, false).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "tag", .. }));
    }

    #[test]
    fn test_import_rejects_unknown_unit() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_file(dir.path(), "bad.yaml", "---\nname: flores\nunit: bund\n");
        let conn = test_connection();

        assert!(import_ingredients(&conn, &file).is_err());
    }
}
