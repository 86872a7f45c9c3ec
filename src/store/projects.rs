//! Project repository: named, ordered collections of (recipe, servings).

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::catalog::{Project, ProjectRecipe, Recipe};
use crate::error::{Error, Result};
use crate::store::recipes;

pub fn create(conn: &Connection, name: &str) -> Result<Project> {
    conn.execute("INSERT INTO project (name) VALUES (?1)", params![name])?;
    Ok(Project {
        id: Some(conn.last_insert_rowid()),
        name: name.to_string(),
        recipes: Vec::new(),
    })
}

pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Project>> {
    let row = conn
        .prepare("SELECT id, name FROM project WHERE name = ?1")?
        .query_row(params![name], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))
        .optional()?;
    row.map(|(id, name)| hydrate(conn, id, name)).transpose()
}

pub fn get_by_name(conn: &Connection, name: &str) -> Result<Project> {
    find_by_name(conn, name)?.ok_or_else(|| Error::not_found("project", name))
}

/// The default project: the only one in the catalog. Zero or several is a
/// query error, not a parse error.
pub fn default_project(conn: &Connection) -> Result<Project> {
    let mut all = list(conn)?;
    match all.len() {
        0 => Err(Error::Query("no projects in the catalog".to_string())),
        1 => Ok(all.remove(0)),
        n => Err(Error::Query(format!(
            "{n} projects in the catalog, could not determine default"
        ))),
    }
}

pub fn list(conn: &Connection) -> Result<Vec<Project>> {
    let mut stmt = conn.prepare("SELECT id, name FROM project ORDER BY id")?;
    let rows = stmt
        .query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter()
        .map(|(id, name)| hydrate(conn, id, name))
        .collect()
}

pub fn delete(conn: &Connection, name: &str) -> Result<()> {
    let removed = conn.execute("DELETE FROM project WHERE name = ?1", params![name])?;
    if removed == 0 {
        return Err(Error::not_found("project", name));
    }
    Ok(())
}

/// Append a stored recipe to a stored project at a requested serving count.
pub fn add_recipe(
    conn: &Connection,
    project: &Project,
    recipe: &Recipe,
    servings: u32,
) -> Result<()> {
    let project_id = project
        .id
        .ok_or_else(|| Error::Query(format!("project {} is not stored", project.name)))?;
    let recipe_id = recipe
        .id
        .ok_or_else(|| Error::Query(format!("recipe {} is not stored", recipe.name)))?;
    conn.execute(
        "INSERT INTO project_recipe (project_id, recipe_id, servings) VALUES (?1, ?2, ?3)",
        params![project_id, recipe_id, servings],
    )?;
    Ok(())
}

pub fn count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM project", [], |r| r.get(0))?)
}

fn hydrate(conn: &Connection, id: i64, name: String) -> Result<Project> {
    let mut stmt = conn.prepare(
        "SELECT recipe_id, servings FROM project_recipe WHERE project_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![id], |r| {
            Ok((r.get::<_, i64>(0)?, r.get::<_, u32>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut project = Project {
        id: Some(id),
        name,
        recipes: Vec::with_capacity(rows.len()),
    };
    for (recipe_id, servings) in rows {
        let recipe = recipes::get_by_id(conn, recipe_id)?;
        project.recipes.push(ProjectRecipe { recipe, servings });
    }
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::Ingredient;
    use crate::core::quantity::Unit;
    use crate::store::test_connection;

    fn seed_recipe(conn: &Connection, name: &str) -> Recipe {
        let mut recipe = Recipe::new(name, 1);
        recipe.push_item(Ingredient::new("pan", Unit::Unit), 1.0);
        recipes::insert(conn, &recipe).unwrap()
    }

    #[test]
    fn test_create_and_add_recipes_in_order() {
        let conn = test_connection();
        let feast = create(&conn, "feast").unwrap();
        let pct = seed_recipe(&conn, "pan con tomate");
        let ccv = seed_recipe(&conn, "caracoles con vinagre");
        add_recipe(&conn, &feast, &pct, 5).unwrap();
        add_recipe(&conn, &feast, &ccv, 5).unwrap();

        let found = get_by_name(&conn, "feast").unwrap();
        let entries: Vec<(String, u32)> = found
            .recipes
            .iter()
            .map(|pr| (pr.recipe.name.clone(), pr.servings))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("pan con tomate".to_string(), 5),
                ("caracoles con vinagre".to_string(), 5),
            ]
        );
    }

    #[test]
    fn test_name_unique() {
        let conn = test_connection();
        create(&conn, "feast").unwrap();
        assert!(create(&conn, "feast").is_err());
    }

    #[test]
    fn test_get_by_name_missing() {
        let conn = test_connection();
        let err = get_by_name(&conn, "ghost party").unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "project", .. }));
    }

    #[test]
    fn test_default_project() {
        let conn = test_connection();
        assert!(matches!(default_project(&conn), Err(Error::Query(_))));

        create(&conn, "feast").unwrap();
        assert_eq!(default_project(&conn).unwrap().name, "feast");

        create(&conn, "brunch").unwrap();
        assert!(matches!(default_project(&conn), Err(Error::Query(_))));
    }

    #[test]
    fn test_delete() {
        let conn = test_connection();
        let feast = create(&conn, "feast").unwrap();
        let pct = seed_recipe(&conn, "pan con tomate");
        add_recipe(&conn, &feast, &pct, 2).unwrap();

        delete(&conn, "feast").unwrap();
        assert!(find_by_name(&conn, "feast").unwrap().is_none());
        // entries go with the project, the recipe stays
        assert_eq!(recipes::count(&conn).unwrap(), 1);
        assert!(matches!(
            delete(&conn, "feast"),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_count() {
        let conn = test_connection();
        create(&conn, "feast").unwrap();
        assert_eq!(count(&conn).unwrap(), 1);
    }
}
