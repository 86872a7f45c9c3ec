//! CLI subcommands — status, db, ingredient, tag, recipe, project.

use clap::Subcommand;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

use crate::core::catalog::Project;
use crate::core::parser::split_recipe_file;
use crate::core::shopping::{priced_shopping_list, shopping_list};
use crate::error::{Error, Result};
use crate::report;
use crate::store::{ingredients, loader, projects, recipes, schema, tags};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show entity counts
    Status,

    /// Database maintenance
    #[command(subcommand)]
    Db(DbCommands),

    /// Manage ingredients
    #[command(subcommand)]
    Ingredient(IngredientCommands),

    /// Manage tags
    #[command(subcommand)]
    Tag(TagCommands),

    /// Manage recipes
    #[command(subcommand)]
    Recipe(RecipeCommands),

    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommands),
}

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Drop and recreate every table. Destructive.
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum IngredientCommands {
    /// List ingredients
    List,

    /// Show one ingredient
    Show {
        id: i64,
    },

    /// Write all ingredients to a YAML file
    Export {
        file: PathBuf,
    },

    /// Read ingredients from a YAML file; existing (name, unit) rows are kept
    Import {
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum TagCommands {
    /// List tags
    List,

    /// Create a tag
    Create {
        name: String,
    },

    /// Delete a tag
    Delete {
        name: String,
    },

    /// Attach tags to ingredients from a YAML file
    UpdateFromFile {
        file: PathBuf,

        /// Create tags named in the file instead of requiring them to exist
        #[arg(long)]
        create_tags: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum RecipeCommands {
    /// Load a recipe file, or every file in a directory (all-or-nothing)
    Load {
        path: PathBuf,
    },

    /// List recipes
    List,

    /// Print a recipe, optionally rescaled
    Show {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        id: Option<i64>,

        /// Rescale to this serving count before printing
        #[arg(long)]
        servings: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create an empty project
    Create {
        name: String,
    },

    /// List projects
    List,

    /// Show a project's recipes
    Show {
        #[arg(long)]
        name: Option<String>,
    },

    /// Delete a project
    Delete {
        name: String,
    },

    /// Load a project file; every named recipe must already exist
    Load {
        file: PathBuf,
    },

    /// Add a recipe to a project, by name, id, or file
    AddRecipe {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        id: Option<i64>,

        #[arg(long)]
        file: Option<PathBuf>,

        /// Requested servings; defaults to the recipe's native serves
        #[arg(long)]
        servings: Option<u32>,

        #[arg(long)]
        project: Option<String>,
    },

    /// Print the aggregated shopping list
    ShoppingList {
        /// CSV instead of a table
        #[arg(long)]
        csv: bool,

        /// Include derived prices
        #[arg(long)]
        priced: bool,

        #[arg(long)]
        name: Option<String>,
    },

    /// Export a project to a directory (summary, CSV list, scaled recipes)
    Export {
        #[arg(long)]
        name: Option<String>,

        #[arg(long, default_value = "projects")]
        target: PathBuf,
    },
}

/// Dispatch a CLI command against an open catalog.
pub fn dispatch(cmd: Commands, conn: &mut Connection) -> Result<()> {
    match cmd {
        Commands::Status => cmd_status(conn),
        Commands::Db(DbCommands::Reset) => schema::reset_tables(conn),
        Commands::Ingredient(cmd) => dispatch_ingredient(cmd, conn),
        Commands::Tag(cmd) => dispatch_tag(cmd, conn),
        Commands::Recipe(cmd) => dispatch_recipe(cmd, conn),
        Commands::Project(cmd) => dispatch_project(cmd, conn),
    }
}

fn cmd_status(conn: &Connection) -> Result<()> {
    println!("Project : {}", projects::count(conn)?);
    println!("Recipe : {}", recipes::count(conn)?);
    println!("Ingredient : {}", ingredients::count(conn)?);
    println!("Tag : {}", tags::count(conn)?);
    Ok(())
}

// ------------------------- ingredient -------------------------

fn dispatch_ingredient(cmd: IngredientCommands, conn: &Connection) -> Result<()> {
    match cmd {
        IngredientCommands::List => {
            for ingredient in ingredients::list(conn)? {
                println!(
                    "{:>4}  {} ({}){}",
                    ingredient.id.unwrap_or_default(),
                    ingredient.name,
                    ingredient.unit,
                    if ingredient.tags.is_empty() {
                        String::new()
                    } else {
                        format!("  [{}]", ingredient.tags.join(", "))
                    }
                );
            }
            Ok(())
        }
        IngredientCommands::Show { id } => {
            let ingredient = ingredients::get_by_id(conn, id)?;
            print!("{}", serde_yaml_ng::to_string(&ingredient)?);
            Ok(())
        }
        IngredientCommands::Export { file } => {
            let count = loader::export_ingredients(conn, &file)?;
            println!("{} ingredients written to {}", count, file.display());
            Ok(())
        }
        IngredientCommands::Import { file } => {
            let count = loader::import_ingredients(conn, &file)?;
            println!("{} ingredients imported from {}", count, file.display());
            Ok(())
        }
    }
}

// ------------------------- tag -------------------------

fn dispatch_tag(cmd: TagCommands, conn: &Connection) -> Result<()> {
    match cmd {
        TagCommands::List => {
            for tag in tags::list(conn)? {
                println!("{:>4}  {}", tag.id.unwrap_or_default(), tag.name);
            }
            Ok(())
        }
        TagCommands::Create { name } => {
            let tag = tags::create(conn, &name)?;
            println!("tag created: {}", tag.name);
            Ok(())
        }
        TagCommands::Delete { name } => {
            tags::delete(conn, &name)?;
            println!("tag removed: {name}");
            Ok(())
        }
        TagCommands::UpdateFromFile { file, create_tags } => {
            let missing = loader::update_tags_from_file(conn, &file, create_tags)?;
            for name in missing {
                println!("could not find ingredient: {name}");
            }
            Ok(())
        }
    }
}

// ------------------------- recipe -------------------------

fn dispatch_recipe(cmd: RecipeCommands, conn: &mut Connection) -> Result<()> {
    match cmd {
        RecipeCommands::Load { path } => cmd_recipe_load(conn, &path),
        RecipeCommands::List => {
            for recipe in recipes::list(conn)? {
                println!(
                    "{:>4}  {} (serves {})",
                    recipe.id.unwrap_or_default(),
                    recipe.name,
                    recipe.serves
                );
            }
            Ok(())
        }
        RecipeCommands::Show { name, id, servings } => {
            let recipe = match (id, name) {
                (Some(id), _) => recipes::get_by_id(conn, id)?,
                (None, Some(name)) => recipes::get_by_name(conn, &name)?,
                (None, None) => {
                    return Err(Error::Query("pass --name or --id to pick a recipe".to_string()))
                }
            };
            let recipe = match servings {
                Some(n) => recipe.rescale(n),
                None => recipe,
            };
            println!("# {}", recipe.name);
            println!("{}", recipe.as_text(None));
            Ok(())
        }
    }
}

fn cmd_recipe_load(conn: &mut Connection, path: &Path) -> Result<()> {
    if path.is_dir() {
        println!("loading recipes from directory: {}", path.display());
        let loaded = loader::load_recipe_dir(conn, path)?;
        for recipe in &loaded {
            println!("recipe created: {}", recipe.name);
        }
    } else {
        match loader::load_recipe_file(conn, path)? {
            Some(recipe) => println!("recipe created: {}", recipe.name),
            None => println!("recipe already exists, nothing loaded"),
        }
    }
    Ok(())
}

// ------------------------- project -------------------------

fn dispatch_project(cmd: ProjectCommands, conn: &mut Connection) -> Result<()> {
    match cmd {
        ProjectCommands::Create { name } => {
            projects::create(conn, &name)?;
            println!("project created: {name}");
            Ok(())
        }
        ProjectCommands::List => {
            for project in projects::list(conn)? {
                println!(
                    "{:>4}  {} ({} recipes)",
                    project.id.unwrap_or_default(),
                    project.name,
                    project.recipes.len()
                );
            }
            Ok(())
        }
        ProjectCommands::Show { name } => {
            let project = select_project(conn, name.as_deref())?;
            println!("{}", report::project_summary(&project));
            Ok(())
        }
        ProjectCommands::Delete { name } => {
            projects::delete(conn, &name)?;
            println!("project deleted: {name}");
            Ok(())
        }
        ProjectCommands::Load { file } => {
            let project = loader::load_project_file(conn, &file)?;
            println!("{}", report::project_summary(&project));
            Ok(())
        }
        ProjectCommands::AddRecipe {
            name,
            id,
            file,
            servings,
            project,
        } => cmd_project_add_recipe(conn, name, id, file, servings, project),
        ProjectCommands::ShoppingList { csv, priced, name } => {
            let project = select_project(conn, name.as_deref())?;
            if csv {
                print!("{}", report::shopping_list_csv(&shopping_list(&project)));
            } else if priced {
                println!("{}", report::priced_shopping_list_table(&priced_shopping_list(&project)));
            } else {
                println!("{}", report::project_summary(&project));
                println!("{}", report::shopping_list_table(&shopping_list(&project)));
            }
            Ok(())
        }
        ProjectCommands::Export { name, target } => {
            let project = select_project(conn, name.as_deref())?;
            let written = report::export_project(&project, &target)?;
            for path in written {
                println!("wrote {}", path.display());
            }
            Ok(())
        }
    }
}

fn cmd_project_add_recipe(
    conn: &mut Connection,
    name: Option<String>,
    id: Option<i64>,
    file: Option<PathBuf>,
    servings: Option<u32>,
    project: Option<String>,
) -> Result<()> {
    let project = select_project(conn, project.as_deref())?;

    let recipe = if let Some(id) = id {
        recipes::get_by_id(conn, id)?
    } else if let Some(name) = name {
        recipes::get_by_name(conn, &name)?
    } else if let Some(file) = file {
        match loader::load_recipe_file(conn, &file)? {
            Some(recipe) => recipe,
            // already in the catalog — fetch it under its file-derived name
            None => recipes::get_by_name(conn, &split_recipe_file(&file)?.0)?,
        }
    } else {
        return Err(Error::Query(
            "pass --name, --id or --file to pick a recipe".to_string(),
        ));
    };

    let servings = match servings {
        Some(n) => n,
        None => {
            println!("no rescaling");
            recipe.serves
        }
    };
    projects::add_recipe(conn, &project, &recipe, servings)?;
    println!(
        "recipe added to project {:?}: {:?} for {servings}",
        project.name, recipe.name
    );
    Ok(())
}

fn select_project(conn: &Connection, name: Option<&str>) -> Result<Project> {
    match name {
        Some(name) => projects::get_by_name(conn, name),
        None => {
            println!("using default project");
            projects::default_project(conn)
        }
    }
}
