//! Plain-text rendering of shopping lists, projects, and exports.
//!
//! Sorting by category then name happens here, after aggregation — the
//! shopping list itself stays in first-seen order.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::catalog::Project;
use crate::core::shopping::{priced_shopping_list, shopping_list, PricedEntry, ShoppingListEntry};
use crate::error::Result;

/// Shopping list as an aligned text table, sorted by category then name.
pub fn shopping_list_table(entries: &[ShoppingListEntry]) -> String {
    let mut rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            vec![
                e.ingredient.name.clone(),
                format!("{:.1} {}", e.quantity, e.ingredient.unit),
                e.ingredient.category().to_string(),
            ]
        })
        .collect();
    rows.sort_by(|a, b| (&a[2], &a[0]).cmp(&(&b[2], &b[0])));
    render_table(&["ingredient", "quantity", "category"], &rows)
}

/// Priced shopping list as a table, in aggregation order. A missing price is
/// rendered as "(no price data)" — never as zero.
pub fn priced_shopping_list_table(entries: &[PricedEntry]) -> String {
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            let price = match e.price {
                Some(p) => format!("({p} euros)"),
                None => "(no price data)".to_string(),
            };
            vec![
                e.ingredient.name.clone(),
                format!("{:.1} {}", e.quantity, e.ingredient.unit),
                price,
            ]
        })
        .collect();
    render_table(&["ingredient", "quantity", "price"], &rows)
}

/// Shopping list as CSV, sorted by category then name.
pub fn shopping_list_csv(entries: &[ShoppingListEntry]) -> String {
    let mut rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            vec![
                e.ingredient.name.clone(),
                format!("{:.1}", e.quantity),
                e.ingredient.unit.to_string(),
                e.ingredient.category().to_string(),
            ]
        })
        .collect();
    rows.sort_by(|a, b| (&a[3], &a[0]).cmp(&(&b[3], &b[0])));

    let mut out = String::from("ingredient,quantity,unit,category\n");
    for row in rows {
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// One-screen project summary.
pub fn project_summary(project: &Project) -> String {
    let mut out = format!("Project: {:?}", project.name);
    for entry in &project.recipes {
        out.push_str(&format!(
            "\n- {:?} for {} persons",
            entry.recipe.name, entry.servings
        ));
    }
    out
}

/// Export a project to `<target_dir>/<project name>/`: a summary, the CSV
/// shopping list, and one scaled recipe file per entry. An existing export
/// directory is replaced.
pub fn export_project(project: &Project, target_dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = target_dir.join(&project.name);
    if dir.exists() {
        debug!("deleting directory: {}", dir.display());
        std::fs::remove_dir_all(&dir)?;
    }
    info!("creating directory: {}", dir.display());
    std::fs::create_dir_all(&dir)?;

    let mut written = Vec::new();

    let summary = dir.join("summary.txt");
    std::fs::write(&summary, project_summary(project))?;
    written.push(summary);

    let csv = dir.join("shopping_list.csv");
    std::fs::write(&csv, shopping_list_csv(&shopping_list(project)))?;
    written.push(csv);

    for entry in &project.recipes {
        let path = dir.join(format!("{}.txt", entry.recipe.name));
        std::fs::write(&path, entry.recipe.as_text(Some(entry.servings)))?;
        written.push(path);
    }

    for path in &written {
        debug!("wrote {}", path.display());
    }
    Ok(written)
}

/// Priced table straight from a project.
pub fn project_priced_table(project: &Project) -> String {
    priced_shopping_list_table(&priced_shopping_list(project))
}

fn render_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let render_row = |cells: &[String]| -> String {
        let mut line = String::new();
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                line.push_str("  ");
            }
            line.push_str(&format!("{cell:<width$}", width = widths[i]));
        }
        line.trim_end().to_string()
    };

    let header_cells: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut out = render_row(&header_cells);
    out.push('\n');
    out.push_str(&render_row(&separator));
    for row in rows {
        out.push('\n');
        out.push_str(&render_row(row));
    }
    out
}
