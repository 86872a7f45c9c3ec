//! Shopping-list aggregation.
//!
//! A map-reduce over a project's recipes: each recipe is scaled to its requested
//! servings, then quantities are summed per distinct (name, unit) ingredient
//! identity. Output order is first-seen order — any sorting is a
//! presentation concern, applied by the report layer.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::core::catalog::{Ingredient, Project};
use crate::core::quantity::Unit;

/// One aggregated line of a shopping list.
#[derive(Debug, Clone, PartialEq)]
pub struct ShoppingListEntry {
    pub ingredient: Ingredient,
    pub quantity: f64,
}

/// A shopping-list line with its derived total price. `None` means no price
/// data for the ingredient — deliberately distinct from a price of zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedEntry {
    pub ingredient: Ingredient,
    pub quantity: f64,
    pub price: Option<f64>,
}

/// Aggregate a project into a shopping list.
///
/// Recipes are walked in project order, items in recipe order; an
/// ingredient's position in the output is fixed the first time it is seen.
/// Stateless and reentrant: each call builds its own accumulator.
pub fn shopping_list(project: &Project) -> Vec<ShoppingListEntry> {
    let mut totals: IndexMap<(String, Unit), ShoppingListEntry> = IndexMap::new();
    let mut items_before = 0usize;

    for entry in &project.recipes {
        let factor = entry.recipe.scaling_factor(entry.servings);
        debug!(
            recipe = %entry.recipe.name,
            from = entry.recipe.serves,
            to = entry.servings,
            factor,
            items = entry.recipe.items.len(),
            "scaling recipe"
        );
        for item in &entry.recipe.items {
            items_before += 1;
            let scaled = item.quantity * factor;
            debug!(
                ingredient = %item.ingredient.name,
                quantity = scaled,
                unit = %item.ingredient.unit,
                "scaled item"
            );
            totals
                .entry(item.ingredient.key())
                .or_insert_with(|| ShoppingListEntry {
                    ingredient: item.ingredient.clone(),
                    quantity: 0.0,
                })
                .quantity += scaled;
        }
    }

    info!(
        "aggregation reduced item list from {} to {}",
        items_before,
        totals.len()
    );
    totals.into_values().collect()
}

/// Shopping list with a derived price per line.
pub fn priced_shopping_list(project: &Project) -> Vec<PricedEntry> {
    shopping_list(project)
        .into_iter()
        .map(|entry| {
            let price = entry.ingredient.price.map(|p| p * entry.quantity);
            PricedEntry {
                ingredient: entry.ingredient,
                quantity: entry.quantity,
                price,
            }
        })
        .collect()
}
