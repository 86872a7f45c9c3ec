//! Domain entities: tags, ingredients, recipes, and projects.
//!
//! Explicit data structs; persistence lives behind the `store` module. An
//! ingredient's identity is its (name, unit) pair — the same name may exist
//! under different units as distinct ingredients.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::parser::normalize_string;
use crate::core::quantity::Unit;

/// Classifies ingredients ("fresh", "uncommon", ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: Option<i64>,
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An ingredient with a fixed canonical unit and an optional price for one
/// unit of it. Also the import/export document shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(skip)]
    pub id: Option<i64>,
    pub name: String,
    pub unit: Unit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Ingredient {
    /// New ingredient with a normalized name and no price.
    pub fn new(name: &str, unit: Unit) -> Self {
        Self {
            id: None,
            name: normalize_string(name),
            unit,
            price: None,
            tags: Vec::new(),
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Identity key used for aggregation and storage lookups.
    pub fn key(&self) -> (String, Unit) {
        (self.name.clone(), self.unit)
    }

    /// Shopping category derived from tags. "uncommon" wins over "fresh";
    /// untagged ingredients are "usual".
    pub fn category(&self) -> &'static str {
        if self.tags.iter().any(|t| t == "uncommon") {
            "uncommon"
        } else if self.tags.iter().any(|t| t == "fresh") {
            "fresh"
        } else {
            "usual"
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One line of a recipe: an ingredient and how much of it, expressed in the
/// ingredient's canonical unit.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeItem {
    pub ingredient: Ingredient,
    pub quantity: f64,
}

impl fmt::Display for RecipeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.quantity, self.ingredient.unit, self.ingredient.name)
    }
}

/// A recipe: how to feed `serves` people, items in authoring order.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: Option<i64>,
    pub name: String,
    pub serves: u32,
    pub items: Vec<RecipeItem>,
    pub instructions: Option<String>,
}

impl Recipe {
    pub fn new(name: &str, serves: u32) -> Self {
        Self {
            id: None,
            name: normalize_string(name),
            serves,
            items: Vec::new(),
            instructions: None,
        }
    }

    pub fn push_item(&mut self, ingredient: Ingredient, quantity: f64) {
        self.items.push(RecipeItem { ingredient, quantity });
    }

    /// Ratio of requested servings to native serves. Shared by rescaling and
    /// shopping-list aggregation so both scale identically.
    ///
    /// Non-positive `serves` means corrupted data, not a recoverable input.
    pub fn scaling_factor(&self, servings: u32) -> f64 {
        assert!(self.serves > 0, "recipe {:?} serves nobody", self.name);
        f64::from(servings) / f64::from(self.serves)
    }

    /// A new, independent recipe scaled to `servings`, name annotated to mark
    /// the variant. Instructions carry over verbatim.
    pub fn rescale(&self, servings: u32) -> Self {
        let factor = self.scaling_factor(servings);
        Self {
            id: None,
            name: format!("{} (rescaled to {servings})", self.name),
            serves: servings,
            items: self
                .items
                .iter()
                .map(|item| RecipeItem {
                    ingredient: item.ingredient.clone(),
                    quantity: item.quantity * factor,
                })
                .collect(),
            instructions: self.instructions.clone(),
        }
    }

    /// Render in the recipe-file format, optionally rescaled.
    pub fn as_text(&self, servings: Option<u32>) -> String {
        let factor = servings.map_or(1.0, |s| self.scaling_factor(s));
        let mut out = format!("serves: {}", servings.unwrap_or(self.serves));
        out.push_str("\n---");
        for item in &self.items {
            out.push_str(&format!(
                "\n- {:.3} {} {}",
                item.quantity * factor,
                item.ingredient.unit,
                item.ingredient.name
            ));
        }
        if let Some(instructions) = &self.instructions {
            out.push_str("\n---\n");
            out.push_str(instructions);
        }
        out
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} persons)", self.name, self.serves)
    }
}

/// One recipe within a project, at a requested serving count that may differ
/// from the recipe's native serves.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRecipe {
    pub recipe: Recipe,
    pub servings: u32,
}

/// A named event or meal plan: multiple recipes, each at a requested serving
/// count, in the order they were added.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: Option<i64>,
    pub name: String,
    pub recipes: Vec<ProjectRecipe>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            recipes: Vec::new(),
        }
    }

    pub fn add_recipe(&mut self, recipe: Recipe, servings: u32) {
        self.recipes.push(ProjectRecipe { recipe, servings });
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} recipes", self.name, self.recipes.len())
    }
}
