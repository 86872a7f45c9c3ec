//! Canonical units and the quantity value type.
//!
//! Every raw unit written in a recipe file is normalized into one of five
//! canonical units before anything is stored or aggregated. The conversion
//! table in [`Quantity::normalize`] is the single source of truth for what a
//! supported unit means; unrecognized tokens are a parse error, never
//! silently coerced.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Canonical unit of an ingredient quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kilogram,
    Liter,
    Unit,
    Teaspoon,
    Tablespoon,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kilogram => write!(f, "kilogram"),
            Self::Liter => write!(f, "liter"),
            Self::Unit => write!(f, "unit"),
            Self::Teaspoon => write!(f, "teaspoon"),
            Self::Tablespoon => write!(f, "tablespoon"),
        }
    }
}

impl FromStr for Unit {
    type Err = Error;

    /// Accepts canonical names only. Ingredients are stored with a canonical
    /// unit; raw synonyms ("g", "cl", ...) go through [`Quantity::normalize`].
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "kilogram" => Ok(Self::Kilogram),
            "liter" => Ok(Self::Liter),
            "unit" => Ok(Self::Unit),
            "teaspoon" => Ok(Self::Teaspoon),
            "tablespoon" => Ok(Self::Tablespoon),
            other => Err(Error::parsing(format!("not a canonical unit: {other}"))),
        }
    }
}

/// An amount paired with its canonical unit. Immutable value; equality is
/// structural and exact on the f64.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    pub number: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(number: f64, unit: Unit) -> Self {
        Self { number, unit }
    }

    /// Convert a raw (number, unit token) pair into a canonical quantity.
    ///
    /// `None` and the empty string mean a count of discrete items. Pure
    /// function; zero amounts are rejected by the line parser, not here.
    pub fn normalize(number: f64, unit: Option<&str>) -> Result<Self> {
        match unit.unwrap_or("") {
            "mg" | "milligram" | "milligrams" => Ok(Self::new(number * 1e-6, Unit::Kilogram)),
            "g" | "gram" | "grams" => Ok(Self::new(number * 1e-3, Unit::Kilogram)),
            "kg" | "kilo" | "kilos" | "kilogram" | "kilograms" => {
                Ok(Self::new(number, Unit::Kilogram))
            }
            "ml" | "milliliter" | "milliliters" => Ok(Self::new(number * 1e-3, Unit::Liter)),
            "cl" | "centiliter" | "centiliters" => Ok(Self::new(number * 1e-2, Unit::Liter)),
            "dl" | "deciliter" | "deciliters" => Ok(Self::new(number * 1e-1, Unit::Liter)),
            "l" | "liter" | "liters" => Ok(Self::new(number, Unit::Liter)),
            "" | "u" | "unit" | "units" => Ok(Self::new(number, Unit::Unit)),
            "tbsp" | "tablespoon" | "tablespoons" => Ok(Self::new(number, Unit::Tablespoon)),
            "tsp" | "teaspoon" | "teaspoons" => Ok(Self::new(number, Unit::Teaspoon)),
            other => Err(Error::parsing(format!("unrecognized unit: {other}"))),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.unit)
    }
}
