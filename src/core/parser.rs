//! Recipe source parsing.
//!
//! Covers the ingredient-line grammar ("100g tomate rallado"), the
//! three-section recipe file format, and project files. Every failure is
//! [`Error::Parsing`] carrying the offending line or path; a failed parse
//! abandons the whole line or file, never partially.

use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;

use crate::core::quantity::Quantity;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Item lines
// ---------------------------------------------------------------------------

/// Short unit symbols that may be glued to the number ("12g") or separated
/// by one space ("12 g"). Long-form unit words apply only as a separate word.
const UNIT_SYMBOLS: &str = "g|kg|l|ml|cl|tsp|tbsp|unit";

static QUANTITY_RE: OnceLock<Regex> = OnceLock::new();

fn quantity_re() -> &'static Regex {
    QUANTITY_RE.get_or_init(|| {
        // Number, optional single space, optional short unit symbol, then the
        // mandatory separator space before the ingredient words.
        Regex::new(&format!(r"([\d.]+)\s?({UNIT_SYMBOLS})?\s")).expect("quantity pattern compiles")
    })
}

/// Lowercase, squash whitespace runs to single spaces, trim.
pub fn normalize_string(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse one ingredient line into a canonical quantity and ingredient name.
///
/// Grammar: `<number><optional short unit><space><ingredient words...>
/// <optional (parenthetical note)>`. The parenthetical note is discarded.
pub fn parse_item_line(line: &str) -> Result<(Quantity, String)> {
    let line = normalize_string(line);

    let caps = quantity_re()
        .captures(&line)
        .ok_or_else(|| Error::parsing(format!("quantity string not found in line {line:?}")))?;
    let end = caps.get(0).map_or(0, |m| m.end());

    let number: f64 = caps[1]
        .parse()
        .map_err(|_| Error::parsing(format!("invalid number {:?} in line {line:?}", &caps[1])))?;
    if number == 0.0 {
        return Err(Error::parsing(format!("parsed number is zero in line {line}")));
    }

    let rest = line[end..].trim();
    let (quantity, rest) = match caps.get(2) {
        Some(unit) => (Quantity::normalize(number, Some(unit.as_str()))?, rest),
        None => split_leading_unit_word(number, rest)?,
    };

    Ok((quantity, strip_annotation(rest)))
}

/// A long-form unit may follow the number as its own word ("3 teaspoon coke").
/// A first word that is not a recognized unit belongs to the ingredient name.
fn split_leading_unit_word(number: f64, rest: &str) -> Result<(Quantity, &str)> {
    if let Some((word, tail)) = rest.split_once(' ') {
        if let Ok(quantity) = Quantity::normalize(number, Some(word)) {
            return Ok((quantity, tail));
        }
    }
    Ok((Quantity::normalize(number, None)?, rest))
}

/// Drop a trailing parenthesized annotation, e.g. "ganja (well dried)".
fn strip_annotation(rest: &str) -> String {
    if let Some(open) = rest.find('(') {
        if rest[open..].contains(')') {
            return rest[..open].trim().to_string();
        }
    }
    rest.to_string()
}

// ---------------------------------------------------------------------------
// Recipe files
// ---------------------------------------------------------------------------

/// Recipe file header section. Unknown keys are tolerated.
#[derive(Debug, Clone, Deserialize)]
struct RecipeHeader {
    serves: u32,
}

/// A fully parsed recipe file, items in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecipe {
    pub name: String,
    pub serves: u32,
    pub items: Vec<(Quantity, String)>,
    pub instructions: Option<String>,
}

/// Split a recipe file into its raw sections.
///
/// ```text
/// header          (YAML mapping, required)
/// ---
/// items           (YAML list of lines, required)
/// ---
/// instructions    (free text, optional)
/// ```
///
/// The recipe name is the file stem, normalized.
pub fn split_recipe_file(path: &Path) -> Result<(String, String, String, Option<String>)> {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let name = normalize_string(stem);
    if name.is_empty() {
        return Err(Error::parsing(format!(
            "cannot derive a recipe name from {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::parsing(format!("cannot read recipe file {}: {e}", path.display())))?;

    let mut sections = content.splitn(3, "\n---");
    let header = sections.next().unwrap_or("").trim().to_string();
    let Some(items) = sections.next() else {
        return Err(Error::parsing(format!(
            "recipe file {} has fewer than two sections",
            path.display()
        )));
    };
    let instructions = sections
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok((name, header, items.trim().to_string(), instructions))
}

/// Parse a recipe file: decode the header and run every item line through
/// the ingredient-line grammar.
pub fn parse_recipe_file(path: &Path) -> Result<ParsedRecipe> {
    let (name, header, items, instructions) = split_recipe_file(path)?;

    let header: RecipeHeader = serde_yaml_ng::from_str(&header)
        .map_err(|e| Error::parsing(format!("invalid recipe header in {}: {e}", path.display())))?;
    if header.serves == 0 {
        return Err(Error::parsing(format!(
            "recipe {} must serve at least one person",
            path.display()
        )));
    }

    let lines: Vec<String> = serde_yaml_ng::from_str(&items)
        .map_err(|e| Error::parsing(format!("invalid items section in {}: {e}", path.display())))?;
    let items = lines
        .iter()
        .map(|line| parse_item_line(line))
        .collect::<Result<Vec<_>>>()?;

    Ok(ParsedRecipe {
        name,
        serves: header.serves,
        items,
        instructions,
    })
}

// ---------------------------------------------------------------------------
// Project files
// ---------------------------------------------------------------------------

/// Declarative project file: one serving count applied to a list of recipes
/// that must already exist in the catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectFile {
    pub servings: u32,
    pub recipes: Vec<String>,
}

/// Parse a project file; the project name is the file stem, normalized.
pub fn parse_project_file(path: &Path) -> Result<(String, ProjectFile)> {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let name = normalize_string(stem);
    if name.is_empty() {
        return Err(Error::parsing(format!(
            "cannot derive a project name from {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::parsing(format!("cannot read project file {}: {e}", path.display())))?;
    let project: ProjectFile = serde_yaml_ng::from_str(&content)
        .map_err(|e| Error::parsing(format!("invalid project file {}: {e}", path.display())))?;

    Ok((name, project))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::quantity::Unit;
    use std::path::PathBuf;

    const PAN_CON_TOMATE: &str = "serves: 2\n---\n- 1 pan\n- 100g tomate rallado\n---\ngrate the tomato\nput it on the bread\n";
    const BOCATA_DE_NADA: &str = "serves: 1\n---\n- 1 pancito\n- 1l aire\n";

    fn write_recipe(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_normalize_string() {
        assert_eq!(normalize_string("  Chili  Con    Carne "), "chili con carne");
        assert_eq!(normalize_string("\tpan\ncon  tomate"), "pan con tomate");
    }

    #[test]
    fn test_item_line_no_unit() {
        assert_eq!(
            parse_item_line("1 egg").unwrap(),
            (Quantity::new(1.0, Unit::Unit), "egg".to_string())
        );
    }

    #[test]
    fn test_item_line_case_insensitive() {
        assert_eq!(parse_item_line("1 EgG").unwrap(), parse_item_line("1 egg").unwrap());
    }

    #[test]
    fn test_item_line_whitespace_resistance() {
        assert_eq!(
            parse_item_line("   1     egg    ").unwrap(),
            (Quantity::new(1.0, Unit::Unit), "egg".to_string())
        );
        assert_eq!(
            parse_item_line("  12  g    ganja  ").unwrap(),
            parse_item_line("12g ganja").unwrap()
        );
    }

    #[test]
    fn test_item_line_attached_unit() {
        assert_eq!(
            parse_item_line("12g ganja").unwrap(),
            (Quantity::new(0.012, Unit::Kilogram), "ganja".to_string())
        );
    }

    #[test]
    fn test_item_line_spaces_in_ingredient() {
        assert_eq!(
            parse_item_line("12g sativa ganja").unwrap(),
            (Quantity::new(0.012, Unit::Kilogram), "sativa ganja".to_string())
        );
    }

    #[test]
    fn test_item_line_decimal_number() {
        assert_eq!(
            parse_item_line("1.2g coke").unwrap(),
            (Quantity::new(0.0012, Unit::Kilogram), "coke".to_string())
        );
        assert_eq!(
            parse_item_line("4.5kg oats").unwrap(),
            (Quantity::new(4.5, Unit::Kilogram), "oats".to_string())
        );
    }

    #[test]
    fn test_item_line_kilograms() {
        assert_eq!(
            parse_item_line("2kg rice").unwrap(),
            (Quantity::new(2.0, Unit::Kilogram), "rice".to_string())
        );
        assert_eq!(
            parse_item_line("2.5kg rice").unwrap(),
            (Quantity::new(2.5, Unit::Kilogram), "rice".to_string())
        );
    }

    #[test]
    fn test_item_line_parenthesis_stripped() {
        assert_eq!(
            parse_item_line("12g ganja (well dried)").unwrap(),
            (Quantity::new(0.012, Unit::Kilogram), "ganja".to_string())
        );
    }

    #[test]
    fn test_item_line_unclosed_parenthesis_kept() {
        assert_eq!(
            parse_item_line("12g ganja (well dried").unwrap().1,
            "ganja (well dried"
        );
    }

    #[test]
    fn test_item_line_zero_rejected() {
        let err = parse_item_line("0 apple").unwrap_err();
        assert!(err.to_string().contains("parsed number is zero"));
    }

    #[test]
    fn test_item_line_no_number_rejected() {
        let err = parse_item_line("apple").unwrap_err();
        assert!(err.to_string().contains("quantity string not found"));
    }

    #[test]
    fn test_item_line_ingredient_starting_with_unit_letter() {
        // "l" is a unit symbol but "lemon" is an ingredient
        assert_eq!(
            parse_item_line("1 lemon").unwrap(),
            (Quantity::new(1.0, Unit::Unit), "lemon".to_string())
        );
    }

    #[test]
    fn test_item_line_spoons_as_separate_words() {
        assert_eq!(
            parse_item_line("3 teaspoon coke").unwrap(),
            (Quantity::new(3.0, Unit::Teaspoon), "coke".to_string())
        );
        assert_eq!(
            parse_item_line("3 teaspoons coke").unwrap(),
            (Quantity::new(3.0, Unit::Teaspoon), "coke".to_string())
        );
        assert_eq!(
            parse_item_line("3 tablespoon ketamine").unwrap(),
            (Quantity::new(3.0, Unit::Tablespoon), "ketamine".to_string())
        );
        assert_eq!(
            parse_item_line("3 tablespoons ketamine").unwrap(),
            (Quantity::new(3.0, Unit::Tablespoon), "ketamine".to_string())
        );
    }

    #[test]
    fn test_item_line_short_unit_as_separate_word() {
        assert_eq!(
            parse_item_line("1 u eggs").unwrap(),
            (Quantity::new(1.0, Unit::Unit), "eggs".to_string())
        );
    }

    #[test]
    fn test_split_recipe_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_recipe(&dir, "pan con tomate", PAN_CON_TOMATE);

        let (name, header, items, instructions) = split_recipe_file(&path).unwrap();
        assert_eq!(name, "pan con tomate");
        assert_eq!(header, "serves: 2");
        assert_eq!(items, "- 1 pan\n- 100g tomate rallado");
        assert_eq!(
            instructions.as_deref(),
            Some("grate the tomato\nput it on the bread")
        );
    }

    #[test]
    fn test_split_recipe_file_no_instructions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_recipe(&dir, "bocata de nada", BOCATA_DE_NADA);

        let (name, _, items, instructions) = split_recipe_file(&path).unwrap();
        assert_eq!(name, "bocata de nada");
        assert_eq!(items, "- 1 pancito\n- 1l aire");
        assert_eq!(instructions, None);
    }

    #[test]
    fn test_split_recipe_file_missing_items_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_recipe(&dir, "broken", "serves: 2\n");

        let err = split_recipe_file(&path).unwrap_err();
        assert!(err.to_string().contains("fewer than two sections"));
    }

    #[test]
    fn test_split_recipe_file_unreadable_path() {
        let err = split_recipe_file(Path::new("/nonexistent/gazpacho")).unwrap_err();
        assert!(matches!(err, Error::Parsing(_)));
    }

    #[test]
    fn test_parse_recipe_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_recipe(&dir, "pan con tomate", PAN_CON_TOMATE);

        let recipe = parse_recipe_file(&path).unwrap();
        assert_eq!(recipe.name, "pan con tomate");
        assert_eq!(recipe.serves, 2);
        assert_eq!(
            recipe.items,
            vec![
                (Quantity::new(1.0, Unit::Unit), "pan".to_string()),
                (Quantity::new(0.1, Unit::Kilogram), "tomate rallado".to_string()),
            ]
        );
        assert_eq!(
            recipe.instructions.as_deref(),
            Some("grate the tomato\nput it on the bread")
        );
    }

    #[test]
    fn test_parse_recipe_file_no_instructions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_recipe(&dir, "bocata de nada", BOCATA_DE_NADA);

        let recipe = parse_recipe_file(&path).unwrap();
        assert_eq!(recipe.serves, 1);
        assert_eq!(
            recipe.items,
            vec![
                (Quantity::new(1.0, Unit::Unit), "pancito".to_string()),
                (Quantity::new(1.0, Unit::Liter), "aire".to_string()),
            ]
        );
        assert_eq!(recipe.instructions, None);
    }

    #[test]
    fn test_parse_recipe_file_header_not_a_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_recipe(&dir, "listy", "- serves\n---\n- 1 pan\n");

        let err = parse_recipe_file(&path).unwrap_err();
        assert!(err.to_string().contains("invalid recipe header"));
    }

    #[test]
    fn test_parse_recipe_file_header_missing_serves() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_recipe(&dir, "headless", "title: nope\n---\n- 1 pan\n");

        let err = parse_recipe_file(&path).unwrap_err();
        assert!(err.to_string().contains("invalid recipe header"));
    }

    #[test]
    fn test_parse_recipe_file_zero_serves() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_recipe(&dir, "ghost feast", "serves: 0\n---\n- 1 pan\n");

        let err = parse_recipe_file(&path).unwrap_err();
        assert!(err.to_string().contains("at least one person"));
    }

    #[test]
    fn test_parse_recipe_file_items_not_a_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_recipe(&dir, "mappy", "serves: 2\n---\npan: 1\n");

        let err = parse_recipe_file(&path).unwrap_err();
        assert!(err.to_string().contains("invalid items section"));
    }

    #[test]
    fn test_parse_recipe_file_bad_item_line_aborts_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_recipe(&dir, "halfway", "serves: 2\n---\n- 1 pan\n- mystery stuff\n");

        let err = parse_recipe_file(&path).unwrap_err();
        assert!(err.to_string().contains("quantity string not found"));
    }

    #[test]
    fn test_parse_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Feast Of Snails");
        std::fs::write(&path, "servings: 5\nrecipes:\n- pan con tomate\n- caracoles con vinagre\n")
            .unwrap();

        let (name, project) = parse_project_file(&path).unwrap();
        assert_eq!(name, "feast of snails");
        assert_eq!(project.servings, 5);
        assert_eq!(project.recipes, vec!["pan con tomate", "caracoles con vinagre"]);
    }

    #[test]
    fn test_parse_project_file_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope");
        std::fs::write(&path, "recipes: {}\n").unwrap();

        let err = parse_project_file(&path).unwrap_err();
        assert!(err.to_string().contains("invalid project file"));
    }
}
