// Corpus model: recipe records loaded once from CSV and kept read-only.

pub mod ingredients;
pub mod loader;

use serde::{Deserialize, Serialize};

pub use loader::load_corpus;

/// A single recipe row. Identity is the row position in the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    /// Free text, or a Python-style list literal carried over from the
    /// upstream dataset (e.g. `['1 cup flour', '2 eggs']`).
    pub ingredients: String,
    pub directions: String,
    pub prep: Option<String>,
    pub cook: Option<String>,
    pub servings: Option<String>,
    pub calories: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbohydrates_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub diet_type: Option<String>,
    pub url: Option<String>,
}

impl Recipe {
    /// Ingredient text flattened for display: list literals become one
    /// ingredient per line, anything else is shown verbatim.
    pub fn display_ingredients(&self) -> String {
        match ingredients::parse_list_literal(&self.ingredients) {
            Ok(items) => items.join("\n"),
            Err(_) => self.ingredients.clone(),
        }
    }
}

/// Diet filter accepted by the search surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Diet {
    Vegetarian,
    Vegan,
    LowCarb,
}

impl Diet {
    /// Lowercase label used for substring matching against corpus tags.
    pub fn label(&self) -> &'static str {
        match self {
            Diet::Vegetarian => "vegetarian",
            Diet::Vegan => "vegan",
            Diet::LowCarb => "low-carb",
        }
    }

    /// Case-insensitive containment match, so a corpus tag like
    /// "Vegan, Gluten-Free" still passes a Vegan filter. A recipe without a
    /// diet tag never matches.
    pub fn matches(&self, diet_type: Option<&str>) -> bool {
        match diet_type {
            Some(tag) => tag.to_lowercase().contains(self.label()),
            None => false,
        }
    }
}

impl std::str::FromStr for Diet {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace(' ', "-").as_str() {
            "vegetarian" => Ok(Diet::Vegetarian),
            "vegan" => Ok(Diet::Vegan),
            "low-carb" | "lowcarb" => Ok(Diet::LowCarb),
            other => Err(format!("Unknown diet filter: {other}")),
        }
    }
}

impl std::fmt::Display for Diet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diet::Vegetarian => write!(f, "Vegetarian"),
            Diet::Vegan => write!(f, "Vegan"),
            Diet::LowCarb => write!(f, "Low-Carb"),
        }
    }
}

/// The full recipe corpus, index-addressed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    records: Vec<Recipe>,
}

impl Corpus {
    pub fn new(records: Vec<Recipe>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Recipe> {
        self.records.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.records.iter()
    }
}
