use serde::{Deserialize, Serialize};

/// Search request parameters
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub diet: Option<String>,
    #[serde(default)]
    pub max_calories: Option<f64>,
    #[serde(default)]
    pub top_n: Option<usize>,
}

/// Search response
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    /// "found" or "no_matches", so the client can tell an empty ranking
    /// apart from a filtered-out corpus without inspecting the list.
    pub outcome: String,
    pub results: Vec<RecipeResult>,
}

/// One ranked recipe with its essential fields
#[derive(Debug, Clone, Serialize)]
pub struct RecipeResult {
    pub id: usize,
    pub name: String,
    pub ingredients: String,
    pub directions: String,
    pub prep: Option<String>,
    pub cook: Option<String>,
    pub servings: Option<String>,
    pub calories: Option<f64>,
    pub diet_type: Option<String>,
    pub url: Option<String>,
    pub similarity: f64,
}

/// Full recipe details
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    pub id: usize,
    pub name: String,
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

/// Scraped image response
#[derive(Debug, Clone, Serialize)]
pub struct ImageResponse {
    pub image_url: Option<String>,
}

/// Translation request parameters
#[derive(Debug, Clone, Deserialize)]
pub struct TranslateParams {
    pub language: String,
}

/// Translated recipe fields
#[derive(Debug, Clone, Serialize)]
pub struct TranslationResponse {
    pub language: String,
    pub name: String,
    pub ingredients: String,
    pub directions: String,
}

/// Corpus and model statistics
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub total_recipes: usize,
    pub vocabulary_terms: usize,
    pub fitted_at: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
}
