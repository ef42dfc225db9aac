use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse},
};
use serde::{Deserialize, Deserializer};
use std::str::FromStr;
use tracing::error;

use crate::{
    api::handlers::{fetch_image_for, AppState},
    convert::{convert, Unit},
    corpus::Recipe,
    error::Error,
    indexer::{SearchOutcome, SearchQuery},
    Result,
};

/// Deserialize optional string, treating empty strings as None
fn deserialize_optional_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => Ok(Some(s.to_string())),
    }
}

/// Deserialize an optional number from a form field; empty and unparseable
/// values become None instead of failing the request
fn deserialize_optional_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.as_deref().and_then(|s| s.parse().ok()))
}

/// Search page template
#[derive(Template)]
#[template(path = "search.html")]
struct SearchTemplate {
    query: String,
    diet: String,
    max_calories: String,
    searched: bool,
    // "no recipes found" and "search broke" render differently
    no_matches: bool,
    failed: bool,
    results: Vec<RecipeCardData>,
}

#[derive(Clone)]
#[allow(dead_code)] // Fields are used by Askama templates
struct RecipeCardData {
    id: usize,
    name: String,
    ingredients: Vec<String>,
    directions: String,
    prep: String,
    cook: String,
    servings: String,
    calories: String,
    protein_g: String,
    carbohydrates_g: String,
    fat_g: String,
    diet_type: String,
    url: String,
    similarity: String,
    image_url: String,
}

impl RecipeCardData {
    fn from_recipe(id: usize, recipe: &Recipe, similarity: f64, image_url: Option<String>) -> Self {
        Self {
            id,
            name: recipe.name.clone(),
            ingredients: recipe
                .display_ingredients()
                .lines()
                .map(str::to_string)
                .collect(),
            directions: recipe.directions.clone(),
            prep: recipe.prep.clone().unwrap_or_else(|| "N/A".to_string()),
            cook: recipe.cook.clone().unwrap_or_else(|| "N/A".to_string()),
            servings: recipe
                .servings
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            calories: recipe
                .calories
                .map(|c| format!("{c:.0}"))
                .unwrap_or_else(|| "N/A".to_string()),
            protein_g: recipe
                .protein_g
                .map(|g| format!("{g:.0}"))
                .unwrap_or_else(|| "N/A".to_string()),
            carbohydrates_g: recipe
                .carbohydrates_g
                .map(|g| format!("{g:.0}"))
                .unwrap_or_else(|| "N/A".to_string()),
            fat_g: recipe
                .fat_g
                .map(|g| format!("{g:.0}"))
                .unwrap_or_else(|| "N/A".to_string()),
            diet_type: recipe.diet_type.clone().unwrap_or_default(),
            url: recipe.url.clone().unwrap_or_default(),
            similarity: format!("{similarity:.3}"),
            image_url: image_url.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    q: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    diet: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    max_calories: Option<f64>,
}

/// GET / - Search page
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse> {
    let query_text = params.q.clone().unwrap_or_default();

    let mut searched = false;
    let mut no_matches = false;
    let mut failed = false;
    let mut results = vec![];

    if !query_text.is_empty() {
        searched = true;

        let diet = params
            .diet
            .as_deref()
            .filter(|d| !d.eq_ignore_ascii_case("any"))
            .and_then(|d| crate::corpus::Diet::from_str(d).ok());

        let search_query = SearchQuery {
            q: query_text.clone(),
            diet,
            max_calories: params.max_calories,
            top_n: state.settings.search.default_top_n,
        };

        // An internal failure renders as "search unavailable" rather than
        // masquerading as an empty result set
        match state.index.search(&search_query) {
            Ok(SearchOutcome::Found(hits)) => {
                for hit in hits {
                    let image_url = fetch_image_for(&state, &hit.recipe).await;
                    results.push(RecipeCardData::from_recipe(
                        hit.id,
                        &hit.recipe,
                        hit.similarity,
                        image_url,
                    ));
                }
            }
            Ok(SearchOutcome::NoMatches) => {
                no_matches = true;
            }
            Err(e) => {
                error!("Search failed: {}", e.log_safe());
                failed = true;
            }
        }
    }

    let template = SearchTemplate {
        query: query_text,
        diet: params.diet.unwrap_or_else(|| "Any".to_string()),
        max_calories: params
            .max_calories
            .map(|c| format!("{c:.0}"))
            .unwrap_or_default(),
        searched,
        no_matches,
        failed,
        results,
    };

    Ok(Html(template.render().map_err(|e| {
        Error::Internal(format!("Template render failed: {e}"))
    })?))
}

/// Recipe detail page template
#[derive(Template)]
#[template(path = "recipe.html")]
struct RecipeTemplate {
    recipe: RecipeCardData,
    translation: Option<TranslationData>,
}

#[derive(Clone)]
#[allow(dead_code)] // Fields are used by Askama templates
struct TranslationData {
    language: String,
    name: String,
    ingredients: String,
    directions: String,
}

#[derive(Deserialize)]
pub struct RecipeDetailParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    language: Option<String>,
}

/// GET /recipes/:id - Recipe detail page, with optional translation
pub async fn recipe_detail(
    State(state): State<AppState>,
    Path(id): Path<usize>,
    Query(params): Query<RecipeDetailParams>,
) -> Result<impl IntoResponse> {
    let recipe = state
        .index
        .corpus()
        .get(id)
        .ok_or_else(|| Error::NotFound(format!("Recipe {id} not found")))?
        .clone();

    let image_url = fetch_image_for(&state, &recipe).await;

    let translation = match params.language {
        Some(language) => {
            let translator_config = state.settings.translator.clone();
            let recipe_for_translation = recipe.clone();
            let translated =
                tokio::task::spawn_blocking(move || -> Result<TranslationData> {
                    let translator = crate::translate::shared(&translator_config)?;
                    Ok(TranslationData {
                        name: translator.translate(&recipe_for_translation.name, &language)?,
                        ingredients: translator.translate(
                            &recipe_for_translation.display_ingredients(),
                            &language,
                        )?,
                        directions: translator
                            .translate(&recipe_for_translation.directions, &language)?,
                        language,
                    })
                })
                .await
                .map_err(|e| Error::Internal(format!("Translation task failed: {e}")))??;
            Some(translated)
        }
        None => None,
    };

    let template = RecipeTemplate {
        recipe: RecipeCardData::from_recipe(id, &recipe, 0.0, image_url),
        translation,
    };

    Ok(Html(template.render().map_err(|e| {
        Error::Internal(format!("Template render failed: {e}"))
    })?))
}

/// Measurement converter template
#[derive(Template)]
#[template(path = "convert.html")]
struct ConvertTemplate {
    amount: String,
    from: String,
    to: String,
    result: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
pub struct ConvertParams {
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    amount: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    from: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    to: Option<String>,
}

/// GET /convert - Measurement converter page
pub async fn convert_page(Query(params): Query<ConvertParams>) -> Result<impl IntoResponse> {
    let (result, error) = match (params.amount, params.from.as_deref(), params.to.as_deref()) {
        (Some(amount), Some(from_raw), Some(to_raw)) => {
            match (Unit::from_str(from_raw), Unit::from_str(to_raw)) {
                (Ok(from), Ok(to)) => {
                    let converted = convert(amount, from, to);
                    (
                        Some(format!(
                            "{amount:.2} {} ≈ {converted:.2} {}",
                            from.label(),
                            to.label()
                        )),
                        None,
                    )
                }
                _ => (None, Some("Unknown unit".to_string())),
            }
        }
        (None, None, None) => (None, None),
        _ => (None, Some("Provide an amount and both units".to_string())),
    };

    let template = ConvertTemplate {
        amount: params.amount.map(|a| a.to_string()).unwrap_or_default(),
        from: params.from.unwrap_or_else(|| "belgian-cup".to_string()),
        to: params.to.unwrap_or_else(|| "us-cup".to_string()),
        result,
        error,
    };

    Ok(Html(template.render().map_err(|e| {
        Error::Internal(format!("Template render failed: {e}"))
    })?))
}

/// About page template
#[derive(Template)]
#[template(path = "about.html")]
struct AboutTemplate {}

/// GET /about - About page
pub async fn about_page() -> Result<impl IntoResponse> {
    let template = AboutTemplate {};
    Ok(Html(template.render().map_err(|e| {
        Error::Internal(format!("Template render failed: {e}"))
    })?))
}
