use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::{
    api::models::*,
    corpus::{Diet, Recipe},
    indexer::artifacts::ArtifactMeta,
    indexer::{SearchIndex, SearchOutcome, SearchQuery},
    scrape::ImageFetcher,
    utils::validation::validate_fetch_url,
    Error, Result,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<SearchIndex>,
    pub meta: Arc<ArtifactMeta>,
    pub fetcher: Arc<ImageFetcher>,
    pub settings: crate::config::Settings,
}

/// Parse the diet query parameter; "any" and the empty string mean no filter.
fn parse_diet(raw: Option<&str>) -> Result<Option<Diet>> {
    match raw {
        None => Ok(None),
        Some(s) if s.is_empty() || s.eq_ignore_ascii_case("any") => Ok(None),
        Some(s) => Diet::from_str(s).map(Some).map_err(Error::Validation),
    }
}

/// GET /api/search - Rank recipes against an ingredient query
pub async fn search_recipes(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>> {
    debug!("Search request: {:?}", params);

    let diet = parse_diet(params.diet.as_deref())?;
    let top_n = params
        .top_n
        .unwrap_or(state.settings.search.default_top_n)
        .min(state.settings.search.max_top_n);

    let query = SearchQuery {
        q: params.q,
        diet,
        max_calories: params.max_calories,
        top_n,
    };

    let (outcome, results) = match state.index.search(&query)? {
        SearchOutcome::Found(hits) => (
            "found",
            hits.into_iter()
                .map(|hit| RecipeResult {
                    id: hit.id,
                    name: hit.recipe.name.clone(),
                    ingredients: hit.recipe.display_ingredients(),
                    directions: hit.recipe.directions.clone(),
                    prep: hit.recipe.prep.clone(),
                    cook: hit.recipe.cook.clone(),
                    servings: hit.recipe.servings.clone(),
                    calories: hit.recipe.calories,
                    diet_type: hit.recipe.diet_type.clone(),
                    url: hit.recipe.url.clone(),
                    similarity: hit.similarity,
                })
                .collect(),
        ),
        SearchOutcome::NoMatches => ("no_matches", vec![]),
    };

    Ok(Json(SearchResponse {
        outcome: outcome.to_string(),
        results,
    }))
}

fn get_recipe_by_id(state: &AppState, id: usize) -> Result<&Recipe> {
    state
        .index
        .corpus()
        .get(id)
        .ok_or_else(|| Error::NotFound(format!("Recipe {id} not found")))
}

/// GET /api/recipes/:id - Get recipe details
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<usize>,
) -> Result<Json<RecipeDetail>> {
    debug!("Get recipe request: {}", id);

    let recipe = get_recipe_by_id(&state, id)?;

    Ok(Json(RecipeDetail {
        id,
        name: recipe.name.clone(),
        ingredients: recipe.display_ingredients(),
        directions: recipe.directions.clone(),
        prep: recipe.prep.clone(),
        cook: recipe.cook.clone(),
        servings: recipe.servings.clone(),
        calories: recipe.calories,
        protein_g: recipe.protein_g,
        carbohydrates_g: recipe.carbohydrates_g,
        fat_g: recipe.fat_g,
        diet_type: recipe.diet_type.clone(),
        url: recipe.url.clone(),
    }))
}

/// GET /api/recipes/:id/image - Scrape the recipe page for an image URL.
/// Missing source URLs and fetch failures both come back as null.
pub async fn get_recipe_image(
    State(state): State<AppState>,
    Path(id): Path<usize>,
) -> Result<Json<ImageResponse>> {
    debug!("Recipe image request: {}", id);

    let recipe = get_recipe_by_id(&state, id)?;
    let image_url = fetch_image_for(&state, recipe).await;

    Ok(Json(ImageResponse { image_url }))
}

/// Validate-then-scrape helper shared with the web layer.
pub async fn fetch_image_for(state: &AppState, recipe: &Recipe) -> Option<String> {
    let url = recipe.url.as_deref()?;

    match validate_fetch_url(url) {
        Ok(_) => state.fetcher.fetch_image(url).await,
        Err(e) => {
            debug!("Skipping image fetch for {}: {}", url, e);
            None
        }
    }
}

/// GET /api/recipes/:id/translate - Translate recipe fields.
/// The first request warms the process-wide model; later ones reuse it.
pub async fn translate_recipe(
    State(state): State<AppState>,
    Path(id): Path<usize>,
    Query(params): Query<TranslateParams>,
) -> Result<Json<TranslationResponse>> {
    debug!("Translate request: {} -> {}", id, params.language);

    if params.language.trim().is_empty() {
        return Err(Error::Validation("language must not be empty".to_string()));
    }

    let recipe = get_recipe_by_id(&state, id)?.clone();
    let language = params.language.clone();
    let translator_config = state.settings.translator.clone();

    // Model loading and generation are CPU-bound
    let translated = tokio::task::spawn_blocking(move || -> Result<TranslationResponse> {
        let translator = crate::translate::shared(&translator_config)?;
        Ok(TranslationResponse {
            name: translator.translate(&recipe.name, &language)?,
            ingredients: translator.translate(&recipe.display_ingredients(), &language)?,
            directions: translator.translate(&recipe.directions, &language)?,
            language,
        })
    })
    .await
    .map_err(|e| Error::Internal(format!("Translation task failed: {e}")))??;

    Ok(Json(translated))
}

/// GET /api/stats - Corpus and model statistics
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<Stats>> {
    Ok(Json(Stats {
        total_recipes: state.index.corpus().len(),
        vocabulary_terms: state.index.vectorizer().vocabulary_len(),
        fitted_at: state.meta.fitted_at.to_rfc3339(),
    }))
}

/// GET /health - Liveness check
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
