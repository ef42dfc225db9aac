use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Router};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use crate::api::handlers::{self as api_handlers, AppState};
use crate::config::Settings;
use crate::web::handlers as web_handlers;

/// Create the router with all endpoints (API + Web UI)
pub fn create_router(state: AppState, settings: &Settings) -> Router {
    // Public API routes - read-only, no authentication required
    let api_routes = Router::new()
        // Search
        .route("/search", get(api_handlers::search_recipes))
        // Recipes
        .route("/recipes/:id", get(api_handlers::get_recipe))
        .route("/recipes/:id/image", get(api_handlers::get_recipe_image))
        .route(
            "/recipes/:id/translate",
            get(api_handlers::translate_recipe),
        )
        // Stats
        .route("/stats", get(api_handlers::get_stats))
        .with_state(state.clone());

    // Web UI routes
    let web_routes = Router::new()
        .route("/", get(web_handlers::index))
        .route("/recipes/:id", get(web_handlers::recipe_detail))
        .route("/convert", get(web_handlers::convert_page))
        .route("/about", get(web_handlers::about_page))
        .with_state(state.clone());

    // Health check routes
    let health_routes = Router::new().route("/health", get(api_handlers::health_check));

    // Static file serving
    let static_routes = Router::new().nest_service("/static", ServeDir::new("src/web/static"));

    // Main router with middleware
    Router::new()
        .merge(web_routes)
        .merge(health_routes)
        .merge(static_routes)
        .nest("/api", api_routes)
        .layer(
            // Request body size limit - prevent memory exhaustion from large payloads
            RequestBodyLimitLayer::new(settings.server.max_request_body_size),
        )
        .layer(
            // CORS - allow all origins for read-only public API
            CorsLayer::new()
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .allow_origin(tower_http::cors::Any)
                .max_age(Duration::from_secs(3600)),
        )
        .layer(
            // Security headers
            SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ),
        )
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(
                "default-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data: https:; font-src 'self' data:; object-src 'none'; base-uri 'self'",
            ),
        ))
        .layer(
            // Compression
            CompressionLayer::new(),
        )
        .layer(
            // Tracing
            TraceLayer::new_for_http(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VectorizerConfig;
    use crate::corpus::{Corpus, Recipe};
    use crate::indexer::artifacts::ArtifactMeta;
    use crate::indexer::SearchIndex;
    use crate::scrape::ImageFetcher;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_recipe(name: &str, ingredients: &str, diet: &str, calories: f64) -> Recipe {
        Recipe {
            name: name.to_string(),
            ingredients: ingredients.to_string(),
            directions: "Cook well.".to_string(),
            prep: Some("10 mins".to_string()),
            cook: Some("20 mins".to_string()),
            servings: Some("2".to_string()),
            calories: Some(calories),
            protein_g: Some(10.0),
            carbohydrates_g: Some(20.0),
            fat_g: Some(5.0),
            diet_type: Some(diet.to_string()),
            url: None,
        }
    }

    fn create_test_state() -> AppState {
        let corpus = Corpus::new(vec![
            test_recipe("Tofu Bowl", "tofu rice ginger", "Vegan", 350.0),
            test_recipe("Cheese Omelette", "eggs cheese butter", "Vegetarian", 420.0),
            test_recipe("Garlic Chicken", "chicken garlic butter", "Low-Carb", 500.0),
        ]);

        let index = SearchIndex::build(
            corpus,
            VectorizerConfig {
                max_features: 5000,
                min_df: 1,
                max_df_ratio: 1.0,
            },
        )
        .expect("Failed to build test index");

        let settings = crate::config::Settings {
            server: crate::config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                external_url: None,
                max_request_body_size: 1_048_576,
            },
            corpus: crate::config::CorpusConfig {
                csv_path: "data/recipes.csv".into(),
                artifacts_dir: "data/artifacts".into(),
            },
            vectorizer: VectorizerConfig::default(),
            search: crate::config::SearchConfig {
                default_top_n: 5,
                max_top_n: 50,
            },
            fetcher: crate::config::FetcherConfig {
                user_agent: "test".to_string(),
                timeout_seconds: 5,
                max_body_size: 1_048_576,
            },
            translator: crate::config::TranslatorConfig {
                model_id: "t5-small".to_string(),
            },
        };

        AppState {
            index: Arc::new(index),
            meta: Arc::new(ArtifactMeta {
                version: 1,
                fitted_at: chrono::Utc::now(),
                corpus_digest: "test".to_string(),
            }),
            fetcher: Arc::new(ImageFetcher::new(&settings.fetcher).unwrap()),
            settings,
        }
    }

    #[tokio::test]
    async fn test_health_route() {
        let state = create_test_state();
        let app = create_router(state.clone(), &state.settings);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_search_returns_filtered_results() {
        let state = create_test_state();
        let app = create_router(state.clone(), &state.settings);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/search?q=butter&diet=vegetarian")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 65536).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(parsed["outcome"], "found");
        let results = parsed["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["name"], "Cheese Omelette");
    }

    #[tokio::test]
    async fn test_search_no_matches_is_ok_not_error() {
        let state = create_test_state();
        let app = create_router(state.clone(), &state.settings);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/search?q=butter&diet=vegan&max_calories=100")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 65536).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(parsed["outcome"], "no_matches");
        assert!(parsed["results"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_diet_is_bad_request() {
        let state = create_test_state();
        let app = create_router(state.clone(), &state.settings);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/search?q=butter&diet=paleo")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_recipe_detail_and_not_found() {
        let state = create_test_state();
        let app = create_router(state.clone(), &state.settings);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/recipes/0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/recipes/99")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
