use chefmate::{
    api::{handlers::AppState, routes},
    cli::{commands, Cli, Commands},
    config::Settings,
    indexer::artifacts,
    scrape::ImageFetcher,
    Error, Result,
};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    // Silently ignore if file doesn't exist
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chefmate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::from_env()?;
    settings.validate()?;

    // Handle commands
    match cli.command {
        Commands::Serve { port, host } => {
            serve(settings, port, host).await?;
        }
        Commands::Index { csv, out } => {
            commands::index(&settings, csv, out)?;
        }
        Commands::Search {
            query,
            diet,
            max_calories,
            top_n,
        } => {
            commands::search(&settings, query, diet, max_calories, top_n)?;
        }
        Commands::Convert { amount, from, to } => {
            commands::convert_amount(amount, from, to)?;
        }
        Commands::Translate { text, language } => {
            commands::translate(&settings, text, language)?;
        }
    }

    Ok(())
}

async fn serve(mut settings: Settings, port: Option<u16>, host: Option<String>) -> Result<()> {
    // Override settings with CLI arguments
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(host) = host {
        settings.server.host = host;
    }

    info!("Starting Chefmate server");
    info!("Corpus: {}", settings.corpus.csv_path.display());
    info!("Server: {}:{}", settings.server.host, settings.server.port);

    // Load fitted artifacts - the query path never re-fits
    let (search_index, meta) = artifacts::load_index(&settings.corpus.artifacts_dir)?;
    artifacts::warn_if_stale(&meta, &settings.corpus.csv_path);

    // Initialize the image fetcher
    let fetcher = ImageFetcher::new(&settings.fetcher)?;

    // Create application state
    let state = AppState {
        index: Arc::new(search_index),
        meta: Arc::new(meta),
        fetcher: Arc::new(fetcher),
        settings: settings.clone(),
    };

    // Create router
    let app = routes::create_router(state.clone(), &settings);

    // Start server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    println!("\n========================================");
    println!("Chefmate");
    println!("========================================");
    println!("Status: Running");
    println!("Address: http://{addr}");
    println!(
        "Corpus: {} recipes, {} terms",
        state.index.corpus().len(),
        state.index.vectorizer().vocabulary_len()
    );
    println!("\nAPI Endpoints:");
    println!("  GET  /api/search");
    println!("  GET  /api/recipes/:id");
    println!("  GET  /api/recipes/:id/image");
    println!("  GET  /api/recipes/:id/translate");
    println!("  GET  /api/stats");
    println!("\nPress Ctrl+C to stop");
    println!("========================================\n");

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    Ok(())
}
