use std::path::PathBuf;

use tracing::info;

use crate::config::Settings;
use crate::convert::{convert, Unit};
use crate::corpus::{load_corpus, Diet};
use crate::indexer::artifacts;
use crate::indexer::{SearchHit, SearchIndex, SearchOutcome, SearchQuery};
use crate::Result;

/// Fit the model and persist the artifacts
pub fn index(settings: &Settings, csv: Option<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    let csv_path = csv.unwrap_or_else(|| settings.corpus.csv_path.clone());
    let out_dir = out.unwrap_or_else(|| settings.corpus.artifacts_dir.clone());

    info!("Fitting model over {}", csv_path.display());

    let corpus = load_corpus(&csv_path)?;
    let recipe_count = corpus.len();

    let search_index = SearchIndex::build(corpus, settings.vectorizer.clone())?;
    let digest = artifacts::corpus_digest(&csv_path)?;
    artifacts::write_artifacts(&out_dir, &search_index, digest)?;

    println!("✓ Indexed {recipe_count} recipes");
    println!(
        "  Vocabulary: {} terms",
        search_index.vectorizer().vocabulary_len()
    );
    println!("  Artifacts: {}", out_dir.display());

    Ok(())
}

/// Search the fitted corpus and print ranked matches
pub fn search(
    settings: &Settings,
    query: String,
    diet: Option<Diet>,
    max_calories: Option<f64>,
    top_n: Option<usize>,
) -> Result<()> {
    let (search_index, meta) = artifacts::load_index(&settings.corpus.artifacts_dir)?;
    artifacts::warn_if_stale(&meta, &settings.corpus.csv_path);

    let search_query = SearchQuery {
        q: query,
        diet,
        max_calories,
        top_n: top_n
            .unwrap_or(settings.search.default_top_n)
            .min(settings.search.max_top_n),
    };

    match search_index.search(&search_query)? {
        SearchOutcome::Found(hits) => print_search_results(&hits),
        SearchOutcome::NoMatches => {
            println!("No recipes found. Try different ingredients or filters.");
        }
    }

    Ok(())
}

fn print_search_results(hits: &[SearchHit]) {
    println!("Found {} recipes:\n", hits.len());

    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{}. {} (similarity {:.3})",
            rank + 1,
            hit.recipe.name,
            hit.similarity
        );

        if let Some(diet_type) = &hit.recipe.diet_type {
            println!("   Diet: {diet_type}");
        }
        if let Some(calories) = hit.recipe.calories {
            println!("   Calories: {calories:.0}");
        }
        if let (Some(prep), Some(cook)) = (&hit.recipe.prep, &hit.recipe.cook) {
            println!("   Prep: {prep}, Cook: {cook}");
        }
        if let Some(url) = &hit.recipe.url {
            println!("   {url}");
        }
        println!();
    }
}

/// Convert between measurement units and print the result
pub fn convert_amount(amount: f64, from: Unit, to: Unit) -> Result<()> {
    let converted = convert(amount, from, to);
    println!(
        "{amount:.2} {} ≈ {converted:.2} {}",
        from.label(),
        to.label()
    );
    Ok(())
}

/// Translate text and print the result
pub fn translate(settings: &Settings, text: String, language: String) -> Result<()> {
    let translator = crate::translate::shared(&settings.translator)?;
    let translated = translator.translate(&text, &language)?;
    println!("{translated}");
    Ok(())
}
