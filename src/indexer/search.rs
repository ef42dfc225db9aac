use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::VectorizerConfig;
use crate::corpus::{Corpus, Diet, Recipe};
use crate::error::{Error, Result};
use crate::indexer::normalize::normalize;
use crate::indexer::vector::{cosine_similarity, SparseVector};
use crate::indexer::vectorizer::TfidfVectorizer;

/// Read-only query-time index: the corpus, the fitted model, and the
/// precomputed document vectors, index-aligned.
#[derive(Debug)]
pub struct SearchIndex {
    corpus: Corpus,
    normalized: Vec<String>,
    vectorizer: TfidfVectorizer,
    doc_vectors: Vec<SparseVector>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub diet: Option<Diet>,
    pub max_calories: Option<f64>,
    pub top_n: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Corpus row of the matched recipe.
    pub id: usize,
    pub recipe: Recipe,
    pub similarity: f64,
}

/// Outcome of a ranking run. Internal failures are `Err` on `search`, so
/// the caller can tell "nothing passed the filters" apart from "the search
/// itself broke".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SearchOutcome {
    /// Ranked hits, best first.
    Found(Vec<SearchHit>),
    /// No recipe passed the diet/calorie filters.
    NoMatches,
}

impl SearchIndex {
    /// Offline path: normalize the corpus and fit a fresh model.
    pub fn build(corpus: Corpus, config: VectorizerConfig) -> Result<Self> {
        let normalized: Vec<String> = corpus
            .iter()
            .map(|recipe| normalize(&recipe.ingredients))
            .collect();

        let vectorizer = TfidfVectorizer::fit(&normalized, config)?;
        Self::from_parts(corpus, normalized, vectorizer)
    }

    /// Query path: assemble from persisted parts without re-fitting.
    /// Document vectors are recomputed by embedding the stored normalized
    /// strings into the stored model's space.
    pub fn from_parts(
        corpus: Corpus,
        normalized: Vec<String>,
        vectorizer: TfidfVectorizer,
    ) -> Result<Self> {
        if corpus.len() != normalized.len() {
            return Err(Error::Search(format!(
                "Corpus/normalized length mismatch: {} vs {}",
                corpus.len(),
                normalized.len()
            )));
        }

        let doc_vectors = normalized
            .iter()
            .map(|text| vectorizer.transform(text))
            .collect();

        Ok(Self {
            corpus,
            normalized,
            vectorizer,
            doc_vectors,
        })
    }

    /// Rank recipes against an ingredient query.
    ///
    /// Rows failing the diet or calorie predicate are masked out before
    /// scoring; a zero-row mask is `NoMatches`, not an error. Ties (and the
    /// all-zero vector of a degenerate query) resolve to corpus order, so an
    /// empty query returns the first `top_n` mask-passing rows.
    pub fn search(&self, query: &SearchQuery) -> Result<SearchOutcome> {
        if query.top_n == 0 {
            return Err(Error::Validation("top_n must be at least 1".to_string()));
        }

        let normalized_query = normalize(&query.q);
        let query_vector = self.vectorizer.transform(&normalized_query);

        let mask: Vec<usize> = self
            .corpus
            .iter()
            .enumerate()
            .filter(|(_, recipe)| Self::passes_filters(recipe, query))
            .map(|(id, _)| id)
            .collect();

        debug!(
            "Query {:?}: {} of {} recipes pass filters",
            query.q,
            mask.len(),
            self.corpus.len()
        );

        if mask.is_empty() {
            return Ok(SearchOutcome::NoMatches);
        }

        let mut scored: Vec<(usize, f64)> = mask
            .into_iter()
            .map(|id| {
                let similarity = cosine_similarity(&query_vector, &self.doc_vectors[id]);
                (id, similarity)
            })
            .collect();

        // Stable sort keeps corpus order among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(query.top_n);

        let hits = scored
            .into_iter()
            .filter_map(|(id, similarity)| {
                self.corpus.get(id).map(|recipe| SearchHit {
                    id,
                    recipe: recipe.clone(),
                    similarity,
                })
            })
            .collect();

        Ok(SearchOutcome::Found(hits))
    }

    fn passes_filters(recipe: &Recipe, query: &SearchQuery) -> bool {
        if let Some(diet) = query.diet {
            if !diet.matches(recipe.diet_type.as_deref()) {
                return false;
            }
        }

        if let Some(max_calories) = query.max_calories {
            // A recipe without a calorie value cannot satisfy the predicate
            match recipe.calories {
                Some(calories) if calories <= max_calories => {}
                _ => return false,
            }
        }

        true
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn normalized(&self) -> &[String] {
        &self.normalized
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(name: &str, ingredients: &str, diet: &str, calories: f64) -> Recipe {
        Recipe {
            name: name.to_string(),
            ingredients: ingredients.to_string(),
            directions: "Cook.".to_string(),
            prep: Some("10 mins".to_string()),
            cook: Some("20 mins".to_string()),
            servings: Some("4".to_string()),
            calories: Some(calories),
            protein_g: None,
            carbohydrates_g: None,
            fat_g: None,
            diet_type: Some(diet.to_string()),
            url: None,
        }
    }

    fn test_index() -> SearchIndex {
        let corpus = Corpus::new(vec![
            recipe("Tofu Stir Fry", "tofu soy sauce ginger", "Vegan", 300.0),
            recipe(
                "Chicken Casserole",
                "chicken cream cheese butter",
                "Vegetarian",
                900.0,
            ),
            recipe("Chickpea Salad", "chickpeas lemon olive oil", "Vegan", 250.0),
            recipe("Steak Dinner", "beef steak butter garlic", "Low-Carb", 700.0),
        ]);

        let config = VectorizerConfig {
            max_features: 5000,
            min_df: 1,
            max_df_ratio: 1.0,
        };

        SearchIndex::build(corpus, config).expect("Failed to build index")
    }

    #[test]
    fn test_results_are_bounded_and_sorted() {
        let index = test_index();
        let outcome = index
            .search(&SearchQuery {
                q: "butter garlic".to_string(),
                diet: None,
                max_calories: None,
                top_n: 2,
            })
            .unwrap();

        let hits = match outcome {
            SearchOutcome::Found(hits) => hits,
            SearchOutcome::NoMatches => panic!("expected hits"),
        };

        assert!(hits.len() <= 2);
        assert!(hits.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }

    #[test]
    fn test_filters_trump_similarity() {
        // "Chicken Casserole" is the best textual match but fails both
        // filters; the vegan, low-calorie rows remain.
        let index = test_index();
        let outcome = index
            .search(&SearchQuery {
                q: "chicken".to_string(),
                diet: Some(Diet::Vegan),
                max_calories: Some(500.0),
                top_n: 5,
            })
            .unwrap();

        let hits = match outcome {
            SearchOutcome::Found(hits) => hits,
            SearchOutcome::NoMatches => panic!("expected hits"),
        };

        assert!(!hits.is_empty());
        for hit in &hits {
            assert!(Diet::Vegan.matches(hit.recipe.diet_type.as_deref()));
            assert!(hit.recipe.calories.unwrap() <= 500.0);
        }
    }

    #[test]
    fn test_zero_row_mask_is_no_matches() {
        let index = test_index();
        let outcome = index
            .search(&SearchQuery {
                q: "chicken".to_string(),
                diet: Some(Diet::Vegan),
                max_calories: Some(10.0),
                top_n: 5,
            })
            .unwrap();

        assert!(matches!(outcome, SearchOutcome::NoMatches));
    }

    #[test]
    fn test_empty_query_returns_corpus_order() {
        let index = test_index();
        let outcome = index
            .search(&SearchQuery {
                q: String::new(),
                diet: None,
                max_calories: None,
                top_n: 3,
            })
            .unwrap();

        let hits = match outcome {
            SearchOutcome::Found(hits) => hits,
            SearchOutcome::NoMatches => panic!("expected hits"),
        };

        // All-zero query vector: every similarity is 0, corpus order wins
        assert_eq!(hits.len(), 3);
        assert_eq!(
            hits.iter().map(|h| h.id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(hits.iter().all(|h| h.similarity == 0.0));
    }

    #[test]
    fn test_missing_calories_fails_calorie_filter() {
        let mut no_calories = recipe("Mystery Dish", "chicken rice", "Vegan", 0.0);
        no_calories.calories = None;

        let corpus = Corpus::new(vec![
            no_calories,
            recipe("Tofu Bowl", "tofu rice", "Vegan", 400.0),
        ]);
        let index = SearchIndex::build(
            corpus,
            VectorizerConfig {
                max_features: 5000,
                min_df: 1,
                max_df_ratio: 1.0,
            },
        )
        .unwrap();

        let outcome = index
            .search(&SearchQuery {
                q: "rice".to_string(),
                diet: None,
                max_calories: Some(500.0),
                top_n: 5,
            })
            .unwrap();

        let hits = match outcome {
            SearchOutcome::Found(hits) => hits,
            SearchOutcome::NoMatches => panic!("expected hits"),
        };
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].recipe.name, "Tofu Bowl");
    }

    #[test]
    fn test_zero_top_n_is_a_validation_error() {
        let index = test_index();
        let result = index.search(&SearchQuery {
            q: "tofu".to_string(),
            diet: None,
            max_calories: None,
            top_n: 0,
        });
        assert!(result.is_err());
    }
}
