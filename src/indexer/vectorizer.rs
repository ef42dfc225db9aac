//! Fixed-vocabulary TF-IDF model.
//!
//! `fit` runs once over the normalized corpus; the fitted model is persisted
//! and reused so the vector space never shifts under cached document
//! vectors. `transform` embeds any normalized text into that space.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::VectorizerConfig;
use crate::error::{Error, Result};
use crate::indexer::vector::SparseVector;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    /// Term → dimension, assigned in lexicographic term order.
    vocabulary: HashMap<String, usize>,
    /// Smoothed inverse document frequency per dimension.
    idf: Vec<f64>,
    /// Number of documents the model was fit on.
    document_count: usize,
}

impl TfidfVectorizer {
    /// Fit the model over normalized documents.
    ///
    /// Candidate terms are unigrams and adjacent bigrams. Terms outside the
    /// `[min_df, max_df_ratio * n]` document-frequency band are excluded,
    /// and the vocabulary is capped at `max_features` by total term count
    /// (ties broken lexicographically).
    pub fn fit(documents: &[String], config: VectorizerConfig) -> Result<Self> {
        if documents.is_empty() {
            return Err(Error::Corpus(
                "Cannot fit vectorizer on an empty corpus".to_string(),
            ));
        }

        let mut total_counts: HashMap<String, u64> = HashMap::new();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for document in documents {
            let tokens: Vec<&str> = document.split_whitespace().collect();
            let bigrams: Vec<String> = tokens
                .windows(2)
                .map(|window| format!("{} {}", window[0], window[1]))
                .collect();

            let mut seen: HashSet<&str> = HashSet::new();
            for term in tokens
                .iter()
                .copied()
                .chain(bigrams.iter().map(String::as_str))
            {
                *total_counts.entry(term.to_string()).or_insert(0) += 1;
                if seen.insert(term) {
                    *document_frequency.entry(term.to_string()).or_insert(0) += 1;
                }
            }
        }

        let n_docs = documents.len();
        let max_df = config.max_df_ratio * n_docs as f64;

        // Terms inside the document-frequency band
        let mut qualifying: Vec<(&String, u64)> = total_counts
            .iter()
            .filter(|(term, _)| {
                let df = document_frequency[*term];
                df >= config.min_df && (df as f64) <= max_df
            })
            .map(|(term, &count)| (term, count))
            .collect();

        if qualifying.is_empty() {
            return Err(Error::Corpus(format!(
                "TF-IDF fit produced an empty vocabulary ({} documents, min_df {})",
                n_docs, config.min_df
            )));
        }

        // Cap at the most frequent terms, ties lexicographic
        qualifying.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        qualifying.truncate(config.max_features);

        // Dimensions follow lexicographic term order
        let mut terms: Vec<String> = qualifying.into_iter().map(|(t, _)| t.clone()).collect();
        terms.sort();

        let mut vocabulary = HashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());
        for (dim, term) in terms.into_iter().enumerate() {
            let df = document_frequency[&term];
            idf.push(((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, dim);
        }

        info!(
            "Fitted TF-IDF model: {} terms over {} documents",
            vocabulary.len(),
            n_docs
        );

        Ok(Self {
            config,
            vocabulary,
            idf,
            document_count: n_docs,
        })
    }

    /// Embed normalized text into the fitted space: raw term counts × IDF,
    /// L2-normalized. Text sharing no term with the vocabulary embeds as the
    /// zero vector.
    pub fn transform(&self, normalized_text: &str) -> SparseVector {
        let tokens: Vec<&str> = normalized_text.split_whitespace().collect();

        let mut counts: HashMap<usize, f64> = HashMap::new();
        let mut tally = |term: &str| {
            if let Some(&dim) = self.vocabulary.get(term) {
                *counts.entry(dim).or_insert(0.0) += 1.0;
            }
        };

        for token in &tokens {
            tally(token);
        }
        for window in tokens.windows(2) {
            tally(&format!("{} {}", window[0], window[1]));
        }

        let entries = counts
            .into_iter()
            .map(|(dim, count)| (dim, count * self.idf[dim]))
            .collect();

        let mut vector = SparseVector::from_entries(entries);
        vector.l2_normalize();

        if vector.is_zero() {
            debug!("Text embedded as zero vector (no vocabulary terms)");
        }

        vector
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn document_count(&self) -> usize {
        self.document_count
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Dimension of a term, if it made the vocabulary.
    pub fn dimension_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient_config() -> VectorizerConfig {
        VectorizerConfig {
            max_features: 5000,
            min_df: 1,
            max_df_ratio: 1.0,
        }
    }

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fit_builds_unigrams_and_bigrams() {
        let model = TfidfVectorizer::fit(
            &docs(&["chicken soup", "chicken curry"]),
            lenient_config(),
        )
        .unwrap();

        assert!(model.dimension_of("chicken").is_some());
        assert!(model.dimension_of("chicken soup").is_some());
        assert!(model.dimension_of("soup curry").is_none());
    }

    #[test]
    fn test_min_df_excludes_rare_terms() {
        let config = VectorizerConfig {
            min_df: 2,
            ..lenient_config()
        };
        let model = TfidfVectorizer::fit(
            &docs(&["chicken soup", "chicken curry", "beef stew"]),
            config,
        )
        .unwrap();

        assert!(model.dimension_of("chicken").is_some());
        assert!(model.dimension_of("beef").is_none());
    }

    #[test]
    fn test_max_df_excludes_ubiquitous_terms() {
        let config = VectorizerConfig {
            max_df_ratio: 0.5,
            ..lenient_config()
        };
        let model = TfidfVectorizer::fit(
            &docs(&["chicken rice", "chicken beans", "chicken peas", "lentil soup"]),
            config,
        )
        .unwrap();

        // "chicken" appears in 3/4 documents, above the 0.5 cap
        assert!(model.dimension_of("chicken").is_none());
        assert!(model.dimension_of("lentil").is_some());
    }

    #[test]
    fn test_max_features_keeps_most_frequent_terms() {
        let config = VectorizerConfig {
            max_features: 1,
            ..lenient_config()
        };
        let model = TfidfVectorizer::fit(
            &docs(&["chicken chicken rice", "chicken rice", "rice"]),
            config,
        )
        .unwrap();

        // "chicken" (4 occurrences) beats "rice" (3)
        assert_eq!(model.vocabulary_len(), 1);
        assert!(model.dimension_of("chicken").is_some());
    }

    #[test]
    fn test_rarer_terms_get_higher_idf_weight() {
        let model = TfidfVectorizer::fit(
            &docs(&["chicken rice", "chicken beans", "saffron rice"]),
            lenient_config(),
        )
        .unwrap();

        let chicken = model.idf[model.dimension_of("chicken").unwrap()];
        let saffron = model.idf[model.dimension_of("saffron").unwrap()];
        assert!(saffron > chicken);
    }

    #[test]
    fn test_transform_is_unit_length_or_zero() {
        let model =
            TfidfVectorizer::fit(&docs(&["chicken soup", "beef stew"]), lenient_config()).unwrap();

        let v = model.transform("chicken stew");
        assert!((v.l2_norm() - 1.0).abs() < 1e-12);

        let zero = model.transform("quinoa");
        assert!(zero.is_zero());
        assert!(model.transform("").is_zero());
    }

    #[test]
    fn test_fixed_dimensionality_after_fit() {
        let model =
            TfidfVectorizer::fit(&docs(&["chicken soup", "beef stew"]), lenient_config()).unwrap();
        let before = model.vocabulary_len();

        // Unknown query terms never extend the space
        let _ = model.transform("dragonfruit tartare");
        assert_eq!(model.vocabulary_len(), before);
    }

    #[test]
    fn test_fit_rejects_empty_corpus() {
        assert!(TfidfVectorizer::fit(&[], lenient_config()).is_err());
    }

    #[test]
    fn test_fit_rejects_unreachable_min_df() {
        let config = VectorizerConfig {
            min_df: 5,
            ..lenient_config()
        };
        assert!(TfidfVectorizer::fit(&docs(&["chicken soup"]), config).is_err());
    }
}
