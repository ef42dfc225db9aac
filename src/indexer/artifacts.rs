//! Persisted fit artifacts.
//!
//! `chefmate index` writes two JSON files under the artifacts directory:
//! `corpus.json` (recipe records + parallel normalized strings) and
//! `vectorizer.json` (the fitted TF-IDF model). The query path loads both
//! and must never re-fit: a re-fit would change the vocabulary and
//! invalidate every cached vector.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::indexer::search::SearchIndex;
use crate::indexer::vectorizer::TfidfVectorizer;

pub const CORPUS_ARTIFACT: &str = "corpus.json";
pub const VECTORIZER_ARTIFACT: &str = "vectorizer.json";

const ARTIFACT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub version: u32,
    pub fitted_at: DateTime<Utc>,
    /// SHA-256 of the source CSV, for staleness detection.
    pub corpus_digest: String,
}

#[derive(Serialize, Deserialize)]
struct CorpusArtifact {
    meta: ArtifactMeta,
    corpus: Corpus,
    normalized: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct VectorizerArtifact {
    meta: ArtifactMeta,
    vectorizer: TfidfVectorizer,
}

/// SHA-256 digest of a corpus CSV file, hex encoded.
pub fn corpus_digest(csv_path: impl AsRef<Path>) -> Result<String> {
    let bytes = fs::read(csv_path.as_ref())?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{digest:x}"))
}

/// Persist a fitted index. Both artifacts carry the same metadata so a
/// mismatched pair can be rejected at load time.
pub fn write_artifacts(dir: impl AsRef<Path>, index: &SearchIndex, digest: String) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let meta = ArtifactMeta {
        version: ARTIFACT_VERSION,
        fitted_at: Utc::now(),
        corpus_digest: digest,
    };

    let corpus_artifact = CorpusArtifact {
        meta: meta.clone(),
        corpus: index.corpus().clone(),
        normalized: index.normalized().to_vec(),
    };
    let vectorizer_artifact = VectorizerArtifact {
        meta,
        vectorizer: index.vectorizer().clone(),
    };

    fs::write(
        dir.join(CORPUS_ARTIFACT),
        serde_json::to_vec(&corpus_artifact)?,
    )?;
    fs::write(
        dir.join(VECTORIZER_ARTIFACT),
        serde_json::to_vec(&vectorizer_artifact)?,
    )?;

    info!(
        "Wrote artifacts to {} ({} recipes, {} terms)",
        dir.display(),
        index.corpus().len(),
        index.vectorizer().vocabulary_len()
    );

    Ok(())
}

/// Load a persisted index for the query path.
pub fn load_index(dir: impl AsRef<Path>) -> Result<(SearchIndex, ArtifactMeta)> {
    let dir = dir.as_ref();

    let corpus_path = dir.join(CORPUS_ARTIFACT);
    let vectorizer_path = dir.join(VECTORIZER_ARTIFACT);

    if !corpus_path.exists() || !vectorizer_path.exists() {
        return Err(Error::NotFound(format!(
            "No fitted artifacts in {}; run `chefmate index` first",
            dir.display()
        )));
    }

    let corpus_artifact: CorpusArtifact = serde_json::from_slice(&fs::read(&corpus_path)?)
        .map_err(|e| Error::Artifact(format!("Failed to decode {CORPUS_ARTIFACT}: {e}")))?;
    let vectorizer_artifact: VectorizerArtifact =
        serde_json::from_slice(&fs::read(&vectorizer_path)?)
            .map_err(|e| Error::Artifact(format!("Failed to decode {VECTORIZER_ARTIFACT}: {e}")))?;

    if corpus_artifact.meta.version != ARTIFACT_VERSION
        || vectorizer_artifact.meta.version != ARTIFACT_VERSION
    {
        return Err(Error::Artifact(format!(
            "Artifact version mismatch (found {}/{}, expected {ARTIFACT_VERSION}); re-run `chefmate index`",
            corpus_artifact.meta.version, vectorizer_artifact.meta.version
        )));
    }

    // The two files are only valid as a pair from the same fit
    if corpus_artifact.meta.corpus_digest != vectorizer_artifact.meta.corpus_digest {
        return Err(Error::Artifact(
            "corpus.json and vectorizer.json come from different fits; re-run `chefmate index`"
                .to_string(),
        ));
    }

    let meta = corpus_artifact.meta;
    let index = SearchIndex::from_parts(
        corpus_artifact.corpus,
        corpus_artifact.normalized,
        vectorizer_artifact.vectorizer,
    )?;

    info!(
        "Loaded artifacts from {} ({} recipes, {} terms, fitted {})",
        dir.display(),
        index.corpus().len(),
        index.vectorizer().vocabulary_len(),
        meta.fitted_at
    );

    Ok((index, meta))
}

/// Warn when the CSV on disk no longer matches the fitted artifacts.
/// Staleness is not an error: the cached space is still internally
/// consistent, just behind the data.
pub fn warn_if_stale(meta: &ArtifactMeta, csv_path: impl AsRef<Path>) {
    let csv_path = csv_path.as_ref();
    match corpus_digest(csv_path) {
        Ok(digest) if digest != meta.corpus_digest => {
            warn!(
                "{} has changed since the artifacts were fitted; run `chefmate index` to refresh",
                csv_path.display()
            );
        }
        Ok(_) => {}
        Err(e) => {
            warn!(
                "Could not check corpus staleness for {}: {}",
                csv_path.display(),
                e
            );
        }
    }
}
