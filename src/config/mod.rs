use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub corpus: CorpusConfig,
    pub vectorizer: VectorizerConfig,
    pub search: SearchConfig,
    pub fetcher: FetcherConfig,
    pub translator: TranslatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub external_url: Option<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub csv_path: PathBuf,
    pub artifacts_dir: PathBuf,
}

/// Parameters of the TF-IDF fit. Changing any of them changes the vector
/// space, so they are recorded in the persisted artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Vocabulary cap: keep the most frequent qualifying terms.
    pub max_features: usize,
    /// Terms appearing in fewer documents than this are excluded.
    pub min_df: usize,
    /// Terms appearing in more than this fraction of documents are excluded.
    pub max_df_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub default_top_n: usize,
    pub max_top_n: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    pub model_id: String,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 5000,
            min_df: 5,
            max_df_ratio: 0.8,
        }
    }
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid PORT value".to_string()))?;

        let external_url = std::env::var("EXTERNAL_URL").ok();

        let max_request_body_size = std::env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| "1048576".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MAX_REQUEST_BODY_SIZE value".to_string()))?;

        let csv_path = std::env::var("CORPUS_PATH")
            .unwrap_or_else(|_| "data/recipes.csv".to_string())
            .into();

        let artifacts_dir = std::env::var("ARTIFACTS_DIR")
            .unwrap_or_else(|_| "data/artifacts".to_string())
            .into();

        let max_features = std::env::var("MAX_FEATURES")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MAX_FEATURES value".to_string()))?;

        let min_df = std::env::var("MIN_DF")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MIN_DF value".to_string()))?;

        let max_df_ratio = std::env::var("MAX_DF_RATIO")
            .unwrap_or_else(|_| "0.8".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MAX_DF_RATIO value".to_string()))?;

        let default_top_n = std::env::var("DEFAULT_TOP_N")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DEFAULT_TOP_N value".to_string()))?;

        let max_top_n = std::env::var("MAX_TOP_N")
            .unwrap_or_else(|_| "50".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MAX_TOP_N value".to_string()))?;

        let fetch_timeout = std::env::var("FETCH_TIMEOUT")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid FETCH_TIMEOUT value".to_string()))?;

        let max_body_size = std::env::var("FETCH_MAX_BODY_SIZE")
            .unwrap_or_else(|_| "2097152".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid FETCH_MAX_BODY_SIZE value".to_string()))?;

        let model_id =
            std::env::var("TRANSLATION_MODEL").unwrap_or_else(|_| "t5-small".to_string());

        Ok(Settings {
            server: ServerConfig {
                host,
                port,
                external_url,
                max_request_body_size,
            },
            corpus: CorpusConfig {
                csv_path,
                artifacts_dir,
            },
            vectorizer: VectorizerConfig {
                max_features,
                min_df,
                max_df_ratio,
            },
            search: SearchConfig {
                default_top_n,
                max_top_n,
            },
            fetcher: FetcherConfig {
                user_agent: format!("Chefmate/{}", env!("CARGO_PKG_VERSION")),
                timeout_seconds: fetch_timeout,
                max_body_size,
            },
            translator: TranslatorConfig { model_id },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        if self.vectorizer.max_features == 0 {
            return Err(Error::Config("MAX_FEATURES must be non-zero".to_string()));
        }

        if self.vectorizer.min_df == 0 {
            return Err(Error::Config("MIN_DF must be at least 1".to_string()));
        }

        if !(self.vectorizer.max_df_ratio > 0.0 && self.vectorizer.max_df_ratio <= 1.0) {
            return Err(Error::Config(
                "MAX_DF_RATIO must be in (0, 1]".to_string(),
            ));
        }

        if self.search.default_top_n == 0 || self.search.default_top_n > self.search.max_top_n {
            return Err(Error::Config(
                "DEFAULT_TOP_N must be in 1..=MAX_TOP_N".to_string(),
            ));
        }

        Ok(())
    }
}
