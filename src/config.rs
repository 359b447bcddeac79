use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the docqa pipeline.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the OpenAI-compatible completion API.
    pub completion_api_url: String,
    /// API key sent as a bearer token on completion requests.
    pub completion_api_key: String,
    /// Model identifier passed to the completion API.
    pub completion_model: String,
    /// Embedding backend used to vectorize chunks and questions.
    pub embedding_provider: EmbeddingProvider,
    /// Base URL of the embedding API (unused by the hash provider).
    pub embedding_api_url: Option<String>,
    /// Optional API key for the embedding API.
    pub embedding_api_key: Option<String>,
    /// Embedding model identifier passed to the provider.
    pub embedding_model: String,
    /// Dimensionality of the produced vectors.
    pub embedding_dimension: usize,
    /// Optional override for the maximum accepted PDF size in megabytes.
    pub max_pdf_size_mb: Option<u64>,
    /// Optional override for the chunk size in characters.
    pub chunk_size: Option<usize>,
    /// Optional override for the chunk overlap in characters.
    pub chunk_overlap: Option<usize>,
    /// Optional override for the number of chunks retrieved per question.
    pub retrieval_top_k: Option<usize>,
}

/// Supported embedding backends for the question answering engine.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// OpenAI-compatible embeddings endpoint reached over HTTP.
    Http,
    /// Deterministic local byte-hashing embedder, no network required.
    Hash,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let embedding_provider = load_env_optional("EMBEDDING_PROVIDER")
            .map(|value| {
                value
                    .parse()
                    .map_err(|()| ConfigError::InvalidValue("EMBEDDING_PROVIDER".to_string()))
            })
            .transpose()?
            .unwrap_or(EmbeddingProvider::Http);

        let embedding_api_url = load_env_optional("EMBEDDING_API_URL");
        if matches!(embedding_provider, EmbeddingProvider::Http) && embedding_api_url.is_none() {
            return Err(ConfigError::MissingVariable(
                "EMBEDDING_API_URL".to_string(),
            ));
        }

        Ok(Self {
            completion_api_url: load_env("COMPLETION_API_URL")?,
            completion_api_key: load_env("COMPLETION_API_KEY")?,
            completion_model: load_env("COMPLETION_MODEL")?,
            embedding_provider,
            embedding_api_url,
            embedding_api_key: load_env_optional("EMBEDDING_API_KEY"),
            embedding_model: load_env("EMBEDDING_MODEL")?,
            embedding_dimension: load_env("EMBEDDING_DIMENSION")?
                .parse()
                .map_err(|_| ConfigError::InvalidValue("EMBEDDING_DIMENSION".to_string()))?,
            max_pdf_size_mb: parse_optional("MAX_PDF_SIZE_MB")?,
            chunk_size: parse_optional("CHUNK_SIZE")?,
            chunk_overlap: parse_optional("CHUNK_OVERLAP")?,
            retrieval_top_k: parse_optional("RETRIEVAL_TOP_K")?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" | "openai" => Ok(Self::Http),
            "hash" => Ok(Self::Hash),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        completion_api_url = %config.completion_api_url,
        completion_model = %config.completion_model,
        embedding_provider = ?config.embedding_provider,
        embedding_model = %config.embedding_model,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
