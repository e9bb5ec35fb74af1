//! Process configuration read once at startup.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ANSWER_TIMEOUT_SECS, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE,
    DEFAULT_INGEST_TIMEOUT_SECS, DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MAX_RETRIES,
    DEFAULT_LLM_MODEL, DEFAULT_LLM_RETRY_BASE_MS, DEFAULT_LLM_TEMPERATURE,
    DEFAULT_MAX_LIVE_INDICES, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_TOP_K, SESSIONS_FILE_NAME,
    UPLOAD_DIR_NAME,
};
use crate::env_config::{env_duration_secs, env_parse_with_default};
use crate::error::CoreError;

/// Which embedder backs ingestion and retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// Local ONNX sentence-transformer via fastembed.
    FastEmbed,
    /// Dependency-free lexical hashing; no model download.
    Hashing,
}

impl fmt::Display for EmbeddingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FastEmbed => "fastembed",
            Self::Hashing => "hashing",
        })
    }
}

impl FromStr for EmbeddingBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fastembed" => Ok(Self::FastEmbed),
            "hashing" => Ok(Self::Hashing),
            other => Err(format!("unknown embedding backend: {other}")),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub sessions_file: PathBuf,
    pub models_dir: PathBuf,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_max_retries: u32,
    pub llm_retry_base_delay: Duration,
    pub embedding_backend: EmbeddingBackend,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub ingest_timeout: Duration,
    pub answer_timeout: Duration,
    pub max_live_indices: usize,
    pub max_upload_bytes: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data_dir", &self.data_dir)
            .field("upload_dir", &self.upload_dir)
            .field("sessions_file", &self.sessions_file)
            .field("models_dir", &self.models_dir)
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "***"))
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("embedding_backend", &self.embedding_backend)
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Defaults rooted at `data_dir`, no API key.
    #[must_use]
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            upload_dir: data_dir.join(UPLOAD_DIR_NAME),
            sessions_file: data_dir.join(SESSIONS_FILE_NAME),
            models_dir: data_dir.join("models"),
            data_dir,
            llm_api_key: None,
            llm_base_url: DEFAULT_LLM_BASE_URL.to_owned(),
            llm_model: DEFAULT_LLM_MODEL.to_owned(),
            llm_temperature: DEFAULT_LLM_TEMPERATURE,
            llm_max_retries: DEFAULT_LLM_MAX_RETRIES,
            llm_retry_base_delay: Duration::from_millis(DEFAULT_LLM_RETRY_BASE_MS),
            embedding_backend: EmbeddingBackend::FastEmbed,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            ingest_timeout: Duration::from_secs(DEFAULT_INGEST_TIMEOUT_SECS),
            answer_timeout: Duration::from_secs(DEFAULT_ANSWER_TIMEOUT_SECS),
            max_live_indices: DEFAULT_MAX_LIVE_INDICES,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Reads `DOCQA_*` variables; anything unset falls back to the defaults.
    pub fn from_env() -> Result<Self, CoreError> {
        let data_dir = std::env::var("DOCQA_DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| {
            dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("docqa")
        });
        let mut config = Self::with_data_dir(data_dir);

        if let Ok(dir) = std::env::var("DOCQA_UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }
        if let Ok(file) = std::env::var("DOCQA_SESSIONS_FILE") {
            config.sessions_file = PathBuf::from(file);
        }
        if let Ok(dir) = std::env::var("DOCQA_MODELS_DIR") {
            config.models_dir = PathBuf::from(dir);
        }
        config.llm_api_key =
            std::env::var("DOCQA_LLM_API_KEY").ok().filter(|key| !key.trim().is_empty());
        if let Ok(url) = std::env::var("DOCQA_LLM_BASE_URL") {
            config.llm_base_url = url;
        }
        if let Ok(model) = std::env::var("DOCQA_LLM_MODEL") {
            config.llm_model = model;
        }
        config.llm_temperature =
            env_parse_with_default("DOCQA_LLM_TEMPERATURE", config.llm_temperature);
        config.llm_max_retries =
            env_parse_with_default("DOCQA_LLM_MAX_RETRIES", config.llm_max_retries);
        config.llm_retry_base_delay = Duration::from_millis(env_parse_with_default(
            "DOCQA_LLM_RETRY_BASE_MS",
            DEFAULT_LLM_RETRY_BASE_MS,
        ));
        config.embedding_backend =
            env_parse_with_default("DOCQA_EMBEDDINGS", config.embedding_backend);
        config.chunk_size = env_parse_with_default("DOCQA_CHUNK_SIZE", config.chunk_size);
        config.chunk_overlap = env_parse_with_default("DOCQA_CHUNK_OVERLAP", config.chunk_overlap);
        config.top_k = env_parse_with_default("DOCQA_TOP_K", config.top_k);
        config.ingest_timeout =
            env_duration_secs("DOCQA_INGEST_TIMEOUT_SECS", DEFAULT_INGEST_TIMEOUT_SECS);
        config.answer_timeout =
            env_duration_secs("DOCQA_ANSWER_TIMEOUT_SECS", DEFAULT_ANSWER_TIMEOUT_SECS);
        config.max_live_indices =
            env_parse_with_default("DOCQA_MAX_LIVE_INDICES", config.max_live_indices);
        config.max_upload_bytes =
            env_parse_with_default("DOCQA_MAX_UPLOAD_BYTES", config.max_upload_bytes);

        config.validate()?;
        Ok(config)
    }

    /// Rejects combinations that would make ingestion or retrieval meaningless.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.chunk_size == 0 {
            return Err(CoreError::InvalidConfig("chunk size must be positive".to_owned()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(CoreError::InvalidConfig(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(CoreError::InvalidConfig("top_k must be positive".to_owned()));
        }
        if self.max_live_indices == 0 {
            return Err(CoreError::InvalidConfig("max live indices must be positive".to_owned()));
        }
        Ok(())
    }

    /// The API key, or an error naming the variable to set.
    pub fn require_llm_api_key(&self) -> Result<&str, CoreError> {
        self.llm_api_key
            .as_deref()
            .ok_or_else(|| CoreError::InvalidConfig("DOCQA_LLM_API_KEY must be set".to_owned()))
    }
}
