//! Service configuration.
//!
//! Settings are loaded once at startup from an optional `config` file merged
//! with `PREPDECK__`-prefixed environment variables. The Gemini API key may
//! also be supplied through the conventional `GEMINI_API_KEY` variable.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::generation::retry::RetryPolicy;

/// Top-level configuration loaded at startup
#[derive(Debug, Clone, Deserialize)]
pub struct StaticConfig {
    #[serde(default = "default_server")]
    pub server: ServerConfig,

    #[serde(default = "default_storage")]
    pub storage: StorageConfig,

    #[serde(default = "default_gemini")]
    pub gemini: GeminiConfig,

    #[serde(default = "default_generation")]
    pub generation: GenerationConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Gemini API client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// API key for the generation service. Empty means unconfigured; AI
    /// endpoints report 503 rather than silently failing mid-job.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_gemini_model")]
    pub model: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl GeminiConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Chunked quiz generation tuning
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Target chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Question count range requested per chunk
    #[serde(default = "default_min_questions")]
    pub min_questions_per_chunk: u32,

    #[serde(default = "default_max_questions")]
    pub max_questions_per_chunk: u32,

    /// Retry envelope for a single chunk request
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    #[serde(default = "default_retry_multiplier")]
    pub retry_multiplier: u32,

    /// Delay between successful chunks to respect upstream rate limits
    #[serde(default = "default_chunk_pacing_ms")]
    pub chunk_pacing_ms: u64,
}

impl GenerationConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            multiplier: self.retry_multiplier,
        }
    }

    pub fn chunk_pacing(&self) -> Duration {
        Duration::from_millis(self.chunk_pacing_ms)
    }
}

// ==================== Default Value Functions ====================

pub(crate) fn default_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: default_port(),
    }
}

pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    8080
}

pub(crate) fn default_storage() -> StorageConfig {
    StorageConfig {
        data_dir: default_data_dir(),
    }
}

pub(crate) fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

pub(crate) fn default_gemini() -> GeminiConfig {
    GeminiConfig {
        base_url: default_gemini_base_url(),
        api_key: String::new(),
        model: default_gemini_model(),
        request_timeout_secs: default_request_timeout_secs(),
        max_output_tokens: default_max_output_tokens(),
    }
}

pub(crate) fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

pub(crate) fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

pub(crate) fn default_request_timeout_secs() -> u64 {
    120
}

pub(crate) fn default_max_output_tokens() -> u32 {
    8192
}

pub(crate) fn default_generation() -> GenerationConfig {
    GenerationConfig {
        chunk_size: default_chunk_size(),
        min_questions_per_chunk: default_min_questions(),
        max_questions_per_chunk: default_max_questions(),
        max_attempts: default_max_attempts(),
        retry_base_delay_ms: default_retry_base_delay_ms(),
        retry_multiplier: default_retry_multiplier(),
        chunk_pacing_ms: default_chunk_pacing_ms(),
    }
}

pub(crate) fn default_chunk_size() -> usize {
    4000
}

pub(crate) fn default_min_questions() -> u32 {
    12
}

pub(crate) fn default_max_questions() -> u32 {
    20
}

pub(crate) fn default_max_attempts() -> u32 {
    3
}

pub(crate) fn default_retry_base_delay_ms() -> u64 {
    2000
}

pub(crate) fn default_retry_multiplier() -> u32 {
    2
}

pub(crate) fn default_chunk_pacing_ms() -> u64 {
    1500
}
