//! Configuration management for sarad.
//!
//! Loads settings from /etc/sara/config.toml or uses defaults.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/sara/config.toml";

/// Default config file path for fallback
pub const DEFAULT_CONFIG_PATH: &str = "/var/lib/sara/config.toml";

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama-compatible API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Embedding model for semantic retrieval
    #[serde(default = "default_embed_model")]
    pub embed_model: String,

    /// Model for grounded answers and the conversational fallback
    #[serde(default = "default_generate_model")]
    pub generate_model: String,

    /// Model for the restricted intent arbiter - fast, small
    #[serde(default = "default_arbiter_model")]
    pub arbiter_model: String,

    /// Embedding request timeout in seconds
    #[serde(default = "default_embed_timeout")]
    pub embed_timeout_secs: u64,

    /// Generation request timeout in seconds
    #[serde(default = "default_generate_timeout")]
    pub generate_timeout_secs: u64,

    /// Arbiter request timeout in seconds
    #[serde(default = "default_arbiter_timeout")]
    pub arbiter_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_embed_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_generate_model() -> String {
    "qwen2:0.5b".to_string()
}

fn default_arbiter_model() -> String {
    // Small model keeps escalation cheap
    "qwen2:0.5b".to_string()
}

fn default_embed_timeout() -> u64 {
    10
}

fn default_generate_timeout() -> u64 {
    30
}

fn default_arbiter_timeout() -> u64 {
    15
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            embed_model: default_embed_model(),
            generate_model: default_generate_model(),
            arbiter_model: default_arbiter_model(),
            embed_timeout_secs: default_embed_timeout(),
            generate_timeout_secs: default_generate_timeout(),
            arbiter_timeout_secs: default_arbiter_timeout(),
        }
    }
}

/// Retrieval engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Top-K rows taken from the vector index
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Max chunks considered for the grounding context
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,

    /// Character budget for the assembled context
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

fn default_top_k() -> usize {
    5
}

fn default_max_chunks() -> usize {
    3
}

fn default_max_context_chars() -> usize {
    1200
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_chunks: default_max_chunks(),
            max_context_chars: default_max_context_chars(),
        }
    }
}

/// Data artifact paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Corpus artifact: {"chunks": [{"id": 0, "text": "..."}]}
    #[serde(default = "default_corpus_path")]
    pub corpus_path: PathBuf,

    /// Prebuilt embedding index, one row per chunk id
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Conversation context persistence file
    #[serde(default = "default_context_path")]
    pub context_path: PathBuf,
}

fn default_corpus_path() -> PathBuf {
    PathBuf::from("/var/lib/sara/rag/chunks.json")
}

fn default_index_path() -> PathBuf {
    PathBuf::from("/var/lib/sara/rag/vectors.json")
}

fn default_context_path() -> PathBuf {
    PathBuf::from("/var/lib/sara/context.json")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            corpus_path: default_corpus_path(),
            index_path: default_index_path(),
            context_path: default_context_path(),
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub data: DataConfig,
}

impl Config {
    /// Load config from file, or return defaults
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_PATH)
            .or_else(|_| Self::load_from_path(DEFAULT_CONFIG_PATH))
            .unwrap_or_else(|e| {
                warn!("Config not found, using defaults: {}", e);
                Config::default()
            })
    }

    /// Load config from specific path
    pub fn load_from_path(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded config from {}", path);
        Ok(config)
    }
}
