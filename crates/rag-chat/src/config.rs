//! Configuration for the chat backend
//!
//! Values come from (in order of precedence) environment variables, an optional
//! TOML file named by `RAG_CHAT_CONFIG`, and the defaults below. A `.env` file in
//! the working directory is loaded first if present.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::types::ChatMode;

/// Main chat backend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Chat handler behaviour
    pub chat: ChatSettings,
    /// Embedding provider configuration
    pub embeddings: EmbeddingConfig,
    /// Hosted chat model configuration
    pub llm: LlmConfig,
    /// MongoDB / Atlas Vector Search configuration
    pub mongo: MongoConfig,
    /// Which storage backend holds documents and history
    pub store: StoreBackend,
}

impl ChatConfig {
    /// Load configuration from `.env`, the optional TOML file and the environment
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match std::env::var("RAG_CHAT_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Read a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Apply overrides from a variable lookup (usually the process environment)
    ///
    /// Empty values are treated as unset.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Server
        if let Some(host) = get("RAG_CHAT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("RAG_CHAT_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid RAG_CHAT_PORT: {}", port)))?;
        }

        // Chat behaviour
        if let Some(mode) = get("RAG_CHAT_MODE") {
            self.chat.mode = mode.parse()?;
        }
        if let Some(top_k) = get("RAG_CHAT_TOP_K") {
            self.chat.top_k = top_k
                .parse()
                .map_err(|_| Error::Config(format!("Invalid RAG_CHAT_TOP_K: {}", top_k)))?;
        }
        if let Some(store) = get("RAG_CHAT_STORE") {
            self.store = store.parse()?;
        }

        // Providers
        if let Some(provider) = get("EMBEDDING_PROVIDER") {
            let provider: ProviderKind = provider.parse()?;
            if provider != self.embeddings.provider {
                self.embeddings.model = provider.default_embedding_model().to_string();
                self.embeddings.dimensions = provider.default_embedding_dimensions();
                self.embeddings.provider = provider;
            }
        }
        if let Some(model) = get("EMBEDDING_MODEL") {
            self.embeddings.model = model;
        }
        if let Some(provider) = get("LLM_PROVIDER") {
            let provider: ProviderKind = provider.parse()?;
            if provider != self.llm.provider {
                self.llm.model = provider.default_chat_model().to_string();
                self.llm.provider = provider;
            }
        }
        if let Some(model) = get("LLM_MODEL") {
            self.llm.model = model;
        }

        let cohere_key = get("VITE_COHERE_API_KEY").or_else(|| get("COHERE_API_KEY"));
        let openai_key = get("OPENAI_API_KEY");
        let key_for = |provider: ProviderKind| match provider {
            ProviderKind::Cohere => cohere_key.clone(),
            ProviderKind::OpenAi => openai_key.clone(),
        };
        if let Some(key) = key_for(self.embeddings.provider) {
            self.embeddings.api_key = Some(key);
        }
        if let Some(key) = key_for(self.llm.provider) {
            self.llm.api_key = Some(key);
        }
        if let Some(base_url) = get("OPENAI_BASE_URL") {
            if self.embeddings.provider == ProviderKind::OpenAi {
                self.embeddings.base_url = Some(base_url.clone());
            }
            if self.llm.provider == ProviderKind::OpenAi {
                self.llm.base_url = Some(base_url);
            }
        }

        // MongoDB
        if let Some(uri) = get("VITE_MONGO_URI").or_else(|| get("MONGO_URI")) {
            self.mongo.uri = Some(uri);
        }
        if let Some(db) = get("MONGO_DB_NAME") {
            self.mongo.database = db;
        }
        if let Some(collection) = get("MONGO_COLLECTION_NAME") {
            self.mongo.documents_collection = collection;
        }
        if let Some(collection) = get("MONGO_HISTORY_COLLECTION") {
            self.mongo.history_collection = collection;
        }
        if let Some(index) = get("MONGO_VECTOR_INDEX") {
            self.mongo.vector_index = index;
        }

        Ok(())
    }

    /// Check that the selected backends have what they need to start
    pub fn validate(&self) -> Result<()> {
        if self.store == StoreBackend::Mongo && self.mongo.uri.is_none() {
            return Err(Error::Config(
                "VITE_MONGO_URI (or MONGO_URI) must be set for the mongo store".to_string(),
            ));
        }
        if self.embeddings.api_key.is_none() {
            return Err(Error::Config(format!(
                "No API key configured for the {} embedding provider",
                self.embeddings.provider
            )));
        }
        if self.llm.api_key.is_none() {
            return Err(Error::Config(format!(
                "No API key configured for the {} chat model",
                self.llm.provider
            )));
        }
        if self.chat.top_k == 0 {
            return Err(Error::Config("chat.top_k must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

impl ServerConfig {
    /// `host:port` string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Chat handler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Validation, response shape and persistence behaviour
    pub mode: ChatMode,
    /// Number of documents to retrieve per question
    pub top_k: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            mode: ChatMode::default(),
            top_k: 4,
        }
    }
}

/// Hosted API vendor
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Cohere v2 API
    #[default]
    Cohere,
    /// OpenAI or an OpenAI-compatible API
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    fn default_embedding_model(self) -> &'static str {
        match self {
            ProviderKind::Cohere => "embed-english-v3.0",
            ProviderKind::OpenAi => "text-embedding-3-small",
        }
    }

    fn default_embedding_dimensions(self) -> usize {
        match self {
            ProviderKind::Cohere => 1024,
            ProviderKind::OpenAi => 1536,
        }
    }

    fn default_chat_model(self) -> &'static str {
        match self {
            ProviderKind::Cohere => "command-r",
            ProviderKind::OpenAi => "gpt-4o-mini",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cohere" => Ok(ProviderKind::Cohere),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(Error::Config(format!("Unknown provider: {}", other))),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Cohere => write!(f, "cohere"),
            ProviderKind::OpenAi => write!(f, "openai"),
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Which hosted API computes embeddings
    pub provider: ProviderKind,
    /// Model name
    pub model: String,
    /// Embedding dimensions (1024 for embed-english-v3.0)
    pub dimensions: usize,
    /// API key
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Override for the API base URL
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let provider = ProviderKind::Cohere;
        Self {
            provider,
            model: provider.default_embedding_model().to_string(),
            dimensions: provider.default_embedding_dimensions(),
            api_key: None,
            base_url: None,
            timeout_secs: 60,
        }
    }
}

/// Hosted chat model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Which hosted API generates answers
    pub provider: ProviderKind,
    /// Generation model name
    pub model: String,
    /// API key
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Override for the API base URL
    pub base_url: Option<String>,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum tokens in the answer
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let provider = ProviderKind::Cohere;
        Self {
            provider,
            model: provider.default_chat_model().to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: 300,
            timeout_secs: 60,
        }
    }
}

/// MongoDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    /// Connection string
    #[serde(skip_serializing)]
    pub uri: Option<String>,
    /// Database name
    pub database: String,
    /// Collection holding `{text, embedding, metadata}` documents
    pub documents_collection: String,
    /// Collection holding chat history records
    pub history_collection: String,
    /// Atlas Vector Search index name on the documents collection
    pub vector_index: String,
    /// Field holding the embedding vector
    pub embedding_path: String,
    /// Candidates examined per requested result
    pub num_candidates_factor: usize,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: None,
            database: "Stress2Peace".to_string(),
            documents_collection: "documents".to_string(),
            history_collection: "chatHistory".to_string(),
            vector_index: "vector_index".to_string(),
            embedding_path: "embedding".to_string(),
            num_candidates_factor: 10,
        }
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// MongoDB Atlas (documents + history collections)
    #[default]
    Mongo,
    /// Process-local stores, lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(Error::Config(format!("Unknown store backend: {}", other))),
        }
    }
}
