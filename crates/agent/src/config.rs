use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use claims_llm::LlmProvider;
use claims_rag::DEFAULT_HASH_DIMENSIONS;

pub const DEFAULT_TOP_K: usize = 4;

const DEFAULT_OPENAI_EMBEDDING_MODEL: &str = "text-embedding-3-small";

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub data_path: PathBuf,
    pub policies_path: PathBuf,
    pub embedding: EmbeddingBackend,
    pub top_k: usize,
    pub sample_rows: usize,
}

/// Which embedder the policy index uses. Hash is the default and needs no
/// credential; openai requires OPENAI_API_KEY at context build time.
#[derive(Debug, Clone)]
pub enum EmbeddingBackend {
    Hash { dimensions: usize },
    OpenAi { model: String },
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        let provider_name = env::var("CLAIMSBOT_PROVIDER").unwrap_or_else(|_| "groq".to_string());
        let provider = LlmProvider::from_str(&provider_name)
            .ok_or_else(|| anyhow!(format!("unknown provider {provider_name}")))?;
        let model =
            env::var("CLAIMSBOT_MODEL").unwrap_or_else(|_| default_model(provider).to_string());
        let data_path = env::var("CLAIMSBOT_DATA")
            .unwrap_or_else(|_| "medical_claims.csv".to_string())
            .into();
        let policies_path = env::var("CLAIMSBOT_POLICIES")
            .unwrap_or_else(|_| "policies.json".to_string())
            .into();
        let embedding = embedding_backend(
            &env::var("EMBEDDING_PROVIDER").unwrap_or_else(|_| "hash".to_string()),
            env::var("EMBEDDING_MODEL").ok(),
            env::var("HASH_EMBED_DIMENSIONS")
                .ok()
                .and_then(|v| v.parse().ok()),
        )?;
        let top_k = env::var("CLAIMSBOT_TOP_K")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TOP_K);
        let sample_rows = env::var("CLAIMSBOT_SAMPLE_ROWS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(claims_core::DEFAULT_SAMPLE_ROWS);
        Ok(Self {
            provider,
            model,
            data_path,
            policies_path,
            embedding,
            top_k,
            sample_rows,
        })
    }

    /// Whether the provider credential is present. The local provider needs
    /// none, so it always counts as configured.
    pub fn has_credential(&self) -> bool {
        match self.provider.credential_var() {
            None => true,
            Some(var) => env::var(var)
                .map(|value| !value.trim().is_empty())
                .unwrap_or(false),
        }
    }
}

fn default_model(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::Groq => "llama-3.3-70b-versatile",
        LlmProvider::OpenAi => "gpt-4.1-mini",
        LlmProvider::Local => "local",
    }
}

fn embedding_backend(
    provider: &str,
    model: Option<String>,
    dimensions: Option<usize>,
) -> Result<EmbeddingBackend> {
    match provider.trim().to_lowercase().as_str() {
        "hash" => Ok(EmbeddingBackend::Hash {
            dimensions: dimensions.unwrap_or(DEFAULT_HASH_DIMENSIONS),
        }),
        "openai" => Ok(EmbeddingBackend::OpenAi {
            model: model.unwrap_or_else(|| DEFAULT_OPENAI_EMBEDDING_MODEL.to_string()),
        }),
        other => Err(anyhow!(format!("unknown embedding provider {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_provider_counts_as_configured() {
        let config = AgentConfig {
            provider: LlmProvider::Local,
            model: "local".to_string(),
            data_path: "claims.csv".into(),
            policies_path: "policies.json".into(),
            embedding: EmbeddingBackend::Hash {
                dimensions: DEFAULT_HASH_DIMENSIONS,
            },
            top_k: DEFAULT_TOP_K,
            sample_rows: 100,
        };
        assert!(config.has_credential());
    }

    #[test]
    fn embedding_backend_defaults_to_hash_with_standard_dimensions() {
        let backend = embedding_backend("hash", None, None).unwrap();
        assert!(matches!(
            backend,
            EmbeddingBackend::Hash { dimensions } if dimensions == DEFAULT_HASH_DIMENSIONS
        ));
    }

    #[test]
    fn embedding_backend_honors_overrides() {
        let backend = embedding_backend("hash", None, Some(128)).unwrap();
        assert!(matches!(backend, EmbeddingBackend::Hash { dimensions: 128 }));
        let backend = embedding_backend("openai", Some("text-embedding-3-large".into()), None).unwrap();
        assert!(matches!(
            backend,
            EmbeddingBackend::OpenAi { model } if model == "text-embedding-3-large"
        ));
    }

    #[test]
    fn embedding_backend_rejects_unknown_provider() {
        assert!(embedding_backend("word2vec", None, None).is_err());
    }
}
