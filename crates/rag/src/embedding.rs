use anyhow::{anyhow, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::env;

use claims_core::{HashEmbedder, HashEmbedderConfig};

use crate::rules::PolicyRule;

pub const DEFAULT_HASH_DIMENSIONS: usize = 64;

const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// Embeds rule texts when the index is built and questions at query time.
/// Those two entry points are the whole surface: the index is immutable, so
/// nothing ever re-embeds a single rule after construction.
pub enum RuleEmbedder {
    Hash(HashEmbedder),
    OpenAi(OpenAiEmbedder),
}

impl RuleEmbedder {
    pub fn hash(dimensions: usize) -> Self {
        RuleEmbedder::Hash(HashEmbedder::new(HashEmbedderConfig {
            dimensions,
            ..HashEmbedderConfig::default()
        }))
    }

    pub fn openai(model: &str) -> Result<Self> {
        Ok(RuleEmbedder::OpenAi(OpenAiEmbedder::new(model)?))
    }

    /// Batch-embeds every rule, in order.
    pub fn embed_rules(&self, rules: &[PolicyRule]) -> Result<Vec<Vec<f32>>> {
        match self {
            RuleEmbedder::Hash(embedder) => Ok(rules
                .iter()
                .map(|rule| embedder.embed_text(&rule.rule))
                .collect()),
            RuleEmbedder::OpenAi(client) => {
                let texts: Vec<&str> = rules.iter().map(|rule| rule.rule.as_str()).collect();
                client.embed(&texts)
            }
        }
    }

    pub fn embed_question(&self, question: &str) -> Result<Vec<f32>> {
        match self {
            RuleEmbedder::Hash(embedder) => Ok(embedder.embed_text(question)),
            RuleEmbedder::OpenAi(client) => client
                .embed(&[question])?
                .pop()
                .ok_or_else(|| anyhow!("openai returned no embedding for the question")),
        }
    }
}

pub struct OpenAiEmbedder {
    http: Client,
    model: String,
    api_key: String,
}

impl OpenAiEmbedder {
    fn new(model: &str) -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY is required for openai embeddings"))?;
        Ok(Self {
            http: Client::new(),
            model: model.to_string(),
            api_key,
        })
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let payload = serde_json::json!({
            "model": self.model,
            "input": texts,
        });
        let response = self
            .http
            .post(OPENAI_EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "openai embeddings request failed: {}",
                response.status()
            ));
        }
        let parsed: EmbeddingsResponse = response.json()?;
        if parsed.data.len() != texts.len() {
            return Err(anyhow!(
                "openai returned {} embeddings for {} inputs",
                parsed.data.len(),
                texts.len()
            ));
        }
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
