use anyhow::{Context, Result};
use rand::thread_rng;

use claims_core::{generate_claims, write_claims_csv, ClaimTable};
use claims_llm::LlmClient;
use claims_rag::{load_rules, RuleEmbedder, RuleIndex, DEFAULT_HASH_DIMENSIONS};

use crate::config::{AgentConfig, EmbeddingBackend};

/// Everything the router and tools need, built once at process start and
/// passed by reference. The table and index are read-only after this.
pub struct AgentContext {
    pub table: ClaimTable,
    pub llm: Option<LlmClient>,
    pub embedder: RuleEmbedder,
    pub index: Option<RuleIndex>,
    pub credential_present: bool,
    pub top_k: usize,
}

impl AgentContext {
    pub fn initialize(config: &AgentConfig) -> Result<Self> {
        if !config.data_path.exists() {
            let rows = generate_claims(config.sample_rows, &mut thread_rng());
            write_claims_csv(&config.data_path, &rows).with_context(|| {
                format!("failed to write sample CSV {}", config.data_path.display())
            })?;
        }
        let table = ClaimTable::load(&config.data_path)
            .with_context(|| format!("failed to load dataset {}", config.data_path.display()))?;
        let credential_present = config.has_credential();
        // A bad key or unreachable provider degrades to the fallback strings
        // instead of failing startup.
        let llm = if credential_present {
            LlmClient::new(config.provider, config.model.clone()).ok()
        } else {
            None
        };
        // An openai embedder without its key falls back to the hash embedder
        // rather than failing startup.
        let embedder = match &config.embedding {
            EmbeddingBackend::Hash { dimensions } => RuleEmbedder::hash(*dimensions),
            EmbeddingBackend::OpenAi { model } => RuleEmbedder::openai(model)
                .unwrap_or_else(|_| RuleEmbedder::hash(DEFAULT_HASH_DIMENSIONS)),
        };
        let index = if config.policies_path.exists() {
            let rules = load_rules(&config.policies_path)?;
            Some(RuleIndex::build(rules, &embedder)?)
        } else {
            None
        };
        Ok(Self {
            table,
            llm,
            embedder,
            index,
            credential_present,
            top_k: config.top_k,
        })
    }
}
