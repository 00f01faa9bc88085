use claims_llm::LlmRequest;

use crate::context::AgentContext;
use crate::error::AgentError;
use crate::router;

pub const NOT_LOADED: &str = "⚠️ Policy database not loaded.";

/// Answers a qualitative question: top-K rule retrieval plus model
/// synthesis over the concatenated rule texts. Retrieval and generation
/// failures propagate to the dispatcher boundary.
pub fn lookup_answer(ctx: &AgentContext, question: &str) -> Result<String, AgentError> {
    let Some(index) = ctx.index.as_ref() else {
        return Ok(NOT_LOADED.to_string());
    };
    let Some(client) = ctx.llm.as_ref() else {
        return Ok(NOT_LOADED.to_string());
    };
    let question = router::clamp(question, router::MAX_QUESTION_CHARS);
    let query_embedding = ctx
        .embedder
        .embed_question(question)
        .map_err(AgentError::execution)?;
    let hits = index.search(&query_embedding, ctx.top_k);
    let context = hits
        .iter()
        .map(|hit| hit.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let request = LlmRequest {
        system: None,
        user: format!("Context: {context}\n\nQuestion: {question}\n\nAnswer based on context:"),
    };
    let response = client.chat_blocking(&request).map_err(AgentError::execution)?;
    Ok(response.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims_core::ClaimTable;
    use claims_llm::{LlmClient, LlmProvider};
    use claims_rag::{PolicyRule, RuleEmbedder, RuleIndex, DEFAULT_HASH_DIMENSIONS};

    fn rule(text: &str) -> PolicyRule {
        PolicyRule {
            rule: text.to_string(),
            source: Some("policies.json".to_string()),
        }
    }

    fn ctx_with_index(rules: Vec<PolicyRule>) -> AgentContext {
        let embedder = RuleEmbedder::hash(DEFAULT_HASH_DIMENSIONS);
        let index = RuleIndex::build(rules, &embedder).unwrap();
        AgentContext {
            table: ClaimTable::default(),
            llm: Some(LlmClient::new(LlmProvider::Local, "local").unwrap()),
            embedder,
            index: Some(index),
            credential_present: true,
            top_k: 4,
        }
    }

    #[test]
    fn missing_index_returns_warning_not_error() {
        let ctx = AgentContext {
            table: ClaimTable::default(),
            llm: Some(LlmClient::new(LlmProvider::Local, "local").unwrap()),
            embedder: RuleEmbedder::hash(DEFAULT_HASH_DIMENSIONS),
            index: None,
            credential_present: true,
            top_k: 4,
        };
        let answer = lookup_answer(&ctx, "What is the appeal window?").unwrap();
        assert_eq!(answer, NOT_LOADED);
    }

    #[test]
    fn retrieves_and_synthesizes_from_matching_rule() {
        let ctx = ctx_with_index(vec![
            rule("Pre-authorization is required for elective cardiology procedures."),
            rule("Claims must be submitted within 60 days of the service date."),
            rule("Denied claims may be appealed within 30 days."),
        ]);
        let answer = lookup_answer(&ctx, "Do I need pre-authorization for cardiology?").unwrap();
        assert!(
            answer.to_lowercase().contains("pre-authorization"),
            "{answer}"
        );
    }
}
