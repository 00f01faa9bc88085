use crate::context::AgentContext;
use crate::data_tool;
use crate::error::AgentError;
use crate::policy_tool;
use crate::router::{self, Intent};

pub const CONFIG_ERROR: &str =
    "❌ Model credential not found. Please set GROQ_API_KEY (or your provider's key) in the environment.";

/// The entire external API surface of the core: one question in, one answer
/// string out. No error value or panic ever crosses this boundary.
pub fn ask_bot(ctx: &AgentContext, question: &str) -> String {
    match dispatch(ctx, question) {
        Ok(answer) => answer,
        Err(AgentError::ConfigurationMissing) => CONFIG_ERROR.to_string(),
        Err(err) => format!("System Error: {err}"),
    }
}

fn dispatch(ctx: &AgentContext, question: &str) -> Result<String, AgentError> {
    if !ctx.credential_present {
        return Err(AgentError::ConfigurationMissing);
    }
    match router::classify(ctx.llm.as_ref(), question) {
        Intent::Data => Ok(data_tool::compute_answer(ctx, question)),
        Intent::Policy => policy_tool::lookup_answer(ctx, question),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use claims_core::{ClaimRecord, ClaimStatus, ClaimTable};
    use claims_llm::{LlmClient, LlmProvider};
    use claims_rag::{PolicyRule, RuleEmbedder, RuleIndex, DEFAULT_HASH_DIMENSIONS};

    fn row(i: usize, status: ClaimStatus) -> ClaimRecord {
        ClaimRecord {
            claim_id: format!("C{}", 100_000 + i),
            patient_id: format!("P{}", 1000 + i % 500),
            provider_id: format!("D{}", 200 + i % 150),
            service_date: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
            submission_date: NaiveDate::from_ymd_opt(2023, 4, 15).unwrap(),
            status,
            denial_reason: (status == ClaimStatus::Denied).then(|| "eligibility".to_string()),
            amount: 250.0,
            condition: "Diabetes".to_string(),
        }
    }

    fn rules() -> Vec<PolicyRule> {
        [
            "Pre-authorization is required for elective cardiology procedures.",
            "Claims must be submitted within 60 days of the service date.",
            "Denied claims may be appealed within 30 days.",
        ]
        .iter()
        .map(|text| PolicyRule {
            rule: text.to_string(),
            source: Some("policies.json".to_string()),
        })
        .collect()
    }

    fn full_context() -> AgentContext {
        // 1000 rows, 250 of them denied.
        let rows = (0..1000)
            .map(|i| {
                row(
                    i,
                    if i % 4 == 0 {
                        ClaimStatus::Denied
                    } else {
                        ClaimStatus::Approved
                    },
                )
            })
            .collect();
        let embedder = RuleEmbedder::hash(DEFAULT_HASH_DIMENSIONS);
        let index = RuleIndex::build(rules(), &embedder).unwrap();
        AgentContext {
            table: ClaimTable::from_rows(rows),
            llm: Some(LlmClient::new(LlmProvider::Local, "local").unwrap()),
            embedder,
            index: Some(index),
            credential_present: true,
            top_k: 4,
        }
    }

    #[test]
    fn missing_credential_short_circuits_before_any_tool() {
        let ctx = AgentContext {
            table: ClaimTable::default(),
            llm: None,
            embedder: RuleEmbedder::hash(DEFAULT_HASH_DIMENSIONS),
            index: None,
            credential_present: false,
            top_k: 4,
        };
        assert_eq!(ask_bot(&ctx, "anything"), CONFIG_ERROR);
    }

    #[test]
    fn data_question_is_computed_not_retrieved() {
        let ctx = full_context();
        let answer = ask_bot(&ctx, "How many claims were denied?");
        assert!(answer.contains("250"), "{answer}");
        assert!(!answer.contains("Pre-authorization"), "{answer}");
    }

    #[test]
    fn policy_question_is_retrieved_not_computed() {
        let ctx = full_context();
        let answer = ask_bot(&ctx, "Do I need pre-authorization for cardiology?");
        assert!(answer.to_lowercase().contains("pre-authorization"), "{answer}");
        assert!(!answer.contains("claims match the query"), "{answer}");
    }

    #[test]
    fn policy_question_without_index_degrades_to_warning() {
        let mut ctx = full_context();
        ctx.index = None;
        let answer = ask_bot(&ctx, "What does the appeal policy say?");
        assert_eq!(answer, crate::policy_tool::NOT_LOADED);
    }

    #[test]
    fn data_question_without_backend_degrades_to_warning() {
        let mut ctx = full_context();
        ctx.llm = None;
        // With no classifier the router defaults to data, and the data tool
        // reports its own warning string.
        let answer = ask_bot(&ctx, "How many claims were denied?");
        assert_eq!(answer, crate::data_tool::NOT_INITIALIZED);
    }

    #[test]
    fn answers_are_deterministic_with_fixed_model_output() {
        let ctx = full_context();
        let question = "How many claims were denied?";
        assert_eq!(ask_bot(&ctx, question), ask_bot(&ctx, question));
    }
}
