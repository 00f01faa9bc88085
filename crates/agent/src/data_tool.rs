use claims_core::{ClaimTable, QueryPlan};
use claims_llm::{LlmClient, LlmRequest};

use crate::context::AgentContext;
use crate::error::AgentError;
use crate::router;

pub const NOT_INITIALIZED: &str = "⚠️ Analysis backend not initialized. Check the API key.";

const PLAN_SYSTEM_PROMPT: &str =
    "You are a claims data analyst. You translate questions into aggregation plans and never guess values.";

/// Answers a quantitative question. The model only ever proposes a
/// constrained JSON plan; the audited executor in claims_core runs it, so no
/// generated code touches the dataset.
pub fn compute_answer(ctx: &AgentContext, question: &str) -> String {
    match try_compute(ctx, question) {
        Ok(answer) => answer,
        Err(AgentError::ToolNotInitialized { .. }) => NOT_INITIALIZED.to_string(),
        Err(err) => format!("Analysis Error: {err}"),
    }
}

fn try_compute(ctx: &AgentContext, question: &str) -> Result<String, AgentError> {
    let client = ctx.llm.as_ref().ok_or(AgentError::ToolNotInitialized {
        tool: "analysis backend",
    })?;
    if ctx.table.is_empty() {
        return Err(AgentError::ToolNotInitialized {
            tool: "claims dataset",
        });
    }
    let plan = request_plan(client, question)?;
    plan.execute(&ctx.table).map_err(AgentError::execution)
}

fn request_plan(client: &LlmClient, question: &str) -> Result<QueryPlan, AgentError> {
    let question = router::clamp(question, router::MAX_QUESTION_CHARS);
    let request = LlmRequest {
        system: Some(PLAN_SYSTEM_PROMPT.to_string()),
        user: plan_prompt(question),
    };
    let response = client.chat_blocking(&request).map_err(AgentError::execution)?;
    QueryPlan::parse(&response.content).map_err(AgentError::execution)
}

fn plan_prompt(question: &str) -> String {
    format!(
        "The full claims dataset is bound as one table with columns:\n{schema}\n\
         Do NOT assume the table is a truncated sample; every aggregation runs over all rows.\n\
         Return ONLY a JSON object describing the aggregation plan, with fields:\n\
         - \"op\": one of \"count\", \"sum\", \"avg\", \"min\", \"max\"\n\
         - \"metric\": \"amount\" (required for sum/avg/min/max)\n\
         - \"filter\": object with optional \"status\", \"condition\", \"denial_reason\", \
           \"service_from\", \"service_to\", \"min_amount\", \"max_amount\"\n\
         - \"group_by\": optional, one of \"status\", \"condition\", \"denial_reason\", \"provider\"\n\
         Question: {question}",
        schema = ClaimTable::schema()
    )
}
