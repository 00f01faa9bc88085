use anyhow::{anyhow, Context, Result};
use reqwest::{header::HeaderValue, Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::env;
use tokio::runtime::Runtime;
use tokio::time::{sleep, Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Groq,
    OpenAi,
    Local,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "groq",
            LlmProvider::OpenAi => "openai",
            LlmProvider::Local => "local",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "groq" => Some(LlmProvider::Groq),
            "openai" => Some(LlmProvider::OpenAi),
            "local" => Some(LlmProvider::Local),
            _ => None,
        }
    }

    /// Environment variable holding the provider credential, if any.
    pub fn credential_var(&self) -> Option<&'static str> {
        match self {
            LlmProvider::Groq => Some("GROQ_API_KEY"),
            LlmProvider::OpenAi => Some("OPENAI_API_KEY"),
            LlmProvider::Local => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    pub system: Option<String>,
    pub user: String,
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    provider: LlmProvider,
    model: String,
    config: ProviderConfig,
}

#[derive(Clone)]
enum ProviderConfig {
    // Groq speaks the OpenAI chat-completions dialect, so both remote
    // providers share one config shape.
    Chat(ChatConfig),
    Local,
}

#[derive(Clone)]
struct ChatConfig {
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(provider: LlmProvider, model: impl Into<String>) -> Result<Self> {
        let model = model.into();
        let http = Client::new();
        let config = match provider {
            LlmProvider::Groq => ProviderConfig::Chat(ChatConfig {
                api_key: read_api_key("GROQ_API_KEY")?,
                base_url: env::var("GROQ_BASE_URL")
                    .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
            }),
            LlmProvider::OpenAi => ProviderConfig::Chat(ChatConfig {
                api_key: read_api_key("OPENAI_API_KEY")?,
                base_url: env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            }),
            LlmProvider::Local => ProviderConfig::Local,
        };
        Ok(Self {
            http,
            provider,
            model,
            config,
        })
    }

    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn chat(&self, req: &LlmRequest) -> Result<LlmResponse> {
        match &self.config {
            ProviderConfig::Chat(cfg) => self.chat_completions(cfg, req).await,
            ProviderConfig::Local => Ok(self.chat_local(req)),
        }
    }

    pub fn chat_blocking(&self, req: &LlmRequest) -> Result<LlmResponse> {
        if matches!(self.config, ProviderConfig::Local) {
            return Ok(self.chat_local(req));
        }
        let rt = Runtime::new().context("failed to create tokio runtime")?;
        rt.block_on(self.chat(req))
    }

    async fn chat_completions(&self, cfg: &ChatConfig, req: &LlmRequest) -> Result<LlmResponse> {
        const MAX_RETRIES: usize = 6;
        let url = format!("{}/chat/completions", cfg.base_url.trim_end_matches('/'));
        let mut messages = Vec::new();
        if let Some(system) = &req.system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": req.user }));
        let payload = json!({
            "model": self.model,
            "temperature": 0,
            "messages": messages,
        });
        let mut attempt = 0usize;
        loop {
            attempt += 1;
            let response = match self
                .http
                .post(&url)
                .bearer_auth(&cfg.api_key)
                .json(&payload)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(err) => {
                    if attempt > MAX_RETRIES {
                        return Err(err)
                            .with_context(|| format!("{} request failed", self.provider.as_str()));
                    }
                    sleep(backoff_delay(attempt, None)).await;
                    continue;
                }
            };
            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                if attempt > MAX_RETRIES {
                    return Err(anyhow!(
                        "{} rate limited after {MAX_RETRIES} retries",
                        self.provider.as_str()
                    ));
                }
                let wait = backoff_delay(attempt, response.headers().get("retry-after"));
                sleep(wait).await;
                continue;
            }
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if !status.is_success() {
                return Err(anyhow!(
                    "{} returned error (status {status}): {body}",
                    self.provider.as_str()
                ));
            }
            let parsed: ChatResponse = serde_json::from_str(&body)
                .with_context(|| format!("failed to decode {} response", self.provider.as_str()))?;
            let text = parsed
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or_else(|| {
                    anyhow!("missing text in {} response", self.provider.as_str())
                })?;
            let usage = parsed.usage.unwrap_or_default();
            return Ok(LlmResponse {
                content: text,
                prompt_tokens: usage.prompt_tokens.unwrap_or(0),
                completion_tokens: usage.completion_tokens.unwrap_or(0),
            });
        }
    }

    fn chat_local(&self, req: &LlmRequest) -> LlmResponse {
        LlmResponse {
            content: synthesize_local_response(req),
            prompt_tokens: 0,
            completion_tokens: 0,
        }
    }
}

fn backoff_delay(attempt: usize, retry_after: Option<&HeaderValue>) -> Duration {
    if let Some(value) = retry_after {
        if let Ok(text) = value.to_str() {
            if let Ok(secs) = text.parse::<u64>() {
                return Duration::from_secs(secs.max(1));
            }
        }
    }
    let capped = attempt.min(6) as u32;
    Duration::from_secs(1u64 << capped)
}

/// Offline provider. Responses are keyed off the prompt shape so routing,
/// planning and synthesis all behave deterministically without a network.
fn synthesize_local_response(req: &LlmRequest) -> String {
    let user_lower = req.user.to_lowercase();
    if user_lower.contains("classify the user question") {
        return classify_stub(&extract_question(&req.user).to_lowercase());
    }
    if user_lower.contains("return only a json object") {
        return plan_stub(&extract_question(&req.user).to_lowercase());
    }
    if user_lower.contains("answer based on context") {
        let context = extract_block(&req.user, "Context:", "Question:");
        if let Some(first) = context.lines().find(|line| !line.trim().is_empty()) {
            return first.trim().to_string();
        }
        return "No matching policy context was found.".to_string();
    }
    summarize_text(&req.user, 40)
}

const DATA_HINTS: [&str; 12] = [
    "how many",
    "count",
    "sum",
    "total",
    "average",
    "mean",
    "trend",
    "amount",
    "rate",
    "highest",
    "lowest",
    "number of",
];

fn classify_stub(question: &str) -> String {
    if DATA_HINTS.iter().any(|hint| question.contains(hint)) {
        "DATA".to_string()
    } else {
        "POLICY".to_string()
    }
}

fn plan_stub(question: &str) -> String {
    let op = if question.contains("average") || question.contains("mean") {
        "avg"
    } else if question.contains("sum") || (question.contains("total") && question.contains("amount"))
    {
        "sum"
    } else {
        "count"
    };
    let mut filter = serde_json::Map::new();
    for status in ["approved", "denied", "pended"] {
        if question.contains(status) {
            filter.insert("status".to_string(), json!(status));
            break;
        }
    }
    for condition in ["diabetes", "cardiology", "respiratory", "hypertension", "orthopedic"] {
        if question.contains(condition) {
            filter.insert("condition".to_string(), json!(condition));
            break;
        }
    }
    let mut plan = json!({ "op": op, "filter": filter });
    if op != "count" {
        plan["metric"] = json!("amount");
    }
    for (marker, column) in [
        ("by condition", "condition"),
        ("by status", "status"),
        ("by provider", "provider"),
        ("per provider", "provider"),
        ("by denial reason", "denial_reason"),
    ] {
        if question.contains(marker) {
            plan["group_by"] = json!(column);
            break;
        }
    }
    plan.to_string()
}

fn extract_question(prompt: &str) -> &str {
    match prompt.rfind("Question:") {
        Some(idx) => prompt[idx + "Question:".len()..].trim(),
        None => prompt.trim(),
    }
}

fn extract_block<'a>(text: &'a str, start_marker: &str, stop_marker: &str) -> &'a str {
    let Some(start_idx) = text.find(start_marker) else {
        return text.trim();
    };
    let after = &text[start_idx + start_marker.len()..];
    match after.find(stop_marker) {
        Some(end_idx) => after[..end_idx].trim(),
        None => after.trim(),
    }
}

fn summarize_text(text: &str, max_words: usize) -> String {
    let cleaned = text
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<&str>>()
        .join(" ");
    cleaned
        .split_whitespace()
        .take(max_words)
        .collect::<Vec<&str>>()
        .join(" ")
}

fn read_api_key(var: &str) -> Result<String> {
    let value = env::var(var).map_err(|_| anyhow!(format!("{var} is not set")))?;
    validate_api_key(var, &value)?;
    Ok(value)
}

fn validate_api_key(var: &str, value: &str) -> Result<()> {
    if var.contains("GROQ") && !value.starts_with("gsk_") {
        return Err(anyhow!(format!("{var} must start with 'gsk_'")));
    }
    if var.contains("OPENAI") && !value.starts_with("sk-") {
        return Err(anyhow!(format!(
            "{} must start with 'sk-' (see https://platform.openai.com/)",
            var
        )));
    }
    Ok(())
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Default, Deserialize)]
struct ChatUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_client() -> LlmClient {
        LlmClient::new(LlmProvider::Local, "local").unwrap()
    }

    #[test]
    fn client_reports_provider_and_model() {
        let client = local_client();
        assert_eq!(client.provider(), LlmProvider::Local);
        assert_eq!(client.model(), "local");
    }

    #[test]
    fn provider_names_roundtrip() {
        for provider in [LlmProvider::Groq, LlmProvider::OpenAi, LlmProvider::Local] {
            assert_eq!(LlmProvider::from_str(provider.as_str()), Some(provider));
        }
        assert_eq!(LlmProvider::from_str("mystery"), None);
    }

    #[test]
    fn local_classification_votes_on_question_not_template() {
        let client = local_client();
        // The template itself mentions counting and amounts; only the
        // trailing question may drive the label.
        let req = LlmRequest {
            system: None,
            user: "Classify the user question into 'DATA' or 'POLICY'.\n\
                   - DATA: counting, math, amounts, trends.\n\
                   - POLICY: rules, definitions, regulations.\n\
                   Question: What does the pre-authorization rule say?"
                .to_string(),
        };
        let resp = client.chat_blocking(&req).unwrap();
        assert_eq!(resp.content, "POLICY");

        let req = LlmRequest {
            system: None,
            user: "Classify the user question into 'DATA' or 'POLICY'.\n\
                   Question: How many claims were denied?"
                .to_string(),
        };
        let resp = client.chat_blocking(&req).unwrap();
        assert_eq!(resp.content, "DATA");
    }

    #[test]
    fn local_plan_is_json_with_op_and_filter() {
        let client = local_client();
        let req = LlmRequest {
            system: None,
            user: "Return ONLY a JSON object describing the aggregation plan.\n\
                   Question: What is the total claim amount for Diabetes?"
                .to_string(),
        };
        let resp = client.chat_blocking(&req).unwrap();
        let value: serde_json::Value = serde_json::from_str(&resp.content).unwrap();
        assert_eq!(value["op"], "sum");
        assert_eq!(value["metric"], "amount");
        assert_eq!(value["filter"]["condition"], "diabetes");
    }

    #[test]
    fn local_synthesis_answers_from_context() {
        let client = local_client();
        let req = LlmRequest {
            system: None,
            user: "Context: Pre-authorization is required for elective procedures.\n\n\
                   Question: Do I need pre-authorization?\n\nAnswer based on context:"
                .to_string(),
        };
        let resp = client.chat_blocking(&req).unwrap();
        assert!(resp.content.contains("Pre-authorization"));
    }

    #[test]
    fn local_responses_are_deterministic() {
        let client = local_client();
        let req = LlmRequest {
            system: None,
            user: "Classify the user question into 'DATA' or 'POLICY'.\nQuestion: How many claims?"
                .to_string(),
        };
        let first = client.chat_blocking(&req).unwrap();
        let second = client.chat_blocking(&req).unwrap();
        assert_eq!(first.content, second.content);
    }
}
