use claims_llm::{LlmClient, LlmRequest};

/// Two-valued classification of an incoming question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Data,
    Policy,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Data => "DATA",
            Intent::Policy => "POLICY",
        }
    }

    /// Substring tie-break: any response containing "DATA" counts as data,
    /// everything else (including garbage) falls back to policy. This exact
    /// behavior is load-bearing; do not tighten it to a strict parse.
    pub fn from_response(raw: &str) -> Self {
        if raw.trim().to_uppercase().contains("DATA") {
            Intent::Data
        } else {
            Intent::Policy
        }
    }
}

const CLASSIFY_TEMPLATE: &str = "Classify the user question into 'DATA' or 'POLICY'.\n\
- DATA: questions about counting, math, amounts, trends, statistics, or 'how many'.\n\
- POLICY: questions about rules, definitions, regulations, reasons, or text explanation.\n\
\n\
Return ONLY the word \"DATA\" or \"POLICY\".";

pub const MAX_QUESTION_CHARS: usize = 2000;

/// Classifies a question. With no classifier configured, or when the call
/// fails, the router defaults to data rather than failing the request.
pub fn classify(client: Option<&LlmClient>, question: &str) -> Intent {
    let Some(client) = client else {
        return Intent::Data;
    };
    let question = clamp(question, MAX_QUESTION_CHARS);
    let request = LlmRequest {
        system: None,
        user: format!("{CLASSIFY_TEMPLATE}\nQuestion: {question}"),
    };
    match client.chat_blocking(&request) {
        Ok(response) => Intent::from_response(&response.content),
        Err(_) => Intent::Data,
    }
}

pub(crate) fn clamp(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
