use thiserror::Error;

/// Internal error taxonomy. Nothing here ever crosses the dispatcher
/// boundary as an error value; `ask_bot` renders the final string.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("model credential is not configured")]
    ConfigurationMissing,
    #[error("{tool} is not initialized")]
    ToolNotInitialized { tool: &'static str },
    #[error("{0}")]
    Execution(String),
}

impl AgentError {
    pub fn execution(err: impl std::fmt::Display) -> Self {
        AgentError::Execution(err.to_string())
    }
}
