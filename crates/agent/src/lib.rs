pub mod config;
pub mod context;
pub mod data_tool;
pub mod dispatch;
pub mod error;
pub mod policy_tool;
pub mod router;

pub use config::{AgentConfig, EmbeddingBackend};
pub use context::AgentContext;
pub use dispatch::{ask_bot, CONFIG_ERROR};
pub use error::AgentError;
pub use router::Intent;
