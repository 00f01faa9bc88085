pub mod embedding;
pub mod index;
pub mod rules;

pub use embedding::{OpenAiEmbedder, RuleEmbedder, DEFAULT_HASH_DIMENSIONS};
pub use index::{RuleIndex, ScoredRule};
pub use rules::{load_rules, PolicyRule};
