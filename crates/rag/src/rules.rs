use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One policy rule. Loaded once at start; immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRule {
    pub rule: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// Reads a JSON array of rule objects. Each object carries at least a
/// `rule` text field; the source tag defaults to the file name.
pub fn load_rules<P: AsRef<Path>>(path: P) -> Result<Vec<PolicyRule>> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read policy file {}", path.display()))?;
    let mut rules: Vec<PolicyRule> = serde_json::from_str(&data)
        .with_context(|| format!("invalid policy JSON in {}", path.display()))?;
    let default_source = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("policies.json")
        .to_string();
    for rule in &mut rules {
        if rule.source.is_none() {
            rule.source = Some(default_source.clone());
        }
    }
    Ok(rules)
}
