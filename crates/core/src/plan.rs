use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::claim::{ClaimRecord, ClaimStatus};
use crate::dataset::ClaimTable;
use crate::error::{ClaimsError, Result};

/// Aggregation operation requested by the planner model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanOp {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl PlanOp {
    fn as_str(&self) -> &'static str {
        match self {
            PlanOp::Count => "count",
            PlanOp::Sum => "sum",
            PlanOp::Avg => "avg",
            PlanOp::Min => "min",
            PlanOp::Max => "max",
        }
    }
}

/// The only numeric column the audited executor aggregates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricColumn {
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupColumn {
    Status,
    Condition,
    DenialReason,
    Provider,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanFilter {
    #[serde(default)]
    pub status: Option<ClaimStatus>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub denial_reason: Option<String>,
    #[serde(default)]
    pub service_from: Option<NaiveDate>,
    #[serde(default)]
    pub service_to: Option<NaiveDate>,
    #[serde(default)]
    pub min_amount: Option<f64>,
    #[serde(default)]
    pub max_amount: Option<f64>,
}

impl PlanFilter {
    fn matches(&self, row: &ClaimRecord) -> bool {
        if let Some(status) = self.status {
            if row.status != status {
                return false;
            }
        }
        if let Some(condition) = &self.condition {
            if !row.condition.eq_ignore_ascii_case(condition) {
                return false;
            }
        }
        if let Some(reason) = &self.denial_reason {
            match &row.denial_reason {
                Some(actual) if actual.eq_ignore_ascii_case(reason) => {}
                _ => return false,
            }
        }
        if let Some(from) = self.service_from {
            if row.service_date < from {
                return false;
            }
        }
        if let Some(to) = self.service_to {
            if row.service_date > to {
                return false;
            }
        }
        if let Some(min) = self.min_amount {
            if row.amount < min {
                return false;
            }
        }
        if let Some(max) = self.max_amount {
            if row.amount > max {
                return false;
            }
        }
        true
    }
}

/// A constrained aggregation plan. The model proposes one of these as JSON;
/// only this fixed executor ever touches the dataset, so no generated code
/// runs against the rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryPlan {
    pub op: PlanOp,
    #[serde(default)]
    pub metric: Option<MetricColumn>,
    #[serde(default)]
    pub filter: PlanFilter,
    #[serde(default)]
    pub group_by: Option<GroupColumn>,
}

impl QueryPlan {
    /// Extracts the first JSON object from a model response, tolerating code
    /// fences and surrounding prose.
    pub fn parse(raw: &str) -> Result<Self> {
        let body = strip_fences(raw);
        let start = body
            .find('{')
            .ok_or_else(|| ClaimsError::InvalidPlan("no JSON object in response".to_string()))?;
        let end = body
            .rfind('}')
            .ok_or_else(|| ClaimsError::InvalidPlan("unterminated JSON object".to_string()))?;
        if end < start {
            return Err(ClaimsError::InvalidPlan("malformed JSON object".to_string()));
        }
        let plan: QueryPlan = serde_json::from_str(&body[start..=end])
            .map_err(|e| ClaimsError::InvalidPlan(e.to_string()))?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> Result<()> {
        match self.op {
            PlanOp::Count => Ok(()),
            _ if self.metric.is_none() => Err(ClaimsError::InvalidPlan(format!(
                "{} requires a metric column",
                self.op.as_str()
            ))),
            _ => Ok(()),
        }
    }

    pub fn execute(&self, table: &ClaimTable) -> Result<String> {
        self.validate()?;
        let selected: Vec<&ClaimRecord> =
            table.rows().iter().filter(|row| self.filter.matches(row)).collect();
        match self.group_by {
            Some(column) => Ok(self.execute_grouped(&selected, column)),
            None => Ok(self.execute_flat(&selected)),
        }
    }

    fn execute_flat(&self, rows: &[&ClaimRecord]) -> String {
        match self.op {
            PlanOp::Count => format!("{} claims match the query.", rows.len()),
            PlanOp::Sum => format!(
                "Total amount: ${:.2} across {} claims.",
                rows.iter().map(|r| r.amount).sum::<f64>(),
                rows.len()
            ),
            PlanOp::Avg => {
                if rows.is_empty() {
                    return "No claims match the query.".to_string();
                }
                let sum: f64 = rows.iter().map(|r| r.amount).sum();
                format!(
                    "Average amount: ${:.2} across {} claims.",
                    sum / rows.len() as f64,
                    rows.len()
                )
            }
            PlanOp::Min | PlanOp::Max => {
                let mut amounts: Vec<f64> = rows.iter().map(|r| r.amount).collect();
                amounts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                let picked = match self.op {
                    PlanOp::Min => amounts.first(),
                    _ => amounts.last(),
                };
                match picked {
                    Some(value) => format!(
                        "{} amount: ${:.2} across {} claims.",
                        if self.op == PlanOp::Min { "Minimum" } else { "Maximum" },
                        value,
                        rows.len()
                    ),
                    None => "No claims match the query.".to_string(),
                }
            }
        }
    }

    fn execute_grouped(&self, rows: &[&ClaimRecord], column: GroupColumn) -> String {
        let mut groups: BTreeMap<String, Vec<&ClaimRecord>> = BTreeMap::new();
        for row in rows {
            let key = match column {
                GroupColumn::Status => row.status.as_str().to_string(),
                GroupColumn::Condition => row.condition.clone(),
                GroupColumn::DenialReason => row
                    .denial_reason
                    .clone()
                    .unwrap_or_else(|| "(none)".to_string()),
                GroupColumn::Provider => row.provider_id.clone(),
            };
            groups.entry(key).or_default().push(row);
        }
        if groups.is_empty() {
            return "No claims match the query.".to_string();
        }
        let mut out = String::new();
        for (key, members) in groups {
            let line = match self.op {
                PlanOp::Count => format!("{key}: {} claims", members.len()),
                PlanOp::Sum => format!(
                    "{key}: ${:.2}",
                    members.iter().map(|r| r.amount).sum::<f64>()
                ),
                PlanOp::Avg => format!(
                    "{key}: ${:.2}",
                    members.iter().map(|r| r.amount).sum::<f64>() / members.len() as f64
                ),
                PlanOp::Min => format!(
                    "{key}: ${:.2}",
                    members
                        .iter()
                        .map(|r| r.amount)
                        .fold(f64::INFINITY, f64::min)
                ),
                PlanOp::Max => format!(
                    "{key}: ${:.2}",
                    members
                        .iter()
                        .map(|r| r.amount)
                        .fold(f64::NEG_INFINITY, f64::max)
                ),
            };
            out.push_str(&line);
            out.push('\n');
        }
        out.trim_end().to_string()
    }
}

fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
        if let Some(end) = rest.rfind("```") {
            return &rest[..end];
        }
        return rest;
    }
    trimmed
}
