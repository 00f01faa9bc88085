mod claim;
mod dataset;
mod embedding;
mod error;
mod generate;
mod plan;
mod stats;

pub use claim::{ClaimRecord, ClaimStatus, CONDITIONS, DENIAL_REASONS};
pub use dataset::ClaimTable;
pub use embedding::{HashEmbedder, HashEmbedderConfig};
pub use error::{ClaimsError, Result};
pub use generate::{generate_claims, write_claims_csv, DEFAULT_SAMPLE_ROWS};
pub use plan::{GroupColumn, MetricColumn, PlanFilter, PlanOp, QueryPlan};
pub use stats::Kpis;
