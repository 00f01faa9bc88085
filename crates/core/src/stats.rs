use crate::claim::ClaimStatus;
use crate::dataset::ClaimTable;

/// Dashboard KPIs computed over the full table.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub total_claims: usize,
    pub total_amount: f64,
    pub denied_claims: usize,
    pub denial_rate_pct: f64,
}

impl Kpis {
    pub fn measure(table: &ClaimTable) -> Self {
        let total_claims = table.len();
        let total_amount = table.rows().iter().map(|r| r.amount).sum();
        let denied_claims = table
            .rows()
            .iter()
            .filter(|r| r.status == ClaimStatus::Denied)
            .count();
        let denial_rate_pct = if total_claims == 0 {
            0.0
        } else {
            denied_claims as f64 / total_claims as f64 * 100.0
        };
        Self {
            total_claims,
            total_amount,
            denied_claims,
            denial_rate_pct,
        }
    }
}
