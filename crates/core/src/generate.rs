use std::fs::File;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_distr::Normal;

use crate::claim::{ClaimRecord, ClaimStatus, CONDITIONS, DENIAL_REASONS};
use crate::error::Result;

pub const DEFAULT_SAMPLE_ROWS: usize = 2000;

const SERVICE_WINDOW_DAYS: i64 = 900;
const SUBMISSION_LAG_DAYS: i64 = 60;
const STATUS_WEIGHTS: [f64; 3] = [0.70, 0.25, 0.05];
const AMOUNT_MEAN: f64 = 500.0;
const AMOUNT_STDDEV: f64 = 800.0;
const AMOUNT_FLOOR: f64 = 10.0;

/// Synthesizes claim rows with the fixed demo distribution: 70/25/5 status
/// split, bounded-below Gaussian amounts, service dates over a 900-day
/// window and submission up to 60 days later.
pub fn generate_claims<R: Rng>(n: usize, rng: &mut R) -> Vec<ClaimRecord> {
    let statuses = [ClaimStatus::Approved, ClaimStatus::Denied, ClaimStatus::Pended];
    let status_picker = WeightedIndex::new(STATUS_WEIGHTS).expect("static weights are valid");
    let amount_dist = Normal::new(AMOUNT_MEAN, AMOUNT_STDDEV).expect("static params are valid");
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid start date");
    let mut rows = Vec::with_capacity(n);
    for i in 0..n {
        let service_date = start + Duration::days(rng.gen_range(0..=SERVICE_WINDOW_DAYS));
        let submission_date = service_date + Duration::days(rng.gen_range(0..=SUBMISSION_LAG_DAYS));
        let status = statuses[status_picker.sample(rng)];
        let amount = (amount_dist.sample(rng).max(AMOUNT_FLOOR) * 100.0).round() / 100.0;
        let denial_reason = if status == ClaimStatus::Denied {
            Some(DENIAL_REASONS[rng.gen_range(0..DENIAL_REASONS.len())].to_string())
        } else {
            None
        };
        rows.push(ClaimRecord {
            claim_id: format!("C{}", 100_000 + i),
            patient_id: format!("P{}", 1000 + (i % 500)),
            provider_id: format!("D{}", 200 + (i % 150)),
            service_date,
            submission_date,
            status,
            denial_reason,
            amount,
            condition: CONDITIONS[rng.gen_range(0..CONDITIONS.len())].to_string(),
        });
    }
    rows
}

pub fn write_claims_csv<P: AsRef<Path>>(path: P, rows: &[ClaimRecord]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
