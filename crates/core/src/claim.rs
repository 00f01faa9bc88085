use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ClaimsError;

pub const CONDITIONS: [&str; 5] = [
    "Diabetes",
    "Cardiology",
    "Respiratory",
    "Hypertension",
    "Orthopedic",
];

pub const DENIAL_REASONS: [&str; 4] = [
    "eligibility",
    "medical_necessity",
    "pre-auth_missing",
    "coding_error",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Approved,
    Denied,
    Pended,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Approved => "approved",
            ClaimStatus::Denied => "denied",
            ClaimStatus::Pended => "pended",
        }
    }

    pub fn from_str(value: &str) -> std::result::Result<Self, ClaimsError> {
        match value.trim().to_lowercase().as_str() {
            "approved" => Ok(ClaimStatus::Approved),
            "denied" => Ok(ClaimStatus::Denied),
            "pended" => Ok(ClaimStatus::Pended),
            other => Err(ClaimsError::UnknownStatus(other.to_string())),
        }
    }
}

/// One row of the claims dataset. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub claim_id: String,
    pub patient_id: String,
    pub provider_id: String,
    pub service_date: NaiveDate,
    pub submission_date: NaiveDate,
    pub status: ClaimStatus,
    pub denial_reason: Option<String>,
    pub amount: f64,
    pub condition: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrips_through_str() {
        for status in [ClaimStatus::Approved, ClaimStatus::Denied, ClaimStatus::Pended] {
            assert_eq!(ClaimStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn status_rejects_unknown_values() {
        assert!(ClaimStatus::from_str("rejected").is_err());
    }
}
