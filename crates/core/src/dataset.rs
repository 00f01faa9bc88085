use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;

use crate::claim::ClaimRecord;
use crate::error::{ClaimsError, Result};

/// The read-only claims table. Built once at process start; queries only
/// ever borrow the rows.
#[derive(Debug, Clone, Default)]
pub struct ClaimTable {
    rows: Vec<ClaimRecord>,
}

impl ClaimTable {
    pub fn from_rows(rows: Vec<ClaimRecord>) -> Self {
        Self { rows }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ClaimsError::DatasetMissing(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new().from_reader(file);
        let mut rows = Vec::new();
        for record in reader.deserialize() {
            let record: ClaimRecord = record?;
            rows.push(record);
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ClaimRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column description handed to the planner prompt.
    pub fn schema() -> &'static str {
        "claim_id (text), patient_id (text), provider_id (text), \
         service_date (date), submission_date (date), \
         status (approved | denied | pended), denial_reason (text, nullable), \
         amount (decimal), condition (text)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_parses_rows_and_nullable_reason() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "claim_id,patient_id,provider_id,service_date,submission_date,status,denial_reason,amount,condition"
        )
        .unwrap();
        writeln!(
            file,
            "C100000,P1000,D200,2023-01-05,2023-01-20,denied,eligibility,412.50,Diabetes"
        )
        .unwrap();
        writeln!(
            file,
            "C100001,P1001,D201,2023-02-10,2023-02-11,approved,,999.99,Cardiology"
        )
        .unwrap();
        let table = ClaimTable::load(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].denial_reason.as_deref(), Some("eligibility"));
        assert!(table.rows()[1].denial_reason.is_none());
        assert_eq!(table.rows()[1].amount, 999.99);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ClaimTable::load("definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, ClaimsError::DatasetMissing(_)));
    }
}
