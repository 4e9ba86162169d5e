use std::path::Path;

use serde::Serialize;

use crate::config::ScrubConfig;
use crate::data::dedup::{DuplicateCheck, first_duplicate};
use crate::data::identifier::{is_valid_identifier, normalize};
use crate::data::model::RawRecord;
use crate::pipeline::{BatchSummary, run_batch, run_source, sanitize_record};
use crate::vault::Vault;

// ---------------------------------------------------------------------------
// Results handed back to the caller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierCheck {
    pub id: String,
    pub normalized: String,
    pub valid: bool,
}

/// Outcome of sanitizing a single record without storing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SanitizeResult {
    Clean { id: String, vitals: Vec<f64> },
    Rejected { id: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineResult {
    Success(BatchSummary),
    Error { message: String },
}

/// A lookup never says why a record is missing: never ingested and
/// rejected look the same.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Lookup {
    Found { id: String, vitals: Vec<f64> },
    NotFound { id: String },
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Owns the vault and the scrubber configuration and exposes the data
/// integrity operations with plain, serializable results.
///
/// Batch runs take `&mut self`; share the service across threads only
/// behind a lock.
#[derive(Debug, Default)]
pub struct IntegrityService {
    vault: Vault,
    config: ScrubConfig,
}

impl IntegrityService {
    pub fn new(config: ScrubConfig) -> Self {
        Self {
            vault: Vault::new(),
            config,
        }
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn check_duplicates(&self, values: &[i64]) -> DuplicateCheck<i64> {
        first_duplicate(values.iter().copied())
    }

    pub fn validate_identifier(&self, id: &str) -> IdentifierCheck {
        IdentifierCheck {
            id: id.to_string(),
            normalized: normalize(id),
            valid: is_valid_identifier(id),
        }
    }

    /// Validate and scrub one record. The vault is not consulted or changed.
    pub fn sanitize(&self, id: &str, vitals: &str) -> SanitizeResult {
        match sanitize_record(RawRecord::new(id, vitals), &self.config) {
            Ok(record) => SanitizeResult::Clean {
                id: record.id().to_string(),
                vitals: record.vitals().to_vec(),
            },
            Err(reason) => SanitizeResult::Rejected {
                id: id.to_string(),
                reason: reason.to_string(),
            },
        }
    }

    /// Ingest a tabular file into the vault.
    pub fn run_pipeline(&mut self, path: &Path) -> PipelineResult {
        run_source(&mut self.vault, path, &self.config).into()
    }

    /// Ingest records already in memory.
    pub fn ingest_records<I>(&mut self, records: I) -> PipelineResult
    where
        I: IntoIterator<Item = RawRecord>,
    {
        run_batch(&mut self.vault, records.into_iter().map(Ok), &self.config).into()
    }

    pub fn retrieve(&self, id: &str) -> Lookup {
        match self.vault.get(id) {
            Some(vitals) => Lookup::Found {
                id: id.to_string(),
                vitals: vitals.to_vec(),
            },
            None => Lookup::NotFound { id: id.to_string() },
        }
    }
}

impl From<crate::error::Result<BatchSummary>> for PipelineResult {
    fn from(result: crate::error::Result<BatchSummary>) -> Self {
        match result {
            Ok(summary) => PipelineResult::Success(summary),
            Err(e) => PipelineResult::Error {
                message: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn duplicate_message_matches_first_repeat() {
        let service = IntegrityService::default();
        assert_eq!(
            service.check_duplicates(&[1, 2, 3, 2, 1]).to_string(),
            "Duplicate detected: 2"
        );
    }

    #[test]
    fn sanitize_does_not_store() {
        let service = IntegrityService::default();
        let result = service.sanitize("race car", "1,2,3,2,1000");
        assert_eq!(
            result,
            SanitizeResult::Clean {
                id: "race car".into(),
                vitals: vec![1.0, 2.0, 3.0, 2.0],
            }
        );
        assert!(service.vault().is_empty());
    }

    #[test]
    fn sanitize_reports_reason() {
        let service = IntegrityService::default();
        match service.sanitize("abc", "1,2,3") {
            SanitizeResult::Rejected { reason, .. } => assert_eq!(reason, "invalid identifier"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn lookup_serializes_with_status_tag() {
        let mut service = IntegrityService::default();
        service.ingest_records([RawRecord::new("wow", "1,2")]);

        let found = serde_json::to_value(service.retrieve("wow")).unwrap();
        assert_eq!(found, json!({"status": "found", "id": "wow", "vitals": [1.0, 2.0]}));

        let missing = serde_json::to_value(service.retrieve("nope")).unwrap();
        assert_eq!(missing, json!({"status": "not_found", "id": "nope"}));
    }

    #[test]
    fn missing_source_is_an_error_result() {
        let mut service = IntegrityService::default();
        let result = service.run_pipeline(Path::new("/no/such/file.csv"));
        match result {
            PipelineResult::Error { message } => assert!(message.contains("not found")),
            other => panic!("expected error, got {other:?}"),
        }
        assert!(service.vault().is_empty());
    }

    #[test]
    fn pipeline_success_serializes_counts() {
        let mut service = IntegrityService::default();
        let result = service.ingest_records([
            RawRecord::new("noon", "5,5,5"),
            RawRecord::new("noon", "5,5,5"),
        ]);
        assert_eq!(
            serde_json::to_value(result).unwrap(),
            json!({
                "status": "success",
                "successful": 1,
                "duplicates": 1,
                "invalid_ids": 0,
                "vault_size": 1
            })
        );
    }
}
