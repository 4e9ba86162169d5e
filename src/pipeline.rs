use std::fmt;
use std::path::Path;

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::ScrubConfig;
use crate::data::identifier::is_valid_identifier;
use crate::data::loader::open_rows;
use crate::data::model::{RawRecord, ReadingParseError, SanitizedRecord, parse_readings};
use crate::data::scrub::scrub_outliers;
use crate::error::{IntegrityError, Result};
use crate::vault::Vault;

// ---------------------------------------------------------------------------
// Per-record outcome
// ---------------------------------------------------------------------------

/// Why a record did not make it into the vault.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// The identifier is already a vault key.
    Duplicate,
    /// The identifier is not a palindrome after normalization.
    InvalidId,
    MalformedVitals(ReadingParseError),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Duplicate => write!(f, "duplicate identifier"),
            Rejection::InvalidId => write!(f, "invalid identifier"),
            Rejection::MalformedVitals(e) => write!(f, "malformed vitals: {e}"),
        }
    }
}

/// Terminal state of one record. Rejected records are never retried.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Sanitized,
    Rejected(Rejection),
}

/// Validate the identifier, parse and scrub the readings.
///
/// This is the only way to build a [`SanitizedRecord`].
pub fn sanitize_record(
    raw: RawRecord,
    config: &ScrubConfig,
) -> std::result::Result<SanitizedRecord, Rejection> {
    if !is_valid_identifier(&raw.id) {
        return Err(Rejection::InvalidId);
    }
    let readings = parse_readings(&raw.vitals).map_err(Rejection::MalformedVitals)?;
    let cleaned = scrub_outliers(&readings, config);
    Ok(SanitizedRecord::new(raw.id, cleaned))
}

/// Run one record through the state machine and store it if it survives.
pub fn process_record(vault: &mut Vault, raw: RawRecord, config: &ScrubConfig) -> RecordOutcome {
    if vault.contains(&raw.id) {
        return RecordOutcome::Rejected(Rejection::Duplicate);
    }
    match sanitize_record(raw, config) {
        Ok(record) => {
            vault.insert(record);
            RecordOutcome::Sanitized
        }
        Err(rejection) => RecordOutcome::Rejected(rejection),
    }
}

// ---------------------------------------------------------------------------
// Batch run
// ---------------------------------------------------------------------------

/// Counters for a single run; dropped once the summary is built.
#[derive(Debug, Default)]
struct BatchMetrics {
    successful: usize,
    duplicates: usize,
    invalid: usize,
}

impl BatchMetrics {
    fn record(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Sanitized => self.successful += 1,
            RecordOutcome::Rejected(Rejection::Duplicate) => self.duplicates += 1,
            RecordOutcome::Rejected(Rejection::InvalidId | Rejection::MalformedVitals(_)) => {
                self.invalid += 1
            }
        }
    }

    fn processed(&self) -> usize {
        self.successful + self.duplicates + self.invalid
    }

    fn summarize(self, vault: &Vault) -> BatchSummary {
        BatchSummary {
            successful: self.successful,
            duplicates: self.duplicates,
            invalid_ids: self.invalid,
            vault_size: vault.len(),
        }
    }
}

/// Counts for a completed batch. `invalid_ids` covers both bad identifiers
/// and malformed vitals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub successful: usize,
    pub duplicates: usize,
    pub invalid_ids: usize,
    pub vault_size: usize,
}

/// Process rows in order against `vault`.
///
/// Row-level rejections are counted and skipped. The first `Err` row aborts
/// the rest of the batch; records stored before it stay in the vault.
pub fn run_batch<I>(vault: &mut Vault, rows: I, config: &ScrubConfig) -> Result<BatchSummary>
where
    I: IntoIterator<Item = anyhow::Result<RawRecord>>,
{
    let mut metrics = BatchMetrics::default();

    for row in rows {
        let raw = match row {
            Ok(raw) => raw,
            Err(source) => {
                let processed = metrics.processed();
                warn!("Aborting batch after {processed} records: {source:#}");
                return Err(IntegrityError::BatchAborted { processed, source });
            }
        };
        let id = raw.id.clone();
        let outcome = process_record(vault, raw, config);
        match &outcome {
            RecordOutcome::Sanitized => debug!("'{id}': sanitized"),
            RecordOutcome::Rejected(reason) => debug!("'{id}': rejected, {reason}"),
        }
        metrics.record(&outcome);
    }

    let summary = metrics.summarize(vault);
    info!(
        "Batch complete: {} sanitized, {} duplicates, {} invalid, vault holds {}",
        summary.successful, summary.duplicates, summary.invalid_ids, summary.vault_size
    );
    Ok(summary)
}

/// Open a tabular source and run it as one batch.
pub fn run_source(vault: &mut Vault, path: &Path, config: &ScrubConfig) -> Result<BatchSummary> {
    info!("Ingesting {}", path.display());
    let rows = open_rows(path).inspect_err(|e| warn!("Cannot ingest {}: {e}", path.display()))?;
    run_batch(vault, rows, config)
}
