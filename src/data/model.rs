use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RawRecord – one row of a tabular source
// ---------------------------------------------------------------------------

/// A record exactly as read from a source: identifier coerced to text,
/// readings still the comma-separated text of the `vitals` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    pub vitals: String,
}

impl RawRecord {
    pub fn new(id: impl Into<String>, vitals: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            vitals: vitals.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Readings parsing
// ---------------------------------------------------------------------------

/// The first token of a `vitals` field that is not a number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("reading[{index}]: '{token}' is not a number")]
pub struct ReadingParseError {
    pub index: usize,
    pub token: String,
}

/// Parse comma-separated floats. All or nothing: one bad token fails the
/// whole field. An empty field is a single empty token and therefore fails.
pub fn parse_readings(s: &str) -> Result<Vec<f64>, ReadingParseError> {
    s.split(',')
        .enumerate()
        .map(|(index, tok)| {
            tok.trim().parse::<f64>().map_err(|_| ReadingParseError {
                index,
                token: tok.to_string(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// SanitizedRecord – the only thing the vault accepts
// ---------------------------------------------------------------------------

/// A record whose identifier validated and whose readings were scrubbed.
///
/// Construction is crate-private so a vault entry can only come from the
/// pipeline's sanitation step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SanitizedRecord {
    id: String,
    vitals: Vec<f64>,
}

impl SanitizedRecord {
    pub(crate) fn new(id: String, vitals: Vec<f64>) -> Self {
        Self { id, vitals }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Cleaned readings, original order preserved.
    pub fn vitals(&self) -> &[f64] {
        &self.vitals
    }

    pub(crate) fn into_parts(self) -> (String, Vec<f64>) {
        (self.id, self.vitals)
    }
}
