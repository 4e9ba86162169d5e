/// Data layer: record types, tabular loading, and the per-record checks.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → stream of RawRecord
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ identifier │  normalize → palindrome test
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  scrub    │  drop spikes against a trailing window
///   └──────────┘
/// ```
///
/// `dedup` holds the standalone first-duplicate check; the pipeline's own
/// duplicate test is a vault key lookup.

pub mod dedup;
pub mod identifier;
pub mod loader;
pub mod model;
pub mod scrub;
