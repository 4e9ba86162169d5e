use std::path::PathBuf;

/// Errors that stop a batch or a configuration load.
///
/// Row-level problems (bad identifier, unparsable reading) are not errors:
/// they are counted by the pipeline and the batch carries on.
#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    /// The tabular source could not be located. Raised before the vault is touched.
    #[error("data source not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("unsupported data source extension: .{0}")]
    UnsupportedFormat(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Unexpected failure mid-batch. Records inserted before `processed` stay in the vault.
    #[error("batch aborted after {processed} records: {source:#}")]
    BatchAborted {
        processed: usize,
        #[source]
        source: anyhow::Error,
    },
}

pub type Result<T> = std::result::Result<T, IntegrityError>;
