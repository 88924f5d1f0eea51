use config::ConfigError;
use manifest::ManifestError;
use scanner::ScanError;
use thiserror::Error;

/// A run that could not produce a report.
///
/// This is "could not verify", never "verified and found invalid"; the
/// latter is a [`VerificationReport`](crate::VerificationReport) whose
/// [`is_success`](crate::VerificationReport::is_success) is `false`.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The manifest could not be opened or read.
    #[error("cannot verify: {0}")]
    ManifestUnreadable(#[from] ManifestError),

    /// The merged output could not be opened or read.
    #[error("cannot verify merged output: {0}")]
    MergedOutputUnavailable(#[source] ScanError),

    #[error("failed to start shard scan workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
