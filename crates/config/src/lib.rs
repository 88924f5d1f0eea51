//! # Config - verification run settings
//!
//! A [`VerifyConfig`] fully describes one verification run: which manifest
//! and merged-output files to check, how the files are encoded, and how
//! much parallelism to use. The `shardcheck` binary fills it from command
//! line flags and `SHARDCHECK_*` environment variables:
//!
//! ```text
//! SHARDCHECK_MANIFEST    manifest path            (default: "test_files/names.txt")
//! SHARDCHECK_MERGED      merged-output path       (default: "sorted_data.bin")
//! SHARDCHECK_BATCH       records per read chunk   (default: 4096)
//! SHARDCHECK_BYTE_ORDER  "little" or "big"        (default: "little")
//! SHARDCHECK_JOBS        shard scan threads       (default: 1 = sequential)
//! ```

use record::ByteOrder;
use scanner::ScanOptions;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use scanner::{DEFAULT_BATCH_RECORDS, MAX_BATCH_RECORDS};

/// Default manifest location, relative to the working directory.
pub const DEFAULT_MANIFEST_PATH: &str = "test_files/names.txt";

/// Default merged-output location, relative to the working directory.
pub const DEFAULT_MERGED_PATH: &str = "sorted_data.bin";

/// Default shard-scan parallelism. One means the sequential reference model.
pub const DEFAULT_JOBS: usize = 1;

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("batch_records must be greater than zero")]
    ZeroBatch,

    #[error("batch_records must be at most {max}, got {got}")]
    BatchTooLarge { got: usize, max: usize },

    #[error("jobs must be greater than zero")]
    ZeroJobs,

    #[error("{0} path must not be empty")]
    EmptyPath(&'static str),
}

/// Settings for one verification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyConfig {
    pub manifest_path: PathBuf,
    pub merged_path: PathBuf,
    /// Records decoded per read chunk; bounds memory per open file.
    pub batch_records: usize,
    pub byte_order: ByteOrder,
    /// Worker threads for shard scans. `1` keeps everything on the caller's thread.
    pub jobs: usize,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MANIFEST_PATH, DEFAULT_MERGED_PATH)
    }
}

impl VerifyConfig {
    /// Creates a config with default tuning for the given files.
    pub fn new<M: AsRef<Path>, S: AsRef<Path>>(manifest_path: M, merged_path: S) -> Self {
        Self {
            manifest_path: manifest_path.as_ref().to_path_buf(),
            merged_path: merged_path.as_ref().to_path_buf(),
            batch_records: DEFAULT_BATCH_RECORDS,
            byte_order: ByteOrder::default(),
            jobs: DEFAULT_JOBS,
        }
    }

    #[must_use]
    pub fn with_batch_records(mut self, batch_records: usize) -> Self {
        self.batch_records = batch_records;
        self
    }

    #[must_use]
    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Checks that the settings can drive a run.
    ///
    /// # Errors
    ///
    /// Returns the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.manifest_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("manifest"));
        }
        if self.merged_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("merged-output"));
        }
        validate_batch(self.batch_records)?;
        if self.jobs == 0 {
            return Err(ConfigError::ZeroJobs);
        }
        Ok(())
    }

    /// Scanner options derived from this config.
    #[must_use]
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            batch_records: self.batch_records,
            byte_order: self.byte_order,
        }
    }
}

/// Checks a records-per-chunk setting on its own.
///
/// # Errors
///
/// [`ConfigError::ZeroBatch`] or [`ConfigError::BatchTooLarge`].
pub fn validate_batch(batch_records: usize) -> Result<(), ConfigError> {
    if batch_records == 0 {
        return Err(ConfigError::ZeroBatch);
    }
    if batch_records > MAX_BATCH_RECORDS {
        return Err(ConfigError::BatchTooLarge {
            got: batch_records,
            max: MAX_BATCH_RECORDS,
        });
    }
    Ok(())
}
