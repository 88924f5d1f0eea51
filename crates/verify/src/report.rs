//! The verification report and the warnings it carries.

use manifest::ManifestWarning;
use scanner::ScanError;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::OrderStatus;

/// A problem that did not stop the run but does fail it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A manifest line without the `.bin` extension.
    InvalidExtension { line_number: usize, line: String },
    /// A manifest entry whose file does not exist.
    MissingShard { line_number: usize, path: PathBuf },
    /// A listed shard could not be opened or read. It contributes 0 records.
    ShardUnreadable { path: PathBuf, reason: String },
    /// A listed shard's length is not a multiple of 8. It contributes 0 records.
    ShardTruncated { path: PathBuf, trailing_bytes: usize },
    /// The merged output's length is not a multiple of 8. Only its complete
    /// records were checked and counted.
    MergedTruncated { path: PathBuf, trailing_bytes: usize },
}

impl From<ManifestWarning> for Warning {
    fn from(w: ManifestWarning) -> Self {
        match w {
            ManifestWarning::InvalidExtension { line_number, line } => {
                Warning::InvalidExtension { line_number, line }
            }
            ManifestWarning::MissingShard { line_number, path } => {
                Warning::MissingShard { line_number, path }
            }
        }
    }
}

impl From<ScanError> for Warning {
    fn from(e: ScanError) -> Self {
        match e {
            ScanError::TruncatedRecord {
                path,
                trailing_bytes,
            } => Warning::ShardTruncated {
                path,
                trailing_bytes,
            },
            other => Warning::ShardUnreadable {
                path: other.path().to_path_buf(),
                reason: other.to_string(),
            },
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::InvalidExtension { line_number, line } => write!(
                f,
                "invalid extension on manifest line {}: {}",
                line_number, line
            ),
            Warning::MissingShard { line_number, path } => write!(
                f,
                "missing shard on manifest line {}: {}",
                line_number,
                path.display()
            ),
            Warning::ShardUnreadable { reason, .. } => write!(f, "unreadable shard: {}", reason),
            Warning::ShardTruncated {
                path,
                trailing_bytes,
            } => write!(
                f,
                "truncated shard {} ({} trailing byte(s))",
                path.display(),
                trailing_bytes
            ),
            Warning::MergedTruncated {
                path,
                trailing_bytes,
            } => write!(
                f,
                "truncated merged output {} ({} trailing byte(s))",
                path.display(),
                trailing_bytes
            ),
        }
    }
}

/// Per-shard record count as seen by the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardCount {
    pub filename: String,
    pub path: PathBuf,
    /// `None` if the shard failed to scan (see the matching [`Warning`]).
    pub records: Option<u64>,
}

/// Outcome of one verification run.
///
/// Produced once by [`ConsistencyChecker::run`](crate::ConsistencyChecker::run)
/// and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub manifest_path: PathBuf,
    pub merged_path: PathBuf,
    pub sorted_status: OrderStatus,
    /// Sum of record counts over every shard that scanned cleanly.
    pub total_from_shards: u64,
    pub merged_count: u64,
    pub counts_match: bool,
    /// Shards in manifest order.
    pub shards: Vec<ShardCount>,
    /// A merged-output truncation first, then manifest warnings, then shard
    /// failures in manifest order.
    pub warnings: Vec<Warning>,
}

impl VerificationReport {
    /// Overall verdict: sorted, counts equal, and nothing skipped.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.sorted_status.is_sorted() && self.counts_match && self.warnings.is_empty()
    }
}
