//! # Verify - merged-output consistency checks
//!
//! Decides whether a merged output file is a faithful sort of the shards
//! listed in a manifest, using the `record`, `scanner` and `manifest`
//! crates underneath.
//!
//! ## Architecture
//!
//! ```text
//!  manifest path                         merged-output path
//!       │                                       │
//!       v                                       v
//!  manifest::resolve                     RecordScanner ──> OrderValidator
//!       │ shard refs + warnings                 │             │ OrderStatus
//!       v                                       │             │
//!  RecordScanner (one per shard)          RecordScanner       │
//!       │ counts                                │ count       │
//!       v                                       v             v
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     ConsistencyChecker                          │
//! │  total_from_shards == merged_count ?   sorted ?   warnings ?    │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               v
//!                      VerificationReport
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module      | Purpose                                                  |
//! |-------------|----------------------------------------------------------|
//! | [`order`]   | `OrderValidator`, `OrderStatus`, `check_order()`          |
//! | [`report`]  | `VerificationReport`, `ShardCount`, `Warning`            |
//! | [`checker`] | `ConsistencyChecker::run()`, sequential and parallel     |
//! | [`error`]   | `VerifyError`: the "could not verify" outcomes            |
//!
//! ## Failure Model
//!
//! A bad shard (missing, unreadable, truncated) or a bad manifest line is a
//! [`Warning`] in the report and never aborts sibling scans. So is a merged
//! output with a partial trailing record; its complete records are still
//! checked and counted. An unreadable
//! manifest or merged output is a [`VerifyError`]; no report is produced.
//! An unsorted merged output is neither: it is a normal verdict.

pub mod checker;
pub mod error;
pub mod order;
pub mod report;

pub use checker::ConsistencyChecker;
pub use error::VerifyError;
pub use order::{check_order, validate_sequence, OrderStatus, OrderValidator, Violation};
pub use report::{ShardCount, VerificationReport, Warning};

pub use config::VerifyConfig;

/// Runs a full verification with the given config.
///
/// Shorthand for `ConsistencyChecker::new(config).run()`.
///
/// # Errors
///
/// See [`ConsistencyChecker::run`].
pub fn verify(config: VerifyConfig) -> Result<VerificationReport, VerifyError> {
    ConsistencyChecker::new(config).run()
}

#[cfg(test)]
mod tests;
