/// Consistency checker: ties the manifest, the shard scans and the merged
/// output together into one [`VerificationReport`].
///
/// The run has four phases:
///
/// 1. order check of the merged output
/// 2. manifest resolution
/// 3. one count pass per shard, summed
/// 4. a separate count pass over the merged output
///
/// With `jobs == 1` they run in that order on the caller's thread. With more
/// jobs, phases 1+4 run alongside 2+3 inside a dedicated rayon pool, and the
/// shard passes are spread across its workers. Shard results are collected
/// in manifest order and summed on the coordinating thread either way.
use config::VerifyConfig;
use manifest::{ResolvedManifest, ShardReference};
use rayon::prelude::*;
use scanner::{count_records, RecordScanner, ScanError, ScanOptions};
use tracing::{debug, info, warn};

use crate::{OrderStatus, OrderValidator, ShardCount, VerificationReport, VerifyError, Warning};

/// Shard-side half of a run.
struct ShardTally {
    shards: Vec<ShardCount>,
    warnings: Vec<Warning>,
    total: u64,
}

/// Merged-output-side half of a run.
struct MergedScan {
    status: OrderStatus,
    count: u64,
    /// Set when the merged output ends in a partial record.
    truncated: Option<Warning>,
}

/// Runs verification for one [`VerifyConfig`].
#[derive(Debug, Clone)]
pub struct ConsistencyChecker {
    config: VerifyConfig,
}

impl ConsistencyChecker {
    pub fn new(config: VerifyConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Performs the full verification run.
    ///
    /// Per-shard failures end up as warnings in the report; the run only
    /// fails outright when no meaningful report is possible.
    ///
    /// # Errors
    ///
    /// - [`VerifyError::InvalidConfig`] if the config does not validate.
    /// - [`VerifyError::ManifestUnreadable`] if the manifest cannot be read.
    /// - [`VerifyError::MergedOutputUnavailable`] if the merged output cannot
    ///   be opened or read. A truncated merged output is not an error: its
    ///   complete records are checked and the run fails with a
    ///   [`Warning::MergedTruncated`].
    /// - [`VerifyError::WorkerPool`] if `jobs > 1` and the pool cannot start.
    pub fn run(&self) -> Result<VerificationReport, VerifyError> {
        self.config.validate()?;
        let opts = self.config.scan_options();

        info!(
            manifest = %self.config.manifest_path.display(),
            merged = %self.config.merged_path.display(),
            jobs = self.config.jobs,
            byte_order = %self.config.byte_order,
            "starting verification"
        );

        let (merged, tally) = if self.config.jobs > 1 {
            self.run_parallel(&opts)?
        } else {
            self.run_sequential(&opts)?
        };

        let counts_match = tally.total == merged.count;
        let mut warnings = Vec::with_capacity(tally.warnings.len() + 1);
        warnings.extend(merged.truncated);
        warnings.extend(tally.warnings);

        let report = VerificationReport {
            manifest_path: self.config.manifest_path.clone(),
            merged_path: self.config.merged_path.clone(),
            sorted_status: merged.status,
            total_from_shards: tally.total,
            merged_count: merged.count,
            counts_match,
            shards: tally.shards,
            warnings,
        };

        info!(
            sorted = report.sorted_status.is_sorted(),
            total_from_shards = report.total_from_shards,
            merged_count = report.merged_count,
            counts_match,
            warnings = report.warnings.len(),
            "verification finished"
        );
        Ok(report)
    }

    fn run_sequential(&self, opts: &ScanOptions) -> Result<(MergedScan, ShardTally), VerifyError> {
        let status = self.check_merged_order(opts)?;
        let resolved = self.resolve_manifest()?;
        let tally = tally_shards(resolved, opts, false);
        let (count, truncated) = self.count_merged(opts)?;
        let merged = MergedScan {
            status,
            count,
            truncated,
        };
        Ok((merged, tally))
    }

    fn run_parallel(&self, opts: &ScanOptions) -> Result<(MergedScan, ShardTally), VerifyError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs)
            .thread_name(|i| format!("shardcheck-{}", i))
            .build()?;

        let (merged, shards) = pool.install(|| {
            rayon::join(
                || -> Result<MergedScan, VerifyError> {
                    let status = self.check_merged_order(opts)?;
                    let (count, truncated) = self.count_merged(opts)?;
                    Ok(MergedScan {
                        status,
                        count,
                        truncated,
                    })
                },
                || -> Result<ShardTally, VerifyError> {
                    let resolved = self.resolve_manifest()?;
                    Ok(tally_shards(resolved, opts, true))
                },
            )
        });

        // The merged output is checked first in the sequential order, so
        // its failure wins when both sides fail.
        let merged = merged?;
        let tally = shards?;
        Ok((merged, tally))
    }

    /// Order pass over the merged output.
    ///
    /// A partial trailing record ends the pass; the verdict covers the
    /// complete records before it. The count pass reports the truncation.
    fn check_merged_order(&self, opts: &ScanOptions) -> Result<OrderStatus, VerifyError> {
        let path = &self.config.merged_path;
        info!(path = %path.display(), "checking merged output order");

        let scan = RecordScanner::open(path, opts).map_err(VerifyError::MergedOutputUnavailable)?;
        let mut validator = OrderValidator::new();
        for value in scan {
            match value {
                Ok(v) => {
                    if !validator.observe(v) {
                        break;
                    }
                }
                Err(e) if e.is_truncation() => break,
                Err(e) => return Err(VerifyError::MergedOutputUnavailable(e)),
            }
        }

        let status = validator.status();
        if let OrderStatus::Unsorted(v) = &status {
            warn!(
                index = v.index,
                previous = v.previous,
                current = v.current,
                "merged output is not sorted"
            );
        }
        Ok(status)
    }

    /// Count pass over the merged output. Returns the number of complete
    /// records and, for a misaligned file, the matching warning.
    fn count_merged(&self, opts: &ScanOptions) -> Result<(u64, Option<Warning>), VerifyError> {
        let path = &self.config.merged_path;
        let mut scan =
            RecordScanner::open(path, opts).map_err(VerifyError::MergedOutputUnavailable)?;

        let mut truncated = None;
        for value in scan.by_ref() {
            match value {
                Ok(_) => {}
                Err(ScanError::TruncatedRecord {
                    path,
                    trailing_bytes,
                }) => {
                    warn!(path = %path.display(), trailing_bytes, "merged output is truncated");
                    truncated = Some(Warning::MergedTruncated {
                        path,
                        trailing_bytes,
                    });
                }
                Err(e) => return Err(VerifyError::MergedOutputUnavailable(e)),
            }
        }

        let count = scan.records_read();
        info!(path = %path.display(), records = count, "counted merged output");
        Ok((count, truncated))
    }

    fn resolve_manifest(&self) -> Result<ResolvedManifest, VerifyError> {
        info!(path = %self.config.manifest_path.display(), "resolving manifest");
        Ok(manifest::resolve(&self.config.manifest_path)?)
    }
}

/// Counts one shard. Failures become a warning and a `None` count.
fn scan_shard(shard: &ShardReference, opts: &ScanOptions) -> (ShardCount, Option<Warning>) {
    match count_records(&shard.path, opts) {
        Ok(records) => {
            debug!(path = %shard.path.display(), records, "counted shard");
            (
                ShardCount {
                    filename: shard.filename.clone(),
                    path: shard.path.clone(),
                    records: Some(records),
                },
                None,
            )
        }
        Err(e) => {
            warn!(path = %shard.path.display(), error = %e, "shard scan failed, counting it as 0");
            (
                ShardCount {
                    filename: shard.filename.clone(),
                    path: shard.path.clone(),
                    records: None,
                },
                Some(Warning::from(e)),
            )
        }
    }
}

/// Scans every resolved shard and folds the counts.
///
/// Each scan owns its own file handle; `parallel` only changes which thread
/// runs it. The collected outcomes keep manifest order and the sum happens
/// here, so the total does not depend on scheduling.
fn tally_shards(resolved: ResolvedManifest, opts: &ScanOptions, parallel: bool) -> ShardTally {
    let outcomes: Vec<(ShardCount, Option<Warning>)> = if parallel {
        resolved
            .shards
            .par_iter()
            .map(|s| scan_shard(s, opts))
            .collect()
    } else {
        resolved.shards.iter().map(|s| scan_shard(s, opts)).collect()
    };

    let mut warnings: Vec<Warning> = resolved.warnings.into_iter().map(Warning::from).collect();
    let mut shards = Vec::with_capacity(outcomes.len());
    let mut total = 0u64;

    for (count, warning) in outcomes {
        total += count.records.unwrap_or(0);
        if let Some(w) = warning {
            warnings.push(w);
        }
        shards.push(count);
    }

    info!(shards = shards.len(), total, "counted shards");
    ShardTally {
        shards,
        warnings,
        total,
    }
}
