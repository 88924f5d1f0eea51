//! # shardcheck - merged-output verification tool
//!
//! Checks that a merged output file is a sorted union of the shard files
//! listed in a manifest.
//!
//! ## Commands
//!
//! ```text
//! shardcheck verify [--manifest P] [--merged P] [--jobs N] [--json]
//!                                   full run: order + count consistency
//! shardcheck order <file> [--json]  order check only
//! shardcheck count <file>... [--json]
//!                                   record counts only
//! ```
//!
//! ## Configuration
//!
//! Every option can also be set from the environment:
//!
//! ```text
//! SHARDCHECK_MANIFEST    manifest path            (default: "test_files/names.txt")
//! SHARDCHECK_MERGED      merged-output path       (default: "sorted_data.bin")
//! SHARDCHECK_BATCH       records per read chunk   (default: 4096)
//! SHARDCHECK_BYTE_ORDER  "little" or "big"        (default: "little")
//! SHARDCHECK_JOBS        shard scan threads       (default: 1)
//! RUST_LOG               log filter               (default: "info")
//! ```
//!
//! Logs go to stderr; results go to stdout.
//!
//! ## Exit Codes
//!
//! ```text
//! 0  verified OK
//! 1  verified and found invalid (unsorted, count mismatch, or skipped shards)
//! 2  could not verify (unreadable manifest or merged output, bad arguments)
//! ```

mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{
    validate_batch, VerifyConfig, DEFAULT_BATCH_RECORDS, DEFAULT_JOBS, DEFAULT_MANIFEST_PATH,
    DEFAULT_MERGED_PATH,
};
use record::ByteOrder;
use scanner::{count_records, ScanOptions};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use verify::{check_order, ConsistencyChecker};

/// Exit code for "verified and found invalid".
const EXIT_INVALID: u8 = 1;
/// Exit code for "could not verify".
const EXIT_UNVERIFIED: u8 = 2;

#[derive(Parser)]
#[command(name = "shardcheck")]
#[command(about = "Verify that a merged output is a sorted union of its shards", long_about = None)]
struct Cli {
    /// Records decoded per read chunk
    #[arg(long, global = true, env = "SHARDCHECK_BATCH", default_value_t = DEFAULT_BATCH_RECORDS)]
    batch: usize,

    /// Byte order of the record files ("little" or "big")
    #[arg(long, global = true, env = "SHARDCHECK_BYTE_ORDER", default_value = "little")]
    byte_order: ByteOrder,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check order and record counts of the merged output against the manifest
    Verify {
        /// Manifest listing the shard files
        #[arg(short, long, env = "SHARDCHECK_MANIFEST", default_value = DEFAULT_MANIFEST_PATH)]
        manifest: PathBuf,

        /// Merged output file
        #[arg(short = 'o', long, env = "SHARDCHECK_MERGED", default_value = DEFAULT_MERGED_PATH)]
        merged: PathBuf,

        /// Threads used to scan shards
        #[arg(short, long, env = "SHARDCHECK_JOBS", default_value_t = DEFAULT_JOBS)]
        jobs: usize,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that one file is sorted
    Order {
        path: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Count the records in one or more files
    Count {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match execute(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_INVALID),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_UNVERIFIED)
        }
    }
}

/// Runs the selected command. `Ok(false)` means the check ran and failed.
fn execute(cli: Cli) -> Result<bool> {
    let opts = ScanOptions {
        batch_records: cli.batch,
        byte_order: cli.byte_order,
    };
    validate_batch(opts.batch_records).context("invalid --batch")?;
    debug!(?opts, "scan options");

    match cli.command {
        Commands::Verify {
            manifest,
            merged,
            jobs,
            json,
        } => {
            let config = VerifyConfig::new(manifest, merged)
                .with_batch_records(opts.batch_records)
                .with_byte_order(opts.byte_order)
                .with_jobs(jobs);
            let report = ConsistencyChecker::new(config).run()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", render::report_text(&report));
            }
            Ok(report.is_success())
        }

        Commands::Order { path, json } => {
            let status = check_order(&path, &opts)
                .with_context(|| format!("order check of {} failed", path.display()))?;

            if json {
                let out = json!({ "path": path, "sorted_status": status });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}: {}", path.display(), render::order_line(&status));
            }
            Ok(status.is_sorted())
        }

        Commands::Count { paths, json } => {
            let mut counts = Vec::with_capacity(paths.len());
            for path in &paths {
                let n = count_records(path, &opts)
                    .with_context(|| format!("cannot count {}", path.display()))?;
                counts.push(n);
            }
            let total: u64 = counts.iter().sum();

            if json {
                let files: Vec<_> = paths
                    .iter()
                    .zip(&counts)
                    .map(|(p, n)| json!({ "path": p, "records": n }))
                    .collect();
                let out = json!({ "files": files, "total": total });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                for (p, n) in paths.iter().zip(&counts) {
                    println!("{:>12}  {}", n, p.display());
                }
                println!("{:>12}  total", total);
            }
            Ok(true)
        }
    }
}
