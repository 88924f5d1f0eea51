/// Human-readable rendering of verification results.
use std::fmt::Write;
use verify::{OrderStatus, VerificationReport};

/// One-line description of an order verdict.
pub fn order_line(status: &OrderStatus) -> String {
    match status {
        OrderStatus::Sorted => "sorted (non-decreasing)".to_string(),
        OrderStatus::Unsorted(v) => format!(
            "NOT sorted: record {} ({}) follows a larger value ({})",
            v.index, v.current, v.previous
        ),
    }
}

/// Multi-line summary of a full run, ending with the verdict.
pub fn report_text(report: &VerificationReport) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = writeln!(out, "merged output : {}", report.merged_path.display());
    let _ = writeln!(out, "manifest      : {}", report.manifest_path.display());
    let _ = writeln!(out, "order         : {}", order_line(&report.sorted_status));

    for shard in &report.shards {
        match shard.records {
            Some(n) => {
                let _ = writeln!(out, "  shard {:<32} {:>12} records", shard.filename, n);
            }
            None => {
                let _ = writeln!(out, "  shard {:<32} {:>12}", shard.filename, "FAILED");
            }
        }
    }

    let _ = writeln!(out, "shard total   : {}", report.total_from_shards);
    let _ = writeln!(out, "merged count  : {}", report.merged_count);
    let _ = writeln!(
        out,
        "counts        : {}",
        if report.counts_match { "match" } else { "MISMATCH" }
    );

    if !report.warnings.is_empty() {
        let _ = writeln!(out, "warnings      : {}", report.warnings.len());
        for w in &report.warnings {
            let _ = writeln!(out, "  - {}", w);
        }
    }

    let verdict = if report.is_success() { "OK" } else { "FAILED" };
    let _ = write!(out, "result        : {}", verdict);
    out
}
