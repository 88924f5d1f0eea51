/// Order validation: is a record sequence non-decreasing?
///
/// The validator is a small state machine that remembers the previous value
/// and stops at the first adjacent pair where the order decreases. Once a
/// sequence is unsorted nothing later can make it sorted again, so the rest
/// of the input is never read.
use scanner::{RecordScanner, ScanError, ScanOptions};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// The first adjacent pair where `previous > current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Zero-based position of `current` in the sequence.
    pub index: u64,
    pub previous: i64,
    pub current: i64,
}

/// Terminal verdict of an order check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OrderStatus {
    /// Exhausted with no violation. Empty and single-element sequences are sorted.
    Sorted,
    Unsorted(Violation),
}

impl OrderStatus {
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        matches!(self, OrderStatus::Sorted)
    }

    #[must_use]
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            OrderStatus::Sorted => None,
            OrderStatus::Unsorted(v) => Some(v),
        }
    }
}

/// Incremental non-decreasing check.
#[derive(Debug, Default, Clone)]
pub struct OrderValidator {
    previous: Option<i64>,
    seen: u64,
    violation: Option<Violation>,
}

impl OrderValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the next value. Returns `false` once a violation has been
    /// recorded; further values are ignored.
    pub fn observe(&mut self, current: i64) -> bool {
        if self.violation.is_some() {
            return false;
        }

        let index = self.seen;
        self.seen += 1;

        if let Some(previous) = self.previous {
            if previous > current {
                self.violation = Some(Violation {
                    index,
                    previous,
                    current,
                });
                return false;
            }
        }
        self.previous = Some(current);
        true
    }

    /// Values accepted so far, including the violating one.
    #[must_use]
    pub fn records_checked(&self) -> u64 {
        self.seen
    }

    #[must_use]
    pub fn status(&self) -> OrderStatus {
        match self.violation {
            Some(v) => OrderStatus::Unsorted(v),
            None => OrderStatus::Sorted,
        }
    }
}

/// Consumes a fallible sequence until it ends or the first violation.
///
/// # Errors
///
/// Returns the sequence's first error, if it comes before any violation.
pub fn validate_sequence<I, E>(values: I) -> Result<OrderStatus, E>
where
    I: IntoIterator<Item = Result<i64, E>>,
{
    let mut validator = OrderValidator::new();
    for value in values {
        if !validator.observe(value?) {
            break;
        }
    }
    Ok(validator.status())
}

/// Streams `path` through an [`OrderValidator`].
///
/// The file is closed on return whether the scan finished, stopped at a
/// violation, or failed.
///
/// # Errors
///
/// Any [`ScanError`] hit before a violation is found. A truncated tail
/// after a violation goes unnoticed because reading stops at the violation.
pub fn check_order<P: AsRef<Path>>(path: P, opts: &ScanOptions) -> Result<OrderStatus, ScanError> {
    let scan = RecordScanner::open(path.as_ref(), opts)?;
    let status = validate_sequence(scan)?;
    debug!(path = %path.as_ref().display(), ?status, "order check finished");
    Ok(status)
}
