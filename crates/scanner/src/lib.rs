//! # Scanner - streaming record reader
//!
//! Turns a shard or merged-output file into a lazy, forward-only sequence of
//! `i64` values without ever holding more than one chunk of the file in
//! memory.
//!
//! ## Reading model
//!
//! ```text
//! file ──read()──> chunk buffer (batch_records * 8 bytes)
//!                      │
//!                      ├─ full 8-byte windows ──decode──> Some(Ok(i64))
//!                      └─ 1..7 leftover bytes ──carried to the next read
//!
//! EOF with leftover bytes ──> Some(Err(ScanError::TruncatedRecord)), then None
//! ```
//!
//! A short read in the middle of the file is not corruption: the partial
//! record is moved to the front of the buffer and completed by the next
//! read. Only a remainder that survives to true end-of-stream is reported,
//! and it is never passed to the decoder.
//!
//! ## Handle lifetime
//!
//! The scanner owns its reader exclusively. The reader is dropped the moment
//! the sequence ends (EOF or first error); dropping the scanner early
//! releases it as well. After the end the iterator is fused.
//!
//! ## Example
//!
//! ```rust,no_run
//! use scanner::{RecordScanner, ScanOptions};
//!
//! let mut scan = RecordScanner::open("sorted_data.bin", &ScanOptions::default()).unwrap();
//! for value in scan.by_ref() {
//!     let value = value.unwrap();
//!     println!("{}", value);
//! }
//! println!("{} records", scan.records_read());
//! ```

use record::{decode_record, ByteOrder, RECORD_BYTES};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default number of records per read chunk (32 KiB of file data).
pub const DEFAULT_BATCH_RECORDS: usize = 4096;

/// Largest chunk a scanner will allocate, in records (32 MiB of file data).
pub const MAX_BATCH_RECORDS: usize = 1 << 22;

/// Label used in errors for scanners built with [`RecordScanner::from_reader`].
const STREAM_LABEL: &str = "<stream>";

/// Tuning and format options for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Records decoded per read chunk. Bounds peak memory to
    /// `batch_records * 8` bytes per open scanner. Clamped to
    /// `1..=MAX_BATCH_RECORDS`.
    pub batch_records: usize,
    /// Byte order of the file being scanned.
    pub byte_order: ByteOrder,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            batch_records: DEFAULT_BATCH_RECORDS,
            byte_order: ByteOrder::Little,
        }
    }
}

/// Errors that end a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The file could not be opened.
    #[error("cannot open {}: {source}", .path.display())]
    FileUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file was opened but a read failed part-way through.
    #[error("read failed on {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file length is not a multiple of the record size.
    #[error("{} ends with a truncated record ({trailing_bytes} trailing byte(s))", .path.display())]
    TruncatedRecord { path: PathBuf, trailing_bytes: usize },
}

impl ScanError {
    /// Path of the file the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ScanError::FileUnavailable { path, .. }
            | ScanError::Read { path, .. }
            | ScanError::TruncatedRecord { path, .. } => path,
        }
    }

    /// Returns `true` if the file was readable but misaligned.
    #[must_use]
    pub fn is_truncation(&self) -> bool {
        matches!(self, ScanError::TruncatedRecord { .. })
    }
}

/// Lazy iterator over the records of one file.
///
/// Yields `Ok(value)` for each complete record, at most one `Err(_)`, and
/// then `None` forever. Restart by opening a new scanner.
pub struct RecordScanner<R: Read> {
    path: PathBuf,
    /// `None` once the scan has finished; dropping it closes the file.
    reader: Option<R>,
    order: ByteOrder,
    buf: Vec<u8>,
    /// Unconsumed bytes are `buf[start..end]`.
    start: usize,
    end: usize,
    records: u64,
}

impl RecordScanner<File> {
    /// Opens `path` for scanning.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::FileUnavailable`] if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, opts: &ScanOptions) -> Result<Self, ScanError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| ScanError::FileUnavailable {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), batch_records = opts.batch_records, "opened for scan");
        Ok(Self::with_path(file, path, opts))
    }
}

impl<R: Read> RecordScanner<R> {
    /// Builds a scanner over any `Read` implementor.
    ///
    /// Useful for tests that feed an in-memory buffer (e.g. `Cursor<Vec<u8>>`).
    pub fn from_reader(reader: R, opts: &ScanOptions) -> Self {
        Self::with_path(reader, PathBuf::from(STREAM_LABEL), opts)
    }

    fn with_path(reader: R, path: PathBuf, opts: &ScanOptions) -> Self {
        let chunk = opts.batch_records.clamp(1, MAX_BATCH_RECORDS) * RECORD_BYTES;
        Self {
            path,
            reader: Some(reader),
            order: opts.byte_order,
            buf: vec![0u8; chunk],
            start: 0,
            end: 0,
            records: 0,
        }
    }

    /// Number of records yielded so far. After the iterator returns `None`
    /// without an error this is the file's total record count.
    #[must_use]
    pub fn records_read(&self) -> u64 {
        self.records
    }

    /// Path being scanned (or `<stream>` for reader-backed scanners).
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` once the underlying reader has been released.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.reader.is_none()
    }

    /// Consumes the rest of the sequence and returns the total record count.
    ///
    /// # Errors
    ///
    /// Propagates the first [`ScanError`] encountered.
    pub fn drain_count(mut self) -> Result<u64, ScanError> {
        for value in self.by_ref() {
            value?;
        }
        Ok(self.records)
    }

    /// Refills the chunk buffer. Returns `Ok(false)` at end-of-stream.
    fn fill(&mut self) -> Result<bool, ScanError> {
        let reader = match self.reader.as_mut() {
            Some(r) => r,
            None => return Ok(false),
        };

        // Carry the partial record (if any) to the front.
        let leftover = self.end - self.start;
        self.buf.copy_within(self.start..self.end, 0);
        self.start = 0;
        self.end = leftover;

        loop {
            match reader.read(&mut self.buf[self.end..]) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.end += n;
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(ScanError::Read {
                        path: self.path.clone(),
                        source,
                    })
                }
            }
        }
    }

    /// Releases the reader and logs the outcome.
    fn release(&mut self) {
        if self.reader.take().is_some() {
            debug!(path = %self.path.display(), records = self.records, "scan finished");
        }
    }
}

impl<R: Read> Iterator for RecordScanner<R> {
    type Item = Result<i64, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.end - self.start >= RECORD_BYTES {
                let mut rec = [0u8; RECORD_BYTES];
                rec.copy_from_slice(&self.buf[self.start..self.start + RECORD_BYTES]);
                self.start += RECORD_BYTES;
                self.records += 1;
                return Some(Ok(decode_record(&rec, self.order)));
            }

            if self.reader.is_none() {
                return None;
            }

            match self.fill() {
                Ok(true) => continue,
                Ok(false) => {
                    let trailing_bytes = self.end - self.start;
                    // Drop the tail so the fused state stays empty.
                    self.start = 0;
                    self.end = 0;
                    self.release();
                    if trailing_bytes > 0 {
                        return Some(Err(ScanError::TruncatedRecord {
                            path: self.path.clone(),
                            trailing_bytes,
                        }));
                    }
                    return None;
                }
                Err(e) => {
                    self.start = 0;
                    self.end = 0;
                    self.release();
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for RecordScanner<R> {}

/// Counts the records in `path` with a single streaming pass.
///
/// # Errors
///
/// Fails with [`ScanError::FileUnavailable`], [`ScanError::Read`] or
/// [`ScanError::TruncatedRecord`].
pub fn count_records<P: AsRef<Path>>(path: P, opts: &ScanOptions) -> Result<u64, ScanError> {
    RecordScanner::open(path, opts)?.drain_count()
}
