//! # Record - fixed-width integer codec
//!
//! Shard files and the merged output share one trivial on-disk format: a flat
//! run of signed 64-bit integers with no header, footer or checksum.
//!
//! ```text
//! ┌──────────────┬──────────────┬──────────────┬─────┐
//! │ i64 (8 B)    │ i64 (8 B)    │ i64 (8 B)    │ ... │
//! └──────────────┴──────────────┴──────────────┴─────┘
//! ```
//!
//! The byte order is part of the file format, not a property of the host.
//! Files are little-endian unless a caller explicitly asks for
//! [`ByteOrder::Big`]. A file whose length is not a multiple of
//! [`RECORD_BYTES`] is corrupt; the trailing partial record is reported as
//! [`RecordError::TruncatedRecord`] and never decoded.
//!
//! ## Example
//!
//! ```rust
//! use record::{decode_records, encode_record, ByteOrder};
//!
//! let mut bytes = Vec::new();
//! bytes.extend_from_slice(&encode_record(-7, ByteOrder::Little));
//! bytes.extend_from_slice(&encode_record(42, ByteOrder::Little));
//!
//! let mut out = Vec::new();
//! decode_records(&bytes, ByteOrder::Little, &mut out).unwrap();
//! assert_eq!(out, vec![-7, 42]);
//! ```

mod writer;

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use writer::{RecordWriter, WRITE_BATCH_RECORDS};

/// Size of one encoded record in bytes.
pub const RECORD_BYTES: usize = 8;

/// Byte order of the records inside a shard or merged-output file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Least significant byte first. The format default.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::Little => f.write_str("little"),
            ByteOrder::Big => f.write_str("big"),
        }
    }
}

impl FromStr for ByteOrder {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "le" | "little" => Ok(ByteOrder::Little),
            "be" | "big" => Ok(ByteOrder::Big),
            _ => Err(RecordError::UnknownByteOrder(s.to_string())),
        }
    }
}

/// Errors produced while decoding records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// The input ended with fewer than [`RECORD_BYTES`] bytes left over.
    #[error("truncated record: {trailing_bytes} trailing byte(s) do not form a full record")]
    TruncatedRecord {
        /// Number of bytes in the incomplete tail (always `1..=7`).
        trailing_bytes: usize,
    },

    /// A byte-order name that is neither little- nor big-endian.
    #[error("unknown byte order '{0}' (expected 'little' or 'big')")]
    UnknownByteOrder(String),
}

/// Decodes exactly one record.
#[inline]
#[must_use]
pub fn decode_record(bytes: &[u8; RECORD_BYTES], order: ByteOrder) -> i64 {
    match order {
        ByteOrder::Little => LittleEndian::read_i64(bytes),
        ByteOrder::Big => BigEndian::read_i64(bytes),
    }
}

/// Encodes one record.
#[inline]
#[must_use]
pub fn encode_record(value: i64, order: ByteOrder) -> [u8; RECORD_BYTES] {
    let mut out = [0u8; RECORD_BYTES];
    match order {
        ByteOrder::Little => LittleEndian::write_i64(&mut out, value),
        ByteOrder::Big => BigEndian::write_i64(&mut out, value),
    }
    out
}

/// Decodes every record in `bytes`, appending the values to `out`.
///
/// The length check happens before any decoding: if `bytes.len()` is not a
/// multiple of [`RECORD_BYTES`] nothing is appended and the size of the
/// partial tail is returned in the error.
///
/// # Errors
///
/// Returns [`RecordError::TruncatedRecord`] on a misaligned buffer.
pub fn decode_records(
    bytes: &[u8],
    order: ByteOrder,
    out: &mut Vec<i64>,
) -> Result<(), RecordError> {
    let trailing_bytes = bytes.len() % RECORD_BYTES;
    if trailing_bytes != 0 {
        return Err(RecordError::TruncatedRecord { trailing_bytes });
    }

    out.reserve(bytes.len() / RECORD_BYTES);
    for chunk in bytes.chunks_exact(RECORD_BYTES) {
        // chunks_exact guarantees the length
        let mut rec = [0u8; RECORD_BYTES];
        rec.copy_from_slice(chunk);
        out.push(decode_record(&rec, order));
    }
    Ok(())
}
