//! Batched record writer, the encoding side of the shard format.

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::{ByteOrder, RECORD_BYTES};

/// Number of records buffered before a single `write_all` to the sink.
pub const WRITE_BATCH_RECORDS: usize = 1024;

/// Writes records to any `Write` sink in batches of [`WRITE_BATCH_RECORDS`].
///
/// Records are encoded into a reusable scratch buffer and handed to the sink
/// in one call per batch. Call [`finish`](RecordWriter::finish) to push the
/// final partial batch; a writer dropped without `finish` loses it.
pub struct RecordWriter<W: Write> {
    sink: W,
    order: ByteOrder,
    buf: Vec<u8>,
    written: u64,
}

impl RecordWriter<File> {
    /// Creates (or truncates) the file at `path`.
    pub fn create<P: AsRef<Path>>(path: P, order: ByteOrder) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file, order))
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn new(sink: W, order: ByteOrder) -> Self {
        Self {
            sink,
            order,
            buf: Vec::with_capacity(WRITE_BATCH_RECORDS * RECORD_BYTES),
            written: 0,
        }
    }

    /// Appends one record.
    pub fn write_record(&mut self, value: i64) -> io::Result<()> {
        match self.order {
            ByteOrder::Little => self.buf.write_i64::<LittleEndian>(value)?,
            ByteOrder::Big => self.buf.write_i64::<BigEndian>(value)?,
        }
        self.written += 1;

        if self.buf.len() >= WRITE_BATCH_RECORDS * RECORD_BYTES {
            self.flush_batch()?;
        }
        Ok(())
    }

    /// Appends every value yielded by `values`.
    pub fn write_all<I>(&mut self, values: I) -> io::Result<()>
    where
        I: IntoIterator<Item = i64>,
    {
        for v in values {
            self.write_record(v)?;
        }
        Ok(())
    }

    /// Number of records accepted so far (including any still buffered).
    #[must_use]
    pub fn records_written(&self) -> u64 {
        self.written
    }

    /// Flushes the last batch and returns the underlying sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.flush_batch()?;
        self.sink.flush()?;
        Ok(self.sink)
    }

    fn flush_batch(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            self.sink.write_all(&self.buf)?;
            self.buf.clear();
        }
        Ok(())
    }
}
