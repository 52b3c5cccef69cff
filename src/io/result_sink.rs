//! Serialized result output
//!
//! `WriterSink` wraps any writer behind a mutex. Each `emit` writes the whole
//! line, its newline, and flushes before the lock is released, so lines from
//! different workers never interleave.

use crate::core::traits::ResultSink;
use crate::types::{BankError, ResultLine};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Append-only sink over a writer
#[derive(Debug)]
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl WriterSink<BufWriter<File>> {
    /// Create or truncate the output file
    ///
    /// # Errors
    ///
    /// Returns `OutputUnavailable` if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self, BankError> {
        let file = File::create(path).map_err(|e| BankError::output_unavailable(path, &e))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl WriterSink<Vec<u8>> {
    /// Copy of everything written so far
    pub fn contents(&self) -> Vec<u8> {
        self.writer.lock().clone()
    }
}

impl<W: Write + Send> ResultSink for WriterSink<W> {
    fn emit(&self, line: &ResultLine) -> Result<(), BankError> {
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}
