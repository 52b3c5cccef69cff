//! Command reader with iterator interface
//!
//! Streams requests from a text source, one command per line. The `csv`
//! crate does the line splitting: records are space-delimited, header-less and
//! flexible-width, and quotes carry no meaning. Token conversion is delegated
//! to the `command_format` module.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found) are returned from `from_path()`
//! - Malformed lines are yielded as `ParseError` items carrying the line
//!   number; iteration continues with the next line
//! - An I/O error while reading is yielded once and ends the iteration
//!
//! # Request Ids
//!
//! Only accepted lines consume a request id, so ids stay contiguous. Reading
//! stops after `END`.

use crate::io::command_format::parse_command;
use crate::types::{BankError, Request, RequestId, RequestIds};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Streaming command reader
#[derive(Debug)]
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
    record: StringRecord,
    ids: RequestIds,
    finished: bool,
}

impl CommandReader<File> {
    /// Open a command file
    pub fn from_path(path: &Path) -> Result<Self, BankError> {
        let file = File::open(path).map_err(|e| BankError::IoError {
            message: format!("Failed to open input '{}': {}", path.display(), e),
        })?;
        Ok(Self::new(file))
    }
}

impl<R: Read> CommandReader<R> {
    /// Wrap any reader
    pub fn new(input: R) -> Self {
        let reader = ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(Trim::All)
            .buffer_capacity(8 * 1024)
            .from_reader(input);

        Self {
            reader,
            record: StringRecord::new(),
            ids: RequestIds::new(),
            finished: false,
        }
    }

    /// Id the next accepted command will receive
    pub fn next_request_id(&self) -> RequestId {
        self.ids.peek()
    }

    /// Whether `END` has been read
    pub fn saw_end(&self) -> bool {
        self.finished
    }
}

impl<R: Read> Iterator for CommandReader<R> {
    type Item = Result<Request, BankError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }

            match self.reader.read_record(&mut self.record) {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) if e.is_io_error() => {
                    self.finished = true;
                    return Some(Err(BankError::IoError {
                        message: e.to_string(),
                    }));
                }
                Err(e) => return Some(Err(e.into())),
            }

            let line = self.record.position().map(|pos| pos.line());

            // Repeated spaces yield empty fields
            let tokens: Vec<&str> = self.record.iter().filter(|t| !t.is_empty()).collect();
            if tokens.is_empty() {
                continue;
            }

            let kind = match parse_command(&tokens, line) {
                Ok(kind) => kind,
                Err(e) => return Some(Err(e)),
            };

            let request = Request::new(self.ids.next_id(), kind);
            if request.is_shutdown() {
                self.finished = true;
            }
            return Some(Ok(request));
        }
    }
}
