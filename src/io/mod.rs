//! I/O module
//!
//! Handles command input and result output.
//!
//! # Components
//!
//! - `command_format` - Command text grammar (tokens to request kinds)
//! - `command_reader` - Streaming command reader with iterator interface
//! - `result_sink` - Serialized, line-atomic result output
//! - `balances_csv` - Final balances report

pub mod balances_csv;
pub mod command_format;
pub mod command_reader;
pub mod result_sink;

pub use balances_csv::write_balances_csv;
pub use command_format::parse_command;
pub use command_reader::CommandReader;
pub use result_sink::WriterSink;
