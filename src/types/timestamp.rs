//! Wall-clock timestamps for request timing
//!
//! Every request captures its arrival time when it is built, and every result
//! line captures the time it was emitted. Both render as
//! `<seconds>.<microseconds>` since the Unix epoch.

use chrono::{DateTime, Utc};
use std::fmt;

/// A wall-clock instant with microsecond rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Capture the current wall-clock time
    pub fn now() -> Self {
        Timestamp(Utc::now())
    }

    /// Build a timestamp from seconds and microseconds since the Unix epoch
    ///
    /// Returns `None` when the values are out of chrono's representable range
    /// or `micros` is not below one million.
    pub fn from_parts(secs: i64, micros: u32) -> Option<Self> {
        if micros >= 1_000_000 {
            return None;
        }
        DateTime::from_timestamp(secs, micros * 1_000).map(Timestamp)
    }

    /// Whole seconds since the Unix epoch
    pub fn secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Sub-second part in microseconds
    pub fn micros(&self) -> u32 {
        self.0.timestamp_subsec_micros()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.secs(), self.micros())
    }
}
