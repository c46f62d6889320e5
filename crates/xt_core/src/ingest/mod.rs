//! # Event Ingestion
//!
//! Where match events come from. Every source returns the complete event
//! table of a match or a [`XtError::DataUnavailable`](crate::error::XtError)
//! error; retries and timeouts beyond the HTTP client's are left to callers.
//!
//! - `open_data` - Blocking HTTP client for the StatsBomb open-data repository
//! - `file` - Local directory of provider event files
//! - `cache` - Process-wide read-through cache keyed by match id

pub mod cache;
pub mod file;
pub mod open_data;

pub use cache::EventCache;
pub use file::FileSource;
pub use open_data::OpenDataSource;

use crate::error::Result;
use crate::models::events::{EventTable, MatchId};

/// A provider of complete match event tables.
pub trait EventSource: Send + Sync {
    fn fetch_events(&self, match_id: MatchId) -> Result<EventTable>;

    /// Human-readable description for logs and the CLI.
    fn describe(&self) -> String;
}

impl<S: EventSource + ?Sized> EventSource for Box<S> {
    fn fetch_events(&self, match_id: MatchId) -> Result<EventTable> {
        (**self).fetch_events(match_id)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
