//! Data models shared across the crate.

pub mod events;

pub use events::{Event, EventTable, MatchId, PitchPoint, RawEvent, PASS_TYPE};
