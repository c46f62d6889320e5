//! # Analysis Module
//!
//! The expected-threat attribution engine for one (team, period) selection.
//!
//! - `network` - Pass filtering, player locations, directed pass edges
//! - `shape` - Convex hull team shape
//! - `threat` - xT grid binning and pass scoring
//! - `ranking` - Top passes by threat added

pub mod network;
pub mod ranking;
pub mod shape;
pub mod threat;

pub use network::{
    build_pass_network, filter_passes, NetworkSummary, PassEdge, PassNetwork, PlayerLocation,
    RecipientAnchor, Selection,
};
pub use ranking::{rank_passes, TopPass, DEFAULT_TOP_N};
pub use shape::{convex_hull, polygon_area, TeamShape};
pub use threat::{bin, score_passes, PitchDims, ScoredPass, ThreatGrid};
