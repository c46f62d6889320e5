//! # xt_core - Passing Network & Expected Threat Engine
//!
//! Turns the event data of one football match into what a tactical dashboard
//! shows for a (team, period) selection:
//!
//! - a passing network (players at their mean pass location, directed edges
//!   weighted by pass count)
//! - the team shape, as the convex hull of the connected players
//! - the completed passes that added the most expected threat (xT)
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = DashboardConfig::resolve(None)?;
//! let cache = EventCache::new(OpenDataSource::from_config(&config)?);
//! let dashboard = MatchDashboard::load(&cache, config)?;
//! let view = dashboard.view(&Selection::new("Barcelona", 1));
//! ```

pub mod analysis;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod ingest;
pub mod models;

pub use analysis::{
    build_pass_network, rank_passes, score_passes, PassEdge, PassNetwork, PitchDims,
    PlayerLocation, RecipientAnchor, ScoredPass, Selection, TeamShape, ThreatGrid, TopPass,
};
pub use config::DashboardConfig;
pub use dashboard::{DashboardView, MatchDashboard, Notice};
pub use error::{ConfigError, EventError, Result, UnavailableReason, XtError};
pub use ingest::{EventCache, EventSource, FileSource, OpenDataSource};
pub use models::{Event, EventTable, MatchId, PitchPoint};
