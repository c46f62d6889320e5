//! # Match Dashboard
//!
//! Everything the dashboard shows for one (team, period) selection, computed
//! from scratch on every call. Nothing derived is kept between selections;
//! only the raw event table is shared.

use std::sync::Arc;

use serde::Serialize;

use crate::analysis::network::{build_pass_network, NetworkSummary, PassEdge, PlayerLocation, Selection};
use crate::analysis::ranking::{rank_passes, TopPass};
use crate::analysis::shape::TeamShape;
use crate::analysis::threat::score_passes;
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::ingest::{EventCache, EventSource};
use crate::models::events::{EventTable, MatchId, PitchPoint};

/// A visual element that was left out, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// No usable passes for the network
    EmptyNetwork,
    /// Fewer than three connected players, or all of them on one line
    ShapeSkipped { eligible_players: usize },
    /// No completed pass could be valued
    ThreatUnavailable { message: String },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Notice::EmptyNetwork => write!(f, "No pass data to build a passing network."),
            Notice::ShapeSkipped { eligible_players } => write!(
                f,
                "Team shape not drawn: {eligible_players} connected players do not enclose an area."
            ),
            Notice::ThreatUnavailable { message } => {
                write!(f, "Not enough pass data to calculate Expected Threat (xT): {message}.")
            }
        }
    }
}

/// The presentation payload for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub selection: Selection,
    pub nodes: Vec<PlayerLocation>,
    pub edges: Vec<PassEdge>,
    /// Empty when the shape was skipped
    pub hull: Vec<PitchPoint>,
    pub shape: Option<TeamShape>,
    pub top_passes: Vec<TopPass>,
    pub summary: NetworkSummary,
    pub notices: Vec<Notice>,
}

/// One match's events plus the settings every view is computed with.
pub struct MatchDashboard {
    match_id: MatchId,
    events: Arc<EventTable>,
    config: DashboardConfig,
}

impl MatchDashboard {
    pub fn new(match_id: MatchId, events: Arc<EventTable>, config: DashboardConfig) -> Self {
        Self {
            match_id,
            events,
            config,
        }
    }

    /// Dashboard for the configured match, going through the cache.
    pub fn load<S: EventSource>(cache: &EventCache<S>, config: DashboardConfig) -> Result<Self> {
        let match_id = config.match_id;
        let events = cache.get_or_fetch(match_id)?;
        Ok(Self::new(match_id, events, config))
    }

    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    pub fn events(&self) -> &EventTable {
        &self.events
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Team selector options.
    pub fn teams(&self) -> Vec<String> {
        self.events.teams()
    }

    /// Period selector options.
    pub fn periods(&self) -> Vec<u8> {
        self.events.periods()
    }

    /// First team, lowest period.
    pub fn default_selection(&self) -> Option<Selection> {
        let team = self.teams().into_iter().next()?;
        let period = self.periods().into_iter().next()?;
        Some(Selection::new(team, period))
    }

    pub fn view(&self, selection: &Selection) -> DashboardView {
        let mut notices = Vec::new();

        let network = build_pass_network(&self.events, selection, self.config.recipient_anchor);
        if network.is_empty() {
            notices.push(Notice::EmptyNetwork);
        }

        let candidates = network.hull_candidates();
        let shape = TeamShape::from_points(&candidates);
        if shape.is_none() && !network.is_empty() {
            notices.push(Notice::ShapeSkipped {
                eligible_players: candidates.len(),
            });
        }

        let top_passes = match score_passes(
            &self.events,
            selection,
            &self.config.threat_grid,
            self.config.pitch,
        ) {
            Ok(scored) => rank_passes(&scored, self.config.top_n),
            Err(e) => {
                log::info!("{e}");
                notices.push(Notice::ThreatUnavailable {
                    message: e.to_string(),
                });
                Vec::new()
            }
        };

        let summary = network.summary();
        DashboardView {
            selection: selection.clone(),
            hull: shape.as_ref().map(|s| s.hull.clone()).unwrap_or_default(),
            shape,
            nodes: network.nodes,
            edges: network.edges,
            top_passes,
            summary,
            notices,
        }
    }
}
