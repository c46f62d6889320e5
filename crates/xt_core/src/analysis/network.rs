//! # Passing Network
//!
//! Builds the passing network of one (team, period) selection: players placed
//! at the mean start location of their passes, and directed edges weighted by
//! how often one player found another.
//!
//! ## Algorithm
//! 1. Keep the selection's passes that have a passer, a recipient, a start and
//!    an end location; everything else is silently left out
//! 2. Mean-aggregate start locations per passer
//! 3. Count (passer, recipient) pairs; A→B and B→A are separate edges
//! 4. Anchor each edge at both endpoints' locations, dropping edges whose
//!    endpoint has no location
//!
//! With [`RecipientAnchor::PasserMean`] a player who only ever receives has no
//! location, so every edge into them is dropped. [`RecipientAnchor::IncludeReceivers`]
//! places such players at the mean end location of the passes they received.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::events::{Event, EventTable, PitchPoint};

/// Line width per completed pass on an edge, in points.
pub const EDGE_WIDTH_PER_PASS: f64 = 0.4;

/// The (team, period) filter every view is computed for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub team: String,
    pub period: u8,
}

impl Selection {
    pub fn new(team: impl Into<String>, period: u8) -> Self {
        Self {
            team: team.into(),
            period,
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        event.team == self.team && event.period == self.period
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} (period {})", self.team, self.period)
    }
}

/// Where edges into a player are anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientAnchor {
    /// Only passers get a location; edges into receive-only players vanish
    #[default]
    PasserMean,
    /// Receive-only players are placed at the mean end location of passes they received
    IncludeReceivers,
}

/// A network node: a player at their mean touch location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerLocation {
    pub player: String,
    pub x: f64,
    pub y: f64,
}

impl PlayerLocation {
    pub fn point(&self) -> PitchPoint {
        PitchPoint::new(self.x, self.y)
    }

    /// Short node label: the last word of the player's name.
    pub fn label(&self) -> &str {
        self.player.split_whitespace().last().unwrap_or(&self.player)
    }
}

/// A directed, weighted network edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassEdge {
    pub passer: String,
    pub recipient: String,
    pub x_start: f64,
    pub y_start: f64,
    pub x_end: f64,
    pub y_end: f64,
    pub pass_count: u32,
}

impl PassEdge {
    pub fn line_width(&self) -> f64 {
        self.pass_count as f64 * EDGE_WIDTH_PER_PASS
    }
}

/// Aggregate network statistics for one selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkSummary {
    /// Passes that survived the completeness filter
    pub total_passes: u32,
    /// Distinct directed edges (self-passes excluded)
    pub unique_edges: u32,
    /// unique edges / max possible directed edges
    pub density: f64,
    /// Bidirectional pairs / connected pairs
    pub reciprocity: f64,
}

/// Nodes and edges of one selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PassNetwork {
    /// Ordered by player name
    pub nodes: Vec<PlayerLocation>,
    /// Ordered by (passer, recipient)
    pub edges: Vec<PassEdge>,
    /// Passes the network was built from
    pub total_passes: u32,
}

/// A pass usable for the network.
#[derive(Debug, Clone, Copy)]
struct NetworkPass<'a> {
    passer: &'a str,
    recipient: &'a str,
    start: PitchPoint,
    end: PitchPoint,
}

#[derive(Debug, Default, Clone, Copy)]
struct MeanAcc {
    sum_x: f64,
    sum_y: f64,
    n: u32,
}

impl MeanAcc {
    fn add(&mut self, p: PitchPoint) {
        self.sum_x += p.x;
        self.sum_y += p.y;
        self.n += 1;
    }

    fn mean(&self) -> PitchPoint {
        let n = self.n.max(1) as f64;
        PitchPoint::new(self.sum_x / n, self.sum_y / n)
    }
}

/// Passes of the selection, in event order.
pub fn filter_passes<'a>(table: &'a EventTable, selection: &Selection) -> Vec<&'a Event> {
    table
        .iter()
        .filter(|e| selection.matches(e) && e.is_pass())
        .collect()
}

fn network_passes<'a>(table: &'a EventTable, selection: &Selection) -> Vec<NetworkPass<'a>> {
    filter_passes(table, selection)
        .into_iter()
        .filter_map(|e| {
            Some(NetworkPass {
                passer: e.player.as_deref()?,
                recipient: e.pass_recipient.as_deref()?,
                start: e.location.filter(PitchPoint::is_finite)?,
                end: e.pass_end_location.filter(PitchPoint::is_finite)?,
            })
        })
        .collect()
}

/// Build the passing network for one selection.
pub fn build_pass_network(
    table: &EventTable,
    selection: &Selection,
    anchor: RecipientAnchor,
) -> PassNetwork {
    let passes = network_passes(table, selection);
    if passes.is_empty() {
        return PassNetwork::default();
    }

    let mut passer_acc: BTreeMap<&str, MeanAcc> = BTreeMap::new();
    let mut pair_counts: BTreeMap<(&str, &str), u32> = BTreeMap::new();
    for pass in &passes {
        passer_acc.entry(pass.passer).or_default().add(pass.start);
        *pair_counts.entry((pass.passer, pass.recipient)).or_insert(0) += 1;
    }

    let mut locations: BTreeMap<&str, PitchPoint> =
        passer_acc.iter().map(|(p, acc)| (*p, acc.mean())).collect();

    if anchor == RecipientAnchor::IncludeReceivers {
        let mut receiver_acc: BTreeMap<&str, MeanAcc> = BTreeMap::new();
        for pass in passes.iter().filter(|p| !passer_acc.contains_key(p.recipient)) {
            receiver_acc.entry(pass.recipient).or_default().add(pass.end);
        }
        locations.extend(receiver_acc.iter().map(|(p, acc)| (*p, acc.mean())));
    }

    let mut dropped = 0u32;
    let mut edges = Vec::with_capacity(pair_counts.len());
    for ((passer, recipient), pass_count) in pair_counts {
        let (Some(start), Some(end)) = (locations.get(passer), locations.get(recipient)) else {
            dropped += pass_count;
            continue;
        };
        edges.push(PassEdge {
            passer: passer.to_string(),
            recipient: recipient.to_string(),
            x_start: start.x,
            y_start: start.y,
            x_end: end.x,
            y_end: end.y,
            pass_count,
        });
    }

    if dropped > 0 {
        log::debug!("{selection}: {dropped} passes to players without a location left out of the network");
    }

    let nodes = locations
        .into_iter()
        .map(|(player, p)| PlayerLocation {
            player: player.to_string(),
            x: p.x,
            y: p.y,
        })
        .collect();

    PassNetwork {
        nodes,
        edges,
        total_passes: passes.len() as u32,
    }
}

impl PassNetwork {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, player: &str) -> Option<&PlayerLocation> {
        self.nodes.iter().find(|n| n.player == player)
    }

    pub fn edge(&self, passer: &str, recipient: &str) -> Option<&PassEdge> {
        self.edges
            .iter()
            .find(|e| e.passer == passer && e.recipient == recipient)
    }

    /// Locations of players that anchor at least one edge.
    pub fn hull_candidates(&self) -> Vec<PitchPoint> {
        let connected: BTreeSet<&str> = self
            .edges
            .iter()
            .flat_map(|e| [e.passer.as_str(), e.recipient.as_str()])
            .collect();

        self.nodes
            .iter()
            .filter(|n| connected.contains(n.player.as_str()))
            .map(PlayerLocation::point)
            .collect()
    }

    pub fn summary(&self) -> NetworkSummary {
        let directed: BTreeSet<(&str, &str)> = self
            .edges
            .iter()
            .filter(|e| e.passer != e.recipient)
            .map(|e| (e.passer.as_str(), e.recipient.as_str()))
            .collect();

        let n = self.nodes.len() as f64;
        let max_edges = n * (n - 1.0);
        let density = if max_edges > 0.0 {
            directed.len() as f64 / max_edges
        } else {
            0.0
        };

        let mut total_pairs = 0u32;
        let mut bidirectional_pairs = 0u32;
        for &(a, b) in &directed {
            let reverse = directed.contains(&(b, a));
            // Count each unordered pair once
            if a < b || !reverse {
                total_pairs += 1;
                if reverse {
                    bidirectional_pairs += 1;
                }
            }
        }
        let reciprocity = if total_pairs > 0 {
            bidirectional_pairs as f64 / total_pairs as f64
        } else {
            0.0
        };

        NetworkSummary {
            total_passes: self.total_passes,
            unique_edges: directed.len() as u32,
            density,
            reciprocity,
        }
    }
}
