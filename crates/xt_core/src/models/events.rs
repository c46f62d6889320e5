//! # Match Events
//!
//! Fixed-shape event records as consumed by the analysis pipeline, plus the
//! provider's nested JSON shape they are validated from.
//!
//! Validation happens exactly once, in [`Event::try_from`]: a provider record
//! without a team, type or period cannot take part in any computation and is
//! rejected. Every other field is optional and each analysis step decides for
//! itself whether a row is usable.

use serde::{Deserialize, Serialize};

use crate::error::EventError;

/// Provider match identifier.
pub type MatchId = u32;

/// Event type name of a pass.
pub const PASS_TYPE: &str = "Pass";

/// A location on the pitch in provider coordinates.
///
/// Serialized as `[x, y]`, the way the provider writes locations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct PitchPoint {
    pub x: f64,
    pub y: f64,
}

impl PitchPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Build a point from a provider coordinate list.
    ///
    /// Extra components (e.g. height on shot end locations) are ignored.
    /// Returns `None` for short lists or non-finite coordinates.
    pub fn from_components(components: &[f64]) -> Option<Self> {
        match components {
            [x, y, ..] if x.is_finite() && y.is_finite() => Some(Self::new(*x, *y)),
            _ => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for PitchPoint {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<PitchPoint> for [f64; 2] {
    fn from(p: PitchPoint) -> Self {
        [p.x, p.y]
    }
}

/// One action in a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Provider event id
    #[serde(default)]
    pub id: String,
    /// Position of the event in the provider's ordering
    #[serde(default)]
    pub index: u32,
    pub team: String,
    pub period: u8,
    #[serde(rename = "type")]
    pub event_type: String,
    /// Actor
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub pass_recipient: Option<String>,
    #[serde(default)]
    pub location: Option<PitchPoint>,
    /// Absent for incomplete passes without an end point
    #[serde(default)]
    pub pass_end_location: Option<PitchPoint>,
    /// Absent for completed passes
    #[serde(default)]
    pub pass_outcome: Option<String>,
    #[serde(default)]
    pub minute: u32,
    #[serde(default)]
    pub second: u32,
}

impl Event {
    pub fn new(team: impl Into<String>, period: u8, event_type: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            index: 0,
            team: team.into(),
            period,
            event_type: event_type.into(),
            player: None,
            pass_recipient: None,
            location: None,
            pass_end_location: None,
            pass_outcome: None,
            minute: 0,
            second: 0,
        }
    }

    /// A pass from `player` to `recipient`, starting at `from` and ending at `to`.
    pub fn pass(
        team: impl Into<String>,
        period: u8,
        player: impl Into<String>,
        recipient: impl Into<String>,
        from: (f64, f64),
        to: (f64, f64),
    ) -> Self {
        Self::new(team, period, PASS_TYPE)
            .with_player(player)
            .with_recipient(recipient)
            .with_location(PitchPoint::new(from.0, from.1))
            .with_end_location(PitchPoint::new(to.0, to.1))
    }

    pub fn with_player(mut self, player: impl Into<String>) -> Self {
        self.player = Some(player.into());
        self
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.pass_recipient = Some(recipient.into());
        self
    }

    pub fn with_location(mut self, location: PitchPoint) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_end_location(mut self, location: PitchPoint) -> Self {
        self.pass_end_location = Some(location);
        self
    }

    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.pass_outcome = Some(outcome.into());
        self
    }

    pub fn at(mut self, minute: u32, second: u32) -> Self {
        self.minute = minute;
        self.second = second;
        self
    }

    pub fn is_pass(&self) -> bool {
        self.event_type == PASS_TYPE
    }

    /// A pass with no recorded negative outcome.
    pub fn is_completed_pass(&self) -> bool {
        self.is_pass()
            && self
                .pass_outcome
                .as_deref()
                .map_or(true, |outcome| outcome.trim().is_empty())
    }
}

// ============================================================================
// Provider JSON shape
// ============================================================================

/// `{ "id": .., "name": .. }` reference used throughout the provider format.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPass {
    #[serde(default)]
    pub recipient: Option<NamedRef>,
    #[serde(default)]
    pub end_location: Option<Vec<f64>>,
    #[serde(default)]
    pub outcome: Option<NamedRef>,
}

/// A provider event record before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub period: Option<u8>,
    #[serde(default)]
    pub minute: Option<u32>,
    #[serde(default)]
    pub second: Option<u32>,
    #[serde(rename = "type", default)]
    pub event_type: Option<NamedRef>,
    #[serde(default)]
    pub team: Option<NamedRef>,
    #[serde(default)]
    pub player: Option<NamedRef>,
    #[serde(default)]
    pub location: Option<Vec<f64>>,
    #[serde(default)]
    pub pass: Option<RawPass>,
}

impl TryFrom<RawEvent> for Event {
    type Error = EventError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        let id = raw.id.unwrap_or_default();
        let malformed = |field| EventError::Malformed { id: id.clone(), field };

        let team = raw.team.ok_or_else(|| malformed("team"))?.name;
        let event_type = raw.event_type.ok_or_else(|| malformed("type"))?.name;
        let period = raw.period.ok_or_else(|| malformed("period"))?;
        let pass = raw.pass.unwrap_or_default();

        Ok(Event {
            index: raw.index.unwrap_or(0),
            team,
            period,
            event_type,
            player: raw.player.map(|p| p.name),
            pass_recipient: pass.recipient.map(|r| r.name),
            location: raw.location.as_deref().and_then(PitchPoint::from_components),
            pass_end_location: pass
                .end_location
                .as_deref()
                .and_then(PitchPoint::from_components),
            pass_outcome: pass.outcome.map(|o| o.name),
            minute: raw.minute.unwrap_or(0),
            second: raw.second.unwrap_or(0),
            id,
        })
    }
}

// ============================================================================
// EventTable
// ============================================================================

/// All events of one match, in provider order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTable {
    events: Vec<Event>,
}

impl EventTable {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// Validate provider records, dropping the malformed ones.
    pub fn from_raw(raw: Vec<RawEvent>) -> Self {
        let total = raw.len();
        let mut events = Vec::with_capacity(total);
        for record in raw {
            match Event::try_from(record) {
                Ok(event) => events.push(event),
                Err(e) => log::debug!("{e}"),
            }
        }

        let dropped = total - events.len();
        if dropped > 0 {
            log::warn!("Dropped {dropped} of {total} malformed provider events");
        }

        Self { events }
    }

    /// Parse a provider event file (a JSON array of raw events).
    pub fn from_provider_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: Vec<RawEvent> = serde_json::from_str(json)?;
        Ok(Self::from_raw(raw))
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Distinct team names in order of first appearance.
    pub fn teams(&self) -> Vec<String> {
        let mut teams: Vec<String> = Vec::new();
        for event in &self.events {
            if !teams.iter().any(|t| t == &event.team) {
                teams.push(event.team.clone());
            }
        }
        teams
    }

    /// Distinct periods, ascending.
    pub fn periods(&self) -> Vec<u8> {
        let mut periods: Vec<u8> = self.events.iter().map(|e| e.period).collect();
        periods.sort_unstable();
        periods.dedup();
        periods
    }
}

impl FromIterator<Event> for EventTable {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a EventTable {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
