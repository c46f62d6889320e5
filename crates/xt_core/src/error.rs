use thiserror::Error;

use crate::models::events::MatchId;

/// Why the data provider could not supply a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// Network or provider-side failure
    Provider,
    /// The match identifier is unknown to the provider
    InvalidMatch,
    /// The provider rejected our credentials
    Authentication,
    /// The payload could not be decoded
    Decode,
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            UnavailableReason::Provider => write!(f, "provider failure"),
            UnavailableReason::InvalidMatch => write!(f, "invalid match id"),
            UnavailableReason::Authentication => write!(f, "authentication failure"),
            UnavailableReason::Decode => write!(f, "undecodable payload"),
        }
    }
}

#[derive(Error, Debug)]
pub enum XtError {
    #[error("Data unavailable for match {match_id} ({reason}): {detail}")]
    DataUnavailable {
        match_id: MatchId,
        reason: UnavailableReason,
        detail: String,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid threat grid: {0}")]
    InvalidGrid(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl XtError {
    pub fn unavailable(match_id: MatchId, reason: UnavailableReason, detail: impl Into<String>) -> Self {
        XtError::DataUnavailable {
            match_id,
            reason,
            detail: detail.into(),
        }
    }

    /// Fatal errors invalidate the whole view; the rest only drop one visual element.
    pub fn is_fatal(&self) -> bool {
        match self {
            XtError::DataUnavailable { .. } => true,
            XtError::InvalidGrid(_) => true,
            XtError::Config(_) => true,
            XtError::InsufficientData(_) => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// A raw provider record that cannot become an [`Event`](crate::models::events::Event).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Malformed event {id}: missing {field}")]
    Malformed { id: String, field: &'static str },
}

pub type Result<T> = std::result::Result<T, XtError>;
