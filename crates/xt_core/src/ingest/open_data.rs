//! StatsBomb open-data client.

use std::time::Duration;

use reqwest::StatusCode;

use crate::config::DashboardConfig;
use crate::error::{Result, UnavailableReason, XtError};
use crate::ingest::EventSource;
use crate::models::events::{EventTable, MatchId, RawEvent};

const USER_AGENT: &str = concat!("xtdash/", env!("CARGO_PKG_VERSION"));

/// Fetches `{base_url}/events/{match_id}.json` over HTTP.
pub struct OpenDataSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl OpenDataSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &DashboardConfig) -> reqwest::Result<Self> {
        Self::new(
            config.provider_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn events_url(&self, match_id: MatchId) -> String {
        format!("{}/events/{match_id}.json", self.base_url.trim_end_matches('/'))
    }
}

/// Map a non-success HTTP status onto the unavailable-data taxonomy.
pub fn classify_status(status: StatusCode) -> UnavailableReason {
    match status {
        StatusCode::NOT_FOUND => UnavailableReason::InvalidMatch,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => UnavailableReason::Authentication,
        _ => UnavailableReason::Provider,
    }
}

impl EventSource for OpenDataSource {
    fn fetch_events(&self, match_id: MatchId) -> Result<EventTable> {
        let url = self.events_url(match_id);
        log::info!("Fetching events for match {match_id} from {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| XtError::unavailable(match_id, UnavailableReason::Provider, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(XtError::unavailable(
                match_id,
                classify_status(status),
                format!("HTTP {status} from {url}"),
            ));
        }

        let raw: Vec<RawEvent> = response
            .json()
            .map_err(|e| XtError::unavailable(match_id, UnavailableReason::Decode, e.to_string()))?;

        let table = EventTable::from_raw(raw);
        log::info!("Loaded {} events for match {match_id}", table.len());
        Ok(table)
    }

    fn describe(&self) -> String {
        format!("open data at {}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_url_joins_cleanly() {
        let source = OpenDataSource::new("https://example.org/data/", Duration::from_secs(5)).unwrap();
        assert_eq!(source.events_url(7580), "https://example.org/data/events/7580.json");
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(classify_status(StatusCode::NOT_FOUND), UnavailableReason::InvalidMatch);
        assert_eq!(classify_status(StatusCode::FORBIDDEN), UnavailableReason::Authentication);
        assert_eq!(classify_status(StatusCode::UNAUTHORIZED), UnavailableReason::Authentication);
        assert_eq!(classify_status(StatusCode::BAD_GATEWAY), UnavailableReason::Provider);
    }

    #[test]
    fn test_unreachable_provider_is_data_unavailable() {
        // Nothing listens on the discard port
        let source = OpenDataSource::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = source.fetch_events(1).unwrap_err();
        assert!(matches!(
            err,
            XtError::DataUnavailable {
                match_id: 1,
                reason: UnavailableReason::Provider,
                ..
            }
        ));
    }
}
