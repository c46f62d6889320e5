//! Provider event files on local disk.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, UnavailableReason, XtError};
use crate::ingest::EventSource;
use crate::models::events::{EventTable, MatchId};

/// Reads `{dir}/{match_id}.json` in the provider's format, e.g. a checkout of
/// the open-data repository's `data/events` directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, match_id: MatchId) -> PathBuf {
        self.dir.join(format!("{match_id}.json"))
    }
}

impl EventSource for FileSource {
    fn fetch_events(&self, match_id: MatchId) -> Result<EventTable> {
        let path = self.path_for(match_id);
        log::debug!("Reading events from {}", path.display());

        let json = fs::read_to_string(&path).map_err(|e| {
            let reason = if e.kind() == ErrorKind::NotFound {
                UnavailableReason::InvalidMatch
            } else {
                UnavailableReason::Provider
            };
            XtError::unavailable(match_id, reason, format!("{}: {e}", path.display()))
        })?;

        EventTable::from_provider_json(&json).map_err(|e| {
            XtError::unavailable(
                match_id,
                UnavailableReason::Decode,
                format!("{}: {e}", path.display()),
            )
        })
    }

    fn describe(&self) -> String {
        format!("event files in {}", self.dir.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_provider_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("15.json"),
            r#"[{"id": "e1", "period": 1, "type": {"name": "Pass"}, "team": {"name": "Home"},
                 "player": {"name": "A"}, "location": [1.0, 2.0],
                 "pass": {"recipient": {"name": "B"}, "end_location": [3.0, 4.0]}}]"#,
        )
        .unwrap();

        let source = FileSource::new(dir.path());
        let table = source.fetch_events(15).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.teams(), vec!["Home".to_string()]);
    }

    #[test]
    fn test_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("2.json"), "not json").unwrap();
        let source = FileSource::new(dir.path());

        assert!(matches!(
            source.fetch_events(1),
            Err(XtError::DataUnavailable {
                reason: UnavailableReason::InvalidMatch,
                ..
            })
        ));
        assert!(matches!(
            source.fetch_events(2),
            Err(XtError::DataUnavailable {
                reason: UnavailableReason::Decode,
                ..
            })
        ));
    }
}
