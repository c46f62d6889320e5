//! Disk read-through layer over another event source.

use std::path::{Path, PathBuf};

use xt_core::{EventSource, EventTable, MatchId};

use crate::{
    load_metadata, load_snapshot, save_metadata, verify_snapshot, write_snapshot, SCHEMA_VERSION,
};

/// Serves `{dir}/{match_id}.msgpack.lz4` when present and intact, otherwise
/// fetches from the inner source and stores the result.
pub struct SnapshotSource<S> {
    inner: S,
    dir: PathBuf,
}

impl<S: EventSource> SnapshotSource<S> {
    pub fn new<P: AsRef<Path>>(inner: S, dir: P) -> Self {
        Self {
            inner,
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn snapshot_path(&self, match_id: MatchId) -> PathBuf {
        self.dir.join(format!("{match_id}.msgpack.lz4"))
    }

    pub fn metadata_path(&self, match_id: MatchId) -> PathBuf {
        self.dir.join(format!("{match_id}.meta.json"))
    }

    fn load_verified(&self, match_id: MatchId) -> anyhow::Result<Option<EventTable>> {
        let path = self.snapshot_path(match_id);
        if !path.exists() {
            return Ok(None);
        }

        let meta_path = self.metadata_path(match_id);
        if meta_path.exists() {
            let meta = load_metadata(&meta_path)?;
            if meta.schema_version != SCHEMA_VERSION {
                log::info!(
                    "Snapshot {} has schema {}, expected {SCHEMA_VERSION}",
                    path.display(),
                    meta.schema_version
                );
                return Ok(None);
            }
            if !verify_snapshot(&path, &meta.checksum)? {
                anyhow::bail!("checksum mismatch for {}", path.display());
            }
        }

        load_snapshot(&path).map(Some)
    }

    fn persist(&self, match_id: MatchId, table: &EventTable) -> anyhow::Result<()> {
        let meta = write_snapshot(table, &self.snapshot_path(match_id), SCHEMA_VERSION)?;
        save_metadata(&self.metadata_path(match_id), &meta)
    }
}

impl<S: EventSource> EventSource for SnapshotSource<S> {
    fn fetch_events(&self, match_id: MatchId) -> xt_core::Result<EventTable> {
        match self.load_verified(match_id) {
            Ok(Some(table)) => {
                log::info!("Loaded {} events for match {match_id} from snapshot", table.len());
                return Ok(table);
            }
            Ok(None) => {}
            Err(e) => log::warn!("Ignoring snapshot for match {match_id}: {e:#}"),
        }

        let table = self.inner.fetch_events(match_id)?;
        if let Err(e) = self.persist(match_id, &table) {
            log::warn!("Failed to store snapshot for match {match_id}: {e:#}");
        }
        Ok(table)
    }

    fn describe(&self) -> String {
        format!("snapshots in {} over {}", self.dir.display(), self.inner.describe())
    }
}
