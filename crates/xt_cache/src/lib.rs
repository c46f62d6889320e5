//! Event Snapshot Library
//!
//! EventTable → MessagePack → LZ4 → SHA256 checksum
//!
//! Snapshots let the dashboard work offline once a match has been fetched,
//! and skip the provider round trip on later runs.

pub mod source;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use xt_core::EventTable;

pub use source::SnapshotSource;

/// Current snapshot layout.
pub const SCHEMA_VERSION: &str = "v1";

/// Snapshot metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Schema version (e.g. "v1")
    pub schema_version: String,
    /// Number of events stored
    pub event_count: usize,
    /// SHA256 of the compressed bytes (hex)
    pub checksum: String,
    /// Creation time (RFC3339)
    pub created_at: String,
    /// MessagePack size (bytes)
    pub original_size: u64,
    /// Size after compression (bytes)
    pub compressed_size: u64,
    /// compressed / original
    pub compression_ratio: f64,
}

/// Hex SHA256 of `bytes`.
pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Write an event table as a MessagePack+LZ4 snapshot.
///
/// # Arguments
///
/// * `table` - Events to store
/// * `output` - Snapshot file path
/// * `schema_version` - Schema version string
///
/// # Returns
///
/// Metadata of the written snapshot
pub fn write_snapshot(
    table: &EventTable,
    output: &Path,
    schema_version: &str,
) -> Result<SnapshotMetadata> {
    let msgpack_bytes =
        rmp_serde::to_vec_named(table).context("Failed to serialize events to MessagePack")?;
    let original_size = msgpack_bytes.len() as u64;

    // Size-prepended so the reader can allocate up front
    let compressed = lz4_flex::compress_prepend_size(&msgpack_bytes);
    let compressed_size = compressed.len() as u64;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    fs::write(output, &compressed)
        .with_context(|| format!("Failed to write snapshot: {}", output.display()))?;

    log::debug!(
        "Wrote {} events to {} ({} bytes)",
        table.len(),
        output.display(),
        compressed_size
    );

    Ok(SnapshotMetadata {
        schema_version: schema_version.to_string(),
        event_count: table.len(),
        checksum: checksum(&compressed),
        created_at: chrono::Utc::now().to_rfc3339(),
        original_size,
        compressed_size,
        compression_ratio: compressed_size as f64 / original_size.max(1) as f64,
    })
}

/// Check a snapshot file against an expected checksum.
pub fn verify_snapshot(path: &Path, expected_checksum: &str) -> Result<bool> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    Ok(checksum(&bytes) == expected_checksum.trim().to_lowercase())
}

/// Decompress and decode a snapshot.
pub fn load_snapshot(path: &Path) -> Result<EventTable> {
    let compressed =
        fs::read(path).with_context(|| format!("Failed to read snapshot: {}", path.display()))?;

    let msgpack_bytes =
        lz4_flex::decompress_size_prepended(&compressed).context("Failed to decompress LZ4")?;

    let table: EventTable =
        rmp_serde::from_slice(&msgpack_bytes).context("Failed to deserialize MessagePack")?;

    Ok(table)
}

/// Store metadata as pretty JSON next to a snapshot.
pub fn save_metadata(path: &Path, meta: &SnapshotMetadata) -> Result<()> {
    let json = serde_json::to_string_pretty(meta)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write metadata: {}", path.display()))?;
    Ok(())
}

pub fn load_metadata(path: &Path) -> Result<SnapshotMetadata> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read metadata: {}", path.display()))?;
    serde_json::from_str(&json).context("Failed to parse snapshot metadata")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use xt_core::{Event, PitchPoint};

    fn sample_table() -> EventTable {
        let mut events = Vec::new();
        for i in 0..200u32 {
            let mut e = Event::pass(
                "Barcelona",
                1 + (i % 2) as u8,
                "Xavi Hernández Creus",
                "Andrés Iniesta Luján",
                (40.0 + (i % 10) as f64, 30.0),
                (60.0, 35.5),
            )
            .at(i / 4, i % 60);
            if i % 7 == 0 {
                e = e.with_outcome("Incomplete");
            }
            events.push(e);
        }
        events.push(Event::new("Real Madrid", 2, "Pressure").with_location(PitchPoint::new(80.0, 20.0)));
        EventTable::new(events)
    }

    #[test]
    fn test_write_verify_load() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/7580.msgpack.lz4");
        let table = sample_table();

        let meta = write_snapshot(&table, &path, SCHEMA_VERSION)?;
        assert_eq!(meta.schema_version, "v1");
        assert_eq!(meta.event_count, 201);
        assert!(verify_snapshot(&path, &meta.checksum)?);
        assert!(!verify_snapshot(&path, "deadbeef")?);

        let loaded = load_snapshot(&path)?;
        assert_eq!(loaded, table);
        Ok(())
    }

    #[test]
    fn test_repetitive_events_compress() -> Result<()> {
        let dir = tempdir()?;
        let meta = write_snapshot(&sample_table(), &dir.path().join("s.lz4"), SCHEMA_VERSION)?;
        assert!(meta.compression_ratio < 0.5);
        Ok(())
    }

    #[test]
    fn test_metadata_sidecar() -> Result<()> {
        let dir = tempdir()?;
        let meta = write_snapshot(&sample_table(), &dir.path().join("s.lz4"), SCHEMA_VERSION)?;
        let meta_path = dir.path().join("s.meta.json");
        save_metadata(&meta_path, &meta)?;
        let loaded = load_metadata(&meta_path)?;
        assert_eq!(loaded.checksum, meta.checksum);
        assert_eq!(loaded.event_count, meta.event_count);
        assert_eq!(loaded.compressed_size, meta.compressed_size);
        Ok(())
    }

    #[test]
    fn test_corrupt_snapshot_fails_to_load() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("bad.lz4");
        // Claims 5 bytes of payload, followed by garbage
        fs::write(&path, b"\x05\x00\x00\x00garbage")?;
        assert!(load_snapshot(&path).is_err());
        Ok(())
    }
}
