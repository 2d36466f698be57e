//! SQLite cache for frequency analysis results
//!
//! Stores the per-segment estimate sequence for a recording so an
//! unchanged file is not re-analyzed. Invalidation is by file size and
//! modification time; the segment duration is part of the key because a
//! different segmentation yields a different sequence.

use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Cached analysis result for one recording.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEstimates {
    /// Path to the audio file
    pub path: PathBuf,
    /// File size in bytes (for cache invalidation)
    pub file_size: u64,
    /// File modification time as Unix timestamp (for cache invalidation)
    pub modified_time: u64,
    /// Segment duration the analysis ran with, in seconds
    pub segment_duration_secs: f32,
    /// Per-segment dominant frequency estimates, in Hz
    pub estimates: Vec<f32>,
}

/// Analysis cache backed by SQLite
pub struct AnalysisCache {
    conn: Connection,
}

impl AnalysisCache {
    /// SQL schema for the analyses table
    const SCHEMA: &'static str = r#"
        CREATE TABLE IF NOT EXISTS analyses (
            id INTEGER PRIMARY KEY,
            path TEXT NOT NULL,
            file_size INTEGER NOT NULL,
            modified_time INTEGER NOT NULL,
            segment_duration REAL NOT NULL,
            estimates TEXT NOT NULL,
            analyzed_at INTEGER NOT NULL,
            UNIQUE(path, segment_duration)
        );
        CREATE INDEX IF NOT EXISTS idx_analyses_path ON analyses(path);
    "#;

    /// Open or create a cache database at the given path
    pub fn open(db_path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        conn.execute_batch(Self::SCHEMA)?;
        Ok(Self { conn })
    }

    /// Default cache location under the platform data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("remo")
            .join("analysis.db")
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(Self::SCHEMA)?;
        Ok(Self { conn })
    }

    /// Get cached estimates if the file hasn't changed.
    ///
    /// Returns None if the file is not cached for this segment duration,
    /// or its size or modification time differ from the cached values.
    pub fn get(
        &self,
        path: &Path,
        file_size: u64,
        modified_time: u64,
        segment_duration_secs: f32,
    ) -> Option<CachedEstimates> {
        self.conn
            .query_row(
                "SELECT path, file_size, modified_time, segment_duration, estimates
                 FROM analyses
                 WHERE path = ?1 AND file_size = ?2 AND modified_time = ?3
                   AND segment_duration = ?4",
                params![
                    path.to_string_lossy().to_string(),
                    file_size,
                    modified_time,
                    segment_duration_secs as f64,
                ],
                |row| {
                    Ok(CachedEstimates {
                        path: PathBuf::from(row.get::<_, String>(0)?),
                        file_size: row.get(1)?,
                        modified_time: row.get(2)?,
                        segment_duration_secs: row.get::<_, f64>(3)? as f32,
                        estimates: decode_estimates(&row.get::<_, String>(4)?),
                    })
                },
            )
            .ok()
    }

    /// Store an analysis result, replacing any previous entry for the
    /// same path and segment duration.
    pub fn store(&self, analysis: &CachedEstimates) -> Result<(), CacheError> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        self.conn.execute(
            r#"INSERT OR REPLACE INTO analyses
               (path, file_size, modified_time, segment_duration, estimates, analyzed_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            params![
                analysis.path.to_string_lossy().to_string(),
                analysis.file_size,
                analysis.modified_time,
                analysis.segment_duration_secs as f64,
                encode_estimates(&analysis.estimates),
                now,
            ],
        )?;
        Ok(())
    }

    /// Remove all entries for a recording (any segment duration).
    pub fn remove(&self, path: &Path) -> Result<bool, CacheError> {
        let affected = self.conn.execute(
            "DELETE FROM analyses WHERE path = ?1",
            [path.to_string_lossy().to_string()],
        )?;
        Ok(affected > 0)
    }

    /// Number of cached analyses.
    pub fn count(&self) -> Result<usize, CacheError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM analyses", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Clear all cached data
    pub fn clear(&self) -> Result<(), CacheError> {
        self.conn.execute("DELETE FROM analyses", [])?;
        Ok(())
    }
}

/// Estimates are stored as space-separated decimal text; Rust's default
/// float formatting round-trips f32 exactly.
fn encode_estimates(estimates: &[f32]) -> String {
    estimates
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_estimates(text: &str) -> Vec<f32> {
    text.split_whitespace()
        .filter_map(|t| t.parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entry() -> CachedEstimates {
        CachedEstimates {
            path: PathBuf::from("/recordings/memo.m4a"),
            file_size: 48000,
            modified_time: 1700000000,
            segment_duration_secs: 1.0,
            estimates: vec![444.4, 433.1, 250.0],
        }
    }

    #[test]
    fn test_store_and_get() {
        let cache = AnalysisCache::in_memory().unwrap();
        let entry = test_entry();

        cache.store(&entry).unwrap();

        let retrieved = cache
            .get(&entry.path, entry.file_size, entry.modified_time, 1.0)
            .unwrap();
        assert_eq!(retrieved.estimates, vec![444.4, 433.1, 250.0]);
    }

    #[test]
    fn test_empty_estimates_roundtrip() {
        let cache = AnalysisCache::in_memory().unwrap();
        let mut entry = test_entry();
        entry.estimates = Vec::new();

        cache.store(&entry).unwrap();

        let retrieved = cache
            .get(&entry.path, entry.file_size, entry.modified_time, 1.0)
            .unwrap();
        assert!(retrieved.estimates.is_empty());
    }

    #[test]
    fn test_invalidation_on_file_size() {
        let cache = AnalysisCache::in_memory().unwrap();
        let entry = test_entry();

        cache.store(&entry).unwrap();
        assert!(cache
            .get(&entry.path, 999, entry.modified_time, 1.0)
            .is_none());
    }

    #[test]
    fn test_invalidation_on_modified_time() {
        let cache = AnalysisCache::in_memory().unwrap();
        let entry = test_entry();

        cache.store(&entry).unwrap();
        assert!(cache
            .get(&entry.path, entry.file_size, 1800000000, 1.0)
            .is_none());
    }

    #[test]
    fn test_segment_duration_is_part_of_key() {
        let cache = AnalysisCache::in_memory().unwrap();
        let entry = test_entry();

        cache.store(&entry).unwrap();
        assert!(cache
            .get(&entry.path, entry.file_size, entry.modified_time, 0.5)
            .is_none());

        // Both durations can coexist
        let mut half = test_entry();
        half.segment_duration_secs = 0.5;
        half.estimates = vec![440.0];
        cache.store(&half).unwrap();
        assert_eq!(cache.count().unwrap(), 2);
    }

    #[test]
    fn test_update_existing() {
        let cache = AnalysisCache::in_memory().unwrap();
        let mut entry = test_entry();

        cache.store(&entry).unwrap();

        entry.estimates = vec![500.0];
        cache.store(&entry).unwrap();

        assert_eq!(cache.count().unwrap(), 1);
        let retrieved = cache
            .get(&entry.path, entry.file_size, entry.modified_time, 1.0)
            .unwrap();
        assert_eq!(retrieved.estimates, vec![500.0]);
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = AnalysisCache::in_memory().unwrap();
        cache.store(&test_entry()).unwrap();

        assert!(cache.remove(&test_entry().path).unwrap());
        assert_eq!(cache.count().unwrap(), 0);
        assert!(!cache.remove(&test_entry().path).unwrap());

        cache.store(&test_entry()).unwrap();
        cache.clear().unwrap();
        assert_eq!(cache.count().unwrap(), 0);
    }
}
