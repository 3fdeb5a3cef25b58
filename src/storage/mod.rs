//! Name persistence.
//!
//! Plain UTF-8 text files under one data directory, per style:
//! `{style}_names.txt` holds one accepted name per line and is append-only;
//! `{style}_metadata.txt` accumulates one summary line per run. The corpus
//! snapshot for a synthesis run is read once from the names file at run
//! start; writes are serialized by running one synthesis per style at a
//! time.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

use crate::engine::SynthesisStats;

/// Persistence errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// File-backed persistence collaborator.
#[derive(Debug, Clone)]
pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Create a manager rooted at `base_dir`, creating the directory if
    /// needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        tracing::info!(base_dir = %base_dir.display(), "storage initialized");
        Ok(Self { base_dir })
    }

    fn names_path(&self, style: &str) -> PathBuf {
        self.base_dir.join(format!("{style}_names.txt"))
    }

    fn metadata_path(&self, style: &str) -> PathBuf {
        self.base_dir.join(format!("{style}_metadata.txt"))
    }

    /// Read the full corpus for a style; a missing file is an empty corpus.
    pub fn corpus_snapshot(&self, style: &str) -> Result<Vec<String>, StorageError> {
        let path = self.names_path(style);
        if !path.exists() {
            return Ok(Vec::new());
        }
        Ok(fs::read_to_string(path)?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Append accepted names, one per line; returns the number written.
    pub fn append_names(&self, style: &str, names: &[String]) -> Result<usize, StorageError> {
        if names.is_empty() {
            tracing::warn!(style, "no names to append");
            return Ok(0);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.names_path(style))?;
        for name in names {
            writeln!(file, "{}", name.trim())?;
        }

        tracing::info!(style, appended = names.len(), "names appended");
        Ok(names.len())
    }

    /// Append one run's summary line to the style's metadata file.
    pub fn write_run_metadata(
        &self,
        style: &str,
        stats: &SynthesisStats,
    ) -> Result<(), StorageError> {
        let considered = stats.considered.max(1) as f64;
        let filtered = stats.rejected_length
            + stats.rejected_repeat
            + stats.rejected_forbidden_pair
            + stats.rejected_charset;
        let filter_rate = filtered as f64 / considered * 100.0;
        let dedup_rate = stats.rejected_duplicate as f64 / considered * 100.0;

        let line = format!(
            "{} | count={} | filter_rate={:.1}% | dedup_rate={:.1}%\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            stats.accepted,
            filter_rate,
            dedup_rate,
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.metadata_path(style))?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Total persisted names for a style.
    pub fn count(&self, style: &str) -> Result<usize, StorageError> {
        Ok(self.corpus_snapshot(style)?.len())
    }

    /// The most recent `limit` names, or everything when `limit` is 0.
    pub fn recent_names(&self, style: &str, limit: usize) -> Result<Vec<String>, StorageError> {
        let mut names = self.corpus_snapshot(style)?;
        if limit > 0 && names.len() > limit {
            names.drain(..names.len() - limit);
        }
        Ok(names)
    }

    /// Copy a style's names file to another location.
    pub fn export(&self, style: &str, destination: &Path) -> Result<(), StorageError> {
        fs::copy(self.names_path(style), destination)?;
        tracing::info!(style, destination = %destination.display(), "corpus exported");
        Ok(())
    }

    /// Delete a style's names file. Irreversible.
    pub fn clear(&self, style: &str) -> Result<(), StorageError> {
        let path = self.names_path(style);
        if path.exists() {
            fs::remove_file(path)?;
            tracing::warn!(style, "corpus cleared");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_snapshot_of_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        assert!(storage.corpus_snapshot("古风").unwrap().is_empty());
    }

    #[test]
    fn test_append_is_incremental() {
        let dir = TempDir::new().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();

        assert_eq!(storage.append_names("古风", &names(&["云轩", "月阁"])).unwrap(), 2);
        assert_eq!(storage.append_names("古风", &names(&["风亭"])).unwrap(), 1);

        assert_eq!(
            storage.corpus_snapshot("古风").unwrap(),
            names(&["云轩", "月阁", "风亭"])
        );
        assert_eq!(storage.count("古风").unwrap(), 3);
    }

    #[test]
    fn test_recent_names_returns_tail() {
        let dir = TempDir::new().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        storage
            .append_names("古风", &names(&["一", "二", "三", "四"]))
            .unwrap();

        assert_eq!(storage.recent_names("古风", 2).unwrap(), names(&["三", "四"]));
        assert_eq!(storage.recent_names("古风", 0).unwrap().len(), 4);
    }

    #[test]
    fn test_metadata_line_format() {
        let dir = TempDir::new().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();

        let stats = SynthesisStats {
            considered: 100,
            rejected_length: 10,
            rejected_repeat: 5,
            rejected_forbidden_pair: 0,
            rejected_charset: 5,
            rejected_duplicate: 20,
            accepted: 60,
            shortfall: false,
        };
        storage.write_run_metadata("古风", &stats).unwrap();

        let content = std::fs::read_to_string(dir.path().join("古风_metadata.txt")).unwrap();
        assert!(content.contains("count=60"));
        assert!(content.contains("filter_rate=20.0%"));
        assert!(content.contains("dedup_rate=20.0%"));
    }

    #[test]
    fn test_clear_removes_corpus() {
        let dir = TempDir::new().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        storage.append_names("古风", &names(&["云轩"])).unwrap();

        storage.clear("古风").unwrap();
        assert_eq!(storage.count("古风").unwrap(), 0);
        // Clearing an absent corpus is a no-op.
        storage.clear("古风").unwrap();
    }

    #[test]
    fn test_export_copies_file() {
        let dir = TempDir::new().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        storage.append_names("古风", &names(&["云轩"])).unwrap();

        let destination = dir.path().join("out.txt");
        storage.export("古风", &destination).unwrap();
        assert_eq!(std::fs::read_to_string(destination).unwrap(), "云轩\n");
    }
}
