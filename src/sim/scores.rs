//! File-backed high-score table.
//!
//! ## File format
//!   TOML, one `[[scores]]` table per entry, best first:
//!
//!   ```toml
//!   [[scores]]
//!   score = 1200
//!   level = 5
//!   ```
//!
//! A missing file is an empty table. A file that fails to parse is logged
//! and treated as empty; it is overwritten on the next `record`.
//! Writes go to a sibling `.tmp` file first and are renamed into place.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::score::{
    beats_best, insert_ranked, ScoreEntry, ScoreRecorder, ScoreStore, MAX_HIGH_SCORES,
};
use crate::error::{AppError, AppResult};

#[derive(Serialize, Deserialize, Debug, Default)]
struct ScoreFile {
    #[serde(default)]
    scores: Vec<ScoreEntry>,
}

#[derive(Debug)]
pub struct FileScoreStore {
    path: PathBuf,
    entries: Vec<ScoreEntry>,
}

impl FileScoreStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        info!(path = %path.display(), count = entries.len(), "score table loaded");
        FileScoreStore { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> AppResult<()> {
        let body = toml::to_string(&ScoreFile { scores: self.entries.clone() })?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| AppError::ScoreFile {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, body).map_err(|source| AppError::ScoreFile {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| AppError::ScoreFile {
            path: self.path.clone(),
            source,
        })
    }
}

impl ScoreStore for FileScoreStore {
    fn high_scores(&self) -> Vec<ScoreEntry> {
        self.entries.clone()
    }
}

impl ScoreRecorder for FileScoreStore {
    /// Insert and persist. The in-memory table is updated even when the
    /// write fails.
    fn record(&mut self, entry: ScoreEntry) -> AppResult<()> {
        insert_ranked(&mut self.entries, entry);
        self.save()
    }

    /// Would `score` top the table?
    fn is_new_high_score(&self, score: u32) -> bool {
        beats_best(&self.entries, score)
    }
}

fn load_entries(path: &Path) -> Vec<ScoreEntry> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return vec![],
        Err(e) => {
            warn!(path = %path.display(), "could not read score file: {e}");
            return vec![];
        }
    };
    match toml::from_str::<ScoreFile>(&text) {
        Ok(file) => {
            let mut entries = file.scores;
            // Hand-edited files may be out of order
            entries.sort_by(|a, b| b.score.cmp(&a.score));
            entries.truncate(MAX_HIGH_SCORES);
            entries
        }
        Err(e) => {
            warn!(path = %path.display(), "score file parse error, starting empty: {e}");
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileScoreStore::open(dir.path().join("scores.toml"));
        assert!(store.high_scores().is_empty());
        assert!(store.is_new_high_score(1));
        assert!(!store.is_new_high_score(0));
    }

    #[test]
    fn record_persists_and_reloads_ranked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.toml");

        let mut store = FileScoreStore::open(&path);
        store.record(ScoreEntry::new(300, 2)).unwrap();
        store.record(ScoreEntry::new(900, 5)).unwrap();
        store.record(ScoreEntry::new(500, 3)).unwrap();
        assert!(!path.with_extension("tmp").exists());

        let reopened = FileScoreStore::open(&path);
        assert_eq!(reopened.high_scores(), vec![
            ScoreEntry::new(900, 5),
            ScoreEntry::new(500, 3),
            ScoreEntry::new(300, 2),
        ]);
        assert!(!reopened.is_new_high_score(900));
        assert!(reopened.is_new_high_score(901));
    }

    #[test]
    fn keeps_only_top_ten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.toml");
        let mut store = FileScoreStore::open(&path);
        for s in 1..=15 {
            store.record(ScoreEntry::new(s * 100, 1)).unwrap();
        }
        let reopened = FileScoreStore::open(&path);
        let scores: Vec<u32> = reopened.high_scores().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![1500, 1400, 1300, 1200, 1100, 1000, 900, 800, 700, 600]);
    }

    #[test]
    fn unordered_file_is_sorted_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.toml");
        std::fs::write(
            &path,
            "[[scores]]\nscore = 10\nlevel = 1\n\n[[scores]]\nscore = 70\nlevel = 3\n",
        )
        .unwrap();
        let store = FileScoreStore::open(&path);
        assert_eq!(store.high_scores()[0], ScoreEntry::new(70, 3));
    }

    #[test]
    fn corrupt_file_starts_empty_and_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        let mut store = FileScoreStore::open(&path);
        assert!(store.high_scores().is_empty());

        store.record(ScoreEntry::new(42, 1)).unwrap();
        let reopened = FileScoreStore::open(&path);
        assert_eq!(reopened.high_scores(), vec![ScoreEntry::new(42, 1)]);
    }
}
