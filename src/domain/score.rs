//! High-score entries and the read-only store interface the scenes consume.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::error::AppResult;

/// Number of entries kept and displayed.
pub const MAX_HIGH_SCORES: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u32,
    pub level: u32,
}

impl ScoreEntry {
    pub fn new(score: u32, level: u32) -> Self {
        ScoreEntry { score, level }
    }
}

/// Ranked score source. Implementations return entries best-first;
/// consumers display at most `MAX_HIGH_SCORES` of them in the given order.
pub trait ScoreStore {
    fn high_scores(&self) -> Vec<ScoreEntry>;
}

impl<S: ScoreStore + ?Sized> ScoreStore for RefCell<S> {
    fn high_scores(&self) -> Vec<ScoreEntry> {
        self.borrow().high_scores()
    }
}

/// Host-side view of the store: the scenes only ever read, the host
/// decides when a finished run is written.
pub trait ScoreRecorder: ScoreStore {
    fn record(&mut self, entry: ScoreEntry) -> AppResult<()>;
    fn is_new_high_score(&self, score: u32) -> bool;
}

/// Is `score` strictly better than everything in `ranked`?
/// Zero never counts as a high score.
pub fn beats_best(ranked: &[ScoreEntry], score: u32) -> bool {
    score > 0 && ranked.first().map_or(true, |best| score > best.score)
}

/// Insert keeping descending order. Ties go after existing entries.
/// The list is truncated to `MAX_HIGH_SCORES`.
pub fn insert_ranked(ranked: &mut Vec<ScoreEntry>, entry: ScoreEntry) {
    let pos = ranked
        .iter()
        .position(|e| entry.score > e.score)
        .unwrap_or(ranked.len());
    ranked.insert(pos, entry);
    ranked.truncate(MAX_HIGH_SCORES);
}

/// Volatile store. Used by tests and as the fallback when the score file
/// cannot be opened.
#[derive(Clone, Debug, Default)]
pub struct MemoryScoreStore {
    entries: Vec<ScoreEntry>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-ranked entries, kept verbatim (no truncation).
    pub fn with_entries(entries: Vec<ScoreEntry>) -> Self {
        MemoryScoreStore { entries }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn high_scores(&self) -> Vec<ScoreEntry> {
        self.entries.clone()
    }
}

impl ScoreRecorder for MemoryScoreStore {
    fn record(&mut self, entry: ScoreEntry) -> AppResult<()> {
        insert_ranked(&mut self.entries, entry);
        Ok(())
    }

    fn is_new_high_score(&self, score: u32) -> bool {
        beats_best(&self.entries, score)
    }
}
