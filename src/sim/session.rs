//! Host phase machine and the stand-in play session.
//!
//! The falling-block simulation lives elsewhere; between the menu and the
//! game-over screen the host runs a `PlaySession` that only accumulates
//! score over time so the full Menu → Playing → GameOver loop is usable.
//!
//! Scene callbacks never touch the host directly. They push a
//! `Transition` into an mpsc channel that the host drains once per frame.

use crate::domain::summary::GameOverSummary;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Menu,
    Playing,
    GameOver,
}

/// Requests raised by scene callbacks.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Transition {
    StartGame(u32),
    PlayAgain,
    MainMenu,
    OpenSettings,
}

/// Ticks per automatic level-up.
pub const LEVEL_TICKS: u32 = 200;

#[derive(Clone, Debug)]
pub struct PlaySession {
    start_level: u32,
    level: u32,
    ticks: u32,
    score: u32,
}

impl PlaySession {
    pub fn new(start_level: u32) -> Self {
        let level = start_level.max(1);
        PlaySession { start_level: level, level, ticks: 0, score: 0 }
    }

    pub fn start_level(&self) -> u32 {
        self.start_level
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// One frame of play: `level` points, and a level-up every `LEVEL_TICKS`.
    pub fn tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
        self.score = self.score.saturating_add(self.level);
        if self.ticks % LEVEL_TICKS == 0 {
            self.level = self.level.saturating_add(1);
        }
    }

    /// End the run. The high-score flag is left for the host to decide.
    pub fn finish(&self) -> GameOverSummary {
        GameOverSummary::new(self.score, self.level, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_scores_nothing() {
        let s = PlaySession::new(3);
        let summary = s.finish();
        assert_eq!(summary.final_score, 0);
        assert_eq!(summary.highest_level, 3);
        assert!(!summary.is_new_high_score);
    }

    #[test]
    fn level_zero_is_treated_as_one() {
        assert_eq!(PlaySession::new(0).level(), 1);
    }

    #[test]
    fn ticks_accumulate_level_points() {
        let mut s = PlaySession::new(5);
        for _ in 0..10 {
            s.tick();
        }
        assert_eq!(s.ticks(), 10);
        assert_eq!(s.score(), 50);
    }

    #[test]
    fn level_rises_over_time() {
        let mut s = PlaySession::new(1);
        for _ in 0..LEVEL_TICKS {
            s.tick();
        }
        assert_eq!(s.level(), 2);
        assert_eq!(s.start_level(), 1);
        assert_eq!(s.score(), LEVEL_TICKS);

        s.tick();
        assert_eq!(s.score(), LEVEL_TICKS + 2);
        assert_eq!(s.finish().highest_level, 2);
    }
}
