//! End-of-run statistics shown on the game-over screen.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GameOverSummary {
    pub final_score: u32,
    pub highest_level: u32,
    pub total_lines_cleared: u32,
    pub special_blocks_collected: u32,
    pub is_new_high_score: bool,
}

impl GameOverSummary {
    pub fn new(
        final_score: u32,
        highest_level: u32,
        total_lines_cleared: u32,
        special_blocks_collected: u32,
    ) -> Self {
        GameOverSummary {
            final_score,
            highest_level,
            total_lines_cleared,
            special_blocks_collected,
            is_new_high_score: false,
        }
    }

    pub fn score_text(&self) -> String {
        format!("SCORE: {}", self.final_score)
    }

    pub fn level_text(&self) -> String {
        format!("LEVEL REACHED: {}", self.highest_level)
    }

    pub fn lines_text(&self) -> String {
        format!("LINES CLEARED: {}", self.total_lines_cleared)
    }

    pub fn specials_text(&self) -> String {
        format!("SPECIAL BLOCKS: {}", self.special_blocks_collected)
    }
}

/// A run that has not reported anything yet: level 1, everything else zero.
impl Default for GameOverSummary {
    fn default() -> Self {
        GameOverSummary::new(0, 1, 0, 0)
    }
}
