//! Action tags carried by scene buttons.

use crate::domain::button_list::ActionItem;

/// Top-level main menu actions.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuAction {
    PlayGame,
    HighScores,
    Settings,
}

impl MenuAction {
    pub fn label(self) -> &'static str {
        match self {
            MenuAction::PlayGame => "PLAY",
            MenuAction::HighScores => "HIGH SCORES",
            MenuAction::Settings => "SETTINGS",
        }
    }

    /// Menu order: play, high scores, settings.
    pub fn menu_items() -> Vec<ActionItem<MenuAction>> {
        [MenuAction::PlayGame, MenuAction::HighScores, MenuAction::Settings]
            .into_iter()
            .map(|a| ActionItem::new(a.label(), a))
            .collect()
    }
}

/// Game-over screen actions.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ResultAction {
    PlayAgain,
    MainMenu,
}

impl ResultAction {
    pub fn label(self) -> &'static str {
        match self {
            ResultAction::PlayAgain => "PLAY AGAIN",
            ResultAction::MainMenu => "MAIN MENU",
        }
    }

    pub fn menu_items() -> Vec<ActionItem<ResultAction>> {
        [ResultAction::PlayAgain, ResultAction::MainMenu]
            .into_iter()
            .map(|a| ActionItem::new(a.label(), a))
            .collect()
    }
}

/// Starting levels offered by the level-select modal.
pub const LEVEL_CHOICES: [u32; 3] = [1, 3, 5];

pub fn level_items() -> Vec<ActionItem<u32>> {
    LEVEL_CHOICES
        .iter()
        .map(|&lvl| ActionItem::new(format!("LEVEL {lvl}"), lvl))
        .collect()
}
