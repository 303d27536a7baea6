//! Main menu scene.
//!
//! Three top-level buttons (play, high scores, settings) and two modals:
//!   - level select: LEVEL 1 / 3 / 5, picking one starts a game
//!   - high scores: read-only table, re-read from the store on every open
//!
//! At most one modal is open at a time (`ModalState`). While one is open
//! the top-level list is locked: no movement, no hover, no activation.

use std::rc::Rc;

use tracing::debug;

use crate::domain::action::{level_items, MenuAction};
use crate::domain::button_list::ButtonList;
use crate::domain::palette::{PaletteColors, PaletteProvider};
use crate::domain::score::{ScoreEntry, ScoreStore, MAX_HIGH_SCORES};
use crate::scene::{ButtonNode, Scene, SceneInput, Target, TextNode};
use crate::sim::event::UiEvent;
use crate::ui::input::{InputBus, ListenerId};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ModalState {
    #[default]
    None,
    LevelSelect,
    HighScores,
}

/// What an activation ended up doing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Activation {
    Ignored,
    OpenedLevelSelect,
    OpenedHighScores,
    ClosedHighScores,
    /// A caller callback slot was hit (the callback itself may be absent).
    Dispatched,
}

type ActionCallback = Box<dyn FnMut(MenuAction)>;
type StartGameCallback = Box<dyn FnMut(u32)>;

pub struct MenuNavigationController {
    top: ButtonList<MenuAction>,
    levels: ButtonList<u32>,
    modal: ModalState,
    on_action: Option<ActionCallback>,
    on_start_game: Option<StartGameCallback>,
    events: Vec<UiEvent>,
}

impl MenuNavigationController {
    pub fn new() -> Self {
        MenuNavigationController {
            top: ButtonList::new(MenuAction::menu_items()),
            levels: ButtonList::new(level_items()),
            modal: ModalState::None,
            on_action: None,
            on_start_game: None,
            events: Vec::new(),
        }
    }

    pub fn set_on_action(&mut self, f: impl FnMut(MenuAction) + 'static) {
        self.on_action = Some(Box::new(f));
    }

    pub fn set_on_start_game(&mut self, f: impl FnMut(u32) + 'static) {
        self.on_start_game = Some(Box::new(f));
    }

    pub fn clear_callbacks(&mut self) {
        self.on_action = None;
        self.on_start_game = None;
    }

    pub fn modal(&self) -> ModalState {
        self.modal
    }

    pub fn top(&self) -> &ButtonList<MenuAction> {
        &self.top
    }

    pub fn levels(&self) -> &ButtonList<u32> {
        &self.levels
    }

    // ── Navigation ──

    /// Down in whichever list is live. High scores has no list.
    pub fn select_next(&mut self) -> bool {
        let moved = match self.modal {
            ModalState::None => self.top.move_down(),
            ModalState::LevelSelect => self.levels.move_down(),
            ModalState::HighScores => false,
        };
        self.note_move(moved)
    }

    pub fn select_previous(&mut self) -> bool {
        let moved = match self.modal {
            ModalState::None => self.top.move_up(),
            ModalState::LevelSelect => self.levels.move_up(),
            ModalState::HighScores => false,
        };
        self.note_move(moved)
    }

    /// Pointer over a top-level button. Suppressed while any modal is open.
    pub fn hover(&mut self, index: usize) -> bool {
        let moved = self.top.hover_to(index);
        self.note_move(moved)
    }

    /// Pointer over a level button. Only live while level select is open.
    pub fn hover_level(&mut self, index: usize) -> bool {
        if self.modal != ModalState::LevelSelect {
            return false;
        }
        let moved = self.levels.hover_to(index);
        self.note_move(moved)
    }

    // ── Activation ──

    /// Confirm on the live list.
    pub fn activate(&mut self) -> Activation {
        match self.modal {
            ModalState::None => match self.top.activate_current() {
                Some(action) => self.run_top(action),
                None => Activation::Ignored,
            },
            ModalState::LevelSelect => match self.levels.activate_current() {
                Some(level) => self.start_game(level),
                None => Activation::Ignored,
            },
            ModalState::HighScores => {
                if self.close(ModalState::HighScores) {
                    Activation::ClosedHighScores
                } else {
                    Activation::Ignored
                }
            }
        }
    }

    /// Click on a top-level button: select it, then activate it.
    pub fn click(&mut self, index: usize) -> Activation {
        if self.modal != ModalState::None || index >= self.top.len() {
            return Activation::Ignored;
        }
        self.hover(index);
        self.activate()
    }

    pub fn click_level(&mut self, index: usize) -> Activation {
        if self.modal != ModalState::LevelSelect || index >= self.levels.len() {
            return Activation::Ignored;
        }
        self.hover_level(index);
        self.activate()
    }

    /// The high-scores back control.
    pub fn click_back(&mut self) -> bool {
        self.close(ModalState::HighScores)
    }

    /// Escape: close the innermost modal. Nothing else is cancellable.
    pub fn cancel(&mut self) -> bool {
        match self.modal {
            ModalState::None => false,
            open => self.close(open),
        }
    }

    /// Hide `modal` if it is the open one; re-enables top-level navigation.
    pub fn close(&mut self, modal: ModalState) -> bool {
        if modal == ModalState::None || self.modal != modal {
            return false;
        }
        self.modal = ModalState::None;
        self.top.set_locked(false);
        self.events.push(UiEvent::ModalClosed);
        true
    }

    /// Back to the first top-level button with nothing open.
    pub fn reset(&mut self) {
        self.modal = ModalState::None;
        self.top.set_locked(false);
        self.top.reset();
        self.levels.reset();
    }

    pub fn drain_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Internal ──

    fn run_top(&mut self, action: MenuAction) -> Activation {
        self.events.push(UiEvent::Activated);
        match action {
            MenuAction::PlayGame => {
                self.open(ModalState::LevelSelect);
                Activation::OpenedLevelSelect
            }
            MenuAction::HighScores => {
                self.open(ModalState::HighScores);
                Activation::OpenedHighScores
            }
            MenuAction::Settings => {
                if let Some(cb) = self.on_action.as_mut() {
                    cb(action);
                }
                Activation::Dispatched
            }
        }
    }

    fn start_game(&mut self, level: u32) -> Activation {
        self.events.push(UiEvent::Activated);
        self.close(ModalState::LevelSelect);
        if let Some(cb) = self.on_start_game.as_mut() {
            cb(level);
        }
        Activation::Dispatched
    }

    fn open(&mut self, modal: ModalState) {
        if modal == ModalState::LevelSelect {
            self.levels.reset();
        }
        self.modal = modal;
        self.top.set_locked(true);
        self.events.push(UiEvent::ModalOpened);
    }

    fn note_move(&mut self, moved: bool) -> bool {
        if moved {
            self.events.push(UiEvent::SelectionMoved);
        }
        moved
    }
}

impl Default for MenuNavigationController {
    fn default() -> Self {
        Self::new()
    }
}

// ── View tree ──

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreRow {
    pub rank: usize,
    pub entry: ScoreEntry,
    pub text: TextNode,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScoreTable {
    Placeholder(TextNode),
    Rows(Vec<ScoreRow>),
}

pub const NO_SCORES_TEXT: &str = "NO SCORES YET";

/// At most `MAX_HIGH_SCORES` rows, ranked 1.. in the order given.
pub fn build_score_table(entries: &[ScoreEntry], colors: &PaletteColors) -> ScoreTable {
    if entries.is_empty() {
        return ScoreTable::Placeholder(TextNode::new(NO_SCORES_TEXT, colors.foreground));
    }
    ScoreTable::Rows(
        entries
            .iter()
            .take(MAX_HIGH_SCORES)
            .enumerate()
            .map(|(i, e)| ScoreRow {
                rank: i + 1,
                entry: *e,
                text: TextNode::new(
                    format!("{:>2}.  {:>8}   LV {}", i + 1, e.score, e.level),
                    colors.foreground,
                ),
            })
            .collect(),
    )
}

#[derive(Clone, Debug)]
pub struct MenuView {
    pub colors: PaletteColors,
    pub title: TextNode,
    pub hint: TextNode,
    pub buttons: Vec<ButtonNode>,
    pub level_title: TextNode,
    pub level_buttons: Vec<ButtonNode>,
    pub scores_title: TextNode,
    pub score_table: ScoreTable,
    pub back_button: ButtonNode,
}

impl MenuView {
    fn build(nav: &MenuNavigationController, colors: PaletteColors, scores: &[ScoreEntry]) -> Self {
        MenuView {
            colors,
            title: TextNode::new("CHROMA DROP", colors.accent),
            hint: TextNode::new("↑↓ Select   ENTER Confirm   ESC Back   P Palette   Q Quit", colors.foreground.dim(0.6)),
            buttons: nav.top().items().iter().map(|i| ButtonNode::new(&i.label, &colors)).collect(),
            level_title: TextNode::new("SELECT LEVEL", colors.accent),
            level_buttons: nav.levels().items().iter().map(|i| ButtonNode::new(&i.label, &colors)).collect(),
            scores_title: TextNode::new("HIGH SCORES", colors.accent),
            score_table: build_score_table(scores, &colors),
            back_button: ButtonNode::new("BACK", &colors),
        }
    }

    fn recolor(&mut self, colors: PaletteColors) {
        self.colors = colors;
        self.title.color = colors.accent;
        self.hint.color = colors.foreground.dim(0.6);
        self.level_title.color = colors.accent;
        self.scores_title.color = colors.accent;
        for b in self.buttons.iter_mut().chain(self.level_buttons.iter_mut()) {
            b.recolor(&colors);
        }
        self.back_button.recolor(&colors);
        match &mut self.score_table {
            ScoreTable::Placeholder(t) => t.color = colors.foreground,
            ScoreTable::Rows(rows) => {
                for r in rows {
                    r.text.color = colors.foreground;
                }
            }
        }
    }
}

// ── Scene ──

pub struct MenuScene {
    nav: MenuNavigationController,
    store: Rc<dyn ScoreStore>,
    view: Option<MenuView>,
    listener: Option<ListenerId>,
}

impl MenuScene {
    pub fn new(store: Rc<dyn ScoreStore>) -> Self {
        MenuScene {
            nav: MenuNavigationController::new(),
            store,
            view: None,
            listener: None,
        }
    }

    pub fn nav(&self) -> &MenuNavigationController {
        &self.nav
    }

    pub fn view(&self) -> Option<&MenuView> {
        self.view.as_ref()
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    pub fn set_on_action(&mut self, f: impl FnMut(MenuAction) + 'static) {
        self.nav.set_on_action(f);
    }

    pub fn set_on_start_game(&mut self, f: impl FnMut(u32) + 'static) {
        self.nav.set_on_start_game(f);
    }

    fn after_activation(&mut self, activation: Activation) {
        if activation == Activation::OpenedHighScores {
            self.refresh_scores();
        }
    }

    fn refresh_scores(&mut self) {
        let Some(view) = self.view.as_mut() else { return };
        let entries = self.store.high_scores();
        debug!(count = entries.len(), "menu: high scores refreshed");
        view.score_table = build_score_table(&entries, &view.colors);
    }
}

impl Scene for MenuScene {
    fn on_create(&mut self, palette: &dyn PaletteProvider) {
        if self.view.is_some() {
            return;
        }
        let scores = self.store.high_scores();
        self.view = Some(MenuView::build(&self.nav, palette.palette_colors(), &scores));
        debug!("menu: view created");
    }

    fn on_enter(&mut self, bus: &mut InputBus) {
        if self.listener.is_none() {
            self.listener = Some(bus.subscribe("menu"));
        }
        self.nav.reset();
    }

    fn on_exit(&mut self, bus: &mut InputBus) {
        if let Some(id) = self.listener.take() {
            bus.unsubscribe(id);
        }
    }

    fn destroy(&mut self, bus: &mut InputBus) {
        self.on_exit(bus);
        self.view = None;
        self.nav.drain_events();
        debug!("menu: destroyed");
    }

    fn reset(&mut self) {
        self.nav.reset();
    }

    fn handle_input(&mut self, input: SceneInput) -> bool {
        if self.listener.is_none() {
            return false;
        }
        match input {
            SceneInput::Up => {
                self.nav.select_previous();
                true
            }
            SceneInput::Down => {
                self.nav.select_next();
                true
            }
            SceneInput::Confirm => {
                let a = self.nav.activate();
                self.after_activation(a);
                true
            }
            SceneInput::Cancel => self.nav.cancel(),
            SceneInput::Hover(Target::MenuButton(i)) => self.nav.hover(i),
            SceneInput::Hover(Target::LevelButton(i)) => self.nav.hover_level(i),
            SceneInput::Hover(_) => false,
            SceneInput::Click(Target::MenuButton(i)) => {
                let a = self.nav.click(i);
                self.after_activation(a);
                a != Activation::Ignored
            }
            SceneInput::Click(Target::LevelButton(i)) => self.nav.click_level(i) != Activation::Ignored,
            SceneInput::Click(Target::HighScoresBack) => self.nav.click_back(),
            SceneInput::Click(Target::ResultButton(_)) => false,
        }
    }

    fn on_palette_changed(&mut self, palette: &dyn PaletteProvider) {
        if let Some(view) = self.view.as_mut() {
            view.recolor(palette.palette_colors());
        }
    }

    fn drain_events(&mut self) -> Vec<UiEvent> {
        self.nav.drain_events()
    }
}
