//! Game-over scene: run summary + play again / main menu.
//!
//! The summary arrives after creation through setters. Each setter only
//! re-renders the text that depends on it; a setter called before any
//! summary exists starts from `GameOverSummary::default()`.

use tracing::debug;

use crate::domain::action::ResultAction;
use crate::domain::button_list::ButtonList;
use crate::domain::palette::{PaletteColors, PaletteProvider};
use crate::domain::summary::GameOverSummary;
use crate::scene::{ButtonNode, Scene, SceneInput, Target, TextNode};
use crate::sim::event::UiEvent;
use crate::ui::input::{InputBus, ListenerId};

type ActionCallback = Box<dyn FnMut(ResultAction)>;
type PlainCallback = Box<dyn FnMut()>;

pub struct ResultNavigationController {
    list: ButtonList<ResultAction>,
    on_action: Option<ActionCallback>,
    on_play_again: Option<PlainCallback>,
    on_main_menu: Option<PlainCallback>,
    events: Vec<UiEvent>,
}

impl ResultNavigationController {
    pub fn new() -> Self {
        ResultNavigationController {
            list: ButtonList::new(ResultAction::menu_items()),
            on_action: None,
            on_play_again: None,
            on_main_menu: None,
            events: Vec::new(),
        }
    }

    pub fn set_on_action(&mut self, f: impl FnMut(ResultAction) + 'static) {
        self.on_action = Some(Box::new(f));
    }

    pub fn set_on_play_again(&mut self, f: impl FnMut() + 'static) {
        self.on_play_again = Some(Box::new(f));
    }

    pub fn set_on_main_menu(&mut self, f: impl FnMut() + 'static) {
        self.on_main_menu = Some(Box::new(f));
    }

    pub fn list(&self) -> &ButtonList<ResultAction> {
        &self.list
    }

    pub fn select_next(&mut self) -> bool {
        let moved = self.list.move_down();
        self.note_move(moved)
    }

    pub fn select_previous(&mut self) -> bool {
        let moved = self.list.move_up();
        self.note_move(moved)
    }

    pub fn hover(&mut self, index: usize) -> bool {
        let moved = self.list.hover_to(index);
        self.note_move(moved)
    }

    /// Fires the generic callback, then the action-specific one.
    pub fn activate(&mut self) -> Option<ResultAction> {
        let action = self.list.activate_current()?;
        self.events.push(UiEvent::Activated);
        if let Some(cb) = self.on_action.as_mut() {
            cb(action);
        }
        let specific = match action {
            ResultAction::PlayAgain => self.on_play_again.as_mut(),
            ResultAction::MainMenu => self.on_main_menu.as_mut(),
        };
        if let Some(cb) = specific {
            cb();
        }
        Some(action)
    }

    pub fn click(&mut self, index: usize) -> Option<ResultAction> {
        if index >= self.list.len() {
            return None;
        }
        self.hover(index);
        self.activate()
    }

    pub fn reset(&mut self) {
        self.list.reset();
    }

    pub fn drain_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }

    fn note_move(&mut self, moved: bool) -> bool {
        if moved {
            self.events.push(UiEvent::SelectionMoved);
        }
        moved
    }
}

impl Default for ResultNavigationController {
    fn default() -> Self {
        Self::new()
    }
}

// ── View tree ──

pub const NEW_HIGH_SCORE_TEXT: &str = "NEW HIGH SCORE!";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameOverView {
    pub colors: PaletteColors,
    pub title: TextNode,
    pub score: TextNode,
    pub level: TextNode,
    pub lines: TextNode,
    pub specials: TextNode,
    /// Shown only for a new high score.
    pub banner: Option<TextNode>,
    pub buttons: Vec<ButtonNode>,
}

impl GameOverView {
    fn build(nav: &ResultNavigationController, colors: PaletteColors, s: &GameOverSummary) -> Self {
        let fg = colors.foreground;
        GameOverView {
            colors,
            title: TextNode::new("GAME OVER", colors.accent),
            score: TextNode::new(s.score_text(), fg),
            level: TextNode::new(s.level_text(), fg),
            lines: TextNode::new(s.lines_text(), fg),
            specials: TextNode::new(s.specials_text(), fg),
            banner: banner_for(s.is_new_high_score, &colors),
            buttons: nav.list().items().iter().map(|i| ButtonNode::new(&i.label, &colors)).collect(),
        }
    }

    fn recolor(&mut self, colors: PaletteColors) {
        self.colors = colors;
        self.title.color = colors.accent;
        for t in [&mut self.score, &mut self.level, &mut self.lines, &mut self.specials] {
            t.color = colors.foreground;
        }
        if let Some(b) = self.banner.as_mut() {
            b.color = colors.accent;
        }
        for b in &mut self.buttons {
            b.recolor(&colors);
        }
    }
}

fn banner_for(is_new: bool, colors: &PaletteColors) -> Option<TextNode> {
    is_new.then(|| TextNode::new(NEW_HIGH_SCORE_TEXT, colors.accent))
}

// ── Scene ──

pub struct GameOverScene {
    nav: ResultNavigationController,
    summary: Option<GameOverSummary>,
    view: Option<GameOverView>,
    listener: Option<ListenerId>,
}

impl GameOverScene {
    pub fn new() -> Self {
        GameOverScene {
            nav: ResultNavigationController::new(),
            summary: None,
            view: None,
            listener: None,
        }
    }

    pub fn nav(&self) -> &ResultNavigationController {
        &self.nav
    }

    pub fn view(&self) -> Option<&GameOverView> {
        self.view.as_ref()
    }

    pub fn summary(&self) -> Option<&GameOverSummary> {
        self.summary.as_ref()
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    pub fn set_on_action(&mut self, f: impl FnMut(ResultAction) + 'static) {
        self.nav.set_on_action(f);
    }

    pub fn set_on_play_again(&mut self, f: impl FnMut() + 'static) {
        self.nav.set_on_play_again(f);
    }

    pub fn set_on_main_menu(&mut self, f: impl FnMut() + 'static) {
        self.nav.set_on_main_menu(f);
    }

    // ── Summary setters ──

    pub fn set_game_over_data(&mut self, summary: GameOverSummary) {
        self.summary = Some(summary);
        if let Some(view) = self.view.as_mut() {
            view.score.text = summary.score_text();
            view.level.text = summary.level_text();
            view.lines.text = summary.lines_text();
            view.specials.text = summary.specials_text();
            view.banner = banner_for(summary.is_new_high_score, &view.colors);
        }
    }

    pub fn set_final_score(&mut self, score: u32) {
        let s = self.summary.get_or_insert_with(GameOverSummary::default);
        s.final_score = score;
        let text = s.score_text();
        if let Some(view) = self.view.as_mut() {
            view.score.text = text;
        }
    }

    pub fn set_highest_level(&mut self, level: u32) {
        let s = self.summary.get_or_insert_with(GameOverSummary::default);
        s.highest_level = level;
        let text = s.level_text();
        if let Some(view) = self.view.as_mut() {
            view.level.text = text;
        }
    }

    pub fn set_is_new_high_score(&mut self, is_new: bool) {
        let s = self.summary.get_or_insert_with(GameOverSummary::default);
        s.is_new_high_score = is_new;
        if let Some(view) = self.view.as_mut() {
            view.banner = banner_for(is_new, &view.colors);
        }
    }

    fn current_summary(&self) -> GameOverSummary {
        self.summary.unwrap_or_default()
    }
}

impl Default for GameOverScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for GameOverScene {
    fn on_create(&mut self, palette: &dyn PaletteProvider) {
        if self.view.is_some() {
            return;
        }
        let summary = self.current_summary();
        self.view = Some(GameOverView::build(&self.nav, palette.palette_colors(), &summary));
        debug!("game over: view created");
    }

    fn on_enter(&mut self, bus: &mut InputBus) {
        if self.listener.is_none() {
            self.listener = Some(bus.subscribe("game_over"));
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
        debug!("game over: destroyed");
    }

    /// Selection back to PLAY AGAIN and the summary cleared.
    fn reset(&mut self) {
        self.nav.reset();
        self.summary = None;
        let blank = GameOverSummary::default();
        if let Some(view) = self.view.as_mut() {
            view.score.text = blank.score_text();
            view.level.text = blank.level_text();
            view.lines.text = blank.lines_text();
            view.specials.text = blank.specials_text();
            view.banner = None;
        }
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
                self.nav.activate();
                true
            }
            // No modal here, so there is nothing to cancel.
            SceneInput::Cancel => false,
            SceneInput::Hover(Target::ResultButton(i)) => self.nav.hover(i),
            SceneInput::Click(Target::ResultButton(i)) => self.nav.click(i).is_some(),
            SceneInput::Hover(_) | SceneInput::Click(_) => false,
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::domain::palette::ThemeCycler;

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Action(ResultAction),
        PlayAgain,
        MainMenu,
    }

    fn recorded_scene() -> (GameOverScene, InputBus, Rc<RefCell<Vec<Call>>>) {
        let log = Rc::new(RefCell::new(vec![]));
        let mut scene = GameOverScene::new();
        let l = log.clone();
        scene.set_on_action(move |a| l.borrow_mut().push(Call::Action(a)));
        let l = log.clone();
        scene.set_on_play_again(move || l.borrow_mut().push(Call::PlayAgain));
        let l = log.clone();
        scene.set_on_main_menu(move || l.borrow_mut().push(Call::MainMenu));

        let mut bus = InputBus::new();
        scene.on_create(&ThemeCycler::new(vec![]));
        scene.on_enter(&mut bus);
        (scene, bus, log)
    }

    #[test]
    fn confirm_fires_generic_then_specific() {
        let (mut scene, _bus, log) = recorded_scene();
        scene.handle_input(SceneInput::Confirm);
        assert_eq!(*log.borrow(), vec![Call::Action(ResultAction::PlayAgain), Call::PlayAgain]);

        log.borrow_mut().clear();
        scene.handle_input(SceneInput::Down);
        scene.handle_input(SceneInput::Down); // clamped
        scene.handle_input(SceneInput::Confirm);
        assert_eq!(*log.borrow(), vec![Call::Action(ResultAction::MainMenu), Call::MainMenu]);
    }

    #[test]
    fn click_selects_and_activates() {
        let (mut scene, _bus, log) = recorded_scene();
        assert!(scene.handle_input(SceneInput::Click(Target::ResultButton(1))));
        assert_eq!(scene.nav().list().current_index(), 1);
        assert_eq!(*log.borrow(), vec![Call::Action(ResultAction::MainMenu), Call::MainMenu]);

        assert!(!scene.handle_input(SceneInput::Click(Target::ResultButton(5))));
        assert!(!scene.handle_input(SceneInput::Click(Target::MenuButton(0))));
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn hover_and_clamp() {
        let (mut scene, _bus, log) = recorded_scene();
        assert!(!scene.handle_input(SceneInput::Hover(Target::ResultButton(0))));
        assert!(scene.handle_input(SceneInput::Hover(Target::ResultButton(1))));
        scene.handle_input(SceneInput::Up);
        scene.handle_input(SceneInput::Up);
        assert_eq!(scene.nav().list().current_index(), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn cancel_is_not_consumed() {
        let (mut scene, _bus, log) = recorded_scene();
        assert!(!scene.handle_input(SceneInput::Cancel));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn partial_setters_match_full_data() {
        let (mut a, _bus_a, _) = recorded_scene();
        a.set_final_score(500);
        a.set_highest_level(3);

        let (mut b, _bus_b, _) = recorded_scene();
        b.set_game_over_data(GameOverSummary::new(500, 3, 0, 0));

        assert_eq!(a.summary(), b.summary());
        assert_eq!(a.view(), b.view());
        assert_eq!(a.view().unwrap().score.text, "SCORE: 500");
        assert_eq!(a.view().unwrap().level.text, "LEVEL REACHED: 3");
    }

    #[test]
    fn setter_only_touches_its_text() {
        let (mut scene, _bus, _) = recorded_scene();
        scene.set_game_over_data(GameOverSummary::new(10, 2, 7, 1));
        scene.set_final_score(99);
        let v = scene.view().unwrap();
        assert_eq!(v.score.text, "SCORE: 99");
        assert_eq!(v.level.text, "LEVEL REACHED: 2");
        assert_eq!(v.lines.text, "LINES CLEARED: 7");
        assert_eq!(v.specials.text, "SPECIAL BLOCKS: 1");
    }

    #[test]
    fn high_score_banner_toggles() {
        let (mut scene, _bus, _) = recorded_scene();
        assert!(scene.view().unwrap().banner.is_none());
        scene.set_is_new_high_score(true);
        assert_eq!(scene.view().unwrap().banner.as_ref().unwrap().text, NEW_HIGH_SCORE_TEXT);
        // Defaulted summary when none was set
        assert_eq!(scene.summary().unwrap().highest_level, 1);
        scene.set_is_new_high_score(false);
        assert!(scene.view().unwrap().banner.is_none());
    }

    #[test]
    fn data_set_before_create_is_rendered_on_create() {
        let mut scene = GameOverScene::new();
        let mut summary = GameOverSummary::new(1234, 5, 40, 3);
        summary.is_new_high_score = true;
        scene.set_game_over_data(summary);
        assert!(scene.view().is_none());

        scene.on_create(&ThemeCycler::new(vec![]));
        let v = scene.view().unwrap();
        assert_eq!(v.score.text, "SCORE: 1234");
        assert_eq!(v.lines.text, "LINES CLEARED: 40");
        assert!(v.banner.is_some());
    }

    #[test]
    fn reset_clears_summary_and_selection() {
        let (mut scene, _bus, _) = recorded_scene();
        let mut summary = GameOverSummary::new(800, 4, 12, 2);
        summary.is_new_high_score = true;
        scene.set_game_over_data(summary);
        scene.handle_input(SceneInput::Down);

        scene.reset();
        assert!(scene.summary().is_none());
        assert_eq!(scene.nav().list().current_index(), 0);
        let v = scene.view().unwrap();
        assert_eq!(v.score.text, "SCORE: 0");
        assert_eq!(v.level.text, "LEVEL REACHED: 1");
        assert!(v.banner.is_none());
    }

    #[test]
    fn lifecycle_releases_listener() {
        let (mut scene, mut bus, log) = recorded_scene();
        assert_eq!(bus.listener_count(), 1);
        scene.on_exit(&mut bus);
        assert_eq!(bus.listener_count(), 0);
        assert!(!scene.handle_input(SceneInput::Confirm));
        assert!(log.borrow().is_empty());

        scene.on_enter(&mut bus);
        scene.destroy(&mut bus);
        assert_eq!(bus.listener_count(), 0);
        assert!(scene.view().is_none());
        // Setters against a destroyed view are ignored
        scene.set_final_score(5);
        assert!(scene.view().is_none());
    }

    #[test]
    fn controller_without_callbacks_still_reports_action() {
        let mut nav = ResultNavigationController::new();
        assert_eq!(nav.activate(), Some(ResultAction::PlayAgain));
        assert_eq!(nav.click(1), Some(ResultAction::MainMenu));
        assert_eq!(nav.drain_events(), vec![UiEvent::Activated, UiEvent::SelectionMoved, UiEvent::Activated]);
    }
}
