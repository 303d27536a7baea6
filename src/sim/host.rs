//! Host: owns the scenes, the shared collaborators and the phase machine.
//!
//! Per frame the caller feeds `RawInput`s through `handle()`, calls
//! `tick()` once, then renders. Scene callbacks only enqueue
//! `Transition`s; `handle()` drains the queue after routing each input,
//! so a scene is never re-entered from inside its own callback.
//!
//! Listener pairing: exactly one scene is listening in Menu and GameOver,
//! none while Playing.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, info, warn};

use crate::domain::action::{MenuAction, ResultAction};
use crate::domain::palette::ThemeCycler;
use crate::domain::score::{ScoreEntry, ScoreRecorder, ScoreStore};
use crate::domain::summary::GameOverSummary;
use crate::scene::game_over::GameOverScene;
use crate::scene::menu::MenuScene;
use crate::scene::{Scene, SceneInput};
use crate::sim::event::UiEvent;
use crate::sim::session::{Phase, PlaySession, Transition};
use crate::ui::hitmap::HitMap;
use crate::ui::input::{Command, InputBus, RawInput};

pub struct Host {
    phase: Phase,
    menu: MenuScene,
    game_over: GameOverScene,
    session: Option<PlaySession>,
    bus: InputBus,
    palette: ThemeCycler,
    scores: Rc<RefCell<dyn ScoreRecorder>>,
    transitions: Receiver<Transition>,
    last_level: u32,
    events: Vec<UiEvent>,
    quit: bool,
}

/// Queue a transition for the host. The host owns the receiver, so a
/// failed send only happens after teardown.
fn request(tx: &Sender<Transition>, transition: Transition) {
    if let Err(e) = tx.send(transition) {
        debug!(transition = ?e.0, "transition dropped, host gone");
    }
}

impl Host {
    pub fn new<S: ScoreRecorder + 'static>(store: S, palette: ThemeCycler) -> Self {
        let store = Rc::new(RefCell::new(store));
        let reader: Rc<dyn ScoreStore> = store.clone();
        let (tx, transitions) = mpsc::channel();

        let mut menu = MenuScene::new(reader);
        let t = tx.clone();
        menu.set_on_start_game(move |level| {
            request(&t, Transition::StartGame(level));
        });
        let t = tx.clone();
        menu.set_on_action(move |action| {
            debug!(?action, "menu action");
            if action == MenuAction::Settings {
                request(&t, Transition::OpenSettings);
            }
        });

        let mut game_over = GameOverScene::new();
        game_over.set_on_action(|action: ResultAction| debug!(?action, "result action"));
        let t = tx.clone();
        game_over.set_on_play_again(move || {
            request(&t, Transition::PlayAgain);
        });
        game_over.set_on_main_menu(move || {
            request(&tx, Transition::MainMenu);
        });

        let mut bus = InputBus::new();
        menu.on_create(&palette);
        game_over.on_create(&palette);
        menu.on_enter(&mut bus);
        info!(theme = %palette.current().name, "host ready");

        Host {
            phase: Phase::Menu,
            menu,
            game_over,
            session: None,
            bus,
            palette,
            scores: store,
            transitions,
            last_level: 1,
            events: vec![],
            quit: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn menu(&self) -> &MenuScene {
        &self.menu
    }

    pub fn game_over(&self) -> &GameOverScene {
        &self.game_over
    }

    pub fn session(&self) -> Option<&PlaySession> {
        self.session.as_ref()
    }

    pub fn palette(&self) -> &ThemeCycler {
        &self.palette
    }

    pub fn bus(&self) -> &InputBus {
        &self.bus
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Events for the sound layer since the last call.
    pub fn take_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Input ──

    pub fn handle(&mut self, input: RawInput, hits: &HitMap) {
        match input {
            RawInput::Command(Command::Quit) => self.quit = true,
            RawInput::Command(Command::CyclePalette) => self.cycle_palette(),
            RawInput::Command(cmd) => {
                let scene_input = match cmd {
                    Command::Up => SceneInput::Up,
                    Command::Down => SceneInput::Down,
                    Command::Confirm => SceneInput::Confirm,
                    _ => SceneInput::Cancel,
                };
                self.route(scene_input);
            }
            RawInput::PointerMove { col, row } => {
                if let Some(target) = hits.target_at(col, row) {
                    self.route(SceneInput::Hover(target));
                }
            }
            RawInput::PointerClick { col, row } => {
                if let Some(target) = hits.target_at(col, row) {
                    self.route(SceneInput::Click(target));
                }
            }
        }
        self.pump_transitions();
    }

    fn route(&mut self, input: SceneInput) {
        match self.phase {
            Phase::Menu => {
                // Escape with nothing open is ignored; only Quit leaves.
                self.menu.handle_input(input);
                self.events.extend(self.menu.drain_events());
            }
            Phase::GameOver => {
                self.game_over.handle_input(input);
                self.events.extend(self.game_over.drain_events());
            }
            Phase::Playing => {
                if input == SceneInput::Confirm {
                    self.events.push(UiEvent::Activated);
                    self.end_session();
                }
            }
        }
    }

    fn pump_transitions(&mut self) {
        while let Ok(t) = self.transitions.try_recv() {
            self.apply(t);
        }
    }

    fn apply(&mut self, transition: Transition) {
        debug!(?transition, phase = ?self.phase, "transition");
        match transition {
            Transition::StartGame(level) => {
                self.last_level = level;
                self.start_session(level);
            }
            Transition::PlayAgain => self.start_session(self.last_level),
            Transition::MainMenu => self.enter_menu(),
            Transition::OpenSettings => self.cycle_palette(),
        }
    }

    // ── Phase changes ──

    fn start_session(&mut self, level: u32) {
        self.menu.on_exit(&mut self.bus);
        self.game_over.on_exit(&mut self.bus);
        self.game_over.reset();
        self.session = Some(PlaySession::new(level));
        self.phase = Phase::Playing;
        info!(level, "run started");
    }

    fn end_session(&mut self) {
        let Some(session) = self.session.take() else { return };
        let summary = self.record(session.finish());
        self.game_over.set_game_over_data(summary);
        self.game_over.on_enter(&mut self.bus);
        self.phase = Phase::GameOver;
        info!(
            score = summary.final_score,
            level = summary.highest_level,
            new_high = summary.is_new_high_score,
            "run finished"
        );
    }

    /// Store the run and decide the high-score flag. Zero is never stored.
    fn record(&mut self, mut summary: GameOverSummary) -> GameOverSummary {
        if summary.final_score == 0 {
            return summary;
        }
        let mut scores = self.scores.borrow_mut();
        summary.is_new_high_score = scores.is_new_high_score(summary.final_score);
        let entry = ScoreEntry::new(summary.final_score, summary.highest_level);
        if let Err(e) = scores.record(entry) {
            warn!("could not save score: {e}");
        }
        summary
    }

    fn enter_menu(&mut self) {
        self.game_over.on_exit(&mut self.bus);
        self.menu.on_enter(&mut self.bus);
        self.phase = Phase::Menu;
        info!("back to main menu");
    }

    fn cycle_palette(&mut self) {
        let name = self.palette.cycle().name.clone();
        self.menu.on_palette_changed(&self.palette);
        self.game_over.on_palette_changed(&self.palette);
        info!(theme = %name, "palette changed");
    }

    // ── Frame / teardown ──

    pub fn tick(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.tick();
        }
    }

    pub fn shutdown(&mut self) {
        self.menu.destroy(&mut self.bus);
        self.game_over.destroy(&mut self.bus);
        debug!(listeners = self.bus.listener_count(), "host shut down");
    }
}
