//! Scenes: full-screen UI modes with their own view tree and input binding.
//!
//! Lifecycle, driven by the host:
//!   `on_create`  build the view tree (once; later calls are ignored)
//!   `on_enter`   attach the input listener, reset transient state
//!   `on_exit`    detach the input listener
//!   `destroy`    drop the view tree and any listener still attached
//!   `reset`      initial selection / modal state, view tree kept
//!
//! Scenes see pointer input already resolved to a `Target` by the
//! renderer's hit map; they never deal with screen coordinates.

pub mod game_over;
pub mod menu;

use crate::domain::palette::{PaletteColors, PaletteProvider, Rgb};
use crate::sim::event::UiEvent;
use crate::ui::input::InputBus;

/// Something the pointer can land on.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Target {
    MenuButton(usize),
    LevelButton(usize),
    HighScoresBack,
    ResultButton(usize),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SceneInput {
    Up,
    Down,
    Confirm,
    Cancel,
    Hover(Target),
    Click(Target),
}

// ── View tree nodes ──

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextNode {
    pub text: String,
    pub color: Rgb,
}

impl TextNode {
    pub fn new(text: impl Into<String>, color: Rgb) -> Self {
        TextNode { text: text.into(), color }
    }
}

/// A button owns its background and its label explicitly.
/// Highlight is not stored here; the renderer derives it from the list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButtonNode {
    pub background: Rgb,
    pub label: TextNode,
}

impl ButtonNode {
    pub fn new(label: &str, colors: &PaletteColors) -> Self {
        ButtonNode {
            background: colors.background,
            label: TextNode::new(label, colors.foreground),
        }
    }

    pub fn recolor(&mut self, colors: &PaletteColors) {
        self.background = colors.background;
        self.label.color = colors.foreground;
    }
}

pub trait Scene {
    fn on_create(&mut self, palette: &dyn PaletteProvider);
    fn on_enter(&mut self, bus: &mut InputBus);
    fn on_exit(&mut self, bus: &mut InputBus);
    fn destroy(&mut self, bus: &mut InputBus);
    fn reset(&mut self);

    /// Feed one input. Returns true if the scene consumed it.
    /// Scenes without an attached listener consume nothing.
    fn handle_input(&mut self, input: SceneInput) -> bool;

    fn on_palette_changed(&mut self, palette: &dyn PaletteProvider);

    /// Events produced since the last call.
    fn drain_events(&mut self) -> Vec<UiEvent>;
}
