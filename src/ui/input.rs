//! Input: terminal events → navigation commands, plus listener bookkeeping.
//!
//! `InputState` drains every pending crossterm event once per frame and
//! turns it into a `RawInput`:
//!   - keys become commands (edge-triggered; Release events are ignored,
//!     auto-repeat counts as another press so holding ↓ keeps scrolling)
//!   - mouse motion / left clicks become pointer events in cell coordinates
//!
//! `InputBus` tracks which scenes are currently listening. A scene
//! registers on enter and releases on exit; the host only routes input to
//! registered listeners, so a scene that is not active never sees a key.

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEventKind,
};
use tracing::debug;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Up,
    Down,
    Confirm,
    Cancel,
    CyclePalette,
    Quit,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RawInput {
    Command(Command),
    PointerMove { col: u16, row: u16 },
    PointerClick { col: u16, row: u16 },
}

const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Char('k')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S'), KeyCode::Char('j')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_PALETTE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

/// Map a single key event to a command. Release events map to nothing.
pub fn command_for_key(key: KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Some(Command::Quit);
    }
    let code = key.code;
    if KEYS_UP.contains(&code) {
        Some(Command::Up)
    } else if KEYS_DOWN.contains(&code) {
        Some(Command::Down)
    } else if KEYS_CONFIRM.contains(&code) {
        Some(Command::Confirm)
    } else if code == KeyCode::Esc {
        Some(Command::Cancel)
    } else if KEYS_PALETTE.contains(&code) {
        Some(Command::CyclePalette)
    } else if KEYS_QUIT.contains(&code) {
        Some(Command::Quit)
    } else {
        None
    }
}

/// Map one terminal event to an input, if it means anything to the menus.
pub fn translate(ev: Event) -> Option<RawInput> {
    match ev {
        Event::Key(key) => command_for_key(key).map(RawInput::Command),
        Event::Mouse(m) => match m.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(MouseButton::Left) => {
                Some(RawInput::PointerMove { col: m.column, row: m.row })
            }
            MouseEventKind::Down(MouseButton::Left) => {
                Some(RawInput::PointerClick { col: m.column, row: m.row })
            }
            _ => None,
        },
        _ => None,
    }
}

pub struct InputState {
    /// Inputs collected during the most recent `drain_events()`, in arrival order.
    pending: Vec<RawInput>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { pending: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events without blocking.
    /// Call once per frame; previous inputs are discarded.
    pub fn drain_events(&mut self) {
        self.pending.clear();
        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(ev) => {
                    if let Some(input) = translate(ev) {
                        self.pending.push(input);
                    }
                }
                Err(e) => {
                    debug!("terminal event read failed: {e}");
                    break;
                }
            }
        }
    }

    /// Queue an input from another source (gamepad).
    pub fn push(&mut self, input: RawInput) {
        self.pending.push(input);
    }

    pub fn take(&mut self) -> Vec<RawInput> {
        std::mem::take(&mut self.pending)
    }
}

// ── Listener registrations ──

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ListenerId(u64);

#[derive(Debug, Default)]
pub struct InputBus {
    next_id: u64,
    active: Vec<(ListenerId, &'static str)>,
}

impl InputBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, owner: &'static str) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.active.push((id, owner));
        debug!(owner, "input listener attached");
        id
    }

    /// Returns false if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        match self.active.iter().position(|(l, _)| *l == id) {
            Some(pos) => {
                let (_, owner) = self.active.remove(pos);
                debug!(owner, "input listener detached");
                true
            }
            None => false,
        }
    }

    pub fn is_subscribed(&self, id: ListenerId) -> bool {
        self.active.iter().any(|(l, _)| *l == id)
    }

    pub fn listener_count(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseEvent};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn navigation_keys() {
        assert_eq!(command_for_key(press(KeyCode::Up)), Some(Command::Up));
        assert_eq!(command_for_key(press(KeyCode::Down)), Some(Command::Down));
        assert_eq!(command_for_key(press(KeyCode::Enter)), Some(Command::Confirm));
        assert_eq!(command_for_key(press(KeyCode::Char(' '))), Some(Command::Confirm));
        assert_eq!(command_for_key(press(KeyCode::Esc)), Some(Command::Cancel));
        assert_eq!(command_for_key(press(KeyCode::Char('p'))), Some(Command::CyclePalette));
        assert_eq!(command_for_key(press(KeyCode::Left)), None);
    }

    #[test]
    fn release_is_ignored() {
        let key = KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(command_for_key(key), None);
    }

    #[test]
    fn ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for_key(key), Some(Command::Quit));
        // Plain 'c' means nothing
        assert_eq!(command_for_key(press(KeyCode::Char('c'))), None);
    }

    #[test]
    fn mouse_events() {
        let moved = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 4,
            row: 7,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(translate(moved), Some(RawInput::PointerMove { col: 4, row: 7 }));

        let click = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 1,
            row: 2,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(translate(click), Some(RawInput::PointerClick { col: 1, row: 2 }));

        let right = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Right),
            column: 1,
            row: 2,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(translate(right), None);
    }

    #[test]
    fn bus_pairs_subscribe_and_unsubscribe() {
        let mut bus = InputBus::new();
        let a = bus.subscribe("menu");
        let b = bus.subscribe("game_over");
        assert_ne!(a, b);
        assert_eq!(bus.listener_count(), 2);

        assert!(bus.unsubscribe(a));
        assert!(!bus.unsubscribe(a));
        assert!(!bus.is_subscribed(a));
        assert!(bus.is_subscribed(b));
        assert_eq!(bus.listener_count(), 1);
    }
}
