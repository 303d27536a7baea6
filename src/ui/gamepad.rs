//! Gamepad input tracker using gilrs.
//!
//! Only what the menus need: vertical movement, confirm and cancel.
//! Confirm / cancel buttons come from config.toml via `load_button_config()`.
//! Default mapping:
//!   D-pad / Left Stick ↑↓  →  Up / Down
//!   A / Start              →  Confirm
//!   B / Select             →  Cancel
//!
//! Without the `gamepad` feature the tracker exists but never reports input.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
use tracing::debug;

use crate::config::GamepadConfig;
use crate::ui::input::Command;

const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Backend-neutral pad event.
#[cfg_attr(not(any(feature = "gamepad", test)), allow(dead_code))]
#[derive(Clone, Copy, Debug)]
enum PadEvent {
    Button(Btn, bool),
    DPadUp(bool),
    DPadDown(bool),
    StickY(f32),
    Disconnected,
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    dpad_up: BtnState,
    dpad_down: BtnState,
    stick_up: BtnState,
    stick_down: BtnState,
    stick_y: f32,

    confirm: Vec<Btn>,
    cancel: Vec<Btn>,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                debug!("gamepad backend unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad_up: BtnState::default(),
            dpad_down: BtnState::default(),
            stick_up: BtnState::default(),
            stick_down: BtnState::default(),
            stick_y: 0.0,
            confirm: vec![Btn::A, Btn::Start],
            cancel: vec![Btn::B, Btn::Select],
            connected,
        }
    }

    /// Unknown names are skipped; a list with nothing usable keeps the default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        let confirm = parse_list(&cfg.confirm);
        if !confirm.is_empty() {
            self.confirm = confirm;
        }
        let cancel = parse_list(&cfg.cancel);
        if !cancel.is_empty() {
            self.cancel = cancel;
        }
        debug!(confirm = ?self.confirm, cancel = ?self.cancel, "gamepad mapping");
    }

    /// Poll the backend. Call once per frame before `commands()`.
    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();
        for event in events {
            let pad = match event.event {
                EventType::ButtonPressed(Button::DPadUp, _) => PadEvent::DPadUp(true),
                EventType::ButtonReleased(Button::DPadUp, _) => PadEvent::DPadUp(false),
                EventType::ButtonPressed(Button::DPadDown, _) => PadEvent::DPadDown(true),
                EventType::ButtonReleased(Button::DPadDown, _) => PadEvent::DPadDown(false),
                EventType::ButtonPressed(b, _) => match Btn::from_gilrs(b) {
                    Some(btn) => PadEvent::Button(btn, true),
                    None => continue,
                },
                EventType::ButtonReleased(b, _) => match Btn::from_gilrs(b) {
                    Some(btn) => PadEvent::Button(btn, false),
                    None => continue,
                },
                EventType::AxisChanged(Axis::LeftStickY, value, _) => PadEvent::StickY(value),
                EventType::Connected => {
                    self.connected = true;
                    continue;
                }
                EventType::Disconnected => PadEvent::Disconnected,
                _ => continue,
            };
            self.apply(pad);
        }
        self.derive_stick();
    }

    #[cfg_attr(not(any(feature = "gamepad", test)), allow(dead_code))]
    fn apply(&mut self, ev: PadEvent) {
        self.connected = true;
        match ev {
            PadEvent::Button(btn, held) => self.buttons[btn as usize].set(held),
            PadEvent::DPadUp(held) => self.dpad_up.set(held),
            PadEvent::DPadDown(held) => self.dpad_down.set(held),
            PadEvent::StickY(v) => self.stick_y = v,
            PadEvent::Disconnected => {
                self.connected = false;
                self.release_all();
            }
        }
    }

    /// Stick crossing the deadzone counts as one press.
    #[cfg_attr(not(any(feature = "gamepad", test)), allow(dead_code))]
    fn derive_stick(&mut self) {
        self.stick_up.set(self.stick_y > STICK_DEADZONE);
        self.stick_down.set(self.stick_y < -STICK_DEADZONE);
    }

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    /// Edge-triggered commands for this frame.
    pub fn commands(&self) -> Vec<Command> {
        let mut out = vec![];
        if self.dpad_up.just_pressed || self.stick_up.just_pressed {
            out.push(Command::Up);
        }
        if self.dpad_down.just_pressed || self.stick_down.just_pressed {
            out.push(Command::Down);
        }
        if self.any_just_pressed(&self.confirm) {
            out.push(Command::Confirm);
        }
        if self.any_just_pressed(&self.cancel) {
            out.push(Command::Cancel);
        }
        out
    }

    fn clear_just_pressed(&mut self) {
        for b in &mut self.buttons {
            b.just_pressed = false;
        }
        for s in [&mut self.dpad_up, &mut self.dpad_down, &mut self.stick_up, &mut self.stick_down] {
            s.just_pressed = false;
        }
    }

    #[cfg_attr(not(any(feature = "gamepad", test)), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BTN_COUNT];
        self.dpad_up = BtnState::default();
        self.dpad_down = BtnState::default();
        self.stick_up = BtnState::default();
        self.stick_down = BtnState::default();
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad() -> GamepadState {
        let mut gp = GamepadState::new();
        gp.clear_just_pressed();
        gp
    }

    #[test]
    fn dpad_and_default_buttons_map_to_commands() {
        let mut gp = pad();
        gp.apply(PadEvent::DPadDown(true));
        gp.apply(PadEvent::Button(Btn::A, true));
        assert_eq!(gp.commands(), vec![Command::Down, Command::Confirm]);

        // Still held next frame: no repeat.
        gp.clear_just_pressed();
        assert!(gp.commands().is_empty());

        gp.apply(PadEvent::Button(Btn::Select, true));
        assert_eq!(gp.commands(), vec![Command::Cancel]);
    }

    #[test]
    fn stick_fires_once_per_deadzone_crossing() {
        let mut gp = pad();
        gp.apply(PadEvent::StickY(0.9));
        gp.derive_stick();
        assert_eq!(gp.commands(), vec![Command::Up]);

        gp.clear_just_pressed();
        gp.apply(PadEvent::StickY(0.8));
        gp.derive_stick();
        assert!(gp.commands().is_empty());

        gp.clear_just_pressed();
        gp.apply(PadEvent::StickY(0.1));
        gp.derive_stick();
        gp.apply(PadEvent::StickY(-0.7));
        gp.derive_stick();
        assert_eq!(gp.commands(), vec![Command::Down]);
    }

    #[test]
    fn configured_mapping_replaces_defaults() {
        let mut gp = pad();
        gp.load_button_config(&GamepadConfig {
            confirm: vec!["x".into(), "bogus".into()],
            cancel: vec!["nothing".into()],
        });
        gp.apply(PadEvent::Button(Btn::A, true));
        assert!(gp.commands().is_empty());
        gp.apply(PadEvent::Button(Btn::X, true));
        gp.apply(PadEvent::Button(Btn::B, true));
        assert_eq!(gp.commands(), vec![Command::Confirm, Command::Cancel]);
    }

    #[test]
    fn disconnect_releases_everything() {
        let mut gp = pad();
        gp.apply(PadEvent::Button(Btn::Start, true));
        gp.apply(PadEvent::Disconnected);
        assert!(!gp.connected);
        assert!(gp.commands().is_empty());
    }
}
