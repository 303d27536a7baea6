//! Palette: foreground / background / accent colors that drive the theme.
//!
//! Scenes never cache colors across renders; they ask a `PaletteProvider`
//! on creation and again on every palette-change notification.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parse `#RRGGBB` (leading `#` optional).
    pub fn from_hex(s: &str) -> Option<Rgb> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Rgb { r, g, b })
    }

    /// Scale each channel towards black. `factor` is clamped to 0..=1.
    pub fn dim(self, factor: f32) -> Rgb {
        let f = factor.clamp(0.0, 1.0);
        Rgb {
            r: (self.r as f32 * f) as u8,
            g: (self.g as f32 * f) as u8,
            b: (self.b as f32 * f) as u8,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PaletteColors {
    pub foreground: Rgb,
    pub background: Rgb,
    pub accent: Rgb,
}

pub trait PaletteProvider {
    fn palette_colors(&self) -> PaletteColors;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    pub colors: PaletteColors,
}

impl Theme {
    pub fn new(name: impl Into<String>, colors: PaletteColors) -> Self {
        Theme { name: name.into(), colors }
    }

    pub fn builtin() -> Vec<Theme> {
        vec![
            Theme::new("Neon", PaletteColors {
                foreground: Rgb::new(230, 230, 245),
                background: Rgb::new(22, 22, 35),
                accent: Rgb::new(80, 255, 160),
            }),
            Theme::new("Ember", PaletteColors {
                foreground: Rgb::new(255, 226, 190),
                background: Rgb::new(34, 18, 14),
                accent: Rgb::new(255, 120, 40),
            }),
            Theme::new("Mono", PaletteColors {
                foreground: Rgb::new(220, 220, 220),
                background: Rgb::new(16, 16, 16),
                accent: Rgb::new(255, 255, 255),
            }),
        ]
    }
}

/// Configured theme list with a current position.
#[derive(Clone, Debug)]
pub struct ThemeCycler {
    themes: Vec<Theme>,
    current: usize,
}

impl ThemeCycler {
    /// An empty list falls back to the built-in themes.
    pub fn new(themes: Vec<Theme>) -> Self {
        let themes = if themes.is_empty() { Theme::builtin() } else { themes };
        ThemeCycler { themes, current: 0 }
    }

    pub fn current(&self) -> &Theme {
        &self.themes[self.current]
    }

    /// Advance to the next theme (wraps). Returns the new theme.
    pub fn cycle(&mut self) -> &Theme {
        self.current = (self.current + 1) % self.themes.len();
        &self.themes[self.current]
    }
}

impl PaletteProvider for ThemeCycler {
    fn palette_colors(&self) -> PaletteColors {
        self.current().colors
    }
}
