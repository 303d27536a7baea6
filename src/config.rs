//! External configuration loader.
//!
//! Reads `config.toml` from the executable's directory, the CWD or the
//! XDG / system data directories. Missing file or missing keys fall back
//! to defaults; so does a theme with an unparseable color.
//!
//! Loading runs before the log subscriber exists, so fallbacks are
//! collected in `GameConfig::warnings` for the caller to log.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::palette::{PaletteColors, Rgb, Theme};

const APP_DIR: &str = "chromadrop";

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub tick_rate_ms: u64,
    pub scores_file: PathBuf,
    pub log_file: PathBuf,
    pub themes: Vec<Theme>,
    pub gamepad: GamepadConfig,
    /// The config.toml that was read, if any.
    pub source: Option<PathBuf>,
    /// Fallbacks taken while loading.
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    palette: TomlPalette,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_scores_file")]
    scores_file: String,
    #[serde(default = "default_log_file")]
    log_file: String,
}

#[derive(Deserialize, Debug, Default)]
struct TomlPalette {
    #[serde(default)]
    themes: Vec<TomlTheme>,
}

#[derive(Deserialize, Debug)]
struct TomlTheme {
    name: String,
    foreground: String,
    background: String,
    accent: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 50 }
fn default_scores_file() -> String { "scores.toml".into() }
fn default_log_file() -> String { "chromadrop.log".into() }
fn default_confirm() -> Vec<String> { vec!["A".into(), "Start".into()] }
fn default_cancel() -> Vec<String> { vec!["B".into(), "Select".into()] }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            tick_rate_ms: default_tick_rate(),
            scores_file: default_scores_file(),
            log_file: default_log_file(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) ~/.local/share/chromadrop, (4) /usr/share/chromadrop.
    pub fn load() -> Self {
        let mut warnings = vec![];
        let (toml_cfg, source) = load_toml(&candidate_dirs(), &mut warnings);
        let mut cfg = Self::from_toml(toml_cfg, &data_dir(), warnings);
        cfg.source = source;
        cfg
    }

    /// Parse a config document directly. Relative file paths resolve
    /// against `data_dir`.
    pub fn parse(text: &str, data_dir: &Path) -> Self {
        let mut warnings = vec![];
        let toml_cfg = parse_toml(text, &mut warnings);
        Self::from_toml(toml_cfg, data_dir, warnings)
    }

    fn from_toml(toml_cfg: TomlConfig, data_dir: &Path, mut warnings: Vec<String>) -> Self {
        let themes = parse_themes(toml_cfg.palette.themes, &mut warnings);
        GameConfig {
            // A zero tick would spin the frame loop.
            tick_rate_ms: toml_cfg.general.tick_rate_ms.max(1),
            scores_file: resolve(data_dir, &toml_cfg.general.scores_file),
            log_file: resolve(data_dir, &toml_cfg.general.log_file),
            themes,
            gamepad: GamepadConfig {
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
            },
            source: None,
            warnings,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), Path::new("."), vec![])
    }
}

fn resolve(base: &Path, file: &str) -> PathBuf {
    let p = PathBuf::from(file);
    if p.is_absolute() { p } else { base.join(p) }
}

/// Any theme with a bad color discards the whole configured list.
fn parse_themes(raw: Vec<TomlTheme>, warnings: &mut Vec<String>) -> Vec<Theme> {
    if raw.is_empty() {
        return Theme::builtin();
    }
    let mut themes = Vec::with_capacity(raw.len());
    for t in raw {
        match theme_colors(&t) {
            Some(colors) => themes.push(Theme::new(t.name, colors)),
            None => {
                warnings.push(format!(
                    "theme \"{}\" has an invalid #RRGGBB color, using built-in themes",
                    t.name
                ));
                return Theme::builtin();
            }
        }
    }
    themes
}

fn theme_colors(t: &TomlTheme) -> Option<PaletteColors> {
    Some(PaletteColors {
        foreground: Rgb::from_hex(&t.foreground)?,
        background: Rgb::from_hex(&t.background)?,
        accent: Rgb::from_hex(&t.accent)?,
    })
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Follow symlinks so an installed link still finds the real binary's data.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share").join(APP_DIR);
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    let sys = PathBuf::from("/usr/share").join(APP_DIR);
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Writable directory for scores and the log: the exe directory for
/// portable installs, else ~/.local/share/chromadrop, else the CWD.
fn data_dir() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let probe = parent.join(".write_test_chromadrop");
            if std::fs::write(&probe, "").is_ok() {
                let _ = std::fs::remove_file(&probe);
                return parent.to_path_buf();
            }
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share").join(APP_DIR);
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn parse_toml(text: &str, warnings: &mut Vec<String>) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warnings.push(format!("config.toml parse error, using default settings: {e}"));
            TomlConfig::default()
        }
    }
}

/// First readable config.toml wins.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> (TomlConfig, Option<PathBuf>) {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => return (parse_toml(&text, warnings), Some(path)),
            Err(e) => warnings.push(format!("could not read {}: {e}", path.display())),
        }
    }
    (TomlConfig::default(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = GameConfig::parse("", Path::new("/data"));
        assert_eq!(cfg.tick_rate_ms, 50);
        assert_eq!(cfg.scores_file, PathBuf::from("/data/scores.toml"));
        assert_eq!(cfg.log_file, PathBuf::from("/data/chromadrop.log"));
        assert_eq!(cfg.themes, Theme::builtin());
        assert_eq!(cfg.gamepad.confirm, vec!["A".to_string(), "Start".to_string()]);
        assert!(cfg.warnings.is_empty());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::parse(
            "[general]\ntick_rate_ms = 30\nscores_file = \"/tmp/hs.toml\"\n",
            Path::new("/data"),
        );
        assert_eq!(cfg.tick_rate_ms, 30);
        assert_eq!(cfg.scores_file, PathBuf::from("/tmp/hs.toml"));
        assert_eq!(cfg.log_file, PathBuf::from("/data/chromadrop.log"));
        assert_eq!(cfg.gamepad.cancel, vec!["B".to_string(), "Select".to_string()]);
    }

    #[test]
    fn configured_themes_replace_builtin() {
        let text = r##"
            [[palette.themes]]
            name = "Sea"
            foreground = "#E0F0FF"
            background = "#001020"
            accent = "#00C0FF"
        "##;
        let cfg = GameConfig::parse(text, Path::new("."));
        assert_eq!(cfg.themes.len(), 1);
        assert_eq!(cfg.themes[0].name, "Sea");
        assert_eq!(cfg.themes[0].colors.accent, Rgb::new(0x00, 0xC0, 0xFF));
    }

    #[test]
    fn bad_theme_color_falls_back() {
        let text = r##"
            [[palette.themes]]
            name = "Broken"
            foreground = "#E0F0FF"
            background = "navy"
            accent = "#00C0FF"
        "##;
        let cfg = GameConfig::parse(text, Path::new("."));
        assert_eq!(cfg.themes, Theme::builtin());
        assert_eq!(cfg.warnings.len(), 1);
        assert!(cfg.warnings[0].contains("\"Broken\""));
    }

    #[test]
    fn parse_error_falls_back_entirely() {
        let cfg = GameConfig::parse("[general\ntick_rate_ms = ", Path::new("/d"));
        assert_eq!(cfg.tick_rate_ms, 50);
        assert_eq!(cfg.scores_file, PathBuf::from("/d/scores.toml"));
        assert_eq!(cfg.warnings.len(), 1);
        assert!(cfg.warnings[0].starts_with("config.toml parse error"));
    }

    #[test]
    fn search_reads_first_config_and_records_source() {
        let empty = tempfile::tempdir().unwrap();
        let found = tempfile::tempdir().unwrap();
        std::fs::write(found.path().join("config.toml"), "[general\n").unwrap();

        let mut warnings = vec![];
        let dirs = [empty.path().to_path_buf(), found.path().to_path_buf()];
        let (cfg, source) = load_toml(&dirs, &mut warnings);
        assert_eq!(source, Some(found.path().join("config.toml")));
        assert_eq!(cfg.general.tick_rate_ms, 50);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn zero_tick_rate_is_clamped() {
        let cfg = GameConfig::parse("[general]\ntick_rate_ms = 0\n", Path::new("."));
        assert_eq!(cfg.tick_rate_ms, 1);
    }
}
