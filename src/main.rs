//! Entry point and frame loop.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

use chromadrop::config::GameConfig;
use chromadrop::domain::palette::ThemeCycler;
use chromadrop::domain::score::MemoryScoreStore;
use chromadrop::error::{AppError, AppResult};
use chromadrop::sim::host::Host;
use chromadrop::sim::scores::FileScoreStore;
use chromadrop::ui::gamepad::GamepadState;
use chromadrop::ui::input::{InputState, RawInput};
use chromadrop::ui::renderer::Renderer;
use chromadrop::ui::sound::{sfx_for_frame, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();
    if let Err(e) = init_logging(&config.log_file) {
        eprintln!("Warning: {e}; continuing without a log file.");
    }
    for w in &config.warnings {
        warn!("{w}");
    }
    info!(
        config = ?config.source,
        scores = %config.scores_file.display(),
        tick_rate_ms = config.tick_rate_ms,
        themes = config.themes.len(),
        "chromadrop starting"
    );

    let palette = ThemeCycler::new(config.themes.clone());
    let mut host = if score_dir_writable(&config.scores_file) {
        Host::new(FileScoreStore::open(&config.scores_file), palette)
    } else {
        warn!(path = %config.scores_file.display(), "score directory not writable, scores will not persist");
        Host::new(MemoryScoreStore::new(), palette)
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        // Raw mode may already be on.
        let _ = renderer.cleanup();
        error!("terminal init failed: {e}");
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = run(&mut host, &mut renderer, sound.as_ref(), &config);
    host.shutdown();

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("{e}");
        eprintln!("chromadrop: {e}");
        std::process::exit(1);
    }
    info!("chromadrop exiting");
}

fn run(
    host: &mut Host,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> AppResult<()> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();
        gp.update();
        for cmd in gp.commands() {
            kb.push(RawInput::Command(cmd));
        }

        // Pointer input resolves against the frame the user is looking at.
        for input in kb.take() {
            host.handle(input, renderer.hits());
            if host.should_quit() {
                return Ok(());
            }
        }

        if last_tick.elapsed() >= tick_rate {
            host.tick();
            last_tick = Instant::now();
        }

        let events = host.take_events();
        if let (Some(sfx), Some(effect)) = (sound, sfx_for_frame(&events)) {
            sfx.play(effect);
        }

        renderer.render(host)?;
        std::thread::sleep(FRAME_SLEEP);
    }
}

/// File-only subscriber: the terminal belongs to the renderer.
/// `RUST_LOG` overrides the default `info` filter.
fn init_logging(path: &Path) -> AppResult<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| AppError::LogFile {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| AppError::LogFile { path: path.to_path_buf(), source })?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}

fn score_dir_writable(path: &Path) -> bool {
    match path.parent().filter(|d| !d.as_os_str().is_empty()) {
        Some(dir) => std::fs::create_dir_all(dir).is_ok(),
        None => true,
    }
}
