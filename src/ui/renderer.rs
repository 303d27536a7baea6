//! Presentation layer: double-buffered, diff-based terminal renderer.
//!
//! How it works:
//!   1. Compose the next frame into the `front` buffer from the scene view trees
//!   2. Compare each cell with the `back` buffer (previous frame)
//!   3. Only emit terminal commands for cells that changed
//!   4. All commands are batched with `queue!`, flushed once at the end
//!   5. Swap front/back
//!
//! Composition also records every button's screen rectangle in a `HitMap`,
//! which the host uses to resolve mouse input on the next frame.
//! Highlight is not stored in the view tree; it is derived from the
//! navigation state while composing.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::palette::{PaletteColors, PaletteProvider, Rgb};
use crate::scene::game_over::GameOverScene;
use crate::scene::menu::{MenuScene, ModalState, ScoreTable};
use crate::scene::{ButtonNode, Target, TextNode};
use crate::sim::host::Host;
use crate::sim::session::{Phase, PlaySession};
use crate::ui::hitmap::{HitMap, Rect};

fn term_color(c: Rgb) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Sentinel used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn blank(bg: Color) -> Self {
        Cell { ch: ' ', fg: bg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    /// Frame background; every cell starts from it, never terminal-default.
    base_bg: Color,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        let base_bg = Color::Black;
        FrameBuffer { width: w, height: h, cells: vec![Cell::blank(base_bg); w * h], base_bg }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::blank(self.base_bg); w * h];
        }
    }

    fn clear(&mut self, bg: Color) {
        self.base_bg = bg;
        self.cells.fill(Cell::blank(bg));
    }

    fn invalidate(&mut self) {
        self.cells.fill(Cell::INVALID);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::blank(self.base_bg)
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell { ch, fg, bg });
        }
    }

    /// Horizontally centered text on the frame's own background.
    fn put_centered(&mut self, y: usize, node: &TextNode) {
        let x = centered_x(self.width, node.text.chars().count());
        let bg = self.base_bg;
        self.put_str(x, y, &node.text, term_color(node.color), bg);
    }

    fn fill(&mut self, rect: Rect, bg: Color) {
        for y in rect.y as usize..rect.y as usize + rect.h as usize {
            for x in rect.x as usize..rect.x as usize + rect.w as usize {
                self.set(x, y, Cell::blank(bg));
            }
        }
    }

    /// Single-line frame around `rect`, interior filled with `bg`.
    fn panel(&mut self, rect: Rect, border: Color, bg: Color) {
        self.fill(rect, bg);
        let (x0, y0) = (rect.x as usize, rect.y as usize);
        let (x1, y1) = (x0 + rect.w as usize - 1, y0 + rect.h as usize - 1);
        for x in x0 + 1..x1 {
            self.set(x, y0, Cell { ch: '─', fg: border, bg });
            self.set(x, y1, Cell { ch: '─', fg: border, bg });
        }
        for y in y0 + 1..y1 {
            self.set(x0, y, Cell { ch: '│', fg: border, bg });
            self.set(x1, y, Cell { ch: '│', fg: border, bg });
        }
        self.set(x0, y0, Cell { ch: '┌', fg: border, bg });
        self.set(x1, y0, Cell { ch: '┐', fg: border, bg });
        self.set(x0, y1, Cell { ch: '└', fg: border, bg });
        self.set(x1, y1, Cell { ch: '┘', fg: border, bg });
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

fn centered_x(width: usize, len: usize) -> usize {
    width.saturating_sub(len) / 2
}

// ── Layout ──

const BUTTON_W: usize = 22;
const MENU_TITLE_ROW: usize = 2;
const MENU_FIRST_BUTTON_ROW: usize = 6;
const BUTTON_SPACING: usize = 2;
const MODAL_W: usize = 36;

/// Compose one frame for the host's current phase into `buf`, recording
/// pointer targets into `hits`.
fn compose(buf: &mut FrameBuffer, hits: &mut HitMap, host: &Host) {
    let colors = host.palette().palette_colors();
    buf.clear(term_color(colors.background));
    hits.clear();

    match host.phase() {
        Phase::Menu => compose_menu(buf, hits, host.menu()),
        Phase::Playing => {
            if let Some(session) = host.session() {
                compose_playing(buf, session, &colors);
            }
        }
        Phase::GameOver => compose_game_over(buf, hits, host.game_over()),
    }
}

/// One button row. The highlighted button is inverted onto the accent color.
#[allow(clippy::too_many_arguments)]
fn draw_button(
    buf: &mut FrameBuffer,
    hits: &mut HitMap,
    x: usize,
    y: usize,
    node: &ButtonNode,
    highlighted: bool,
    accent: Rgb,
    target: Target,
) {
    let (fg, bg, text) = if highlighted {
        (node.background, accent, format!("▸ {} ◂", node.label.text))
    } else {
        (node.label.color, node.background, node.label.text.clone())
    };
    let (fg, bg) = (term_color(fg), term_color(bg));
    buf.fill(Rect::new(x as u16, y as u16, BUTTON_W as u16, 1), bg);
    let tx = x + centered_x(BUTTON_W, text.chars().count());
    buf.put_str(tx, y, &text, fg, bg);
    hits.push(Rect::new(x as u16, y as u16, BUTTON_W as u16, 1), target);
}

fn compose_menu(buf: &mut FrameBuffer, hits: &mut HitMap, menu: &MenuScene) {
    let Some(view) = menu.view() else { return };
    let nav = menu.nav();
    let colors = view.colors;

    buf.put_centered(MENU_TITLE_ROW, &view.title);

    let bx = centered_x(buf.width, BUTTON_W);
    for (i, node) in view.buttons.iter().enumerate() {
        let y = MENU_FIRST_BUTTON_ROW + i * BUTTON_SPACING;
        let lit = nav.modal() == ModalState::None && nav.top().is_highlighted(i);
        draw_button(buf, hits, bx, y, node, lit, colors.accent, Target::MenuButton(i));
    }

    buf.put_centered(buf.height.saturating_sub(2), &view.hint);

    match nav.modal() {
        ModalState::None => {}
        ModalState::LevelSelect => {
            let rows = view.level_buttons.len();
            let rect = modal_rect(buf, 4 + rows * BUTTON_SPACING);
            open_modal(buf, hits, rect, &colors);
            let y0 = rect.y as usize;
            put_in(buf, rect, y0 + 1, &view.level_title, term_color(colors.background.dim(0.5)));
            let bx = rect.x as usize + centered_x(rect.w as usize, BUTTON_W);
            for (i, node) in view.level_buttons.iter().enumerate() {
                let y = y0 + 3 + i * BUTTON_SPACING;
                let lit = nav.levels().is_highlighted(i);
                draw_button(buf, hits, bx, y, node, lit, colors.accent, Target::LevelButton(i));
            }
        }
        ModalState::HighScores => {
            let lines = match &view.score_table {
                ScoreTable::Placeholder(_) => 1,
                ScoreTable::Rows(rows) => rows.len(),
            };
            let rect = modal_rect(buf, 7 + lines);
            open_modal(buf, hits, rect, &colors);
            let panel_bg = term_color(colors.background.dim(0.5));
            let y0 = rect.y as usize;
            put_in(buf, rect, y0 + 1, &view.scores_title, panel_bg);
            match &view.score_table {
                ScoreTable::Placeholder(text) => put_in(buf, rect, y0 + 3, text, panel_bg),
                ScoreTable::Rows(rows) => {
                    for (i, row) in rows.iter().enumerate() {
                        put_in(buf, rect, y0 + 3 + i, &row.text, panel_bg);
                    }
                }
            }
            let bx = rect.x as usize + centered_x(rect.w as usize, BUTTON_W);
            let by = y0 + rect.h as usize - 2;
            // BACK is the only control, so it always shows as selected.
            draw_button(buf, hits, bx, by, &view.back_button, true, colors.accent, Target::HighScoresBack);
        }
    }
}

fn modal_rect(buf: &FrameBuffer, height: usize) -> Rect {
    let w = MODAL_W.min(buf.width);
    let h = height.min(buf.height);
    Rect::new(
        centered_x(buf.width, w) as u16,
        (buf.height.saturating_sub(h) / 2) as u16,
        w as u16,
        h as u16,
    )
}

/// Panel over the menu. The whole screen swallows the pointer so nothing
/// underneath can be hovered or clicked.
fn open_modal(buf: &mut FrameBuffer, hits: &mut HitMap, rect: Rect, colors: &PaletteColors) {
    hits.block(Rect::new(0, 0, buf.width as u16, buf.height as u16));
    if rect.w < 2 || rect.h < 2 {
        return;
    }
    buf.panel(rect, term_color(colors.accent), term_color(colors.background.dim(0.5)));
}

fn put_in(buf: &mut FrameBuffer, rect: Rect, y: usize, node: &TextNode, bg: Color) {
    let x = rect.x as usize + centered_x(rect.w as usize, node.text.chars().count());
    buf.put_str(x, y, &node.text, term_color(node.color), bg);
}

fn compose_playing(buf: &mut FrameBuffer, session: &PlaySession, colors: &PaletteColors) {
    let stats = TextNode::new(
        format!("LEVEL {}   SCORE {}", session.level(), session.score()),
        colors.foreground,
    );
    let mid = buf.height / 2;
    buf.put_centered(mid.saturating_sub(2), &TextNode::new("PLAYING", colors.accent));
    buf.put_centered(mid, &stats);
    buf.put_centered(
        mid + 2,
        &TextNode::new("ENTER ends the run", colors.foreground.dim(0.6)),
    );
}

fn compose_game_over(buf: &mut FrameBuffer, hits: &mut HitMap, scene: &GameOverScene) {
    let Some(view) = scene.view() else { return };
    let nav = scene.nav();

    buf.put_centered(2, &view.title);
    if let Some(banner) = &view.banner {
        buf.put_centered(4, banner);
    }
    for (i, text) in [&view.score, &view.level, &view.lines, &view.specials].iter().enumerate() {
        buf.put_centered(6 + i, text);
    }

    let bx = centered_x(buf.width, BUTTON_W);
    for (i, node) in view.buttons.iter().enumerate() {
        let y = 12 + i * BUTTON_SPACING;
        let lit = nav.list().is_highlighted(i);
        draw_button(buf, hits, bx, y, node, lit, view.colors.accent, Target::ResultButton(i));
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    /// Phase and background of the last frame; a change forces a full repaint.
    last_screen: Option<(Phase, Rgb)>,
    hits: HitMap,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
            hits: HitMap::new(),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.invalidate();

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Pointer targets from the most recent frame.
    pub fn hits(&self) -> &HitMap {
        &self.hits
    }

    pub fn render(&mut self, host: &Host) -> io::Result<()> {
        let bg = host.palette().palette_colors().background;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let resized = tw as usize != self.term_w || th as usize != self.term_h;
        if resized {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
        }

        let screen = (host.phase(), bg);
        if resized || self.last_screen != Some(screen) {
            self.back.invalidate();
            queue!(self.writer, SetBackgroundColor(term_color(bg)), Clear(ClearType::All))?;
            self.last_screen = Some(screen);
        }

        compose(&mut self.front, &mut self.hits, host);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::Reset;
        let mut last_bg = self.front.base_bg;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors, never ResetColor: the terminal default may
        // not match the palette background.
        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::palette::{Theme, ThemeCycler};
    use crate::domain::score::{MemoryScoreStore, ScoreEntry};
    use crate::ui::input::{Command, RawInput};

    fn host(entries: Vec<ScoreEntry>) -> Host {
        Host::new(MemoryScoreStore::with_entries(entries), ThemeCycler::new(Theme::builtin()))
    }

    fn frame(host: &Host) -> (FrameBuffer, HitMap) {
        let mut buf = FrameBuffer::new(80, 24);
        let mut hits = HitMap::new();
        compose(&mut buf, &mut hits, host);
        (buf, hits)
    }

    fn press(host: &mut Host, cmd: Command) {
        host.handle(RawInput::Command(cmd), &HitMap::new());
    }

    #[test]
    fn menu_buttons_are_hit_targets() {
        let host = host(vec![]);
        let (buf, hits) = frame(&host);
        let bx = centered_x(80, BUTTON_W) as u16;
        for i in 0..3 {
            let y = (MENU_FIRST_BUTTON_ROW + i * BUTTON_SPACING) as u16;
            assert_eq!(hits.target_at(bx, y), Some(Target::MenuButton(i)));
            assert_eq!(hits.target_at(bx + BUTTON_W as u16 - 1, y), Some(Target::MenuButton(i)));
        }
        assert_eq!(hits.target_at(bx, MENU_FIRST_BUTTON_ROW as u16 + 1), None);
        assert!(buf.row_text(MENU_TITLE_ROW).contains("CHROMA DROP"));
        assert!(buf.row_text(MENU_FIRST_BUTTON_ROW).contains("▸ PLAY ◂"));
        assert!(buf.row_text(MENU_FIRST_BUTTON_ROW + BUTTON_SPACING).contains("HIGH SCORES"));
    }

    #[test]
    fn level_modal_shadows_menu_buttons() {
        let mut host = host(vec![]);
        press(&mut host, Command::Confirm);
        let (buf, hits) = frame(&host);

        let bx = centered_x(80, BUTTON_W) as u16;
        let mut levels = vec![];
        for y in 0..24 {
            if let Some(Target::LevelButton(i)) = hits.target_at(bx + 1, y) {
                levels.push(i);
                assert!(buf.row_text(y as usize).contains(&format!("LEVEL {}", [1, 3, 5][i])));
            }
        }
        assert_eq!(levels, vec![0, 1, 2]);

        // Top-level buttons are still drawn but no longer reachable.
        assert!(buf.row_text(MENU_FIRST_BUTTON_ROW).contains("PLAY"));
        for y in 0..24 {
            assert!(!matches!(hits.target_at(bx + 1, y), Some(Target::MenuButton(_))));
        }
    }

    #[test]
    fn high_scores_modal_shows_placeholder_or_rows() {
        let mut host = host(vec![]);
        press(&mut host, Command::Down);
        press(&mut host, Command::Confirm);
        let (buf, hits) = frame(&host);
        assert!((0..24).any(|y| buf.row_text(y).contains("NO SCORES YET")));
        assert!((0..24).any(|y| (0..80).any(|x| hits.target_at(x, y) == Some(Target::HighScoresBack))));

        let mut host = self::host(vec![ScoreEntry::new(1200, 5), ScoreEntry::new(300, 1)]);
        press(&mut host, Command::Down);
        press(&mut host, Command::Confirm);
        let (buf, _) = frame(&host);
        let text: Vec<String> = (0..24).map(|y| buf.row_text(y)).collect();
        assert!(text.iter().any(|r| r.contains(" 1.      1200   LV 5")));
        assert!(text.iter().any(|r| r.contains(" 2.       300   LV 1")));
        assert!(!text.iter().any(|r| r.contains("NO SCORES YET")));
    }

    #[test]
    fn playing_has_no_targets_and_game_over_has_two() {
        let mut host = host(vec![]);
        press(&mut host, Command::Confirm);
        press(&mut host, Command::Confirm);
        host.tick();
        let (buf, hits) = frame(&host);
        assert!(hits.is_empty());
        assert!((0..24).any(|y| buf.row_text(y).contains("LEVEL 1   SCORE 1")));

        press(&mut host, Command::Confirm);
        let (buf, hits) = frame(&host);
        let bx = centered_x(80, BUTTON_W) as u16;
        assert_eq!(hits.target_at(bx, 12), Some(Target::ResultButton(0)));
        assert_eq!(hits.target_at(bx, 14), Some(Target::ResultButton(1)));
        assert!(buf.row_text(2).contains("GAME OVER"));
        assert!(buf.row_text(4).contains("NEW HIGH SCORE!"));
        assert!(buf.row_text(6).contains("SCORE: 1"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let mut host = host(vec![ScoreEntry::new(10, 1)]);
        press(&mut host, Command::Down);
        press(&mut host, Command::Confirm);
        let mut buf = FrameBuffer::new(10, 4);
        let mut hits = HitMap::new();
        compose(&mut buf, &mut hits, &host);
    }
}
