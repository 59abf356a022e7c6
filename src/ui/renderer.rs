/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Each game cell is two terminal columns wide. The two players' views are
/// drawn side by side: Player 1 left, Player 2 right.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::board::DigCell;
use crate::domain::entity::{PlayerId, Pos};
use crate::domain::tile::{KeyColor, PortalColor, Tile};
use crate::sim::dig::DigLevel;
use crate::sim::maze::{MazeLevel, REQUIRED_KEYS};
use crate::sim::portal::PortalLevel;
use crate::sim::world::{ActiveLevel, Phase, Snapshot};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every "empty" terminal cell, so cleared
    /// areas and drawn areas always match.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
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
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Palette ──

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const BANNER_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const GREEN: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const WALL: Color = Color::Rgb { r: 90, g: 90, b: 120 };
const HIDDEN: Color = Color::Rgb { r: 110, g: 85, b: 60 };
const DUG_BG: Color = Color::Rgb { r: 35, g: 30, b: 28 };
const CURSOR_BG: Color = Color::Rgb { r: 70, g: 70, b: 20 };

fn player_color(player: PlayerId) -> Color {
    match player {
        PlayerId::P1 => Color::Rgb { r: 100, g: 200, b: 255 },
        PlayerId::P2 => Color::Rgb { r: 255, g: 150, b: 60 },
    }
}

fn key_color(key: KeyColor) -> Color {
    match key {
        KeyColor::Red => Color::Rgb { r: 255, g: 70, b: 70 },
        KeyColor::Blue => Color::Rgb { r: 80, g: 120, b: 255 },
        KeyColor::Yellow => Color::Rgb { r: 255, g: 230, b: 60 },
    }
}

fn portal_color(color: PortalColor) -> Color {
    match color {
        PortalColor::Blue => Color::Rgb { r: 80, g: 160, b: 255 },
        PortalColor::Orange => Color::Rgb { r: 255, g: 140, b: 30 },
    }
}

/// Two terminal columns per game cell.
type Glyph = ([char; 2], Color, Color);

// ── Renderer ──

const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const PANEL_ROW: usize = 2;
const PANEL_GAP: usize = 6;
const LEFT_COL: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Draw one frame. `message` is the banner line; empty hides it.
    pub fn render(&mut self, snap: &Snapshot<'_>, message: &str) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change -> clear for clean transition
        if self.last_phase != Some(snap.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(snap.phase);
        }

        self.front.clear();

        match (snap.phase, snap.level) {
            (Phase::Menu, _) => self.compose_menu(),
            (Phase::Final, _) => self.compose_final(snap),
            (_, Some(level)) => self.compose_level(snap, level, message),
            (_, None) => {}
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Do NOT use ResetColor here; it goes back to the terminal's own
        // default, which may differ from BASE_BG.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
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
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_menu(&mut self) {
        let box_art = [
            "╔══════════════════════════════════╗",
            "║         ⚒  CRAFT  DUEL  ⚒        ║",
            "╚══════════════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(6, 3 + i, l, GOLD, Color::Reset);
        }

        let dim = Color::DarkGrey;
        let lines: [(&str, Color); 6] = [
            ("Three levels, best of three:", Color::White),
            ("  1. Labyrinth   collect all 3 keys, then reach the exit", dim),
            ("  2. Portal      teleport through the portals to the goal", dim),
            ("  3. TNT Field   dig up 3 gems first; TNT stuns for 2s", dim),
            ("", dim),
            ("▸ ENTER / SPACE: Start     ESC / Q: Quit", GREEN),
        ];
        for (i, (text, fg)) in lines.iter().enumerate() {
            self.front.put_str(8, 7 + i, text, *fg, Color::Reset);
        }

        self.front.put_str(8, 14, "Player 1:  W A S D move   SPACE / E dig", player_color(PlayerId::P1), Color::Reset);
        self.front.put_str(8, 15, "Player 2:  ← ↑ → ↓ move   ENTER dig", player_color(PlayerId::P2), Color::Reset);
    }

    fn compose_final(&mut self, snap: &Snapshot<'_>) {
        let (headline, fg) = match snap.winner {
            Some(player) => (format!("★  {} WINS THE DUEL  ★", player.label().to_uppercase()), player_color(player)),
            None => ("═  DRAW: NOBODY WINS  ═".to_string(), Color::White),
        };
        self.front.put_str(6, 4, "╔══════════════════════════════════════╗", GOLD, Color::Reset);
        self.front.put_str(6, 5, "║", GOLD, Color::Reset);
        self.front.put_str(9, 5, &headline, fg, Color::Reset);
        self.front.put_str(45, 5, "║", GOLD, Color::Reset);
        self.front.put_str(6, 6, "╚══════════════════════════════════════╝", GOLD, Color::Reset);

        let score = format!("◈ Final score  {} : {}", snap.scores.p1, snap.scores.p2);
        self.front.put_str(8, 9, &score, Color::White, Color::Reset);
        self.front.put_str(8, 11, "▸ ENTER / SPACE / ESC: Back to menu", GREEN, Color::Reset);
    }

    fn compose_level(&mut self, snap: &Snapshot<'_>, level: &ActiveLevel, message: &str) {
        // ── HUD row ──
        let hud = format!(
            " CRAFT DUEL  │  {:<14}│  P1 {} : {} P2 ",
            level.kind().title(), snap.scores.p1, snap.scores.p2,
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Panels ──
        let bottom = match level {
            ActiveLevel::Maze(l) => self.compose_maze(l),
            ActiveLevel::Portal(l) => self.compose_portal(l),
            ActiveLevel::Dig(l) => self.compose_dig(l),
        };

        // ── Message bar ──
        let msg_row = bottom + 1;
        if !message.is_empty() && msg_row < self.front.height {
            let msg = format!(" ◈ {} ", message);
            self.front.fill_row(msg_row, BANNER_BG);
            self.front.put_str(0, msg_row, &msg, Color::Black, BANNER_BG);
        }

        // ── Help bar ──
        let help = " P1: WASD + SPACE/E   │   P2: Arrows + ENTER   │   ESC: Menu  Q: Quit";
        self.front.put_str(0, msg_row + 2, help, Color::DarkGrey, Color::Reset);
    }

    /// Left column of a player's panel, for a map `map_w` cells wide.
    fn panel_col(player: PlayerId, map_w: usize) -> usize {
        match player {
            PlayerId::P1 => LEFT_COL,
            PlayerId::P2 => LEFT_COL + map_w * CELL_W + PANEL_GAP,
        }
    }

    fn put_glyph(&mut self, col: usize, row: usize, glyph: Glyph) {
        let ([a, b], fg, bg) = glyph;
        self.front.set(col, row, Cell::new(a, fg, bg));
        self.front.set(col + 1, row, Cell::new(b, fg, bg));
    }

    fn put_label(&mut self, col: usize, player: PlayerId) {
        self.front.put_str(col, PANEL_ROW, player.label(), player_color(player), Color::Reset);
    }

    /// Returns the last row used.
    fn compose_maze(&mut self, level: &MazeLevel) -> usize {
        let map = level.map();
        let top = PANEL_ROW + 1;
        for player in PlayerId::ALL {
            let col = Self::panel_col(player, map.width);
            let runner = level.runner(player);
            self.put_label(col, player);

            for y in 0..map.height {
                for x in 0..map.width {
                    let pos = Pos::new(x, y);
                    let glyph = if pos == runner.pos {
                        (['@', '@'], Color::Black, player_color(player))
                    } else {
                        match map.tile_at(pos) {
                            Tile::Key(key) if runner.keys.contains(&key) => tile_glyph(Tile::Floor),
                            Tile::Exit if runner.has_all_keys() => (['[', ']'], GREEN, Color::Reset),
                            tile => tile_glyph(tile),
                        }
                    };
                    self.put_glyph(col + x * CELL_W, top + y, glyph);
                }
            }

            let status_row = top + map.height + 1;
            let status = format!("Keys {}/{}  ", runner.keys.len(), REQUIRED_KEYS);
            self.front.put_str(col, status_row, &status, Color::White, Color::Reset);
            let mut kx = col + status.chars().count();
            for key in &runner.keys {
                self.front.set(kx, status_row, Cell::new('●', key_color(*key), Color::Reset));
                kx += 2;
            }
        }
        top + map.height + 1
    }

    fn compose_portal(&mut self, level: &PortalLevel) -> usize {
        let map = level.map();
        let top = PANEL_ROW + 1;
        for player in PlayerId::ALL {
            let col = Self::panel_col(player, map.width);
            let at = level.position(player);
            self.put_label(col, player);

            for y in 0..map.height {
                for x in 0..map.width {
                    let pos = Pos::new(x, y);
                    let glyph = if pos == at {
                        (['@', '@'], Color::Black, player_color(player))
                    } else {
                        tile_glyph(map.tile_at(pos))
                    };
                    self.put_glyph(col + x * CELL_W, top + y, glyph);
                }
            }
        }
        top + map.height
    }

    fn compose_dig(&mut self, level: &DigLevel) -> usize {
        let rules = level.rules();
        let top = PANEL_ROW + 1;
        let mut bottom = top;
        for player in PlayerId::ALL {
            let digger = level.digger(player);
            let board = &digger.board;
            let col = Self::panel_col(player, board.width());
            self.put_label(col, player);

            for index in 0..board.len() {
                let pos = board.pos_of(index);
                let (chars, fg, mut bg) = dig_glyph(board.cell(index), board.is_revealed(index));
                if index == digger.cursor {
                    bg = if digger.is_stunned() { Color::DarkRed } else { CURSOR_BG };
                }
                self.put_glyph(col + pos.x * CELL_W, top + pos.y, (chars, fg, bg));
            }

            let mut row = top + board.height() + 1;
            let gems = format!(
                "Gems {}/{}   Dug {}/{}",
                digger.gems, rules.gems_to_win, board.revealed_count(), board.len()
            );
            self.front.put_str(col, row, &gems, Color::White, Color::Reset);
            if digger.is_stunned() {
                row += 1;
                let stun = format!("STUNNED {:.1}s", digger.stun_ms as f32 / 1000.0);
                self.front.put_str(col, row, &stun, Color::Rgb { r: 255, g: 60, b: 60 }, Color::Reset);
            }
            bottom = bottom.max(top + board.height() + 2);
        }
        bottom
    }
}

fn tile_glyph(tile: Tile) -> Glyph {
    match tile {
        Tile::Wall => (['█', '█'], WALL, Color::Reset),
        Tile::Floor => ([' ', ' '], Color::White, Color::Reset),
        Tile::Start => (['·', '·'], Color::DarkGrey, Color::Reset),
        Tile::Key(key) => (['o', '-'], key_color(key), Color::Reset),
        Tile::Exit => (['[', ']'], Color::Rgb { r: 255, g: 60, b: 60 }, Color::Reset),
        Tile::Portal { color, .. } => (['(', ')'], portal_color(color), Color::Reset),
        Tile::Goal => (['<', '>'], GOLD, Color::Reset),
    }
}

fn dig_glyph(cell: Option<DigCell>, revealed: bool) -> Glyph {
    if !revealed {
        return (['▒', '▒'], HIDDEN, Color::Reset);
    }
    match cell {
        Some(DigCell::Gem) => (['<', '>'], Color::Rgb { r: 80, g: 255, b: 220 }, DUG_BG),
        Some(DigCell::Tnt) => (['*', '*'], Color::Rgb { r: 255, g: 60, b: 60 }, DUG_BG),
        Some(DigCell::Empty) | None => ([' ', ' '], Color::White, DUG_BG),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_str_clips_at_the_edge() {
        let mut buf = FrameBuffer::new(4, 1);
        buf.put_str(2, 0, "abcd", Color::White, Color::Reset);
        assert_eq!(buf.get(2, 0).ch, 'a');
        assert_eq!(buf.get(3, 0).ch, 'b');
        assert_eq!(buf.get(4, 0), Cell::BLANK);
    }

    #[test]
    fn reset_background_becomes_base() {
        assert_eq!(Cell::new('x', Color::White, Color::Reset).bg, Cell::BASE_BG);
    }

    #[test]
    fn hidden_cells_never_leak_contents() {
        assert_eq!(dig_glyph(Some(DigCell::Tnt), false), dig_glyph(Some(DigCell::Gem), false));
        assert_ne!(dig_glyph(Some(DigCell::Tnt), true), dig_glyph(Some(DigCell::Gem), true));
    }

    #[test]
    fn second_panel_sits_right_of_the_first() {
        let p1 = Renderer::panel_col(PlayerId::P1, 11);
        let p2 = Renderer::panel_col(PlayerId::P2, 11);
        assert!(p2 >= p1 + 11 * CELL_W);
    }
}
