/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.
///
/// World pixels map to terminal cells at a fixed scale; a terminal
/// cell is roughly twice as tall as it is wide, so the vertical scale
/// is double the horizontal one and the room keeps its proportions.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::geometry::Vec2;
use crate::domain::sprite::SpriteKey;
use crate::sim::world::{Phase, WorldState};

// ── World-to-terminal scale ──

/// World pixels covered by one terminal column.
const PX_PER_COL: f32 = 16.0;
/// World pixels covered by one terminal row (cells are ~2:1 tall).
const PX_PER_ROW: f32 = 32.0;

// ── Layout rows ──

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
/// Rows reserved below the map: message line + help line.
const FOOTER_ROWS: usize = 2;

// ── Palette ──

const COLOR_FLOOR: Color = Color::Rgb { r: 70, g: 70, b: 95 };
const COLOR_WALL: Color = Color::Rgb { r: 140, g: 90, b: 60 };
const COLOR_PLAYER: Color = Color::Rgb { r: 255, g: 215, b: 0 };
const COLOR_TARGET: Color = Color::Rgb { r: 90, g: 200, b: 140 };
const COLOR_HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, used
    /// for both Clear and per-cell backgrounds so inter-row gap pixels
    /// match and no horizontal lines show through.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: '?',
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
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
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
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

    /// Write a string at (x, y) with given colors.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width { break; }
            self.set(cx, y, Cell::new(ch, fg, bg));
            cx += 1;
        }
    }

    /// Centered string on a row.
    fn put_str_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let len = s.chars().count();
        let x = self.width.saturating_sub(len) / 2;
        self.put_str(x, y, s, fg, bg);
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    enhanced_keys: bool,
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
            enhanced_keys: false,
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

        // Release events make held-key tracking exact where supported
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &mut WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Viewport in world pixels follows the terminal size: the
        // responsive-layout decision lives entirely here.
        let map_rows = self.term_h.saturating_sub(MAP_ROW + FOOTER_ROWS).max(1);
        world.camera.view_w = self.term_w as f32 * PX_PER_COL;
        world.camera.view_h = map_rows as f32 * PX_PER_ROW;

        // Detect phase change → clear for clean transition
        let phase_changed = self.last_phase != Some(world.phase);
        if phase_changed {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        // Re-center camera now that view_w/view_h are up to date.
        if world.phase == Phase::Playing {
            let focus = world.player.pos;
            let (ww, wh) = (world.room.width, world.room.height);
            world.camera.follow(focus, ww, wh);
        }

        // Build front buffer
        self.front.clear();

        match world.phase {
            Phase::Title => self.compose_title(world),
            Phase::Playing => self.compose_room(world, map_rows),
            Phase::NextScene => self.compose_next_scene(world),
        }

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
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

        // Set explicit base colors at start of frame. Not ResetColor:
        // the terminal default may differ from BASE_BG and cause line
        // artifacts.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        let mut buf = [0u8; 4];
        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch.encode_utf8(&mut buf)))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_title(&mut self, w: &WorldState) {
        let mid = self.front.height / 2;
        self.front.put_str_centered(
            mid.saturating_sub(3), "R O O M W A L K", COLOR_PLAYER, Cell::BASE_BG,
        );
        self.front.put_str_centered(
            mid.saturating_sub(1),
            &format!("a walk around the {}", w.room.name),
            Color::White, Cell::BASE_BG,
        );
        self.front.put_str_centered(
            mid + 2, "[Enter] Walk    [Esc] Quit", Color::Grey, Cell::BASE_BG,
        );
        if w.message_timer > 0 {
            self.front.put_str_centered(mid + 4, &w.message, COLOR_TARGET, Cell::BASE_BG);
        }
    }

    fn compose_room(&mut self, w: &WorldState, map_rows: usize) {
        let buf_w = self.front.width;
        let buf_h = self.front.height;

        // ── HUD row ──
        let hud = format!(
            " {}  pos:({:>4.0},{:>4.0})  {} ",
            w.room.name, w.player.pos.x, w.player.pos.y,
            sprite_label(w.sprite.current()),
        );
        for x in 0..buf_w {
            self.front.set(x, HUD_ROW, Cell::new(' ', Color::White, COLOR_HUD_BG));
        }
        self.front.put_str(0, HUD_ROW, &hud, Color::White, COLOR_HUD_BG);

        // ── Room (camera viewport), sampled per cell ──
        let cam = &w.camera;
        for vy in 0..map_rows {
            let row = MAP_ROW + vy;
            if row >= buf_h { break; }
            let wy = cam.y + (vy as f32 + 0.5) * PX_PER_ROW;

            for vx in 0..buf_w {
                let wx = cam.x + (vx as f32 + 0.5) * PX_PER_COL;
                if wx < 0.0 || wx >= w.room.width || wy < 0.0 || wy >= w.room.height {
                    continue; // void outside a centered small world
                }
                let p = Vec2::new(wx, wy);
                let cell = if w.room.obstacles.contains_point(p) {
                    Cell::new('█', COLOR_WALL, Cell::BASE_BG)
                } else if p.distance(w.room.target) <= w.room.radius {
                    Cell::new('◌', COLOR_TARGET, Cell::BASE_BG)
                } else {
                    Cell::new('·', COLOR_FLOOR, Cell::BASE_BG)
                };
                self.front.set(vx, row, cell);
            }
        }

        // ── Player ──
        let v = cam.to_view(w.player.pos);
        let pcol = (v.x / PX_PER_COL).floor() as i32;
        // A player at the exact bottom edge of the viewport lands on
        // row `map_rows`; keep the glyph inside the map area.
        let prow = ((v.y / PX_PER_ROW).floor() as i32).min(map_rows as i32 - 1);
        if pcol >= 0 && prow >= 0 {
            let glyph = sprite_glyph(w.sprite.current());
            self.front.set(
                pcol as usize, MAP_ROW + prow as usize,
                Cell::new(glyph, COLOR_PLAYER, Cell::BASE_BG),
            );
        }

        // ── Minimap (top-right overlay) ──
        self.compose_minimap(w, map_rows);

        // ── Footer: affordance + message + help ──
        let msg_row = buf_h.saturating_sub(2);
        if w.near_target {
            self.front.put_str_centered(
                msg_row,
                &format!("! Press [Space] to enter the {} !", w.room.next_room),
                Color::Black, COLOR_TARGET,
            );
        } else if w.message_timer > 0 {
            self.front.put_str_centered(msg_row, &w.message, Color::White, Cell::BASE_BG);
        }
        self.front.put_str(
            0, buf_h.saturating_sub(1),
            " Arrows/WASD move   [Space] interact   [Esc] title ",
            Color::Grey, Cell::BASE_BG,
        );
    }

    /// Scaled overview of the whole room: obstacles and the player
    /// dot. Pure presentation, no decision logic.
    fn compose_minimap(&mut self, w: &WorldState, map_rows: usize) {
        const MM_W: usize = 16;
        const MM_H: usize = 10;
        if self.front.width < MM_W + 2 || map_rows < MM_H + 1 {
            return; // terminal too small, skip the overlay
        }
        let origin_x = self.front.width - MM_W - 1;
        let origin_y = MAP_ROW;

        let sx = w.room.width / MM_W as f32;
        let sy = w.room.height / MM_H as f32;

        for my in 0..MM_H {
            for mx in 0..MM_W {
                let p = Vec2::new((mx as f32 + 0.5) * sx, (my as f32 + 0.5) * sy);
                let cell = if w.room.obstacles.contains_point(p) {
                    Cell::new('▪', COLOR_WALL, COLOR_HUD_BG)
                } else {
                    Cell::new(' ', COLOR_FLOOR, COLOR_HUD_BG)
                };
                self.front.set(origin_x + mx, origin_y + my, cell);
            }
        }

        // Player dot, clamped into the box
        let px = ((w.player.pos.x / sx) as usize).min(MM_W - 1);
        let py = ((w.player.pos.y / sy) as usize).min(MM_H - 1);
        self.front.set(
            origin_x + px, origin_y + py,
            Cell::new('●', COLOR_PLAYER, COLOR_HUD_BG),
        );
    }

    fn compose_next_scene(&mut self, w: &WorldState) {
        let mid = self.front.height / 2;
        self.front.put_str_centered(
            mid.saturating_sub(1),
            &format!("You step into the {}.", w.room.next_room),
            COLOR_TARGET, Cell::BASE_BG,
        );
        self.front.put_str_centered(
            mid + 2, "[Enter] Walk again    [Esc] Quit", Color::Grey, Cell::BASE_BG,
        );
    }
}

fn sprite_label(key: SpriteKey) -> &'static str {
    match key {
        SpriteKey::Idle => "idle",
        SpriteKey::Left => "walk-left",
        SpriteKey::Right => "walk-right",
        SpriteKey::Up => "walk-up",
        SpriteKey::Down => "walk-down",
    }
}

fn sprite_glyph(key: SpriteKey) -> char {
    match key {
        SpriteKey::Idle => '@',
        SpriteKey::Left => '<',
        SpriteKey::Right => '>',
        SpriteKey::Up => '^',
        SpriteKey::Down => 'v',
    }
}
