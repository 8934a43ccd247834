//! GameView: maps the painted tiles and a game snapshot into a framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.
//!
//! Cards are laid out row-major in [`BOARD_COLUMNS`] columns, so board index
//! `i` sits at column `i % BOARD_COLUMNS`, row `i / BOARD_COLUMNS`. The same
//! layout drives [`GameView::hit_test`] for mouse clicks.

use crate::canvas::TileCanvas;
use crate::core::GameSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{CardKind, CardState, GameEvent, Tile, BOARD_COLUMNS};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub enabled: bool,
    pub client_count: u16,
    pub controller_id: Option<usize>,
}

/// Host-side extras drawn next to the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HudView {
    /// Keyboard cursor (board index).
    pub cursor: Option<usize>,
    pub last_event: Option<GameEvent>,
    pub adapter: Option<AdapterStatusView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Where the board frame and its card grid land for a given viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    pub frame_x: u16,
    pub frame_y: u16,
    pub frame_w: u16,
    pub frame_h: u16,
    pub grid_x: u16,
    pub grid_y: u16,
    pub columns: u16,
    pub rows: u16,
}

/// Rows between the top border and the card grid (message + spacer).
const HEADER_ROWS: u16 = 2;
const GAP_X: u16 = 1;

pub struct GameView {
    /// Card box width in terminal columns (border included).
    card_w: u16,
    /// Card box height in terminal rows (border included).
    card_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // Wide enough for the longest tile name plus border and padding.
        Self {
            card_w: 12,
            card_h: 3,
            anchor_y: AnchorY::Center,
        }
    }
}

impl GameView {
    pub fn new(card_w: u16, card_h: u16) -> Self {
        Self {
            card_w: card_w.max(3),
            card_h: card_h.max(3),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    pub fn layout(&self, board_len: usize, viewport: Viewport) -> BoardLayout {
        let columns = BOARD_COLUMNS.min(board_len).max(1) as u16;
        let rows = board_len.div_ceil(columns as usize) as u16;

        let grid_w = columns * self.card_w + (columns - 1) * GAP_X;
        let grid_h = rows * self.card_h;
        let frame_w = grid_w + 2;
        let frame_h = grid_h + HEADER_ROWS + 2;

        let frame_x = viewport.width.saturating_sub(frame_w) / 2;
        let frame_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(frame_h) / 2,
            AnchorY::Top => 0,
        };

        BoardLayout {
            frame_x,
            frame_y,
            frame_w,
            frame_h,
            grid_x: frame_x + 1,
            grid_y: frame_y + 1 + HEADER_ROWS,
            columns,
            rows,
        }
    }

    /// Top-left corner of the card box at `index`.
    pub fn card_origin(&self, layout: &BoardLayout, index: usize) -> (u16, u16) {
        let col = (index % layout.columns as usize) as u16;
        let row = (index / layout.columns as usize) as u16;
        (
            layout.grid_x + col * (self.card_w + GAP_X),
            layout.grid_y + row * self.card_h,
        )
    }

    /// Board index of the card under terminal cell (x, y), if any.
    pub fn hit_test(&self, board_len: usize, viewport: Viewport, x: u16, y: u16) -> Option<usize> {
        let layout = self.layout(board_len, viewport);
        if x < layout.grid_x || y < layout.grid_y {
            return None;
        }
        let dx = x - layout.grid_x;
        let dy = y - layout.grid_y;

        let pitch = self.card_w + GAP_X;
        let col = dx / pitch;
        if col >= layout.columns || dx % pitch >= self.card_w {
            return None;
        }
        let row = dy / self.card_h;
        if row >= layout.rows {
            return None;
        }

        let index = row as usize * layout.columns as usize + col as usize;
        (index < board_len).then_some(index)
    }

    /// Render into an existing framebuffer.
    ///
    /// Tiles and the status message come from `canvas` (what the render loop
    /// last painted). `snap` only supplies matched-state highlighting and the
    /// side panel numbers.
    pub fn render_into(
        &self,
        canvas: &TileCanvas,
        snap: &GameSnapshot,
        hud: &HudView,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().into_cell(' '));

        let board_len = canvas.len().max(snap.cards.len());
        let layout = self.layout(board_len, viewport);

        let border = CellStyle::fg(Rgb::new(200, 200, 200));
        fb.draw_box(
            layout.frame_x,
            layout.frame_y,
            layout.frame_w,
            layout.frame_h,
            border,
        );

        self.draw_message(fb, &layout, canvas.message(), snap.won);

        for index in 0..board_len {
            let matched = snap
                .cards
                .get(index)
                .is_some_and(|c| c.state == CardState::Matched);
            let selected = hud.cursor == Some(index);
            self.draw_card(fb, &layout, index, canvas.tile(index), matched, selected);
        }

        self.draw_side_panel(fb, snap, hud, viewport, &layout);
        self.draw_help(fb, viewport, &layout);
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(
        &self,
        canvas: &TileCanvas,
        snap: &GameSnapshot,
        hud: &HudView,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(canvas, snap, hud, viewport, &mut fb);
        fb
    }

    fn draw_message(&self, fb: &mut FrameBuffer, layout: &BoardLayout, text: &str, won: bool) {
        let inner_w = layout.frame_w.saturating_sub(2);
        let text_w = (text.chars().count() as u16).min(inner_w);
        let x = layout.frame_x + 1 + (inner_w - text_w) / 2;
        let mut style = CellStyle::fg(Rgb::new(255, 255, 255)).bold();
        if won {
            style.fg = Rgb::new(120, 230, 120);
        }
        fb.put_str_max(x, layout.frame_y + 1, text, inner_w, style);
    }

    fn draw_card(
        &self,
        fb: &mut FrameBuffer,
        layout: &BoardLayout,
        index: usize,
        tile: Option<Tile>,
        matched: bool,
        selected: bool,
    ) {
        let (x, y) = self.card_origin(layout, index);
        let face_bg = Rgb::new(30, 30, 40);

        let (fill, label, fg) = match tile {
            Some(Tile::Face(kind)) => (' ', kind.as_str(), kind_color(kind)),
            Some(Tile::Back) => ('░', "", Rgb::new(90, 90, 110)),
            None => (' ', "", Rgb::new(60, 60, 60)),
        };

        let body = CellStyle::fg(fg).on(face_bg);
        fb.fill_rect(x + 1, y + 1, self.card_w - 2, self.card_h - 2, fill, body);

        let mut edge = if matched {
            CellStyle::fg(Rgb::new(120, 230, 120)).dim()
        } else {
            CellStyle::fg(Rgb::new(150, 150, 160))
        };
        if selected {
            edge = CellStyle::fg(Rgb::new(250, 220, 80)).bold();
        }
        fb.draw_box(x, y, self.card_w, self.card_h, edge);

        if !label.is_empty() {
            let inner_w = self.card_w - 2;
            let label_w = (label.chars().count() as u16).min(inner_w);
            let lx = x + 1 + (inner_w - label_w) / 2;
            let ly = y + self.card_h / 2;
            let mut style = body.bold();
            if matched {
                style = style.dim();
            }
            fb.put_str_max(lx, ly, label, inner_w, style);
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        hud: &HudView,
        viewport: Viewport,
        layout: &BoardLayout,
    ) {
        let panel_x = layout
            .frame_x
            .saturating_add(layout.frame_w)
            .saturating_add(2);
        if panel_x >= viewport.width {
            return;
        }
        let panel_w = viewport.width - panel_x;
        if panel_w < 12 {
            return;
        }

        let label = CellStyle::fg(Rgb::new(220, 220, 220)).bold();
        let value = CellStyle::fg(Rgb::new(200, 200, 200));

        let mut y = layout.frame_y;
        fb.put_str(panel_x, y, "PAIRS", label);
        y = y.saturating_add(1);
        fb.put_u32(panel_x, y, snap.matched_pairs, value);
        let slash_x = panel_x + digits(snap.matched_pairs);
        fb.put_char(slash_x, y, '/', value);
        fb.put_u32(slash_x + 1, y, snap.pair_count, value);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "ATTEMPTS", label);
        y = y.saturating_add(1);
        fb.put_u32(panel_x, y, snap.attempts, value);
        y = y.saturating_add(2);

        // The seed determines every layout of the session.
        fb.put_str(panel_x, y, "SEED", label);
        y = y.saturating_add(1);
        if snap.won {
            fb.put_u64(panel_x, y, snap.seed, value);
        } else {
            fb.put_str(panel_x, y, "-", value);
        }
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "LAST", label);
        y = y.saturating_add(1);
        let last = hud.last_event.map(|e| e.as_str()).unwrap_or("-");
        fb.put_str(panel_x, y, last, value);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "AI", label);
        y = y.saturating_add(1);
        match hud.adapter {
            Some(st) if st.enabled => {
                fb.put_str(panel_x, y, "ON", value);
                y = y.saturating_add(1);
                fb.put_str(panel_x, y, "C", value);
                fb.put_u32(panel_x + 2, y, st.client_count as u32, value);
                y = y.saturating_add(1);
                fb.put_str(panel_x, y, "CTRL", value);
                if let Some(id) = st.controller_id {
                    fb.put_u32(panel_x + 5, y, id as u32, value);
                } else {
                    fb.put_str(panel_x + 5, y, "-", value);
                }
            }
            _ => fb.put_str(panel_x, y, "OFF", value),
        }
    }

    fn draw_help(&self, fb: &mut FrameBuffer, viewport: Viewport, layout: &BoardLayout) {
        let y = layout.frame_y.saturating_add(layout.frame_h);
        if y >= viewport.height {
            return;
        }
        let style = CellStyle::fg(Rgb::new(140, 140, 140)).dim();
        fb.put_str(
            layout.frame_x,
            y,
            "arrows move  enter reveal  r restart  q quit",
            style,
        );
    }
}

fn kind_color(kind: CardKind) -> Rgb {
    match kind {
        CardKind::EightBall => Rgb::new(200, 200, 220),
        CardKind::Potato => Rgb::new(210, 170, 110),
        CardKind::Dinosaur => Rgb::new(100, 220, 120),
        CardKind::Kronos => Rgb::new(200, 120, 220),
        CardKind::Rocket => Rgb::new(220, 80, 80),
        CardKind::Unicorn => Rgb::new(240, 150, 200),
        CardKind::Guy => Rgb::new(80, 180, 240),
        CardKind::Zeppelin => Rgb::new(240, 220, 80),
    }
}

fn digits(mut v: u32) -> u16 {
    let mut n = 1;
    while v >= 10 {
        v /= 10;
        n += 1;
    }
    n
}
