use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::Frame;

use crate::canvas::DrawCommand;
use crate::config::{Palette, Rgb};
use crate::context::Sprite;
use crate::geometry::PixelRect;
use crate::input::Direction;
use crate::snake::{Corner, SegmentTile};
use crate::ui::hud::{render_title_bar, split_title_bar, TitleInfo};

/// Terminal columns per game cell. Each cell is one row tall.
pub const COLUMNS_PER_CELL: u16 = 2;

const GLYPH_APPLE: &str = "● ";
const GLYPH_CROWN: &str = "♛ ";
const GLYPH_HEAD_UP: &str = "▲▲";
const GLYPH_HEAD_DOWN: &str = "▼▼";
const GLYPH_HEAD_LEFT: &str = "◀◀";
const GLYPH_HEAD_RIGHT: &str = "▶▶";
const GLYPH_HEAD_STOPPED: &str = "██";
const GLYPH_TAIL: &str = "▓▓";
const GLYPH_HORIZONTAL: &str = "══";
const GLYPH_VERTICAL: &str = "║ ";
const GLYPH_LEFT_DOWN: &str = "╗ ";
const GLYPH_UP_LEFT: &str = "╝ ";
const GLYPH_RIGHT_UP: &str = "╚═";
const GLYPH_DOWN_RIGHT: &str = "╔═";

/// Everything one terminal frame shows.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    /// Display list presented by the engine's last redraw.
    pub commands: &'a [DrawCommand],
    pub cell_size: f32,
    pub palette: &'a Palette,
    pub score: u32,
    pub best_score: Option<u32>,
    pub full_screen: bool,
}

/// Renders the title bar (unless full-screen) and the presented board.
pub fn render(frame: &mut Frame<'_>, view: &FrameView<'_>) {
    let area = frame.area();
    let board = if view.full_screen {
        area
    } else {
        let (title_bar, board) = split_title_bar(area);
        render_title_bar(
            frame,
            title_bar,
            &TitleInfo {
                score: view.score,
                best_score: view.best_score,
                palette: view.palette,
            },
        );
        board
    };

    paint_commands(
        frame.buffer_mut(),
        board,
        view.commands,
        view.cell_size,
        view.palette,
    );
}

/// Terminal area left for the board.
#[must_use]
pub fn board_area(area: Rect, full_screen: bool) -> Rect {
    if full_screen {
        area
    } else {
        split_title_bar(area).1
    }
}

/// Pixel size of a canvas that exactly covers `area` in whole cells.
#[must_use]
pub fn canvas_size(area: Rect, cell_size: u32) -> (u32, u32) {
    (
        u32::from(area.width / COLUMNS_PER_CELL) * cell_size,
        u32::from(area.height) * cell_size,
    )
}

/// Replays a display list onto the terminal cells of `area`.
pub fn paint_commands(
    buffer: &mut Buffer,
    area: Rect,
    commands: &[DrawCommand],
    cell_size: f32,
    palette: &Palette,
) {
    if cell_size <= 0.0 {
        return;
    }

    let grid = CellGrid { area, cell_size };
    for command in commands {
        match command {
            DrawCommand::Clear(color) => {
                for y in area.top()..area.bottom() {
                    for x in area.left()..area.right() {
                        if let Some(cell) = buffer.cell_mut((x, y)) {
                            cell.reset();
                            cell.set_bg(Color::from(*color));
                        }
                    }
                }
            }
            DrawCommand::FillRect { rect, color } => {
                let Some(cells) = grid.cover(*rect) else {
                    continue;
                };
                for y in cells.top()..cells.bottom() {
                    for x in cells.left()..cells.right() {
                        if let Some(cell) = buffer.cell_mut((x, y)) {
                            cell.set_bg(Color::from(*color));
                        }
                    }
                }
            }
            DrawCommand::Sprite {
                sprite,
                rect,
                opacity,
            } => paint_sprite(buffer, &grid, *sprite, *rect, *opacity, palette),
            DrawCommand::Text {
                text,
                origin,
                color,
                ..
            } => {
                let Some((x, y)) = grid.position(origin.0, origin.1) else {
                    continue;
                };
                let amount = f32::from(color.alpha) / f32::from(u8::MAX);
                let fg = blend(color.rgb, background_at(buffer, x, y), amount);
                let max_width = usize::from(area.right().saturating_sub(x));
                let style = Style::new().fg(Color::from(fg));
                buffer.set_stringn(x, y, text, max_width, style);
            }
        }
    }
}

/// Maps canvas pixels onto terminal cells.
#[derive(Debug, Clone, Copy)]
struct CellGrid {
    area: Rect,
    cell_size: f32,
}

impl CellGrid {
    fn column_width(self) -> f32 {
        self.cell_size / f32::from(COLUMNS_PER_CELL)
    }

    /// Terminal cell holding the pixel, `None` outside the area.
    fn position(self, x: f32, y: f32) -> Option<(u16, u16)> {
        let column = (x / self.column_width()).floor();
        let row = (y / self.cell_size).floor();
        self.offset(column, row)
    }

    /// Top-left terminal cell of the game cell whose center lies in `rect`.
    fn sprite_position(self, rect: PixelRect) -> Option<(u16, u16)> {
        let center_x = rect.x as f32 + rect.width as f32 / 2.0;
        let center_y = rect.y as f32 + rect.height as f32 / 2.0;
        let column = (center_x / self.cell_size).floor() * f32::from(COLUMNS_PER_CELL);
        let row = (center_y / self.cell_size).floor();
        self.offset(column, row)
    }

    /// Terminal cells touched by a pixel rectangle, clipped to the area.
    fn cover(self, rect: PixelRect) -> Option<Rect> {
        let left = (rect.x as f32 / self.column_width()).floor().max(0.0);
        let top = (rect.y as f32 / self.cell_size).floor().max(0.0);
        let right = (rect.right() as f32 / self.column_width())
            .ceil()
            .min(f32::from(self.area.width));
        let bottom = (rect.bottom() as f32 / self.cell_size)
            .ceil()
            .min(f32::from(self.area.height));

        if right <= left || bottom <= top {
            return None;
        }

        Some(Rect::new(
            self.area.x + left as u16,
            self.area.y + top as u16,
            (right - left) as u16,
            (bottom - top) as u16,
        ))
    }

    fn offset(self, column: f32, row: f32) -> Option<(u16, u16)> {
        if column < 0.0
            || row < 0.0
            || column >= f32::from(self.area.width)
            || row >= f32::from(self.area.height)
        {
            return None;
        }

        Some((self.area.x + column as u16, self.area.y + row as u16))
    }
}

fn paint_sprite(
    buffer: &mut Buffer,
    grid: &CellGrid,
    sprite: Sprite,
    rect: PixelRect,
    opacity: f32,
    palette: &Palette,
) {
    let Some((x, y)) = grid.sprite_position(rect) else {
        return;
    };

    let (glyph, color) = match sprite {
        Sprite::Apple => (GLYPH_APPLE, palette.apple),
        Sprite::Crown => (GLYPH_CROWN, palette.crown),
        Sprite::Snake(tile) => (tile_glyph(tile), tile_color(tile, palette)),
    };

    let fg = blend(color, background_at(buffer, x, y), opacity);
    let mut style = Style::new().fg(Color::from(fg));
    if matches!(sprite, Sprite::Snake(SegmentTile::Head(_))) {
        style = style.add_modifier(Modifier::BOLD);
    }

    let max_width = usize::from(grid.area.right().saturating_sub(x));
    buffer.set_stringn(x, y, glyph, max_width, style);
}

fn tile_glyph(tile: SegmentTile) -> &'static str {
    match tile {
        SegmentTile::Head(Direction::Up) => GLYPH_HEAD_UP,
        SegmentTile::Head(Direction::Down) => GLYPH_HEAD_DOWN,
        SegmentTile::Head(Direction::Left) => GLYPH_HEAD_LEFT,
        SegmentTile::Head(Direction::Right) => GLYPH_HEAD_RIGHT,
        SegmentTile::Head(Direction::Stopped) => GLYPH_HEAD_STOPPED,
        SegmentTile::Tail(_) => GLYPH_TAIL,
        SegmentTile::Horizontal => GLYPH_HORIZONTAL,
        SegmentTile::Vertical => GLYPH_VERTICAL,
        SegmentTile::Corner(Corner::LeftDown) => GLYPH_LEFT_DOWN,
        SegmentTile::Corner(Corner::UpLeft) => GLYPH_UP_LEFT,
        SegmentTile::Corner(Corner::RightUp) => GLYPH_RIGHT_UP,
        SegmentTile::Corner(Corner::DownRight) => GLYPH_DOWN_RIGHT,
    }
}

fn tile_color(tile: SegmentTile, palette: &Palette) -> Rgb {
    match tile {
        SegmentTile::Head(_) => palette.snake_head,
        SegmentTile::Tail(_) => palette.snake_tail,
        _ => palette.snake_body,
    }
}

fn background_at(buffer: &Buffer, x: u16, y: u16) -> Rgb {
    match buffer.cell((x, y)).map(|cell| cell.bg) {
        Some(Color::Rgb(r, g, b)) => Rgb::new(r, g, b),
        _ => Rgb::new(0, 0, 0),
    }
}

/// Mixes `fg` over `bg`; `amount` 0 keeps `bg`, 1 gives `fg`.
fn blend(fg: Rgb, bg: Rgb, amount: f32) -> Rgb {
    let amount = amount.clamp(0.0, 1.0);
    let channel = |fg: u8, bg: u8| {
        let (fg, bg) = (f32::from(fg), f32::from(bg));
        (bg + (fg - bg) * amount).round() as u8
    };

    Rgb::new(channel(fg.r, bg.r), channel(fg.g, bg.g), channel(fg.b, bg.b))
}
