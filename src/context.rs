use crate::config::{Rgb, Rgba};
use crate::geometry::PixelRect;
use crate::snake::SegmentTile;

/// Images the engine asks the display to draw.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Sprite {
    Apple,
    Crown,
    Snake(SegmentTile),
}

/// Font family and point size. The display decides how to honor it.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f32,
}

impl FontSpec {
    #[must_use]
    pub fn new(family: &str, size: f32) -> Self {
        Self {
            family: family.to_owned(),
            size,
        }
    }
}

/// Display collaborator the engine draws into.
///
/// Draw calls paint onto a persistent surface; `redraw` asks the host to
/// present it. Hosts may coalesce redraws.
pub trait GameContext {
    /// Play-area width in pixels.
    fn width(&self) -> u32;

    /// Play-area height in pixels.
    fn height(&self) -> u32;

    /// Play-area bounds used for text layout.
    fn client_area(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width() as i32, self.height() as i32)
    }

    /// Fills the whole surface with `color`, discarding earlier draws.
    fn clear(&mut self, color: Rgb);

    fn fill_rect(&mut self, rect: PixelRect, color: Rgb);

    fn draw_sprite(&mut self, sprite: Sprite, rect: PixelRect, opacity: f32);

    /// Draws one line of text with its top-left corner at `origin`.
    fn draw_text(&mut self, text: &str, font: &FontSpec, origin: (f32, f32), color: Rgba);

    /// Returns `(width, height)` of `text` rendered in `font`.
    fn measure_text(&self, text: &str, font: &FontSpec) -> (f32, f32);

    fn redraw(&mut self);
}

/// Paints the checkerboard background.
pub fn draw_grid<C: GameContext + ?Sized>(
    context: &mut C,
    primary: Rgb,
    secondary: Rgb,
    cell_size: f32,
) {
    context.clear(primary);

    if primary == secondary || cell_size <= 0.0 {
        return;
    }

    let width = context.width() as f32;
    let height = context.height() as f32;
    let size = cell_size.round() as i32;

    let mut column = 0u32;
    while (column as f32) * cell_size < width {
        let mut row = column % 2;
        while (row as f32) * cell_size < height {
            let rect = PixelRect::new(
                (column as f32 * cell_size) as i32,
                (row as f32 * cell_size) as i32,
                size,
                size,
            );
            context.fill_rect(rect, secondary);
            row += 2;
        }
        column += 1;
    }
}

/// Draws `lines` centered in the client area.
///
/// Multi-line blocks are shifted up by half their height. Per-line offsets
/// are added after centering; missing entries count as zero.
pub fn draw_text_lines<C: GameContext + ?Sized>(
    context: &mut C,
    lines: &[String],
    font: &FontSpec,
    color: Rgba,
    x_offsets: &[f32],
    y_offsets: &[f32],
) {
    let Some(first) = lines.first() else {
        return;
    };

    let bounds = context.client_area();
    let center = lines.len().div_ceil(2) as f32;
    let (_, line_height) = context.measure_text(first, font);

    for (index, line) in lines.iter().enumerate() {
        let (width, height) = context.measure_text(line, font);
        let x = (bounds.width as f32 - width) / 2.0;
        let y = (bounds.height as f32 - height) / 2.0;

        let mut origin = (x + 5.0, y + line_height * index as f32);
        if lines.len() > 1 {
            origin.1 -= line_height * center;
        }

        origin.0 += x_offsets.get(index).copied().unwrap_or(0.0);
        origin.1 += y_offsets.get(index).copied().unwrap_or(0.0);

        context.draw_text(line, font, origin, color);
    }
}
