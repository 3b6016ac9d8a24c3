use unicode_width::UnicodeWidthStr;

use crate::config::{Rgb, Rgba};
use crate::context::{FontSpec, GameContext, Sprite};
use crate::geometry::PixelRect;

/// One primitive draw call recorded by the [`Canvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rgb),
    FillRect {
        rect: PixelRect,
        color: Rgb,
    },
    Sprite {
        sprite: Sprite,
        rect: PixelRect,
        opacity: f32,
    },
    Text {
        text: String,
        font: FontSpec,
        origin: (f32, f32),
        color: Rgba,
    },
}

/// Display-list surface implementing [`GameContext`].
///
/// Draw calls accumulate in a pending list (a `Clear` starts a new one);
/// `redraw` publishes a copy as the presented frame. Text is measured as a
/// monospace grid of `column_width` x `line_height` pixels per character.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    column_width: f32,
    line_height: f32,
    pending: Vec<DrawCommand>,
    presented: Vec<DrawCommand>,
    redraw_count: u64,
}

impl Canvas {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            column_width: 8.0,
            line_height: 16.0,
            pending: Vec::new(),
            presented: Vec::new(),
            redraw_count: 0,
        }
    }

    #[must_use]
    pub fn with_text_metrics(mut self, column_width: f32, line_height: f32) -> Self {
        self.column_width = column_width;
        self.line_height = line_height;
        self
    }

    /// Updates the play-area size. The engine's `resize` must follow.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Draw calls since the last clear.
    #[must_use]
    pub fn pending(&self) -> &[DrawCommand] {
        &self.pending
    }

    /// The frame published by the latest `redraw`.
    #[must_use]
    pub fn presented(&self) -> &[DrawCommand] {
        &self.presented
    }

    #[must_use]
    pub fn redraw_count(&self) -> u64 {
        self.redraw_count
    }

    /// Text strings of the presented frame, in draw order.
    pub fn presented_text(&self) -> impl Iterator<Item = &str> {
        self.presented.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl GameContext for Canvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Rgb) {
        self.pending.clear();
        self.pending.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgb) {
        self.pending.push(DrawCommand::FillRect { rect, color });
    }

    fn draw_sprite(&mut self, sprite: Sprite, rect: PixelRect, opacity: f32) {
        self.pending.push(DrawCommand::Sprite {
            sprite,
            rect,
            opacity: opacity.clamp(0.0, 1.0),
        });
    }

    fn draw_text(&mut self, text: &str, font: &FontSpec, origin: (f32, f32), color: Rgba) {
        self.pending.push(DrawCommand::Text {
            text: text.to_owned(),
            font: font.clone(),
            origin,
            color,
        });
    }

    fn measure_text(&self, text: &str, _font: &FontSpec) -> (f32, f32) {
        (text.width() as f32 * self.column_width, self.line_height)
    }

    fn redraw(&mut self) {
        self.presented.clone_from(&self.pending);
        self.redraw_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::{Canvas, DrawCommand};
    use crate::config::Rgb;
    use crate::context::{FontSpec, GameContext, Sprite};
    use crate::geometry::PixelRect;

    #[test]
    fn clear_starts_a_new_display_list() {
        let mut canvas = Canvas::new(64, 64);
        canvas.fill_rect(PixelRect::new(0, 0, 32, 32), Rgb::WHITE);
        canvas.clear(Rgb::new(1, 2, 3));
        canvas.draw_sprite(Sprite::Apple, PixelRect::new(32, 0, 32, 32), 1.5);

        assert_eq!(
            canvas.pending(),
            &[
                DrawCommand::Clear(Rgb::new(1, 2, 3)),
                DrawCommand::Sprite {
                    sprite: Sprite::Apple,
                    rect: PixelRect::new(32, 0, 32, 32),
                    opacity: 1.0,
                },
            ]
        );
    }

    #[test]
    fn redraw_publishes_pending_frame() {
        let mut canvas = Canvas::new(64, 64);
        canvas.clear(Rgb::WHITE);
        assert!(canvas.presented().is_empty());

        canvas.redraw();
        assert_eq!(canvas.presented(), &[DrawCommand::Clear(Rgb::WHITE)]);
        assert_eq!(canvas.redraw_count(), 1);
    }

    #[test]
    fn measures_text_by_display_width() {
        let canvas = Canvas::new(64, 64).with_text_metrics(16.0, 32.0);
        let font = FontSpec::new("any", 14.0);

        assert_eq!(canvas.measure_text("42", &font), (32.0, 32.0));
        assert_eq!(canvas.measure_text("", &font), (0.0, 32.0));
    }
}
