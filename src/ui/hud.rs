use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::config::Palette;

/// Rows taken by the title bar outside full-screen mode.
pub const TITLE_BAR_HEIGHT: u16 = 1;

const GLYPH_APPLE: &str = "●";
const GLYPH_CROWN: &str = "♛";

/// Values shown in the title bar.
#[derive(Debug, Clone, Copy)]
pub struct TitleInfo<'a> {
    pub score: u32,
    /// `None` until the first round ends.
    pub best_score: Option<u32>,
    pub palette: &'a Palette,
}

/// Splits `area` into `(title_bar, play_area)`.
#[must_use]
pub fn split_title_bar(area: Rect) -> (Rect, Rect) {
    let [title_bar, play_area] =
        Layout::vertical([Constraint::Length(TITLE_BAR_HEIGHT), Constraint::Min(0)]).areas(area);
    (title_bar, play_area)
}

/// Renders score and best score on a colored band.
pub fn render_title_bar(frame: &mut Frame<'_>, area: Rect, info: &TitleInfo<'_>) {
    let palette = info.palette;
    let band = Style::default()
        .bg(Color::from(palette.title_bar))
        .fg(Color::from(palette.title_text));

    frame.render_widget(Paragraph::new(title_line(info)).style(band), area);
}

fn title_line(info: &TitleInfo<'_>) -> Line<'static> {
    let value_style = Style::new().add_modifier(Modifier::BOLD);
    let mut spans = vec![
        Span::raw(" "),
        Span::styled(GLYPH_APPLE, Style::new().fg(Color::from(info.palette.apple))),
        Span::raw(" "),
        Span::styled(info.score.to_string(), value_style),
    ];

    if let Some(best) = info.best_score {
        spans.extend([
            Span::raw("   "),
            Span::styled(GLYPH_CROWN, Style::new().fg(Color::from(info.palette.crown))),
            Span::raw(" "),
            Span::styled(best.to_string(), value_style),
        ]);
    }

    Line::from(spans)
}
