use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde::Deserialize;

/// Snake heading. `Stopped` is a valid, non-moving value.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Stopped,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns the opposite direction. `Stopped` has no opposite.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Stopped => Self::Stopped,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Unit step of this heading in screen coordinates (y grows downwards).
    #[must_use]
    pub fn delta(self) -> (f32, f32) {
        match self {
            Self::Stopped => (0.0, 0.0),
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
        }
    }
}

/// Returns whether `next` may replace a heading whose last executed tick
/// moved in `previous` (no immediate 180° turns).
#[must_use]
pub fn direction_change_is_valid(previous: Direction, next: Direction) -> bool {
    next == Direction::Stopped || next != previous.opposite()
}

/// High-level commands consumed by the host loop.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameInput {
    Direction(Direction),
    /// Resume a paused game or restart after death.
    Confirm,
    Pause,
    ToggleFullScreen,
    Resize { columns: u16, rows: u16 },
    FocusLost,
    Quit,
}

/// Translates one key press into a game command.
#[must_use]
pub fn map_key(key: KeyEvent) -> Option<GameInput> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(GameInput::Quit);
    }

    let input = match key.code {
        KeyCode::Up | KeyCode::Char('w' | 'W') => GameInput::Direction(Direction::Up),
        KeyCode::Down | KeyCode::Char('s' | 'S') => GameInput::Direction(Direction::Down),
        KeyCode::Left | KeyCode::Char('a' | 'A') => GameInput::Direction(Direction::Left),
        KeyCode::Right | KeyCode::Char('d' | 'D') => GameInput::Direction(Direction::Right),
        KeyCode::Char(' ') | KeyCode::Enter => GameInput::Confirm,
        KeyCode::Char('p' | 'P') | KeyCode::Esc => GameInput::Pause,
        KeyCode::F(11) | KeyCode::Char('f' | 'F') => GameInput::ToggleFullScreen,
        KeyCode::Char('q' | 'Q') => GameInput::Quit,
        _ => return None,
    };

    Some(input)
}

/// Polls crossterm for keyboard, resize, and focus events.
#[derive(Debug, Default)]
pub struct InputHandler;

impl InputHandler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Waits up to `timeout` for the next relevant terminal event.
    pub fn poll_input(&mut self, timeout: Duration) -> io::Result<Option<GameInput>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }

        let input = match event::read()? {
            Event::Key(key) => map_key(key),
            Event::Resize(columns, rows) => Some(GameInput::Resize { columns, rows }),
            Event::FocusLost => Some(GameInput::FocusLost),
            _ => None,
        };

        Ok(input)
    }
}
