use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ratatui::style::Color;
use serde::Deserialize;

use crate::error::{ConfigError, GameError};
use crate::input::Direction;

const APP_DIR_NAME: &str = "arcade-snake";
const CONFIG_FILE_NAME: &str = "config.json";

/// Smallest accepted cell size in pixels.
pub const MIN_CELL_SIZE: u32 = 16;

/// Largest accepted cell size in pixels.
pub const MAX_CELL_SIZE: u32 = 64;

/// Cell size used when nothing else is configured.
pub const DEFAULT_CELL_SIZE: u32 = 32;

/// Tick interval set by every `init_game`.
pub const BASE_TICK_INTERVAL_MS: u64 = 100;

/// Each emptied apple batch shortens the tick interval by `interval / SPEEDUP_DIVISOR`.
pub const SPEEDUP_DIVISOR: u64 = 80;

/// Default frame count of a scripted sequence.
pub const ANIMATION_FRAMES: u32 = 10;

/// Default delay between two frames of a scripted sequence.
pub const ANIMATION_INTERVAL: Duration = Duration::from_millis(100);

/// Opaque 24-bit color, written as `#rrggbb` in config files.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub const fn with_alpha(self, alpha: u8) -> Rgba {
        Rgba { rgb: self, alpha }
    }

    pub const WHITE: Self = Self::new(255, 255, 255);
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_hex_color(&value).ok_or(ConfigError::InvalidColor(value))
    }
}

impl From<Rgb> for Color {
    fn from(value: Rgb) -> Self {
        Color::Rgb(value.r, value.g, value.b)
    }
}

/// Color plus alpha, used for fading text.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Rgba {
    pub rgb: Rgb,
    pub alpha: u8,
}

fn parse_hex_color(value: &str) -> Option<Rgb> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let red = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let green = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let blue = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some(Rgb::new(red, green, blue))
}

/// Sprite colors used by the terminal renderer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub apple: Rgb,
    pub crown: Rgb,
    pub snake_head: Rgb,
    pub snake_body: Rgb,
    pub snake_tail: Rgb,
    pub title_bar: Rgb,
    pub title_text: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            apple: Rgb::new(231, 71, 29),
            crown: Rgb::new(244, 195, 48),
            snake_head: Rgb::new(40, 80, 180),
            snake_body: Rgb::new(71, 117, 235),
            snake_tail: Rgb::new(56, 96, 200),
            title_bar: Rgb::new(74, 117, 44),
            title_text: Rgb::WHITE,
        }
    }
}

/// Everything the host injects into the engine: texts, fonts, colors, and
/// gameplay knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub start_text: Vec<String>,
    pub resume_text: Vec<String>,
    pub restart_text: Vec<String>,
    pub primary_font: String,
    pub secondary_font: String,
    pub primary_grid_color: Rgb,
    pub secondary_grid_color: Rgb,
    pub snake_start_segments: u32,
    pub snake_start_direction: Direction,
    /// Head cell `[column, row]` used by `init_game`.
    pub snake_start_cell: [u32; 2],
    pub add_apple_count: u32,
    pub auto_increase_speed: bool,
    pub cell_size: u32,
    pub palette: Palette,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_text: vec!["Press an arrow key".to_owned(), "to start moving".to_owned()],
            resume_text: vec!["Press space to resume".to_owned()],
            restart_text: vec!["Game over".to_owned(), "Press space to play again".to_owned()],
            primary_font: "Open Sans Semibold".to_owned(),
            secondary_font: "Open Sans".to_owned(),
            primary_grid_color: Rgb::new(162, 209, 73),
            secondary_grid_color: Rgb::new(170, 215, 81),
            snake_start_segments: 5,
            snake_start_direction: Direction::Right,
            snake_start_cell: [5, 7],
            add_apple_count: 1,
            auto_increase_speed: true,
            cell_size: DEFAULT_CELL_SIZE,
            palette: Palette::default(),
        }
    }
}

impl GameConfig {
    /// Reads a JSON config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(path, &raw)
    }

    /// Loads the per-user config file, or defaults when it does not exist yet.
    pub fn load_default() -> Result<Self, ConfigError> {
        let Some(path) = default_config_path() else {
            return Ok(Self::default());
        };

        match fs::read_to_string(&path) {
            Ok(raw) => Self::from_json(&path, &raw),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    fn from_json(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks the values `init_game` depends on.
    pub fn validate(&self, cell_size: u32) -> Result<(), GameError> {
        if !(MIN_CELL_SIZE..=MAX_CELL_SIZE).contains(&cell_size) {
            return Err(GameError::InvalidCellSize { size: cell_size });
        }
        if self.snake_start_direction == Direction::Stopped {
            return Err(GameError::InvalidStartDirection);
        }
        if self.snake_start_segments == 0 {
            return Err(GameError::InvalidStartSegments);
        }
        Ok(())
    }
}

/// Returns the platform-correct config file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}
