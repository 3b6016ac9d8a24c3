use std::fs::File;
use std::panic;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use arcade_snake::canvas::Canvas;
use arcade_snake::config::GameConfig;
use arcade_snake::error::GameError;
use arcade_snake::game::Game;
use arcade_snake::input::{GameInput, InputHandler};
use arcade_snake::renderer::{self, board_area, canvas_size, FrameView};
use arcade_snake::terminal_runtime::{restore_terminal, TerminalSession};
use clap::Parser;
use log::{debug, info};
use ratatui::layout::Rect;
use simplelog::{LevelFilter, WriteLogger};

const POLL_TIMEOUT: Duration = Duration::from_millis(16);

/// Longest stretch of wall-clock time fed to the engine in one step, so a
/// stalled terminal does not replay a burst of ticks.
const MAX_FRAME_STEP: Duration = Duration::from_millis(250);

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSON config file. Defaults to `<config dir>/arcade-snake/config.json`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pixel size of one board cell (16-64).
    #[arg(long = "cell-size")]
    cell_size: Option<u32>,

    /// Seed for reproducible apple placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Hide the title bar and draw the score on the board.
    #[arg(long = "full-screen")]
    full_screen: bool,

    /// Write debug logs to this file.
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::load_default()?,
    };
    let cell_size = cli.cell_size.unwrap_or(config.cell_size);
    config.validate(cell_size)?;

    install_panic_hook();
    run(&cli, config, cell_size)
}

fn run(cli: &Cli, config: GameConfig, cell_size: u32) -> anyhow::Result<()> {
    let mut session = TerminalSession::enter().context("failed to set up the terminal")?;
    let palette = config.palette.clone();

    let (width, height) = canvas_size(board_area(session.area()?, cli.full_screen), cell_size);
    let canvas = Canvas::new(width, height)
        .with_text_metrics(cell_size as f32 / 2.0, cell_size as f32);
    let mut game = match cli.seed {
        Some(seed) => Game::new_with_seed(canvas, config, seed),
        None => Game::new(canvas, config),
    };

    game.set_full_screen(cli.full_screen);
    game.init_game(cell_size)?;
    game.start_game(true);
    info!("started on a {width}x{height} board");

    let mut input = InputHandler::new();
    let mut pending_resize = PendingResize::default();
    let mut last_frame = Instant::now();

    loop {
        session.terminal_mut().draw(|frame| {
            renderer::render(
                frame,
                &FrameView {
                    commands: game.context().presented(),
                    cell_size: game.cell_size(),
                    palette: &palette,
                    score: game.score(),
                    best_score: game.best_score(),
                    full_screen: game.is_full_screen(),
                },
            );
        })?;

        if let Some(game_input) = input.poll_input(POLL_TIMEOUT)? {
            match game_input {
                GameInput::Quit => {
                    info!("quit with best score {:?}", game.best_score());
                    break;
                }
                GameInput::Resize { columns, rows } => {
                    pending_resize.request(Rect::new(0, 0, columns, rows));
                }
                GameInput::ToggleFullScreen => {
                    let full_screen = !game.is_full_screen();
                    game.set_full_screen(full_screen);
                    pending_resize.request(session.area()?);
                }
                other => handle_input(&mut game, other, cell_size)?,
            }
        }

        if let Some(area) = pending_resize.take_ready(game.is_input_locked()) {
            resize_board(&mut game, area, cell_size);
        }

        let now = Instant::now();
        game.advance(now.duration_since(last_frame).min(MAX_FRAME_STEP));
        last_frame = now;

        for event in game.drain_events() {
            debug!("{event:?}");
        }
    }

    Ok(())
}

fn handle_input(
    game: &mut Game<Canvas>,
    input: GameInput,
    cell_size: u32,
) -> Result<(), GameError> {
    match input {
        GameInput::Direction(direction) => game.set_direction(direction),
        GameInput::Confirm if game.is_dead() => game.restart_game(cell_size)?,
        GameInput::Confirm => game.resume_game(),
        GameInput::Pause | GameInput::FocusLost => game.stop_game(true),
        GameInput::ToggleFullScreen | GameInput::Resize { .. } | GameInput::Quit => {}
    }

    Ok(())
}

/// Latest terminal area not yet applied to the board.
///
/// The engine ignores resizes while input is locked, so the area is held
/// until the lock is released.
#[derive(Debug, Default)]
struct PendingResize {
    area: Option<Rect>,
}

impl PendingResize {
    fn request(&mut self, area: Rect) {
        self.area = Some(area);
    }

    fn take_ready(&mut self, input_locked: bool) -> Option<Rect> {
        if input_locked {
            return None;
        }
        self.area.take()
    }
}

fn resize_board(game: &mut Game<Canvas>, area: Rect, cell_size: u32) {
    let (width, height) = canvas_size(board_area(area, game.is_full_screen()), cell_size);
    game.context_mut().resize(width, height);
    game.resize(width, height);
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    WriteLogger::init(LevelFilter::Debug, simplelog::Config::default(), file)
        .context("failed to install the logger")?;
    Ok(())
}

fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        default_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use arcade_snake::canvas::Canvas;
    use arcade_snake::config::GameConfig;
    use arcade_snake::context::GameContext;
    use arcade_snake::game::{Game, GameState};
    use arcade_snake::input::Direction;
    use ratatui::layout::Rect;

    use super::{resize_board, PendingResize};

    #[test]
    fn pending_resize_keeps_the_latest_area() {
        let mut pending = PendingResize::default();
        assert_eq!(pending.take_ready(false), None);

        pending.request(Rect::new(0, 0, 40, 20));
        pending.request(Rect::new(0, 0, 60, 30));
        assert_eq!(pending.take_ready(true), None);
        assert_eq!(pending.take_ready(false), Some(Rect::new(0, 0, 60, 30)));
        assert_eq!(pending.take_ready(false), None);
    }

    #[test]
    fn resize_during_death_sequence_is_applied_afterwards() {
        let config = GameConfig {
            start_text: Vec::new(),
            snake_start_cell: [9, 1],
            snake_start_segments: 2,
            ..GameConfig::default()
        };
        let mut game = Game::new_with_seed(Canvas::new(320, 320), config, 42);
        game.set_full_screen(true);
        game.init_game(32).expect("valid cell size");
        game.start_game(true);
        game.set_direction(Direction::Right);
        game.advance(Duration::from_millis(100));
        assert!(game.is_input_locked());

        let mut pending = PendingResize::default();
        pending.request(Rect::new(0, 0, 20, 6));
        assert_eq!(pending.take_ready(game.is_input_locked()), None);

        game.advance(Duration::from_millis(1_000));
        let area = pending
            .take_ready(game.is_input_locked())
            .expect("lock released");
        resize_board(&mut game, area, 32);

        assert_eq!((game.context().width(), game.context().height()), (320, 192));
        assert_eq!(game.state(), GameState::Dead);
        assert!(game
            .context()
            .presented_text()
            .any(|line| line == "Press space to play again"));
    }
}
