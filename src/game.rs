use std::time::Duration;

use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::animator::{Animator, Firing, TimerId};
use crate::config::{
    GameConfig, Rgb, ANIMATION_FRAMES, ANIMATION_INTERVAL, BASE_TICK_INTERVAL_MS, SPEEDUP_DIVISOR,
};
use crate::context::{draw_grid, draw_text_lines, FontSpec, GameContext, Sprite};
use crate::error::GameError;
use crate::food::{place_apple, ApplePulse};
use crate::geometry::{BoardSize, GridObject};
use crate::input::{direction_change_is_valid, Direction};
use crate::snake::{Snake, SnakeMoved};
use crate::timer::Timer;

const OVERLAY_ALPHA: u8 = 200;
const OVERLAY_DIMMED_ALPHA: u8 = 100;
const OVERLAY_DIMMED_OPACITY: f32 = 0.3;
const ALPHA_STEP: u8 = 20;
const START_FONT_SIZE: f32 = 20.0;
const PROMPT_FONT_SIZE: f32 = 30.0;
const SCORE_FONT_SIZE: f32 = 14.0;
const SCORE_MARGIN_Y: f32 = 5.0;
const SCORE_TEXT_WIDTH: f32 = 60.0;

/// Notification queued for the host after the matching state change.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameEvent {
    ScoreChanged,
    BestScoreChanged,
    GameStarted,
    GameStopped,
    SnakeDead,
}

/// High-level engine state, derived from the engine flags.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameState {
    /// Constructed, `init_game` not called yet.
    Idle,
    /// Initialized and waiting to be started.
    Ready,
    /// Tick loop active.
    Playing,
    /// Stopped mid-game; `resume_game` continues.
    Paused,
    /// Snake collided; `restart_game` begins a new round.
    Dead,
}

/// Scripted sequences and loops scheduled on the animator.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Sequence {
    /// Board and start text fade in before the first tick loop.
    IntroFadeIn,
    /// Waits for the first heading while the tick loop idles.
    AwaitFirstMove { intro: bool },
    /// Start text fades out on top of running ticks.
    IntroFadeOut,
    /// Board fades back in while the resume prompt fades out.
    ResumeFadeIn,
    /// Board fades out and the restart prompt fades in.
    DeathFadeOut,
}

/// Text painted on top of every tick while the intro prompt fades out.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct TextOverlay {
    alpha: u8,
}

/// The snake game: state machine, scoring, speed, and drawing orchestration.
///
/// Time only moves through [`Game::advance`]; the host calls it from its
/// event loop with the wall-clock time elapsed since the previous call.
pub struct Game<C: GameContext> {
    config: GameConfig,
    context: C,
    snake: Snake,
    apples: Vec<GridObject>,
    cell_size: f32,
    score: u32,
    best_score: Option<u32>,
    tick_timer: Timer,
    speed_ms: u64,
    initialized: bool,
    dead: bool,
    paused: bool,
    input_locked: bool,
    full_screen: bool,
    previous_direction: Direction,
    grow_pending: bool,
    pulse: ApplePulse,
    overlay: Option<TextOverlay>,
    animator: Animator<Sequence>,
    events: Vec<GameEvent>,
    rng: StdRng,
    clock: Duration,
}

impl<C: GameContext> Game<C> {
    /// Creates an idle engine drawing into `context`.
    #[must_use]
    pub fn new(context: C, config: GameConfig) -> Self {
        Self::with_rng(context, config, StdRng::from_entropy())
    }

    /// Creates a deterministic engine for tests and reproducible runs.
    #[must_use]
    pub fn new_with_seed(context: C, config: GameConfig, seed: u64) -> Self {
        Self::with_rng(context, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(context: C, config: GameConfig, rng: StdRng) -> Self {
        Self {
            config,
            context,
            snake: Snake::new(),
            apples: Vec::new(),
            cell_size: 0.0,
            score: 0,
            best_score: None,
            tick_timer: Timer::new(Duration::from_millis(BASE_TICK_INTERVAL_MS)),
            speed_ms: BASE_TICK_INTERVAL_MS,
            initialized: false,
            dead: false,
            paused: false,
            input_locked: false,
            full_screen: false,
            previous_direction: Direction::Stopped,
            grow_pending: false,
            pulse: ApplePulse::default(),
            overlay: None,
            animator: Animator::new(),
            events: Vec::new(),
            rng,
            clock: Duration::ZERO,
        }
    }

    /// Resets score, snake, apples, and speed for a new round.
    ///
    /// Fails without touching any state when `cell_size` is outside 16..=64
    /// or the configured snake start is unusable.
    pub fn init_game(&mut self, cell_size: u32) -> Result<(), GameError> {
        self.config.validate(cell_size)?;

        self.speed_ms = BASE_TICK_INTERVAL_MS;
        self.tick_timer.set_interval(Duration::from_millis(self.speed_ms));
        self.cell_size = cell_size as f32;
        self.score = 0;
        self.emit(GameEvent::ScoreChanged);

        let [column, row] = self.config.snake_start_cell;
        let head = GridObject::square(
            column as f32 * self.cell_size,
            row as f32 * self.cell_size,
            self.cell_size,
        );
        let direction = self.config.snake_start_direction;
        self.snake.init(head, self.config.snake_start_segments, direction);
        self.previous_direction = direction;
        self.snake.set_direction(Direction::Stopped);

        self.grow_pending = false;
        self.overlay = None;
        self.paused = false;
        self.initialized = true;

        self.remove_apples();
        self.add_apples(self.config.add_apple_count);

        debug!("game initialized with cell size {cell_size}");
        Ok(())
    }

    /// Starts the tick loop, running the intro sequence first when this is the
    /// first round or the previous round ended in death.
    pub fn start_game(&mut self, first_time: bool) {
        if self.is_playing()
            || !self.initialized
            || self.animator.is_active(Sequence::IntroFadeIn)
        {
            trace!("start ignored");
            return;
        }

        let with_intro = (first_time || self.dead) && !self.config.start_text.is_empty();
        self.dead = false;

        if with_intro {
            debug!("running intro sequence");
            self.animator.do_animation(
                Sequence::IntroFadeIn,
                ANIMATION_FRAMES,
                ANIMATION_INTERVAL,
                self.clock,
            );
        } else {
            self.begin_playing(false);
        }

        self.dispatch_ready();
    }

    /// Fades the board back in and restarts the tick loop after a pause.
    pub fn resume_game(&mut self) {
        if self.is_playing()
            || self.dead
            || self.input_locked
            || !self.initialized
            || self.animator.is_active(Sequence::ResumeFadeIn)
        {
            trace!("resume ignored");
            return;
        }

        self.animator.do_animation(
            Sequence::ResumeFadeIn,
            ANIMATION_FRAMES,
            ANIMATION_INTERVAL,
            self.clock,
        );
        self.dispatch_ready();
    }

    /// Stops the tick loop. With `paused`, also halts the snake and draws the
    /// resume prompt.
    pub fn stop_game(&mut self, paused: bool) {
        if !self.is_playing() || self.input_locked {
            trace!("stop ignored");
            return;
        }

        self.tick_timer.stop();

        if paused {
            self.snake.set_direction(Direction::Stopped);
            self.paused = true;
            self.animator.stop();
            self.draw_prompt_screen();
        }

        debug!("game stopped (paused: {paused})");
        self.emit(GameEvent::GameStopped);
    }

    /// Starts a new round after the death sequence has finished.
    pub fn restart_game(&mut self, cell_size: u32) -> Result<(), GameError> {
        if self.is_playing() || !self.dead || self.input_locked {
            trace!("restart ignored");
            return Ok(());
        }

        self.input_locked = true;
        if let Err(error) = self.init_game(cell_size) {
            self.input_locked = false;
            return Err(error);
        }

        self.start_game(false);
        Ok(())
    }

    /// Changes the heading, rejecting reversals of the last executed tick.
    pub fn set_direction(&mut self, direction: Direction) {
        if !self.is_playing() || self.dead || self.input_locked {
            trace!("direction {direction:?} ignored");
            return;
        }

        if direction_change_is_valid(self.previous_direction, direction) {
            self.snake.set_direction(direction);
        }
    }

    /// Adapts to a new play-area size. The context must already report it.
    ///
    /// Pauses the game, respawns apples that no longer fit, and pulls the
    /// snake back onto the grid. Ignored while input is locked; the host
    /// replays the size once the lock is released.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.input_locked || !self.initialized {
            trace!("resize ignored");
            return;
        }

        self.stop_game(true);
        self.reposition_apples(BoardSize::new(width, height));

        let (width, height) = (width as f32, height as f32);
        if let Some(head) = self.snake.head() {
            if head.x + head.width > width {
                self.snake.translate(-(head.x - width / 2.0), 0.0);
            }
        }
        if let Some(head) = self.snake.head() {
            if head.y + head.height > height {
                self.snake.translate(0.0, -(head.y - height / 2.0));
            }
        }
        if let Some(head) = self.snake.head() {
            self.snake.translate(-(head.x % head.width), -(head.y % head.height));
        }

        self.animator.stop();
        if !self.dead {
            self.paused = true;
        }
        self.draw_prompt_screen();
        debug!("resized to {width}x{height}");
    }

    /// Moves the virtual clock forward, firing due timers in deadline order.
    ///
    /// The tick loop wins ties against animator timers.
    pub fn advance(&mut self, elapsed: Duration) {
        let target = self.clock + elapsed;

        loop {
            self.dispatch_ready();

            let tick_due = self.tick_timer.deadline().filter(|due| *due <= target);
            let animation_due = self.animator.next_deadline().filter(|due| *due <= target);

            match (tick_due, animation_due) {
                (None, None) => break,
                (Some(tick), Some(due)) if due < tick => self.fire_animation(due),
                (Some(tick), _) => self.fire_tick(tick),
                (None, Some(due)) => self.fire_animation(due),
            }
        }

        self.clock = target;
    }

    fn fire_tick(&mut self, due: Duration) {
        self.clock = due;
        self.tick_timer.fire();
        self.on_tick();
    }

    fn fire_animation(&mut self, due: Duration) {
        self.clock = due;
        if let Some(firing) = self.animator.fire_due(due) {
            self.handle_firing(firing);
        }
    }

    /// Takes every queued notification, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn state(&self) -> GameState {
        if !self.initialized {
            GameState::Idle
        } else if self.dead {
            GameState::Dead
        } else if self.is_playing() {
            GameState::Playing
        } else if self.paused {
            GameState::Paused
        } else {
            GameState::Ready
        }
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.tick_timer.is_enabled()
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn is_input_locked(&self) -> bool {
        self.input_locked
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Best finished score, `None` until the first round ends.
    #[must_use]
    pub fn best_score(&self) -> Option<u32> {
        self.best_score
    }

    /// Current tick interval in milliseconds.
    #[must_use]
    pub fn speed_ms(&self) -> u64 {
        self.speed_ms
    }

    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.snake.direction()
    }

    #[must_use]
    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    #[must_use]
    pub fn apples(&self) -> &[GridObject] {
        &self.apples
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    /// Toggles the in-board score overlay used when the host hides its own
    /// score display.
    pub fn set_full_screen(&mut self, full_screen: bool) {
        self.full_screen = full_screen;
    }

    #[must_use]
    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Time elapsed on the engine's virtual clock.
    #[must_use]
    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// Places up to `count` apples clear of the snake and of each other.
    ///
    /// Returns how many were placed, fewer than `count` when the board fills.
    pub fn add_apples(&mut self, count: u32) -> u32 {
        let bounds = self.bounds();
        let mut added = 0;
        for _ in 0..count {
            let Some(apple) =
                place_apple(&mut self.rng, bounds, self.cell_size, &self.snake, &self.apples)
            else {
                warn!("no free cell left for an apple ({added} of {count} placed)");
                break;
            };
            self.apples.push(apple);
            added += 1;
        }
        added
    }

    pub fn remove_apples(&mut self) {
        self.apples.clear();
        self.context.redraw();
    }

    fn bounds(&self) -> BoardSize {
        BoardSize::new(self.context.width(), self.context.height())
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn begin_playing(&mut self, intro: bool) {
        self.tick_timer.start(self.clock);
        self.paused = false;
        self.on_start();

        self.animator.create_timer(
            Sequence::AwaitFirstMove { intro },
            ANIMATION_INTERVAL,
            true,
            self.clock,
        );
    }

    fn on_start(&mut self) {
        debug!("game started");
        self.emit(GameEvent::GameStarted);
        self.input_locked = false;
    }

    fn dispatch_ready(&mut self) {
        while let Some(firing) = self.animator.take_ready() {
            self.handle_firing(firing);
        }
    }

    fn handle_firing(&mut self, firing: Firing<Sequence>) {
        match firing {
            Firing::Tick { id, tag } => self.sequence_tick(id, tag),
            Firing::Frame { tag, index, .. } => self.sequence_frame(tag, index),
            Firing::Complete { tag, cancelled, .. } => self.sequence_complete(tag, cancelled),
        }
    }

    fn sequence_tick(&mut self, id: TimerId, tag: Sequence) {
        let Sequence::AwaitFirstMove { intro } = tag else {
            return;
        };

        if self.snake.direction() != Direction::Stopped || !self.is_playing() {
            self.animator.disable(id);
            if intro {
                self.animator.do_animation(
                    Sequence::IntroFadeOut,
                    ANIMATION_FRAMES,
                    ANIMATION_INTERVAL,
                    self.clock,
                );
            }
            return;
        }

        self.draw_board(OVERLAY_ALPHA, 1.0);
        if intro {
            self.draw_start_text(OVERLAY_ALPHA);
        }
        self.context.redraw();
    }

    fn sequence_frame(&mut self, tag: Sequence, frame: u32) {
        let rising = fade_alpha(frame);
        let falling = OVERLAY_ALPHA.saturating_sub(rising);
        let opacity = frame as f32 / ANIMATION_FRAMES as f32;

        match tag {
            Sequence::IntroFadeIn => {
                self.draw_board(rising, opacity);
                self.draw_start_text(rising);
                self.context.redraw();
            }
            Sequence::IntroFadeOut => {
                self.overlay = Some(TextOverlay { alpha: falling });
            }
            Sequence::ResumeFadeIn => {
                self.draw_board(OVERLAY_ALPHA, opacity);
                let font = self.primary_font(PROMPT_FONT_SIZE);
                let color = Rgb::WHITE.with_alpha(falling);
                let lines = &self.config.resume_text;
                draw_text_lines(&mut self.context, lines, &font, color, &[], &[]);
                self.context.redraw();
            }
            Sequence::DeathFadeOut => {
                let fading = (ANIMATION_FRAMES.saturating_sub(1 + frame)) as f32
                    / ANIMATION_FRAMES as f32;
                self.draw_board(OVERLAY_ALPHA, fading);
                let font = self.primary_font(PROMPT_FONT_SIZE);
                let color = Rgb::WHITE.with_alpha(rising);
                let lines = &self.config.restart_text;
                draw_text_lines(&mut self.context, lines, &font, color, &[], &[]);
                self.context.redraw();
            }
            Sequence::AwaitFirstMove { .. } => {}
        }
    }

    fn sequence_complete(&mut self, tag: Sequence, cancelled: bool) {
        match tag {
            Sequence::IntroFadeIn if cancelled => {
                self.paused = true;
            }
            Sequence::IntroFadeIn => self.begin_playing(true),
            Sequence::IntroFadeOut => self.overlay = None,
            Sequence::ResumeFadeIn if cancelled => {}
            Sequence::ResumeFadeIn => self.start_game(false),
            Sequence::DeathFadeOut => {
                self.input_locked = false;
                debug!("death sequence finished, waiting for restart");
            }
            Sequence::AwaitFirstMove { .. } => {}
        }
    }

    fn on_tick(&mut self) {
        if self.snake.direction() == Direction::Stopped {
            return;
        }

        draw_grid(
            &mut self.context,
            self.config.primary_grid_color,
            self.config.secondary_grid_color,
            self.cell_size,
        );
        self.draw_apples(self.speed_ms, 1.0);

        let moved = self.snake.move_forward(self.grow_pending);
        self.grow_pending = false;
        if let Some(moved) = moved {
            self.handle_snake_moved(&moved);
        }

        if self.dead {
            return;
        }

        self.snake.draw(&mut self.context, 1.0);
        self.draw_score(OVERLAY_ALPHA, 1.0);
        if let Some(overlay) = self.overlay {
            self.draw_start_text(overlay.alpha);
        }

        self.context.redraw();
        self.previous_direction = self.snake.direction();
    }

    fn handle_snake_moved(&mut self, moved: &SnakeMoved) {
        let Some(head) = moved.head() else {
            return;
        };
        let head_rect = head.to_rect();

        let before = self.apples.len();
        self.apples.retain(|apple| !apple.to_rect().intersects(head_rect));
        let eaten = before - self.apples.len();
        for _ in 0..eaten {
            self.update_score();
        }

        if eaten > 0 && self.apples.is_empty() {
            let added = self.add_apples(self.config.add_apple_count);
            if added > 0 && self.config.auto_increase_speed {
                self.speed_ms -= self.speed_ms / SPEEDUP_DIVISOR;
                self.tick_timer.set_interval(Duration::from_millis(self.speed_ms));
            }
        }

        let outside = !self.bounds().contains(head);
        let bitten = moved.segments[1..]
            .iter()
            .any(|segment| head_rect.intersects(segment.to_rect()));

        if outside || bitten {
            self.on_dead();
        }
    }

    fn update_score(&mut self) {
        self.grow_pending = true;
        self.score += 1;
        self.emit(GameEvent::ScoreChanged);

        if let Some(best) = self.best_score {
            if self.score > best {
                self.best_score = Some(self.score);
                self.emit(GameEvent::BestScoreChanged);
            }
        }
    }

    fn on_dead(&mut self) {
        self.dead = true;
        self.tick_timer.stop();
        self.input_locked = true;
        self.snake.set_direction(Direction::Stopped);
        info!("snake died with score {}", self.score);
        self.emit(GameEvent::SnakeDead);

        if self.best_score.is_none_or(|best| self.score >= best) {
            self.best_score = Some(self.score);
            self.emit(GameEvent::BestScoreChanged);
        }

        self.animator.do_animation(
            Sequence::DeathFadeOut,
            ANIMATION_FRAMES,
            ANIMATION_INTERVAL,
            self.clock,
        );
    }

    fn reposition_apples(&mut self, bounds: BoardSize) {
        let before = self.apples.len();
        self.apples.retain(|apple| bounds.contains(*apple));

        let removed = before - self.apples.len();
        if removed > 0 {
            self.add_apples(removed as u32);
        }
    }

    fn draw_board(&mut self, alpha: u8, opacity: f32) {
        draw_grid(
            &mut self.context,
            self.config.primary_grid_color,
            self.config.secondary_grid_color,
            self.cell_size,
        );
        self.draw_apples(BASE_TICK_INTERVAL_MS, opacity);
        self.snake.draw(&mut self.context, opacity);
        self.draw_score(alpha, opacity);
    }

    /// Grid, score, and the resume (or restart) prompt, shown while paused.
    fn draw_prompt_screen(&mut self) {
        draw_grid(
            &mut self.context,
            self.config.primary_grid_color,
            self.config.secondary_grid_color,
            self.cell_size,
        );
        self.draw_score(OVERLAY_ALPHA, 1.0);

        let lines = if self.dead {
            &self.config.restart_text
        } else {
            &self.config.resume_text
        };
        let font = self.primary_font(PROMPT_FONT_SIZE);
        draw_text_lines(
            &mut self.context,
            lines,
            &font,
            Rgb::WHITE.with_alpha(OVERLAY_ALPHA),
            &[],
            &[],
        );
        self.context.redraw();
    }

    fn draw_start_text(&mut self, alpha: u8) {
        let lines = &self.config.start_text;
        let spread = 25.0 * lines.len().saturating_sub(1) as f32;
        let offset = self.context.height() as f32 / 2.0 - spread;
        let y_offsets = vec![offset; lines.len()];
        let font = self.primary_font(START_FONT_SIZE);

        draw_text_lines(
            &mut self.context,
            lines,
            &font,
            Rgb::WHITE.with_alpha(alpha),
            &[],
            &y_offsets,
        );
    }

    fn draw_apples(&mut self, interval_ms: u64, opacity: f32) {
        let growth = self.pulse.advance(interval_ms);
        for apple in &self.apples {
            self.context
                .draw_sprite(Sprite::Apple, apple.extend(growth, growth).to_rect(), opacity);
        }
    }

    /// Score and best score drawn inside the board in full-screen mode.
    ///
    /// Dims itself while the snake passes underneath.
    fn draw_score(&mut self, alpha: u8, opacity: f32) {
        if !self.full_screen {
            return;
        }

        let font = FontSpec::new(&self.config.secondary_font, SCORE_FONT_SIZE);
        let score_text = self.score.to_string();
        let (_, line_height) = self.context.measure_text(&score_text, &font);
        let size = self.cell_size;

        let apple_icon = GridObject::square(10.0, SCORE_MARGIN_Y, size);
        let score_origin = (
            apple_icon.x + apple_icon.width + 5.0,
            SCORE_MARGIN_Y + apple_icon.height - line_height,
        );
        let crown_icon = GridObject::square(
            score_origin.0 + SCORE_TEXT_WIDTH + 5.0,
            SCORE_MARGIN_Y,
            size,
        );
        let best_origin = (
            crown_icon.x + crown_icon.width + 5.0,
            SCORE_MARGIN_Y + crown_icon.height - line_height,
        );

        let right = match self.best_score {
            Some(_) => best_origin.0 + SCORE_TEXT_WIDTH + 5.0,
            None => score_origin.0 + SCORE_TEXT_WIDTH + 5.0,
        };
        let overlaps =
            !self.dead && self.snake.contains_rect_f(0.0, 0.0, right, size + SCORE_MARGIN_Y * 2.0);

        let (icon_opacity, text_alpha) = if overlaps {
            (OVERLAY_DIMMED_OPACITY, OVERLAY_DIMMED_ALPHA)
        } else {
            (opacity, alpha)
        };
        let color = Rgb::WHITE.with_alpha(text_alpha);

        self.context
            .draw_sprite(Sprite::Apple, apple_icon.to_rect(), icon_opacity);
        self.context.draw_text(&score_text, &font, score_origin, color);

        if let Some(best) = self.best_score {
            self.context
                .draw_sprite(Sprite::Crown, crown_icon.to_rect(), icon_opacity);
            self.context
                .draw_text(&best.to_string(), &font, best_origin, color);
        }
    }

    fn primary_font(&self, size: f32) -> FontSpec {
        FontSpec::new(&self.config.primary_font, size)
    }
}

fn fade_alpha(frame: u32) -> u8 {
    u8::try_from(frame.saturating_mul(u32::from(ALPHA_STEP))).unwrap_or(u8::MAX)
}
