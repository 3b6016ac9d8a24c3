use std::time::Duration;

use arcade_snake::canvas::Canvas;
use arcade_snake::config::GameConfig;
use arcade_snake::game::{Game, GameEvent, GameState};
use arcade_snake::geometry::GridObject;
use arcade_snake::input::Direction;

fn cell(column: u32, row: u32) -> GridObject {
    GridObject::square(column as f32 * 32.0, row as f32 * 32.0, 32.0)
}

#[test]
fn stepwise_apple_collection_and_wall_collision() {
    let config = GameConfig {
        start_text: Vec::new(),
        snake_start_cell: [1, 1],
        snake_start_segments: 1,
        ..GameConfig::default()
    };
    let mut game = Game::new_with_seed(Canvas::new(96, 64), config, 42);

    game.init_game(32).expect("cell size is valid");
    game.start_game(true);
    assert_eq!(game.state(), GameState::Playing);
    assert_eq!(game.snake().segments(), &[cell(1, 1), cell(0, 1)]);
    game.drain_events();

    game.set_direction(Direction::Up);
    game.advance(Duration::from_millis(100));
    assert_eq!(game.snake().head(), Some(cell(1, 0)));
    assert!(!game.is_dead());

    game.set_direction(Direction::Right);
    game.advance(Duration::from_millis(100));
    assert_eq!(game.snake().head(), Some(cell(2, 0)));

    game.set_direction(Direction::Down);
    game.advance(Duration::from_millis(100));
    assert_eq!(game.snake().head(), Some(cell(2, 1)));

    let eaten = game.score();
    game.set_direction(Direction::Right);
    game.advance(Duration::from_millis(100));

    assert_eq!(game.state(), GameState::Dead);
    assert_eq!(game.best_score(), Some(eaten));

    let events = game.drain_events();
    assert_eq!(
        events.iter().filter(|event| **event == GameEvent::SnakeDead).count(),
        1
    );
    assert_eq!(events.last(), Some(&GameEvent::BestScoreChanged));
}

#[test]
fn same_seed_places_the_same_apples() {
    let run = || {
        let config = GameConfig {
            start_text: Vec::new(),
            ..GameConfig::default()
        };
        let mut game = Game::new_with_seed(Canvas::new(640, 480), config, 7);
        game.init_game(32).expect("cell size is valid");
        game.apples().to_vec()
    };

    assert_eq!(run(), run());
}
