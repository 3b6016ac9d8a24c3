use rand::Rng;

use crate::geometry::{BoardSize, GridObject};
use crate::snake::Snake;

/// Random samples tried before falling back to scanning every free cell.
pub const MAX_SAMPLE_ATTEMPTS: u32 = 256;

/// Picks a cell-aligned apple position clear of the snake and of `apples`.
///
/// Only whole cells are candidates: a partial cell along the right or bottom
/// edge of an uneven board is never used. Uniform cells are sampled first.
/// When sampling keeps failing on a crowded board, a free cell is chosen from
/// all free cells instead. Returns `None` when the board has no free cell.
#[must_use]
pub fn place_apple<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: BoardSize,
    cell_size: f32,
    snake: &Snake,
    apples: &[GridObject],
) -> Option<GridObject> {
    let (columns, rows) = whole_cells(bounds, cell_size);
    if columns == 0 || rows == 0 {
        return None;
    }

    for _ in 0..MAX_SAMPLE_ATTEMPTS {
        let candidate = cell_at(rng.gen_range(0..columns), rng.gen_range(0..rows), cell_size);
        if is_free(candidate, snake, apples) {
            return Some(candidate);
        }
    }

    let candidates = free_cells(bounds, cell_size, snake, apples);
    if candidates.is_empty() {
        return None;
    }

    let index = rng.gen_range(0..candidates.len());
    Some(candidates[index])
}

/// Every whole cell inside `bounds` that overlaps nothing.
#[must_use]
pub fn free_cells(
    bounds: BoardSize,
    cell_size: f32,
    snake: &Snake,
    apples: &[GridObject],
) -> Vec<GridObject> {
    let (columns, rows) = whole_cells(bounds, cell_size);
    let mut candidates = Vec::new();

    for row in 0..rows {
        for column in 0..columns {
            let candidate = cell_at(column, row, cell_size);
            if is_free(candidate, snake, apples) {
                candidates.push(candidate);
            }
        }
    }

    candidates
}

/// Number of columns and rows of cells that fit entirely on the board.
fn whole_cells(bounds: BoardSize, cell_size: f32) -> (u32, u32) {
    if bounds.is_empty() || cell_size <= 0.0 {
        return (0, 0);
    }

    (
        (bounds.width as f32 / cell_size) as u32,
        (bounds.height as f32 / cell_size) as u32,
    )
}

fn cell_at(column: u32, row: u32, cell_size: f32) -> GridObject {
    GridObject::square(column as f32 * cell_size, row as f32 * cell_size, cell_size)
}

fn is_free(candidate: GridObject, snake: &Snake, apples: &[GridObject]) -> bool {
    if snake.contains_object(&candidate) {
        return false;
    }

    let rect = candidate.to_rect();
    !apples.iter().any(|apple| apple.to_rect().intersects(rect))
}

/// Breathing animation of apple sprites, one step per draw.
///
/// The growth follows a triangle wave whose period depends on the tick
/// interval, so faster games pulse in shorter, shallower steps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ApplePulse {
    phase: f32,
}

impl ApplePulse {
    /// Returns the extension in pixels for this draw and advances the wave.
    pub fn advance(&mut self, interval_ms: u64) -> f32 {
        let interval = interval_ms.max(1);
        let max = (1000 / (interval * 2)).max(1) as f32;
        if self.phase >= max {
            self.phase = -max;
        }

        let value = self.phase.abs() * interval as f32 / 100.0;
        self.phase += 1.0;
        value
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::geometry::{BoardSize, GridObject};
    use crate::input::Direction;
    use crate::snake::Snake;

    use super::{free_cells, place_apple, ApplePulse};

    const CELL: f32 = 32.0;

    fn cell(column: u32, row: u32) -> GridObject {
        GridObject::square(column as f32 * CELL, row as f32 * CELL, CELL)
    }

    #[test]
    fn apples_never_overlap_snake_or_each_other() {
        let mut rng = StdRng::seed_from_u64(7);
        let bounds = BoardSize::new(320, 256);
        let mut snake = Snake::new();
        snake.init(cell(5, 4), 4, Direction::Right);

        for _ in 0..50 {
            let mut apples = Vec::new();
            for _ in 0..6 {
                let apple = place_apple(&mut rng, bounds, CELL, &snake, &apples)
                    .expect("board has free cells");
                apples.push(apple);
            }

            for (index, apple) in apples.iter().enumerate() {
                assert!(!snake.contains_object(apple));
                assert!(bounds.contains(*apple));
                assert_eq!(apple.x % CELL, 0.0);
                assert_eq!(apple.y % CELL, 0.0);
                for other in &apples[index + 1..] {
                    assert!(!apple.intersects(*other));
                }
            }
        }
    }

    #[test]
    fn crowded_board_falls_back_to_the_last_free_cell() {
        let mut rng = StdRng::seed_from_u64(11);
        let bounds = BoardSize::new(96, 32);
        let snake = Snake::from_segments(vec![cell(0, 0), cell(1, 0)], Direction::Left);

        for _ in 0..20 {
            let apple = place_apple(&mut rng, bounds, CELL, &snake, &[])
                .expect("one cell is free");
            assert_eq!(apple, cell(2, 0));
        }
    }

    #[test]
    fn full_board_yields_no_apple() {
        let mut rng = StdRng::seed_from_u64(3);
        let bounds = BoardSize::new(64, 32);
        let snake = Snake::from_segments(vec![cell(0, 0), cell(1, 0)], Direction::Left);

        assert_eq!(place_apple(&mut rng, bounds, CELL, &snake, &[]), None);
        assert!(free_cells(bounds, CELL, &snake, &[]).is_empty());
    }

    #[test]
    fn free_cells_skip_existing_apples() {
        let bounds = BoardSize::new(96, 32);
        let snake = Snake::from_segments(vec![cell(0, 0), cell(1, 0)], Direction::Left);

        assert_eq!(free_cells(bounds, CELL, &snake, &[]), vec![cell(2, 0)]);
        assert!(free_cells(bounds, CELL, &snake, &[cell(2, 0)]).is_empty());
    }

    #[test]
    fn apples_stay_in_whole_cells_on_uneven_boards() {
        let bounds = BoardSize::new(330, 320);
        let mut snake = Snake::new();
        snake.init(cell(2, 2), 2, Direction::Right);

        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let apple = place_apple(&mut rng, bounds, CELL, &snake, &[])
                .expect("board has free cells");
            assert!(bounds.contains(apple), "seed {seed} placed {apple:?}");
        }
    }

    #[test]
    fn partial_edge_cells_are_never_free() {
        let bounds = BoardSize::new(100, 40);
        let snake = Snake::from_segments(vec![cell(0, 0), cell(1, 0)], Direction::Left);

        assert_eq!(free_cells(bounds, CELL, &snake, &[]), vec![cell(2, 0)]);
        assert_eq!(
            place_apple(&mut StdRng::seed_from_u64(5), BoardSize::new(63, 31), CELL, &snake, &[]),
            None
        );
    }

    #[test]
    fn pulse_is_a_triangle_wave() {
        let mut pulse = ApplePulse::default();
        let steps: Vec<f32> = (0..12).map(|_| pulse.advance(100)).collect();

        assert_eq!(
            steps,
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.0, 1.0]
        );
    }

    #[test]
    fn pulse_scales_with_interval() {
        let mut pulse = ApplePulse::default();
        pulse.advance(80);
        assert_eq!(pulse.advance(80), 0.8);
    }
}
