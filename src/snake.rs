use crate::context::{GameContext, Sprite};
use crate::geometry::{GridObject, PixelRect};
use crate::input::Direction;

/// Orientation of a body turn, named after the two neighbours it connects.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Corner {
    LeftDown,
    UpLeft,
    RightUp,
    DownRight,
}

/// Sprite category of one segment, chosen from its neighbours' positions.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum SegmentTile {
    /// Head facing away from the second segment.
    Head(Direction),
    /// Tail pointing towards the segment before it.
    Tail(Direction),
    Horizontal,
    Vertical,
    Corner(Corner),
}

impl SegmentTile {
    /// `(column, row)` of this tile in the 5x4 snake sprite sheet.
    #[must_use]
    pub fn atlas_cell(self) -> (u8, u8) {
        match self {
            Self::Head(Direction::Up) => (3, 0),
            Self::Head(Direction::Down) => (4, 1),
            Self::Head(Direction::Left) => (3, 1),
            Self::Head(Direction::Right) => (4, 0),
            Self::Tail(Direction::Up) => (3, 2),
            Self::Tail(Direction::Down) => (4, 3),
            Self::Tail(Direction::Left) => (3, 3),
            Self::Tail(Direction::Right) => (4, 2),
            Self::Horizontal => (1, 0),
            Self::Vertical => (2, 1),
            Self::Corner(Corner::LeftDown) => (2, 0),
            Self::Corner(Corner::UpLeft) => (2, 2),
            Self::Corner(Corner::RightUp) => (0, 1),
            Self::Head(Direction::Stopped)
            | Self::Tail(Direction::Stopped)
            | Self::Corner(Corner::DownRight) => (0, 0),
        }
    }
}

/// Snapshot sent after every move. Owns its copy of the segments.
#[derive(Debug, Clone, PartialEq)]
pub struct SnakeMoved {
    pub segments: Vec<GridObject>,
    pub direction: Direction,
}

impl SnakeMoved {
    #[must_use]
    pub fn head(&self) -> Option<GridObject> {
        self.segments.first().copied()
    }
}

/// Ordered segment chain, head first.
#[derive(Debug, Clone, Default)]
pub struct Snake {
    segments: Vec<GridObject>,
    direction: Direction,
}

impl Snake {
    /// Creates an empty, stopped snake. Call [`Snake::init`] before use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a snake from explicit segments (front is head).
    #[must_use]
    pub fn from_segments(segments: Vec<GridObject>, direction: Direction) -> Self {
        Self {
            segments,
            direction,
        }
    }

    /// Replaces the chain with `head` followed by `segment_count` segments laid
    /// out behind it, opposite to `direction`.
    pub fn init(&mut self, head: GridObject, segment_count: u32, direction: Direction) {
        self.direction = direction;
        self.segments.clear();
        self.segments.push(head);

        let (dx, dy) = direction.opposite().delta();
        let mut previous = head;
        for _ in 0..segment_count {
            let next = previous.translated(dx * previous.width, dy * previous.height);
            self.segments.push(next);
            previous = next;
        }
    }

    /// Head position after one more move in the current heading.
    #[must_use]
    pub fn next_head(&self) -> Option<GridObject> {
        let head = self.head()?;
        let (dx, dy) = self.direction.delta();
        Some(head.translated(dx * head.width, dy * head.height))
    }

    /// Advances the chain by one cell.
    ///
    /// Each segment takes the position its predecessor had before the move.
    /// With `add_segment`, the vacated tail cell stays occupied by a new
    /// segment. Returns `None` without moving when stopped or shorter than two.
    pub fn move_forward(&mut self, add_segment: bool) -> Option<SnakeMoved> {
        if self.direction == Direction::Stopped || self.segments.len() < 2 {
            return None;
        }

        let next_head = self.next_head()?;
        let tail = *self.segments.last()?;

        for index in (1..self.segments.len()).rev() {
            let previous = self.segments[index - 1];
            self.segments[index] = self.segments[index].with_position(previous.x, previous.y);
        }

        if add_segment {
            self.segments.push(tail);
        }

        self.segments[0] = self.segments[0].with_position(next_head.x, next_head.y);

        Some(SnakeMoved {
            segments: self.segments.clone(),
            direction: self.direction,
        })
    }

    /// Returns true when any segment overlaps the object. Empty objects never do.
    #[must_use]
    pub fn contains_object(&self, object: &GridObject) -> bool {
        if object.is_empty() {
            return false;
        }
        self.contains_rect(object.to_rect())
    }

    /// Returns true when any segment overlaps `rect`. Empty rects never do.
    #[must_use]
    pub fn contains_rect(&self, rect: PixelRect) -> bool {
        if rect.is_empty() {
            return false;
        }
        self.segments
            .iter()
            .any(|segment| rect.intersects(segment.to_rect()))
    }

    /// Float-rectangle variant of [`Snake::contains_rect`], rounded outwards.
    #[must_use]
    pub fn contains_rect_f(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
        self.contains_rect(PixelRect::ceiling(x, y, width, height))
    }

    /// Shifts every segment by a constant offset.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        for segment in &mut self.segments {
            *segment = segment.translated(dx, dy);
        }
    }

    /// Tile for segment `index`, or `None` when the chain cannot be drawn.
    #[must_use]
    pub fn tile_at(&self, index: usize) -> Option<SegmentTile> {
        let len = self.segments.len();
        if len < 2 || index >= len {
            return None;
        }

        let segment = self.segments[index];
        let tile = if index == 0 {
            head_tile(segment, self.segments[1])
        } else if index == len - 1 {
            tail_tile(self.segments[index - 1], segment)
        } else {
            body_tile(self.segments[index - 1], segment, self.segments[index + 1])
        };

        Some(tile)
    }

    /// Segments paired with their tiles, head first.
    pub fn tiles(&self) -> impl Iterator<Item = (GridObject, SegmentTile)> + '_ {
        (0..self.segments.len())
            .filter_map(|index| self.tile_at(index).map(|tile| (self.segments[index], tile)))
    }

    /// Draws every segment's tile at `opacity`.
    pub fn draw<C: GameContext + ?Sized>(&self, context: &mut C, opacity: f32) {
        for (segment, tile) in self.tiles() {
            context.draw_sprite(Sprite::Snake(tile), segment.to_rect(), opacity);
        }
    }

    #[must_use]
    pub fn head(&self) -> Option<GridObject> {
        self.segments.first().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Sets the heading without any validation.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    #[must_use]
    pub fn segments(&self) -> &[GridObject] {
        &self.segments
    }
}

fn head_tile(head: GridObject, next: GridObject) -> SegmentTile {
    let direction = if head.y < next.y {
        Direction::Up
    } else if head.y > next.y {
        Direction::Down
    } else if head.x > next.x {
        Direction::Right
    } else if head.x < next.x {
        Direction::Left
    } else {
        return SegmentTile::Corner(Corner::DownRight);
    };
    SegmentTile::Head(direction)
}

fn tail_tile(previous: GridObject, tail: GridObject) -> SegmentTile {
    let direction = if previous.y < tail.y {
        Direction::Up
    } else if previous.y > tail.y {
        Direction::Down
    } else if previous.x > tail.x {
        Direction::Right
    } else if previous.x < tail.x {
        Direction::Left
    } else {
        return SegmentTile::Corner(Corner::DownRight);
    };
    SegmentTile::Tail(direction)
}

fn body_tile(p: GridObject, s: GridObject, n: GridObject) -> SegmentTile {
    if (p.x < s.x && n.x > s.x) || (n.x < s.x && p.x > s.x) {
        SegmentTile::Horizontal
    } else if (p.y < s.y && n.y > s.y) || (n.y < s.y && p.y > s.y) {
        SegmentTile::Vertical
    } else if (p.x < s.x && n.y > s.y) || (n.x < s.x && p.y > s.y) {
        SegmentTile::Corner(Corner::LeftDown)
    } else if (p.y < s.y && n.x < s.x) || (n.y < s.y && p.x < s.x) {
        SegmentTile::Corner(Corner::UpLeft)
    } else if (p.x > s.x && n.y < s.y) || (n.x > s.x && p.y < s.y) {
        SegmentTile::Corner(Corner::RightUp)
    } else {
        // Down-right turns and degenerate overlaps share the first atlas cell.
        SegmentTile::Corner(Corner::DownRight)
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::{GridObject, PixelRect};
    use crate::input::Direction;

    use super::{Corner, SegmentTile, Snake};

    const CELL: f32 = 32.0;

    fn cell(column: i32, row: i32) -> GridObject {
        GridObject::square(column as f32 * CELL, row as f32 * CELL, CELL)
    }

    fn positions(snake: &Snake) -> Vec<(f32, f32)> {
        snake
            .segments()
            .iter()
            .map(|segment| (segment.x, segment.y))
            .collect()
    }

    #[test]
    fn init_lays_segments_out_behind_the_head() {
        let mut snake = Snake::new();

        snake.init(cell(5, 5), 2, Direction::Right);
        assert_eq!(positions(&snake), vec![(160.0, 160.0), (128.0, 160.0), (96.0, 160.0)]);

        snake.init(cell(5, 5), 2, Direction::Up);
        assert_eq!(positions(&snake), vec![(160.0, 160.0), (160.0, 192.0), (160.0, 224.0)]);

        snake.init(cell(5, 5), 1, Direction::Down);
        assert_eq!(positions(&snake), vec![(160.0, 160.0), (160.0, 128.0)]);

        snake.init(cell(5, 5), 1, Direction::Left);
        assert_eq!(positions(&snake), vec![(160.0, 160.0), (192.0, 160.0)]);
        assert_eq!(snake.direction(), Direction::Left);
    }

    #[test]
    fn move_shifts_every_segment_into_its_predecessor() {
        let mut snake = Snake::new();
        snake.init(cell(5, 5), 3, Direction::Right);
        snake.set_direction(Direction::Down);

        let moved = snake.move_forward(false).expect("moving snake should report");

        assert_eq!(
            positions(&snake),
            vec![(160.0, 192.0), (160.0, 160.0), (128.0, 160.0), (96.0, 160.0)]
        );
        assert_eq!(moved.segments, snake.segments());
        assert_eq!(moved.direction, Direction::Down);
    }

    #[test]
    fn growth_keeps_the_vacated_tail_cell() {
        let mut snake = Snake::new();
        snake.init(cell(5, 5), 2, Direction::Right);

        snake.move_forward(true);

        assert_eq!(snake.len(), 4);
        assert_eq!(
            positions(&snake),
            vec![(192.0, 160.0), (160.0, 160.0), (128.0, 160.0), (96.0, 160.0)]
        );
    }

    #[test]
    fn n_moves_displace_the_head_by_n_cells_and_keep_the_shape() {
        let mut snake = Snake::new();
        snake.init(cell(2, 2), 4, Direction::Down);
        let before = positions(&snake);

        for _ in 0..7 {
            snake.move_forward(false);
        }

        assert_eq!(snake.len(), 5);
        let after = positions(&snake);
        for (old, new) in before.iter().zip(&after) {
            assert_eq!(new.0 - old.0, 0.0);
            assert_eq!(new.1 - old.1, 7.0 * CELL);
        }
    }

    #[test]
    fn stopped_or_short_snake_does_not_move() {
        let mut stopped = Snake::new();
        stopped.init(cell(1, 1), 2, Direction::Right);
        stopped.set_direction(Direction::Stopped);
        assert!(stopped.move_forward(true).is_none());
        assert_eq!(stopped.len(), 3);

        let mut short = Snake::from_segments(vec![cell(1, 1)], Direction::Right);
        assert!(short.move_forward(false).is_none());
        assert_eq!(short.head(), Some(cell(1, 1)));
    }

    #[test]
    fn contains_checks_every_segment_and_ignores_empty_queries() {
        let mut snake = Snake::new();
        snake.init(cell(3, 3), 2, Direction::Right);

        assert!(snake.contains_object(&cell(1, 3)));
        assert!(!snake.contains_object(&cell(4, 3)));
        assert!(!snake.contains_object(&GridObject::at(100.0, 100.0)));
        assert!(snake.contains_rect(PixelRect::new(90, 100, 10, 10)));
        assert!(!snake.contains_rect(PixelRect::new(96, 96, 0, 0)));
        assert!(snake.contains_rect_f(40.5, 96.0, 16.0, 1.0));
    }

    #[test]
    fn translate_moves_the_whole_chain() {
        let mut snake = Snake::new();
        snake.init(cell(3, 3), 1, Direction::Right);
        snake.translate(-16.0, 32.0);

        assert_eq!(positions(&snake), vec![(80.0, 128.0), (48.0, 128.0)]);
    }

    #[test]
    fn tiles_follow_neighbour_positions() {
        // Head moving up, then a left turn, a straight run, and a tail.
        let snake = Snake::from_segments(
            vec![
                cell(2, 0),
                cell(2, 1),
                cell(1, 1),
                cell(0, 1),
                cell(0, 2),
                cell(0, 3),
            ],
            Direction::Up,
        );

        let tiles: Vec<SegmentTile> = snake.tiles().map(|(_, tile)| tile).collect();
        assert_eq!(
            tiles,
            vec![
                SegmentTile::Head(Direction::Up),
                SegmentTile::Corner(Corner::UpLeft),
                SegmentTile::Horizontal,
                SegmentTile::Corner(Corner::DownRight),
                SegmentTile::Vertical,
                SegmentTile::Tail(Direction::Up),
            ]
        );
    }

    #[test]
    fn remaining_corner_tiles_are_detected() {
        let left_down = Snake::from_segments(
            vec![cell(1, 2), cell(1, 1), cell(0, 1)],
            Direction::Down,
        );
        assert_eq!(left_down.tile_at(1), Some(SegmentTile::Corner(Corner::LeftDown)));
        assert_eq!(left_down.tile_at(0), Some(SegmentTile::Head(Direction::Down)));
        assert_eq!(left_down.tile_at(2), Some(SegmentTile::Tail(Direction::Right)));

        let right_up = Snake::from_segments(
            vec![cell(2, 1), cell(1, 1), cell(1, 0)],
            Direction::Right,
        );
        assert_eq!(right_up.tile_at(1), Some(SegmentTile::Corner(Corner::RightUp)));
        assert_eq!(right_up.tile_at(0), Some(SegmentTile::Head(Direction::Right)));
        assert_eq!(right_up.tile_at(2), Some(SegmentTile::Tail(Direction::Down)));
    }

    #[test]
    fn single_segment_has_no_tiles() {
        let snake = Snake::from_segments(vec![cell(0, 0)], Direction::Right);
        assert_eq!(snake.tiles().count(), 0);
        assert_eq!(snake.tile_at(0), None);
    }

    #[test]
    fn atlas_cells_match_the_sprite_sheet() {
        assert_eq!(SegmentTile::Head(Direction::Up).atlas_cell(), (3, 0));
        assert_eq!(SegmentTile::Tail(Direction::Down).atlas_cell(), (4, 3));
        assert_eq!(SegmentTile::Vertical.atlas_cell(), (2, 1));
        assert_eq!(SegmentTile::Corner(Corner::RightUp).atlas_cell(), (0, 1));
    }
}
