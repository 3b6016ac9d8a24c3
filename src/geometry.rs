/// Play-area dimensions in pixels.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct BoardSize {
    pub width: u32,
    pub height: u32,
}

impl BoardSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns true when `object` lies entirely inside the board.
    #[must_use]
    pub fn contains(self, object: GridObject) -> bool {
        object.x >= 0.0
            && object.y >= 0.0
            && object.x + object.width <= self.width as f32
            && object.y + object.height <= self.height as f32
    }
}

/// Integer pixel rectangle used for every overlap test.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest integer rectangle whose edges cover the float inputs.
    #[must_use]
    pub fn ceiling(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x: x.ceil() as i32,
            y: y.ceil() as i32,
            width: width.ceil() as i32,
            height: height.ceil() as i32,
        }
    }

    #[must_use]
    pub fn right(self) -> i32 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(self) -> i32 {
        self.y + self.height
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Returns true when the two rectangles share any interior area.
    ///
    /// Edges are half-open, so rectangles that only touch do not intersect.
    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        other.x < self.right()
            && self.x < other.right()
            && other.y < self.bottom()
            && self.y < other.bottom()
    }
}

/// Axis-aligned rectangle in continuous pixel coordinates.
///
/// Every placed entity (snake segment, apple, overlay icon) is a `GridObject`.
/// Values are plain copies; the sizing helpers return new instances.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridObject {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl GridObject {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a square object with edge length `size`.
    #[must_use]
    pub const fn square(x: f32, y: f32, size: f32) -> Self {
        Self::new(x, y, size, size)
    }

    /// Creates a zero-sized object at a position.
    #[must_use]
    pub const fn at(x: f32, y: f32) -> Self {
        Self::new(x, y, 0.0, 0.0)
    }

    #[must_use]
    pub fn from_rect(rect: PixelRect) -> Self {
        Self::new(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
        )
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Grows the object by moving its origin up-left by `(dx, dy)` and
    /// widening it by the same amounts.
    #[must_use]
    pub fn extend(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x - dx, self.y - dy, self.width + dx, self.height + dy)
    }

    /// Inverse of [`GridObject::extend`].
    #[must_use]
    pub fn reduce(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width - dx, self.height - dy)
    }

    /// Same object with its position moved to `(x, y)`.
    #[must_use]
    pub fn with_position(self, x: f32, y: f32) -> Self {
        Self::new(x, y, self.width, self.height)
    }

    #[must_use]
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        self.with_position(self.x + dx, self.y + dy)
    }

    /// Rounds every field half-to-even into an integer rectangle.
    #[must_use]
    pub fn to_rect(self) -> PixelRect {
        PixelRect::new(
            round_to_pixel(self.x),
            round_to_pixel(self.y),
            round_to_pixel(self.width),
            round_to_pixel(self.height),
        )
    }

    #[must_use]
    pub fn to_point(self) -> (i32, i32) {
        (round_to_pixel(self.x), round_to_pixel(self.y))
    }

    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        self.to_rect().intersects(other.to_rect())
    }
}

fn round_to_pixel(value: f32) -> i32 {
    value.round_ties_even() as i32
}

#[cfg(test)]
mod tests {
    use super::{BoardSize, GridObject, PixelRect};

    #[test]
    fn extend_and_reduce_are_inverse() {
        let apple = GridObject::square(64.0, 32.0, 32.0);

        let grown = apple.extend(3.0, 2.0);
        assert_eq!(grown, GridObject::new(61.0, 30.0, 35.0, 34.0));
        assert_eq!(grown.reduce(3.0, 2.0), apple);
    }

    #[test]
    fn emptiness_requires_positive_size() {
        assert!(GridObject::at(4.0, 4.0).is_empty());
        assert!(GridObject::new(0.0, 0.0, 10.0, -1.0).is_empty());
        assert!(!GridObject::square(0.0, 0.0, 1.0).is_empty());
        assert!(PixelRect::new(0, 0, 0, 5).is_empty());
    }

    #[test]
    fn rounding_uses_half_to_even() {
        let object = GridObject::new(0.5, 1.5, 2.5, 3.4);
        assert_eq!(object.to_rect(), PixelRect::new(0, 2, 2, 3));
        assert_eq!(object.to_point(), (0, 2));
    }

    #[test]
    fn touching_rectangles_do_not_intersect() {
        let left = GridObject::square(0.0, 0.0, 32.0);
        let right = GridObject::square(32.0, 0.0, 32.0);
        let overlapping = GridObject::square(31.0, 31.0, 32.0);

        assert!(!left.intersects(right));
        assert!(left.intersects(overlapping));
        assert!(right.intersects(overlapping));
    }

    #[test]
    fn board_contains_only_fully_inside_objects() {
        let board = BoardSize::new(320, 320);

        assert!(board.contains(GridObject::square(288.0, 0.0, 32.0)));
        assert!(!board.contains(GridObject::square(320.0, 0.0, 32.0)));
        assert!(!board.contains(GridObject::square(300.0, 0.0, 32.0)));
        assert!(!board.contains(GridObject::square(0.0, -32.0, 32.0)));
    }

    #[test]
    fn ceiling_covers_fractional_bounds() {
        let rect = PixelRect::ceiling(0.2, 0.0, 146.1, 42.0);
        assert_eq!(rect, PixelRect::new(1, 0, 147, 42));
    }
}
