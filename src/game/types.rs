use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

/// A grid cell, addressed as `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
  pub row: i32,
  pub col: i32,
}

impl Point {
  pub const fn new(row: i32, col: i32) -> Self {
    Self { row, col }
  }

  /// Moves `length` cells in `direction`.
  pub fn offset(self, direction: Direction, length: i32) -> Self {
    let (d_row, d_col) = direction.delta();
    Self {
      row: self.row + d_row * length,
      col: self.col + d_col * length,
    }
  }
}

impl Serialize for Point {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    [self.row, self.col].serialize(serializer)
  }
}

/// Absent fruit goes out as `[]`, present fruit as `[row, col]`.
pub fn serialize_fruit<S: Serializer>(fruit: &Option<Point>, serializer: S) -> Result<S::Ok, S::Error> {
  match fruit {
    Some(point) => point.serialize(serializer),
    None => serializer.serialize_seq(Some(0))?.end(),
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Down,
  Left,
  Up,
  Right,
}

impl Direction {
  #[cfg(test)]
  pub const ALL: [Direction; 4] = [Direction::Down, Direction::Left, Direction::Up, Direction::Right];

  /// Unit vector as `(d_row, d_col)`. Movement, growth and the collision walk all go through this.
  pub const fn delta(self) -> (i32, i32) {
    match self {
      Direction::Down => (1, 0),
      Direction::Left => (0, -1),
      Direction::Up => (-1, 0),
      Direction::Right => (0, 1),
    }
  }

  pub const fn opposite(self) -> Self {
    match self {
      Direction::Down => Direction::Up,
      Direction::Left => Direction::Right,
      Direction::Up => Direction::Down,
      Direction::Right => Direction::Left,
    }
  }

  pub const fn is_vertical(self) -> bool {
    matches!(self, Direction::Down | Direction::Up)
  }
}

/// A straight run of body cells starting at the walk cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
  pub direction: Direction,
  pub length: u32,
}

impl Segment {
  pub const fn new(direction: Direction, length: u32) -> Self {
    Self { direction, length }
  }
}
