use super::types::{Direction, Point};

/// Starting heads for `count` snakes: one lane per snake, evenly spread over the rows,
/// all heading right with the tail on column 0.
///
/// Lanes are distinct while `count <= grid_size`, and every body is in bounds while
/// `length <= grid_size`.
pub fn start_positions(count: usize, grid_size: i32, length: u32) -> Vec<(Point, Direction)> {
  if count == 0 {
    return Vec::new();
  }
  let count = count as i64;
  let grid = i64::from(grid_size);
  let head_col = length.max(1) as i32 - 1;
  (0..count)
    .map(|lane| {
      let row = ((2 * lane + 1) * grid) / (2 * count);
      (Point::new(row as i32, head_col), Direction::Right)
    })
    .collect()
}
