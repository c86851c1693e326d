use super::snake::Snake;
use super::types::{Point, Segment};

/// The grid is the half-open square `[0, grid_size)` on both axes.
pub fn is_out_of_bounds(pos: Point, grid_size: i32) -> bool {
  pos.row < 0 || pos.row >= grid_size || pos.col < 0 || pos.col >= grid_size
}

/// Walks the snake's segments from the head, reconstructing each run on the fly.
///
/// `is_self` is set when `pos` is the snake's own freshly moved head: the first
/// segment starts on that very cell, so its boundary test is skipped.
pub fn is_colliding_with_snake(snake: &Snake, pos: Point, is_self: bool) -> bool {
  let mut cursor = snake.head;
  for (index, segment) in snake.body.iter().enumerate() {
    let skip_boundary = index == 0 && is_self;
    if !skip_boundary && pos == cursor {
      return true;
    }
    if is_inside_run(cursor, segment, pos) {
      return true;
    }
    cursor = cursor.offset(segment.direction, segment.length as i32);
  }
  false
}

/// True when `pos` sits strictly after `cursor` and strictly before the run's far end.
fn is_inside_run(cursor: Point, segment: &Segment, pos: Point) -> bool {
  let (d_row, d_col) = segment.direction.delta();
  let (on_axis, distance) = if segment.direction.is_vertical() {
    (pos.col == cursor.col, (pos.row - cursor.row) * d_row)
  } else {
    (pos.row == cursor.row, (pos.col - cursor.col) * d_col)
  };
  on_axis && distance > 0 && distance < segment.length as i32
}
