use super::types::{Direction, Point, Segment};
use serde::Serialize;

/// A snake whose body is stored as direction + length runs walked from the head.
///
/// The first segment starts at the head cell, each segment points away from the head,
/// and the body is never empty.
#[derive(Debug, Clone, Serialize)]
pub struct Snake {
  pub head: Point,
  pub body: Vec<Segment>,
  pub heading: Direction,
  pub dead: bool,
  pub counter: u32,
  #[serde(skip)]
  queued_heading: Option<Direction>,
  #[serde(skip)]
  trimmed: Option<Direction>,
}

impl Snake {
  pub fn new(head: Point, heading: Direction, length: u32) -> Self {
    Self {
      head,
      body: vec![Segment::new(heading.opposite(), length.max(1))],
      heading,
      dead: false,
      counter: 0,
      queued_heading: None,
      trimmed: None,
    }
  }

  pub fn reset_position(&mut self, head: Point, heading: Direction, length: u32) {
    *self = Self::new(head, heading, length);
  }

  pub fn is_dead(&self) -> bool {
    self.dead
  }

  pub fn kill(&mut self) {
    self.dead = true;
  }

  /// Queues a heading for the next step. Turning back onto the neck is ignored.
  pub fn turn(&mut self, direction: Direction) {
    if direction == self.heading.opposite() {
      return;
    }
    self.queued_heading = Some(direction);
  }

  /// Advances the head one cell and drops one cell off the tail.
  pub fn step(&mut self) -> Point {
    if let Some(heading) = self.queued_heading.take() {
      self.heading = heading;
    }
    self.head = self.head.offset(self.heading, 1);

    let neck = self.heading.opposite();
    match self.body.first_mut() {
      Some(first) if first.direction == neck => first.length += 1,
      _ => self.body.insert(0, Segment::new(neck, 1)),
    }

    self.trim_tail();
    self.head
  }

  /// Lengthens the body by one cell, reclaiming the cell the last step vacated.
  pub fn grow(&mut self) {
    match (self.trimmed.take(), self.body.last_mut()) {
      (Some(direction), Some(last)) if last.direction == direction => last.length += 1,
      (Some(direction), _) => self.body.push(Segment::new(direction, 1)),
      (None, Some(last)) => last.length += 1,
      (None, None) => {}
    }
  }

  pub fn len(&self) -> u32 {
    self.body.iter().map(|segment| segment.length).sum()
  }

  /// Every occupied cell, head first.
  #[cfg(test)]
  pub fn cells(&self) -> Vec<Point> {
    let mut cells = Vec::with_capacity(self.len() as usize);
    let mut cursor = self.head;
    for segment in &self.body {
      for _ in 0..segment.length {
        cells.push(cursor);
        cursor = cursor.offset(segment.direction, 1);
      }
    }
    cells
  }

  fn trim_tail(&mut self) {
    let Some(last) = self.body.last_mut() else { return };
    self.trimmed = Some(last.direction);
    last.length -= 1;
    if last.length == 0 {
      self.body.pop();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_snake_trails_behind_head() {
    let snake = Snake::new(Point::new(5, 4), Direction::Right, 3);
    assert_eq!(
      snake.cells(),
      vec![Point::new(5, 4), Point::new(5, 3), Point::new(5, 2)]
    );
    assert_eq!(snake.len(), 3);
  }

  #[test]
  fn straight_step_keeps_a_single_segment() {
    let mut snake = Snake::new(Point::new(5, 4), Direction::Right, 3);
    let head = snake.step();

    assert_eq!(head, Point::new(5, 5));
    assert_eq!(snake.body, vec![Segment::new(Direction::Left, 3)]);
    assert_eq!(
      snake.cells(),
      vec![Point::new(5, 5), Point::new(5, 4), Point::new(5, 3)]
    );
  }

  #[test]
  fn turning_prepends_a_segment_and_shrinks_the_tail() {
    let mut snake = Snake::new(Point::new(5, 4), Direction::Right, 3);
    snake.turn(Direction::Down);
    snake.step();

    assert_eq!(
      snake.body,
      vec![Segment::new(Direction::Up, 1), Segment::new(Direction::Left, 2)]
    );
    assert_eq!(
      snake.cells(),
      vec![Point::new(6, 4), Point::new(5, 4), Point::new(5, 3)]
    );
  }

  #[test]
  fn tail_segment_disappears_once_consumed() {
    let mut snake = Snake::new(Point::new(5, 4), Direction::Right, 2);
    snake.turn(Direction::Down);
    snake.step();
    snake.step();

    assert_eq!(snake.body, vec![Segment::new(Direction::Up, 2)]);
    assert_eq!(snake.cells(), vec![Point::new(7, 4), Point::new(6, 4)]);
  }

  #[test]
  fn reversal_is_ignored() {
    let mut snake = Snake::new(Point::new(5, 4), Direction::Right, 3);
    snake.turn(Direction::Left);
    snake.step();
    assert_eq!(snake.heading, Direction::Right);
    assert_eq!(snake.head, Point::new(5, 5));
  }

  #[test]
  fn grow_reclaims_the_vacated_tail_cell() {
    let mut snake = Snake::new(Point::new(5, 4), Direction::Right, 3);
    snake.step();
    snake.grow();

    assert_eq!(snake.len(), 4);
    assert_eq!(
      snake.cells(),
      vec![Point::new(5, 5), Point::new(5, 4), Point::new(5, 3), Point::new(5, 2)]
    );
  }

  #[test]
  fn grow_after_tail_segment_popped_restores_its_direction() {
    let mut snake = Snake::new(Point::new(5, 4), Direction::Right, 1);
    snake.turn(Direction::Down);
    snake.step();
    assert_eq!(snake.body, vec![Segment::new(Direction::Up, 1)]);

    snake.grow();
    assert_eq!(
      snake.body,
      vec![Segment::new(Direction::Up, 1), Segment::new(Direction::Left, 1)]
    );
    assert_eq!(snake.cells(), vec![Point::new(6, 4), Point::new(5, 4)]);
  }

  #[test]
  fn reset_position_revives_and_clears_score() {
    let mut snake = Snake::new(Point::new(1, 1), Direction::Up, 2);
    snake.counter = 4;
    snake.kill();
    snake.reset_position(Point::new(3, 3), Direction::Right, 3);

    assert!(!snake.is_dead());
    assert_eq!(snake.counter, 0);
    assert_eq!(snake.head, Point::new(3, 3));
    assert_eq!(snake.len(), 3);
  }
}
