mod common;
mod game;

pub use common::{Axis, Cell, Direction, Mode, UnknownMode};
pub use game::{
    Collision, ParseError, SnakeGame, SnakeGameSnapshot, TickOutcome, FOOD_SCORE, GRID_SIZE,
};
