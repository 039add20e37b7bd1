use std::{fmt, str::FromStr};

use thiserror::Error;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell in `direction`. May lie outside the grid.
    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn in_grid(&self, grid_size: i32) -> bool {
        (0..grid_size).contains(&self.x) && (0..grid_size).contains(&self.y)
    }

    /// Folds a cell that left the grid by one step back onto the opposite edge.
    pub fn wrapped(&self, grid_size: i32) -> Self {
        Self::new(self.x.rem_euclid(grid_size), self.y.rem_euclid(grid_size))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Screen oriented: `y` grows downwards, so `Up` decrements it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Left,
    Right,
    Down,
}

impl Direction {
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn axis(&self) -> Axis {
        match self {
            Direction::Up | Direction::Down => Axis::Vertical,
            Direction::Left | Direction::Right => Axis::Horizontal,
        }
    }

    /// Only a turn onto the perpendicular axis is allowed: going straight on is
    /// a no-op and reversing would run the head into the neck.
    pub fn allows(&self, direction: &Self) -> bool {
        self.axis() != direction.axis()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Leaving the grid ends the game.
    #[default]
    Walls,
    /// Leaving the grid re-enters from the opposite edge.
    PassThrough,
}

impl Mode {
    pub fn toggled(&self) -> Self {
        match self {
            Mode::Walls => Mode::PassThrough,
            Mode::PassThrough => Mode::Walls,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Walls => write!(f, "Walls"),
            Mode::PassThrough => write!(f, "Pass-Through"),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown mode {0:?}, expected `walls` or `pass-through`")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walls" | "wall" => Ok(Mode::Walls),
            "pass-through" | "passthrough" | "wrap" => Ok(Mode::PassThrough),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}
