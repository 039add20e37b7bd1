use std::{fmt, iter, str::FromStr};

use super::common::{Cell, Direction, Mode};
use thiserror::Error;
use tracing::{debug, info};

/// Side of the square board.
pub const GRID_SIZE: i32 = 20;
/// Points awarded for each food eaten.
pub const FOOD_SCORE: u32 = 5;

// Below this the initial snake and the initial food would share a cell.
const MIN_GRID_SIZE: i32 = 3;
// Keeps every cell count and coordinate product well inside `i32`.
const MAX_GRID_SIZE: i32 = 1024;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    #[error("Snake is on the wall at {0:?}")]
    Wall(Cell),
    #[error("Snake is eating itself at {0:?}")]
    Snake(Cell),
    #[error("Snake fills the whole board")]
    BoardFull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing moved: the game is idle, finished or has no direction yet.
    Idle,
    Moved,
    Ate,
    GameOver(Collision),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Missing {0} line")]
    MissingLine(&'static str),
    #[error("Invalid grid size {0:?}")]
    InvalidGridSize(String),
    #[error("Grid size {0} is too small, at least 3 is needed")]
    GridTooSmall(i32),
    #[error("Grid size {0} is too large, at most 1024 is supported")]
    GridTooLarge(i32),
    #[error("Invalid cell {0:?}, expected `x,y`")]
    InvalidCell(String),
    #[error("Snake has no cells")]
    EmptySnake,
    #[error("Cell {0:?} is outside the grid")]
    OutOfGrid(Cell),
    #[error("Snake occupies {0:?} twice")]
    DuplicateCell(Cell),
    #[error("Food {0:?} is on the snake")]
    FoodOnSnake(Cell),
    #[error("Invalid direction {0:?}, expected a unit vector `dx,dy`")]
    InvalidDirection(String),
}

/// The whole game: one instance is one run, advanced by an external clock
/// through [`SnakeGame::tick`].
///
/// Every call is valid in every state. Calls that make no sense in the current
/// state (turning back on itself, changing mode mid-run, ticking a finished
/// game) leave the game untouched.
pub struct SnakeGame {
    grid_size: i32,
    /// Head first, never empty, no cell twice.
    snake: Vec<Cell>,
    food: Cell,
    direction: Option<Direction>,
    mode: Mode,
    score: u32,
    started: bool,
    collision: Option<Collision>,
    rng: fastrand::Rng,
}

impl SnakeGame {
    pub fn new(mode: Mode) -> Self {
        Self::idle(GRID_SIZE, mode, fastrand::Rng::new())
    }

    /// Same as [`SnakeGame::new`] but with a reproducible food sequence.
    pub fn with_seed(mode: Mode, seed: u64) -> Self {
        Self::idle(GRID_SIZE, mode, fastrand::Rng::with_seed(seed))
    }

    pub fn seeded(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    fn idle(grid_size: i32, mode: Mode, rng: fastrand::Rng) -> Self {
        let (head, food) = initial_cells(grid_size);
        Self {
            grid_size,
            snake: vec![head],
            food,
            direction: None,
            mode,
            score: 0,
            started: false,
            collision: None,
            rng,
        }
    }

    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if self.started {
            debug!("mode change to {} ignored, game already started", mode);
            return false;
        }

        info!("mode set to {}", mode);
        self.mode = mode;
        true
    }

    /// Starts an idle game moving towards `direction`.
    pub fn start(&mut self, direction: Direction) -> bool {
        if self.started || self.is_over() {
            return false;
        }

        info!("start moving {:?} in {} mode", direction, self.mode);
        self.started = true;
        self.direction = Some(direction);
        true
    }

    pub fn request_direction(&mut self, direction: Direction) -> bool {
        if !self.started || self.is_over() {
            return false;
        }

        // if the given direction is not allowed we ignore it
        match self.direction {
            Some(current) if current.allows(&direction) => {
                debug!("turn {:?} -> {:?}", current, direction);
                self.direction = Some(direction);
                true
            }
            _ => false,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.started || self.is_over() {
            return TickOutcome::Idle;
        }
        let Some(direction) = self.direction else {
            return TickOutcome::Idle;
        };

        let mut head = self.head().step(direction);

        if !head.in_grid(self.grid_size) {
            match self.mode {
                Mode::PassThrough => head = head.wrapped(self.grid_size),
                Mode::Walls => return self.game_over(Collision::Wall(head)),
            }
        }

        // the tail still counts: it only moves away after the head moved in
        if self.on_snake(&head) {
            return self.game_over(Collision::Snake(head));
        }

        let food_ate = head == self.food;
        let kept = if food_ate {
            self.snake.len()
        } else {
            self.snake.len() - 1
        };
        self.snake = iter::once(head)
            .chain(self.snake.iter().take(kept).copied())
            .collect();

        if !food_ate {
            return TickOutcome::Moved;
        }

        self.score += FOOD_SCORE;
        info!("food ate at {:?}, score {}", head, self.score);

        match self.create_new_food() {
            Some(food) => {
                self.food = food;
                TickOutcome::Ate
            }
            None => self.game_over(Collision::BoardFull),
        }
    }

    /// Back to the idle configuration. The selected mode is kept.
    pub fn reset(&mut self) {
        info!("reset, score was {}", self.score);

        let (head, food) = initial_cells(self.grid_size);
        self.snake = vec![head];
        self.food = food;
        self.direction = None;
        self.score = 0;
        self.started = false;
        self.collision = None;
    }

    pub fn snapshot(&self) -> SnakeGameSnapshot {
        SnakeGameSnapshot {
            snake: self.snake.clone(),
            food: self.food,
            direction: self.direction,
            mode: self.mode,
            score: self.score,
            started: self.started,
            over: self.is_over(),
            collision: self.collision,
            grid_size: self.grid_size,
        }
    }

    pub fn grid_size(&self) -> i32 {
        self.grid_size
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_over(&self) -> bool {
        self.collision.is_some()
    }

    fn head(&self) -> Cell {
        self.snake[0]
    }

    fn on_snake(&self, position: &Cell) -> bool {
        self.snake.contains(position)
    }

    fn game_over(&mut self, collision: Collision) -> TickOutcome {
        info!("game over: {}", collision);
        self.collision = Some(collision);
        TickOutcome::GameOver(collision)
    }

    fn create_new_food(&mut self) -> Option<Cell> {
        let cells = (self.grid_size as usize).pow(2);
        if self.snake.len() >= cells {
            return None;
        }

        loop {
            let x = self.rng.i32(0..self.grid_size);
            let y = self.rng.i32(0..self.grid_size);
            let position = Cell::new(x, y);

            debug!("position generated {:?}", position);

            if self.on_snake(&position) {
                continue;
            }

            break Some(position);
        }
    }
}

impl Default for SnakeGame {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

impl fmt::Debug for SnakeGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnakeGame")
            .field("grid_size", &self.grid_size)
            .field("snake", &self.snake)
            .field("food", &self.food)
            .field("direction", &self.direction)
            .field("mode", &self.mode)
            .field("score", &self.score)
            .field("started", &self.started)
            .field("collision", &self.collision)
            .finish_non_exhaustive()
    }
}

fn initial_cells(grid_size: i32) -> (Cell, Cell) {
    let head = Cell::new(grid_size / 2, grid_size / 2);
    let food = Cell::new(grid_size * 3 / 4, grid_size * 3 / 4);
    (head, food)
}

fn parse_cell(s: &str) -> Result<Cell, ParseError> {
    let invalid = || ParseError::InvalidCell(s.to_string());
    let (x, y) = s.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse().map_err(|_| invalid())?;
    let y = y.trim().parse().map_err(|_| invalid())?;
    Ok(Cell::new(x, y))
}

fn parse_direction(s: &str) -> Result<Direction, ParseError> {
    parse_cell(s)
        .ok()
        .and_then(|delta| Direction::from_delta(delta.x, delta.y))
        .ok_or_else(|| ParseError::InvalidDirection(s.to_string()))
}

/// Reads a board:
///
/// ```text
/// 20            grid size
/// 15,15         food
/// 10,10;9,10    snake, head first
/// 1,0           optional direction, the game is running if present
/// pass-through  optional mode, walls by default
/// ```
///
/// Snake cells only need to be distinct and on the grid, they are not
/// required to touch each other.
impl FromStr for SnakeGame {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines().map(str::trim).filter(|l| !l.is_empty());

        let grid_size = lines.next().ok_or(ParseError::MissingLine("grid size"))?;
        let grid_size: i32 = grid_size
            .parse()
            .map_err(|_| ParseError::InvalidGridSize(grid_size.to_string()))?;
        if grid_size < MIN_GRID_SIZE {
            return Err(ParseError::GridTooSmall(grid_size));
        }
        if grid_size > MAX_GRID_SIZE {
            return Err(ParseError::GridTooLarge(grid_size));
        }

        let food = parse_cell(lines.next().ok_or(ParseError::MissingLine("food"))?)?;

        let snake = lines
            .next()
            .ok_or(ParseError::MissingLine("snake"))?
            .split(';')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(parse_cell)
            .collect::<Result<Vec<_>, _>>()?;
        if snake.is_empty() {
            return Err(ParseError::EmptySnake);
        }

        if let Some(cell) = snake
            .iter()
            .chain(iter::once(&food))
            .find(|c| !c.in_grid(grid_size))
        {
            return Err(ParseError::OutOfGrid(*cell));
        }
        for (i, cell) in snake.iter().enumerate() {
            if snake[..i].contains(cell) {
                return Err(ParseError::DuplicateCell(*cell));
            }
        }
        if snake.contains(&food) {
            return Err(ParseError::FoodOnSnake(food));
        }

        let mut direction = None;
        let mut mode = Mode::default();
        for line in lines {
            match line.parse::<Mode>() {
                Ok(m) => mode = m,
                Err(_) => direction = Some(parse_direction(line)?),
            }
        }

        Ok(Self {
            grid_size,
            snake,
            food,
            direction,
            mode,
            score: 0,
            started: direction.is_some(),
            collision: None,
            rng: fastrand::Rng::new(),
        })
    }
}

/// Read-only copy of the game handed to renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnakeGameSnapshot {
    pub snake: Vec<Cell>,
    pub food: Cell,
    pub direction: Option<Direction>,
    pub mode: Mode,
    pub score: u32,
    pub started: bool,
    pub over: bool,
    pub collision: Option<Collision>,
    pub grid_size: i32,
}

impl SnakeGameSnapshot {
    pub fn head(&self) -> Cell {
        self.snake[0]
    }
}
