//! Grid world domain and the reach-the-exit task

use std::{fmt, sync::Arc};

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::{Domain, Task},
    td::{params::check_unit, value_table::ValueTable},
};

/// Contents of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Pit,
    Exit,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Pit => 'O',
            Cell::Exit => 'E',
        }
    }

    /// Entering this cell ends the episode
    pub fn is_final(self) -> bool {
        matches!(self, Cell::Pit | Cell::Exit)
    }
}

/// Agent position, `y` grows upward
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridPosition {
    pub x: usize,
    pub y: usize,
}

impl GridPosition {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn arrow(self) -> char {
        match self {
            Direction::Up => '^',
            Direction::Right => '>',
            Direction::Down => 'v',
            Direction::Left => '<',
        }
    }
}

/// Immutable grid layout shared by the domain and its task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl GridMap {
    /// Create an empty `width` × `height` map
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if either side is zero.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_config(format!(
                "grid must be at least 1x1, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        })
    }

    /// Builder-style cell assignment
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `position` is outside the map.
    pub fn with_cell(mut self, position: GridPosition, cell: Cell) -> Result<Self> {
        let index = self.index(position)?;
        self.cells[index] = cell;
        Ok(self)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, position: GridPosition) -> bool {
        position.x < self.width && position.y < self.height
    }

    /// Cell at `position`; positions outside the map read as empty
    pub fn cell(&self, position: GridPosition) -> Cell {
        self.index(position)
            .map(|index| self.cells[index])
            .unwrap_or(Cell::Empty)
    }

    /// Position reached by moving one cell, clamped at the edges
    pub fn step(&self, position: GridPosition, direction: Direction) -> GridPosition {
        let GridPosition { x, y } = position;
        match direction {
            Direction::Up => GridPosition::new(x, (y + 1).min(self.height - 1)),
            Direction::Right => GridPosition::new((x + 1).min(self.width - 1), y),
            Direction::Down => GridPosition::new(x, y.saturating_sub(1)),
            Direction::Left => GridPosition::new(x.saturating_sub(1), y),
        }
    }

    /// All positions, row by row from `y = 0`
    pub fn positions(&self) -> impl Iterator<Item = GridPosition> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| GridPosition::new(x, y)))
    }

    fn index(&self, position: GridPosition) -> Result<usize> {
        if !self.contains(position) {
            return Err(Error::OutOfBounds {
                x: position.x,
                y: position.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(position.y * self.width + position.x)
    }
}

impl fmt::Display for GridMap {
    /// Top row (highest `y`) first
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height).rev() {
            let row: String = (0..self.width)
                .map(|x| self.cell(GridPosition::new(x, y)).to_char())
                .collect();
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Rewards paid by [`ReachExit`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitRewards {
    /// Any move that is not one of the cases below
    pub step: f64,
    /// Entering the exit
    pub exit: f64,
    /// Walking into a wall (position unchanged)
    pub bump: f64,
    /// Falling into a pit
    pub pit: f64,
}

impl Default for ExitRewards {
    fn default() -> Self {
        Self {
            step: -1.0,
            exit: 20.0,
            bump: -5.0,
            pit: -20.0,
        }
    }
}

/// Grid world setup
///
/// # Examples
///
/// ```
/// use tdlab::envs::{GridPosition, GridWorldConfig};
///
/// let config = GridWorldConfig::default()
///     .with_size(4, 4)
///     .with_exit(GridPosition::new(3, 3))
///     .with_pit(GridPosition::new(1, 1));
/// let (world, task) = config.build().unwrap();
/// assert_eq!(world.map().width(), 4);
/// # let _ = task;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridWorldConfig {
    pub width: usize,
    pub height: usize,
    pub start: GridPosition,
    pub exit: GridPosition,
    pub pits: Vec<GridPosition>,
    /// Chance that a move goes in a uniformly random direction instead
    pub slip_probability: f64,
    pub rewards: ExitRewards,
}

impl Default for GridWorldConfig {
    fn default() -> Self {
        Self {
            width: 3,
            height: 3,
            start: GridPosition::new(0, 0),
            exit: GridPosition::new(2, 2),
            pits: Vec::new(),
            slip_probability: 0.0,
            rewards: ExitRewards::default(),
        }
    }
}

impl GridWorldConfig {
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_start(mut self, start: GridPosition) -> Self {
        self.start = start;
        self
    }

    pub fn with_exit(mut self, exit: GridPosition) -> Self {
        self.exit = exit;
        self
    }

    pub fn with_pit(mut self, pit: GridPosition) -> Self {
        self.pits.push(pit);
        self
    }

    pub fn with_slip_probability(mut self, slip_probability: f64) -> Self {
        self.slip_probability = slip_probability;
        self
    }

    pub fn with_rewards(mut self, rewards: ExitRewards) -> Self {
        self.rewards = rewards;
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] or [`Error::OutOfBounds`] for
    /// an unusable layout.
    pub fn validate(&self) -> Result<()> {
        self.map()?;
        check_unit("slip_probability", self.slip_probability)?;
        let ExitRewards {
            step,
            exit,
            bump,
            pit,
        } = self.rewards;
        if [step, exit, bump, pit].iter().any(|r| !r.is_finite()) {
            return Err(Error::invalid_config("rewards must be finite"));
        }
        Ok(())
    }

    /// Build the shared map described by this configuration
    ///
    /// # Errors
    ///
    /// Fails if a position is outside the grid, the exit is a pit, or the
    /// start cell is final.
    pub fn map(&self) -> Result<GridMap> {
        let mut map = GridMap::new(self.width, self.height)?;
        for &pit in &self.pits {
            if pit == self.exit {
                return Err(Error::invalid_config(format!("exit {pit} is also a pit")));
            }
            map = map.with_cell(pit, Cell::Pit)?;
        }
        map = map.with_cell(self.exit, Cell::Exit)?;
        map.index(self.start)?;
        if map.cell(self.start).is_final() {
            return Err(Error::invalid_config(format!(
                "start {} must not be a pit or the exit",
                self.start
            )));
        }
        Ok(map)
    }

    /// Build the domain and its task over one shared map
    pub fn build(&self) -> Result<(GridWorld, ReachExit)> {
        self.validate()?;
        let map = Arc::new(self.map()?);
        let world = GridWorld::new(Arc::clone(&map), self.start)?
            .with_slip_probability(self.slip_probability)?;
        let task = ReachExit::new(map).with_rewards(self.rewards);
        Ok((world, task))
    }
}

/// Grid world domain
///
/// The state is the agent's position. Every direction is legal on ordinary
/// cells and none on final ones (exit, pits); moves off the edge leave the
/// agent in place.
#[derive(Debug, Clone)]
pub struct GridWorld {
    map: Arc<GridMap>,
    start: GridPosition,
    position: GridPosition,
    slip_probability: f64,
    rng: StdRng,
}

impl GridWorld {
    /// Create a deterministic grid world starting at `start`
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `start` is outside the map.
    pub fn new(map: Arc<GridMap>, start: GridPosition) -> Result<Self> {
        map.index(start)?;
        Ok(Self {
            map,
            start,
            position: start,
            slip_probability: 0.0,
            rng: StdRng::from_rng(&mut rand::rng()),
        })
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] outside `[0, 1]`.
    pub fn with_slip_probability(mut self, slip_probability: f64) -> Result<Self> {
        check_unit("slip_probability", slip_probability)?;
        self.slip_probability = slip_probability;
        Ok(self)
    }

    /// Seed the slip randomness
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn map(&self) -> &Arc<GridMap> {
        &self.map
    }

    pub fn start(&self) -> GridPosition {
        self.start
    }

    pub fn position(&self) -> GridPosition {
        self.position
    }
}

impl Domain for GridWorld {
    type State = GridPosition;
    type Action = Direction;

    fn actions(&self, state: &GridPosition) -> Vec<Direction> {
        if self.map.cell(*state).is_final() {
            Vec::new()
        } else {
            Direction::ALL.to_vec()
        }
    }

    fn apply_action(&mut self, action: &Direction) -> Result<()> {
        if !self.actions(&self.position).contains(action) {
            return Err(Error::IllegalAction {
                state: self.position.to_string(),
                action: format!("{action:?}"),
            });
        }
        let mut direction = *action;
        if self.slip_probability > 0.0 && self.rng.random::<f64>() < self.slip_probability {
            if let Some(&slipped) = Direction::ALL.choose(&mut self.rng) {
                direction = slipped;
            }
        }
        self.position = self.map.step(self.position, direction);
        Ok(())
    }

    fn current_state(&self) -> GridPosition {
        self.position
    }

    fn reset(&mut self) {
        self.position = self.start;
    }
}

/// Task: walk to the exit, avoiding walls and pits
#[derive(Debug, Clone)]
pub struct ReachExit {
    map: Arc<GridMap>,
    rewards: ExitRewards,
}

impl ReachExit {
    pub fn new(map: Arc<GridMap>) -> Self {
        Self {
            map,
            rewards: ExitRewards::default(),
        }
    }

    pub fn with_rewards(mut self, rewards: ExitRewards) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn rewards(&self) -> &ExitRewards {
        &self.rewards
    }
}

impl Task<GridWorld> for ReachExit {
    fn reward(&self, state: &GridPosition, _action: &Direction, next_state: &GridPosition) -> f64 {
        if state == next_state {
            return self.rewards.bump;
        }
        match self.map.cell(*next_state) {
            Cell::Exit => self.rewards.exit,
            Cell::Pit => self.rewards.pit,
            Cell::Empty => self.rewards.step,
        }
    }

    fn is_final(&self, state: &GridPosition) -> bool {
        self.map.cell(*state).is_final()
    }
}

/// Render the greedy action of every cell, top row first
///
/// Final cells show their map symbol; `?` marks a tie between several best
/// directions (including cells that were never updated).
pub fn render_policy(map: &GridMap, table: &ValueTable<GridPosition, Direction>) -> String {
    let mut out = String::new();
    for y in (0..map.height()).rev() {
        for x in 0..map.width() {
            let position = GridPosition::new(x, y);
            let cell = map.cell(position);
            let symbol = if cell.is_final() {
                cell.to_char()
            } else {
                match table.best_actions(&position, &Direction::ALL).as_slice() {
                    [only] => only.arrow(),
                    _ => '?',
                }
            };
            out.push(symbol);
        }
        out.push('\n');
    }
    out
}
