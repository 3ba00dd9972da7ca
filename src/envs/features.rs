//! Grid world feature extractors for linear value functions

use crate::{
    envs::gridworld::{Direction, GridMap, GridPosition},
    vfa::FeatureExtractor,
};

/// One-hot indicator of the `square_size` × `square_size` block containing
/// the agent; the action is ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinnedPosition {
    square_size: usize,
    bins_x: usize,
    bins_y: usize,
}

impl BinnedPosition {
    /// Bin `map` into blocks of `square_size` cells (a zero size is treated as 1)
    pub fn new(map: &GridMap, square_size: usize) -> Self {
        let square_size = square_size.max(1);
        Self {
            square_size,
            bins_x: map.width().div_ceil(square_size),
            bins_y: map.height().div_ceil(square_size),
        }
    }

    fn encode(&self, position: &GridPosition) -> Vec<f64> {
        let mut phi = vec![0.0; self.bins_x * self.bins_y];
        let bin_x = (position.x / self.square_size).min(self.bins_x - 1);
        let bin_y = (position.y / self.square_size).min(self.bins_y - 1);
        phi[bin_x * self.bins_y + bin_y] = 1.0;
        phi
    }
}

impl FeatureExtractor<GridPosition, Direction> for BinnedPosition {
    fn dimension(&self) -> usize {
        self.bins_x * self.bins_y
    }

    fn features(&self, state: &GridPosition, _action: &Direction) -> Vec<f64> {
        self.encode(state)
    }
}

/// Binned position followed by two direction columns: vertical (+1 up,
/// −1 down) and horizontal (+1 right, −1 left)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionFeatures {
    position: BinnedPosition,
}

impl DirectionFeatures {
    pub fn new(map: &GridMap, square_size: usize) -> Self {
        Self {
            position: BinnedPosition::new(map, square_size),
        }
    }
}

impl FeatureExtractor<GridPosition, Direction> for DirectionFeatures {
    fn dimension(&self) -> usize {
        self.position.dimension() + 2
    }

    fn features(&self, state: &GridPosition, action: &Direction) -> Vec<f64> {
        let (vertical, horizontal) = match action {
            Direction::Up => (1.0, 0.0),
            Direction::Down => (-1.0, 0.0),
            Direction::Right => (0.0, 1.0),
            Direction::Left => (0.0, -1.0),
        };
        let mut phi = self.position.encode(state);
        phi.push(vertical);
        phi.push(horizontal);
        phi
    }
}
