//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use tdlab::{
    Domain, Result, Task,
    envs::{ExitRewards, GridWorld, GridWorldConfig, ReachExit},
};

/// Moves along a [`Chain`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Back,
    Forward,
}

/// Cells `0..len`; `Back` at cell 0 stays put, reaching `len - 1` ends the episode.
#[derive(Debug, Clone)]
pub struct Chain {
    pub len: usize,
    pub position: usize,
}

impl Chain {
    pub fn new(len: usize) -> Self {
        Self { len, position: 0 }
    }
}

impl Domain for Chain {
    type State = usize;
    type Action = Move;

    fn actions(&self, state: &usize) -> Vec<Move> {
        if *state + 1 >= self.len {
            Vec::new()
        } else {
            vec![Move::Back, Move::Forward]
        }
    }

    fn apply_action(&mut self, action: &Move) -> Result<()> {
        self.position = match action {
            Move::Back => self.position.saturating_sub(1),
            Move::Forward => (self.position + 1).min(self.len - 1),
        };
        Ok(())
    }

    fn current_state(&self) -> usize {
        self.position
    }

    fn reset(&mut self) {
        self.position = 0;
    }
}

/// Pays 1.0 for reaching the end of the chain, nothing otherwise
pub struct ReachEnd {
    pub len: usize,
}

impl Task<Chain> for ReachEnd {
    fn reward(&self, _state: &usize, _action: &Move, next_state: &usize) -> f64 {
        if self.is_final(next_state) { 1.0 } else { 0.0 }
    }

    fn is_final(&self, state: &usize) -> bool {
        *state + 1 >= self.len
    }
}

/// Deterministic 3x3 grid with the exit in the top-right corner and a
/// bump cost equal to the step cost
pub fn small_grid() -> (GridWorld, ReachExit) {
    GridWorldConfig::default()
        .with_rewards(ExitRewards {
            step: -1.0,
            exit: 20.0,
            bump: -1.0,
            ..ExitRewards::default()
        })
        .build()
        .expect("default grid is valid")
}
