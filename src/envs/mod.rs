//! Concrete domains
//!
//! The grid world is the reference environment: a rectangular map with an
//! exit and optional pits, where the agent pays for every step and for
//! walking into walls.

pub mod features;
pub mod gridworld;

pub use features::{BinnedPosition, DirectionFeatures};
pub use gridworld::{
    Cell, Direction, ExitRewards, GridMap, GridPosition, GridWorld, GridWorldConfig, ReachExit,
    render_policy,
};
