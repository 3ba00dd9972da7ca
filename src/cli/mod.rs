//! CLI infrastructure for the tdlab experimentation toolkit
//!
//! This module provides the command-line interface for training single
//! agents and running multi-trial experiments on the grid world.

pub mod commands;
pub mod config;
pub mod output;
