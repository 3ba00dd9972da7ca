//! Domain port - the environment an agent acts in
//!
//! A domain owns the simulation position, reports which actions are legal in a
//! state and advances when an action is applied. States and actions are plain
//! values: two states describing the same configuration must compare equal
//! and hash identically, so they can key a value table.

use std::{fmt::Debug, hash::Hash};

use crate::Result;

/// Bound shared by state and action identifiers.
///
/// Blanket-implemented for every `Clone + Eq + Hash + Debug` type.
pub trait Key: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Key for T {}

/// Environment that accepts actions and yields states.
///
/// # Examples
///
/// ```
/// use tdlab::ports::Domain;
///
/// /// A corridor of `len` cells; the only action is stepping right.
/// struct Corridor {
///     pos: usize,
///     len: usize,
/// }
///
/// impl Domain for Corridor {
///     type State = usize;
///     type Action = ();
///
///     fn actions(&self, state: &usize) -> Vec<()> {
///         if *state + 1 < self.len { vec![()] } else { Vec::new() }
///     }
///
///     fn apply_action(&mut self, _action: &()) -> tdlab::Result<()> {
///         self.pos = (self.pos + 1).min(self.len - 1);
///         Ok(())
///     }
///
///     fn current_state(&self) -> usize {
///         self.pos
///     }
///
///     fn reset(&mut self) {
///         self.pos = 0;
///     }
/// }
///
/// let mut corridor = Corridor { pos: 0, len: 3 };
/// corridor.apply_action(&()).unwrap();
/// assert_eq!(corridor.current_state(), 1);
/// ```
pub trait Domain {
    /// Canonical description of the domain's configuration.
    type State: Key;

    /// One legal move.
    type Action: Key;

    /// Actions legal in `state`.
    ///
    /// Terminal states may report no actions; non-terminal states must
    /// report at least one.
    fn actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Apply `action` at the current position.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IllegalAction`] when the action is not legal in
    /// the current state.
    fn apply_action(&mut self, action: &Self::Action) -> Result<()>;

    /// Snapshot of the current position.
    fn current_state(&self) -> Self::State;

    /// Return to the start configuration.
    fn reset(&mut self);
}
