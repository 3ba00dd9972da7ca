//! Task port - rewards and termination over a domain's transitions

use super::domain::Domain;

/// Reward function and termination rule for a domain.
///
/// Tasks see transitions only as values: `(state, action, next_state)`.
/// They must not depend on the domain's mutable position.
pub trait Task<D: Domain> {
    /// Reward for moving from `state` to `next_state` by `action`.
    fn reward(&self, state: &D::State, action: &D::Action, next_state: &D::State) -> f64;

    /// Whether `state` ends the episode.
    fn is_final(&self, state: &D::State) -> bool;
}
