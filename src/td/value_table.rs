//! Value table for temporal difference learning

use std::collections::HashMap;

use crate::ports::Key;

/// Value table mapping (state, action) pairs to action-value estimates
///
/// Pairs that were never written read as the configured initial value, so
/// optimistic or pessimistic initialization is an explicit choice. Entries
/// are grouped per state; there is at most one entry per pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTable<S: Key, A: Key> {
    /// Action values: state -> action -> value
    values: HashMap<S, HashMap<A, f64>>,
    /// Value reported for unseen state-action pairs
    initial_value: f64,
}

impl<S: Key, A: Key> ValueTable<S, A> {
    /// Create an empty table reading `initial_value` for unseen pairs
    pub fn new(initial_value: f64) -> Self {
        Self {
            values: HashMap::new(),
            initial_value,
        }
    }

    /// Value reported for pairs that were never set
    pub fn initial_value(&self) -> f64 {
        self.initial_value
    }

    /// Get the value of a state-action pair
    pub fn get(&self, state: &S, action: &A) -> f64 {
        self.values
            .get(state)
            .and_then(|actions| actions.get(action))
            .copied()
            .unwrap_or(self.initial_value)
    }

    /// Overwrite the value of a state-action pair
    pub fn set(&mut self, state: S, action: A, value: f64) {
        self.values.entry(state).or_default().insert(action, value);
    }

    /// Every legal action whose value equals the maximum
    ///
    /// Ties are compared with exact equality and all of them are kept: early
    /// in training most actions still share the initial value. The result
    /// preserves the order of `legal_actions` and is empty when
    /// `legal_actions` is.
    pub fn best_actions(&self, state: &S, legal_actions: &[A]) -> Vec<A> {
        let mut best = Vec::new();
        let mut best_value = f64::NEG_INFINITY;

        for action in legal_actions {
            let value = self.get(state, action);
            if value > best_value {
                best_value = value;
                best.clear();
                best.push(action.clone());
            } else if value == best_value {
                best.push(action.clone());
            }
        }

        best
    }

    /// Maximum value over legal actions, `None` if there are none
    pub fn max_value(&self, state: &S, legal_actions: &[A]) -> Option<f64> {
        legal_actions
            .iter()
            .map(|action| self.get(state, action))
            .reduce(f64::max)
    }

    /// Mean value over `actions`, `None` if there are none
    pub(crate) fn mean_value(&self, state: &S, actions: &[A]) -> Option<f64> {
        if actions.is_empty() {
            return None;
        }
        let total: f64 = actions.iter().map(|action| self.get(state, action)).sum();
        Some(total / actions.len() as f64)
    }

    /// Iterate over the stored (state, action, value) entries
    pub fn iter(&self) -> impl Iterator<Item = (&S, &A, f64)> {
        self.values.iter().flat_map(|(state, actions)| {
            actions
                .iter()
                .map(move |(action, value)| (state, action, *value))
        })
    }

    /// Number of states with at least one stored value
    pub fn state_count(&self) -> usize {
        self.values.len()
    }

    /// Number of stored state-action values
    pub fn len(&self) -> usize {
        self.values.values().map(HashMap::len).sum()
    }

    /// Whether no value has been stored yet
    pub fn is_empty(&self) -> bool {
        self.values.values().all(HashMap::is_empty)
    }

    /// Drop all stored values
    pub fn clear(&mut self) {
        self.values.clear();
    }
}
