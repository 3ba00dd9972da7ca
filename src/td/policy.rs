//! Epsilon-greedy action selection over a value table

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, ports::Key, td::value_table::ValueTable};

/// ε-greedy policy
///
/// Explores with probability ε by picking uniformly among all legal actions
/// (which may include the greedy ones), otherwise picks uniformly among the
/// tied best actions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpsilonGreedy {
    epsilon: f64,
}

impl EpsilonGreedy {
    /// Create a policy exploring with probability `epsilon`
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Fully greedy policy (ε = 0)
    pub fn greedy() -> Self {
        Self::new(0.0)
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Choose an action in `state`
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActionsAvailable`] if `legal_actions` is empty.
    pub fn select<S, A, R>(
        &self,
        table: &ValueTable<S, A>,
        state: &S,
        legal_actions: &[A],
        rng: &mut R,
    ) -> Result<A>
    where
        S: Key,
        A: Key,
        R: Rng,
    {
        if legal_actions.is_empty() {
            return Err(no_actions(state));
        }

        if rng.random::<f64>() < self.epsilon {
            // Explore
            return legal_actions
                .choose(rng)
                .cloned()
                .ok_or_else(|| no_actions(state));
        }

        // Exploit, breaking ties uniformly
        let best = table.best_actions(state, legal_actions);
        best.choose(rng).cloned().ok_or_else(|| no_actions(state))
    }

    /// Probability of each legal action under this policy
    ///
    /// Returned in the order of `legal_actions`; empty if there are none.
    pub fn action_probabilities<S: Key, A: Key>(
        &self,
        table: &ValueTable<S, A>,
        state: &S,
        legal_actions: &[A],
    ) -> Vec<(A, f64)> {
        if legal_actions.is_empty() {
            return Vec::new();
        }

        let best = table.best_actions(state, legal_actions);
        let explore_mass = self.epsilon / legal_actions.len() as f64;
        let greedy_mass = if best.is_empty() {
            0.0
        } else {
            (1.0 - self.epsilon) / best.len() as f64
        };

        legal_actions
            .iter()
            .map(|action| {
                let p = if best.contains(action) {
                    explore_mass + greedy_mass
                } else {
                    explore_mass
                };
                (action.clone(), p)
            })
            .collect()
    }
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self::new(0.1)
    }
}

fn no_actions<S: Key>(state: &S) -> Error {
    Error::NoActionsAvailable {
        state: format!("{state:?}"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn table_with_tie() -> ValueTable<u8, char> {
        let mut table = ValueTable::new(0.0);
        table.set(0, 'a', 1.0);
        table.set(0, 'b', 1.0);
        table.set(0, 'c', -1.0);
        table
    }

    #[test]
    fn test_greedy_only_picks_best_actions() {
        let table = table_with_tie();
        let policy = EpsilonGreedy::greedy();
        let mut rng = StdRng::seed_from_u64(7);

        let mut counts: HashMap<char, usize> = HashMap::new();
        for _ in 0..2_000 {
            let action = policy.select(&table, &0, &['a', 'b', 'c'], &mut rng).unwrap();
            *counts.entry(action).or_default() += 1;
        }

        assert_eq!(counts.get(&'c'), None);
        // Uniform tie-break: both tied actions are chosen roughly equally often
        let a = counts[&'a'] as f64 / 2_000.0;
        assert!((a - 0.5).abs() < 0.05, "tie-break frequency was {a}");
    }

    #[test]
    fn test_full_exploration_reaches_every_action() {
        let table = table_with_tie();
        let policy = EpsilonGreedy::new(1.0);
        let mut rng = StdRng::seed_from_u64(11);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(policy.select(&table, &0, &['a', 'b', 'c'], &mut rng).unwrap());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_no_actions_is_an_error() {
        let table: ValueTable<u8, char> = ValueTable::new(0.0);
        let mut rng = StdRng::seed_from_u64(0);
        let err = EpsilonGreedy::greedy()
            .select(&table, &4, &[], &mut rng)
            .unwrap_err();
        assert!(matches!(err, Error::NoActionsAvailable { .. }));
    }

    #[test]
    fn test_action_probabilities_sum_to_one() {
        let table = table_with_tie();
        let probs = EpsilonGreedy::new(0.3).action_probabilities(&table, &0, &['a', 'b', 'c']);

        let total: f64 = probs.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-12);
        // best: 0.1 + 0.35, other: 0.1
        assert!((probs[0].1 - 0.45).abs() < 1e-12);
        assert!((probs[2].1 - 0.1).abs() < 1e-12);
    }
}
