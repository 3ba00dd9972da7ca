//! TD-control update rules
//!
//! Every rule shares the same shell
//!
//! ```text
//! Q(s,a) ← Q(s,a) + α [r + γ·target − Q(s,a)]
//! ```
//!
//! and differs only in how `target` is read from the next state. A terminal
//! next state always has `target = 0`.

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::Key,
    td::{
        params::LearningParams, policy::EpsilonGreedy, traces::EligibilityTraces,
        value_table::ValueTable,
    },
};

/// Successor of a transition as seen by an update rule
#[derive(Debug, Clone, Copy)]
pub enum NextState<'a, S, A> {
    /// The episode ended; no future value
    Terminal,
    /// The episode continues from `state`
    Continuing {
        state: &'a S,
        /// Actions legal in `state`
        legal_actions: &'a [A],
        /// Action the policy will take next (needed by on-policy rules)
        next_action: Option<&'a A>,
    },
}

/// One observed transition `(s, a, r, s')`
#[derive(Debug, Clone, Copy)]
pub struct Transition<'a, S, A> {
    pub state: &'a S,
    pub action: &'a A,
    pub reward: f64,
    pub next: NextState<'a, S, A>,
}

/// TD-control algorithm
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpdateRule {
    /// On-policy: target is Q(s', a') for the action actually taken next
    #[default]
    Sarsa,
    /// Expectation of Q(s', ·) under the current ε-greedy policy
    ExpectedSarsa,
    /// Off-policy: target is max_a Q(s', a)
    QLearning,
    /// SARSA target, error applied along replacing eligibility traces
    SarsaLambda { lambda: f64 },
}

impl UpdateRule {
    /// Short label used in reports and file names
    pub fn label(&self) -> &'static str {
        match self {
            UpdateRule::Sarsa => "sarsa",
            UpdateRule::ExpectedSarsa => "expected-sarsa",
            UpdateRule::QLearning => "q-learning",
            UpdateRule::SarsaLambda { .. } => "sarsa-lambda",
        }
    }

    /// Trace decay λ for backward-view rules
    pub fn trace_decay(&self) -> Option<f64> {
        match self {
            UpdateRule::SarsaLambda { lambda } => Some(*lambda),
            _ => None,
        }
    }

    /// Check rule-specific parameters
    pub fn validate(&self) -> Result<()> {
        if let Some(lambda) = self.trace_decay() {
            crate::td::params::check_unit("lambda", lambda)?;
        }
        Ok(())
    }

    /// Whether the target depends on the next action
    pub fn is_on_policy(&self) -> bool {
        matches!(self, UpdateRule::Sarsa | UpdateRule::SarsaLambda { .. })
    }

    /// Bootstrap target read from the successor state
    ///
    /// `policy` is the behaviour policy; only Expected SARSA reads it.
    ///
    /// # Errors
    ///
    /// - [`Error::NoActionsAvailable`] if a continuing successor has no legal actions
    /// - [`Error::MissingNextAction`] if an on-policy rule gets no next action
    pub fn compute_target<S: Key, A: Key>(
        &self,
        table: &ValueTable<S, A>,
        next: &NextState<'_, S, A>,
        policy: &EpsilonGreedy,
    ) -> Result<f64> {
        let (state, legal_actions, next_action) = match next {
            NextState::Terminal => return Ok(0.0),
            NextState::Continuing {
                state,
                legal_actions,
                next_action,
            } => (*state, *legal_actions, *next_action),
        };

        match self {
            UpdateRule::Sarsa | UpdateRule::SarsaLambda { .. } => {
                let action = next_action.ok_or_else(|| Error::MissingNextAction {
                    state: format!("{state:?}"),
                })?;
                Ok(table.get(state, action))
            }
            UpdateRule::QLearning => table
                .max_value(state, legal_actions)
                .ok_or_else(|| no_actions(state)),
            UpdateRule::ExpectedSarsa => {
                expected_value(table, state, legal_actions, policy.epsilon())
            }
        }
    }

    /// Apply one update for `transition` and return the TD error
    ///
    /// Backward-view rules need `traces`; the visited pair is pinned to 1.0
    /// before the error is spread over every traced pair. Other rules ignore
    /// `traces`.
    pub fn apply<S: Key, A: Key>(
        &self,
        table: &mut ValueTable<S, A>,
        traces: Option<&mut EligibilityTraces<S, A>>,
        transition: &Transition<'_, S, A>,
        params: &LearningParams,
    ) -> Result<f64> {
        let policy = EpsilonGreedy::new(params.epsilon);
        let target = self.compute_target(table, &transition.next, &policy)?;
        let old_value = table.get(transition.state, transition.action);
        let error = transition.reward + params.discount * target - old_value;

        match (self.trace_decay(), traces) {
            (Some(_), Some(traces)) => {
                traces.visit(transition.state.clone(), transition.action.clone());
                let updates: Vec<(S, A, f64)> = traces
                    .iter()
                    .map(|(state, action, trace)| {
                        let value = table.get(state, action)
                            + params.learning_rate * trace * error;
                        (state.clone(), action.clone(), value)
                    })
                    .collect();
                for (state, action, value) in updates {
                    table.set(state, action, value);
                }
            }
            _ => {
                table.set(
                    transition.state.clone(),
                    transition.action.clone(),
                    old_value + params.learning_rate * error,
                );
            }
        }

        Ok(error)
    }
}

/// Expected action value under an ε-greedy policy
///
/// `(1 − ε)` of the mass is spread evenly over the best actions and `ε`
/// evenly over all legal actions.
fn expected_value<S: Key, A: Key>(
    table: &ValueTable<S, A>,
    state: &S,
    legal_actions: &[A],
    epsilon: f64,
) -> Result<f64> {
    let uniform = table
        .mean_value(state, legal_actions)
        .ok_or_else(|| no_actions(state))?;

    let best = table.best_actions(state, legal_actions);
    match table.mean_value(state, &best) {
        Some(greedy) => Ok((1.0 - epsilon) * greedy + epsilon * uniform),
        None => Ok(uniform),
    }
}

fn no_actions<S: Key>(state: &S) -> Error {
    Error::NoActionsAvailable {
        state: format!("{state:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIONS: [char; 3] = ['a', 'b', 'c'];

    fn params() -> LearningParams {
        LearningParams {
            learning_rate: 0.5,
            discount: 0.9,
            epsilon: 0.2,
            initial_value: 0.0,
        }
    }

    fn table() -> ValueTable<u8, char> {
        let mut table = ValueTable::new(0.0);
        table.set(1, 'a', 1.0);
        table.set(1, 'b', 2.0);
        table.set(1, 'c', 4.0);
        table
    }

    fn continuing<'a>(next_action: Option<&'a char>) -> NextState<'a, u8, char> {
        NextState::Continuing {
            state: &1,
            legal_actions: &ACTIONS,
            next_action,
        }
    }

    #[test]
    fn test_sarsa_target_uses_next_action() {
        let target = UpdateRule::Sarsa
            .compute_target(&table(), &continuing(Some(&'a')), &EpsilonGreedy::new(0.2))
            .unwrap();
        assert_eq!(target, 1.0);
    }

    #[test]
    fn test_sarsa_without_next_action_fails() {
        let err = UpdateRule::Sarsa
            .compute_target(&table(), &continuing(None), &EpsilonGreedy::new(0.2))
            .unwrap_err();
        assert!(matches!(err, Error::MissingNextAction { .. }));
    }

    #[test]
    fn test_q_learning_target_is_max() {
        let target = UpdateRule::QLearning
            .compute_target(&table(), &continuing(Some(&'a')), &EpsilonGreedy::new(0.2))
            .unwrap();
        assert_eq!(target, 4.0);
    }

    #[test]
    fn test_expected_sarsa_target() {
        let target = UpdateRule::ExpectedSarsa
            .compute_target(&table(), &continuing(None), &EpsilonGreedy::new(0.3))
            .unwrap();
        // 0.7 * 4 + 0.3 * (7 / 3)
        let expected = 0.7 * 4.0 + 0.3 * (7.0 / 3.0);
        assert!((target - expected).abs() < 1e-12);
    }

    #[test]
    fn test_expected_sarsa_with_ties() {
        let mut table = table();
        table.set(1, 'b', 4.0);
        let target = UpdateRule::ExpectedSarsa
            .compute_target(&table, &continuing(None), &EpsilonGreedy::new(0.5))
            .unwrap();
        let expected = 0.5 * 4.0 + 0.5 * (9.0 / 3.0);
        assert!((target - expected).abs() < 1e-12);
    }

    #[test]
    fn test_continuing_without_actions_fails() {
        let next = NextState::Continuing {
            state: &1u8,
            legal_actions: &[],
            next_action: None,
        };
        let err = UpdateRule::QLearning
            .compute_target(&table(), &next, &EpsilonGreedy::new(0.0))
            .unwrap_err();
        assert!(matches!(err, Error::NoActionsAvailable { .. }));
    }

    #[test]
    fn test_terminal_target_is_zero_for_every_rule() {
        let rules = [
            UpdateRule::Sarsa,
            UpdateRule::ExpectedSarsa,
            UpdateRule::QLearning,
            UpdateRule::SarsaLambda { lambda: 0.9 },
        ];
        for rule in rules {
            let target = rule
                .compute_target(&table(), &NextState::Terminal, &EpsilonGreedy::new(0.2))
                .unwrap();
            assert_eq!(target, 0.0, "{}", rule.label());
        }
    }

    #[test]
    fn test_apply_moves_estimate_toward_target() {
        let mut table = table();
        let transition = Transition {
            state: &0u8,
            action: &'a',
            reward: 1.0,
            next: continuing(Some(&'c')),
        };
        let error = UpdateRule::Sarsa
            .apply(&mut table, None, &transition, &params())
            .unwrap();

        // δ = 1 + 0.9 * 4 - 0 = 4.6, Q = 0 + 0.5 * 4.6
        assert!((error - 4.6).abs() < 1e-12);
        assert!((table.get(&0, &'a') - 2.3).abs() < 1e-12);
    }

    #[test]
    fn test_apply_terminal_ignores_stored_successor_values() {
        let mut table = table();
        table.set(0, 'a', 1.0);
        let transition = Transition {
            state: &0u8,
            action: &'a',
            reward: 3.0,
            next: NextState::Terminal,
        };
        UpdateRule::QLearning
            .apply(&mut table, None, &transition, &params())
            .unwrap();
        assert!((table.get(&0, &'a') - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_apply_with_traces_updates_history() {
        let mut table: ValueTable<u8, char> = ValueTable::new(0.0);
        let mut traces = EligibilityTraces::new(0.5);
        let rule = UpdateRule::SarsaLambda { lambda: 0.5 };
        let params = params();

        let first = Transition {
            state: &0u8,
            action: &'a',
            reward: 0.0,
            next: NextState::Continuing {
                state: &1,
                legal_actions: &ACTIONS,
                next_action: Some(&'b'),
            },
        };
        rule.apply(&mut table, Some(&mut traces), &first, &params)
            .unwrap();
        assert_eq!(table.get(&0, &'a'), 0.0);

        let second = Transition {
            state: &1u8,
            action: &'b',
            reward: 10.0,
            next: NextState::Terminal,
        };
        rule.apply(&mut table, Some(&mut traces), &second, &params)
            .unwrap();

        // δ = 10; (1,b) trace 1.0, (0,a) trace 0.5
        assert!((table.get(&1, &'b') - 5.0).abs() < 1e-12);
        assert!((table.get(&0, &'a') - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_rule_serde_tagging() {
        let json = serde_json::to_string(&UpdateRule::SarsaLambda { lambda: 0.8 }).unwrap();
        assert_eq!(json, r#"{"kind":"sarsa_lambda","lambda":0.8}"#);
        let rule: UpdateRule = serde_json::from_str(r#"{"kind":"q_learning"}"#).unwrap();
        assert_eq!(rule, UpdateRule::QLearning);
    }
}
