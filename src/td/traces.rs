//! Replacing eligibility traces for backward-view TD updates

use std::collections::HashMap;

use crate::ports::Key;

/// Traces this small are dropped instead of decayed further.
const MIN_TRACE: f64 = 1e-12;

/// Eligibility trace table keyed by state-action pair
///
/// Every step all traces decay by λ and the pair just visited is pinned to
/// 1.0. A revisit therefore resets the trace instead of accumulating it.
#[derive(Debug, Clone, PartialEq)]
pub struct EligibilityTraces<S: Key, A: Key> {
    lambda: f64,
    traces: HashMap<(S, A), f64>,
}

impl<S: Key, A: Key> EligibilityTraces<S, A> {
    /// Create an empty trace table decaying by `lambda` per step
    pub fn new(lambda: f64) -> Self {
        Self {
            lambda,
            traces: HashMap::new(),
        }
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Decay every trace, then pin the visited pair to 1.0
    pub fn visit(&mut self, state: S, action: A) {
        self.decay();
        self.traces.insert((state, action), 1.0);
    }

    /// Multiply every trace by λ, dropping negligible ones
    pub fn decay(&mut self) {
        let lambda = self.lambda;
        self.traces.retain(|_, trace| {
            *trace *= lambda;
            *trace >= MIN_TRACE
        });
    }

    /// Trace weight of a pair, 0.0 if untraced
    pub fn get(&self, state: &S, action: &A) -> f64 {
        self.traces
            .get(&(state.clone(), action.clone()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Iterate over traced pairs and their weights
    pub fn iter(&self) -> impl Iterator<Item = (&S, &A, f64)> {
        self.traces
            .iter()
            .map(|((state, action), trace)| (state, action, *trace))
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Forget all traces (episode boundary)
    pub fn clear(&mut self) {
        self.traces.clear();
    }
}
