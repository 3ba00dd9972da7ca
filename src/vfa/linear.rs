//! Linear action-value function with semi-gradient updates

use std::{collections::HashMap, marker::PhantomData};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, ports::Key, vfa::FeatureExtractor};

/// How weights are shared between actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightLayout {
    /// One weight vector per action; features usually describe the state only
    #[default]
    PerAction,
    /// A single weight vector; features must encode the action
    Shared,
}

/// Q(s, a) = w · φ(s, a)
pub struct LinearValueFunction<S, A: Key, F: FeatureExtractor<S, A>> {
    extractor: F,
    layout: WeightLayout,
    initial_weight: f64,
    default_weights: Vec<f64>,
    shared: Vec<f64>,
    per_action: HashMap<A, Vec<f64>>,
    _state: PhantomData<fn(&S)>,
}

impl<S, A: Key, F: FeatureExtractor<S, A>> LinearValueFunction<S, A, F> {
    /// Create a value function with every weight set to `initial_weight`
    pub fn new(extractor: F, layout: WeightLayout, initial_weight: f64) -> Self {
        let dimension = extractor.dimension();
        Self {
            extractor,
            layout,
            initial_weight,
            default_weights: vec![initial_weight; dimension],
            shared: vec![initial_weight; dimension],
            per_action: HashMap::new(),
            _state: PhantomData,
        }
    }

    pub fn layout(&self) -> WeightLayout {
        self.layout
    }

    pub fn dimension(&self) -> usize {
        self.default_weights.len()
    }

    /// Weights used to value `action`
    pub fn weights(&self, action: &A) -> &[f64] {
        match self.layout {
            WeightLayout::Shared => &self.shared,
            WeightLayout::PerAction => self
                .per_action
                .get(action)
                .map(Vec::as_slice)
                .unwrap_or(&self.default_weights),
        }
    }

    /// Feature vector for a pair, checked against the configured dimension
    ///
    /// # Errors
    ///
    /// Returns [`Error::FeatureLength`] if the extractor breaks its own
    /// dimension.
    pub fn features(&self, state: &S, action: &A) -> Result<Vec<f64>> {
        let features = self.extractor.features(state, action);
        if features.len() != self.dimension() {
            return Err(Error::FeatureLength {
                expected: self.dimension(),
                got: features.len(),
            });
        }
        Ok(features)
    }

    pub fn action_value(&self, state: &S, action: &A) -> Result<f64> {
        let features = self.features(state, action)?;
        Ok(dot(self.weights(action), &features))
    }

    /// All legal actions whose value equals the maximum exactly
    pub fn best_actions(&self, state: &S, legal_actions: &[A]) -> Result<Vec<A>> {
        let mut best = Vec::new();
        let mut best_value = f64::NEG_INFINITY;
        for action in legal_actions {
            let value = self.action_value(state, action)?;
            if value > best_value {
                best_value = value;
                best.clear();
                best.push(action.clone());
            } else if value == best_value {
                best.push(action.clone());
            }
        }
        Ok(best)
    }

    /// Move Q(state, action) toward `target`
    ///
    /// `w += learning_rate · (target − Q) · φ`. Returns the error before the
    /// update.
    pub fn update(&mut self, state: &S, action: &A, target: f64, learning_rate: f64) -> Result<f64> {
        let features = self.features(state, action)?;
        let error = target - dot(self.weights(action), &features);
        let weights = match self.layout {
            WeightLayout::Shared => &mut self.shared,
            WeightLayout::PerAction => self
                .per_action
                .entry(action.clone())
                .or_insert_with(|| self.default_weights.clone()),
        };
        for (weight, feature) in weights.iter_mut().zip(&features) {
            *weight += learning_rate * error * feature;
        }
        Ok(error)
    }

    /// Set every weight back to `initial_weight`
    pub fn reset(&mut self) {
        self.per_action.clear();
        self.shared.fill(self.initial_weight);
    }
}

fn dot(weights: &[f64], features: &[f64]) -> f64 {
    weights.iter().zip(features).map(|(w, x)| w * x).sum()
}
