//! Learning hyperparameters

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Hyperparameters shared by every TD update rule
///
/// # Examples
///
/// ```
/// use tdlab::td::LearningParams;
///
/// let params = LearningParams::default()
///     .with_learning_rate(0.5)
///     .with_discount(0.95)
///     .with_epsilon(0.1);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningParams {
    /// Step size α
    pub learning_rate: f64,
    /// Discount factor γ
    pub discount: f64,
    /// Exploration probability ε
    pub epsilon: f64,
    /// Value of state-action pairs that were never updated
    pub initial_value: f64,
}

impl LearningParams {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_initial_value(mut self, initial_value: f64) -> Self {
        self.initial_value = initial_value;
        self
    }

    /// Greedy, non-learning copy of these parameters (ε = 0, α = 0)
    pub fn frozen(self) -> Self {
        Self {
            learning_rate: 0.0,
            epsilon: 0.0,
            ..self
        }
    }

    /// Check that every parameter is in range
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the first bad parameter.
    pub fn validate(&self) -> Result<()> {
        check_unit("learning_rate", self.learning_rate)?;
        check_unit("discount", self.discount)?;
        check_unit("epsilon", self.epsilon)?;
        if !self.initial_value.is_finite() {
            return Err(Error::invalid_config(format!(
                "initial_value must be finite, got {}",
                self.initial_value
            )));
        }
        Ok(())
    }
}

impl Default for LearningParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.2,
            discount: 0.95,
            epsilon: 0.1,
            initial_value: 0.0,
        }
    }
}

pub(crate) fn check_unit(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid_config(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frozen_keeps_discount_and_initial_value() {
        let params = LearningParams::default()
            .with_discount(0.9)
            .with_initial_value(0.5)
            .frozen();
        assert_eq!(params.learning_rate, 0.0);
        assert_eq!(params.epsilon, 0.0);
        assert_eq!(params.discount, 0.9);
        assert_eq!(params.initial_value, 0.5);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(LearningParams::default().with_epsilon(1.5).validate().is_err());
        assert!(LearningParams::default().with_learning_rate(-0.1).validate().is_err());
        assert!(
            LearningParams::default()
                .with_initial_value(f64::NAN)
                .validate()
                .is_err()
        );
        assert!(LearningParams::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params: LearningParams = serde_json::from_str(r#"{"epsilon": 0.3}"#).unwrap();
        assert_eq!(params.epsilon, 0.3);
        assert_eq!(params.learning_rate, LearningParams::default().learning_rate);
    }
}
