//! Linear value-function approximation
//!
//! Extension point for domains too large for a table: action values are the
//! dot product of a weight vector with features produced by a
//! [`FeatureExtractor`].

pub mod linear;

pub use linear::{LinearValueFunction, WeightLayout};

/// Maps a state-action pair to a fixed-length feature vector
pub trait FeatureExtractor<S, A> {
    /// Number of features every vector has
    fn dimension(&self) -> usize;

    /// Features for taking `action` in `state`
    fn features(&self, state: &S, action: &A) -> Vec<f64>;
}
