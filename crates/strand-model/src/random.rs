//! Uniformly random models.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strand_core::ValidationError;
use tracing::warn;

use crate::model::{InitialState, TransitionModel};

/// Build a square model of `dimension` states with random weights.
///
/// Every matrix entry and every initial weight is drawn uniformly from
/// `(0, 1]` and rows are then normalized. With a seed the result is
/// reproducible and the model carries that seed (and thus its dedup
/// group); without one the weights come from OS entropy and the model is
/// unseeded.
///
/// # Errors
///
/// [`ValidationError::EmptyMatrix`] when `dimension` is zero.
pub fn random(dimension: usize, seed: Option<u64>) -> Result<TransitionModel, ValidationError> {
    let mut rng = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_rng(&mut rand::rng()),
    };
    let mut weight = || 1.0 - rng.random::<f64>();
    let rows: Vec<Vec<f64>> = (0..dimension)
        .map(|_| (0..dimension).map(|_| weight()).collect())
        .collect();
    let initial: Vec<f64> = (0..dimension).map(|_| weight()).collect();
    TransitionModel::new(&rows, InitialState::Distribution(initial), seed)
}

/// [`random`], reporting failure as a warning instead of an error.
pub fn try_random(dimension: usize, seed: Option<u64>) -> Option<TransitionModel> {
    match random(dimension, seed) {
        Ok(m) => Some(m),
        Err(e) => {
            warn!(dimension, ?seed, error = %e, "random model rejected");
            None
        }
    }
}

impl TransitionModel {
    /// Shorthand for [`random`].
    pub fn random(dimension: usize, seed: Option<u64>) -> Result<Self, ValidationError> {
        random(dimension, seed)
    }
}
