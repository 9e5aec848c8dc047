//! Re-estimating a model's matrix from observed transitions.

use strand_core::ValidationError;

use crate::model::TransitionModel;

/// Blend factors for [`TransitionModel::fit`].
///
/// The fitted row is `prior * old_row + observed * observed_row`, then
/// re-normalized. The defaults discard the old matrix entirely.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitWeights {
    /// Weight of the model's current row.
    pub prior: f64,
    /// Weight of the row estimated from observations.
    pub observed: f64,
}

impl Default for FitWeights {
    fn default() -> Self {
        Self {
            prior: 0.0,
            observed: 1.0,
        }
    }
}

impl FitWeights {
    /// Check that both weights are finite, non-negative, and not both zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let ok = |w: f64| w.is_finite() && w >= 0.0;
        if !ok(self.prior) || !ok(self.observed) || self.prior + self.observed <= 0.0 {
            return Err(ValidationError::InvalidBlend {
                prior: self.prior,
                observed: self.observed,
            });
        }
        Ok(())
    }
}

impl TransitionModel {
    /// Fit a new model to observed `(from, to)` transitions.
    ///
    /// Transitions are counted per source row and row-normalized. Rows
    /// without any observation keep the current row when `prior > 0`
    /// and become uniform otherwise. The initial-state rule and seed are
    /// carried over unchanged.
    ///
    /// Consecutive pairs of a playback are the usual input:
    ///
    /// ```
    /// use strand_model::{FitWeights, InitialState, TransitionModel};
    ///
    /// let prior = TransitionModel::uniform(2, InitialState::Fixed(0), None).unwrap();
    /// let seq = [0, 1, 0, 1, 1];
    /// let fitted = prior
    ///     .fit(seq.windows(2).map(|w| (w[0], w[1])), FitWeights::default())
    ///     .unwrap();
    /// assert_eq!(fitted.matrix_row(0).unwrap(), &[0.0, 1.0]);
    /// assert_eq!(fitted.matrix_row(1).unwrap(), &[0.5, 0.5]);
    /// ```
    ///
    /// # Errors
    ///
    /// Invalid blend weights, or a pair outside the model's shape.
    pub fn fit<I>(&self, pairs: I, weights: FitWeights) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        weights.validate()?;
        let (inputs, outputs) = self.shape();
        let mut counts = vec![vec![0u64; outputs]; inputs];
        for (from, to) in pairs {
            if from >= inputs || to >= outputs {
                return Err(ValidationError::TransitionOutOfRange {
                    from,
                    to,
                    size: inputs.max(outputs),
                });
            }
            counts[from][to] += 1;
        }

        let mut rows = Vec::with_capacity(inputs);
        for (i, row_counts) in counts.iter().enumerate() {
            let old = self.matrix_row(i).unwrap_or(&[]);
            let total: u64 = row_counts.iter().sum();
            let row: Vec<f64> = if total == 0 {
                if weights.prior > 0.0 {
                    old.to_vec()
                } else {
                    vec![1.0; outputs]
                }
            } else {
                row_counts
                    .iter()
                    .zip(old)
                    .map(|(&c, &p)| {
                        weights.prior * p + weights.observed * (c as f64 / total as f64)
                    })
                    .collect()
            };
            rows.push(row);
        }

        Self::build(&rows, self.initial_state().clone(), self.seed(), false)
    }
}
