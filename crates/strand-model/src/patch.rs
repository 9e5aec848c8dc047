//! Override record for deriving model variants.

use crate::model::InitialState;

/// Fields to replace when deriving a variant of a [`TransitionModel`].
///
/// Every field is optional; `None` keeps the source model's value. The
/// seed is doubly optional so that a variant can explicitly drop the seed
/// (`Some(None)`) as well as keep or replace it.
///
/// [`TransitionModel`]: crate::TransitionModel
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelPatch {
    /// Replacement matrix rows (re-normalized on application).
    pub matrix: Option<Vec<Vec<f64>>>,
    /// Replacement initial-state rule.
    pub initial: Option<InitialState>,
    /// Replacement seed.
    pub seed: Option<Option<u64>>,
}

impl ModelPatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the matrix.
    pub fn matrix(mut self, rows: Vec<Vec<f64>>) -> Self {
        self.matrix = Some(rows);
        self
    }

    /// Replace the initial-state rule.
    pub fn initial(mut self, initial: InitialState) -> Self {
        self.initial = Some(initial);
        self
    }

    /// Replace the seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(Some(seed));
        self
    }

    /// Drop the seed, moving the variant into the unseeded group.
    pub fn unseeded(mut self) -> Self {
        self.seed = Some(None);
        self
    }

    /// Whether applying this patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.matrix.is_none() && self.initial.is_none() && self.seed.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let p = ModelPatch::new()
            .matrix(vec![vec![1.0]])
            .initial(InitialState::Fixed(0))
            .seed(3);
        assert_eq!(p.matrix, Some(vec![vec![1.0]]));
        assert_eq!(p.seed, Some(Some(3)));
        assert!(!p.is_empty());
    }

    #[test]
    fn unseeded_is_not_empty() {
        assert!(ModelPatch::new().is_empty());
        assert!(!ModelPatch::new().unseeded().is_empty());
    }
}
