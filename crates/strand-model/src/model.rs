//! [`TransitionModel`] and its initial-state rule.

use strand_core::{GroupKey, InvariantViolation, ValidationError};

use crate::cdf::{self, Normalized};
use crate::patch::ModelPatch;

/// How the first state of a realization is chosen.
#[derive(Clone, Debug, PartialEq)]
pub enum InitialState {
    /// Always start in this state.
    Fixed(usize),
    /// Start in state `i` with probability `p[i]`.
    ///
    /// Weights are normalized at model construction, so any non-negative
    /// vector with a positive sum is accepted.
    Distribution(Vec<f64>),
}

impl From<Vec<f64>> for InitialState {
    fn from(p: Vec<f64>) -> Self {
        Self::Distribution(p)
    }
}

/// Immutable description of a discrete-time stochastic process.
///
/// Holds a right-stochastic matrix of shape `(input_size, output_size)`,
/// an [`InitialState`], and an optional seed. Row `i` of the matrix is the
/// distribution of the next state given input state `i`.
///
/// Models are validated once, at construction, and never change shape or
/// content afterwards. Use [`variant`](Self::variant) to derive a modified
/// copy. Models are cheap to share behind an `Arc` between instances.
///
/// The seed plays two roles: it seeds the transition stream of every
/// instance driven by the model (unless the instance overrides it), and
/// it is the deduplication [`GroupKey`] under which those instances are
/// recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionModel {
    inputs: usize,
    outputs: usize,
    /// Row-major, `inputs * outputs`, every row sums to 1.0.
    matrix: Vec<f64>,
    /// Row-wise running sums of `matrix`.
    cumulative: Vec<f64>,
    initial: InitialState,
    initial_cumulative: Option<Vec<f64>>,
    seed: Option<u64>,
}

impl TransitionModel {
    /// Build a square Markov model.
    ///
    /// Rows are normalized to sum to 1.0.
    ///
    /// # Errors
    ///
    /// - the matrix is empty, ragged, or not square;
    /// - a weight is negative or non-finite;
    /// - a row sums to zero (cannot be normalized);
    /// - the initial distribution has the wrong length or cannot be
    ///   normalized, or a fixed initial state is out of range.
    pub fn new<R: AsRef<[f64]>>(
        matrix: &[R],
        initial: InitialState,
        seed: Option<u64>,
    ) -> Result<Self, ValidationError> {
        Self::build(matrix, initial, seed, true)
    }

    /// Build a model whose input and output spaces may differ.
    ///
    /// Used for emission-style models driving dependent instances. Same
    /// validation as [`new`](Self::new) minus the square requirement.
    pub fn rectangular<R: AsRef<[f64]>>(
        matrix: &[R],
        initial: InitialState,
        seed: Option<u64>,
    ) -> Result<Self, ValidationError> {
        Self::build(matrix, initial, seed, false)
    }

    /// Build a square model whose rows are all uniform.
    pub fn uniform(
        dimension: usize,
        initial: InitialState,
        seed: Option<u64>,
    ) -> Result<Self, ValidationError> {
        let rows = vec![vec![1.0; dimension]; dimension];
        Self::new(&rows, initial, seed)
    }

    pub(crate) fn build<R: AsRef<[f64]>>(
        matrix: &[R],
        initial: InitialState,
        seed: Option<u64>,
        require_square: bool,
    ) -> Result<Self, ValidationError> {
        let inputs = matrix.len();
        let outputs = matrix.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if inputs == 0 || outputs == 0 {
            return Err(ValidationError::EmptyMatrix);
        }
        if require_square && inputs != outputs {
            return Err(ValidationError::NotSquare {
                rows: inputs,
                cols: outputs,
            });
        }

        let mut flat = Vec::with_capacity(inputs * outputs);
        for (row, weights) in matrix.iter().enumerate() {
            let weights = weights.as_ref();
            if weights.len() != outputs {
                return Err(ValidationError::RaggedMatrix {
                    row,
                    expected: outputs,
                    found: weights.len(),
                });
            }
            match cdf::normalize(weights) {
                Normalized::Ok(p) => flat.extend(p),
                Normalized::BadWeight { index, value } => {
                    return Err(ValidationError::InvalidWeight {
                        row,
                        col: index,
                        value,
                    })
                }
                Normalized::BadSum(sum) => {
                    return Err(ValidationError::RowNotNormalizable { row, sum })
                }
            }
        }

        let (initial, initial_cumulative) = validate_initial(initial, inputs)?;
        let cumulative = flat.chunks(outputs).flat_map(cdf::cumulative).collect();

        Ok(Self {
            inputs,
            outputs,
            matrix: flat,
            cumulative,
            initial,
            initial_cumulative,
            seed,
        })
    }

    /// Derive a new model with the patched fields replaced.
    ///
    /// The result is validated from scratch; `self` is never modified.
    /// An empty patch returns a clone. A square model only has square
    /// variants; a rectangular one may change either dimension.
    pub fn variant(&self, patch: &ModelPatch) -> Result<Self, ValidationError> {
        if patch.is_empty() {
            return Ok(self.clone());
        }
        let initial = patch
            .initial
            .clone()
            .unwrap_or_else(|| self.initial.clone());
        let seed = patch.seed.unwrap_or(self.seed);
        let square = self.is_square();
        match &patch.matrix {
            Some(rows) => Self::build(rows, initial, seed, square),
            None => Self::build(&self.to_rows(), initial, seed, square),
        }
    }

    /// Pick the first state from a uniform draw in `[0, 1)`.
    ///
    /// A fixed initial state is returned as-is; the draw is ignored.
    pub fn sample_initial(&self, draw: f64) -> Result<usize, InvariantViolation> {
        match (&self.initial, &self.initial_cumulative) {
            (InitialState::Fixed(state), _) => Ok(*state),
            (InitialState::Distribution(_), Some(cdf)) => cdf::sample(cdf, draw),
            (InitialState::Distribution(_), None) => {
                Err(InvariantViolation::Unnormalized { total: 0.0 })
            }
        }
    }

    /// Pick the next state from row `from` using a uniform draw in `[0, 1)`.
    pub fn sample_transition(&self, from: usize, draw: f64) -> Result<usize, InvariantViolation> {
        if from >= self.inputs {
            return Err(InvariantViolation::StateOutOfRange {
                state: from,
                size: self.inputs,
            });
        }
        let start = from * self.outputs;
        cdf::sample(&self.cumulative[start..start + self.outputs], draw)
    }

    /// Whether the initial rule needs a random draw.
    pub fn initial_needs_draw(&self) -> bool {
        matches!(self.initial, InitialState::Distribution(_))
    }

    /// `(input_size, output_size)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.inputs, self.outputs)
    }

    /// Number of input states (matrix rows).
    pub fn input_size(&self) -> usize {
        self.inputs
    }

    /// Number of output states (matrix columns).
    pub fn output_size(&self) -> usize {
        self.outputs
    }

    /// Whether input and output spaces coincide.
    pub fn is_square(&self) -> bool {
        self.inputs == self.outputs
    }

    /// Normalized row `i`, or `None` if out of range.
    pub fn matrix_row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.inputs {
            return None;
        }
        let start = i * self.outputs;
        Some(&self.matrix[start..start + self.outputs])
    }

    /// Copy of the normalized matrix, one `Vec` per row.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.matrix.chunks(self.outputs).map(<[f64]>::to_vec).collect()
    }

    /// The validated initial-state rule.
    pub fn initial_state(&self) -> &InitialState {
        &self.initial
    }

    /// The model seed, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Deduplication group of instances driven by this model.
    pub fn group(&self) -> GroupKey {
        GroupKey::from_seed(self.seed)
    }
}

fn validate_initial(
    initial: InitialState,
    inputs: usize,
) -> Result<(InitialState, Option<Vec<f64>>), ValidationError> {
    match initial {
        InitialState::Fixed(state) if state >= inputs => {
            Err(ValidationError::InitialStateOutOfRange {
                state,
                size: inputs,
            })
        }
        InitialState::Fixed(state) => Ok((InitialState::Fixed(state), None)),
        InitialState::Distribution(p) => {
            if p.len() != inputs {
                return Err(ValidationError::InitialLengthMismatch {
                    expected: inputs,
                    found: p.len(),
                });
            }
            match cdf::normalize(&p) {
                Normalized::Ok(p) => {
                    let c = cdf::cumulative(&p);
                    Ok((InitialState::Distribution(p), Some(c)))
                }
                Normalized::BadWeight { index, value } => Err(ValidationError::InvalidWeight {
                    row: 0,
                    col: index,
                    value,
                }),
                Normalized::BadSum(sum) => Err(ValidationError::InitialNotNormalizable { sum }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NORMALIZATION_TOLERANCE;
    use proptest::prelude::*;

    fn two_cycle() -> TransitionModel {
        TransitionModel::new(&[[0.0, 1.0], [1.0, 0.0]], InitialState::Fixed(0), None).unwrap()
    }

    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    #[test]
    fn rows_are_normalized() {
        let m = TransitionModel::new(&[[1.0, 3.0], [2.0, 2.0]], InitialState::Fixed(0), None)
            .unwrap();
        assert_eq!(m.matrix_row(0).unwrap(), &[0.25, 0.75]);
        assert_eq!(m.matrix_row(1).unwrap(), &[0.5, 0.5]);
        assert!(m.matrix_row(2).is_none());
    }

    #[test]
    fn zero_row_is_rejected() {
        let err = TransitionModel::new(&[[0.0, 0.0], [1.0, 0.0]], InitialState::Fixed(0), None)
            .unwrap_err();
        assert_eq!(err, ValidationError::RowNotNormalizable { row: 0, sum: 0.0 });
    }

    #[test]
    fn non_square_is_rejected_by_new() {
        let err = TransitionModel::new(&[[1.0, 1.0, 1.0]], InitialState::Fixed(0), None)
            .unwrap_err();
        assert_eq!(err, ValidationError::NotSquare { rows: 1, cols: 3 });
    }

    #[test]
    fn rectangular_accepts_emission_shape() {
        let m = TransitionModel::rectangular(
            &[[1.0, 1.0, 2.0], [0.0, 0.0, 1.0]],
            InitialState::Fixed(1),
            None,
        )
        .unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert!(!m.is_square());
        assert_eq!(m.sample_transition(1, 0.3).unwrap(), 2);
    }

    #[test]
    fn ragged_and_empty_matrices_are_rejected() {
        let ragged: Vec<Vec<f64>> = vec![vec![1.0, 0.0], vec![1.0]];
        assert!(matches!(
            TransitionModel::new(&ragged, InitialState::Fixed(0), None),
            Err(ValidationError::RaggedMatrix { row: 1, .. })
        ));
        let empty: Vec<Vec<f64>> = vec![];
        assert_eq!(
            TransitionModel::new(&empty, InitialState::Fixed(0), None).unwrap_err(),
            ValidationError::EmptyMatrix
        );
    }

    #[test]
    fn negative_weight_is_rejected() {
        assert!(matches!(
            TransitionModel::new(&[[1.0, -0.5], [1.0, 0.0]], InitialState::Fixed(0), None),
            Err(ValidationError::InvalidWeight { row: 0, col: 1, .. })
        ));
    }

    #[test]
    fn initial_state_is_validated() {
        let rows = [[1.0, 0.0], [0.0, 1.0]];
        assert_eq!(
            TransitionModel::new(&rows, InitialState::Fixed(2), None).unwrap_err(),
            ValidationError::InitialStateOutOfRange { state: 2, size: 2 }
        );
        assert_eq!(
            TransitionModel::new(&rows, vec![1.0].into(), None).unwrap_err(),
            ValidationError::InitialLengthMismatch {
                expected: 2,
                found: 1
            }
        );
        assert!(matches!(
            TransitionModel::new(&rows, vec![0.0, 0.0].into(), None),
            Err(ValidationError::InitialNotNormalizable { .. })
        ));
        let m = TransitionModel::new(&rows, vec![3.0, 1.0].into(), None).unwrap();
        assert_eq!(
            m.initial_state(),
            &InitialState::Distribution(vec![0.75, 0.25])
        );
    }

    // ---------------------------------------------------------------
    // Sampling
    // ---------------------------------------------------------------

    #[test]
    fn deterministic_cycle_ignores_draws() {
        let m = two_cycle();
        for draw in [0.0, 0.3, 0.999_999, 1.0] {
            assert_eq!(m.sample_transition(0, draw).unwrap(), 1);
            assert_eq!(m.sample_transition(1, draw).unwrap(), 0);
            assert_eq!(m.sample_initial(draw).unwrap(), 0);
        }
        assert!(!m.initial_needs_draw());
    }

    #[test]
    fn initial_distribution_uses_inverse_cdf() {
        let m = TransitionModel::new(
            &[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            vec![0.2, 0.3, 0.5].into(),
            None,
        )
        .unwrap();
        assert!(m.initial_needs_draw());
        assert_eq!(m.sample_initial(0.1).unwrap(), 0);
        assert_eq!(m.sample_initial(0.2).unwrap(), 1);
        assert_eq!(m.sample_initial(0.49).unwrap(), 1);
        assert_eq!(m.sample_initial(0.5).unwrap(), 2);
        assert_eq!(m.sample_initial(1.0).unwrap(), 2);
    }

    #[test]
    fn transition_from_unknown_state_is_invariant_violation() {
        assert_eq!(
            two_cycle().sample_transition(5, 0.5).unwrap_err(),
            InvariantViolation::StateOutOfRange { state: 5, size: 2 }
        );
    }

    // ---------------------------------------------------------------
    // Variants
    // ---------------------------------------------------------------

    #[test]
    fn variant_leaves_receiver_untouched() {
        let base = two_cycle();
        let patch = ModelPatch::new().matrix(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        let v = base.variant(&patch).unwrap();
        assert_eq!(v.matrix_row(0).unwrap(), &[1.0, 0.0]);
        assert_eq!(base.matrix_row(0).unwrap(), &[0.0, 1.0]);
        assert_eq!(v.initial_state(), base.initial_state());
    }

    #[test]
    fn variant_can_change_seed_and_initial() {
        let base = two_cycle();
        let v = base
            .variant(&ModelPatch::new().seed(9).initial(InitialState::Fixed(1)))
            .unwrap();
        assert_eq!(v.seed(), Some(9));
        assert_eq!(v.group(), GroupKey::Seeded(9));
        assert_eq!(v.sample_initial(0.0).unwrap(), 1);
        assert_eq!(base.seed(), None);

        let cleared = v.variant(&ModelPatch::new().unseeded()).unwrap();
        assert_eq!(cleared.group(), GroupKey::Unseeded);
    }

    #[test]
    fn variant_is_validated_independently() {
        let base = two_cycle();
        let bad = ModelPatch::new().matrix(vec![vec![1.0, 0.0, 0.0]; 3]);
        // Fixed(0) stays valid, so a 3x3 shape is allowed.
        assert_eq!(base.variant(&bad).unwrap().shape(), (3, 3));
        let bad = ModelPatch::new().initial(InitialState::Fixed(7));
        assert!(base.variant(&bad).is_err());
    }

    #[test]
    fn square_model_keeps_square_variants() {
        let wide = ModelPatch::new().matrix(vec![vec![1.0, 1.0, 1.0]; 2]);
        assert_eq!(
            two_cycle().variant(&wide).unwrap_err(),
            ValidationError::NotSquare { rows: 2, cols: 3 }
        );

        let emission =
            TransitionModel::rectangular(&[[1.0, 0.0, 1.0]], InitialState::Fixed(0), None).unwrap();
        let v = emission
            .variant(&ModelPatch::new().matrix(vec![vec![1.0, 1.0]]))
            .unwrap();
        assert_eq!(v.shape(), (1, 2));
    }

    #[test]
    fn empty_patch_clones() {
        let base = two_cycle();
        assert_eq!(base.variant(&ModelPatch::new()).unwrap(), base);
    }

    proptest! {
        #[test]
        fn every_row_sums_to_one(
            rows in (1usize..6).prop_flat_map(|n| {
                proptest::collection::vec(
                    proptest::collection::vec(0.01f64..100.0, n),
                    n,
                )
            })
        ) {
            let m = TransitionModel::new(&rows, InitialState::Fixed(0), None).unwrap();
            for i in 0..m.input_size() {
                let sum: f64 = m.matrix_row(i).unwrap().iter().sum();
                prop_assert!((sum - 1.0).abs() <= NORMALIZATION_TOLERANCE);
            }
        }

        #[test]
        fn sampled_states_are_in_range(draw in 0.0f64..1.0, from in 0usize..3) {
            let m = TransitionModel::new(
                &[[0.2, 0.3, 0.5], [0.0, 0.0, 1.0], [0.4, 0.6, 0.0]],
                InitialState::Fixed(0),
                None,
            ).unwrap();
            let to = m.sample_transition(from, draw).unwrap();
            prop_assert!(to < 3);
            prop_assert!(m.matrix_row(from).unwrap()[to] > 0.0);
        }
    }
}
