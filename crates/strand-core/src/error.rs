//! Error types for the strand process simulator.
//!
//! Three families, by how callers are expected to react:
//!
//! - [`ValidationError`]: bad input at construction or mutation time.
//!   Always surfaced synchronously, never silently corrected.
//! - [`InvariantViolation`]: a sampling step found a distribution that
//!   validation should have rejected. Propagated, never swallowed.
//! - [`StepError`]: what `advance()` can fail with.
//!
//! Exhaustion of a finite or dependent process is not an error; it is
//! reported as `Ok(None)` by the process engine.

use thiserror::Error;

use crate::id::InstanceId;

/// Rejected model, initial state, forced state, or instance wiring.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ValidationError {
    /// The matrix has no rows or no columns.
    #[error("matrix must have at least one row and one column")]
    EmptyMatrix,
    /// A row's length differs from the first row's.
    #[error("matrix row {row} has {found} entries, expected {expected}")]
    RaggedMatrix {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// A square matrix was required.
    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },
    /// A weight is negative, NaN, or infinite.
    #[error("invalid weight {value} at row {row}, column {col}")]
    InvalidWeight {
        /// Row of the weight (`0` for initial-state vectors).
        row: usize,
        /// Column of the weight.
        col: usize,
        /// The rejected value.
        value: f64,
    },
    /// A matrix row cannot be normalized to sum 1.0.
    #[error("matrix row {row} sums to {sum} and cannot be normalized")]
    RowNotNormalizable {
        /// Index of the offending row.
        row: usize,
        /// The raw row sum.
        sum: f64,
    },
    /// The initial-state vector's length differs from the input size.
    #[error("initial distribution has {found} entries, expected {expected}")]
    InitialLengthMismatch {
        /// The model's input size.
        expected: usize,
        /// Length of the supplied vector.
        found: usize,
    },
    /// The initial-state vector cannot be normalized to sum 1.0.
    #[error("initial distribution sums to {sum} and cannot be normalized")]
    InitialNotNormalizable {
        /// The raw vector sum.
        sum: f64,
    },
    /// A fixed initial state is outside `[0, input_size)`.
    #[error("initial state {state} out of range [0, {size})")]
    InitialStateOutOfRange {
        /// The rejected state.
        state: usize,
        /// The model's input size.
        size: usize,
    },
    /// A forced state is outside `[0, output_size)`.
    #[error("forced state {state} out of range [0, {size})")]
    ForcedStateOutOfRange {
        /// The rejected state.
        state: usize,
        /// The model's output size.
        size: usize,
    },
    /// An observed transition references a state outside the model.
    #[error("observed transition ({from}, {to}) out of range for a {size}-state model")]
    TransitionOutOfRange {
        /// Source state of the pair.
        from: usize,
        /// Target state of the pair.
        to: usize,
        /// The model's dimension.
        size: usize,
    },
    /// Blend weights for `fit` are negative, non-finite, or both zero.
    #[error("invalid blend weights (prior {prior}, observed {observed})")]
    InvalidBlend {
        /// Weight of the previous matrix.
        prior: f64,
        /// Weight of the observed frequencies.
        observed: f64,
    },
    /// An operation needing a square model received a rectangular one.
    #[error("{what} requires a square model, got {inputs}x{outputs}")]
    ModelNotSquare {
        /// The operation or instance kind that needs a square model.
        what: &'static str,
        /// The model's input size.
        inputs: usize,
        /// The model's output size.
        outputs: usize,
    },
    /// A dependent instance's input space does not match its upstream's output space.
    #[error("upstream output size {upstream_outputs} does not match input size {inputs}")]
    ShapeMismatch {
        /// Output size of the upstream instance.
        upstream_outputs: usize,
        /// Input size of the dependent instance's model.
        inputs: usize,
    },
}

/// A sampling draw could not be mapped onto a validated distribution.
///
/// Validation guarantees normalized rows, so any of these indicates a
/// bug upstream of the sampler. They are reported, not recovered from.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum InvariantViolation {
    /// The uniform draw is negative or NaN.
    #[error("draw {draw} is outside [0, 1)")]
    DrawOutOfRange {
        /// The rejected draw.
        draw: f64,
    },
    /// The source state does not index a row of the model.
    #[error("state {state} does not index a model row (input size {size})")]
    StateOutOfRange {
        /// The offending state.
        state: usize,
        /// The model's input size.
        size: usize,
    },
    /// A cumulative distribution does not end at 1.0.
    #[error("cumulative distribution ends at {total}, expected 1.0")]
    Unnormalized {
        /// Final cumulative entry.
        total: f64,
    },
}

/// Errors from advancing a process instance.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum StepError {
    /// Sampling hit an invariant violation.
    #[error("sampling invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
    /// A dependent instance was advanced before its upstream produced a state.
    #[error("upstream instance {upstream} has not produced a state yet")]
    UpstreamUnstarted {
        /// The upstream instance.
        upstream: InstanceId,
    },
}
