//! Validated transition models for strand processes.
//!
//! A [`TransitionModel`] is the immutable description of a discrete-time
//! stochastic process: a right-stochastic matrix, an initial-state rule,
//! and an optional seed. Construction normalizes and validates; sampling
//! is inverse-CDF over precomputed cumulative sums.
//!
//! # Example
//!
//! ```
//! use strand_model::{InitialState, TransitionModel};
//!
//! let model = TransitionModel::new(&[[0.0, 1.0], [1.0, 0.0]], InitialState::Fixed(0), Some(7))
//!     .unwrap();
//! assert_eq!(model.sample_initial(0.42).unwrap(), 0);
//! assert_eq!(model.sample_transition(0, 0.42).unwrap(), 1);
//! ```
//!
//! # Modules
//!
//! - [`model`]: [`TransitionModel`] and [`InitialState`]
//! - [`patch`]: [`ModelPatch`], the closed override record for variants
//! - [`fit`]: re-estimating a matrix from observed transitions
//! - [`random`]: uniformly random models
//! - [`loader`]: the plain-text matrix format

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod cdf;
pub mod fit;
pub mod loader;
pub mod model;
pub mod patch;
pub mod random;

pub use fit::FitWeights;
pub use loader::LoadError;
pub use model::{InitialState, TransitionModel};
pub use patch::ModelPatch;

/// Absolute tolerance when checking that a distribution sums to 1.0.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-6;
