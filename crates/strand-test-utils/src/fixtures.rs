//! Reusable model fixtures.
//!
//! - [`two_cycle`]: deterministic `0 -> 1 -> 0`, starts in 0.
//! - [`three_cycle`]: deterministic `0 -> 1 -> 2 -> 0`, starts in 0.
//! - [`coin`]: fair two-state chain, starts in 0.
//! - [`fixed_emission`]: deterministic 2-to-3 emission, `0 -> 2`, `1 -> 0`.

use std::sync::Arc;

use strand_model::{InitialState, TransitionModel};

fn square(rows: &[&[f64]], seed: Option<u64>) -> Arc<TransitionModel> {
    match TransitionModel::new(rows, InitialState::Fixed(0), seed) {
        Ok(m) => Arc::new(m),
        Err(e) => panic!("fixture model is invalid: {e}"),
    }
}

pub fn two_cycle(seed: Option<u64>) -> Arc<TransitionModel> {
    square(&[&[0.0, 1.0], &[1.0, 0.0]], seed)
}

pub fn three_cycle(seed: Option<u64>) -> Arc<TransitionModel> {
    square(&[&[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0], &[1.0, 0.0, 0.0]], seed)
}

pub fn coin(seed: Option<u64>) -> Arc<TransitionModel> {
    square(&[&[0.5, 0.5], &[0.5, 0.5]], seed)
}

pub fn fixed_emission() -> Arc<TransitionModel> {
    let rows: &[&[f64]] = &[&[0.0, 0.0, 1.0], &[1.0, 0.0, 0.0]];
    match TransitionModel::rectangular(rows, InitialState::Fixed(0), None) {
        Ok(m) => Arc::new(m),
        Err(e) => panic!("fixture model is invalid: {e}"),
    }
}
