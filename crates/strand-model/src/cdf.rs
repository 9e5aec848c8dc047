//! Normalization and inverse-CDF helpers shared by model rows and the
//! initial distribution.

use strand_core::InvariantViolation;

use crate::NORMALIZATION_TOLERANCE;

/// Outcome of normalizing a weight vector.
pub(crate) enum Normalized {
    /// Weights divided by their sum.
    Ok(Vec<f64>),
    /// A weight is negative or non-finite.
    BadWeight { index: usize, value: f64 },
    /// The sum is zero or not finite.
    BadSum(f64),
}

/// Divide `weights` by their sum, rejecting negative and non-finite input.
pub(crate) fn normalize(weights: &[f64]) -> Normalized {
    if let Some((index, &value)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        return Normalized::BadWeight { index, value };
    }
    let sum: f64 = weights.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return Normalized::BadSum(sum);
    }
    let out: Vec<f64> = weights.iter().map(|w| w / sum).collect();
    let total: f64 = out.iter().sum();
    if (total - 1.0).abs() > NORMALIZATION_TOLERANCE {
        return Normalized::BadSum(sum);
    }
    Normalized::Ok(out)
}

/// Running sum of `p`.
pub(crate) fn cumulative(p: &[f64]) -> Vec<f64> {
    p.iter()
        .scan(0.0, |acc, &x| {
            *acc += x;
            Some(*acc)
        })
        .collect()
}

/// Inverse-CDF lookup of `draw` in `cdf`.
///
/// Returns the first index whose cumulative value exceeds `draw`. A draw
/// at or past the final entry (floating-point edge) clamps to the last
/// index with non-zero probability.
pub(crate) fn sample(cdf: &[f64], draw: f64) -> Result<usize, InvariantViolation> {
    if draw.is_nan() || draw < 0.0 {
        return Err(InvariantViolation::DrawOutOfRange { draw });
    }
    let total = cdf.last().copied().unwrap_or(0.0);
    if (total - 1.0).abs() > NORMALIZATION_TOLERANCE {
        return Err(InvariantViolation::Unnormalized { total });
    }
    let idx = cdf.partition_point(|&c| c <= draw);
    if idx < cdf.len() {
        return Ok(idx);
    }
    Ok(last_positive(cdf))
}

fn last_positive(cdf: &[f64]) -> usize {
    (1..cdf.len())
        .rev()
        .find(|&i| cdf[i] > cdf[i - 1])
        .unwrap_or(0)
}
