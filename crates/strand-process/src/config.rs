//! Per-instance configuration.

/// What happens to the random stream when a forced state is consumed.
///
/// Only matters for steps that would otherwise have drawn from the
/// instance's stream (transitions, not the initial pick).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ForcePolicy {
    /// Advance the stream exactly as if the state had been sampled.
    ///
    /// A forced run and an unforced run stay draw-for-draw aligned.
    #[default]
    ConsumeDraw,
    /// Leave the stream untouched.
    SkipDraw,
}

/// Configuration for a [`ProcessInstance`](crate::ProcessInstance).
///
/// Copied to branches unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessConfig {
    /// Stream handling for forced states. Default: [`ForcePolicy::ConsumeDraw`].
    pub force_policy: ForcePolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_consumes_draws() {
        assert_eq!(ProcessConfig::default().force_policy, ForcePolicy::ConsumeDraw);
    }
}
