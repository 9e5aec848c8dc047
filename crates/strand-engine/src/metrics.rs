//! Per-forward counters.

/// What one [`Scheduler::forward`](crate::Scheduler::forward) call did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ForwardReport {
    /// Ticks actually executed (fewer than requested when forwarding
    /// ended early on exhaustion).
    pub ticks: u64,
    /// Instance advances that produced a state.
    pub advances: u64,
    /// Firings of instances that were already, or just became, exhausted.
    pub exhausted_skips: u64,
    /// Wall-clock time of the call, in microseconds.
    pub elapsed_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_report_is_zero() {
        let r = ForwardReport::default();
        assert_eq!(r.ticks, 0);
        assert_eq!(r.advances, 0);
        assert_eq!(r.exhausted_skips, 0);
        assert_eq!(r.elapsed_us, 0);
    }
}
