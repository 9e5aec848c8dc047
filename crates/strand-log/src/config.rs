//! Event log configuration.

/// Configuration for an [`EventLog`](crate::EventLog).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    /// Search other instances' raw segments for matching states before
    /// storing a new one. Only applies to seeded groups; the unseeded
    /// group is never deduplicated. Redirects share prefixes regardless.
    /// Default: `true`.
    pub deduplicate: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { deduplicate: true }
    }
}
