//! Lazy replay of one instance's tape.

use std::iter::FusedIterator;
use std::slice;

use crate::tape::{Group, Segment};

/// Iterator over the states recorded for one instance, in step order.
///
/// Borrows the log; call [`EventLog::playback`](crate::EventLog::playback)
/// again to replay from the start.
#[derive(Debug)]
pub struct Playback<'a> {
    group: &'a Group,
    segments: slice::Iter<'a, Segment>,
    current: slice::Iter<'a, usize>,
    remaining: usize,
}

impl<'a> Playback<'a> {
    pub(crate) fn new(group: &'a Group, segments: &'a [Segment]) -> Self {
        let remaining = segments.iter().map(|s| group.len(s)).sum();
        Self {
            group,
            segments: segments.iter(),
            current: [].iter(),
            remaining,
        }
    }
}

impl Iterator for Playback<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if let Some(&state) = self.current.next() {
                self.remaining = self.remaining.saturating_sub(1);
                return Some(state);
            }
            let seg = self.segments.next()?;
            self.current = self.group.slice(seg).iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Playback<'_> {}

impl FusedIterator for Playback<'_> {}
