//! Lazy iteration over an instance's states.

use std::iter::FusedIterator;

use strand_core::StepError;

use crate::instance::ProcessInstance;

/// Iterator returned by [`ProcessInstance::states`].
///
/// Borrows the instance mutably: every `next()` is one `advance()`.
/// Dropping the iterator leaves the instance where it stopped, so a new
/// `states()` call resumes from there.
#[derive(Debug)]
pub struct States<'a> {
    instance: &'a mut ProcessInstance,
    done: bool,
}

impl<'a> States<'a> {
    pub(crate) fn new(instance: &'a mut ProcessInstance) -> Self {
        Self {
            instance,
            done: false,
        }
    }
}

impl Iterator for States<'_> {
    type Item = Result<usize, StepError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.instance.advance().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl FusedIterator for States<'_> {}

#[cfg(test)]
mod tests {
    use strand_core::IdAllocator;
    use strand_test_utils::{fixed_emission, two_cycle};

    use crate::instance::ProcessInstance;

    #[test]
    fn resumes_after_drop() {
        let mut p = ProcessInstance::endless(two_cycle(None), &IdAllocator::new()).unwrap();
        let first: Vec<usize> = p.states().take(2).map(Result::unwrap).collect();
        let next: Vec<usize> = p.states().take(2).map(Result::unwrap).collect();
        assert_eq!(first, vec![0, 1]);
        assert_eq!(next, vec![0, 1]);
    }

    #[test]
    fn fuses_after_error() {
        let ids = IdAllocator::new();
        let up = ProcessInstance::endless(two_cycle(None), &ids).unwrap();
        let mut down = ProcessInstance::dependent(fixed_emission(), &up, &ids).unwrap();
        let mut it = down.states();
        assert!(matches!(it.next(), Some(Err(_))));
        assert!(it.next().is_none());
        drop(it);
        assert_eq!(down.skip(3), Err(strand_core::StepError::UpstreamUnstarted { upstream: up.id() }));
    }
}
