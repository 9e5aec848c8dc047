//! Segment storage behind the event log.
//!
//! Each group owns an append-only arena of [`RawSegment`]s. A [`Tape`]
//! is one instance's recording: an ordered list of [`Segment`]s, each
//! either one of the instance's own raw segments or a reference into a
//! raw segment of some other instance of the same group.

use indexmap::IndexMap;
use strand_core::InstanceId;

/// Index of a raw segment in its group's arena.
pub(crate) type RawId = usize;

/// Explicit states produced by one instance from `start` on.
///
/// Grows while it is the trailing segment of its owner's tape; frozen
/// once the owner opens another segment.
#[derive(Clone, Debug)]
pub(crate) struct RawSegment {
    pub(crate) owner: InstanceId,
    pub(crate) start: usize,
    pub(crate) data: Vec<usize>,
}

impl RawSegment {
    /// State recorded at absolute `step`, if covered.
    pub(crate) fn at(&self, step: usize) -> Option<usize> {
        step.checked_sub(self.start)
            .and_then(|i| self.data.get(i))
            .copied()
    }

    fn end(&self) -> usize {
        self.start + self.data.len()
    }
}

/// One entry of a tape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Segment {
    /// The tape owner's own raw segment, at its full current length.
    Raw(RawId),
    /// Steps `start..start + len` equal the target's states at the same steps.
    Ref {
        start: usize,
        target: RawId,
        len: usize,
    },
}

/// An instance's recording: segments in increasing step order, possibly
/// with gaps between them.
#[derive(Clone, Debug, Default)]
pub(crate) struct Tape {
    pub(crate) segments: Vec<Segment>,
}

/// All storage of one dedup group.
#[derive(Debug, Default)]
pub(crate) struct Group {
    pub(crate) raws: Vec<RawSegment>,
    pub(crate) tapes: IndexMap<InstanceId, Tape>,
}

impl Group {
    pub(crate) fn start(&self, seg: &Segment) -> usize {
        match *seg {
            Segment::Raw(id) => self.raws.get(id).map_or(0, |r| r.start),
            Segment::Ref { start, .. } => start,
        }
    }

    pub(crate) fn len(&self, seg: &Segment) -> usize {
        match *seg {
            Segment::Raw(id) => self.raws.get(id).map_or(0, |r| r.data.len()),
            Segment::Ref { len, .. } => len,
        }
    }

    /// The states a segment stands for.
    pub(crate) fn slice(&self, seg: &Segment) -> &[usize] {
        match *seg {
            Segment::Raw(id) => self
                .raws
                .get(id)
                .map(|r| r.data.as_slice())
                .unwrap_or_default(),
            Segment::Ref { start, target, len } => self
                .raws
                .get(target)
                .and_then(|r| {
                    let from = start.checked_sub(r.start)?;
                    r.data.get(from..from + len)
                })
                .unwrap_or(&[]),
        }
    }

    /// First step of `tape`, `None` when empty.
    pub(crate) fn first_step(&self, tape: &Tape) -> Option<usize> {
        tape.segments.first().map(|s| self.start(s))
    }

    /// One past the last step of `tape`, `None` when empty.
    pub(crate) fn end(&self, tape: &Tape) -> Option<usize> {
        tape.segments.last().map(|s| self.start(s) + self.len(s))
    }

    pub(crate) fn length(&self, tape: &Tape) -> usize {
        tape.segments.iter().map(|s| self.len(s)).sum()
    }

    /// `(step, state)` pairs of `tape` in step order.
    pub(crate) fn steps<'a>(
        &'a self,
        tape: &'a Tape,
    ) -> impl Iterator<Item = (usize, usize)> + 'a {
        tape.segments.iter().flat_map(move |seg| {
            let start = self.start(seg);
            self.slice(seg)
                .iter()
                .enumerate()
                .map(move |(i, &state)| (start + i, state))
        })
    }

    /// State of `tape` at absolute `step`.
    pub(crate) fn retrieve(&self, tape: &Tape, step: usize) -> Option<usize> {
        let seg = tape.segments.iter().find(|s| {
            let start = self.start(s);
            step >= start && step < start + self.len(s)
        })?;
        match *seg {
            Segment::Raw(id) => self.raws.get(id)?.at(step),
            Segment::Ref { target, .. } => self.raws.get(target)?.at(step),
        }
    }

    /// A raw segment of an instance other than `owner` holding `state`
    /// at `step`. Lowest arena index wins.
    pub(crate) fn find_match(&self, owner: InstanceId, step: usize, state: usize) -> Option<RawId> {
        self.raws
            .iter()
            .position(|r| r.owner != owner && r.at(step) == Some(state))
    }

    /// Try to extend `owner`'s trailing reference to cover `state` at
    /// `step`. Only a step directly after the reference qualifies.
    pub(crate) fn extend_trailing_ref(
        &mut self,
        owner: InstanceId,
        step: usize,
        state: usize,
    ) -> bool {
        let Some(tape) = self.tapes.get_mut(&owner) else {
            return false;
        };
        let Some(Segment::Ref { start, target, len }) = tape.segments.last_mut() else {
            return false;
        };
        if *start + *len != step {
            return false;
        }
        match self.raws.get(*target) {
            Some(r) if r.at(step) == Some(state) => {
                *len += 1;
                true
            }
            _ => false,
        }
    }

    /// Append a one-step reference to `target` at `step` to `owner`'s tape.
    pub(crate) fn push_ref(&mut self, owner: InstanceId, step: usize, target: RawId) {
        self.tapes
            .entry(owner)
            .or_default()
            .segments
            .push(Segment::Ref {
                start: step,
                target,
                len: 1,
            });
    }

    /// Append `state` at `step` to `owner`'s trailing raw segment, or
    /// open a new raw segment. Returns the raw segment written to.
    pub(crate) fn append_raw(&mut self, owner: InstanceId, step: usize, state: usize) -> RawId {
        let tape = self.tapes.entry(owner).or_default();
        if let Some(&Segment::Raw(id)) = tape.segments.last() {
            if let Some(raw) = self.raws.get_mut(id) {
                if raw.end() == step {
                    raw.data.push(state);
                    return id;
                }
            }
        }
        let id = self.raws.len();
        self.raws.push(RawSegment {
            owner,
            start: step,
            data: vec![state],
        });
        tape.segments.push(Segment::Raw(id));
        id
    }

    /// `tape` rewritten so that every segment is a reference.
    pub(crate) fn as_references(&self, tape: &Tape) -> Tape {
        let segments = tape
            .segments
            .iter()
            .map(|seg| match *seg {
                Segment::Raw(id) => Segment::Ref {
                    start: self.start(seg),
                    target: id,
                    len: self.len(seg),
                },
                r @ Segment::Ref { .. } => r,
            })
            .collect();
        Tape { segments }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_with_raw(owner: u64, start: usize, data: &[usize]) -> Group {
        let mut g = Group::default();
        for (i, &s) in data.iter().enumerate() {
            g.append_raw(InstanceId(owner), start + i, s);
        }
        g
    }

    #[test]
    fn append_raw_grows_contiguously() {
        let g = group_with_raw(1, 0, &[3, 1, 4]);
        assert_eq!(g.raws.len(), 1);
        let tape = &g.tapes[&InstanceId(1)];
        assert_eq!(g.length(tape), 3);
        assert_eq!(g.end(tape), Some(3));
        assert_eq!(g.retrieve(tape, 2), Some(4));
        assert_eq!(g.retrieve(tape, 3), None);
    }

    #[test]
    fn references_resolve_at_same_step() {
        let mut g = group_with_raw(1, 5, &[7, 8, 9]);
        let tape = Tape {
            segments: vec![Segment::Ref {
                start: 6,
                target: 0,
                len: 2,
            }],
        };
        assert_eq!(g.slice(&tape.segments[0]), &[8, 9]);
        assert_eq!(g.retrieve(&tape, 6), Some(8));
        assert_eq!(g.first_step(&tape), Some(6));
        g.tapes.insert(InstanceId(2), tape);
        assert_eq!(g.find_match(InstanceId(2), 7, 9), Some(0));
        assert_eq!(g.find_match(InstanceId(1), 7, 9), None);
        assert_eq!(g.find_match(InstanceId(2), 7, 8), None);
    }

    #[test]
    fn trailing_ref_extends_only_on_agreement() {
        let mut g = group_with_raw(1, 0, &[0, 1, 0]);
        let other = InstanceId(2);
        assert!(!g.extend_trailing_ref(other, 0, 0));
        g.push_ref(other, 0, 0);
        assert!(!g.extend_trailing_ref(other, 1, 0));
        assert!(g.extend_trailing_ref(other, 1, 1));
        assert!(g.extend_trailing_ref(other, 2, 0));
        assert!(!g.extend_trailing_ref(other, 3, 0));
        assert_eq!(g.length(&g.tapes[&other]), 3);
    }

    #[test]
    fn trailing_ref_does_not_bridge_a_gap() {
        let mut g = group_with_raw(1, 0, &[0, 1, 0, 1]);
        let other = InstanceId(2);
        g.push_ref(other, 0, 0);
        // Step 2 holds 0 in the target, but step 1 was never recorded.
        assert!(!g.extend_trailing_ref(other, 2, 0));
        assert_eq!(g.length(&g.tapes[&other]), 1);
    }

    #[test]
    fn append_after_gap_opens_new_segment() {
        let mut g = group_with_raw(1, 0, &[4, 5]);
        assert_eq!(g.append_raw(InstanceId(1), 6, 7), 1);
        let tape = &g.tapes[&InstanceId(1)];
        assert_eq!(tape.segments.len(), 2);
        assert_eq!(g.length(tape), 3);
        assert_eq!(g.end(tape), Some(7));
        assert_eq!(g.retrieve(tape, 3), None);
        assert_eq!(g.retrieve(tape, 6), Some(7));
    }

    #[test]
    fn as_references_freezes_raw_length() {
        let mut g = group_with_raw(1, 0, &[2, 2]);
        let copy = g.as_references(&g.tapes[&InstanceId(1)]);
        g.append_raw(InstanceId(1), 2, 5);
        assert_eq!(g.length(&copy), 2);
        assert_eq!(g.length(&g.tapes[&InstanceId(1)]), 3);
    }
}
