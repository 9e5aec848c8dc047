//! [`EventLog`]: the deduplicating collector.

use std::ops::Range;

use indexmap::IndexMap;
use smallvec::SmallVec;
use strand_core::{Event, EventSink, GroupKey, InstanceId, LogId, TapeKey};
use tracing::{debug, trace};

use crate::config::LogConfig;
use crate::playback::Playback;
use crate::tape::{Group, Segment, Tape};

/// A window of consecutive states, as counted by [`EventLog::count`].
pub type Pattern = SmallVec<[usize; 4]>;

/// Storage counters, mainly for checking deduplication.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogStats {
    /// Groups with at least one registered instance.
    pub groups: usize,
    /// Registered instances.
    pub instances: usize,
    /// Raw segments across all groups.
    pub raw_segments: usize,
    /// States physically stored in raw segments.
    pub raw_states: usize,
    /// Reference segments across all tapes.
    pub ref_segments: usize,
    /// States represented through references.
    pub ref_states: usize,
}

/// Records the events of many instances, storing coinciding histories
/// once.
///
/// Events are bucketed by [`GroupKey`]. Inside a seeded group, a state
/// that another instance already recorded at the same step is stored as
/// a reference to that instance's raw segment. The unseeded group only
/// shares history through explicit [`redirect`](Self::redirect)s.
///
/// Rejections are reported as `false` or `None`; nothing here panics or
/// returns an error.
#[derive(Debug)]
pub struct EventLog {
    id: LogId,
    open: bool,
    config: LogConfig,
    members: IndexMap<InstanceId, GroupKey>,
    groups: IndexMap<GroupKey, Group>,
}

impl EventLog {
    /// An empty, open log.
    pub fn new(id: LogId, config: LogConfig) -> Self {
        Self {
            id,
            open: true,
            config,
            members: IndexMap::new(),
            groups: IndexMap::new(),
        }
    }

    /// This log's id.
    pub fn id(&self) -> LogId {
        self.id
    }

    /// Whether new events are accepted.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The log's configuration.
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Stop accepting events for good. Recorded data stays queryable.
    pub fn close(&mut self) {
        if self.open {
            self.open = false;
            debug!(log = %self.id, instances = self.members.len(), "log closed");
        }
    }

    /// Register `key`'s tape. An instance keeps the group it was first
    /// registered under.
    pub fn attach(&mut self, key: TapeKey) {
        let group = *self.members.entry(key.instance).or_insert(key.group);
        self.groups
            .entry(group)
            .or_default()
            .tapes
            .entry(key.instance)
            .or_default();
    }

    /// Record one event. Returns `false` when it was rejected.
    ///
    /// Rejected: the log is closed, the instance is registered under a
    /// different group, or the step is not past the instance's last
    /// recorded step. A step further ahead starts a new segment, leaving
    /// the skipped steps unrecorded.
    pub fn put(&mut self, event: Event) -> bool {
        if !self.open {
            return false;
        }
        if let Some(&group) = self.members.get(&event.instance) {
            if group != event.group {
                trace!(instance = %event.instance, %group, "put rejected: group mismatch");
                return false;
            }
        }
        self.attach(event.key());
        let dedup = self.config.deduplicate && event.group.is_seeded();
        let Some(group) = self.groups.get_mut(&event.group) else {
            return false;
        };

        let end = group.tapes.get(&event.instance).and_then(|t| group.end(t));
        if let Some(end) = end {
            if event.step < end {
                trace!(
                    instance = %event.instance,
                    step = event.step,
                    end,
                    "put rejected: step already recorded"
                );
                return false;
            }
        }

        if dedup {
            if group.extend_trailing_ref(event.instance, event.step, event.state) {
                trace!(instance = %event.instance, step = event.step, "put: reference extended");
                return true;
            }
            if let Some(target) = group.find_match(event.instance, event.step, event.state) {
                group.push_ref(event.instance, event.step, target);
                trace!(instance = %event.instance, step = event.step, raw = target, "put: reference");
                return true;
            }
        }
        let raw = group.append_raw(event.instance, event.step, event.state);
        trace!(instance = %event.instance, step = event.step, raw, "put: raw");
        true
    }

    /// Make `dst`'s tape start with everything recorded for `src`.
    ///
    /// `src`'s raw segments become references of their current length;
    /// its references are copied. Fails if the keys are in different
    /// groups, `src` has nothing recorded, or `dst` already has data.
    pub fn redirect(&mut self, src: TapeKey, dst: TapeKey) -> bool {
        if src.group != dst.group {
            debug!(%src, %dst, "redirect rejected: groups differ");
            return false;
        }
        let registered = |key: &TapeKey| self.members.get(&key.instance).copied();
        if registered(&src) != Some(src.group) {
            return false;
        }
        if matches!(registered(&dst), Some(g) if g != dst.group) {
            return false;
        }
        let Some(group) = self.groups.get_mut(&src.group) else {
            return false;
        };
        let copy = match group.tapes.get(&src.instance) {
            Some(tape) if !tape.segments.is_empty() => group.as_references(tape),
            _ => {
                debug!(%src, %dst, "redirect rejected: nothing recorded for source");
                return false;
            }
        };
        if group
            .tapes
            .get(&dst.instance)
            .is_some_and(|t| !t.segments.is_empty())
        {
            debug!(%src, %dst, "redirect rejected: destination already recorded");
            return false;
        }
        let shared = group.length(&copy);
        group.tapes.insert(dst.instance, copy);
        self.members.insert(dst.instance, dst.group);
        debug!(%src, %dst, steps = shared, "redirected");
        true
    }

    // ── queries ────────────────────────────────────────────────────

    fn tape(&self, instance: InstanceId) -> Option<(&Group, &Tape)> {
        let key = self.members.get(&instance)?;
        let group = self.groups.get(key)?;
        Some((group, group.tapes.get(&instance)?))
    }

    /// Group an instance is registered under.
    pub fn group_of(&self, instance: InstanceId) -> Option<GroupKey> {
        self.members.get(&instance).copied()
    }

    /// Registered instances, in registration order.
    pub fn instances(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.members.keys().copied()
    }

    /// Number of steps recorded for `instance`.
    pub fn length(&self, instance: InstanceId) -> Option<usize> {
        let (group, tape) = self.tape(instance)?;
        Some(group.length(tape))
    }

    /// First recorded step of `instance`.
    pub fn first_step(&self, instance: InstanceId) -> Option<usize> {
        let (group, tape) = self.tape(instance)?;
        group.first_step(tape)
    }

    /// State of `instance` at absolute `step`.
    ///
    /// Steps are the ones the instance emitted, not positions in the
    /// replay: for a gap-free tape starting at step `f`,
    /// `retrieve(i, f + k)` is the `k`-th state of
    /// [`playback`](Self::playback). Unrecorded steps give `None`.
    ///
    /// ```
    /// use strand_core::{Event, GroupKey, InstanceId, LogId};
    /// use strand_log::{EventLog, LogConfig};
    ///
    /// let mut log = EventLog::new(LogId(0), LogConfig::default());
    /// let instance = InstanceId(1);
    /// for (step, state) in [(3, 2), (4, 0)] {
    ///     log.put(Event { group: GroupKey::Unseeded, instance, step, state });
    /// }
    /// assert_eq!(log.first_step(instance), Some(3));
    /// assert_eq!(log.retrieve(instance, 3), Some(2));
    /// assert_eq!(log.playback(instance).unwrap().next(), Some(2));
    /// assert_eq!(log.retrieve(instance, 0), None);
    /// ```
    pub fn retrieve(&self, instance: InstanceId, step: usize) -> Option<usize> {
        let (group, tape) = self.tape(instance)?;
        group.retrieve(tape, step)
    }

    /// Replay of everything recorded for `instance`.
    pub fn playback(&self, instance: InstanceId) -> Option<Playback<'_>> {
        let (group, tape) = self.tape(instance)?;
        Some(Playback::new(group, &tape.segments))
    }

    /// Sliding-window pattern frequencies over `instance`'s playback.
    ///
    /// Every length in `windows` is slid over the recorded states whose
    /// absolute step lies in `steps` (all of them when `None`). Windows
    /// run across gaps in the recording. Zero lengths are ignored;
    /// lengths longer than the data contribute nothing. Returns
    /// `None` when nothing is recorded in range.
    pub fn count(
        &self,
        instance: InstanceId,
        windows: &[usize],
        steps: Option<Range<usize>>,
    ) -> Option<IndexMap<Pattern, usize>> {
        let (group, tape) = self.tape(instance)?;
        let states: Vec<usize> = match steps {
            None => self.playback(instance)?.collect(),
            Some(range) => group
                .steps(tape)
                .filter(|(step, _)| range.contains(step))
                .map(|(_, state)| state)
                .collect(),
        };
        if states.is_empty() {
            return None;
        }
        let mut counts = IndexMap::new();
        for &w in windows.iter().filter(|&&w| w > 0) {
            for window in states.windows(w) {
                *counts.entry(Pattern::from_slice(window)).or_insert(0) += 1;
            }
        }
        Some(counts)
    }

    /// Storage counters.
    pub fn stats(&self) -> LogStats {
        let mut stats = LogStats {
            instances: self.members.len(),
            ..LogStats::default()
        };
        for group in self.groups.values() {
            if !group.tapes.is_empty() {
                stats.groups += 1;
            }
            stats.raw_segments += group.raws.len();
            stats.raw_states += group.raws.iter().map(|r| r.data.len()).sum::<usize>();
            for seg in group.tapes.values().flat_map(|t| t.segments.iter()) {
                if let Segment::Ref { len, .. } = seg {
                    stats.ref_segments += 1;
                    stats.ref_states += len;
                }
            }
        }
        stats
    }
}

impl EventSink for EventLog {
    fn id(&self) -> LogId {
        EventLog::id(self)
    }

    fn is_open(&self) -> bool {
        EventLog::is_open(self)
    }

    fn attach(&mut self, key: TapeKey) {
        EventLog::attach(self, key);
    }

    fn put(&mut self, event: Event) -> bool {
        EventLog::put(self, event)
    }

    fn redirect(&mut self, src: TapeKey, dst: TapeKey) -> bool {
        EventLog::redirect(self, src, dst)
    }
}
