//! [`ProcessInstance`]: the state machine behind every realization.

use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use rand::Rng;
use strand_core::{
    Emitter, Event, GroupKey, IdAllocator, InstanceId, LogId, SinkRef, StepError, TapeKey,
    ValidationError,
};
use strand_model::{ModelPatch, TransitionModel};
use tracing::{debug, trace, warn};

use crate::builder::ProcessBuilder;
use crate::config::{ForcePolicy, ProcessConfig};
use crate::iter::States;
use crate::stream::RandomStream;
use crate::tap::StateTap;

// ── Observation / StopPredicate ────────────────────────────────────

/// What a stop predicate gets to see.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Observation {
    /// States produced so far.
    pub step: usize,
    /// The most recent state.
    pub state: usize,
}

/// Termination rule of a finite instance.
///
/// Evaluated before every draw after the first; `true` stops the
/// instance. Must be pure: branches share the same predicate.
pub type StopPredicate = Rc<dyn Fn(&Observation) -> bool>;

// ── Phase ──────────────────────────────────────────────────────────

/// Lifecycle of an instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No state produced yet.
    Unstarted,
    /// At least one state produced, not exhausted.
    Producing,
    /// Exhausted; `advance()` keeps returning `Ok(None)`.
    Stopped,
}

// ── BranchOverrides ────────────────────────────────────────────────

/// Changes applied to a branch (and only the branch) at creation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BranchOverrides {
    /// Fields of the parent's model to replace for the branch.
    pub model: ModelPatch,
    /// State the branch is forced into on its next step.
    pub state: Option<usize>,
}

impl BranchOverrides {
    /// Override only the next state.
    pub fn state(state: usize) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    /// Override only model fields.
    pub fn model(patch: ModelPatch) -> Self {
        Self {
            model: patch,
            state: None,
        }
    }
}

#[derive(Clone)]
pub(crate) enum Kind {
    Endless,
    Finite { stop: StopPredicate },
    Dependent { upstream: StateTap },
}

impl Kind {
    fn name(&self) -> &'static str {
        match self {
            Kind::Endless => "endless instance",
            Kind::Finite { .. } => "finite instance",
            Kind::Dependent { .. } => "dependent instance",
        }
    }

    /// Shape rule tying a model to this kind of instance.
    pub(crate) fn check(&self, model: &TransitionModel) -> Result<(), ValidationError> {
        let (inputs, outputs) = model.shape();
        match self {
            Kind::Dependent { upstream } if upstream.output_size() != inputs => {
                Err(ValidationError::ShapeMismatch {
                    upstream_outputs: upstream.output_size(),
                    inputs,
                })
            }
            Kind::Dependent { .. } => Ok(()),
            _ if inputs != outputs => Err(ValidationError::ModelNotSquare {
                what: self.name(),
                inputs,
                outputs,
            }),
            _ => Ok(()),
        }
    }
}

/// Where the next state comes from, decided before anything is mutated.
enum Source {
    Exhausted,
    Own,
    Upstream(usize),
}

// ── ProcessInstance ────────────────────────────────────────────────

/// One running realization of a [`TransitionModel`].
///
/// Produces states one at a time through [`advance`](Self::advance),
/// pushing every produced state as an [`Event`] to the sinks it is bound
/// to. The model is shared; the random stream, step counter and bound
/// sinks are private to the instance.
pub struct ProcessInstance {
    pub(crate) id: InstanceId,
    pub(crate) ids: IdAllocator,
    pub(crate) model: Arc<TransitionModel>,
    pub(crate) kind: Kind,
    pub(crate) phase: Phase,
    pub(crate) current: Option<usize>,
    pub(crate) forced: Option<usize>,
    pub(crate) step: usize,
    pub(crate) stream: RandomStream,
    pub(crate) tap: StateTap,
    pub(crate) sinks: Vec<(LogId, SinkRef)>,
    pub(crate) config: ProcessConfig,
}

impl ProcessInstance {
    /// Start configuring an instance driven by `model`.
    pub fn builder(model: Arc<TransitionModel>) -> ProcessBuilder {
        ProcessBuilder::new(model)
    }

    /// An instance that never stops.
    ///
    /// # Errors
    ///
    /// The model is not square.
    pub fn endless(model: Arc<TransitionModel>, ids: &IdAllocator) -> Result<Self, ValidationError> {
        Self::builder(model).build(ids)
    }

    /// An instance that stops once `stop` returns `true`.
    ///
    /// # Errors
    ///
    /// The model is not square.
    pub fn finite<F>(
        model: Arc<TransitionModel>,
        stop: F,
        ids: &IdAllocator,
    ) -> Result<Self, ValidationError>
    where
        F: Fn(&Observation) -> bool + 'static,
    {
        Self::builder(model).stop_when(stop).build(ids)
    }

    /// An instance whose transitions are driven by `upstream`'s state.
    ///
    /// # Errors
    ///
    /// The model's input size differs from the upstream's output size.
    pub fn dependent(
        model: Arc<TransitionModel>,
        upstream: &ProcessInstance,
        ids: &IdAllocator,
    ) -> Result<Self, ValidationError> {
        Self::builder(model).upstream(upstream.tap()).build(ids)
    }

    // ── stepping ───────────────────────────────────────────────────

    /// Produce the next state.
    ///
    /// Returns `Ok(None)` once the instance is exhausted, and keeps doing
    /// so on every later call.
    ///
    /// # Errors
    ///
    /// [`StepError::UpstreamUnstarted`] when a dependent instance is
    /// advanced before its upstream produced anything, and
    /// [`StepError::Invariant`] when sampling hits a broken distribution.
    pub fn advance(&mut self) -> Result<Option<usize>, StepError> {
        if self.phase == Phase::Stopped {
            return Ok(None);
        }
        let state = match self.source()? {
            Source::Exhausted => {
                self.stop();
                return Ok(None);
            }
            Source::Own => self.next_own()?,
            Source::Upstream(from) => self.next_dependent(from)?,
        };

        self.current = Some(state);
        self.phase = Phase::Producing;
        self.emit(state);
        self.step += 1;
        self.tap.publish(self.current, false);
        Ok(Some(state))
    }

    fn source(&self) -> Result<Source, StepError> {
        match &self.kind {
            Kind::Endless => Ok(Source::Own),
            Kind::Finite { stop } => match self.current {
                Some(state) if self.step > 0 && stop(&Observation { step: self.step, state }) => {
                    Ok(Source::Exhausted)
                }
                _ => Ok(Source::Own),
            },
            Kind::Dependent { upstream } => {
                if upstream.is_stopped() {
                    return Ok(Source::Exhausted);
                }
                upstream
                    .state()
                    .map(Source::Upstream)
                    .ok_or(StepError::UpstreamUnstarted {
                        upstream: upstream.source(),
                    })
            }
        }
    }

    fn next_own(&mut self) -> Result<usize, StepError> {
        let first = self.phase == Phase::Unstarted;
        if let Some(state) = self.take_forced(!first) {
            return Ok(state);
        }
        match self.current {
            Some(from) if !first => Ok(self.model.sample_transition(from, self.stream.next_draw())?),
            _ => {
                // Initial picks never touch the instance stream.
                let draw = if self.model.initial_needs_draw() {
                    rand::rng().random::<f64>()
                } else {
                    0.0
                };
                Ok(self.model.sample_initial(draw)?)
            }
        }
    }

    fn next_dependent(&mut self, from: usize) -> Result<usize, StepError> {
        if let Some(state) = self.take_forced(true) {
            return Ok(state);
        }
        Ok(self.model.sample_transition(from, self.stream.next_draw())?)
    }

    /// Consume a pending forced state. `would_draw` says whether the
    /// step being replaced would have used the instance stream.
    fn take_forced(&mut self, would_draw: bool) -> Option<usize> {
        let state = self.forced.take()?;
        if would_draw && self.config.force_policy == ForcePolicy::ConsumeDraw {
            self.stream.next_draw();
        }
        trace!(instance = %self.id, step = self.step, state, "forced state consumed");
        Some(state)
    }

    fn stop(&mut self) {
        self.phase = Phase::Stopped;
        self.tap.publish(self.current, true);
        debug!(instance = %self.id, steps = self.step, "process exhausted");
    }

    fn emit(&mut self, state: usize) {
        let event = Event {
            group: self.group(),
            instance: self.id,
            step: self.step,
            state,
        };
        self.sinks.retain(|(log, weak)| {
            let Some(sink) = weak.upgrade() else {
                return false;
            };
            let Ok(mut sink) = sink.try_borrow_mut() else {
                warn!(
                    instance = %event.instance,
                    log = %log,
                    step = event.step,
                    "log already borrowed, event dropped"
                );
                return true;
            };
            if !sink.is_open() {
                return false;
            }
            sink.put(event);
            true
        });
    }

    /// Force the state produced by the next step.
    ///
    /// # Errors
    ///
    /// `state` is outside the model's output space.
    pub fn force_next(&mut self, state: usize) -> Result<(), ValidationError> {
        let size = self.model.output_size();
        if state >= size {
            return Err(ValidationError::ForcedStateOutOfRange { state, size });
        }
        self.forced = Some(state);
        Ok(())
    }

    // ── branching ──────────────────────────────────────────────────

    /// Split off an independent continuation of this instance.
    ///
    /// The branch gets a fresh id and a fork of the random stream, and
    /// copies the step counter, current state, phase and any pending
    /// forced state. `overrides` are applied to the branch only. Every
    /// live sink of the parent is subscribed to the branch and asked to
    /// share the parent's recorded prefix with it.
    ///
    /// # Errors
    ///
    /// The patched model is invalid or no longer fits this kind of
    /// instance, or the forced state is out of range for it.
    pub fn branch(&self, overrides: &BranchOverrides) -> Result<ProcessInstance, ValidationError> {
        let model = if overrides.model.is_empty() {
            Arc::clone(&self.model)
        } else {
            Arc::new(self.model.variant(&overrides.model)?)
        };
        self.kind.check(&model)?;
        let forced = overrides.state.or(self.forced);
        if let Some(state) = forced {
            if state >= model.output_size() {
                return Err(ValidationError::ForcedStateOutOfRange {
                    state,
                    size: model.output_size(),
                });
            }
        }

        let id = self.ids.next_instance();
        let tap = StateTap::new(id, model.output_size());
        tap.publish(self.current, self.phase == Phase::Stopped);
        let mut branch = ProcessInstance {
            id,
            ids: self.ids.clone(),
            model,
            kind: self.kind.clone(),
            phase: self.phase,
            current: self.current,
            forced,
            step: self.step,
            stream: self.stream.fork(),
            tap,
            sinks: Vec::with_capacity(self.sinks.len()),
            config: self.config.clone(),
        };

        let (src, dst) = (self.key(), branch.key());
        for (log, weak) in &self.sinks {
            let Some(sink) = weak.upgrade() else {
                continue;
            };
            let Ok(mut sink) = sink.try_borrow_mut() else {
                warn!(parent = %self.id, log = %log, "log already borrowed, branch not subscribed");
                continue;
            };
            if !sink.is_open() {
                continue;
            }
            sink.attach(dst);
            if !sink.redirect(src, dst) {
                debug!(parent = %src, branch = %dst, log = %log, "prefix not shared");
            }
            branch.bind(*log, Weak::clone(weak));
        }

        debug!(parent = %self.id, branch = %id, step = self.step, "branched");
        Ok(branch)
    }

    // ── iteration ──────────────────────────────────────────────────

    /// Lazy iterator over the remaining states.
    ///
    /// Resumes where the instance is; ends at exhaustion. Stops for good
    /// after yielding an error.
    pub fn states(&mut self) -> States<'_> {
        States::new(self)
    }

    /// The next `n` states, fewer if the instance is exhausted first.
    pub fn take(&mut self, n: usize) -> Result<Vec<usize>, StepError> {
        self.states().take(n).collect()
    }

    /// Every remaining state. Does not return for an endless instance.
    pub fn take_all(&mut self) -> Result<Vec<usize>, StepError> {
        self.states().collect()
    }

    /// Advance `n` times discarding the states; returns how many were
    /// actually produced.
    pub fn skip(&mut self, n: usize) -> Result<usize, StepError> {
        let mut produced = 0;
        for state in self.states().take(n) {
            state?;
            produced += 1;
        }
        Ok(produced)
    }

    // ── accessors ──────────────────────────────────────────────────

    /// This instance's id.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// States produced so far.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Latest state, `None` before the first step.
    pub fn state(&self) -> Option<usize> {
        self.current
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the instance is exhausted.
    pub fn is_stopped(&self) -> bool {
        self.phase == Phase::Stopped
    }

    /// The driving model.
    pub fn model(&self) -> &Arc<TransitionModel> {
        &self.model
    }

    /// Dedup group the instance records under (its model's seed).
    pub fn group(&self) -> GroupKey {
        self.model.group()
    }

    /// Read-only view of this instance for dependents.
    pub fn tap(&self) -> StateTap {
        self.tap.clone()
    }

    /// State forced for the next step, if any.
    pub fn pending_forced(&self) -> Option<usize> {
        self.forced
    }

    /// Number of sinks currently bound (including ones dropped since the
    /// last emit).
    pub fn bound_sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// The instance's configuration.
    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    /// The instance's random stream.
    pub fn stream(&self) -> &RandomStream {
        &self.stream
    }
}

impl Emitter for ProcessInstance {
    fn key(&self) -> TapeKey {
        TapeKey::new(self.group(), self.id)
    }

    fn bind(&mut self, id: LogId, sink: SinkRef) {
        if !self.sinks.iter().any(|(bound, _)| *bound == id) {
            self.sinks.push((id, sink));
        }
    }

    fn unbind(&mut self, id: LogId) {
        self.sinks.retain(|(bound, _)| *bound != id);
    }
}

impl fmt::Debug for ProcessInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessInstance")
            .field("id", &self.id)
            .field("kind", &self.kind.name())
            .field("phase", &self.phase)
            .field("step", &self.step)
            .field("current", &self.current)
            .field("forced", &self.forced)
            .field("sinks", &self.sinks.len())
            .finish_non_exhaustive()
    }
}
