//! Builder for [`ProcessInstance`].

use std::rc::Rc;
use std::sync::Arc;

use strand_core::{IdAllocator, ValidationError};
use strand_model::TransitionModel;

use crate::config::{ForcePolicy, ProcessConfig};
use crate::instance::{Kind, Observation, Phase, ProcessInstance};
use crate::stream::RandomStream;
use crate::tap::StateTap;

/// Configures and validates a [`ProcessInstance`].
///
/// Defaults to an endless instance. [`stop_when`](Self::stop_when) makes
/// it finite and [`upstream`](Self::upstream) makes it dependent; the
/// last of the two calls wins.
///
/// The stream seed is, in order of preference: [`seed`](Self::seed),
/// the model's seed, OS entropy.
pub struct ProcessBuilder {
    model: Arc<TransitionModel>,
    seed: Option<u64>,
    config: ProcessConfig,
    kind: Kind,
}

impl ProcessBuilder {
    pub(crate) fn new(model: Arc<TransitionModel>) -> Self {
        Self {
            model,
            seed: None,
            config: ProcessConfig::default(),
            kind: Kind::Endless,
        }
    }

    /// Seed the instance stream independently of the model seed.
    ///
    /// Does not change the dedup group, which always follows the model.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ProcessConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the forced-state stream policy.
    pub fn force_policy(mut self, policy: ForcePolicy) -> Self {
        self.config.force_policy = policy;
        self
    }

    /// Make the instance finite.
    pub fn stop_when<F>(mut self, stop: F) -> Self
    where
        F: Fn(&Observation) -> bool + 'static,
    {
        self.kind = Kind::Finite {
            stop: Rc::new(stop),
        };
        self
    }

    /// Make the instance dependent on the instance behind `tap`.
    pub fn upstream(mut self, tap: StateTap) -> Self {
        self.kind = Kind::Dependent { upstream: tap };
        self
    }

    /// Validate the shape and allocate an id.
    ///
    /// # Errors
    ///
    /// [`ValidationError::ModelNotSquare`] for an endless or finite
    /// instance on a rectangular model, [`ValidationError::ShapeMismatch`]
    /// for a dependent instance whose model does not read the upstream's
    /// output space.
    pub fn build(self, ids: &IdAllocator) -> Result<ProcessInstance, ValidationError> {
        self.kind.check(&self.model)?;
        let id = ids.next_instance();
        let stream = RandomStream::from_seed(self.seed.or(self.model.seed()));
        let tap = StateTap::new(id, self.model.output_size());
        Ok(ProcessInstance {
            id,
            ids: ids.clone(),
            model: self.model,
            kind: self.kind,
            phase: Phase::Unstarted,
            current: None,
            forced: None,
            step: 0,
            stream,
            tap,
            sinks: Vec::new(),
            config: self.config,
        })
    }
}
