//! Action sequence validation.
//!
//! [`ActionSequence::new`] runs once at startup to check the action list
//! and physics registry for structural errors and fix the execution
//! order, so the per-step hot path never re-checks them.

use indexmap::IndexMap;
use lumen_core::{ActionId, OpaqueId, ParticleId};

use crate::action::{Action, ActionOrder};
use crate::params::PhysicsParams;

use std::error::Error;
use std::fmt;

// ── Errors ─────────────────────────────────────────────────────────

/// Errors from pipeline validation (startup-time, not per-step).
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// No action runs in the along-step stage, so tracks would never move.
    MissingAlongStep,

    /// Two actions or two models share a label.
    DuplicateLabel {
        /// The repeated label.
        label: String,
    },

    /// No physics models are registered.
    NoModels,

    /// A model covers no particle or an empty energy range.
    InvalidApplicability {
        /// Which model.
        model: String,
    },

    /// The user step limit is not positive.
    InvalidMaxStep {
        /// The invalid limit.
        value: f64,
    },

    /// A stopping power is negative or not finite.
    InvalidEnergyLoss {
        /// Which particle.
        particle: ParticleId,
        /// The invalid stopping power.
        value: f64,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAlongStep => write!(f, "pipeline has no along-step action"),
            Self::DuplicateLabel { label } => write!(f, "duplicate label '{label}'"),
            Self::NoModels => write!(f, "no physics models registered"),
            Self::InvalidApplicability { model } => {
                write!(f, "model '{model}' has an empty applicability range")
            }
            Self::InvalidMaxStep { value } => {
                write!(f, "max step must be positive, got {value}")
            }
            Self::InvalidEnergyLoss { particle, value } => {
                write!(f, "invalid stopping power {value} for particle {particle}")
            }
        }
    }
}

impl Error for PipelineError {}

// ── Sequence ───────────────────────────────────────────────────────

/// Validated actions in execution order.
///
/// Actions are stably sorted by [`ActionOrder`], so actions within one
/// stage keep their registration order. [`ActionId`]s index the sorted
/// sequence.
pub struct ActionSequence {
    actions: Vec<Box<dyn Action>>,
}

impl ActionSequence {
    /// Validate `actions` against `physics` and fix their order.
    pub fn new(
        mut actions: Vec<Box<dyn Action>>,
        physics: &PhysicsParams,
    ) -> Result<Self, PipelineError> {
        Self::validate(&actions, physics)?;
        actions.sort_by_key(|a| a.order());
        Ok(Self { actions })
    }

    /// Check `actions` and `physics` without building a sequence.
    ///
    /// Labels must be unique across actions and models, at least one
    /// action must run in the along-step stage, and the physics registry
    /// must pass [`PhysicsParams::validate`].
    pub fn validate(
        actions: &[Box<dyn Action>],
        physics: &PhysicsParams,
    ) -> Result<(), PipelineError> {
        let mut seen: IndexMap<&str, usize> = IndexMap::new();
        for (i, action) in actions.iter().enumerate() {
            if seen.insert(action.label(), i).is_some() {
                return Err(PipelineError::DuplicateLabel {
                    label: action.label().to_string(),
                });
            }
        }
        if !actions
            .iter()
            .any(|a| a.order() == ActionOrder::AlongStep)
        {
            return Err(PipelineError::MissingAlongStep);
        }
        physics.validate()?;
        for (_, model) in physics.models() {
            if seen.contains_key(model.label()) {
                return Err(PipelineError::DuplicateLabel {
                    label: model.label().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the sequence is empty (never true once validated).
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// All actions in execution order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (ActionId, &dyn Action)> + '_ {
        self.actions
            .iter()
            .enumerate()
            .map(|(i, a)| (ActionId::from_index(i), a.as_ref()))
    }

    /// Actions of one stage, in execution order.
    pub fn stage(&self, order: ActionOrder) -> impl Iterator<Item = (ActionId, &dyn Action)> + '_ {
        self.iter().filter(move |(_, a)| a.order() == order)
    }

    /// Action with id `id`.
    pub fn get(&self, id: ActionId) -> Option<&dyn Action> {
        self.actions.get(id.index()).map(|a| a.as_ref())
    }

    /// Labels in execution order.
    pub fn labels(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.label()).collect()
    }
}

impl fmt::Debug for ActionSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.labels()).finish()
    }
}
