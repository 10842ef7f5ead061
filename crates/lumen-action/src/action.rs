//! The [`Action`] trait and [`ActionOrder`] enum.

use lumen_core::KernelError;
use lumen_track::CoreState;

use crate::params::CoreParams;

/// Stage of the step an action runs in.
///
/// Stages run in declaration order; discrete interactions are launched
/// between [`AlongStep`](Self::AlongStep) and [`PostStep`](Self::PostStep).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionOrder {
    /// Runs after the stepper's own per-step reset.
    PreStep,
    /// Choose the step length and move the track.
    AlongStep,
    /// Apply interaction outcomes.
    PostStep,
}

impl ActionOrder {
    /// Short name used in metrics and error labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreStep => "pre-step",
            Self::AlongStep => "along-step",
            Self::PostStep => "post-step",
        }
    }
}

/// One stage of the per-step pipeline, applied to every slot.
///
/// # Contract
///
/// - `execute()` MUST give the same result however the sweep is scheduled.
/// - `&self`: actions are stateless; per-track state lives in
///   [`CoreState`] and shared parameters in [`CoreParams`].
/// - Failures are returned as a [`KernelError`] after the whole sweep, or
///   abort on the device, by running the sweep through
///   [`lumen_track::launch`] with `params.space`.
///
/// # Object safety
///
/// This trait is object-safe; the engine stores actions as
/// `Vec<Box<dyn Action>>`.
pub trait Action: Send + Sync + 'static {
    /// Unique label for error reporting and metrics.
    fn label(&self) -> &str;

    /// One-line description.
    fn description(&self) -> &str {
        ""
    }

    /// Stage this action belongs to.
    fn order(&self) -> ActionOrder;

    /// Run the action over every slot.
    fn execute(&self, params: &CoreParams, state: &mut CoreState) -> Result<(), KernelError>;
}
