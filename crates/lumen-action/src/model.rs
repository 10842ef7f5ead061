//! Discrete physics models and the "launch all models" sweep.

use std::time::{Duration, Instant};

use lumen_core::{KernelError, ParticleId, TrackError};
use lumen_track::{launch, CoreState, Interaction, StepLimitAction, TrackView};
use smallvec::SmallVec;

use crate::params::CoreParams;

/// Particle types and energy range a model covers.
#[derive(Clone, Debug, PartialEq)]
pub struct Applicability {
    /// Particle types.
    pub particles: SmallVec<[ParticleId; 4]>,
    /// Lower energy bound, inclusive (MeV).
    pub lower: f64,
    /// Upper energy bound, exclusive (MeV).
    pub upper: f64,
}

impl Applicability {
    /// Cover `particles` over `[lower, upper)`.
    pub fn new(particles: impl IntoIterator<Item = ParticleId>, lower: f64, upper: f64) -> Self {
        Self {
            particles: particles.into_iter().collect(),
            lower,
            upper,
        }
    }

    /// Whether `particle` at `energy` is covered.
    pub fn applies(&self, particle: ParticleId, energy: f64) -> bool {
        self.particles.contains(&particle) && energy >= self.lower && energy < self.upper
    }

    /// Whether at least one particle is covered over a non-empty range.
    pub fn is_valid(&self) -> bool {
        !self.particles.is_empty()
            && !self.lower.is_nan()
            && !self.upper.is_nan()
            && self.lower < self.upper
    }
}

/// A discrete interaction process.
///
/// Models are immutable and shared by every slot. `interact` is called
/// only for slots whose step ended in this model, and may draw from the
/// track's random stream and reserve secondaries in the step arena.
/// When the arena is exhausted the model returns
/// [`Interaction::failed`] instead of an error.
pub trait Model: Send + Sync + 'static {
    /// Unique label for error reporting and metrics.
    fn label(&self) -> &str;

    /// Particles and energies this model covers.
    fn applicability(&self) -> Applicability;

    /// Macroscopic cross section (1/cm) for `particle` at `energy`.
    fn macro_xs(&self, particle: ParticleId, energy: f64) -> f64;

    /// Sample the outcome of an interaction for one track.
    fn interact(&self, track: &mut TrackView<'_>) -> Result<Interaction, TrackError>;
}

/// Sweep every registered model over every slot, in model order.
///
/// Each sweep examines all slots but only calls
/// [`Model::interact`] for alive slots whose step limit is
/// [`StepLimitAction::Interact`] with that model's id. A selected slot
/// outside the model's applicability fails with
/// [`TrackError::NoApplicableModel`]. Returns the wall
/// time of each model's sweep in model order.
pub fn launch_models(
    params: &CoreParams,
    state: &mut CoreState,
) -> Result<Vec<Duration>, KernelError> {
    let mut timings = Vec::with_capacity(params.physics.num_models());
    for (id, model) in params.physics.models() {
        let start = Instant::now();
        launch(model.label(), params.space, state, |track| {
            if !track.sim.is_alive()
                || track.sim.step_limit.action != Some(StepLimitAction::Interact(id))
            {
                return Ok(());
            }
            let (particle, energy) = (track.particle.particle, track.particle.energy);
            if !params.physics.applies(id, particle, energy) {
                return Err(TrackError::NoApplicableModel { particle, energy });
            }
            let outcome = model.interact(track)?;
            *track.interaction = Some(outcome);
            Ok(())
        })?;
        timings.push(start.elapsed());
    }
    Ok(timings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applicability_is_half_open() {
        let a = Applicability::new([ParticleId(0)], 1.0, 10.0);
        assert!(a.applies(ParticleId(0), 1.0));
        assert!(a.applies(ParticleId(0), 9.99));
        assert!(!a.applies(ParticleId(0), 10.0));
        assert!(!a.applies(ParticleId(1), 5.0));
        assert!(a.is_valid());
    }

    #[test]
    fn inverted_or_empty_ranges_are_invalid() {
        assert!(!Applicability::new([ParticleId(0)], 5.0, 1.0).is_valid());
        assert!(!Applicability::new(Vec::new(), 0.0, 1.0).is_valid());
        assert!(!Applicability::new([ParticleId(0)], f64::NAN, 1.0).is_valid());
    }
}
