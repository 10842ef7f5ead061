//! Error types for track stepping, population control and the step loop.
//!
//! Organized by scope: a single track ([`TrackError`], wrapped with its
//! slot context in [`TrackFailure`]), a parallel sweep ([`KernelError`]),
//! the initializer buffer ([`InitError`]) and a whole step ([`StepError`]).

use std::error::Error;
use std::fmt;

use crate::id::{EventId, ParticleId, ThreadId, TrackId, VolumeId};
use crate::types::Real3;

/// An invariant violation detected while stepping one track.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackError {
    /// Kinetic energy is negative or not finite.
    InvalidEnergy {
        /// The offending energy (MeV).
        energy: f64,
    },
    /// Direction is not a finite unit vector.
    InvalidDirection {
        /// The offending direction.
        direction: Real3,
    },
    /// The track is not inside any geometry volume.
    OutsideGeometry {
        /// Position at which location failed.
        position: Real3,
    },
    /// A model was selected for a track outside its applicability.
    NoApplicableModel {
        /// Particle type.
        particle: ParticleId,
        /// Kinetic energy (MeV).
        energy: f64,
    },
    /// A model rejected the track state.
    Model {
        /// Model label.
        model: String,
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnergy { energy } => write!(f, "invalid kinetic energy {energy} MeV"),
            Self::InvalidDirection { direction } => {
                write!(f, "direction {direction:?} is not a unit vector")
            }
            Self::OutsideGeometry { position } => {
                write!(f, "position {position:?} is outside the geometry")
            }
            Self::NoApplicableModel { particle, energy } => write!(
                f,
                "no model applies to particle {particle} at {energy} MeV"
            ),
            Self::Model { model, reason } => write!(f, "model '{model}' failed: {reason}"),
        }
    }
}

impl Error for TrackError {}

/// A [`TrackError`] together with the state of the slot that raised it.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackFailure {
    /// Label of the action or model whose sweep failed.
    pub label: String,
    /// Slot index.
    pub thread: ThreadId,
    /// Event of the track.
    pub event: EventId,
    /// Track occupying the slot.
    pub track: Option<TrackId>,
    /// Parent of the track.
    pub parent: Option<TrackId>,
    /// Steps taken by the track so far.
    pub num_steps: u32,
    /// Particle type.
    pub particle: ParticleId,
    /// Kinetic energy (MeV).
    pub energy: f64,
    /// Position (cm).
    pub position: Real3,
    /// Direction.
    pub direction: Real3,
    /// Current volume.
    pub volume: Option<VolumeId>,
    /// Volume on the far side of the next boundary, if known.
    pub next_volume: Option<VolumeId>,
    /// The underlying error.
    pub error: TrackError,
}

fn fmt_opt<T: fmt::Display>(v: &Option<T>) -> String {
    match v {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

impl fmt::Display for TrackFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} in '{}' (thread={}, event={}, track={}, parent={}, steps={}, \
             particle={}, energy={} MeV, pos={:?}, dir={:?}, volume={}, next_volume={})",
            self.error,
            self.label,
            self.thread,
            self.event,
            fmt_opt(&self.track),
            fmt_opt(&self.parent),
            self.num_steps,
            self.particle,
            self.energy,
            self.position,
            self.direction,
            fmt_opt(&self.volume),
            fmt_opt(&self.next_volume),
        )
    }
}

impl Error for TrackFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

/// One or more slots failed during a host sweep.
///
/// Carries the failure of the lowest [`ThreadId`] and the number of other
/// failures captured in the same sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct KernelError {
    /// First failure in slot order.
    pub first: Box<TrackFailure>,
    /// Failures in the same sweep that were not reported.
    pub suppressed: usize,
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        if self.suppressed > 0 {
            write!(f, " (+{} more)", self.suppressed)?;
        }
        Ok(())
    }
}

impl Error for KernelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.first.as_ref())
    }
}

/// Errors from the track initializer buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitError {
    /// More initializers than the buffer can hold.
    CapacityExceeded {
        /// Total initializers that would be held.
        requested: usize,
        /// Configured buffer capacity.
        capacity: usize,
    },
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                capacity,
            } => write!(
                f,
                "track initializer capacity exceeded: {requested} requested, capacity {capacity}"
            ),
        }
    }
}

impl Error for InitError {}

/// Errors from executing one step of the transport loop.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// A parallel sweep captured per-track failures.
    Kernel(KernelError),
    /// Initializer buffer overflow.
    Init(InitError),
    /// A previous step failed; the run cannot continue deterministically.
    StepDisabled,
    /// The configured step budget has been used up.
    StepBudgetExhausted,
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kernel(e) => write!(f, "kernel failed: {e}"),
            Self::Init(e) => write!(f, "track initialization failed: {e}"),
            Self::StepDisabled => write!(f, "stepping disabled after a failed step"),
            Self::StepBudgetExhausted => write!(f, "step budget exhausted"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Kernel(e) => Some(e),
            Self::Init(e) => Some(e),
            _ => None,
        }
    }
}

impl From<KernelError> for StepError {
    fn from(e: KernelError) -> Self {
        Self::Kernel(e)
    }
}

impl From<InitError> for StepError {
    fn from(e: InitError) -> Self {
        Self::Init(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(thread: u32) -> TrackFailure {
        TrackFailure {
            label: "along-step".into(),
            thread: ThreadId(thread),
            event: EventId(0),
            track: Some(TrackId(5)),
            parent: None,
            num_steps: 2,
            particle: ParticleId(0),
            energy: -1.0,
            position: [0.0; 3],
            direction: [0.0, 0.0, 1.0],
            volume: Some(VolumeId(0)),
            next_volume: None,
            error: TrackError::InvalidEnergy { energy: -1.0 },
        }
    }

    #[test]
    fn failure_display_names_context() {
        let msg = failure(3).to_string();
        assert!(msg.contains("along-step"));
        assert!(msg.contains("thread=3"));
        assert!(msg.contains("track=5"));
        assert!(msg.contains("parent=-"));
    }

    #[test]
    fn kernel_error_reports_suppressed_count() {
        let e = KernelError {
            first: Box::new(failure(0)),
            suppressed: 2,
        };
        assert!(e.to_string().ends_with("(+2 more)"));
        assert!(e.source().is_some());
    }

    #[test]
    fn step_error_chains_source() {
        let e = StepError::from(InitError::CapacityExceeded {
            requested: 11,
            capacity: 10,
        });
        assert!(e.to_string().contains("11 requested"));
        assert!(e.source().is_some());
        assert!(StepError::StepDisabled.source().is_none());
    }
}
