//! Per-slot state-of-record.
//!
//! Each sub-state lives in its own array indexed by
//! [`ThreadId`]. A slot holds a track iff its
//! [`SimTrackState::track_id`] is `Some`; nothing else records liveness.

use lumen_arena::{StackAllocator, StackSpan};
use lumen_core::{
    Collection, EventId, ModelId, OpaqueId, ParticleId, Real3, Secondary, SurfaceId, ThreadId,
    TrackError, TrackFailure, TrackId, VolumeId,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::init::TrackInitBuffer;

// ── Sub-states ──────────────────────────────────────────────────

/// Geometry state of a slot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GeoTrackState {
    /// Position (cm).
    pub pos: Real3,
    /// Unit direction.
    pub dir: Real3,
    /// Current volume; `None` outside the world.
    pub volume: Option<VolumeId>,
    /// Volume beyond the boundary found in the last along-step.
    pub next_volume: Option<VolumeId>,
    /// Surface the track last stopped on.
    pub surface: Option<SurfaceId>,
}

/// Particle type and kinetic energy of a slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleTrackState {
    /// Particle type.
    pub particle: ParticleId,
    /// Kinetic energy (MeV).
    pub energy: f64,
}

impl Default for ParticleTrackState {
    fn default() -> Self {
        Self {
            particle: ParticleId(0),
            energy: 0.0,
        }
    }
}

/// Physics bookkeeping of a slot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhysicsTrackState {
    /// Mean free paths left before the next discrete interaction;
    /// `None` until sampled.
    pub num_mfp: Option<f64>,
    /// Energy deposited this step (MeV).
    pub energy_deposition: f64,
    /// The last interaction could not allocate secondaries and must be
    /// re-sampled by the same model.
    pub retry: bool,
}

/// Lifecycle status of a slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrackStatus {
    /// No track.
    #[default]
    Inactive,
    /// Populated from an initializer, not yet stepped.
    Initializing,
    /// Being stepped.
    Alive,
    /// Terminated this step; reclaimed at cleanup.
    Killed,
}

/// What limited the last step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepLimitAction {
    /// Distance to the next geometry boundary.
    Boundary,
    /// A discrete interaction of the given model.
    Interact(ModelId),
    /// Range left under continuous energy loss.
    Range,
    /// Maximum step length imposed by the user.
    UserLimit,
    /// An interaction was sampled but no model applies at the energy
    /// left after continuous loss; the track continues.
    Rejected,
}

/// Length and cause of the last step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepLimit {
    /// Step length (cm).
    pub step: f64,
    /// Limiting process; `None` before the first along-step.
    pub action: Option<StepLimitAction>,
}

/// Identity and lifecycle bookkeeping of a slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimTrackState {
    /// Track in the slot; `None` when vacant.
    pub track_id: Option<TrackId>,
    /// Track that produced this one; `None` for primaries.
    pub parent: Option<TrackId>,
    /// Event of the lineage.
    pub event: EventId,
    /// Completed steps.
    pub num_steps: u32,
    /// Lab time (s).
    pub time: f64,
    /// Lifecycle status.
    pub status: TrackStatus,
    /// Last step limit.
    pub step_limit: StepLimit,
}

impl Default for SimTrackState {
    fn default() -> Self {
        Self {
            track_id: None,
            parent: None,
            event: EventId(0),
            num_steps: 0,
            time: 0.0,
            status: TrackStatus::Inactive,
            step_limit: StepLimit::default(),
        }
    }
}

impl SimTrackState {
    /// Whether the slot is being stepped this iteration.
    pub fn is_alive(&self) -> bool {
        self.track_id.is_some() && self.status == TrackStatus::Alive
    }
}

/// Post-interaction status written by a model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InteractionAction {
    /// Track continues unchanged.
    Unchanged,
    /// Track continues with new energy and direction.
    Scattered,
    /// Track is killed.
    Absorbed,
    /// Secondary storage was exhausted; retry next step.
    Failed,
}

/// Outcome of one discrete interaction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interaction {
    /// Status of the incident track.
    pub action: InteractionAction,
    /// Outgoing kinetic energy (MeV).
    pub energy: f64,
    /// Outgoing direction.
    pub direction: Real3,
    /// Secondaries written to the step arena.
    pub secondaries: StackSpan,
    /// Energy deposited locally (MeV).
    pub energy_deposition: f64,
}

impl Interaction {
    /// Kill the incident track, depositing `energy_deposition`.
    pub fn absorbed(energy_deposition: f64) -> Self {
        Self {
            action: InteractionAction::Absorbed,
            energy: 0.0,
            direction: [0.0; 3],
            secondaries: StackSpan::EMPTY,
            energy_deposition,
        }
    }

    /// Secondary allocation failed.
    pub fn failed() -> Self {
        Self {
            action: InteractionAction::Failed,
            energy: 0.0,
            direction: [0.0; 3],
            secondaries: StackSpan::EMPTY,
            energy_deposition: 0.0,
        }
    }

    /// Continue with new kinematics.
    pub fn scattered(energy: f64, direction: Real3) -> Self {
        Self {
            action: InteractionAction::Scattered,
            energy,
            direction,
            secondaries: StackSpan::EMPTY,
            energy_deposition: 0.0,
        }
    }

    /// Attach emitted secondaries.
    pub fn with_secondaries(mut self, span: StackSpan) -> Self {
        self.secondaries = span;
        self
    }
}

// ── Views ───────────────────────────────────────────────────────

/// Exclusive access to one slot during a parallel sweep.
pub struct TrackView<'a> {
    /// Slot index.
    pub thread: ThreadId,
    /// Geometry state.
    pub geo: &'a mut GeoTrackState,
    /// Particle state.
    pub particle: &'a mut ParticleTrackState,
    /// Physics state.
    pub physics: &'a mut PhysicsTrackState,
    /// Simulation bookkeeping.
    pub sim: &'a mut SimTrackState,
    /// Interaction outcome for the current step.
    pub interaction: &'a mut Option<Interaction>,
    /// Per-track random stream.
    pub rng: &'a mut ChaCha8Rng,
    /// Step arena shared by every slot.
    pub secondaries: &'a StackAllocator<Secondary>,
}

impl TrackView<'_> {
    /// Kill the track at the end of this step.
    pub fn kill(&mut self) {
        self.sim.status = TrackStatus::Killed;
    }

    /// Attach slot context to `error`.
    pub fn failure(&self, label: &str, error: TrackError) -> TrackFailure {
        TrackFailure {
            label: label.to_string(),
            thread: self.thread,
            event: self.sim.event,
            track: self.sim.track_id,
            parent: self.sim.parent,
            num_steps: self.sim.num_steps,
            particle: self.particle.particle,
            energy: self.particle.energy,
            position: self.geo.pos,
            direction: self.geo.dir,
            volume: self.geo.volume,
            next_volume: self.geo.next_volume,
            error,
        }
    }
}

/// Read-only view of one slot, for diagnostics.
#[derive(Clone, Copy, Debug)]
pub struct TrackRef<'a> {
    /// Slot index.
    pub thread: ThreadId,
    /// Geometry state.
    pub geo: &'a GeoTrackState,
    /// Particle state.
    pub particle: &'a ParticleTrackState,
    /// Physics state.
    pub physics: &'a PhysicsTrackState,
    /// Simulation bookkeeping.
    pub sim: &'a SimTrackState,
    /// Interaction outcome for the current step.
    pub interaction: Option<&'a Interaction>,
}

// ── CoreState ───────────────────────────────────────────────────

/// The state-of-record of every track slot for one run.
///
/// Allocated once with a fixed slot count; nothing is resized while
/// stepping.
pub struct CoreState {
    pub(crate) geo: Collection<ThreadId, GeoTrackState>,
    pub(crate) particle: Collection<ThreadId, ParticleTrackState>,
    pub(crate) physics: Collection<ThreadId, PhysicsTrackState>,
    pub(crate) sim: Collection<ThreadId, SimTrackState>,
    pub(crate) interaction: Collection<ThreadId, Option<Interaction>>,
    pub(crate) rng: Collection<ThreadId, ChaCha8Rng>,
    pub(crate) secondaries: StackAllocator<Secondary>,
    pub(crate) init: TrackInitBuffer,
}

impl CoreState {
    /// Allocate state for `track_slots` slots, an initializer buffer of
    /// `initializer_capacity` and a secondary arena of `secondary_capacity`.
    pub fn new(track_slots: usize, initializer_capacity: usize, secondary_capacity: usize) -> Self {
        Self {
            geo: Collection::from_fn(track_slots, |_| GeoTrackState::default()),
            particle: Collection::from_fn(track_slots, |_| ParticleTrackState::default()),
            physics: Collection::from_fn(track_slots, |_| PhysicsTrackState::default()),
            sim: Collection::from_fn(track_slots, |_| SimTrackState::default()),
            interaction: Collection::from_fn(track_slots, |_| None),
            rng: Collection::from_fn(track_slots, |_| ChaCha8Rng::seed_from_u64(0)),
            secondaries: StackAllocator::new(secondary_capacity),
            init: TrackInitBuffer::new(track_slots, initializer_capacity),
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.sim.len()
    }

    /// Occupied slots: `capacity - |vacancies|`.
    pub fn num_alive(&self) -> usize {
        self.capacity() - self.init.num_vacancies()
    }

    /// Pending initializers.
    pub fn num_initializers(&self) -> usize {
        self.init.num_initializers()
    }

    /// The initializer buffer.
    pub fn init(&self) -> &TrackInitBuffer {
        &self.init
    }

    /// Mutable initializer buffer, for loading primaries.
    pub fn init_mut(&mut self) -> &mut TrackInitBuffer {
        &mut self.init
    }

    /// The per-step secondary arena.
    pub fn secondaries(&self) -> &StackAllocator<Secondary> {
        &self.secondaries
    }

    /// Read-only view of slot `thread`.
    pub fn slot(&self, thread: ThreadId) -> Option<TrackRef<'_>> {
        Some(TrackRef {
            thread,
            geo: self.geo.get(thread)?,
            particle: self.particle.get(thread)?,
            physics: self.physics.get(thread)?,
            sim: self.sim.get(thread)?,
            interaction: self.interaction.get(thread)?.as_ref(),
        })
    }

    /// Read-only views of every slot in slot order.
    pub fn slots(&self) -> impl ExactSizeIterator<Item = TrackRef<'_>> + '_ {
        self.sim.iter().map(move |(thread, sim)| TrackRef {
            thread,
            geo: &self.geo[thread],
            particle: &self.particle[thread],
            physics: &self.physics[thread],
            sim,
            interaction: self.interaction[thread].as_ref(),
        })
    }

    /// Number of slots holding a track, counted from the sim states.
    pub fn count_occupied(&self) -> usize {
        self.sim
            .as_slice()
            .iter()
            .filter(|s| s.track_id.is_some())
            .count()
    }

    /// Parallel iterator over mutable views of every slot.
    pub fn par_views(&mut self) -> impl IndexedParallelIterator<Item = TrackView<'_>> + '_ {
        let Self {
            geo,
            particle,
            physics,
            sim,
            interaction,
            rng,
            secondaries,
            ..
        } = self;
        let secondaries = &*secondaries;
        (
            geo.as_mut_slice(),
            particle.as_mut_slice(),
            physics.as_mut_slice(),
            sim.as_mut_slice(),
            interaction.as_mut_slice(),
            rng.as_mut_slice(),
        )
            .into_par_iter()
            .enumerate()
            .map(
                move |(i, (geo, particle, physics, sim, interaction, rng))| TrackView {
                    thread: ThreadId::from_index(i),
                    geo,
                    particle,
                    physics,
                    sim,
                    interaction,
                    rng,
                    secondaries,
                },
            )
    }
}

impl std::fmt::Debug for CoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreState")
            .field("capacity", &self.capacity())
            .field("num_alive", &self.num_alive())
            .field("num_initializers", &self.num_initializers())
            .field("secondaries", &self.secondaries)
            .finish()
    }
}
