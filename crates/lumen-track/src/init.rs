//! Population control: pending initializers and vacant slots.
//!
//! Both stacks are consumed from the back. [`initialize_tracks`] fixes the
//! pairing of the i-th vacancy from the top with the i-th initializer from
//! the top before any parallel work starts, so the result does not depend
//! on how the sweep is scheduled.

use lumen_core::{
    InitError, KernelError, OpaqueId, Primary, ThreadId, TrackError, TrackId, TrackInitializer,
};
use lumen_core::types::{is_finite, is_unit};
use lumen_core::GeometryOracle;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::launch::{launch, ExecutionSpace};
use crate::params::{CutoffParams, RngParams};
use crate::state::{
    CoreState, GeoTrackState, ParticleTrackState, PhysicsTrackState, SimTrackState, StepLimit,
    TrackStatus,
};

/// Pending track initializers and the stack of vacant slots.
///
/// Between steps, `num_vacancies() + occupied slots == track_slots`.
#[derive(Clone, Debug)]
pub struct TrackInitBuffer {
    initializers: Vec<TrackInitializer>,
    capacity: usize,
    vacancies: Vec<ThreadId>,
    next_track_id: u64,
}

impl TrackInitBuffer {
    /// Buffer for `track_slots` slots (all vacant) holding at most
    /// `capacity` pending initializers.
    ///
    /// Vacancies are stacked so that slot 0 is filled first.
    pub fn new(track_slots: usize, capacity: usize) -> Self {
        Self {
            initializers: Vec::with_capacity(capacity),
            capacity,
            vacancies: (0..track_slots).rev().map(ThreadId::from_index).collect(),
            next_track_id: 0,
        }
    }

    /// Queue primaries so that they are initialized in source order.
    ///
    /// Fails without queuing anything if the buffer would overflow.
    pub fn extend_from_primaries(&mut self, primaries: &[Primary]) -> Result<(), InitError> {
        let requested = self.initializers.len() + primaries.len();
        if requested > self.capacity {
            return Err(InitError::CapacityExceeded {
                requested,
                capacity: self.capacity,
            });
        }
        self.initializers
            .extend(primaries.iter().rev().copied().map(TrackInitializer::from));
        Ok(())
    }

    /// Number of pending initializers.
    pub fn num_initializers(&self) -> usize {
        self.initializers.len()
    }

    /// Number of vacant slots.
    pub fn num_vacancies(&self) -> usize {
        self.vacancies.len()
    }

    /// Maximum number of pending initializers.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pending initializers, bottom of the stack first.
    pub fn initializers(&self) -> &[TrackInitializer] {
        &self.initializers
    }

    /// Vacant slots, bottom of the stack first.
    pub fn vacancies(&self) -> &[ThreadId] {
        &self.vacancies
    }

    /// Track id the next initialized track will receive.
    pub fn next_track_id(&self) -> TrackId {
        TrackId(self.next_track_id)
    }

    /// Pop up to `min(vacancies, initializers)` pairs and issue their ids.
    fn pop_pairs(&mut self) -> Vec<(ThreadId, TrackId, TrackInitializer)> {
        let n = self.vacancies.len().min(self.initializers.len());
        let vac_top = self.vacancies.len();
        let init_top = self.initializers.len();
        let pairs = (0..n)
            .map(|i| {
                (
                    self.vacancies[vac_top - 1 - i],
                    TrackId(self.next_track_id + i as u64),
                    self.initializers[init_top - 1 - i],
                )
            })
            .collect();
        self.vacancies.truncate(vac_top - n);
        self.initializers.truncate(init_top - n);
        self.next_track_id += n as u64;
        pairs
    }
}

/// Fill vacant slots from pending initializers.
///
/// Each new track is located in the geometry, given a fresh id, and has
/// its random stream keyed by that id. Returns the number of tracks
/// initialized.
pub fn initialize_tracks(
    geometry: &dyn GeometryOracle,
    rng: &RngParams,
    space: ExecutionSpace,
    state: &mut CoreState,
) -> Result<usize, KernelError> {
    let pairs = state.init.pop_pairs();
    if pairs.is_empty() {
        return Ok(0);
    }
    let mut assignment: Vec<Option<(TrackId, TrackInitializer)>> = vec![None; state.capacity()];
    for &(thread, track, init) in &pairs {
        assignment[thread.index()] = Some((track, init));
    }
    let seed = rng.seed;

    launch("initialize-tracks", space, state, |view| {
        let Some((track, init)) = assignment[view.thread.index()] else {
            return Ok(());
        };
        *view.particle = ParticleTrackState {
            particle: init.particle,
            energy: init.energy,
        };
        *view.geo = GeoTrackState {
            pos: init.position,
            dir: init.direction,
            ..GeoTrackState::default()
        };
        *view.physics = PhysicsTrackState::default();
        *view.sim = SimTrackState {
            track_id: Some(track),
            parent: init.parent,
            event: init.event,
            num_steps: 0,
            time: init.time,
            status: TrackStatus::Initializing,
            step_limit: StepLimit::default(),
        };
        *view.interaction = None;
        let mut stream = ChaCha8Rng::seed_from_u64(seed);
        stream.set_stream(track.0);
        *view.rng = stream;

        if !(init.energy.is_finite() && init.energy >= 0.0) {
            return Err(TrackError::InvalidEnergy {
                energy: init.energy,
            });
        }
        if !is_unit(init.direction) {
            return Err(TrackError::InvalidDirection {
                direction: init.direction,
            });
        }
        if !is_finite(init.position) {
            return Err(TrackError::OutsideGeometry {
                position: init.position,
            });
        }
        view.geo.volume = Some(geometry.locate(init.position).ok_or(
            TrackError::OutsideGeometry {
                position: init.position,
            },
        )?);
        Ok(())
    })?;
    Ok(pairs.len())
}

/// Promote this step's surviving secondaries to initializers.
///
/// Slots are scanned in order and each slot's secondaries in arena order,
/// so the resulting initializer order is independent of where the
/// secondaries landed in the arena. Secondaries below their particle's
/// production cutoff are skipped; the interaction stage has already
/// deposited their energy. Returns the number of initializers added.
pub fn extend_from_secondaries(
    cutoffs: &CutoffParams,
    state: &mut CoreState,
) -> Result<usize, InitError> {
    let CoreState {
        geo,
        sim,
        interaction,
        secondaries,
        init,
        ..
    } = state;

    let mut promoted = Vec::new();
    for (thread, outcome) in interaction.iter() {
        let Some(outcome) = outcome else { continue };
        let sim = &sim[thread];
        let Some(track) = sim.track_id else { continue };
        let pos = geo[thread].pos;
        promoted.extend(
            secondaries
                .get(outcome.secondaries)
                .filter(|s| s.energy >= cutoffs.get(s.particle).production)
                .map(|s| TrackInitializer {
                    particle: s.particle,
                    energy: s.energy,
                    position: pos,
                    direction: s.direction,
                    time: sim.time,
                    parent: Some(track),
                    event: sim.event,
                }),
        );
    }

    let requested = init.initializers.len() + promoted.len();
    if requested > init.capacity {
        return Err(InitError::CapacityExceeded {
            requested,
            capacity: init.capacity,
        });
    }
    let added = promoted.len();
    init.initializers.extend(promoted);
    Ok(added)
}

/// Start-of-step reset for every occupied slot.
///
/// Newly initialized tracks become alive, and the energy deposition and
/// interaction outcome of the previous step are cleared. A track waiting
/// to retry an interaction keeps its step limit so the along-step
/// re-selects the same model.
pub fn start_step(space: ExecutionSpace, state: &mut CoreState) -> Result<(), KernelError> {
    launch("pre-step", space, state, |track| {
        if track.sim.track_id.is_none() {
            return Ok(());
        }
        if track.sim.status == TrackStatus::Initializing {
            track.sim.status = TrackStatus::Alive;
        }
        track.physics.energy_deposition = 0.0;
        *track.interaction = None;
        if !track.physics.retry {
            track.sim.step_limit = StepLimit::default();
        }
        Ok(())
    })
}

/// Return killed slots to the vacancy stack and clear the step arena.
///
/// Must run after every consumer of this step's secondaries. Returns the
/// number of slots reclaimed.
pub fn cleanup(state: &mut CoreState) -> usize {
    let CoreState {
        sim,
        interaction,
        init,
        secondaries,
        ..
    } = state;

    let mut reclaimed = 0;
    for (thread, s) in sim.as_mut_slice().iter_mut().enumerate() {
        if s.track_id.is_some() && s.status == TrackStatus::Killed {
            s.track_id = None;
            s.status = TrackStatus::Inactive;
            interaction.as_mut_slice()[thread] = None;
            init.vacancies.push(ThreadId::from_index(thread));
            reclaimed += 1;
        }
    }
    secondaries.clear();
    reclaimed
}
