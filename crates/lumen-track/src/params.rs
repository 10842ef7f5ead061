//! Immutable particle, cutoff and random-number parameters.

use lumen_core::{Collection, ParticleId};

/// Definition of one particle type.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleDef {
    /// Unique name, e.g. `"gamma"`.
    pub name: String,
    /// Rest mass (MeV).
    pub mass: f64,
    /// Charge in units of the elementary charge.
    pub charge: f64,
}

/// Table of particle definitions.
#[derive(Clone, Debug, Default)]
pub struct ParticleParams {
    defs: Collection<ParticleId, ParticleDef>,
}

impl ParticleParams {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a particle and return its id.
    pub fn insert(&mut self, name: impl Into<String>, mass: f64, charge: f64) -> ParticleId {
        self.defs.push(ParticleDef {
            name: name.into(),
            mass,
            charge,
        })
    }

    /// Look up a particle by name.
    pub fn find(&self, name: &str) -> Option<ParticleId> {
        self.defs
            .iter()
            .find(|(_, d)| d.name == name)
            .map(|(id, _)| id)
    }

    /// Definition of `id`.
    pub fn get(&self, id: ParticleId) -> Option<&ParticleDef> {
        self.defs.get(id)
    }

    /// Rest mass of `id`, zero for unknown particles.
    pub fn mass(&self, id: ParticleId) -> f64 {
        self.defs.get(id).map_or(0.0, |d| d.mass)
    }

    /// Number of registered particles.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether no particles are registered.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Iterate over `(id, definition)` pairs.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (ParticleId, &ParticleDef)> + '_ {
        self.defs.iter()
    }
}

/// Energy thresholds for one particle type (MeV).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cutoff {
    /// Tracks below this energy are killed and deposit what is left.
    pub tracking: f64,
    /// Secondaries below this energy are deposited instead of tracked.
    pub production: f64,
}

/// Per-particle cutoffs; particles without an entry use zero thresholds.
#[derive(Clone, Debug, Default)]
pub struct CutoffParams {
    cutoffs: Vec<Option<Cutoff>>,
}

impl CutoffParams {
    /// No cutoffs for any particle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cutoff for `particle`.
    pub fn set(&mut self, particle: ParticleId, cutoff: Cutoff) -> &mut Self {
        let i = particle.0 as usize;
        if self.cutoffs.len() <= i {
            self.cutoffs.resize(i + 1, None);
        }
        self.cutoffs[i] = Some(cutoff);
        self
    }

    /// Cutoff for `particle`.
    pub fn get(&self, particle: ParticleId) -> Cutoff {
        self.cutoffs
            .get(particle.0 as usize)
            .copied()
            .flatten()
            .unwrap_or_default()
    }
}

/// Random-number parameters shared by every slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RngParams {
    /// Run seed; each track's stream is keyed by its track id.
    pub seed: u64,
}
