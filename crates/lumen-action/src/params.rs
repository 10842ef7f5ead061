//! Immutable parameters shared by every slot for the whole run.

use std::sync::Arc;

use indexmap::IndexMap;
use lumen_core::{Collection, GeometryOracle, ModelId, ParticleId};
use lumen_track::{CutoffParams, ExecutionSpace, ParticleParams, RngParams};

use crate::model::{Applicability, Model};
use crate::pipeline::PipelineError;

/// Registered discrete models plus continuous-loss and step-limit data.
#[derive(Default)]
pub struct PhysicsParams {
    models: Collection<ModelId, Box<dyn Model>>,
    applicability: Collection<ModelId, Applicability>,
    energy_loss: IndexMap<ParticleId, f64>,
    max_step: Option<f64>,
}

impl PhysicsParams {
    /// No models, no continuous loss, no step limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model and return its id.
    pub fn add_model(&mut self, model: Box<dyn Model>) -> ModelId {
        self.applicability.push(model.applicability());
        self.models.push(model)
    }

    /// Set the stopping power of `particle` (MeV/cm).
    pub fn set_energy_loss(&mut self, particle: ParticleId, dedx: f64) -> &mut Self {
        self.energy_loss.insert(particle, dedx);
        self
    }

    /// Limit every step to at most `max_step` cm.
    pub fn set_max_step(&mut self, max_step: f64) -> &mut Self {
        self.max_step = Some(max_step);
        self
    }

    /// Number of registered models.
    pub fn num_models(&self) -> usize {
        self.models.len()
    }

    /// Registered models in id order.
    pub fn models(&self) -> impl ExactSizeIterator<Item = (ModelId, &dyn Model)> + '_ {
        self.models.iter().map(|(id, m)| (id, m.as_ref()))
    }

    /// Model with id `id`.
    pub fn model(&self, id: ModelId) -> Option<&dyn Model> {
        self.models.get(id).map(|m| m.as_ref())
    }

    /// Whether model `id` covers `particle` at `energy`.
    pub fn applies(&self, id: ModelId, particle: ParticleId, energy: f64) -> bool {
        self.applicability
            .get(id)
            .is_some_and(|a| a.applies(particle, energy))
    }

    /// Stopping power of `particle` (MeV/cm); zero if none is set.
    pub fn energy_loss(&self, particle: ParticleId) -> f64 {
        self.energy_loss.get(&particle).copied().unwrap_or(0.0)
    }

    /// User step limit (cm); infinite if none is set.
    pub fn max_step(&self) -> f64 {
        self.max_step.unwrap_or(f64::INFINITY)
    }

    /// Cross section of one model, zero where it does not apply.
    pub fn model_xs(&self, id: ModelId, particle: ParticleId, energy: f64) -> f64 {
        match (self.applicability.get(id), self.models.get(id)) {
            (Some(a), Some(m)) if a.applies(particle, energy) => {
                m.macro_xs(particle, energy).max(0.0)
            }
            _ => 0.0,
        }
    }

    /// Sum of the cross sections of every applicable model (1/cm).
    pub fn total_xs(&self, particle: ParticleId, energy: f64) -> f64 {
        self.models
            .ids()
            .map(|id| self.model_xs(id, particle, energy))
            .sum()
    }

    /// Choose a model with probability proportional to its cross section.
    ///
    /// `u` must be uniform on `[0, 1)`. Returns `None` if no model applies.
    pub fn select_model(&self, particle: ParticleId, energy: f64, u: f64) -> Option<ModelId> {
        let total = self.total_xs(particle, energy);
        if !(total > 0.0) {
            return None;
        }
        let target = u * total;
        let mut acc = 0.0;
        let mut last = None;
        for id in self.models.ids() {
            let xs = self.model_xs(id, particle, energy);
            if xs <= 0.0 {
                continue;
            }
            acc += xs;
            last = Some(id);
            if target < acc {
                return Some(id);
            }
        }
        // Rounding can leave `target` just past the accumulated sum.
        last
    }

    /// Check the registry: at least one model, unique labels and valid
    /// applicability ranges.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.models.is_empty() {
            return Err(PipelineError::NoModels);
        }
        let mut seen: IndexMap<&str, ModelId> = IndexMap::new();
        for (id, model) in self.models.iter() {
            if seen.insert(model.label(), id).is_some() {
                return Err(PipelineError::DuplicateLabel {
                    label: model.label().to_string(),
                });
            }
            if !self.applicability[id].is_valid() {
                return Err(PipelineError::InvalidApplicability {
                    model: model.label().to_string(),
                });
            }
        }
        if let Some(step) = self.max_step {
            if !(step > 0.0) {
                return Err(PipelineError::InvalidMaxStep { value: step });
            }
        }
        for (&particle, &dedx) in &self.energy_loss {
            if !(dedx.is_finite() && dedx >= 0.0) {
                return Err(PipelineError::InvalidEnergyLoss { particle, value: dedx });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for PhysicsParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsParams")
            .field(
                "models",
                &self.models().map(|(_, m)| m.label()).collect::<Vec<_>>(),
            )
            .field("energy_loss", &self.energy_loss)
            .field("max_step", &self.max_step)
            .finish()
    }
}

/// Everything the stepping stages read and nothing they write.
///
/// Built once before the run and passed by shared reference into every
/// action, model and initialization sweep.
pub struct CoreParams {
    /// Geometry navigation.
    pub geometry: Arc<dyn GeometryOracle>,
    /// Particle definitions.
    pub particles: ParticleParams,
    /// Discrete models, continuous loss and step limit.
    pub physics: PhysicsParams,
    /// Tracking and production cutoffs.
    pub cutoffs: CutoffParams,
    /// Run seed.
    pub rng: RngParams,
    /// Failure strategy for every sweep.
    pub space: ExecutionSpace,
}

impl std::fmt::Debug for CoreParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreParams")
            .field("geometry", &self.geometry.name())
            .field("particles", &self.particles)
            .field("physics", &self.physics)
            .field("rng", &self.rng)
            .field("space", &self.space)
            .finish()
    }
}
