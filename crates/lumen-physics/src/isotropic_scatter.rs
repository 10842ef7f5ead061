//! Isotropic elastic scattering.

use std::f64::consts::PI;

use lumen_action::{Applicability, Interaction, Model};
use lumen_core::{ParticleId, Real3, TrackError};
use lumen_track::TrackView;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Samples a new direction uniformly on the unit sphere; the energy is
/// unchanged.
#[derive(Clone, Debug)]
pub struct IsotropicScatterModel {
    label: String,
    applicability: Applicability,
    xs: f64,
}

impl IsotropicScatterModel {
    /// Scatter the covered particles with constant cross section `xs` (1/cm).
    pub fn new(applicability: Applicability, xs: f64) -> Self {
        Self {
            label: "isotropic-scatter".to_string(),
            applicability,
            xs,
        }
    }

    /// Override the default label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Uniform direction on the unit sphere.
    pub fn sample_direction(rng: &mut ChaCha8Rng) -> Real3 {
        let cost = 2.0 * rng.random::<f64>() - 1.0;
        let sint = (1.0 - cost * cost).max(0.0).sqrt();
        let phi = 2.0 * PI * rng.random::<f64>();
        [sint * phi.cos(), sint * phi.sin(), cost]
    }
}

impl Model for IsotropicScatterModel {
    fn label(&self) -> &str {
        &self.label
    }

    fn applicability(&self) -> Applicability {
        self.applicability.clone()
    }

    fn macro_xs(&self, _particle: ParticleId, _energy: f64) -> f64 {
        self.xs
    }

    fn interact(&self, track: &mut TrackView<'_>) -> Result<Interaction, TrackError> {
        let direction = Self::sample_direction(track.rng);
        Ok(Interaction::scattered(track.particle.energy, direction))
    }
}
