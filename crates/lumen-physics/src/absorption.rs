//! Absorption model.

use lumen_action::{Applicability, Interaction, Model};
use lumen_core::{ParticleId, TrackError};
use lumen_track::TrackView;

/// Kills the track and deposits all of its kinetic energy locally.
#[derive(Clone, Debug)]
pub struct AbsorptionModel {
    label: String,
    applicability: Applicability,
    xs: f64,
}

impl AbsorptionModel {
    /// Absorb the covered particles with constant cross section `xs` (1/cm).
    pub fn new(applicability: Applicability, xs: f64) -> Self {
        Self {
            label: "absorption".to_string(),
            applicability,
            xs,
        }
    }

    /// Override the default label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

impl Model for AbsorptionModel {
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
        Ok(Interaction::absorbed(track.particle.energy))
    }
}
