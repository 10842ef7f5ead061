//! Photon conversion to an electron-positron pair.

use lumen_action::{Applicability, Interaction, Model};
use lumen_core::{ParticleId, Secondary, TrackError};
use lumen_track::TrackView;
use rand::Rng;

/// Electron rest mass (MeV).
pub const ELECTRON_MASS: f64 = 0.510_998_95;

/// Converts a photon above `2 m_e` into an electron and a positron that
/// share the kinetic energy left after the rest masses, both emitted along
/// the photon direction. The photon is killed.
///
/// When the step arena cannot hold the pair, the interaction is reported
/// as [`Interaction::failed`] so it is retried next step.
#[derive(Clone, Debug)]
pub struct PairConversionModel {
    gamma: ParticleId,
    electron: ParticleId,
    positron: ParticleId,
    xs: f64,
}

impl PairConversionModel {
    /// Convert `gamma` into `electron` + `positron` with cross section `xs`.
    pub fn new(gamma: ParticleId, electron: ParticleId, positron: ParticleId, xs: f64) -> Self {
        Self {
            gamma,
            electron,
            positron,
            xs,
        }
    }
}

impl Model for PairConversionModel {
    fn label(&self) -> &str {
        "pair-conversion"
    }

    fn applicability(&self) -> Applicability {
        Applicability::new([self.gamma], 2.0 * ELECTRON_MASS, f64::INFINITY)
    }

    fn macro_xs(&self, _particle: ParticleId, _energy: f64) -> f64 {
        self.xs
    }

    fn interact(&self, track: &mut TrackView<'_>) -> Result<Interaction, TrackError> {
        let available = track.particle.energy - 2.0 * ELECTRON_MASS;
        if available < 0.0 {
            return Err(TrackError::Model {
                model: self.label().to_string(),
                reason: format!(
                    "photon energy {} MeV below pair threshold",
                    track.particle.energy
                ),
            });
        }
        let fraction = track.rng.random::<f64>();
        let Ok(pair) = track.secondaries.allocate(2) else {
            return Ok(Interaction::failed());
        };
        let direction = track.geo.dir;
        pair.write_all([
            Secondary {
                particle: self.electron,
                energy: fraction * available,
                direction,
            },
            Secondary {
                particle: self.positron,
                energy: (1.0 - fraction) * available,
                direction,
            },
        ])
        .map_err(|e| TrackError::Model {
            model: self.label().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Interaction::absorbed(0.0).with_secondaries(pair.span()))
    }
}
