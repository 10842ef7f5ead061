//! Benchmark profiles and reference problems for Lumen.
//!
//! - [`reference_input`]: 1024 slots, sized for the reference shower
//! - [`stress_input`]: 16384 slots
//! - [`reference_profile`]: photons showering in a 14-layer slab stack
//! - [`reference_primaries`]: a deterministic primary source

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use lumen_action::{Applicability, PhysicsParams};
use lumen_core::{EventId, ParticleId, Primary};
use lumen_engine::{RunConfig, RunInput};
use lumen_physics::{
    AbsorptionModel, IsotropicScatterModel, PairConversionModel, SlabGeometry, ELECTRON_MASS,
};
use lumen_track::{Cutoff, CutoffParams, ParticleParams};

/// Particle ids of [`reference_particles`].
pub const GAMMA: ParticleId = ParticleId(0);
/// Electron.
pub const ELECTRON: ParticleId = ParticleId(1);
/// Positron.
pub const POSITRON: ParticleId = ParticleId(2);

/// Slab planes every 100 cm from -700 to 700.
pub fn reference_planes() -> Vec<f64> {
    (-7..=7).map(|i| i as f64 * 100.0).collect()
}

/// Gamma, electron and positron.
pub fn reference_particles() -> ParticleParams {
    let mut p = ParticleParams::new();
    p.insert("gamma", 0.0, 0.0);
    p.insert("electron", ELECTRON_MASS, -1.0);
    p.insert("positron", ELECTRON_MASS, 1.0);
    p
}

/// Run input for the reference shower: 1024 slots.
pub fn reference_input(seed: u64) -> RunInput {
    RunInput {
        track_slots: 1024,
        initializer_capacity: 1 << 16,
        secondary_capacity: 4096,
        max_steps: 10_000,
        seed,
        ..RunInput::default()
    }
}

/// Run input at 16x the reference slot count.
pub fn stress_input(seed: u64) -> RunInput {
    RunInput {
        track_slots: 16 * 1024,
        initializer_capacity: 1 << 20,
        secondary_capacity: 64 * 1024,
        ..reference_input(seed)
    }
}

/// Photon shower in water-like slabs.
///
/// Photons pair-convert above threshold, scatter isotropically, and are
/// absorbed below 100 keV. Charged particles lose 2 MeV/cm and are
/// absorbed with a small cross section.
pub fn reference_profile(input: RunInput) -> RunConfig {
    let mut physics = PhysicsParams::new();
    physics.add_model(Box::new(PairConversionModel::new(
        GAMMA, ELECTRON, POSITRON, 0.02,
    )));
    physics.add_model(Box::new(IsotropicScatterModel::new(
        Applicability::new([GAMMA], 0.1, f64::INFINITY),
        0.07,
    )));
    physics.add_model(Box::new(
        AbsorptionModel::new(Applicability::new([GAMMA], 0.0, 0.1), 1.0)
            .with_label("photoelectric"),
    ));
    physics.add_model(Box::new(AbsorptionModel::new(
        Applicability::new([ELECTRON, POSITRON], 0.0, f64::INFINITY),
        0.05,
    )));
    physics
        .set_energy_loss(ELECTRON, 2.0)
        .set_energy_loss(POSITRON, 2.0)
        .set_max_step(10.0);

    let mut cutoffs = CutoffParams::new();
    let charged = Cutoff {
        tracking: 0.01,
        production: 0.01,
    };
    cutoffs.set(ELECTRON, charged).set(POSITRON, charged);

    RunConfig {
        input,
        geometry: Arc::new(
            SlabGeometry::new(reference_planes()).expect("reference planes are increasing"),
        ),
        particles: reference_particles(),
        physics,
        cutoffs,
        actions: lumen_physics::standard_actions(),
    }
}

/// `n` photons of `energy` MeV, one per event, entering the stack at
/// `x = -650` along +x.
pub fn reference_primaries(n: usize, energy: f64) -> Vec<Primary> {
    (0..n)
        .map(|i| Primary {
            particle: GAMMA,
            energy,
            position: [-650.0, 0.0, 0.0],
            direction: [1.0, 0.0, 0.0],
            time: 0.0,
            event: EventId(i as u32),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_profile_validates() {
        reference_profile(reference_input(42)).validate().unwrap();
    }

    #[test]
    fn stress_profile_validates() {
        reference_profile(stress_input(42)).validate().unwrap();
    }

    #[test]
    fn planes_span_the_histogram() {
        let planes = reference_planes();
        assert_eq!(planes.len(), 15);
        assert_eq!(planes[0], -700.0);
        assert_eq!(planes[14], 700.0);
    }

    #[test]
    fn primaries_start_inside() {
        let ps = reference_primaries(4, 10.0);
        assert_eq!(ps.len(), 4);
        assert_eq!(ps[3].event, EventId(3));
        assert!(ps.iter().all(|p| p.position[0] > -700.0));
    }

    #[test]
    fn small_reference_run_drains() {
        let mut input = reference_input(1);
        input.track_slots = 64;
        input.threads = Some(2);
        let result =
            lumen_engine::transport(reference_profile(input), &reference_primaries(8, 10.0))
                .unwrap();
        assert_eq!(result.termination, lumen_engine::Termination::Drained);
        assert!(result.total_energy_deposition() > 0.0);
    }
}
