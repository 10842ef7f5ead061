//! Test utilities and mock types for Lumen development.
//!
//! Provides a [`MockGeometry`], a three-particle table, primary sources
//! and parameter builders. Mock models and actions live in
//! [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::Arc;

use lumen_action::{CoreParams, Model, PhysicsParams};
use lumen_core::{BoundaryHit, EventId, GeometryOracle, ParticleId, Primary, Real3, VolumeId};
use lumen_track::{CutoffParams, ExecutionSpace, ParticleParams, RngParams};

pub use fixtures::{
    CallbackModel, CountingAction, FailingAction, FailingModel, ForceInteractAction, KillModel,
    NoopAction, SecondaryModel,
};

pub const GAMMA: ParticleId = ParticleId(0);
pub const ELECTRON: ParticleId = ParticleId(1);
pub const POSITRON: ParticleId = ParticleId(2);

/// Geometry with one volume.
///
/// Unbounded by default. With a half-width `h`, only `|x| < h` is inside
/// and leaving through `x = ±h` escapes.
#[derive(Clone, Copy, Debug, Default)]
pub struct MockGeometry {
    half_width: Option<f64>,
}

impl MockGeometry {
    pub fn unbounded() -> Self {
        Self { half_width: None }
    }

    pub fn bounded(half_width: f64) -> Self {
        Self {
            half_width: Some(half_width),
        }
    }
}

impl GeometryOracle for MockGeometry {
    fn name(&self) -> &str {
        "mock"
    }

    fn num_volumes(&self) -> usize {
        1
    }

    fn locate(&self, pos: Real3) -> Option<VolumeId> {
        match self.half_width {
            Some(h) if pos[0].abs() >= h => None,
            _ => Some(VolumeId(0)),
        }
    }

    fn find_boundary(&self, pos: Real3, dir: Real3, _volume: VolumeId) -> BoundaryHit {
        let Some(h) = self.half_width else {
            return BoundaryHit::NONE;
        };
        let distance = if dir[0] > 0.0 {
            (h - pos[0]) / dir[0]
        } else if dir[0] < 0.0 {
            (-h - pos[0]) / dir[0]
        } else {
            return BoundaryHit::NONE;
        };
        BoundaryHit {
            distance,
            next_volume: None,
            surface: None,
        }
    }
}

/// Gamma (massless), electron and positron, in that id order.
pub fn particles() -> ParticleParams {
    let mut p = ParticleParams::new();
    p.insert("gamma", 0.0, 0.0);
    p.insert("electron", 0.510_998_95, -1.0);
    p.insert("positron", 0.510_998_95, 1.0);
    p
}

/// A photon at the origin heading along +x.
pub fn primary(event: u32, energy: f64) -> Primary {
    Primary {
        particle: GAMMA,
        energy,
        position: [0.0; 3],
        direction: [1.0, 0.0, 0.0],
        time: 0.0,
        event: EventId(event),
    }
}

/// `n` photons, one per event.
pub fn primaries(n: usize, energy: f64) -> Vec<Primary> {
    (0..n as u32).map(|e| primary(e, energy)).collect()
}

/// Physics with the given models, in registration order.
pub fn physics(models: Vec<Box<dyn Model>>) -> PhysicsParams {
    let mut physics = PhysicsParams::new();
    for m in models {
        physics.add_model(m);
    }
    physics
}

/// Parameters over an unbounded [`MockGeometry`] with no cutoffs.
pub fn core_params(physics: PhysicsParams, space: ExecutionSpace) -> CoreParams {
    CoreParams {
        geometry: Arc::new(MockGeometry::unbounded()),
        particles: particles(),
        physics,
        cutoffs: CutoffParams::new(),
        rng: RngParams { seed: 0 },
        space,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_geometry_escapes_forward() {
        let g = MockGeometry::bounded(5.0);
        assert_eq!(g.locate([0.0; 3]), Some(VolumeId(0)));
        assert_eq!(g.locate([5.0, 0.0, 0.0]), None);
        let hit = g.find_boundary([1.0, 0.0, 0.0], [1.0, 0.0, 0.0], VolumeId(0));
        assert_eq!(hit.distance, 4.0);
        assert_eq!(hit.next_volume, None);
        let hit = g.find_boundary([1.0, 0.0, 0.0], [-1.0, 0.0, 0.0], VolumeId(0));
        assert_eq!(hit.distance, 6.0);
    }

    #[test]
    fn particle_ids_match_constants() {
        let p = particles();
        assert_eq!(p.find("gamma"), Some(GAMMA));
        assert_eq!(p.find("electron"), Some(ELECTRON));
        assert_eq!(p.find("positron"), Some(POSITRON));
    }

    #[test]
    fn primaries_get_one_event_each() {
        let ps = primaries(3, 2.0);
        assert_eq!(ps.len(), 3);
        assert_eq!(ps[2].event, EventId(2));
        assert_eq!(ps[0].energy, 2.0);
    }
}
