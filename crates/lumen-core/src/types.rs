//! Value records shared across the workspace and small vector helpers.
//!
//! Units: energies in MeV, lengths in cm, times in s.

use crate::id::{EventId, ParticleId, TrackId};

/// A Cartesian 3-vector.
pub type Real3 = [f64; 3];

/// Speed of light in cm/s.
pub const SPEED_OF_LIGHT: f64 = 2.997_924_58e10;

/// Tolerance on `|dir| - 1` for a direction to count as a unit vector.
pub const UNIT_TOLERANCE: f64 = 1e-6;

/// Dot product.
pub fn dot(a: Real3, b: Real3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Euclidean norm.
pub fn norm(a: Real3) -> f64 {
    dot(a, a).sqrt()
}

/// `pos + dist * dir`.
pub fn axpy(dist: f64, dir: Real3, pos: Real3) -> Real3 {
    [
        pos[0] + dist * dir[0],
        pos[1] + dist * dir[1],
        pos[2] + dist * dir[2],
    ]
}

/// Whether every component is finite and the norm is within
/// [`UNIT_TOLERANCE`] of one.
pub fn is_unit(dir: Real3) -> bool {
    dir.iter().all(|c| c.is_finite()) && (norm(dir) - 1.0).abs() <= UNIT_TOLERANCE
}

/// Whether every component is finite.
pub fn is_finite(v: Real3) -> bool {
    v.iter().all(|c| c.is_finite())
}

/// Particle speed in cm/s for kinetic energy `energy` and rest mass `mass`.
///
/// Massless particles travel at the speed of light.
pub fn speed(energy: f64, mass: f64) -> f64 {
    if mass <= 0.0 {
        return SPEED_OF_LIGHT;
    }
    let gamma = 1.0 + energy / mass;
    SPEED_OF_LIGHT * (1.0 - 1.0 / (gamma * gamma)).max(0.0).sqrt()
}

/// A primary particle from the external event source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Primary {
    /// Particle type.
    pub particle: ParticleId,
    /// Kinetic energy (MeV).
    pub energy: f64,
    /// Starting position (cm).
    pub position: Real3,
    /// Unit direction.
    pub direction: Real3,
    /// Starting time (s).
    pub time: f64,
    /// Event this primary belongs to.
    pub event: EventId,
}

/// Everything needed to populate a vacant track slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackInitializer {
    /// Particle type.
    pub particle: ParticleId,
    /// Kinetic energy (MeV).
    pub energy: f64,
    /// Starting position (cm).
    pub position: Real3,
    /// Unit direction.
    pub direction: Real3,
    /// Starting time (s).
    pub time: f64,
    /// Track that produced this one; `None` for primaries.
    pub parent: Option<TrackId>,
    /// Event of the lineage.
    pub event: EventId,
}

impl From<Primary> for TrackInitializer {
    fn from(p: Primary) -> Self {
        Self {
            particle: p.particle,
            energy: p.energy,
            position: p.position,
            direction: p.direction,
            time: p.time,
            parent: None,
            event: p.event,
        }
    }
}

/// A particle emitted by an interaction, before promotion to an initializer.
///
/// Position, time and lineage come from the emitting slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Secondary {
    /// Particle type.
    pub particle: ParticleId,
    /// Kinetic energy (MeV).
    pub energy: f64,
    /// Unit direction.
    pub direction: Real3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_check_rejects_nan_and_long_vectors() {
        assert!(is_unit([0.0, 0.0, 1.0]));
        assert!(!is_unit([0.0, 0.0, 2.0]));
        assert!(!is_unit([f64::NAN, 0.0, 1.0]));
    }

    #[test]
    fn axpy_moves_along_direction() {
        assert_eq!(axpy(2.0, [1.0, 0.0, 0.0], [1.0, 1.0, 1.0]), [3.0, 1.0, 1.0]);
    }

    #[test]
    fn speed_is_bounded_by_light() {
        assert_eq!(speed(1.0, 0.0), SPEED_OF_LIGHT);
        let v = speed(1.0, 0.511);
        assert!(v > 0.0 && v < SPEED_OF_LIGHT);
        assert_eq!(speed(0.0, 0.511), 0.0);
    }

    #[test]
    fn primary_converts_without_parent() {
        let p = Primary {
            particle: ParticleId(1),
            energy: 10.0,
            position: [0.0; 3],
            direction: [1.0, 0.0, 0.0],
            time: 0.0,
            event: EventId(3),
        };
        let init = TrackInitializer::from(p);
        assert_eq!(init.parent, None);
        assert_eq!(init.event, EventId(3));
        assert_eq!(init.energy, 10.0);
    }
}
