//! Geometry oracle abstraction consumed by the along-step action.

use crate::id::{SurfaceId, VolumeId};
use crate::types::Real3;

/// The nearest boundary along a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryHit {
    /// Distance to the boundary (cm); `f64::INFINITY` if there is none.
    pub distance: f64,
    /// Volume entered on crossing; `None` means the track leaves the world.
    pub next_volume: Option<VolumeId>,
    /// Surface crossed, if the geometry names its surfaces.
    pub surface: Option<SurfaceId>,
}

impl BoundaryHit {
    /// A ray that never meets a boundary.
    pub const NONE: Self = Self {
        distance: f64::INFINITY,
        next_volume: None,
        surface: None,
    };
}

/// Read-only geometry navigation.
///
/// Shared by every slot of every sweep for the whole run, so
/// implementations must be immutable after construction.
pub trait GeometryOracle: Send + Sync + 'static {
    /// Human-readable name for diagnostics.
    fn name(&self) -> &str;

    /// Number of volumes.
    fn num_volumes(&self) -> usize;

    /// Volume containing `pos`, or `None` if outside the world.
    fn locate(&self, pos: Real3) -> Option<VolumeId>;

    /// Nearest boundary from `pos` along unit direction `dir` inside `volume`.
    fn find_boundary(&self, pos: Real3, dir: Real3, volume: VolumeId) -> BoundaryHit;
}
