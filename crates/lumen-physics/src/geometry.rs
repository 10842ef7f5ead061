//! Reference geometry oracles.

use lumen_core::{BoundaryHit, GeometryOracle, Real3, SurfaceId, VolumeId};

/// A single volume filling all of space. No boundary is ever reached.
#[derive(Clone, Copy, Debug, Default)]
pub struct InfiniteMedium;

impl GeometryOracle for InfiniteMedium {
    fn name(&self) -> &str {
        "infinite-medium"
    }

    fn num_volumes(&self) -> usize {
        1
    }

    fn locate(&self, pos: Real3) -> Option<VolumeId> {
        pos.iter().all(|c| c.is_finite()).then_some(VolumeId(0))
    }

    fn find_boundary(&self, _pos: Real3, _dir: Real3, _volume: VolumeId) -> BoundaryHit {
        BoundaryHit::NONE
    }
}

/// Layers bounded by planes normal to the x axis.
///
/// Volume `i` spans `planes[i] <= x < planes[i + 1]`, unbounded in y and
/// z. Plane `i` is surface `i`. Outside the outermost planes is outside
/// the world.
#[derive(Clone, Debug, PartialEq)]
pub struct SlabGeometry {
    planes: Vec<f64>,
}

impl SlabGeometry {
    /// Build from plane positions (cm).
    ///
    /// # Errors
    ///
    /// Returns `Err` if fewer than two planes are given or the positions
    /// are not finite and strictly increasing.
    pub fn new(planes: Vec<f64>) -> Result<Self, String> {
        if planes.len() < 2 {
            return Err(format!("need at least 2 planes, got {}", planes.len()));
        }
        if planes.iter().any(|p| !p.is_finite()) {
            return Err("plane positions must be finite".to_string());
        }
        if planes.windows(2).any(|w| w[0] >= w[1]) {
            return Err("plane positions must be strictly increasing".to_string());
        }
        Ok(Self { planes })
    }

    /// Plane positions (cm).
    pub fn planes(&self) -> &[f64] {
        &self.planes
    }
}

impl GeometryOracle for SlabGeometry {
    fn name(&self) -> &str {
        "slabs"
    }

    fn num_volumes(&self) -> usize {
        self.planes.len() - 1
    }

    fn locate(&self, pos: Real3) -> Option<VolumeId> {
        let x = pos[0];
        if !pos.iter().all(|c| c.is_finite()) {
            return None;
        }
        // Index of the first plane strictly greater than x.
        let upper = self.planes.partition_point(|&p| p <= x);
        if upper == 0 || upper == self.planes.len() {
            return None;
        }
        Some(VolumeId::from((upper - 1) as u32))
    }

    fn find_boundary(&self, pos: Real3, dir: Real3, volume: VolumeId) -> BoundaryHit {
        let i = volume.0 as usize;
        if i + 1 >= self.planes.len() || dir[0] == 0.0 {
            return BoundaryHit::NONE;
        }
        let last = self.num_volumes() - 1;
        let (plane, next) = if dir[0] > 0.0 {
            (i + 1, (i < last).then(|| VolumeId::from((i + 1) as u32)))
        } else {
            (i, (i > 0).then(|| VolumeId::from((i - 1) as u32)))
        };
        BoundaryHit {
            distance: ((self.planes[plane] - pos[0]) / dir[0]).max(0.0),
            next_volume: next,
            surface: Some(SurfaceId::from(plane as u32)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slabs() -> SlabGeometry {
        SlabGeometry::new(vec![0.0, 1.0, 3.0]).unwrap()
    }

    #[test]
    fn locate_finds_half_open_layers() {
        let g = slabs();
        assert_eq!(g.locate([0.0, 5.0, 5.0]), Some(VolumeId(0)));
        assert_eq!(g.locate([1.0, 0.0, 0.0]), Some(VolumeId(1)));
        assert_eq!(g.locate([2.9, 0.0, 0.0]), Some(VolumeId(1)));
        assert_eq!(g.locate([3.0, 0.0, 0.0]), None);
        assert_eq!(g.locate([-0.1, 0.0, 0.0]), None);
    }

    #[test]
    fn boundary_forward_enters_next_layer() {
        let g = slabs();
        let hit = g.find_boundary([0.5, 0.0, 0.0], [1.0, 0.0, 0.0], VolumeId(0));
        assert!((hit.distance - 0.5).abs() < 1e-12);
        assert_eq!(hit.next_volume, Some(VolumeId(1)));
        assert_eq!(hit.surface, Some(SurfaceId(1)));
    }

    #[test]
    fn boundary_out_of_last_layer_escapes() {
        let g = slabs();
        let hit = g.find_boundary([2.0, 0.0, 0.0], [1.0, 0.0, 0.0], VolumeId(1));
        assert!((hit.distance - 1.0).abs() < 1e-12);
        assert_eq!(hit.next_volume, None);

        let back = g.find_boundary([0.5, 0.0, 0.0], [-1.0, 0.0, 0.0], VolumeId(0));
        assert!((back.distance - 0.5).abs() < 1e-12);
        assert_eq!(back.next_volume, None);
    }

    #[test]
    fn oblique_distance_scales_with_cosine() {
        let g = slabs();
        let c = std::f64::consts::FRAC_1_SQRT_2;
        let hit = g.find_boundary([0.0, 0.0, 0.0], [c, c, 0.0], VolumeId(0));
        assert!((hit.distance - std::f64::consts::SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn parallel_direction_never_hits() {
        let hit = slabs().find_boundary([0.5, 0.0, 0.0], [0.0, 1.0, 0.0], VolumeId(0));
        assert_eq!(hit, BoundaryHit::NONE);
    }

    #[test]
    fn invalid_planes_rejected() {
        assert!(SlabGeometry::new(vec![0.0]).is_err());
        assert!(SlabGeometry::new(vec![0.0, 0.0]).is_err());
        assert!(SlabGeometry::new(vec![0.0, f64::INFINITY]).is_err());
    }

    #[test]
    fn infinite_medium_has_no_boundary() {
        let g = InfiniteMedium;
        assert_eq!(g.locate([1e9, 0.0, 0.0]), Some(VolumeId(0)));
        assert_eq!(g.locate([f64::NAN, 0.0, 0.0]), None);
        assert!(g.find_boundary([0.0; 3], [1.0, 0.0, 0.0], VolumeId(0)).distance.is_infinite());
    }
}
