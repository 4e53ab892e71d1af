//! Query interface shared by particle transport geometries.

use tetmesh_math::{Point3, Vec3};

use crate::mesh::Mesh;

/// Result of a boundary-distance query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Region after travelling `distance`; `None` is outside the geometry.
    pub region: Option<usize>,
    /// Distance to travel, never more than the requested step.
    pub distance: f64,
    /// Unit normal of the crossed boundary, pointing against the direction
    /// of travel. `None` when no boundary is crossed or after relocating a
    /// lost particle.
    pub normal: Option<Vec3>,
    /// Registry index of the medium of `region`.
    pub medium: Option<usize>,
}

impl Step {
    /// A step that stays in `region` for the full distance `t`.
    pub fn unchanged(region: Option<usize>, t: f64, medium: Option<usize>) -> Self {
        Self {
            region,
            distance: t,
            normal: None,
            medium,
        }
    }

    /// True if the step ends in a different region than `from`.
    pub fn changes_region(&self, from: Option<usize>) -> bool {
        self.region != from
    }
}

/// Region-based geometry queried by a transport loop.
///
/// Regions are numbered `0..region_count()`. `None` stands for everything
/// outside the geometry.
pub trait Geometry {
    /// Short name of the geometry type.
    fn type_name(&self) -> &'static str;

    /// Number of regions.
    fn region_count(&self) -> usize;

    /// True if `p` lies in some region.
    fn is_inside(&self, p: &Point3) -> bool {
        self.locate(p).is_some()
    }

    /// Region containing `p`.
    fn locate(&self, p: &Point3) -> Option<usize>;

    /// Distance along the unit direction `u` from `x` in `region` to the
    /// next region boundary, limited to `t`.
    fn howfar(&self, region: Option<usize>, x: &Point3, u: &Vec3, t: f64) -> Step;

    /// Lower bound on the distance from `x` in `region` to any boundary.
    fn hownear(&self, region: Option<usize>, x: &Point3) -> f64;

    /// Medium registry index of `region`, `None` outside.
    fn medium(&self, region: Option<usize>) -> Option<usize>;
}

impl Geometry for Mesh {
    fn type_name(&self) -> &'static str {
        "EGS_Mesh"
    }

    fn region_count(&self) -> usize {
        self.num_elements()
    }

    fn is_inside(&self, p: &Point3) -> bool {
        Mesh::is_inside(self, p)
    }

    fn locate(&self, p: &Point3) -> Option<usize> {
        Mesh::locate(self, p)
    }

    fn howfar(&self, region: Option<usize>, x: &Point3, u: &Vec3, t: f64) -> Step {
        Mesh::howfar(self, region, x, u, t)
    }

    fn hownear(&self, region: Option<usize>, x: &Point3) -> f64 {
        Mesh::hownear(self, region, x)
    }

    fn medium(&self, region: Option<usize>) -> Option<usize> {
        region.map(|e| Mesh::medium(self, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::two_element_mesh;

    fn transport<G: Geometry>(geometry: &G, x: Point3, u: Vec3) -> Vec<Option<usize>> {
        let mut regions = vec![geometry.locate(&x)];
        let mut region = regions[0];
        let mut x = x;
        for _ in 0..8 {
            let step = geometry.howfar(region, &x, &u, 10.0);
            x += u * step.distance;
            if !step.changes_region(region) {
                break;
            }
            region = step.region;
            regions.push(region);
        }
        regions
    }

    #[test]
    fn test_mesh_as_geometry() {
        let mesh = two_element_mesh();
        let geometry: &dyn Geometry = &mesh;
        assert_eq!(geometry.type_name(), "EGS_Mesh");
        assert_eq!(geometry.region_count(), 2);
        assert_eq!(geometry.medium(None), None);
        assert_eq!(geometry.medium(Some(1)), Some(mesh.medium(1)));
        assert!(geometry.is_inside(&Point3::new(0.5, 0.1, 0.0)));
    }

    #[test]
    fn test_transport_through_mesh() {
        let mesh = two_element_mesh();
        let regions = transport(&mesh, Point3::new(-1.0, 0.1, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(regions, vec![None, Some(0), Some(1), None]);
    }
}
