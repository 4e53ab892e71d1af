//! Point location and boundary-distance queries.
//!
//! `howfar` runs a small state machine per call. A particle inside its
//! element exits through the nearest face it moves toward. A particle
//! slightly outside one face plane (within `thick_plane_tolerance`) is
//! treated as inside, leaving after `min_step` if it is heading out of that
//! face. A particle further out is lost: it is pushed along its direction by
//! `min_step` and located again, first among the element's neighbours and
//! then through the volume octree. Every region change moves the particle
//! by at least `min_step`, so a transport loop cannot stall.

use tetmesh_math::{Dir3, Point3, Ray, Vec3};
use tracing::{debug, warn};

use super::Mesh;
use crate::geometry::Step;

/// Requested step used when walking a ray out of the mesh.
pub const VERY_FAR: f64 = 1e30;

/// Lost-particle violations this many tolerances deep are logged as warnings.
const LOST_WARN_FACTOR: f64 = 1e4;

impl Mesh {
    /// Element containing `p`, or `None` outside the mesh.
    pub fn locate(&self, p: &Point3) -> Option<usize> {
        self.volume_tree.locate(p, &self.topology)
    }

    /// True if `p` lies in some element.
    pub fn is_inside(&self, p: &Point3) -> bool {
        self.locate(p).is_some()
    }

    /// Distance a particle at `x` in `region` can travel along the unit
    /// direction `u` before changing region, limited to `t`.
    pub fn howfar(&self, region: Option<usize>, x: &Point3, u: &Vec3, t: f64) -> Step {
        match region {
            Some(element) => self.howfar_interior(element, x, u, t),
            None => self.howfar_exterior(x, u, t),
        }
    }

    fn howfar_interior(&self, element: usize, x: &Point3, u: &Vec3, t: f64) -> Step {
        let normals = &self.topology.normals[element];
        let mut distances = [0.0; 4];
        let mut dots = [0.0; 4];
        for f in 0..4 {
            distances[f] = (x - self.topology.face_point(element, f)).dot(&normals[f]);
            dots[f] = u.dot(&normals[f]);
        }

        let mut worst = 0;
        for f in 1..4 {
            if distances[f] < distances[worst] {
                worst = f;
            }
        }

        let min_step = self.config.min_step;
        if distances[worst] < -self.config.thick_plane_tolerance {
            return self.recover_lost(element, x, u, t, -distances[worst]);
        }
        if distances[worst] < 0.0 && dots[worst] < 0.0 {
            return self.exit_through(element, worst, min_step, t);
        }

        let mut exit: Option<(usize, f64)> = None;
        for f in 0..4 {
            if dots[f] < 0.0 {
                let tf = -distances[f] / dots[f];
                if exit.map_or(true, |(_, best)| tf < best) {
                    exit = Some((f, tf));
                }
            }
        }
        match exit {
            Some((face, distance)) => self.exit_through(element, face, distance.max(min_step), t),
            None => Step::unchanged(Some(element), t, Some(self.medium(element))),
        }
    }

    fn exit_through(&self, element: usize, face: usize, distance: f64, t: f64) -> Step {
        if distance > t {
            return Step::unchanged(Some(element), t, Some(self.medium(element)));
        }
        let next = self.topology.neighbours[element][face];
        Step {
            region: next,
            distance,
            normal: Some(self.topology.normals[element][face]),
            medium: next.map(|e| self.medium(e)),
        }
    }

    fn recover_lost(&self, element: usize, x: &Point3, u: &Vec3, t: f64, violation: f64) -> Step {
        let step = self.config.min_step.min(t);
        let pushed = x + u * step;
        let found = self.topology.neighbours[element]
            .iter()
            .flatten()
            .copied()
            .find(|&n| self.topology.contains(n, &pushed))
            .or_else(|| self.locate(&pushed));

        debug!(element, violation, found = ?found, "Relocated lost particle");
        let scale = self.config.thick_plane_tolerance.max(self.config.min_step);
        if found.is_none() && violation > LOST_WARN_FACTOR * scale {
            warn!(
                element,
                violation,
                x = pushed.x,
                y = pushed.y,
                z = pushed.z,
                "Lost particle far outside its element left the mesh"
            );
        }

        Step {
            region: found,
            distance: step,
            normal: None,
            medium: found.map(|e| self.medium(e)),
        }
    }

    fn howfar_exterior(&self, x: &Point3, u: &Vec3, t: f64) -> Step {
        let ray = Ray::from_dir(*x, Dir3::new_unchecked(*u));
        let Some(hit) = self.surface_tree.ray_hit(&ray, t, &self.topology) else {
            return Step::unchanged(None, t, None);
        };
        let distance = hit.distance.max(self.config.min_step);
        if distance > t {
            return Step::unchanged(None, t, None);
        }
        Step {
            region: Some(hit.element),
            distance,
            normal: Some(-self.topology.normals[hit.element][hit.face]),
            medium: Some(self.medium(hit.element)),
        }
    }

    /// Lower bound on the distance from `x` to the boundary of `region`.
    ///
    /// Inside an element this is the nearest face plane. Outside the mesh
    /// it may underestimate the distance to the mesh surface.
    pub fn hownear(&self, region: Option<usize>, x: &Point3) -> f64 {
        match region {
            Some(element) => {
                let normals = &self.topology.normals[element];
                (0..4)
                    .map(|f| (x - self.topology.face_point(element, f)).dot(&normals[f]))
                    .fold(f64::INFINITY, f64::min)
                    .max(0.0)
            }
            None => self.surface_tree.hownear_exterior(x, &self.topology),
        }
    }

    /// Path length from `x` in `region` along `u` until the particle
    /// leaves the mesh. Zero outside the mesh.
    pub fn distance_to_outside(&self, region: Option<usize>, x: &Point3, u: &Vec3) -> f64 {
        let max_steps = 4 * self.num_elements() + 16;
        let mut region = region;
        let mut position = *x;
        let mut total = 0.0;
        for _ in 0..max_steps {
            let Some(element) = region else {
                return total;
            };
            let step = self.howfar(Some(element), &position, u, VERY_FAR);
            if step.region == Some(element) && step.distance >= VERY_FAR {
                // No face ahead: degenerate direction.
                return total;
            }
            total += step.distance;
            position += u * step.distance;
            region = step.region;
        }
        warn!(
            max_steps,
            distance = total,
            "Walk to the mesh boundary did not terminate"
        );
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MeshConfig;
    use crate::fixtures::{
        build, cube_grid_spec, five_element_mesh, single_element_spec, two_element_mesh,
    };
    use crate::media::MediumRegistry;
    use crate::mesh::MeshBuilder;
    use crate::spec::{ElementSpec, MediumSpec, MeshSpec, NodeSpec};
    use approx::assert_relative_eq;

    /// 162 elements with octree leaves small enough to force subdivision.
    /// Capacities stay above the 24 elements sharing an interior node.
    fn grid_mesh() -> Mesh {
        let config = MeshConfig {
            volume_leaf_elements: 32,
            surface_leaf_elements: 32,
            ..Default::default()
        };
        let mut media = MediumRegistry::new();
        MeshBuilder::new(cube_grid_spec(3))
            .config(config)
            .build(&mut media)
            .unwrap()
    }

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: f64, y: f64, z: f64) -> Vec3 {
        Vec3::new(x, y, z)
    }

    #[test]
    fn test_crosses_shared_face() {
        let mesh = two_element_mesh();
        let step = mesh.howfar(Some(0), &p(0.5, 0.5, 0.0), &v(1.0, 0.0, 0.0), VERY_FAR);
        assert_eq!(step.region, Some(1));
        assert_relative_eq!(step.distance, 0.5, epsilon = 1e-12);
        assert_eq!(step.medium, Some(mesh.medium(1)));
        let normal = step.normal.unwrap();
        assert!(normal.dot(&v(1.0, 0.0, 0.0)) < 0.0);
    }

    #[test]
    fn test_lost_particle_far_outside() {
        let mesh = two_element_mesh();
        for dir in [v(1.0, 0.0, 0.0), v(-1.0, 0.0, 0.0)] {
            let step = mesh.howfar(Some(0), &p(-0.5, 0.5, 0.0), &dir, VERY_FAR);
            assert_eq!(step.region, None);
            assert_eq!(step.distance, 1e-10);
            assert_eq!(step.medium, None);
            assert!(step.normal.is_none());
        }
    }

    #[test]
    fn test_step_floor_near_shared_face() {
        let mesh = two_element_mesh();
        let step = mesh.howfar(Some(0), &p(1.0 - 1e-15, 0.0, 0.0), &v(1.0, 0.0, 0.0), VERY_FAR);
        assert_eq!(step.region, Some(1));
        assert_eq!(step.distance, 1e-10);
    }

    #[test]
    fn test_thick_plane_exit() {
        let mesh = two_element_mesh();
        let x = p(1.0 + 5e-11, 0.0, 0.0);
        let step = mesh.howfar(Some(0), &x, &v(1.0, 0.0, 0.0), VERY_FAR);
        assert_eq!(step.region, Some(1));
        assert_eq!(step.distance, 1e-10);

        let step = mesh.howfar(Some(0), &x, &v(-1.0, 0.0, 0.0), VERY_FAR);
        assert_eq!(step.region, None);
        assert_relative_eq!(step.distance, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_lost_particle_found_in_neighbour() {
        let mesh = two_element_mesh();
        let step = mesh.howfar(Some(0), &p(1.0 + 1e-9, 0.0, 0.0), &v(1.0, 0.0, 0.0), VERY_FAR);
        assert_eq!(step.region, Some(1));
        assert_eq!(step.distance, 1e-10);
    }

    #[test]
    fn test_lost_particle_found_by_octree() {
        let mesh = five_element_mesh();
        let step = mesh.howfar(Some(1), &p(-0.1, 0.1, 0.1), &v(1.0, 0.0, 0.0), VERY_FAR);
        assert_eq!(step.region, Some(2));
        assert_eq!(step.distance, 1e-10);
    }

    #[test]
    fn test_requested_step_shorter_than_boundary() {
        let mesh = two_element_mesh();
        let step = mesh.howfar(Some(0), &p(0.5, 0.5, 0.0), &v(1.0, 0.0, 0.0), 0.25);
        assert_eq!(step.region, Some(0));
        assert_eq!(step.distance, 0.25);
        assert!(step.normal.is_none());
        assert_eq!(step.medium, Some(mesh.medium(0)));

        // Below the step floor the region stays put.
        let step = mesh.howfar(Some(0), &p(0.5, 0.5, 0.0), &v(1.0, 0.0, 0.0), 1e-12);
        assert_eq!(step.region, Some(0));
        assert_eq!(step.distance, 1e-12);
        assert_eq!(step.medium, Some(mesh.medium(0)));
    }

    #[test]
    fn test_never_overshoots() {
        let mesh = five_element_mesh();
        let dirs = [
            v(1.0, 0.0, 0.0),
            v(0.0, -1.0, 0.0),
            v(0.0, 0.0, -1.0),
            v(1.0, 1.0, 1.0).normalize(),
            v(-1.0, 0.5, 0.25).normalize(),
        ];
        for element in 0..mesh.num_elements() {
            let x = mesh.element_centroid(element);
            for u in &dirs {
                for t in [1e-12, 0.01, 0.1, 10.0] {
                    let step = mesh.howfar(Some(element), &x, u, t);
                    assert!(step.distance <= t);
                    assert!(step.distance > 0.0);
                    if step.region != Some(element) {
                        assert!(step.distance >= mesh.config().min_step);
                    }
                }
            }
        }
    }

    #[test]
    fn test_five_element_interior_steps() {
        let mesh = five_element_mesh();
        let x = p(-0.1, 0.1, 0.1);
        let step = mesh.howfar(Some(2), &x, &v(1.0, 0.0, 0.0), VERY_FAR);
        assert_eq!(step.region, Some(0));
        assert_relative_eq!(step.distance, 0.1, epsilon = 1e-12);

        let step = mesh.howfar(Some(2), &x, &v(0.0, -1.0, 0.0), VERY_FAR);
        assert_eq!(step.region, None);
        assert_relative_eq!(step.distance, 0.1, epsilon = 1e-12);

        let step = mesh.howfar(Some(0), &p(0.1, 0.1, 0.3), &v(0.0, 0.0, -1.0), VERY_FAR);
        assert_eq!(step.region, Some(3));
        assert_relative_eq!(step.distance, 0.3, epsilon = 1e-12);

        let step = mesh.howfar(Some(2), &x, &v(1.0, 0.0, 0.0), 0.05);
        assert_eq!(step.region, Some(2));
        assert_eq!(step.distance, 0.05);
    }

    #[test]
    fn test_exterior_ray_enters_mesh() {
        let mesh = two_element_mesh();
        let step = mesh.howfar(None, &p(-1.0, 0.0, 0.0), &v(1.0, 0.0, 0.0), VERY_FAR);
        assert_eq!(step.region, Some(0));
        assert_relative_eq!(step.distance, 1.0, epsilon = 1e-12);
        assert_eq!(step.medium, Some(mesh.medium(0)));
        assert!(step.normal.unwrap().dot(&v(1.0, 0.0, 0.0)) < 0.0);

        let step = mesh.howfar(None, &p(3.0, 0.0, 0.0), &v(-1.0, 0.0, 0.0), VERY_FAR);
        assert_eq!(step.region, Some(1));
        assert_relative_eq!(step.distance, 1.0, epsilon = 1e-12);

        let mesh = five_element_mesh();
        let step = mesh.howfar(None, &p(-2.0, 0.0, 0.0), &v(1.0, 0.0, 0.0), VERY_FAR);
        assert_eq!(step.region, Some(2));
        assert_relative_eq!(step.distance, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_exterior_ray_misses_or_falls_short() {
        let mesh = two_element_mesh();
        let step = mesh.howfar(None, &p(-1.0, 0.0, 0.0), &v(-1.0, 0.0, 0.0), 5.0);
        assert_eq!(step.region, None);
        assert_eq!(step.distance, 5.0);
        assert!(step.medium.is_none());

        let step = mesh.howfar(None, &p(-1.0, 0.0, 0.0), &v(1.0, 0.0, 0.0), 0.5);
        assert_eq!(step.region, None);
        assert_eq!(step.distance, 0.5);
    }

    #[test]
    fn test_exterior_ray_enters_micron_element() {
        let s = 1e-6;
        let mut spec = single_element_spec([
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ]);
        spec.scale(s).unwrap();
        let mesh = build(spec);
        let step = mesh.howfar(None, &p(-s, 0.2 * s, 0.2 * s), &v(1.0, 0.0, 0.0), VERY_FAR);
        assert_eq!(step.region, Some(0));
        assert_relative_eq!(step.distance, s, max_relative = 1e-9);
    }

    #[test]
    fn test_locate() {
        let mesh = five_element_mesh();
        for element in 0..mesh.num_elements() {
            assert_eq!(mesh.locate(&mesh.element_centroid(element)), Some(element));
        }
        assert_eq!(mesh.locate(&p(5.0, 5.0, 5.0)), None);
        assert!(!mesh.is_inside(&p(-0.9, -0.9, 0.0)));
        assert!(mesh.is_inside(&p(0.1, 0.1, 0.1)));
    }

    #[test]
    fn test_hownear_interior() {
        let mesh = five_element_mesh();
        for element in 0..4 {
            let d = mesh.hownear(Some(element), &mesh.element_centroid(element));
            assert_relative_eq!(d, 0.144_337_567_297_406_52, epsilon = 1e-12);
        }
        let d = mesh.hownear(Some(4), &mesh.element_centroid(4));
        assert_relative_eq!(d, 0.288_675_134_594_812_9, epsilon = 1e-12);

        // Slightly outside a face plane.
        assert_eq!(mesh.hownear(Some(0), &p(-1e-12, 0.1, 0.1)), 0.0);
    }

    #[test]
    fn test_hownear_exterior() {
        let mesh = two_element_mesh();
        let d = mesh.hownear(None, &p(5.0, 0.0, 0.0));
        assert_relative_eq!(d, 3.0, epsilon = 1e-7);

        let mesh = five_element_mesh();
        let d = mesh.hownear(None, &p(0.0, -2.0, 0.0));
        assert_relative_eq!(d, 1.0, epsilon = 1e-7);
        assert!(d <= 1.0);
        let d = mesh.hownear(None, &p(0.0, 0.0, -11.0));
        assert_relative_eq!(d, 10.0, epsilon = 1e-7);
    }

    #[test]
    fn test_distance_to_outside() {
        let mesh = five_element_mesh();
        let d = mesh.distance_to_outside(Some(0), &p(0.25, 0.25, 0.25), &v(0.0, 0.0, 1.0));
        assert_relative_eq!(d, 0.75, epsilon = 1e-9);
        let d = mesh.distance_to_outside(Some(2), &p(-0.1, 0.1, 0.1), &v(1.0, 0.0, 0.0));
        assert_relative_eq!(d, 1.1, epsilon = 1e-9);
        assert_eq!(mesh.distance_to_outside(None, &p(9.0, 0.0, 0.0), &v(1.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_straddling_shared_face_stays_inside() {
        let spec = MeshSpec {
            elements: vec![
                ElementSpec::new(1, 0, [1, 2, 3, 4]),
                ElementSpec::new(2, 0, [2, 3, 4, 5]),
            ],
            nodes: vec![
                NodeSpec::new(1, 7.0657957133719744, 2.9344907960112301, 5.0000104685638238),
                NodeSpec::new(2, 7.3463458702386566, 3.2150409528779131, 5.0000104685638238),
                NodeSpec::new(3, 7.0345368195412803, 3.2463714740544072, 5.0000086824684313),
                NodeSpec::new(4, 7.2318114804210998, 3.32957534269547, 4.7698948239873156),
                NodeSpec::new(5, 7.3150869764079633, 3.5269216309210898, 5.0000086824684313),
            ],
            media: vec![MediumSpec::new(0, "H2O")],
        };
        let mesh = build(spec);
        let path = [
            (
                p(7.2785250525479777, 3.2806997454426994, 4.8659208444750019),
                v(-0.89838549587000849, 0.43920494119202419, 0.0015875902833647274),
            ),
            (
                p(7.2784383802325188, 3.2807421180203833, 4.8659209976387903),
                v(-0.90129953316251854, 0.43319633941521896, 0.00028816363187951824),
            ),
            (
                p(7.2323212358066646, 3.27632101005501, 4.8885263860313106),
                v(-0.77867313157333951, 0.26853705234531422, 0.56705908482578615),
            ),
            (
                p(7.232250310905779, 3.2763456480491859, 4.8885780658269145),
                v(-0.76264679745978736, 0.27596177640776914, 0.58499141898509754),
            ),
            (
                p(7.2321865766360034, 3.2763687101303014, 4.8886269534653843),
                v(-0.75904947178523308, 0.30259180325315083, 0.57643915549393798),
            ),
        ];
        let mut region = Some(0);
        for (x, u) in &path {
            let step = mesh.howfar(region, x, u, VERY_FAR);
            assert!(step.region.is_some(), "clipped to outside at {x:?}");
            assert!(step.distance >= mesh.config().min_step);
            region = step.region;
        }
    }

    #[test]
    fn test_reentry_at_grazing_exit() {
        let mesh = build(single_element_spec([
            [-12.664085999999999, 10.155149, -60.478188000000003],
            [-12.849235999999999, 10.501016999999999, -59.192646000000003],
            [-12.232048000000001, 10.934556000000001, -60.241214999999997],
            [-12.853522999999999, 10.503458, -59.193728999999998],
        ]));
        let x = p(-12.73449210566031, 10.364445524278567, -59.830664698600309);
        let u = v(-0.91563184997597713, -0.043079362143260982, -0.39970299456834102);
        let step = mesh.howfar(Some(0), &x, &u, VERY_FAR);
        assert_eq!(step.region, None);
        assert!(step.distance >= mesh.config().min_step);

        let exit = x + u * step.distance;
        let step = mesh.howfar(None, &exit, &u, VERY_FAR);
        assert_eq!(step.region, None);
    }

    #[test]
    fn test_sliver_does_not_stall() {
        let mesh = build(single_element_spec([
            [3.694681593168294, 0.2039078707572552, 9.025968029424174],
            [3.666485868947344, 0.0, 9.025968029424174],
            [3.691449709403482, 0.0, 8.831161635309009],
            [3.874819202280677, 0.0, 9.025968029424174],
        ]));
        let x = p(3.7514090538024902, 0.0, 8.9338606917473982);
        let step = mesh.howfar(Some(0), &x, &v(0.0, 0.0, 1.0), VERY_FAR);
        assert_eq!(step.region, None);
        assert!(step.distance > 0.01);
    }

    #[test]
    fn test_thick_plane_distance_non_negative() {
        let mesh = build(single_element_spec([
            [9.4, 5.0, 0.4],
            [9.5, 5.0, 0.5],
            [9.5, 5.1, 0.4],
            [9.4, 5.1, 0.5],
        ]));
        let x = p(9.4293150393675766, 5.0, 0.42931503936757603);
        let u = v(0.87678438068197007, 0.0, 0.48088371753692627);
        let step = mesh.howfar(Some(0), &x, &u, VERY_FAR);
        assert_eq!(step.region, None);
        assert!(step.distance >= mesh.config().min_step);
    }

    #[test]
    fn test_outside_bounding_box() {
        let mesh = two_element_mesh();
        let x = p(0.0, 0.0, 4.0);
        assert_eq!(mesh.locate(&x), None);
        let bbox = mesh.bounding_box();
        assert_relative_eq!(mesh.hownear(None, &x), bbox.distance_to(&x), epsilon = 1e-15);
    }

    #[test]
    fn test_grid_locate_and_walk() {
        let mesh = grid_mesh();
        assert_eq!(mesh.num_elements(), 162);
        assert_eq!(mesh.boundary_face_count(), 108);
        assert_relative_eq!(mesh.total_volume(), 1.0, epsilon = 1e-12);
        for element in 0..mesh.num_elements() {
            let c = mesh.element_centroid(element);
            assert_eq!(mesh.locate(&c), Some(element));
            let d = mesh.distance_to_outside(Some(element), &c, &v(1.0, 0.0, 0.0));
            assert_relative_eq!(d, 1.0 - c.x, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_grid_exterior_queries() {
        let mesh = grid_mesh();
        let step = mesh.howfar(None, &p(-1.0, 0.37, 0.41), &v(1.0, 0.0, 0.0), VERY_FAR);
        assert_relative_eq!(step.distance, 1.0, epsilon = 1e-12);
        assert_eq!(step.region, mesh.locate(&p(1e-6, 0.37, 0.41)));

        let outside = [
            p(-0.5, 0.5, 0.5),
            p(1.2, 1.3, 0.5),
            p(0.5, 0.5, -0.05),
            p(2.0, -1.0, 3.0),
        ];
        for x in &outside {
            let closest = x.coords.map(|c| c.clamp(0.0, 1.0));
            let exact = (x.coords - closest).norm();
            let d = mesh.hownear(None, x);
            assert!(d <= exact + 1e-12, "{d} > {exact}");
            assert!(d >= 0.0);
        }
    }
}
