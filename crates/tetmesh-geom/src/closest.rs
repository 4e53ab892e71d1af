//! Closest-point and plane-side queries.
//!
//! Follows the Voronoi-region formulation of Ericson, *Real-Time Collision
//! Detection*, sections 5.1.5 and 5.1.6.

use tetmesh_math::Point3;

/// Closest point on triangle `abc` to `p`.
///
/// Classifies `p` against the seven Voronoi regions of the triangle (three
/// vertices, three edges, the face interior) and projects accordingly.
pub fn closest_point_triangle(p: &Point3, a: &Point3, b: &Point3, c: &Point3) -> Point3 {
    let ab = b - a;
    let ac = c - a;

    // Vertex region A
    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    // Vertex region B
    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    // Edge region AB
    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + v * ab;
    }

    // Vertex region C
    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    // Edge region AC
    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + w * ac;
    }

    // Edge region BC
    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + w * (c - b);
    }

    // Face interior
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

/// True if `p` and `d` lie strictly on opposite sides of the plane `abc`.
///
/// Points on the plane are never outside.
pub fn point_outside_of_plane(p: &Point3, a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> bool {
    let n = (b - a).cross(&(c - a));
    let sign_p = (p - a).dot(&n);
    let sign_d = (d - a).dot(&n);
    sign_p * sign_d < 0.0
}

/// Closest point on (or in) tetrahedron `abcd` to `p`.
///
/// Only faces whose plane separates `p` from the opposite vertex are
/// searched; a point inside all four planes is its own closest point.
pub fn closest_point_tetrahedron(
    p: &Point3,
    a: &Point3,
    b: &Point3,
    c: &Point3,
    d: &Point3,
) -> Point3 {
    let mut closest = *p;
    let mut best_sq = f64::INFINITY;

    let faces = [(a, b, c, d), (a, c, d, b), (a, d, b, c), (b, d, c, a)];
    for (u, v, w, opposite) in faces {
        if point_outside_of_plane(p, u, v, w, opposite) {
            let q = closest_point_triangle(p, u, v, w);
            let dist_sq = (q - p).norm_squared();
            if dist_sq < best_sq {
                best_sq = dist_sq;
                closest = q;
            }
        }
    }
    closest
}

/// True if `p` is inside tetrahedron `abcd` or on its boundary.
pub fn point_in_tetrahedron(p: &Point3, a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> bool {
    !point_outside_of_plane(p, a, b, c, d)
        && !point_outside_of_plane(p, a, c, d, b)
        && !point_outside_of_plane(p, a, d, b, c)
        && !point_outside_of_plane(p, b, d, c, a)
}
