//! Convex planar polygons: the facet fragments bounding each cell.

use crate::float_types::Real;
use crate::plane::{BACK, COPLANAR, FRONT, Plane, SPANNING};
use nalgebra::{Point3, Vector3};

/// A convex planar polygon with provenance.
///
/// `source` is the index of the input plane whose cut generated this facet,
/// `None` for the walls of the initial bounding volume. The export layer
/// groups facets by `source` (one material group per original input face).
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Vertices in convex cyclic order.
    pub vertices: Vec<Point3<Real>>,
    /// Supporting plane; for cell facets the normal points out of the cell.
    pub plane: Plane,
    /// Index of the generating input plane, if any.
    pub source: Option<usize>,
}

/// Result of splitting a facet by a cutting plane.
#[derive(Debug, Clone, Default)]
pub struct SplitFacet {
    /// Part on the positive side of the cutting plane, if any.
    pub front: Option<Polygon>,
    /// Part on the negative side, if any.
    pub back: Option<Polygon>,
    /// Points where the facet meets the cutting plane; the caller assembles
    /// the cross-section cap from these.
    pub crossing: Vec<Point3<Real>>,
    /// The whole facet lies on the cutting plane within tolerance.
    pub coplanar: bool,
}

impl Polygon {
    pub fn new(vertices: Vec<Point3<Real>>, plane: Plane, source: Option<usize>) -> Self {
        Polygon {
            vertices,
            plane,
            source,
        }
    }

    /// Like [`Polygon::new`], but reverses the cyclic order if needed so the
    /// winding agrees with `plane`'s normal.
    pub fn oriented(vertices: Vec<Point3<Real>>, plane: Plane, source: Option<usize>) -> Self {
        let mut polygon = Polygon::new(vertices, plane, source);
        if polygon.newell().dot(&plane.normal) < 0.0 {
            polygon.vertices.reverse();
        }
        polygon
    }

    /// Twice the vector area (Newell's method).
    fn newell(&self) -> Vector3<Real> {
        self.vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
            .fold(Vector3::zeros(), |acc, (curr, next)| {
                acc + curr.coords.cross(&next.coords)
            })
    }

    /// Unsigned polygon area.
    pub fn area(&self) -> Real {
        0.5 * self.newell().norm()
    }

    /// Area signed against the supporting plane's normal; positive when the
    /// winding matches.
    pub fn signed_area(&self) -> Real {
        0.5 * self.newell().dot(&self.plane.normal)
    }

    /// Vertex mean; inside the polygon since it is convex.
    pub fn centroid(&self) -> Point3<Real> {
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.vertices.len().max(1) as Real)
    }

    /// Reverse winding and flip the supporting plane.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }

    /// Return a flipped copy.
    pub fn flipped(&self) -> Self {
        let mut polygon = self.clone();
        polygon.flip();
        polygon
    }

    /// Split this facet by `plane`, classifying each vertex within `epsilon`.
    ///
    /// Convexity means each side yields at most one part. Vertices lying on
    /// the cutting plane are reported as crossing points even when the facet
    /// does not span: a facet touching the plane along an edge still bounds
    /// the cross-section.
    pub fn split(&self, plane: &Plane, epsilon: Real) -> SplitFacet {
        let types: Vec<i8> = self
            .vertices
            .iter()
            .map(|v| plane.orient_point(v, epsilon))
            .collect();
        let polygon_type = types.iter().fold(0, |acc, &t| acc | t);

        let mut result = SplitFacet::default();
        for (vertex, &t) in self.vertices.iter().zip(&types) {
            if t == COPLANAR {
                result.crossing.push(*vertex);
            }
        }

        match polygon_type {
            COPLANAR => result.coplanar = true,
            FRONT => result.front = Some(self.clone()),
            BACK => result.back = Some(self.clone()),
            _ => {
                let mut front = Vec::with_capacity(self.vertices.len() + 1);
                let mut back = Vec::with_capacity(self.vertices.len() + 1);

                for i in 0..self.vertices.len() {
                    let j = (i + 1) % self.vertices.len();
                    let type_i = types[i];
                    let type_j = types[j];
                    let vertex_i = self.vertices[i];
                    let vertex_j = self.vertices[j];

                    if type_i != BACK {
                        front.push(vertex_i);
                    }
                    if type_i != FRONT {
                        back.push(vertex_i);
                    }

                    // Edge crosses the plane: interpolate the intersection and
                    // hand it to both parts.
                    if (type_i | type_j) == SPANNING {
                        let denom = plane.normal.dot(&(vertex_j - vertex_i));
                        if denom.abs() > Real::EPSILON {
                            let t =
                                (plane.offset - plane.normal.dot(&vertex_i.coords)) / denom;
                            let intersection = vertex_i + (vertex_j - vertex_i) * t;
                            front.push(intersection);
                            back.push(intersection);
                            result.crossing.push(intersection);
                        }
                    }
                }

                if front.len() >= 3 {
                    result.front = Some(Polygon::new(front, self.plane, self.source));
                }
                if back.len() >= 3 {
                    result.back = Some(Polygon::new(back, self.plane, self.source));
                }
            },
        }
        result
    }

    /// Intersection of two convex fragments on a common supporting plane.
    ///
    /// `other` is projected into this polygon's plane basis, so the two planes
    /// only need to coincide within the construction tolerance; `epsilon` only
    /// guards against degenerate clip edges. Sidedness during clipping is
    /// exact, which makes edge- and point-contact collapse to a degenerate
    /// result instead of an epsilon-wide sliver. Returns `None` when the
    /// overlap degenerates below a polygon; the caller applies its own area
    /// policy on top.
    pub fn intersect_coplanar(&self, other: &Polygon, epsilon: Real) -> Option<Polygon> {
        let (u, v) = self.plane.basis();
        let origin = self.plane.origin();
        let project =
            |p: &Point3<Real>| -> [Real; 2] { [u.dot(&(p - origin)), v.dot(&(p - origin))] };

        let mut subject: Vec<[Real; 2]> = self.vertices.iter().map(project).collect();
        let mut clip: Vec<[Real; 2]> = other.vertices.iter().map(project).collect();
        if signed_area_2d(&clip) < 0.0 {
            clip.reverse();
        }

        for i in 0..clip.len() {
            let a = clip[i];
            let b = clip[(i + 1) % clip.len()];
            subject = clip_edge_2d(&subject, a, b, epsilon);
            if subject.len() < 3 {
                return None;
            }
        }

        let lifted = subject
            .iter()
            .map(|&[x, y]| origin + u * x + v * y)
            .collect();
        Some(Polygon::new(
            lifted,
            self.plane,
            self.source.or(other.source),
        ))
    }
}

/// Shoelace area of a 2-D polygon, positive for counter-clockwise winding.
fn signed_area_2d(points: &[[Real; 2]]) -> Real {
    0.5 * points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(p, q)| p[0] * q[1] - q[0] * p[1])
        .sum::<Real>()
}

/// One Sutherland–Hodgman pass: keep the part of `subject` on the left of the
/// directed edge `a → b`. Edges shorter than `epsilon` are skipped.
fn clip_edge_2d(subject: &[[Real; 2]], a: [Real; 2], b: [Real; 2], epsilon: Real) -> Vec<[Real; 2]> {
    let edge = [b[0] - a[0], b[1] - a[1]];
    let len = (edge[0] * edge[0] + edge[1] * edge[1]).sqrt();
    if len <= epsilon.max(Real::EPSILON) {
        return subject.to_vec();
    }
    // Signed distance of p from the edge's line, positive on the left.
    let side = |p: [Real; 2]| (edge[0] * (p[1] - a[1]) - edge[1] * (p[0] - a[0])) / len;

    let mut out = Vec::with_capacity(subject.len() + 1);
    for i in 0..subject.len() {
        let curr = subject[i];
        let next = subject[(i + 1) % subject.len()];
        let side_curr = side(curr);
        let side_next = side(next);

        if side_curr >= 0.0 {
            out.push(curr);
        }
        if (side_curr > 0.0 && side_next < 0.0) || (side_curr < 0.0 && side_next > 0.0) {
            let t = side_curr / (side_curr - side_next);
            out.push([
                curr[0] + (next[0] - curr[0]) * t,
                curr[1] + (next[1] - curr[1]) * t,
            ]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: Real = 1e-9;

    fn unit_square_z0() -> Polygon {
        let plane = Plane::from_normal(Vector3::z(), 0.0, EPS).unwrap();
        Polygon::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            plane,
            Some(7),
        )
    }

    #[test]
    fn area_and_centroid() {
        let square = unit_square_z0();
        assert!((square.area() - 1.0).abs() < EPS);
        assert!(square.signed_area() > 0.0);
        let c = square.centroid();
        assert!((c.x - 0.5).abs() < EPS && (c.y - 0.5).abs() < EPS);
    }

    #[test]
    fn oriented_fixes_winding() {
        let plane = Plane::from_normal(Vector3::z(), 0.0, EPS).unwrap();
        let clockwise = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let polygon = Polygon::oriented(clockwise, plane, None);
        assert!(polygon.signed_area() > 0.0);
    }

    #[test]
    fn split_spanning_square() {
        let square = unit_square_z0();
        let cutter = Plane::from_normal(Vector3::x(), 0.5, EPS).unwrap();
        let split = square.split(&cutter, EPS);

        assert!(!split.coplanar);
        let front = split.front.unwrap();
        let back = split.back.unwrap();
        assert!((front.area() - 0.5).abs() < 1e-6);
        assert!((back.area() - 0.5).abs() < 1e-6);
        // Both parts keep the provenance of the original facet.
        assert_eq!(front.source, Some(7));
        // Two edges crossed, one crossing point each.
        assert_eq!(split.crossing.len(), 2);
    }

    #[test]
    fn split_detects_coplanar_and_one_sided_facets() {
        let square = unit_square_z0();

        let same = Plane::from_normal(Vector3::z(), 0.0, EPS).unwrap();
        assert!(square.split(&same, EPS).coplanar);

        let below = Plane::from_normal(Vector3::z(), -1.0, EPS).unwrap();
        let split = square.split(&below, EPS);
        assert!(split.front.is_some() && split.back.is_none());
    }

    #[test]
    fn split_reports_touching_edge_as_crossing() {
        let square = unit_square_z0();
        // Grazes the x = 0 edge: no split, but the edge bounds a cross-section.
        let grazing = Plane::from_normal(Vector3::x(), 0.0, EPS).unwrap();
        let split = square.split(&grazing, EPS);
        assert!(split.back.is_none());
        assert_eq!(split.crossing.len(), 2);
    }

    #[test]
    fn coplanar_intersection_of_offset_squares() {
        let a = unit_square_z0();
        let plane = a.plane;
        let b = Polygon::new(
            vec![
                Point3::new(0.5, 0.5, 0.0),
                Point3::new(1.5, 0.5, 0.0),
                Point3::new(1.5, 1.5, 0.0),
                Point3::new(0.5, 1.5, 0.0),
            ],
            plane,
            None,
        );

        let shared = a.intersect_coplanar(&b, 1e-9).unwrap();
        assert!((shared.area() - 0.25).abs() < 1e-6);
        assert_eq!(shared.source, Some(7));
    }

    #[test]
    fn coplanar_intersection_rejects_edge_contact() {
        let a = unit_square_z0();
        let plane = a.plane;
        // Shares only the x = 1 edge.
        let b = Polygon::new(
            vec![
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
            plane,
            None,
        );
        match a.intersect_coplanar(&b, 1e-9) {
            None => {},
            Some(sliver) => assert!(sliver.area() < 1e-12),
        }
    }

    #[test]
    fn intersection_handles_opposite_winding() {
        let a = unit_square_z0();
        let flipped = a.flipped();
        let shared = a.intersect_coplanar(&flipped, 1e-9).unwrap();
        assert!((shared.area() - 1.0).abs() < 1e-6);
    }
}
