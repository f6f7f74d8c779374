//! Convex polyhedral cells: the leaves of the partition.

use crate::aabb;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::plane::Plane;
use crate::polygon::Polygon;
use nalgebra::{Point3, Vector3};

/// A convex region of space, the conjunction of the half-space constraints
/// collected along its path from the BSP root.
///
/// Cells are never mutated after creation: a split *replaces* a cell by two
/// children, so handles held by consumers stay valid. Facet planes point out
/// of the cell, and the interior is where every half-space's signed distance
/// is non-positive.
#[derive(Debug, Clone)]
pub struct Cell {
    halfspaces: Vec<Plane>,
    facets: Vec<Polygon>,
    aabb: Aabb,
}

impl Cell {
    /// The root cell: a box with six outward wall facets and no provenance.
    pub fn from_bounds(bounds: &Aabb) -> Self {
        let m = bounds.mins;
        let h = bounds.maxs;
        let corner = |x: Real, y: Real, z: Real| Point3::new(x, y, z);

        // (outward normal, offset, four wall corners); `oriented` fixes winding.
        let walls: [(Vector3<Real>, Real, [Point3<Real>; 4]); 6] = [
            (
                -Vector3::x(),
                -m.x,
                [
                    corner(m.x, m.y, m.z),
                    corner(m.x, h.y, m.z),
                    corner(m.x, h.y, h.z),
                    corner(m.x, m.y, h.z),
                ],
            ),
            (
                Vector3::x(),
                h.x,
                [
                    corner(h.x, m.y, m.z),
                    corner(h.x, h.y, m.z),
                    corner(h.x, h.y, h.z),
                    corner(h.x, m.y, h.z),
                ],
            ),
            (
                -Vector3::y(),
                -m.y,
                [
                    corner(m.x, m.y, m.z),
                    corner(h.x, m.y, m.z),
                    corner(h.x, m.y, h.z),
                    corner(m.x, m.y, h.z),
                ],
            ),
            (
                Vector3::y(),
                h.y,
                [
                    corner(m.x, h.y, m.z),
                    corner(h.x, h.y, m.z),
                    corner(h.x, h.y, h.z),
                    corner(m.x, h.y, h.z),
                ],
            ),
            (
                -Vector3::z(),
                -m.z,
                [
                    corner(m.x, m.y, m.z),
                    corner(h.x, m.y, m.z),
                    corner(h.x, h.y, m.z),
                    corner(m.x, h.y, m.z),
                ],
            ),
            (
                Vector3::z(),
                h.z,
                [
                    corner(m.x, m.y, h.z),
                    corner(h.x, m.y, h.z),
                    corner(h.x, h.y, h.z),
                    corner(m.x, h.y, h.z),
                ],
            ),
        ];

        let mut halfspaces = Vec::with_capacity(6);
        let mut facets = Vec::with_capacity(6);
        for (normal, offset, corners) in walls {
            let plane = Plane { normal, offset };
            halfspaces.push(plane);
            facets.push(Polygon::oriented(corners.to_vec(), plane, None));
        }

        Cell {
            halfspaces,
            facets,
            aabb: *bounds,
        }
    }

    /// Bounding facets, outward-oriented.
    pub fn facets(&self) -> &[Polygon] {
        &self.facets
    }

    /// Half-space constraints accumulated along the BSP path.
    pub fn halfspaces(&self) -> &[Plane] {
        &self.halfspaces
    }

    /// Tight bounding box, recomputed at every split.
    pub const fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Split this cell by `plane` into (front, back) children.
    ///
    /// Returns `None` when the plane misses the cell or only grazes its
    /// boundary within `epsilon`: a grazing plane must not create zero-volume
    /// children, the cell passes through unchanged. Both children must clear
    /// the `epsilon³` volume gate. `source` is the input-plane index recorded
    /// on the new cap facets.
    pub fn split(&self, plane: &Plane, source: usize, epsilon: Real) -> Option<(Cell, Cell)> {
        let mut front_facets = Vec::with_capacity(self.facets.len() + 1);
        let mut back_facets = Vec::with_capacity(self.facets.len() + 1);
        let mut crossing: Vec<Point3<Real>> = Vec::new();

        for facet in &self.facets {
            let split = facet.split(plane, epsilon);
            if split.coplanar {
                // The plane lies on the cell boundary.
                return None;
            }
            front_facets.extend(split.front);
            back_facets.extend(split.back);
            crossing.extend(split.crossing);
        }

        if front_facets.is_empty() || back_facets.is_empty() {
            return None;
        }

        // The cross-section cap: dedup the crossing points and order them
        // angularly around their centroid in the cutting plane's basis.
        let cap_points = dedup_points(crossing, epsilon);
        if cap_points.len() < 3 {
            return None;
        }
        let cap_points = sort_by_angle(cap_points, plane);

        let cap_back = Polygon::oriented(cap_points, *plane, Some(source));
        let cap_front = cap_back.flipped();

        back_facets.push(cap_back);
        front_facets.push(cap_front);

        let front = Cell::from_facets(front_facets, &self.halfspaces, plane.flipped());
        let back = Cell::from_facets(back_facets, &self.halfspaces, *plane);

        let gate = epsilon * epsilon * epsilon;
        if front.volume() <= gate || back.volume() <= gate {
            return None;
        }
        Some((front, back))
    }

    fn from_facets(facets: Vec<Polygon>, parent_halfspaces: &[Plane], constraint: Plane) -> Self {
        let points: Vec<Point3<Real>> = facets
            .iter()
            .flat_map(|f| f.vertices.iter().copied())
            .collect();
        // Non-empty by construction: callers pass at least one facet.
        let aabb = aabb::from_points(&points)
            .unwrap_or(Aabb::new(Point3::origin(), Point3::origin()));

        let mut halfspaces = Vec::with_capacity(parent_halfspaces.len() + 1);
        halfspaces.extend_from_slice(parent_halfspaces);
        halfspaces.push(constraint);

        Cell {
            halfspaces,
            facets,
            aabb,
        }
    }

    /// Cell volume by the divergence theorem: with outward unit facet normals,
    /// `V = (1/3) Σ area_f · offset_f`.
    pub fn volume(&self) -> Real {
        self.facets
            .iter()
            .map(|f| f.signed_area() * f.plane.offset)
            .sum::<Real>()
            / 3.0
    }

    /// Corner vertices, deduplicated within `epsilon`.
    pub fn vertices(&self, epsilon: Real) -> Vec<Point3<Real>> {
        let points = self
            .facets
            .iter()
            .flat_map(|f| f.vertices.iter().copied())
            .collect();
        dedup_points(points, epsilon)
    }

    /// Mean of the corner vertices; interior, since the cell is convex.
    pub fn centroid(&self) -> Point3<Real> {
        let vertices = self.vertices(0.0);
        let sum = vertices
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / vertices.len().max(1) as Real)
    }

    /// Whether `point` satisfies every half-space constraint within `epsilon`.
    pub fn contains(&self, point: &Point3<Real>, epsilon: Real) -> bool {
        self.halfspaces
            .iter()
            .all(|h| h.signed_distance(point) <= epsilon)
    }
}

/// Keep the first of every cluster of points closer than `epsilon`.
fn dedup_points(points: Vec<Point3<Real>>, epsilon: Real) -> Vec<Point3<Real>> {
    let mut unique: Vec<Point3<Real>> = Vec::with_capacity(points.len());
    for p in points {
        if !unique
            .iter()
            .any(|q| (p - q).norm_squared() <= epsilon * epsilon)
        {
            unique.push(p);
        }
    }
    unique
}

/// Order coplanar points counter-clockwise (seen along the plane normal)
/// around their centroid.
fn sort_by_angle(points: Vec<Point3<Real>>, plane: &Plane) -> Vec<Point3<Real>> {
    let (u, v) = plane.basis();
    let centroid = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords)
        / points.len() as Real;

    let mut angled: Vec<(Real, Point3<Real>)> = points
        .into_iter()
        .map(|p| {
            let d = p.coords - centroid;
            (v.dot(&d).atan2(u.dot(&d)), p)
        })
        .collect();
    angled.sort_by(|a, b| a.0.total_cmp(&b.0));
    angled.into_iter().map(|(_, p)| p).collect()
}
