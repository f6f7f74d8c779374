//! Cutting planes and tolerant orientation predicates.
//!
//! A [`Plane`] is both a BSP cutting plane and a cell-boundary facet
//! descriptor. Planes are derived once from input polygons and never mutated
//! afterwards.

use crate::errors::ConstructError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use nalgebra::{Point3, Vector3};

// Orientation of a point (or the union of a polygon's points) relative to a plane.
pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;

/// An oriented plane `normal · p = offset` with unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal vector of the plane
    pub normal: Vector3<Real>,
    /// Distance from origin along `normal`
    pub offset: Real,
}

impl Plane {
    /// Create a plane from a (not necessarily unit) normal and offset.
    ///
    /// Fails with [`ConstructError::DegeneratePlane`] when the normal is
    /// shorter than `epsilon` or not finite.
    pub fn from_normal(
        normal: Vector3<Real>,
        offset: Real,
        epsilon: Real,
    ) -> Result<Self, ConstructError> {
        Plane { normal, offset }.normalized(epsilon).ok_or_else(|| {
            ConstructError::DegeneratePlane(
                "plane normal is zero-length or non-finite".to_string(),
            )
        })
    }

    /// Fit a plane to three or more roughly coplanar points (a mesh face).
    ///
    /// Rather than trusting the first three vertices, the defining triangle is
    /// built from the farthest point pair plus the point farthest from their
    /// chord, which keeps the normal stable on slivery faces. The result is
    /// oriented to agree with the winding of `points` (Newell's method).
    ///
    /// Fails with [`ConstructError::DegeneratePlane`] when the points are
    /// coincident or collinear within `epsilon`.
    pub fn from_points(points: &[Point3<Real>], epsilon: Real) -> Result<Self, ConstructError> {
        let n = points.len();
        if n < 3 {
            return Err(ConstructError::DegeneratePlane(format!(
                "a plane needs at least three points, got {n}"
            )));
        }

        // Longest chord (farthest pair of points)
        let Some((i0, i1, d2)) = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .map(|(i, j)| (i, j, (points[i] - points[j]).norm_squared()))
            .max_by(|a, b| a.2.total_cmp(&b.2))
        else {
            return Err(ConstructError::DegeneratePlane(
                "no point pair found".to_string(),
            ));
        };
        if d2 <= epsilon * epsilon {
            return Err(ConstructError::DegeneratePlane(
                "points are coincident within tolerance".to_string(),
            ));
        }

        let p0 = points[i0];
        let dir = points[i1] - p0;

        // Point farthest from the chord; |cross|² = d2 · height², so the
        // height-above-chord test stays scale-correct.
        let Some((i2, a2)) = points
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != i0 && *index != i1)
            .map(|(index, p)| (index, (p - p0).cross(&dir).norm_squared()))
            .max_by(|a, b| a.1.total_cmp(&b.1))
        else {
            return Err(ConstructError::DegeneratePlane(
                "no point off the chord".to_string(),
            ));
        };
        if a2 <= epsilon * epsilon * d2 {
            return Err(ConstructError::DegeneratePlane(
                "points are collinear within tolerance".to_string(),
            ));
        }

        let normal = dir.cross(&(points[i2] - p0)).normalize();

        // Newell reference normal of the whole polygon, to match the winding.
        let reference = points
            .iter()
            .zip(points.iter().cycle().skip(1))
            .fold(Vector3::zeros(), |acc, (curr, next)| {
                acc + curr.coords.cross(&next.coords)
            });
        let normal = if normal.dot(&reference) < 0.0 {
            -normal
        } else {
            normal
        };

        // Mean projection is less noisy than any single vertex.
        let offset = points.iter().map(|p| normal.dot(&p.coords)).sum::<Real>() / n as Real;

        Ok(Plane { normal, offset })
    }

    /// Unit-normalized copy, or `None` when the plane is unusable.
    pub fn normalized(&self, epsilon: Real) -> Option<Self> {
        if !self.normal.iter().all(|c| c.is_finite()) || !self.offset.is_finite() {
            return None;
        }
        let len = self.normal.norm();
        if len <= epsilon {
            return None;
        }
        Some(Plane {
            normal: self.normal / len,
            offset: self.offset / len,
        })
    }

    /// Signed distance from `point` to the plane (positive on the `normal` side).
    pub fn signed_distance(&self, point: &Point3<Real>) -> Real {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Classify `point` as [`FRONT`], [`BACK`] or [`COPLANAR`] within `epsilon`.
    pub fn orient_point(&self, point: &Point3<Real>, epsilon: Real) -> i8 {
        let distance = self.signed_distance(point);
        if distance > epsilon {
            FRONT
        } else if distance < -epsilon {
            BACK
        } else {
            COPLANAR
        }
    }

    /// Whether `other` describes the same plane within `epsilon`, in either
    /// orientation.
    pub fn coincident(&self, other: &Plane, epsilon: Real) -> bool {
        let dot = self.normal.dot(&other.normal);
        if 1.0 - dot.abs() > epsilon {
            return false;
        }
        if dot >= 0.0 {
            (self.offset - other.offset).abs() <= epsilon
        } else {
            (self.offset + other.offset).abs() <= epsilon
        }
    }

    /// Plane/box overlap: the projection interval radius of the box onto the
    /// normal is compared against the distance of the box center from the
    /// plane. Within `epsilon` of grazing still counts as crossing.
    pub fn crosses_aabb(&self, aabb: &Aabb, epsilon: Real) -> bool {
        let radius = aabb.half_extents().dot(&self.normal.abs());
        self.signed_distance(&aabb.center()).abs() <= radius + epsilon
    }

    /// Flip the plane (reverse normal and offset)
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.offset = -self.offset;
    }

    /// Return a flipped copy of this plane
    pub fn flipped(&self) -> Self {
        Plane {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// A point on the plane, the projection of the origin.
    pub fn origin(&self) -> Point3<Real> {
        Point3::from(self.normal * self.offset)
    }

    /// Orthonormal basis `{u, v}` spanning the plane, with `u × v = normal`.
    pub fn basis(&self) -> (Vector3<Real>, Vector3<Real>) {
        let mut u = if self.normal.z.abs() > self.normal.x.abs()
            || self.normal.z.abs() > self.normal.y.abs()
        {
            // normal is closer to ±Z ⇒ cross with X
            Vector3::x().cross(&self.normal)
        } else {
            // otherwise cross with Z
            Vector3::z().cross(&self.normal)
        };
        u.normalize_mut();
        let v = self.normal.cross(&u).normalize();
        (u, v)
    }
}

/// Stable reorder of plane indices placing near-vertical planes first.
///
/// Facade planes partition building interiors most effectively, and missing
/// data makes them the ones worth applying before the candidate lists shrink.
/// A plane is vertical when the slope ratio of its normal exceeds
/// `slope_threshold`. Order within each class is preserved; apply the returned
/// permutation *before* [`crate::CellComplex::construct`], which never
/// reorders on its own.
pub fn vertical_first(planes: &[Plane], slope_threshold: Real) -> Vec<usize> {
    let (mut vertical, horizontal): (Vec<usize>, Vec<usize>) =
        (0..planes.len()).partition(|&i| {
            let n = &planes[i].normal;
            let slope_squared = (n.x * n.x + n.y * n.y) / (n.z * n.z + Real::EPSILON);
            slope_squared > slope_threshold * slope_threshold
        });
    vertical.extend(horizontal);
    vertical
}
