//! Tolerant helpers over parry's axis-aligned bounding box.
//!
//! Boxes computed from earlier plane arithmetic carry floating-point error, so
//! flush-contact geometry ends up separated by tiny gaps. The predicates here
//! therefore take an explicit `epsilon` and treat boxes within that distance of
//! touching as intersecting.

use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use nalgebra::Point3;

/// Tolerant box-overlap test: `a` and `b` intersect if they are separated by
/// less than `epsilon` along every axis. Zero-volume boxes participate like
/// points.
pub fn touches(a: &Aabb, b: &Aabb, epsilon: Real) -> bool {
    a.mins.x <= b.maxs.x + epsilon
        && b.mins.x <= a.maxs.x + epsilon
        && a.mins.y <= b.maxs.y + epsilon
        && b.mins.y <= a.maxs.y + epsilon
        && a.mins.z <= b.maxs.z + epsilon
        && b.mins.z <= a.maxs.z + epsilon
}

/// Tight box over a point set, or `None` for an empty set.
pub fn from_points(points: &[Point3<Real>]) -> Option<Aabb> {
    let first = points.first()?;
    let mut mins = *first;
    let mut maxs = *first;
    for p in &points[1..] {
        mins.x = mins.x.min(p.x);
        mins.y = mins.y.min(p.y);
        mins.z = mins.z.min(p.z);
        maxs.x = maxs.x.max(p.x);
        maxs.y = maxs.y.max(p.y);
        maxs.z = maxs.z.max(p.z);
    }
    Some(Aabb::new(mins, maxs))
}

/// A box is usable as a partitioning extent when it is finite and thicker than
/// `epsilon` along every axis.
pub fn usable(aabb: &Aabb, epsilon: Real) -> bool {
    let finite = aabb.mins.iter().all(|c| c.is_finite()) && aabb.maxs.iter().all(|c| c.is_finite());
    finite
        && aabb.maxs.x - aabb.mins.x > epsilon
        && aabb.maxs.y - aabb.mins.y > epsilon
        && aabb.maxs.z - aabb.mins.z > epsilon
}

/// Box volume; negative extents clamp to zero.
pub fn volume(aabb: &Aabb) -> Real {
    let e = aabb.maxs - aabb.mins;
    e.x.max(0.0) * e.y.max(0.0) * e.z.max(0.0)
}
