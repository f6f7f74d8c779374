//! Sweep-and-prune candidate pair enumeration over bounding boxes.
//!
//! Sorting the boxes along one axis and sweeping with an active window avoids
//! the O(n²) all-pairs test when boxes are spread out. Every truly
//! intersecting pair is reported; false positives survive the box test and
//! must be filtered by the caller's exact geometric test.

use crate::aabb;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};

/// All unordered index pairs whose boxes intersect within `epsilon`.
///
/// The sweep axis is the one with the greatest spread of box minima, which
/// keeps the active window short for elongated scenes. Pairs come out with
/// `a < b`, in sweep order; the order is deterministic for identical input.
pub fn intersecting_pairs(boxes: &[Aabb], epsilon: Real) -> Vec<(usize, usize)> {
    if boxes.len() < 2 {
        return Vec::new();
    }

    let axis = sweep_axis(boxes);
    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|&a, &b| boxes[a].mins[axis].total_cmp(&boxes[b].mins[axis]));

    let mut active: Vec<usize> = Vec::new();
    let mut pairs = Vec::new();
    for &i in &order {
        let sweep_min = boxes[i].mins[axis];
        active.retain(|&j| boxes[j].maxs[axis] + epsilon >= sweep_min);
        for &j in &active {
            if aabb::touches(&boxes[i], &boxes[j], epsilon) {
                pairs.push(if i < j { (i, j) } else { (j, i) });
            }
        }
        active.push(i);
    }
    pairs
}

/// Axis with the greatest spread of box minima.
fn sweep_axis(boxes: &[Aabb]) -> usize {
    let mut spread: [Real; 3] = [0.0; 3];
    for axis in 0..3 {
        let mut lo = Real::INFINITY;
        let mut hi = Real::NEG_INFINITY;
        for b in boxes {
            lo = lo.min(b.mins[axis]);
            hi = hi.max(b.mins[axis]);
        }
        spread[axis] = hi - lo;
    }
    let mut best = 0;
    for axis in 1..3 {
        if spread[axis] > spread[best] {
            best = axis;
        }
    }
    best
}
