//! Pairwise box overlap and positional separation.
//!
//! `Agent::step` never calls `resolve`; it only reverses direction on a
//! collision ahead. The world runs `resolve` after a tick when
//! `SimConfig::resolve_overlaps` is on.

use crate::agent::Agent;
use crate::geometry;

/// Fraction of the summed widths the pair is pushed apart by, split evenly.
const PUSH_FACTOR: f64 = 0.51;

pub fn check(a: &Agent, b: &Agent) -> bool {
    a.rect().overlaps(&b.rect())
}

/// Push `a` and `b` apart along the line between their centers and point
/// each one away from the other.
pub fn resolve(a: &mut Agent, b: &mut Agent) {
    let away_from_b = geometry::normalize_or(
        geometry::sub(a.rect().center(), b.rect().center()),
        [1.0, 0.0],
    );
    let push = geometry::scale(away_from_b, (a.size[0] + b.size[0]) * PUSH_FACTOR * 0.5);

    a.position = geometry::add(a.position, push);
    b.position = geometry::sub(b.position, push);

    a.direction = away_from_b;
    b.direction = geometry::neg(away_from_b);
}
