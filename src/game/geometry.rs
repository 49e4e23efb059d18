//! Circle distance and overlap tests.
//!
//! All bubbles share one radius, so two bubbles touch when their centers are
//! at most one diameter apart.

use bevy::math::Vec2;

/// Euclidean distance between two centers.
#[inline]
pub fn center_distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Whether two circles of the given radius overlap or touch.
#[inline]
pub fn circles_collide(a: Vec2, b: Vec2, radius: f32) -> bool {
    center_distance(a, b) <= radius * 2.0
}

/// Whether `b` is close enough to `a` to act as a placement neighbor.
///
/// Strictly less than `cell_size - tolerance`.
#[inline]
pub fn within_cell(a: Vec2, b: Vec2, cell_size: f32, tolerance: f32) -> bool {
    center_distance(a, b) < cell_size - tolerance
}

/// Angle of the vector pointing from `from` to `to`, in radians.
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}
