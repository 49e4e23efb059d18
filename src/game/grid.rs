//! The implicit placement grid.
//!
//! There is no stored grid. Settled positions are normalized by rounding each
//! axis to the nearest multiple of the cell size (one bubble diameter). This is
//! a coarse square quantization, not a hex layout; placement adjustment in the
//! playfield takes care of packing against neighbors.

use bevy::math::Vec2;

/// Round a raw position to the nearest grid point, each axis independently.
///
/// A position exactly halfway between two grid points goes to the even one, so
/// a bubble centered in the first column snaps to the wall rather than a cell
/// to the right.
pub fn snap_to_grid(position: Vec2, cell_size: f32) -> Vec2 {
    debug_assert!(cell_size > 0.0, "cell size must be positive");
    Vec2::new(
        (position.x / cell_size).round_ties_even() * cell_size,
        (position.y / cell_size).round_ties_even() * cell_size,
    )
}

/// Center of the cell at (`col`, `row`) for a layout whose first cell touches
/// the top-left corner.
pub fn cell_center(col: u32, row: u32, cell_size: f32) -> Vec2 {
    let radius = cell_size / 2.0;
    Vec2::new(
        col as f32 * cell_size + radius,
        row as f32 * cell_size + radius,
    )
}
