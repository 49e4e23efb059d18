//! The main game module for the bubble shooter.
//!
//! This module contains all the gameplay logic including:
//! - Bubble entities, motion and wall bounce
//! - Collision tests and grid snapping
//! - The playfield of settled bubbles
//! - Shooter aiming, firing and cooldown
//! - Cluster detection and popping
//! - The session that runs each simulation tick

mod bubble;
mod cluster;
mod debug;
mod effects;
mod geometry;
mod grid;
mod playfield;
mod render;
mod session;
mod shooter;

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        bubble::plugin,
        shooter::plugin,
        session::plugin,
        render::plugin,
        effects::plugin,
        debug::plugin,
    ));
}
