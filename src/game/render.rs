//! Drawing the session with gizmos.
//!
//! The simulation works in playfield coordinates (origin top-left, y down);
//! the camera sees world coordinates (origin at the center, y up). Everything
//! is redrawn each frame from the session's current state.

use bevy::prelude::*;

use super::session::Session;
use crate::{config::GameConfig, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        draw_session.run_if(in_state(Screen::Gameplay).and(resource_exists::<Session>)),
    );
}

/// Shooter body color.
const SHOOTER_COLOR: Color = Color::srgb(1.0, 1.0, 0.0);

/// Aim line color.
const AIM_LINE_COLOR: Color = Color::WHITE;

/// Length of the aim line in pixels.
const AIM_LINE_LENGTH: f32 = 50.0;

/// Convert a playfield position to world space.
pub fn playfield_to_world(position: Vec2, config: &GameConfig) -> Vec2 {
    Vec2::new(
        position.x - config.width / 2.0,
        config.height / 2.0 - position.y,
    )
}

/// Convert a world position to playfield space.
pub fn world_to_playfield(position: Vec2, config: &GameConfig) -> Vec2 {
    Vec2::new(
        position.x + config.width / 2.0,
        config.height / 2.0 - position.y,
    )
}

/// Draw settled bubbles, the flying bubble, the shooter and its aim line.
fn draw_session(mut gizmos: Gizmos, session: Res<Session>) {
    let config = session.config();

    for (_, bubble) in session.field().iter() {
        draw_bubble(
            &mut gizmos,
            playfield_to_world(bubble.position, config),
            bubble.radius,
            bubble.color.to_color(),
        );
    }

    let shooter = session.shooter();
    if let Some(bubble) = shooter.in_flight() {
        draw_bubble(
            &mut gizmos,
            playfield_to_world(bubble.position, config),
            bubble.radius,
            bubble.color.to_color(),
        );
    }

    let radius = config.bubble_radius;
    let origin = shooter.position();
    draw_bubble(
        &mut gizmos,
        playfield_to_world(origin, config),
        radius,
        SHOOTER_COLOR,
    );

    // Next bubble preview sits just below the shooter.
    draw_bubble(
        &mut gizmos,
        playfield_to_world(origin + Vec2::new(0.0, radius * 2.0), config),
        radius,
        shooter.next_color().to_color(),
    );

    let angle = shooter.angle();
    let end = origin + Vec2::new(angle.cos(), -angle.sin()) * AIM_LINE_LENGTH;
    gizmos.line_2d(
        playfield_to_world(origin, config),
        playfield_to_world(end, config),
        AIM_LINE_COLOR,
    );
}

/// Draw a bubble as nested rings so it reads as a solid disc.
fn draw_bubble(gizmos: &mut Gizmos, center: Vec2, radius: f32, color: Color) {
    let rings = 4;
    for i in 0..rings {
        let r = radius * (1.0 - i as f32 / rings as f32);
        gizmos
            .circle_2d(Isometry2d::from_translation(center), r, color)
            .resolution(32);
    }
}
