//! Debug visualization for the placement grid.
//!
//! Toggle with the 'D' key during gameplay.
//! Shows:
//! - Grid lines at every cell boundary the snap rounds to
//! - The collision reach around the flying bubble

use bevy::{color::palettes::css, input::common_conditions::input_just_pressed, prelude::*};

use super::{render::playfield_to_world, session::Session};
use crate::{config::GameConfig, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<DebugGridVisible>();

    // Toggle debug with 'D' key
    app.add_systems(
        Update,
        toggle_debug.run_if(in_state(Screen::Gameplay).and(input_just_pressed(KeyCode::KeyD))),
    );

    // Draw debug grid when visible
    app.add_systems(
        Update,
        draw_debug_grid.run_if(
            in_state(Screen::Gameplay)
                .and(debug_visible)
                .and(resource_exists::<Session>),
        ),
    );

    // Always draw walls during gameplay
    app.add_systems(Update, draw_walls.run_if(in_state(Screen::Gameplay)));
}

/// Resource to track if debug visualization is visible.
#[derive(Resource, Default)]
pub struct DebugGridVisible(pub bool);

fn debug_visible(debug: Res<DebugGridVisible>) -> bool {
    debug.0
}

fn toggle_debug(mut debug: ResMut<DebugGridVisible>) {
    debug.0 = !debug.0;
    let state = if debug.0 { "ON" } else { "OFF" };
    info!("Debug grid: {}", state);
}

/// Draw grid lines and the flying bubble's collision reach.
fn draw_debug_grid(mut gizmos: Gizmos, session: Res<Session>) {
    let config = session.config();
    let cell = config.cell_size();
    let color = css::WHITE.with_alpha(0.15);

    let cols = (config.width / cell).floor() as u32;
    let rows = (config.height / cell).floor() as u32;

    for col in 0..=cols {
        let x = col as f32 * cell;
        gizmos.line_2d(
            playfield_to_world(Vec2::new(x, 0.0), config),
            playfield_to_world(Vec2::new(x, config.height), config),
            color,
        );
    }

    for row in 0..=rows {
        let y = row as f32 * cell;
        gizmos.line_2d(
            playfield_to_world(Vec2::new(0.0, y), config),
            playfield_to_world(Vec2::new(config.width, y), config),
            color,
        );
    }

    // A settled bubble inside this ring will stop the flying one.
    if let Some(bubble) = session.shooter().in_flight() {
        gizmos.circle_2d(
            Isometry2d::from_translation(playfield_to_world(bubble.position, config)),
            bubble.radius * 2.0,
            css::LIMEGREEN.with_alpha(0.5),
        );
    }
}

/// Draw the playfield boundary (always visible during gameplay).
fn draw_walls(mut gizmos: Gizmos, config: Res<GameConfig>) {
    gizmos.rect_2d(
        Isometry2d::from_translation(Vec2::ZERO),
        Vec2::new(config.width, config.height),
        css::ORANGE.with_alpha(0.8),
    );
}
