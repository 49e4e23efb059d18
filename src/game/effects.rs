//! Game polish - pop rings and landing pulses.

use bevy::prelude::*;

use super::{
    render::playfield_to_world,
    session::{BubbleSettled, ClusterPopped},
};
use crate::{PausableSystems, config::GameConfig, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (spawn_pop_rings, spawn_landing_pulse, animate_rings)
            .chain()
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// How long a pop ring lives, in seconds.
const POP_DURATION: f32 = 0.3;

/// How long a landing pulse lives, in seconds.
const LANDING_DURATION: f32 = 0.15;

/// An expanding, fading ring drawn where something happened.
#[derive(Component)]
pub struct Ring {
    /// Time elapsed in the animation.
    pub timer: f32,
    /// Total animation duration.
    pub duration: f32,
    /// Center in world space.
    pub center: Vec2,
    pub start_radius: f32,
    pub end_radius: f32,
    pub color: Color,
}

impl Ring {
    pub fn new(center: Vec2, radius: f32, duration: f32, growth: f32, color: Color) -> Self {
        Self {
            timer: 0.0,
            duration,
            center,
            start_radius: radius,
            end_radius: radius * growth,
            color,
        }
    }

    /// Animation progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        (self.timer / self.duration).min(1.0)
    }
}

/// Spawn one ring per popped bubble.
fn spawn_pop_rings(
    mut commands: Commands,
    mut popped_events: MessageReader<ClusterPopped>,
    config: Res<GameConfig>,
) {
    for event in popped_events.read() {
        info!("Cluster popped: {} {:?} bubbles", event.count, event.color);

        for &position in &event.positions {
            commands.spawn((
                Name::new("Pop Ring"),
                Ring::new(
                    playfield_to_world(position, &config),
                    config.bubble_radius,
                    POP_DURATION,
                    1.6,
                    event.color.to_color(),
                ),
                DespawnOnExit(Screen::Gameplay),
            ));
        }
    }
}

/// Spawn a short pulse where a bubble came to rest.
fn spawn_landing_pulse(
    mut commands: Commands,
    mut settled_events: MessageReader<BubbleSettled>,
    config: Res<GameConfig>,
) {
    for event in settled_events.read() {
        commands.spawn((
            Name::new("Landing Pulse"),
            Ring::new(
                playfield_to_world(event.position, &config),
                config.bubble_radius,
                LANDING_DURATION,
                1.2,
                Color::WHITE,
            ),
            DespawnOnExit(Screen::Gameplay),
        ));
    }
}

/// Grow and fade rings, despawning them when done.
fn animate_rings(
    mut commands: Commands,
    time: Res<Time>,
    mut gizmos: Gizmos,
    mut query: Query<(Entity, &mut Ring)>,
) {
    for (entity, mut ring) in &mut query {
        ring.timer += time.delta_secs();
        let progress = ring.progress();

        let radius = ring.start_radius + (ring.end_radius - ring.start_radius) * progress;
        let alpha = 1.0 - progress;
        gizmos.circle_2d(
            Isometry2d::from_translation(ring.center),
            radius,
            ring.color.with_alpha(alpha),
        );

        if progress >= 1.0 {
            commands.entity(entity).despawn();
        }
    }
}
