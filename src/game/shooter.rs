//! The shooter at the bottom of the screen.
//!
//! The player aims with the mouse, slides the shooter with the arrow keys and
//! fires with Space or a left click. Only one bubble can be in flight, and
//! shots are rate-limited by a cooldown.

use bevy::{prelude::*, window::PrimaryWindow};
use rand::Rng;
use std::f32::consts::FRAC_PI_2;

use super::{
    bubble::{Bubble, BubbleColor},
    playfield::Playfield,
    render::world_to_playfield,
    session::PendingInput,
};
use crate::{PausableSystems, config::GameConfig, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        gather_shooter_input
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// Who owns the moving bubble, if anyone.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Flight {
    #[default]
    Idle,
    InFlight(Bubble),
}

/// The launcher: position, aim, in-flight bubble and next color.
#[derive(Debug, Clone)]
pub struct Shooter {
    position: Vec2,
    /// Aim angle in radians from the +x axis, "up" positive.
    angle: f32,
    flight: Flight,
    next_color: BubbleColor,
    last_shot_ms: Option<u64>,
    radius: f32,
    speed: f32,
    cooldown_ms: u64,
}

impl Shooter {
    /// A shooter centered at the bottom of the field, aiming straight up.
    pub fn new(config: &GameConfig, next_color: BubbleColor) -> Self {
        Self {
            position: Vec2::new(config.width / 2.0, config.height - config.shooter_offset),
            angle: FRAC_PI_2,
            flight: Flight::Idle,
            next_color,
            last_shot_ms: None,
            radius: config.bubble_radius,
            speed: config.bubble_speed,
            cooldown_ms: config.shoot_cooldown_ms,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn next_color(&self) -> BubbleColor {
        self.next_color
    }

    #[cfg(test)]
    pub fn flight(&self) -> &Flight {
        &self.flight
    }

    /// The bubble currently in flight.
    pub fn in_flight(&self) -> Option<&Bubble> {
        match &self.flight {
            Flight::InFlight(bubble) => Some(bubble),
            Flight::Idle => None,
        }
    }

    pub fn in_flight_mut(&mut self) -> Option<&mut Bubble> {
        match &mut self.flight {
            Flight::InFlight(bubble) => Some(bubble),
            Flight::Idle => None,
        }
    }

    pub fn is_shooting(&self) -> bool {
        matches!(self.flight, Flight::InFlight(_))
    }

    /// Point the shooter at a pointer position.
    ///
    /// The angle is not restricted: a pointer below the shooter aims downward.
    pub fn aim(&mut self, pointer: Vec2) {
        let dx = pointer.x - self.position.x;
        let dy = self.position.y - pointer.y;
        self.angle = dy.atan2(dx);
    }

    /// Whether the cooldown since the last shot has run out at `now_ms`.
    pub fn cooldown_elapsed(&self, now_ms: u64) -> bool {
        self.last_shot_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.cooldown_ms)
    }

    /// Launch the next bubble along the current aim.
    ///
    /// Ignored while a bubble is in flight or the cooldown is running.
    /// Returns whether a bubble was launched.
    pub fn shoot(&mut self, now_ms: u64, field: &Playfield, rng: &mut impl Rng) -> bool {
        if self.is_shooting() || !self.cooldown_elapsed(now_ms) {
            return false;
        }

        self.flight = Flight::InFlight(Bubble::flying(
            self.next_color,
            self.position,
            self.radius,
            self.angle,
        ));
        self.last_shot_ms = Some(now_ms);
        self.next_color = random_color(field, rng);

        debug!(
            "Fired bubble at angle {:.3}, next is {:?}",
            self.angle, self.next_color
        );
        true
    }

    /// Hand the flying bubble over, leaving the shooter idle.
    pub fn land(&mut self) -> Option<Bubble> {
        match std::mem::take(&mut self.flight) {
            Flight::InFlight(bubble) => Some(bubble),
            Flight::Idle => None,
        }
    }

    pub fn move_left(&mut self) {
        self.position.x = (self.position.x - self.speed).max(self.radius);
    }

    pub fn move_right(&mut self, field_width: f32) {
        self.position.x = (self.position.x + self.speed).min(field_width - self.radius);
    }
}

/// Pick the next bubble color, favoring colors still in play.
///
/// Uniform over the distinct colors on the field, or over the whole palette
/// when the field is empty.
pub fn random_color(field: &Playfield, rng: &mut impl Rng) -> BubbleColor {
    let remaining = field.colors_present();
    if remaining.is_empty() {
        BubbleColor::random(rng)
    } else {
        remaining[rng.random_range(0..remaining.len())]
    }
}

/// Collect aim, fire and movement input for the next simulation tick.
fn gather_shooter_input(
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform)>,
    mouse_input: Res<ButtonInput<MouseButton>>,
    keyboard_input: Res<ButtonInput<KeyCode>>,
    config: Res<GameConfig>,
    mut pending: ResMut<PendingInput>,
) {
    if let (Ok(window), Ok((camera, camera_transform))) =
        (window_query.single(), camera_query.single())
        && let Some(cursor) = window
            .cursor_position()
            .and_then(|p| camera.viewport_to_world_2d(camera_transform, p).ok())
    {
        pending.0.pointer = Some(world_to_playfield(cursor, &config));
    }

    // Fire is latched until the next tick consumes it; movement is held state.
    if mouse_input.just_pressed(MouseButton::Left) || keyboard_input.just_pressed(KeyCode::Space) {
        pending.0.fire = true;
    }
    pending.0.move_left = keyboard_input.pressed(KeyCode::ArrowLeft);
    pending.0.move_right = keyboard_input.pressed(KeyCode::ArrowRight);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::f32::consts::PI;

    fn setup() -> (GameConfig, Playfield, Shooter, StdRng) {
        let config = GameConfig::default();
        let field = Playfield::new(&config);
        let shooter = Shooter::new(&config, BubbleColor::Red);
        (config, field, shooter, StdRng::seed_from_u64(1))
    }

    #[test]
    fn test_starts_mid_bottom_aiming_up() {
        let (_, _, shooter, _) = setup();
        assert_eq!(shooter.position(), Vec2::new(400.0, 550.0));
        assert_eq!(shooter.angle(), FRAC_PI_2);
        assert!(!shooter.is_shooting());
    }

    #[test]
    fn test_aim_angles() {
        let (_, _, mut shooter, _) = setup();

        shooter.aim(Vec2::new(400.0, 100.0));
        assert!((shooter.angle() - FRAC_PI_2).abs() < 1e-6);

        shooter.aim(Vec2::new(500.0, 450.0));
        assert!((shooter.angle() - PI / 4.0).abs() < 1e-6);

        shooter.aim(Vec2::new(300.0, 550.0));
        assert!((shooter.angle() - PI).abs() < 1e-6);

        // Below the shooter is allowed and aims downward.
        shooter.aim(Vec2::new(400.0, 590.0));
        assert!((shooter.angle() + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_shoot_launches_next_color_along_aim() {
        let (_, field, mut shooter, mut rng) = setup();
        shooter.aim(Vec2::new(500.0, 450.0));

        assert!(shooter.shoot(1_000, &field, &mut rng));
        let bubble = shooter.in_flight().expect("bubble in flight");
        assert_eq!(bubble.color, BubbleColor::Red);
        assert_eq!(bubble.position, Vec2::new(400.0, 550.0));
        assert!((bubble.angle - PI / 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_shoot_ignored_while_in_flight() {
        let (_, field, mut shooter, mut rng) = setup();
        assert!(shooter.shoot(1_000, &field, &mut rng));
        let before = shooter.flight().clone();
        let next = shooter.next_color();

        assert!(!shooter.shoot(5_000, &field, &mut rng));
        assert_eq!(shooter.flight(), &before);
        assert_eq!(shooter.next_color(), next);
    }

    #[test]
    fn test_shoot_ignored_during_cooldown() {
        let (_, field, mut shooter, mut rng) = setup();
        assert!(shooter.shoot(1_000, &field, &mut rng));
        shooter.land();
        let next = shooter.next_color();

        assert!(!shooter.shoot(1_100, &field, &mut rng));
        assert!(!shooter.is_shooting());
        assert_eq!(shooter.next_color(), next);

        assert!(shooter.shoot(1_500, &field, &mut rng));
    }

    #[test]
    fn test_land_hands_over_the_bubble() {
        let (_, field, mut shooter, mut rng) = setup();
        assert!(shooter.land().is_none());
        shooter.shoot(0, &field, &mut rng);
        assert!(shooter.land().is_some());
        assert!(!shooter.is_shooting());
    }

    #[test]
    fn test_movement_is_clamped_on_screen() {
        let (config, _, mut shooter, _) = setup();
        for _ in 0..200 {
            shooter.move_left();
        }
        assert_eq!(shooter.position().x, config.bubble_radius);

        for _ in 0..200 {
            shooter.move_right(config.width);
        }
        assert_eq!(shooter.position().x, config.width - config.bubble_radius);
    }

    #[test]
    fn test_random_color_prefers_colors_in_play() {
        let (_, mut field, _, mut rng) = setup();
        field.insert(Bubble::settled(BubbleColor::Green, Vec2::new(20.0, 20.0), 20.0));
        field.insert(Bubble::settled(BubbleColor::Blue, Vec2::new(60.0, 20.0), 20.0));

        for _ in 0..100 {
            let color = random_color(&field, &mut rng);
            assert!(field.colors_present().contains(&color));
        }
    }

    #[test]
    fn test_random_color_falls_back_to_palette() {
        let (_, field, _, mut rng) = setup();
        for _ in 0..20 {
            assert!(BubbleColor::ALL.contains(&random_color(&field, &mut rng)));
        }
    }
}
