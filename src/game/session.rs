//! The game session: playfield, shooter, RNG and the per-tick simulation.
//!
//! One [`Session`] exists while the game is being played. Each fixed tick it
//! applies the latched input, moves the flying bubble, settles it on contact
//! and pops any cluster the settled bubble completes.

use bevy::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

use super::{
    bubble::BubbleColor,
    cluster::{self, PoppedCluster},
    playfield::{BubbleId, Playfield},
    shooter::{Shooter, random_color},
};
use crate::{PausableSystems, config::GameConfig, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.add_message::<BubbleSettled>();
    app.add_message::<ClusterPopped>();
    app.init_resource::<PendingInput>();

    app.add_systems(Startup, configure_tick_rate);
    app.add_systems(OnEnter(Screen::Gameplay), start_session);
    app.add_systems(OnExit(Screen::Gameplay), end_session);

    app.add_systems(
        FixedUpdate,
        run_tick
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay).and(resource_exists::<Session>)),
    );
}

/// Input gathered since the last tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Pointer position in playfield coordinates, if known.
    pub pointer: Option<Vec2>,
    pub fire: bool,
    pub move_left: bool,
    pub move_right: bool,
}

/// Input latched by the frame-rate systems for the next fixed tick.
#[derive(Resource, Debug, Default)]
pub struct PendingInput(pub TickInput);

/// A bubble that came to rest this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub id: BubbleId,
    pub position: Vec2,
    pub color: BubbleColor,
    /// The cluster it completed, if one popped.
    pub popped: Option<PoppedCluster>,
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub fired: bool,
    pub settled: Option<Settlement>,
}

/// Message sent when a flying bubble settles.
#[derive(Message, Debug, Clone)]
pub struct BubbleSettled {
    pub position: Vec2,
    pub color: BubbleColor,
}

/// Message sent when a cluster is popped.
#[derive(Message, Debug, Clone)]
pub struct ClusterPopped {
    pub positions: Vec<Vec2>,
    pub color: BubbleColor,
    pub count: usize,
}

/// The whole game world.
#[derive(Resource, Debug, Clone)]
pub struct Session {
    config: GameConfig,
    field: Playfield,
    shooter: Shooter,
    rng: StdRng,
}

impl Session {
    /// A session with the seeded starting layout.
    ///
    /// Uses `config.seed` when set, otherwise a seed from the OS.
    pub fn new(config: &GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut session = Self::empty(config, rng);
        let count = session.field.seed_layout(&mut session.rng);
        session.shooter = Shooter::new(config, random_color(&session.field, &mut session.rng));
        info!("Session started with {} bubbles", count);
        session
    }

    /// A session with an empty field.
    pub fn empty(config: &GameConfig, mut rng: StdRng) -> Self {
        let field = Playfield::new(config);
        let shooter = Shooter::new(config, random_color(&field, &mut rng));
        Self {
            config: config.clone(),
            field,
            shooter,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn field(&self) -> &Playfield {
        &self.field
    }

    #[cfg(test)]
    pub fn field_mut(&mut self) -> &mut Playfield {
        &mut self.field
    }

    pub fn shooter(&self) -> &Shooter {
        &self.shooter
    }

    /// Run one simulation step.
    ///
    /// Order: aim, fire, move, then advance and settle the flying bubble.
    pub fn tick(&mut self, input: &TickInput, now_ms: u64) -> TickOutcome {
        if let Some(pointer) = input.pointer {
            self.shooter.aim(pointer);
        }

        let fired = input.fire && self.shooter.shoot(now_ms, &self.field, &mut self.rng);

        if input.move_left {
            self.shooter.move_left();
        }
        if input.move_right {
            self.shooter.move_right(self.field.width());
        }

        TickOutcome {
            fired,
            settled: self.step_flight(),
        }
    }

    /// Advance the flying bubble and settle it on first contact.
    pub fn step_flight(&mut self) -> Option<Settlement> {
        let bubble = self.shooter.in_flight_mut()?;
        bubble.advance(self.config.bubble_speed, self.field.width());

        let hit = self.field.first_collision(bubble);
        let at_boundary = self.field.reaches_top(bubble) || self.field.reaches_bottom(bubble);
        if hit.is_none() && !at_boundary {
            return None;
        }

        let bubble = self.shooter.land()?;
        let id = self.field.settle(bubble);
        let (position, color) = self
            .field
            .get(id)
            .map(|b| (b.position, b.color))?;

        let popped = cluster::resolve_cluster(&mut self.field, id);
        if popped.is_some() && self.field.is_empty() {
            info!("Field cleared!");
        }

        Some(Settlement {
            id,
            position,
            color,
            popped,
        })
    }
}

fn configure_tick_rate(mut commands: Commands, config: Res<GameConfig>) {
    commands.insert_resource(Time::<Fixed>::from_hz(config.tick_rate_hz));
}

/// Create a fresh session when gameplay starts.
fn start_session(mut commands: Commands, config: Res<GameConfig>, mut pending: ResMut<PendingInput>) {
    pending.0 = TickInput::default();
    commands.insert_resource(Session::new(&config));
}

fn end_session(mut commands: Commands) {
    commands.remove_resource::<Session>();
    info!("Session ended");
}

/// Step the simulation once per fixed tick.
fn run_tick(
    time: Res<Time>,
    mut session: ResMut<Session>,
    mut pending: ResMut<PendingInput>,
    mut settled_events: MessageWriter<BubbleSettled>,
    mut popped_events: MessageWriter<ClusterPopped>,
) {
    let now_ms = time.elapsed().as_millis() as u64;
    let outcome = session.tick(&pending.0, now_ms);

    // Fire is a one-shot request; the pointer and held keys stay as they are.
    pending.0.fire = false;

    if outcome.fired {
        debug!("Bubble launched at {} ms", now_ms);
    }

    let Some(settlement) = outcome.settled else {
        return;
    };
    debug!(
        "Bubble {} settled at {:?}",
        settlement.id, settlement.position
    );

    settled_events.write(BubbleSettled {
        position: settlement.position,
        color: settlement.color,
    });

    if let Some(popped) = settlement.popped {
        popped_events.write(ClusterPopped {
            positions: popped.positions().collect(),
            color: popped.color,
            count: popped.count(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::bubble::Bubble;
    use std::f32::consts::FRAC_PI_2;

    fn empty_session() -> Session {
        Session::empty(&GameConfig::default(), StdRng::seed_from_u64(9))
    }

    fn fire() -> TickInput {
        TickInput {
            fire: true,
            ..default()
        }
    }

    /// Tick with no input until something settles.
    fn run_until_settled(session: &mut Session, mut now_ms: u64) -> Settlement {
        for _ in 0..1_000 {
            now_ms += 33;
            if let Some(settlement) = session.tick(&TickInput::default(), now_ms).settled {
                return settlement;
            }
        }
        panic!("bubble never settled");
    }

    #[test]
    fn test_seeded_sessions_match() {
        let config = GameConfig {
            seed: Some(1234),
            ..default()
        };
        let a = Session::new(&config);
        let b = Session::new(&config);

        let layout = |s: &Session| -> Vec<(Vec2, BubbleColor)> {
            s.field().iter().map(|(_, b)| (b.position, b.color)).collect()
        };
        assert_eq!(a.field().len(), 100);
        assert_eq!(layout(&a), layout(&b));
        assert_eq!(a.shooter().next_color(), b.shooter().next_color());
    }

    #[test]
    fn test_straight_shot_settles_at_top_edge() {
        let mut session = empty_session();
        session.tick(
            &TickInput {
                pointer: Some(Vec2::new(400.0, 0.0)),
                fire: true,
                ..default()
            },
            1_000,
        );
        assert!(session.shooter().is_shooting());
        assert!((session.shooter().angle() - FRAC_PI_2).abs() < 1e-6);

        let settlement = run_until_settled(&mut session, 1_000);
        assert!(settlement.popped.is_none());
        assert!(!session.shooter().is_shooting());

        let bubble = session.field().get(settlement.id).expect("settled bubble");
        assert_eq!(bubble.top(), 0.0);
        assert_eq!(bubble.position, Vec2::new(400.0, 20.0));
        assert_eq!(session.field().len(), 1);
    }

    #[test]
    fn test_straight_shot_from_left_wall_settles_in_corner() {
        let mut session = empty_session();
        let slide_left = TickInput {
            move_left: true,
            ..default()
        };
        for tick in 0..60 {
            session.tick(&slide_left, tick * 33);
        }
        assert_eq!(session.shooter().position().x, 20.0);

        session.tick(
            &TickInput {
                pointer: Some(Vec2::new(20.0, 0.0)),
                fire: true,
                ..default()
            },
            2_000,
        );
        let settlement = run_until_settled(&mut session, 2_000);
        assert_eq!(settlement.position, Vec2::new(20.0, 20.0));
    }

    #[test]
    fn test_downward_shot_settles_at_bottom_and_frees_shooter() {
        let mut session = empty_session();
        let outcome = session.tick(
            &TickInput {
                pointer: Some(Vec2::new(400.0, 599.0)),
                fire: true,
                ..default()
            },
            1_000,
        );
        assert!(outcome.fired);
        assert!((session.shooter().angle() + FRAC_PI_2).abs() < 1e-6);

        let settlement = run_until_settled(&mut session, 1_000);
        assert!(!session.shooter().is_shooting());
        let bubble = session.field().get(settlement.id).expect("settled bubble");
        assert_eq!(bubble.bottom(), 600.0);
        assert_eq!(bubble.position, Vec2::new(400.0, 580.0));

        assert!(session.tick(&fire(), 5_000).fired);
    }

    #[test]
    fn test_fire_during_cooldown_changes_nothing() {
        let mut session = empty_session();
        assert!(session.tick(&fire(), 1_000).fired);
        session.shooter.land();
        let before = session.shooter().clone();

        // 100 ms after the shot, with a 500 ms cooldown.
        let outcome = session.tick(&fire(), 1_100);
        assert!(!outcome.fired);
        assert!(outcome.settled.is_none());
        assert!(!session.shooter().is_shooting());
        assert_eq!(session.shooter().next_color(), before.next_color());
        assert_eq!(session.shooter().position(), before.position());

        assert!(session.tick(&fire(), 1_500).fired);
    }

    #[test]
    fn test_fire_while_in_flight_is_ignored() {
        let mut session = empty_session();
        assert!(session.tick(&fire(), 1_000).fired);
        assert!(!session.tick(&fire(), 5_000).fired);
        assert!(session.shooter().is_shooting());
    }

    #[test]
    fn test_red_shot_pops_red_cluster_but_not_blue() {
        let mut session = empty_session();
        let field = session.field_mut();
        let red = |x, y| Bubble::settled(BubbleColor::Red, Vec2::new(x, y), 20.0);
        let r1 = field.insert(red(380.0, 100.0));
        let r2 = field.insert(red(420.0, 100.0));
        let r3 = field.insert(red(400.0, 70.0));
        let blue = field.insert(Bubble::settled(BubbleColor::Blue, Vec2::new(460.0, 100.0), 20.0));

        // Force a red shot straight up under the red pair.
        session.shooter = Shooter::new(session.config(), BubbleColor::Red);
        session.tick(
            &TickInput {
                pointer: Some(Vec2::new(400.0, 0.0)),
                fire: true,
                ..default()
            },
            1_000,
        );

        let settlement = run_until_settled(&mut session, 1_000);
        let popped = settlement.popped.expect("red cluster should pop");
        assert_eq!(popped.color, BubbleColor::Red);
        assert_eq!(popped.count(), 4);

        let field = session.field();
        for id in [r1, r2, r3, settlement.id] {
            assert!(!field.contains(id));
        }
        assert!(field.contains(blue));
        assert_eq!(field.len(), 1);
    }

    #[test]
    fn test_mismatched_shot_stays_on_field() {
        let mut session = empty_session();
        session
            .field_mut()
            .insert(Bubble::settled(BubbleColor::Blue, Vec2::new(400.0, 100.0), 20.0));
        session.shooter = Shooter::new(session.config(), BubbleColor::Green);
        session.tick(&fire(), 1_000);

        let settlement = run_until_settled(&mut session, 1_000);
        assert!(settlement.popped.is_none());
        assert_eq!(settlement.color, BubbleColor::Green);
        assert_eq!(session.field().len(), 2);

        let distance = settlement.position.distance(Vec2::new(400.0, 100.0));
        assert!((distance - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_next_color_comes_from_field() {
        let mut session = empty_session();
        session
            .field_mut()
            .insert(Bubble::settled(BubbleColor::Blue, Vec2::new(20.0, 20.0), 20.0));
        session.shooter = Shooter::new(session.config(), BubbleColor::Green);
        session.tick(&fire(), 1_000);
        assert_eq!(session.shooter().next_color(), BubbleColor::Blue);
    }

    #[test]
    fn test_held_keys_move_the_shooter() {
        let mut session = empty_session();
        let start = session.shooter().position().x;
        session.tick(
            &TickInput {
                move_left: true,
                ..default()
            },
            0,
        );
        assert_eq!(session.shooter().position().x, start - 8.0);
        session.tick(
            &TickInput {
                move_right: true,
                ..default()
            },
            33,
        );
        assert_eq!(session.shooter().position().x, start);
    }
}
