//! The screen state for the main gameplay.

use bevy::{input::common_conditions::input_just_pressed, prelude::*};

use crate::{Pause, screens::Screen, theme::widget};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (
            toggle_pause.run_if(input_just_pressed(KeyCode::KeyP)),
            return_to_title.run_if(input_just_pressed(KeyCode::Escape)),
        )
            .run_if(in_state(Screen::Gameplay)),
    );

    app.add_systems(OnEnter(Pause(true)), (spawn_pause_overlay, freeze_clock));
    app.add_systems(OnExit(Pause(true)), resume_clock);
    app.add_systems(OnExit(Screen::Gameplay), unpause);
}

fn toggle_pause(pause: Res<State<Pause>>, mut next_pause: ResMut<NextState<Pause>>) {
    next_pause.set(Pause(!pause.get().0));
}

fn spawn_pause_overlay(mut commands: Commands) {
    commands.spawn((
        widget::ui_root("Pause Overlay"),
        GlobalZIndex(1),
        DespawnOnExit(Pause(true)),
        children![widget::header("Game Paused")],
    ));
}

/// Stop virtual time so shot cooldowns do not run down while paused.
fn freeze_clock(mut time: ResMut<Time<Virtual>>) {
    time.pause();
}

fn resume_clock(mut time: ResMut<Time<Virtual>>) {
    time.unpause();
}

fn unpause(mut next_pause: ResMut<NextState<Pause>>) {
    next_pause.set(Pause(false));
}

fn return_to_title(mut next_screen: ResMut<NextState<Screen>>) {
    next_screen.set(Screen::Title);
}
