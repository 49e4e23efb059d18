//! The title screen that appears when the game starts.

use bevy::{input::common_conditions::input_just_pressed, prelude::*};

use crate::{screens::Screen, theme::widget};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Screen::Title), spawn_title_screen);
    app.add_systems(
        Update,
        enter_gameplay_screen
            .run_if(in_state(Screen::Title).and(input_just_pressed(KeyCode::Enter))),
    );
}

fn spawn_title_screen(mut commands: Commands) {
    commands.spawn((
        widget::ui_root("Title Screen"),
        GlobalZIndex(2),
        DespawnOnExit(Screen::Title),
        children![
            widget::header("PUZZLE BUBBLE"),
            widget::label("Press ENTER to Start"),
        ],
    ));
}

fn enter_gameplay_screen(mut next_screen: ResMut<NextState<Screen>>) {
    next_screen.set(Screen::Gameplay);
}
