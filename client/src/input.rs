use bevy::{
    prelude::*,
    window::{CursorGrabMode, CursorOptions, PrimaryWindow},
};
use leafwing_input_manager::prelude::*;
use rhythm_shared::MoveKey;

use crate::{AppState, Paused, PlaySet, audio::MusicControl, physics::Locomotion};

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    Forward,
    Back,
    Left,
    Right,
    #[actionlike(DualAxis)]
    Look,
    /// Release the pointer and bring up the track menu.
    Release,
    /// Capture the pointer again.
    LeftClick,
}

const MOVE_KEYS: [(InputAction, MoveKey); 4] = [
    (InputAction::Forward, MoveKey::Forward),
    (InputAction::Back, MoveKey::Back),
    (InputAction::Left, MoveKey::Left),
    (InputAction::Right, MoveKey::Right),
];

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();
    app.insert_resource(default_input_map());
    app.insert_resource(ActionState::<InputAction>::default());

    app.add_systems(Update, apply_move_keys.in_set(PlaySet::Input));
    app.add_systems(
        Update,
        (release_pointer, capture_pointer).run_if(in_state(AppState::Playing)),
    );
    app.add_systems(OnEnter(AppState::Playing), lock_cursor);
    app.add_systems(OnEnter(AppState::Menu), unlock_cursor);
}

fn default_input_map() -> InputMap<InputAction> {
    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert(InputAction::Forward, KeyCode::KeyW);
    input_map.insert(InputAction::Forward, KeyCode::ArrowUp);
    input_map.insert(InputAction::Back, KeyCode::KeyS);
    input_map.insert(InputAction::Back, KeyCode::ArrowDown);
    input_map.insert(InputAction::Left, KeyCode::KeyA);
    input_map.insert(InputAction::Left, KeyCode::ArrowLeft);
    input_map.insert(InputAction::Right, KeyCode::KeyD);
    input_map.insert(InputAction::Right, KeyCode::ArrowRight);
    input_map.insert_dual_axis(InputAction::Look, MouseMove::default());
    input_map.insert(InputAction::Release, KeyCode::Escape);
    input_map.insert(InputAction::LeftClick, MouseButton::Left);
    input_map
}

/// Key-down sets an axis, key-up zeroes it.
fn apply_move_keys(actions: Res<ActionState<InputAction>>, mut locomotion: ResMut<Locomotion>) {
    for (action, key) in MOVE_KEYS {
        if actions.just_pressed(&action) {
            locomotion.press(key);
        }
        if actions.just_released(&action) {
            locomotion.release(key);
        }
    }
}

fn release_pointer(
    actions: Res<ActionState<InputAction>>,
    mut paused: ResMut<Paused>,
    mut cursor: Single<&mut CursorOptions, With<PrimaryWindow>>,
    mut locomotion: ResMut<Locomotion>,
    mut music: MusicControl,
) {
    if paused.0 || !actions.just_pressed(&InputAction::Release) {
        return;
    }
    set_cursor_locked(&mut cursor, false);
    // Keys held at release time never see their key-up.
    locomotion.set_move_intent(0, 0);
    music.pause();
    paused.0 = true;
}

fn capture_pointer(
    actions: Res<ActionState<InputAction>>,
    mut paused: ResMut<Paused>,
    mut cursor: Single<&mut CursorOptions, With<PrimaryWindow>>,
    buttons: Query<&Interaction, With<Button>>,
    mut music: MusicControl,
) {
    if !paused.0 || !actions.just_pressed(&InputAction::LeftClick) {
        return;
    }
    if buttons.iter().any(|i| *i != Interaction::None) {
        return;
    }
    set_cursor_locked(&mut cursor, true);
    music.resume();
    paused.0 = false;
}

fn lock_cursor(mut cursor: Single<&mut CursorOptions, With<PrimaryWindow>>, mut paused: ResMut<Paused>) {
    set_cursor_locked(&mut cursor, true);
    paused.0 = false;
}

fn unlock_cursor(mut cursor: Single<&mut CursorOptions, With<PrimaryWindow>>, mut paused: ResMut<Paused>) {
    set_cursor_locked(&mut cursor, false);
    paused.0 = false;
}

fn set_cursor_locked(cursor: &mut CursorOptions, locked: bool) {
    cursor.grab_mode = if locked {
        CursorGrabMode::Locked
    } else {
        CursorGrabMode::None
    };
    cursor.visible = !locked;
}
