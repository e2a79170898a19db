//! Frame loop of the local player: intent -> body velocity, then body -> camera.
//!
//! The world step itself lives in `physics` and runs between the two halves.

use bevy::prelude::*;

use crate::{
    PlaySet,
    camera::FirstPersonCamera,
    physics::{Locomotion, Physics, to_physics, to_render},
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Update, drive_player.in_set(PlaySet::Drive));
    app.add_systems(Update, follow_player_body.in_set(PlaySet::Present));
}

fn drive_player(
    locomotion: Res<Locomotion>,
    mut physics: ResMut<Physics>,
    camera: Single<&Transform, With<FirstPersonCamera>>,
) {
    let forward = camera.forward();
    locomotion.step(&mut physics, to_physics(*forward));
}

fn follow_player_body(
    locomotion: Res<Locomotion>,
    physics: Res<Physics>,
    mut camera: Single<&mut Transform, With<FirstPersonCamera>>,
) {
    if let Some(position) = locomotion.update_player(&physics) {
        camera.translation = to_render(position);
    }
}
