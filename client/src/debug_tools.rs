//! Debug/performance tooling for native dev builds.
//!
//! Gated behind `dev_native` in `main.rs`.

use bevy::diagnostic::{EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use iyes_perf_ui::prelude::*;

use crate::{
    physics::{Locomotion, Physics},
    stage::CurrentTrack,
};

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        PerfUiPlugin,
    ));

    app.add_systems(Startup, (spawn_perf_ui, spawn_physics_readout));
    app.add_systems(Update, update_physics_readout);
}

#[derive(Component)]
struct PhysicsReadout;

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn((
        PerfUiRoot::default(),
        PerfUiEntryFPS::default(),
        PerfUiEntryFrameTime::default(),
        PerfUiEntryEntityCount::default(),
    ));
}

fn spawn_physics_readout(mut commands: Commands) {
    commands.spawn((
        Name::new("PhysicsReadout"),
        PhysicsReadout,
        Text::default(),
        TextFont::from_font_size(14.0),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(8.0),
            left: Val::Px(8.0),
            ..default()
        },
    ));
}

fn update_physics_readout(
    physics: Res<Physics>,
    locomotion: Res<Locomotion>,
    current: Res<CurrentTrack>,
    mut text: Single<&mut Text, With<PhysicsReadout>>,
) {
    let track = current.0.map_or_else(|| "-".to_string(), |t| t.to_string());
    let intent = locomotion.intent();
    let readout = format!(
        "track {track}  bodies {}  fixed {}  colliders {}  intent {:+}/{:+}",
        physics.body_count(),
        physics.fixed_body_count(),
        physics.collider_count(),
        intent.forward,
        intent.right
    );
    if text.0 != readout {
        text.0 = readout;
    }
}
