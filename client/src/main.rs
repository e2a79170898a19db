// Support configuring Bevy lints within code.
#![cfg_attr(bevy_lint, feature(register_tool), register_tool(bevy))]
// Disable console on Windows for non-dev builds.
#![cfg_attr(not(feature = "dev"), windows_subsystem = "windows")]

#[cfg(feature = "dev_native")]
mod debug_tools;

mod audio;
mod camera;
mod config;
mod input;
mod menu;
mod physics;
mod player;
mod post_process;
mod stage;

use bevy::prelude::*;

fn main() -> AppExit {
    App::new().add_plugins(AppPlugin).run()
}

/// Top-level flow: pick a track, wait for its assets, walk it.
#[derive(States, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AppState {
    #[default]
    Menu,
    Loading,
    Playing,
}

/// Set while the pointer is released during a stage. Simulation and music hold still.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Paused(pub bool);

/// Per-frame order while walking a stage.
#[derive(SystemSet, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaySet {
    /// Read input into the locomotion intent and camera look.
    Input,
    /// Write intent velocities onto bodies.
    Drive,
    /// Advance the physics world.
    Simulate,
    /// Copy simulated state onto transforms, camera and shader inputs.
    Present,
}

pub struct AppPlugin;
impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Window {
                title: "Rhythm Walk".to_string(),
                fit_canvas_to_parent: true,
                ..default()
            }
            .into(),
            ..default()
        }));

        app.init_state::<AppState>();
        app.init_resource::<Paused>();
        app.configure_sets(
            Update,
            (
                PlaySet::Input,
                PlaySet::Drive,
                PlaySet::Simulate,
                PlaySet::Present,
            )
                .chain()
                .run_if(in_state(AppState::Playing).and(resource_equals(Paused(false)))),
        );

        app.add_plugins((
            config::plugin,
            physics::plugin,
            input::plugin,
            camera::plugin,
            player::plugin,
            stage::plugin,
            audio::plugin,
            post_process::plugin,
            menu::plugin,
        ));

        #[cfg(feature = "dev_native")]
        app.add_plugins(debug_tools::plugin);
    }
}
