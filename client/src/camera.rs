use std::f32::consts::FRAC_PI_2;

use bevy::{
    camera::RenderTarget,
    prelude::*,
    render::render_resource::TextureFormat,
    window::PrimaryWindow,
};
use leafwing_input_manager::prelude::*;

use crate::{AppState, PlaySet, input::InputAction};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, add_cameras);
    app.add_systems(Update, look_around.in_set(PlaySet::Input));
    app.add_systems(OnEnter(AppState::Loading), reset_look);
}

/// Radians of turn per pixel of mouse motion.
const LOOK_SENSITIVITY: f32 = 0.002;
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;
/// The player capsule is centimeter sized, so the near plane has to be too.
const NEAR_PLANE: f32 = 0.001;

/// Offscreen image the 3D scene renders into before post-processing.
#[derive(Resource, Clone)]
pub struct SceneTarget(pub Handle<Image>);

#[derive(Component, Default)]
pub struct FirstPersonCamera {
    pub yaw: f32,
    pub pitch: f32,
}

impl FirstPersonCamera {
    fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }
}

fn add_cameras(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    window: Single<&Window, With<PrimaryWindow>>,
) {
    let width = window.physical_width().max(1);
    let height = window.physical_height().max(1);
    let target = images.add(Image::new_target_texture(
        width,
        height,
        TextureFormat::Rgba8UnormSrgb,
    ));
    commands.insert_resource(SceneTarget(target.clone()));

    commands.spawn((
        Name::new("SceneCamera"),
        Camera3d::default(),
        Camera {
            target: RenderTarget::Image(target.into()),
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            near: NEAR_PLANE,
            ..default()
        }),
        FirstPersonCamera::default(),
        Transform::default(),
    ));

    // Presents the post-processed image and the menu.
    commands.spawn((
        Name::new("UiCamera"),
        Camera2d,
        Camera {
            order: 1,
            ..default()
        },
        IsDefaultUiCamera,
    ));
}

fn look_around(
    actions: Res<ActionState<InputAction>>,
    mut camera: Single<(&mut FirstPersonCamera, &mut Transform)>,
) {
    let delta = actions.axis_pair(&InputAction::Look);
    if delta == Vec2::ZERO {
        return;
    }
    let (look, transform) = &mut *camera;
    look.yaw -= delta.x * LOOK_SENSITIVITY;
    look.pitch = (look.pitch - delta.y * LOOK_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    transform.rotation = look.rotation();
}

fn reset_look(mut camera: Single<(&mut FirstPersonCamera, &mut Transform)>) {
    let (look, transform) = &mut *camera;
    **look = FirstPersonCamera::default();
    transform.rotation = look.rotation();
}
