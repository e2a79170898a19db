//! Full-screen post-process pass.
//!
//! The scene camera renders into [`SceneTarget`]; a full-window UI node samples it through
//! [`PostProcessMaterial`] and applies the stage's pixelation and tint.

use bevy::{
    prelude::*,
    render::render_resource::{AsBindGroup, Extent3d},
    shader::ShaderRef,
    window::WindowResized,
};
use rhythm_shared::FrameUniforms;

use crate::{AppState, PlaySet, audio::Playback, camera::SceneTarget};

const SHADER_PATH: &str = "shaders/post_process.wgsl";

/// Shader inputs for the current frame.
#[derive(Resource, Default, Deref, DerefMut)]
pub struct ShaderInputs(pub FrameUniforms);

#[derive(Resource)]
struct PostProcessHandle(Handle<PostProcessMaterial>);

#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct PostProcessMaterial {
    // Packed into one uniform buffer.
    // Layout: [time, frame_count, song_progress, transition], [stage_number, pixel_size, 0, 0]
    #[uniform(0)]
    u: [Vec4; 2],

    #[texture(1)]
    #[sampler(2)]
    scene: Handle<Image>,
}

impl PostProcessMaterial {
    fn new(scene: Handle<Image>) -> Self {
        let mut material = Self {
            u: [Vec4::ZERO; 2],
            scene,
        };
        material.write(&FrameUniforms::default());
        material
    }

    fn write(&mut self, inputs: &FrameUniforms) {
        self.u[0] = Vec4::new(
            inputs.time,
            inputs.frame_count,
            inputs.song_progress,
            inputs.transition,
        );
        self.u[1] = Vec4::new(inputs.stage_number as f32, inputs.pixel_size, 0.0, 0.0);
    }
}

impl UiMaterial for PostProcessMaterial {
    fn fragment_shader() -> ShaderRef {
        SHADER_PATH.into()
    }
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(UiMaterialPlugin::<PostProcessMaterial>::default());
    app.init_resource::<ShaderInputs>();

    // Runs after the cameras exist.
    app.add_systems(PostStartup, spawn_post_process_node);
    app.add_systems(Update, advance_inputs.in_set(PlaySet::Present));
    app.add_systems(
        Update,
        (resize_scene_target, upload_inputs).chain(),
    );
    app.add_systems(OnEnter(AppState::Menu), reset_inputs);
}

fn spawn_post_process_node(
    mut commands: Commands,
    target: Res<SceneTarget>,
    mut materials: ResMut<Assets<PostProcessMaterial>>,
) {
    let material = materials.add(PostProcessMaterial::new(target.0.clone()));
    commands.insert_resource(PostProcessHandle(material.clone()));
    commands.spawn((
        Name::new("PostProcess"),
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            ..default()
        },
        GlobalZIndex(-1),
        MaterialNode(material),
    ));
}

fn advance_inputs(mut inputs: ResMut<ShaderInputs>, clock: Res<Playback>, time: Res<Time>) {
    inputs.advance(time.delta_secs(), &clock);
}

fn reset_inputs(mut inputs: ResMut<ShaderInputs>) {
    inputs.0 = FrameUniforms::default();
}

fn upload_inputs(
    inputs: Res<ShaderInputs>,
    handle: Res<PostProcessHandle>,
    mut materials: ResMut<Assets<PostProcessMaterial>>,
) {
    if !inputs.is_changed() {
        return;
    }
    if let Some(material) = materials.get_mut(&handle.0) {
        material.write(&inputs);
    }
}

fn resize_scene_target(
    mut messages: MessageReader<WindowResized>,
    windows: Query<&Window>,
    target: Res<SceneTarget>,
    handle: Res<PostProcessHandle>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<PostProcessMaterial>>,
) {
    let Some(message) = messages.read().last() else {
        return;
    };
    let Ok(window) = windows.get(message.window) else {
        return;
    };
    let size = Extent3d {
        width: window.physical_width().max(1),
        height: window.physical_height().max(1),
        depth_or_array_layers: 1,
    };
    if let Some(image) = images.get_mut(&target.0) {
        image.resize(size);
    }
    // Re-prepare the bind group so it samples the resized texture.
    if let Some(material) = materials.get_mut(&handle.0) {
        material.scene = target.0.clone();
    }
}
