//! Stage flow.
//!
//! Entering `Loading` tears the previous stage down, then requests every asset of the new
//! stage and waits on a [`LoadBarrier`]. Physics bodies are only built once every asset has
//! resolved; any failure returns to the menu. When the song ends the next track loads.

use std::f32::consts::TAU;

use bevy::{
    asset::{LoadState, UntypedAssetId},
    gltf::GltfAssetLabel,
    mesh::{PrimitiveTopology, VertexAttributeValues},
    prelude::*,
};
use rhythm_shared::{
    Actor, ActorSpec, BarrierState, LoadBarrier, MeshError, PathMesh, StageDef, next_track,
    stage_def,
};

use crate::{
    AppState, PlaySet,
    audio::{Playback, play_music},
    config::RunConfig,
    physics::{Locomotion, Npc, Physics, StageBodies, to_physics},
    post_process::ShaderInputs,
};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<CurrentTrack>();

    app.add_systems(Startup, start_configured_track);
    app.add_systems(OnEnter(AppState::Loading), (teardown_stage, begin_stage_load).chain());
    app.add_systems(OnEnter(AppState::Menu), teardown_stage);
    app.add_systems(Update, poll_stage_load.run_if(in_state(AppState::Loading)));
    app.add_systems(
        Update,
        (pulse_path, advance_on_song_end).in_set(PlaySet::Present),
    );
}

/// The track being loaded or played.
#[derive(Resource, Default, Debug)]
pub struct CurrentTrack(pub Option<u32>);

/// Everything spawned for a stage. Despawned on every transition.
#[derive(Component)]
pub struct StageEntity;

#[derive(Component)]
struct PathModel {
    base_scale: f32,
    pulse: f32,
    spin: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum StageAsset {
    PathCollider,
    PathModel,
    Model(usize),
    Music,
}

#[derive(Resource)]
struct StageLoad {
    stage: &'static StageDef,
    barrier: LoadBarrier<StageAsset>,
    collider_mesh: Handle<Mesh>,
    path_scene: Handle<Scene>,
    models: Vec<Handle<Scene>>,
    music: Handle<AudioSource>,
}

impl StageLoad {
    fn asset_ids(&self) -> Vec<(StageAsset, UntypedAssetId)> {
        let mut ids = vec![
            (StageAsset::PathCollider, self.collider_mesh.id().untyped()),
            (StageAsset::PathModel, self.path_scene.id().untyped()),
            (StageAsset::Music, self.music.id().untyped()),
        ];
        ids.extend(
            self.models
                .iter()
                .enumerate()
                .map(|(i, h)| (StageAsset::Model(i), h.id().untyped())),
        );
        ids
    }
}

fn required_assets(stage: &StageDef) -> Vec<StageAsset> {
    let mut keys = vec![
        StageAsset::PathCollider,
        StageAsset::PathModel,
        StageAsset::Music,
    ];
    keys.extend((0..stage.models.len()).map(StageAsset::Model));
    keys
}

/// Switch to `track`, tearing down whatever is loaded or playing.
pub fn request_track(track: u32, current: &mut CurrentTrack, next_state: &mut NextState<AppState>) {
    current.0 = Some(track);
    next_state.set(AppState::Loading);
}

fn start_configured_track(
    config: Res<RunConfig>,
    mut current: ResMut<CurrentTrack>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(track) = config.track else {
        return;
    };
    match stage_def(track) {
        Ok(_) => request_track(track, &mut current, &mut next_state),
        Err(err) => warn!("Not auto-starting: {err}"),
    }
}

fn teardown_stage(
    mut commands: Commands,
    stage_entities: Query<Entity, With<StageEntity>>,
    mut physics: ResMut<Physics>,
    mut bodies: ResMut<StageBodies>,
    mut locomotion: ResMut<Locomotion>,
    mut clock: ResMut<Playback>,
) {
    for entity in &stage_entities {
        commands.entity(entity).despawn();
    }
    commands.remove_resource::<StageLoad>();

    let removed = bodies.clear_physics(&mut physics);
    if removed > 0 {
        debug!("Stage torn down, {removed} bodies removed");
    }
    locomotion.player_mut().forget();
    locomotion.set_move_intent(0, 0);
    clock.stop();
}

fn begin_stage_load(
    mut commands: Commands,
    current: Res<CurrentTrack>,
    asset_server: Res<AssetServer>,
    mut bodies: ResMut<StageBodies>,
    mut clear_color: ResMut<ClearColor>,
    mut inputs: ResMut<ShaderInputs>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(track) = current.0 else {
        warn!("Entered loading without a track");
        next_state.set(AppState::Menu);
        return;
    };
    let stage = match stage_def(track) {
        Ok(stage) => stage,
        Err(err) => {
            error!("{err}");
            next_state.set(AppState::Menu);
            return;
        }
    };
    if let Err(err) = bodies.begin_loading() {
        error!("Cannot load track {track}: {err}");
        next_state.set(AppState::Menu);
        return;
    }

    let load = StageLoad {
        stage,
        barrier: LoadBarrier::with_required(required_assets(stage)),
        collider_mesh: asset_server.load(
            GltfAssetLabel::Primitive {
                mesh: 0,
                primitive: 0,
            }
            .from_asset(stage.path_collider),
        ),
        path_scene: asset_server.load(GltfAssetLabel::Scene(0).from_asset(stage.path_model)),
        models: stage
            .models
            .iter()
            .map(|path| asset_server.load(GltfAssetLabel::Scene(0).from_asset(*path)))
            .collect(),
        music: asset_server.load(stage.music),
    };

    let [r, g, b] = stage.background;
    clear_color.0 = Color::srgb(r, g, b);
    inputs.begin_stage(stage.shader_stage);

    info!("Loading track {} \"{}\"", stage.track, stage.title);
    commands.insert_resource(load);
}

fn poll_stage_load(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    load: Option<ResMut<StageLoad>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut physics: ResMut<Physics>,
    mut bodies: ResMut<StageBodies>,
    mut locomotion: ResMut<Locomotion>,
    mut clock: ResMut<Playback>,
    config: Res<RunConfig>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(mut load) = load else {
        return;
    };

    let mut signalled = false;
    for (key, id) in load.asset_ids() {
        if !load.barrier.is_pending(&key) {
            continue;
        }
        match asset_server.get_load_state(id) {
            Some(LoadState::Failed(err)) => load.barrier.fail(key, err.to_string()),
            _ if asset_server.is_loaded_with_dependencies(id) => {
                load.barrier.signal(&key);
                signalled = true;
            }
            _ => {}
        }
    }
    if signalled && !load.barrier.is_ready() {
        let waiting: Vec<_> = load.barrier.pending().collect();
        debug!("Track {} waiting on {waiting:?}", load.stage.track);
    }

    match load.barrier.state() {
        BarrierState::Pending { .. } => return,
        BarrierState::Failed { key, reason } => {
            error!("Track {} failed to load {key:?}: {reason}", load.stage.track);
            next_state.set(AppState::Menu);
            return;
        }
        BarrierState::Ready => {}
    }

    let stage = load.stage;
    let path_mesh = match meshes.get(&load.collider_mesh).map(path_mesh_from) {
        Some(Ok(mesh)) => mesh,
        Some(Err(err)) => {
            error!("Track {} path collider: {err}", stage.track);
            next_state.set(AppState::Menu);
            return;
        }
        None => {
            error!("Track {} path collider mesh was unloaded", stage.track);
            next_state.set(AppState::Menu);
            return;
        }
    };
    if let Err(err) = bodies.build_path_collider(&mut physics, &path_mesh) {
        error!("Track {} path collider: {err}", stage.track);
        next_state.set(AppState::Menu);
        return;
    }

    let spawn = Vec3::from_array(stage.spawn);
    locomotion.set_spawn(to_physics(spawn));
    locomotion.set_speed(stage.move_speed);
    if let Err(err) = bodies.register_player_body(&mut physics, locomotion.player_mut()) {
        error!("Track {} player body: {err}", stage.track);
        next_state.set(AppState::Menu);
        return;
    }

    let npc_mesh = meshes.add(Cuboid::from_length(0.01));
    let npc_material = materials.add(Color::srgb_u8(124, 144, 255));
    for i in 0..stage.npc_count {
        let position = npc_spawn(spawn, i, stage.npc_count);
        let mut actor = Actor::new(ActorSpec::npc(to_physics(position)));
        actor.register(&mut physics);
        commands.spawn((
            Name::new(format!("Npc{i}")),
            StageEntity,
            Npc(actor),
            Mesh3d(npc_mesh.clone()),
            MeshMaterial3d(npc_material.clone()),
            Transform::from_translation(position),
        ));
    }

    if let Err(err) = bodies.activate(&physics) {
        error!("Track {} cannot start: {err}", stage.track);
        next_state.set(AppState::Menu);
        return;
    }

    commands.spawn((
        Name::new("Path"),
        StageEntity,
        PathModel {
            base_scale: stage.path_base_scale,
            pulse: stage.path_pulse,
            spin: stage.path_spin,
        },
        SceneRoot(load.path_scene.clone()),
    ));
    for (i, model) in load.models.iter().enumerate() {
        commands.spawn((
            Name::new(format!("Model{i}")),
            StageEntity,
            SceneRoot(model.clone()),
        ));
    }
    commands.spawn((
        Name::new("Sun"),
        StageEntity,
        DirectionalLight::default(),
        Transform::from_xyz(1.0, 2.0, 1.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let music = play_music(
        &mut commands,
        &mut clock,
        load.music.clone(),
        stage.duration_secs,
        &config,
    );
    commands.entity(music).insert(StageEntity);

    commands.remove_resource::<StageLoad>();
    info!(
        "Track {} ready: {} bodies, {} NPCs",
        stage.track,
        physics.body_count(),
        stage.npc_count
    );
    next_state.set(AppState::Playing);
}

/// Flatten a Bevy triangle-list mesh into path collider buffers.
fn path_mesh_from(mesh: &Mesh) -> Result<PathMesh, MeshError> {
    if mesh.primitive_topology() != PrimitiveTopology::TriangleList {
        return Err(MeshError::Degenerate(format!(
            "expected a triangle list, got {:?}",
            mesh.primitive_topology()
        )));
    }
    let positions: Vec<f32> = match mesh.attribute(Mesh::ATTRIBUTE_POSITION) {
        Some(VertexAttributeValues::Float32x3(values)) => values.iter().flatten().copied().collect(),
        _ => return Err(MeshError::Empty),
    };
    let indices = mesh
        .indices()
        .map(|indices| indices.iter().map(|i| i as u32).collect());
    Ok(PathMesh::new(positions, indices))
}

/// NPCs start on a small ring around the player's spawn.
fn npc_spawn(center: Vec3, index: u32, count: u32) -> Vec3 {
    let angle = TAU * index as f32 / count.max(1) as f32;
    center + Vec3::new(angle.cos() * 0.05, 0.02, angle.sin() * 0.05)
}

fn pulse_path(inputs: Res<ShaderInputs>, mut paths: Query<(&PathModel, &mut Transform)>) {
    for (path, mut transform) in &mut paths {
        let scale = inputs.path_pulse_scale(path.base_scale, path.pulse);
        if scale != 1.0 {
            transform.scale = Vec3::splat(scale);
        }
        if path.spin != 0.0 {
            transform.rotate_y(path.spin * scale);
        }
    }
}

fn advance_on_song_end(
    clock: Res<Playback>,
    mut current: ResMut<CurrentTrack>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if !clock.is_finished() {
        return;
    }
    match current.0.and_then(next_track) {
        Some(track) => {
            info!("Song finished, moving on to track {track}");
            request_track(track, &mut current, &mut next_state);
        }
        None => {
            info!("Last track finished");
            current.0 = None;
            next_state.set(AppState::Menu);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::{asset::RenderAssetUsages, mesh::Indices};

    fn triangle(indices: Option<Indices>) -> Mesh {
        let mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
            .with_inserted_attribute(
                Mesh::ATTRIBUTE_POSITION,
                vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            );
        match indices {
            Some(indices) => mesh.with_inserted_indices(indices),
            None => mesh,
        }
    }

    #[test]
    fn flattens_positions_and_widens_u16_indices() {
        let mesh = path_mesh_from(&triangle(Some(Indices::U16(vec![0, 2, 1])))).expect("triangle list");
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.positions[3..6], [1.0, 0.0, 0.0]);
        assert_eq!(mesh.indices, Some(vec![0, 2, 1]));
    }

    #[test]
    fn u32_indices_pass_through() {
        let mesh = path_mesh_from(&triangle(Some(Indices::U32(vec![0, 1, 2])))).expect("triangle list");
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn unindexed_mesh_is_rejected_by_the_collider_builder() {
        let mesh = path_mesh_from(&triangle(None)).expect("triangle list");
        assert_eq!(mesh.indices, None);
        assert_eq!(
            rhythm_shared::path_collider(&mesh).err(),
            Some(MeshError::MissingIndices)
        );
    }

    #[test]
    fn line_meshes_are_rejected() {
        let mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::default());
        assert!(matches!(path_mesh_from(&mesh), Err(MeshError::Degenerate(_))));
    }

    #[test]
    fn every_stage_asset_is_required() {
        let stage = stage_def(1).expect("track 1");
        let keys = required_assets(stage);
        assert_eq!(keys.len(), 3 + stage.models.len());
        assert!(keys.contains(&StageAsset::PathCollider));
        assert!(keys.contains(&StageAsset::Model(stage.models.len() - 1)));
    }

    #[test]
    fn npcs_ring_the_spawn_point() {
        let center = Vec3::new(0.6, 0.01, -0.1);
        let a = npc_spawn(center, 0, 4);
        let b = npc_spawn(center, 2, 4);
        let planar = |v: Vec3| Vec2::new(v.x, v.z).length();
        assert!(planar(a - center) > 0.04);
        assert!(planar((a + b) * 0.5 - center) < 1.0e-5);
    }

    #[test]
    fn menu_requests_switch_to_loading() {
        let mut current = CurrentTrack::default();
        let mut next_state = NextState::<AppState>::default();
        request_track(5, &mut current, &mut next_state);
        assert_eq!(current.0, Some(5));
        assert!(matches!(next_state, NextState::Pending(AppState::Loading)));
    }
}
