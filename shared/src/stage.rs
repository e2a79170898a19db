//! The track list.
//!
//! Each track is one stage: a walkable path, some set dressing, a song and a few tuning
//! values. Asset paths are relative to the client's asset root.

use crate::{
    constants::{DEFAULT_MOVE_SPEED, DEFAULT_SPAWN},
    error::StageError,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageDef {
    /// 1-based track number as shown in the menu.
    pub track: u32,
    pub title: &'static str,
    /// Player walking speed on this stage (m/s). 0 keeps the player stationary.
    pub move_speed: f32,
    pub spawn: [f32; 3],
    /// Value of the post-process `stage_number` uniform.
    pub shader_stage: i32,
    /// Clear color as sRGB components in [0, 1].
    pub background: [f32; 3],
    /// glTF file whose first mesh primitive becomes the path trimesh.
    pub path_collider: &'static str,
    /// glTF scene rendered as the visible path.
    pub path_model: &'static str,
    pub models: &'static [&'static str],
    pub music: &'static str,
    /// Song length in seconds, used to compute playback progress.
    pub duration_secs: f32,
    pub npc_count: u32,
    /// Resting scale of the path model.
    pub path_base_scale: f32,
    /// Amplitude of the path's breathing scale effect (0 disables it).
    pub path_pulse: f32,
    /// Yaw added to the path model each frame, in radians per unit of scale.
    pub path_spin: f32,
}

macro_rules! stage {
    (
        $track:literal, $dir:literal, $title:literal,
        speed: $speed:expr, shader: $shader:literal, background: $bg:expr,
        duration: $duration:literal, npcs: $npcs:literal,
        path: ($base:literal, $pulse:literal, $spin:literal),
        models: [$($model:literal),* $(,)?] $(,)?
    ) => {
        StageDef {
            track: $track,
            title: $title,
            move_speed: $speed,
            spawn: DEFAULT_SPAWN,
            shader_stage: $shader,
            background: $bg,
            path_collider: concat!("stages/", $dir, "/path_collider.glb"),
            path_model: concat!("stages/", $dir, "/path.glb"),
            models: &[$(concat!("stages/", $dir, "/models/", $model)),*],
            music: concat!("stages/", $dir, "/music.ogg"),
            duration_secs: $duration,
            npc_count: $npcs,
            path_base_scale: $base,
            path_pulse: $pulse,
            path_spin: $spin,
        }
    };
}

const BLACK: [f32; 3] = [0.0, 0.0, 0.0];

static STAGES: [StageDef; 13] = [
    stage!(1, "stage_01", "Greenlight",
        speed: DEFAULT_MOVE_SPEED, shader: 1, background: BLACK,
        duration: 212.0, npcs: 0,
        path: (0.9, 0.05, 0.01),
        models: ["model_1.glb", "model_2.glb", "model_3.glb", "model_4.glb", "model_5.glb"]),
    stage!(2, "stage_02", "Lemon Tea",
        speed: DEFAULT_MOVE_SPEED, shader: 2, background: [1.0, 0.647, 0.0],
        duration: 198.0, npcs: 0,
        path: (1.0, 0.0, 0.0),
        models: ["model_1.glb", "model_2.glb", "model_3.glb"]),
    stage!(3, "stage_03", "Various Things",
        speed: 0.2, shader: 3, background: BLACK,
        duration: 224.0, npcs: 3,
        path: (1.0, 0.0, 0.001),
        models: ["model_1.glb", "model_2.glb"]),
    stage!(4, "stage_04", "Sigyeol",
        speed: 0.15, shader: 4, background: BLACK,
        duration: 187.0, npcs: 0,
        path: (0.9, 0.02, 0.0),
        models: ["model_1.glb"]),
    stage!(5, "stage_05", "Track 5",
        speed: 0.2, shader: 3, background: BLACK,
        duration: 201.0, npcs: 2,
        path: (1.0, 0.0, 0.001),
        models: ["model_1.glb", "model_2.glb"]),
    stage!(6, "stage_06", "Track 6",
        speed: DEFAULT_MOVE_SPEED, shader: 1, background: BLACK,
        duration: 176.0, npcs: 0,
        path: (1.0, 0.0, 0.0),
        models: ["model_1.glb"]),
    stage!(7, "stage_07", "Track 7",
        speed: DEFAULT_MOVE_SPEED, shader: 2, background: BLACK,
        duration: 190.0, npcs: 0,
        path: (0.9, 0.03, 0.0),
        models: ["model_1.glb"]),
    stage!(8, "stage_08", "Track 8",
        speed: 0.0, shader: 4, background: BLACK,
        duration: 165.0, npcs: 4,
        path: (1.0, 0.0, 0.0),
        models: ["model_1.glb"]),
    stage!(9, "stage_09", "Track 9",
        speed: DEFAULT_MOVE_SPEED, shader: 1, background: BLACK,
        duration: 208.0, npcs: 0,
        path: (1.0, 0.0, 0.0),
        models: ["model_1.glb"]),
    stage!(10, "stage_10", "Track 10",
        speed: 0.12, shader: 2, background: [0.667, 0.0, 0.0],
        duration: 219.0, npcs: 1,
        path: (0.9, 0.05, 0.0),
        models: ["model_1.glb", "model_2.glb"]),
    stage!(11, "stage_11", "Track 11",
        speed: 0.12, shader: 3, background: [0.0, 0.0, 1.0],
        duration: 183.0, npcs: 0,
        path: (1.0, 0.0, 0.0),
        models: ["model_1.glb", "model_2.glb", "model_3.glb"]),
    stage!(12, "stage_12", "Track 12",
        speed: DEFAULT_MOVE_SPEED, shader: 4, background: BLACK,
        duration: 195.0, npcs: 0,
        path: (0.9, 0.02, 0.0),
        models: ["model_1.glb"]),
    stage!(13, "stage_13", "Track 13",
        speed: DEFAULT_MOVE_SPEED, shader: 1, background: BLACK,
        duration: 240.0, npcs: 0,
        path: (1.0, 0.0, 0.0),
        models: ["model_1.glb"]),
];

pub fn all_stages() -> &'static [StageDef] {
    &STAGES
}

pub fn stage_count() -> u32 {
    STAGES.len() as u32
}

/// Look up a track by its 1-based number.
pub fn stage_def(track: u32) -> Result<&'static StageDef, StageError> {
    track
        .checked_sub(1)
        .and_then(|i| STAGES.get(i as usize))
        .ok_or(StageError::UnknownTrack(track))
}

/// The track that follows `track`, or `None` after the last one.
pub fn next_track(track: u32) -> Option<u32> {
    let next = track.checked_add(1)?;
    (track >= 1 && next <= stage_count()).then_some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_are_numbered_in_order() {
        for (i, stage) in all_stages().iter().enumerate() {
            assert_eq!(stage.track as usize, i + 1);
        }
    }

    #[test]
    fn lookup_is_one_based() {
        assert_eq!(stage_def(1).expect("track 1").title, "Greenlight");
        assert_eq!(stage_def(13).expect("track 13").track, 13);
        assert_eq!(stage_def(0), Err(StageError::UnknownTrack(0)));
        assert_eq!(stage_def(14), Err(StageError::UnknownTrack(14)));
    }

    #[test]
    fn next_track_stops_after_the_last() {
        assert_eq!(next_track(1), Some(2));
        assert_eq!(next_track(12), Some(13));
        assert_eq!(next_track(13), None);
        assert_eq!(next_track(0), None);
        assert_eq!(next_track(u32::MAX), None);
    }

    #[test]
    fn stage_values_are_sane() {
        for stage in all_stages() {
            assert!(stage.move_speed >= 0.0);
            assert!(stage.duration_secs > 0.0);
            assert!(stage.spawn.iter().all(|v| v.is_finite()));
            assert!(stage.background.iter().all(|c| (0.0..=1.0).contains(c)));
            assert!(stage.path_collider.starts_with("stages/"));
            assert!(stage.music.ends_with(".ogg"));
            assert!(stage.path_base_scale - stage.path_pulse.abs() > 0.0);
            assert!(stage.path_spin >= 0.0);
        }
    }

    #[test]
    fn first_track_breathes_and_spins() {
        let stage = stage_def(1).expect("track 1");
        assert_eq!(stage.path_base_scale, 0.9);
        assert_eq!(stage.path_pulse, 0.05);
        assert_eq!(stage.path_spin, 0.01);
    }

    #[test]
    fn asset_paths_use_the_stage_directory() {
        let stage = stage_def(2).expect("track 2");
        assert_eq!(stage.path_collider, "stages/stage_02/path_collider.glb");
        assert_eq!(stage.models[2], "stages/stage_02/models/model_3.glb");
    }
}
