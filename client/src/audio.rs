use bevy::{
    audio::{AudioSinkPlayback, Volume},
    ecs::system::SystemParam,
    prelude::*,
};
use rhythm_shared::PlaybackClock;

use crate::{PlaySet, config::RunConfig};

/// Progress of the current song. Drives the shader inputs and the end-of-track switch.
#[derive(Resource, Default, Deref, DerefMut)]
pub struct Playback(pub PlaybackClock);

#[derive(Component)]
pub struct StageMusic;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<Playback>();
    app.add_systems(Update, advance_clock.in_set(PlaySet::Simulate));
}

/// Pause and resume the song and its clock together.
#[derive(SystemParam)]
pub struct MusicControl<'w, 's> {
    clock: ResMut<'w, Playback>,
    sinks: Query<'w, 's, &'static mut AudioSink, With<StageMusic>>,
}

impl MusicControl<'_, '_> {
    pub fn pause(&mut self) {
        self.clock.pause();
        for sink in &mut self.sinks {
            sink.pause();
        }
    }

    pub fn resume(&mut self) {
        self.clock.resume();
        for sink in &mut self.sinks {
            sink.play();
        }
    }
}

/// Start the song and restart the clock. The caller tags the entity with its stage marker.
pub fn play_music(
    commands: &mut Commands,
    clock: &mut PlaybackClock,
    source: Handle<AudioSource>,
    duration_secs: f32,
    config: &RunConfig,
) -> Entity {
    clock.start(duration_secs);
    commands
        .spawn((
            Name::new("StageMusic"),
            StageMusic,
            AudioPlayer::new(source),
            PlaybackSettings::ONCE.with_volume(Volume::Linear(config.music_volume())),
        ))
        .id()
}

fn advance_clock(mut clock: ResMut<Playback>, time: Res<Time>) {
    clock.advance(time.delta_secs());
}
